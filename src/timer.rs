//! One-second clocks driving a session: the countdown that forces the end of
//! a session and the stopwatch measuring time since the first keystroke.

/// Session lengths offered to the user, in seconds
pub const DURATION_OPTIONS: [u32; 3] = [30, 60, 120];
pub const DEFAULT_DURATION_SECS: u32 = 60;

/// Result of advancing the countdown by one second
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTick {
    /// Not running; nothing changed
    Idle,
    /// Still counting, with this many seconds left
    Running(u32),
    /// Reached zero on this tick. Reported exactly once per run.
    Expired,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    duration: u32,
    time_left: u32,
    running: bool,
}

impl Countdown {
    pub fn new(duration: u32) -> Self {
        Self {
            duration,
            time_left: duration,
            running: false,
        }
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Starts counting down. A no-op while running or once expired.
    pub fn start(&mut self) {
        if self.running || self.time_left == 0 {
            return;
        }
        self.running = true;
    }

    /// Halts without restoring the remaining time
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn reset(&mut self) {
        self.stop();
        self.time_left = self.duration;
    }

    /// Changes the configured length. The clock is stopped and shows the new duration.
    pub fn set_duration(&mut self, duration: u32) {
        self.duration = duration;
        self.reset();
    }

    pub fn tick(&mut self) -> TimerTick {
        if !self.running {
            return TimerTick::Idle;
        }
        if self.time_left <= 1 {
            self.time_left = 0;
            self.running = false;
            return TimerTick::Expired;
        }
        self.time_left -= 1;
        TimerTick::Running(self.time_left)
    }
}

/// Counts whole seconds while running
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stopwatch {
    elapsed_secs: u32,
    running: bool,
}

impl Stopwatch {
    pub fn elapsed_secs(&self) -> u32 {
        self.elapsed_secs
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn reset(&mut self) {
        self.running = false;
        self.elapsed_secs = 0;
    }

    pub fn tick(&mut self) {
        if self.running {
            self.elapsed_secs += 1;
        }
    }
}

/// The countdown and stopwatch of one session. They only ever start and
/// stop together so neither can keep ticking after the session ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClock {
    countdown: Countdown,
    stopwatch: Stopwatch,
}

impl SessionClock {
    pub fn new(duration: u32) -> Self {
        Self {
            countdown: Countdown::new(duration),
            stopwatch: Stopwatch::default(),
        }
    }

    pub fn start(&mut self) {
        self.countdown.start();
        self.stopwatch.start();
    }

    pub fn stop(&mut self) {
        self.countdown.stop();
        self.stopwatch.stop();
    }

    pub fn reset(&mut self) {
        self.countdown.reset();
        self.stopwatch.reset();
    }

    pub fn set_duration(&mut self, duration: u32) {
        self.countdown.set_duration(duration);
        self.stopwatch.reset();
    }

    pub fn is_running(&self) -> bool {
        self.countdown.is_running() || self.stopwatch.is_running()
    }

    pub fn tick(&mut self) -> TimerTick {
        self.stopwatch.tick();
        let tick = self.countdown.tick();
        if tick == TimerTick::Expired {
            self.stopwatch.stop();
        }
        tick
    }

    pub fn duration(&self) -> u32 {
        self.countdown.duration()
    }

    pub fn time_left(&self) -> u32 {
        self.countdown.time_left()
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.stopwatch.elapsed_secs()
    }
}
