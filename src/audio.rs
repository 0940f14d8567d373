//! Fire-and-forget sound feedback.
//!
//! Call sites only see [`AudioSink`]. Sinks never report errors back; a
//! broken or missing output simply means no sound.

use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cue {
    /// A unit typed correctly
    Keystroke,
    /// A unit typed incorrectly
    Error,
    /// The whole passage was typed
    Complete,
}

pub trait AudioSink {
    fn play(&self, cue: Cue);

    /// Releases whatever output the sink holds
    fn shutdown(&self) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAudioSink;

impl AudioSink for NoopAudioSink {
    fn play(&self, _cue: Cue) {}
}

/// Which cues are audible
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CueSettings {
    pub keystroke: bool,
    pub error: bool,
    pub complete: bool,
}

impl Default for CueSettings {
    fn default() -> Self {
        Self {
            keystroke: true,
            error: true,
            complete: true,
        }
    }
}

impl CueSettings {
    pub fn muted() -> Self {
        Self {
            keystroke: false,
            error: false,
            complete: false,
        }
    }

    pub fn enabled(&self, cue: Cue) -> bool {
        match cue {
            Cue::Keystroke => self.keystroke,
            Cue::Error => self.error,
            Cue::Complete => self.complete,
        }
    }

    pub fn any_enabled(&self) -> bool {
        self.keystroke || self.error || self.complete
    }

    /// Turns everything off, or everything back on when already silent
    pub fn toggle_all(&self) -> Self {
        if self.any_enabled() {
            Self::muted()
        } else {
            Self::default()
        }
    }
}

/// A sink plus the user's cue toggles
pub struct Audio {
    sink: Box<dyn AudioSink>,
    settings: CueSettings,
}

impl Audio {
    pub fn new(sink: Box<dyn AudioSink>, settings: CueSettings) -> Self {
        Self { sink, settings }
    }

    pub fn silent() -> Self {
        Self::new(Box::new(NoopAudioSink), CueSettings::muted())
    }

    pub fn settings(&self) -> CueSettings {
        self.settings
    }

    pub fn set_settings(&mut self, settings: CueSettings) {
        self.settings = settings;
    }

    pub fn play(&self, cue: Cue) {
        if self.settings.enabled(cue) {
            self.sink.play(cue);
        }
    }

    pub fn shutdown(&self) {
        self.sink.shutdown();
    }
}

impl std::fmt::Debug for Audio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Audio")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

type Output = Box<dyn Write + Send>;
type Opener = Box<dyn Fn() -> io::Result<Output> + Send + Sync>;

enum BellOutput {
    Unopened,
    Open(Output),
    Unavailable,
}

/// Rings the terminal bell. The output is opened on first use and kept
/// until [`AudioSink::shutdown`]. Correct keystrokes are silent because a
/// terminal has nothing quieter than the bell.
pub struct BellSink {
    open: Opener,
    output: Mutex<BellOutput>,
}

impl BellSink {
    pub fn new<F>(open: F) -> Self
    where
        F: Fn() -> io::Result<Output> + Send + Sync + 'static,
    {
        Self {
            open: Box::new(open),
            output: Mutex::new(BellOutput::Unopened),
        }
    }

    pub fn stdout() -> Self {
        Self::new(|| Ok(Box::new(io::stdout()) as Output))
    }

    fn pattern(cue: Cue) -> &'static [u8] {
        match cue {
            Cue::Keystroke => b"",
            Cue::Error => b"\x07",
            Cue::Complete => b"\x07\x07",
        }
    }
}

impl AudioSink for BellSink {
    fn play(&self, cue: Cue) {
        let bytes = Self::pattern(cue);
        if bytes.is_empty() {
            return;
        }
        let Ok(mut output) = self.output.lock() else {
            return;
        };

        if matches!(*output, BellOutput::Unopened) {
            *output = match (self.open)() {
                Ok(w) => BellOutput::Open(w),
                Err(e) => {
                    log::debug!("audio output unavailable: {e}");
                    BellOutput::Unavailable
                }
            };
        }

        if let BellOutput::Open(w) = &mut *output {
            if let Err(e) = w.write_all(bytes).and_then(|_| w.flush()) {
                log::debug!("bell write failed: {e}");
            }
        }
    }

    fn shutdown(&self) {
        if let Ok(mut output) = self.output.lock() {
            if let BellOutput::Open(w) = &mut *output {
                let _ = w.flush();
            }
            *output = BellOutput::Unopened;
        }
    }
}
