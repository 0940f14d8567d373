use crate::compare::Tally;

/// Characters per standard word
pub const CHARS_PER_WORD: f64 = 5.0;

/// Words per minute from correct units and seconds since the first keystroke
pub fn wpm(correct: usize, elapsed_secs: u32) -> u32 {
    if elapsed_secs < 1 || correct == 0 {
        return 0;
    }
    let elapsed_mins = elapsed_secs as f64 / 60.0;
    (correct as f64 / CHARS_PER_WORD / elapsed_mins).round() as u32
}

/// Percentage of typed units that were correct; 100 before anything is typed
pub fn accuracy(correct: usize, total_typed: usize) -> u32 {
    if total_typed == 0 {
        return 100;
    }
    ((correct as f64 / total_typed as f64) * 100.0).round() as u32
}

/// Derived view of a session at one instant. Never stored, always recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub correct: usize,
    pub errors: usize,
    pub wpm: u32,
    pub accuracy: u32,
    pub elapsed_secs: u32,
    pub time_left: u32,
}

impl MetricsSnapshot {
    pub fn compute(tally: Tally, elapsed_secs: u32, time_left: u32) -> Self {
        Self {
            correct: tally.correct,
            errors: tally.errors,
            wpm: wpm(tally.correct, elapsed_secs),
            accuracy: accuracy(tally.correct, tally.total()),
            elapsed_secs,
            time_left,
        }
    }

    pub fn total_typed(&self) -> usize {
        self.correct + self.errors
    }
}
