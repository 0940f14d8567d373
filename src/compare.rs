//! Index-aligned comparison of typed units against the passage.
//!
//! There is no realignment: one skipped or inserted unit shifts every later
//! unit and each of them counts as an error.

#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    Incorrect,
}

#[derive(Clone, Debug, Copy, PartialEq, Eq, Default)]
pub struct Tally {
    pub correct: usize,
    pub errors: usize,
}

impl Tally {
    pub fn total(&self) -> usize {
        self.correct + self.errors
    }
}

/// Outcome of typed unit `idx`. Anything typed past the end of the passage is incorrect.
pub fn outcome_at<S: AsRef<str>>(passage: &[S], typed: &[S], idx: usize) -> Option<Outcome> {
    let unit = typed.get(idx)?;
    match passage.get(idx) {
        Some(expected) if expected.as_ref() == unit.as_ref() => Some(Outcome::Correct),
        _ => Some(Outcome::Incorrect),
    }
}

pub fn compare<S: AsRef<str>>(passage: &[S], typed: &[S]) -> Tally {
    let correct = typed
        .iter()
        .zip(passage.iter())
        .filter(|(t, p)| t.as_ref() == p.as_ref())
        .count();

    Tally {
        correct,
        errors: typed.len() - correct,
    }
}

/// Display state of one passage unit
#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub enum UnitState {
    Pending,
    Cursor,
    Correct,
    Incorrect,
}

pub fn classify<S: AsRef<str>>(passage: &[S], typed: &[S]) -> Vec<UnitState> {
    (0..passage.len())
        .map(|idx| match outcome_at(passage, typed, idx) {
            Some(Outcome::Correct) => UnitState::Correct,
            Some(Outcome::Incorrect) => UnitState::Incorrect,
            None if idx == typed.len() => UnitState::Cursor,
            None => UnitState::Pending,
        })
        .collect()
}
