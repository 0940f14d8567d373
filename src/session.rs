//! The typing session state machine.
//!
//! A [`Session`] is driven only through [`Session::apply`]; each event
//! returns the side effects the caller has to carry out (start feedback,
//! sound cues, result persistence). Rendering reads the session but never
//! changes it.

use crate::audio::Cue;
use crate::compare::{self, Tally, UnitState};
use crate::metrics::MetricsSnapshot;
use crate::passage::{Language, Passage};
use crate::timer::{SessionClock, TimerTick};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Active,
    Finished,
}

/// What can move a session from one state to another
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    FirstInput,
    PassageConsumed,
    TimeUp,
}

impl SessionState {
    /// Transition table. `None` means the trigger is ignored in this state.
    pub fn next(self, trigger: Trigger) -> Option<SessionState> {
        match (self, trigger) {
            (SessionState::Idle, Trigger::FirstInput) => Some(SessionState::Active),
            (SessionState::Active, Trigger::PassageConsumed) => Some(SessionState::Finished),
            (SessionState::Active, Trigger::TimeUp) => Some(SessionState::Finished),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Completed,
    TimeUp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The whole raw input changed to this text
    Input(String),
    /// A character appended to the raw input
    Type(char),
    /// The last character of the raw input removed
    Backspace,
    /// One second passed
    Tick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Started,
    Cue(Cue),
    Finished(FinishReason),
}

#[derive(Debug, Clone)]
pub struct Session {
    passage: Passage,
    raw_input: String,
    typed: Vec<String>,
    state: SessionState,
    started: bool,
    finish_reason: Option<FinishReason>,
    clock: SessionClock,
}

impl Session {
    pub fn new(passage: Passage, duration_secs: u32) -> Self {
        Self {
            passage,
            raw_input: String::new(),
            typed: Vec::new(),
            state: SessionState::Idle,
            started: false,
            finish_reason: None,
            clock: SessionClock::new(duration_secs),
        }
    }

    pub fn apply(&mut self, event: SessionEvent) -> Vec<Effect> {
        if self.state == SessionState::Finished {
            log::debug!("dropping {event:?} after session finished");
            return Vec::new();
        }

        match event {
            SessionEvent::Tick => self.on_tick(),
            SessionEvent::Input(value) => self.on_input(value),
            SessionEvent::Type(c) => {
                let mut value = self.raw_input.clone();
                value.push(c);
                self.on_input(value)
            }
            SessionEvent::Backspace => {
                let mut value = self.raw_input.clone();
                value.pop();
                self.on_input(value)
            }
        }
    }

    fn on_tick(&mut self) -> Vec<Effect> {
        if self.state != SessionState::Active {
            return Vec::new();
        }
        match self.clock.tick() {
            TimerTick::Expired => self.finish(Trigger::TimeUp),
            TimerTick::Running(_) | TimerTick::Idle => Vec::new(),
        }
    }

    fn on_input(&mut self, value: String) -> Vec<Effect> {
        let mut effects = Vec::new();

        if !self.started && !value.is_empty() {
            if let Some(next) = self.state.next(Trigger::FirstInput) {
                self.started = true;
                self.state = next;
                self.clock.start();
                log::info!(
                    "session started ({}, {}s)",
                    self.passage.language(),
                    self.clock.duration()
                );
                effects.push(Effect::Started);
            }
        }

        let units = self.passage.segmenter().segment(&value);
        if units.len() > self.typed.len() {
            let idx = units.len() - 1;
            let cue = match compare::outcome_at(self.passage.units(), &units, idx) {
                Some(compare::Outcome::Correct) => Cue::Keystroke,
                _ => Cue::Error,
            };
            effects.push(Effect::Cue(cue));
        }

        self.raw_input = value;
        self.typed = units;

        if self.typed.len() >= self.passage.len() {
            effects.extend(self.finish(Trigger::PassageConsumed));
        }

        effects
    }

    fn finish(&mut self, trigger: Trigger) -> Vec<Effect> {
        let Some(next) = self.state.next(trigger) else {
            return Vec::new();
        };
        self.state = next;
        self.clock.stop();

        let reason = match trigger {
            Trigger::TimeUp => FinishReason::TimeUp,
            _ => FinishReason::Completed,
        };
        self.finish_reason = Some(reason);

        let metrics = self.metrics();
        log::info!(
            "session finished ({reason:?}): {} wpm, {}% accuracy, {}s",
            metrics.wpm,
            metrics.accuracy,
            metrics.elapsed_secs
        );

        let mut effects = vec![Effect::Finished(reason)];
        if reason == FinishReason::Completed {
            effects.push(Effect::Cue(Cue::Complete));
        }
        effects
    }

    /// Stops both clocks without finishing, for a restart that discards this session
    pub fn abandon(&mut self) {
        self.clock.stop();
    }

    /// Starts over on `passage` with the same duration, whatever state this session was in
    pub fn reset(&mut self, passage: Passage) {
        self.passage = passage;
        self.clear_input();
        self.clock.reset();
    }

    /// Changes the session length. Refused while active; otherwise input is
    /// discarded and the clock shows the new duration without running.
    pub fn set_duration(&mut self, duration_secs: u32) -> bool {
        if self.is_active() {
            return false;
        }
        self.clear_input();
        self.clock.set_duration(duration_secs);
        true
    }

    fn clear_input(&mut self) {
        self.raw_input.clear();
        self.typed.clear();
        self.state = SessionState::Idle;
        self.started = false;
        self.finish_reason = None;
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn has_started(&self) -> bool {
        self.started
    }

    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    pub fn has_finished(&self) -> bool {
        self.state == SessionState::Finished
    }

    pub fn finish_reason(&self) -> Option<FinishReason> {
        self.finish_reason
    }

    pub fn passage(&self) -> &Passage {
        &self.passage
    }

    pub fn language(&self) -> Language {
        self.passage.language()
    }

    pub fn raw_input(&self) -> &str {
        &self.raw_input
    }

    pub fn typed_units(&self) -> &[String] {
        &self.typed
    }

    pub fn duration_secs(&self) -> u32 {
        self.clock.duration()
    }

    pub fn time_left(&self) -> u32 {
        self.clock.time_left()
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.clock.elapsed_secs()
    }

    pub fn clock_running(&self) -> bool {
        self.clock.is_running()
    }

    pub fn tally(&self) -> Tally {
        compare::compare(self.passage.units(), &self.typed)
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        MetricsSnapshot::compute(self.tally(), self.elapsed_secs(), self.time_left())
    }

    pub fn unit_states(&self) -> Vec<UnitState> {
        compare::classify(self.passage.units(), &self.typed)
    }

    pub fn progress_percent(&self) -> f64 {
        let total = self.passage.len().max(1) as f64;
        (self.typed.len() as f64 / total * 100.0).min(100.0)
    }
}
