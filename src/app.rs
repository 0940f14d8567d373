use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::audio::Audio;
use crate::config::{Config, ConfigStore};
use crate::passage::{Language, Passage, PassageError, PassageProvider};
use crate::session::{Effect, FinishReason, Session, SessionEvent};
use crate::store::{HighScore, HistoryEntry, ScoreStore, SHOWN_PER_LANGUAGE};
use crate::timer::DURATION_OPTIONS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Typing,
    Results,
    HighScores,
    History,
}

/// What the event loop should do after the app handled an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    /// A session just went active; its clocks start now
    Started,
    Quit,
}

/// Outcome of the session that just ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionResult {
    pub entry: HistoryEntry,
    pub reason: FinishReason,
    pub is_new_high_score: bool,
}

pub struct App {
    config: Config,
    session: Session,
    passages: Box<dyn PassageProvider>,
    scores: Box<dyn ScoreStore>,
    audio: Audio,
    config_store: Option<Box<dyn ConfigStore>>,
    screen: Screen,
    return_screen: Screen,
    last_result: Option<SessionResult>,
    high_scores: Vec<HighScore>,
    leaderboard: Vec<HighScore>,
    best: Option<HighScore>,
    history: Vec<HistoryEntry>,
    last_typed: Option<char>,
}

impl App {
    pub fn new(
        config: Config,
        passages: Box<dyn PassageProvider>,
        scores: Box<dyn ScoreStore>,
        audio: Audio,
    ) -> Result<Self, PassageError> {
        let passage = Passage::new(passages.random_passage(config.language), config.language)?;
        let session = Session::new(passage, config.duration_secs);

        let mut app = Self {
            config,
            session,
            passages,
            scores,
            audio,
            config_store: None,
            screen: Screen::Typing,
            return_screen: Screen::Typing,
            last_result: None,
            high_scores: Vec::new(),
            leaderboard: Vec::new(),
            best: None,
            history: Vec::new(),
            last_typed: None,
        };
        app.reload_scores();
        Ok(app)
    }

    /// Settings changed in the app are written back through `store`
    pub fn with_config_store(mut self, store: Box<dyn ConfigStore>) -> Self {
        self.config_store = Some(store);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn last_result(&self) -> Option<&SessionResult> {
        self.last_result.as_ref()
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Leaderboard rows for the current language
    pub fn leaderboard(&self) -> &[HighScore] {
        &self.leaderboard
    }

    /// Best recorded score for the current language
    pub fn best_score(&self) -> Option<&HighScore> {
        self.best.as_ref()
    }

    pub fn all_high_scores(&self) -> &[HighScore] {
        &self.high_scores
    }

    /// Last character typed into the current session
    pub fn last_typed(&self) -> Option<char> {
        self.last_typed
    }

    pub fn on_tick(&mut self) -> Step {
        self.dispatch(SessionEvent::Tick)
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Step {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if key.code == KeyCode::Esc || (ctrl && key.code == KeyCode::Char('c')) {
            return Step::Quit;
        }

        match self.screen {
            Screen::Typing => self.on_typing_key(key, ctrl),
            Screen::Results => self.on_results_key(key),
            Screen::HighScores | Screen::History => self.on_panel_key(key),
        }
    }

    fn on_typing_key(&mut self, key: KeyEvent, ctrl: bool) -> Step {
        if ctrl {
            match key.code {
                KeyCode::Char('l') => self.toggle_language(),
                KeyCode::Char('d') => self.cycle_duration(),
                KeyCode::Char('s') => self.toggle_sound(),
                KeyCode::Char('t') => self.toggle_theme(),
                _ => {}
            }
            return Step::Continue;
        }

        match key.code {
            KeyCode::Char(c) => self.dispatch(SessionEvent::Type(c)),
            KeyCode::Backspace => self.dispatch(SessionEvent::Backspace),
            KeyCode::Left => {
                self.restart(true);
                Step::Continue
            }
            KeyCode::Right => {
                self.restart(false);
                Step::Continue
            }
            KeyCode::Tab if !self.session.is_active() => {
                self.open_panel(Screen::HighScores);
                Step::Continue
            }
            _ => Step::Continue,
        }
    }

    fn on_results_key(&mut self, key: KeyEvent) -> Step {
        match key.code {
            KeyCode::Char('r') | KeyCode::Left => self.restart(true),
            KeyCode::Char('n') | KeyCode::Right | KeyCode::Enter => self.restart(false),
            KeyCode::Char('h') | KeyCode::Tab => self.open_panel(Screen::HighScores),
            KeyCode::Char('y') => self.open_panel(Screen::History),
            KeyCode::Char('l') => self.toggle_language(),
            KeyCode::Char('d') => self.cycle_duration(),
            KeyCode::Char('s') => self.toggle_sound(),
            KeyCode::Char('t') => self.toggle_theme(),
            _ => {}
        }
        Step::Continue
    }

    fn on_panel_key(&mut self, key: KeyEvent) -> Step {
        match key.code {
            KeyCode::Tab => {
                let next = if self.screen == Screen::HighScores {
                    Screen::History
                } else {
                    Screen::HighScores
                };
                self.screen = next;
            }
            KeyCode::Char('c') if self.screen == Screen::History => self.clear_history(),
            KeyCode::Char('b') | KeyCode::Backspace => self.screen = self.return_screen,
            KeyCode::Char('r') => self.restart(true),
            KeyCode::Char('n') => self.restart(false),
            _ => {}
        }
        Step::Continue
    }

    fn open_panel(&mut self, panel: Screen) {
        if matches!(self.screen, Screen::Typing | Screen::Results) {
            self.return_screen = self.screen;
        }
        self.screen = panel;
    }

    /// Feeds one event to the session and carries out its effects
    pub fn dispatch(&mut self, event: SessionEvent) -> Step {
        let mut step = Step::Continue;
        if let SessionEvent::Type(c) = &event {
            if !self.session.has_finished() {
                self.last_typed = Some(*c);
            }
        }
        for effect in self.session.apply(event) {
            match effect {
                Effect::Started => step = Step::Started,
                Effect::Cue(cue) => self.audio.play(cue),
                Effect::Finished(reason) => self.record_result(reason),
            }
        }
        step
    }

    fn record_result(&mut self, reason: FinishReason) {
        let metrics = self.session.metrics();
        let entry = HistoryEntry::now(
            metrics.wpm,
            metrics.accuracy,
            self.session.language(),
            self.session.duration_secs(),
        );

        let is_new_high_score = self
            .scores
            .save_high_score(&entry.score)
            .unwrap_or_else(|e| {
                log::warn!("could not save high score: {e}");
                false
            });
        if let Err(e) = self.scores.save_history(&entry) {
            log::warn!("could not save history: {e}");
        }
        self.reload_scores();

        self.last_result = Some(SessionResult {
            entry,
            reason,
            is_new_high_score,
        });
        self.screen = Screen::Results;
    }

    fn reload_scores(&mut self) {
        let language = self.config.language;
        self.high_scores = self.scores.high_scores();
        self.leaderboard = self.scores.top_scores(language, SHOWN_PER_LANGUAGE);
        self.best = self.scores.best_score(language);
        self.history = self.scores.history();
    }

    /// Discards the current session and starts over, optionally on the same passage
    pub fn restart(&mut self, same_passage: bool) {
        let passage = if same_passage {
            self.session.passage().clone()
        } else {
            self.fresh_passage()
        };
        self.session.reset(passage);
        self.last_typed = None;
        self.last_result = None;
        self.screen = Screen::Typing;
        self.return_screen = Screen::Typing;
    }

    fn fresh_passage(&self) -> Passage {
        let language = self.config.language;
        let text = self.passages.random_passage(language);
        Passage::new(text, language).unwrap_or_else(|e| {
            log::warn!("could not use new passage: {e}");
            self.session.passage().clone()
        })
    }

    pub fn set_language(&mut self, language: Language) {
        if self.session.is_active() {
            return;
        }
        self.config.language = language;
        self.persist(|c| c.language = language);
        self.reload_scores();
        self.restart(false);
    }

    pub fn toggle_language(&mut self) {
        self.set_language(self.config.language.toggle());
    }

    pub fn set_duration(&mut self, duration_secs: u32) {
        if !DURATION_OPTIONS.contains(&duration_secs) {
            return;
        }
        if !self.session.set_duration(duration_secs) {
            return;
        }
        self.config.duration_secs = duration_secs;
        self.persist(|c| c.duration_secs = duration_secs);
        self.restart(false);
    }

    pub fn cycle_duration(&mut self) {
        let idx = DURATION_OPTIONS
            .iter()
            .position(|d| *d == self.config.duration_secs)
            .map_or(0, |i| (i + 1) % DURATION_OPTIONS.len());
        self.set_duration(DURATION_OPTIONS[idx]);
    }

    pub fn toggle_sound(&mut self) {
        let sound = self.config.sound.toggle_all();
        self.config.sound = sound;
        self.audio.set_settings(sound);
        self.persist(|c| c.sound = sound);
    }

    pub fn toggle_theme(&mut self) {
        let theme = self.config.theme.toggle();
        self.config.theme = theme;
        self.persist(|c| c.theme = theme);
    }

    pub fn clear_history(&mut self) {
        if let Err(e) = self.scores.clear_history() {
            log::warn!("could not clear history: {e}");
        }
        self.reload_scores();
    }

    /// Changes one field of the stored config. Run-only overrides in
    /// `self.config` are never written.
    fn persist(&self, update: impl FnOnce(&mut Config)) {
        let Some(store) = &self.config_store else {
            return;
        };
        let mut stored = store.load();
        update(&mut stored);
        if let Err(e) = store.save(&stored) {
            log::warn!("could not save config: {e}");
        }
    }

    /// Stops the clocks and releases the audio output
    pub fn shutdown(&mut self) {
        self.session.abandon();
        self.audio.shutdown();
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("config", &self.config)
            .field("session", &self.session)
            .field("screen", &self.screen)
            .field("last_result", &self.last_result)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioSink, Cue, CueSettings};
    use crate::config::{FileConfigStore, Theme};
    use crate::passage::FixedPassage;
    use crate::session::SessionState;
    use crate::store::{MemoryKeyValueStore, Scoreboard};
    use std::sync::{Arc, Mutex};

    #[derive(Default, Clone)]
    struct Recorder(Arc<Mutex<Vec<Cue>>>);

    impl AudioSink for Recorder {
        fn play(&self, cue: Cue) {
            self.0.lock().unwrap().push(cue);
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn app_with(text: &str, config: Config) -> (App, Recorder) {
        let recorder = Recorder::default();
        let audio = Audio::new(Box::new(recorder.clone()), config.sound);
        let app = App::new(
            config,
            Box::new(FixedPassage(text.to_string())),
            Box::new(Scoreboard::new(MemoryKeyValueStore::default())),
            audio,
        )
        .unwrap();
        (app, recorder)
    }

    fn english(text: &str) -> (App, Recorder) {
        let config = Config {
            language: Language::English,
            ..Config::default()
        };
        app_with(text, config)
    }

    fn type_str(app: &mut App, text: &str) -> Vec<Step> {
        text.chars().map(|c| app.on_key(key(KeyCode::Char(c)))).collect()
    }

    #[test]
    fn test_first_key_reports_started_once() {
        let (mut app, _) = english("cats");
        let steps = type_str(&mut app, "ca");
        assert_eq!(steps, vec![Step::Started, Step::Continue]);
    }

    #[test]
    fn test_completing_passage_records_result() {
        let (mut app, recorder) = english("cat");
        type_str(&mut app, "cat");

        assert_eq!(app.screen(), Screen::Results);
        let result = app.last_result().unwrap();
        assert_eq!(result.reason, FinishReason::Completed);
        assert_eq!(result.entry.score.accuracy, 100);
        assert_eq!(result.entry.score.language, Language::English);
        assert_eq!(result.entry.score.duration, 60);
        // zero elapsed seconds means zero wpm, which is never a high score
        assert!(!result.is_new_high_score);
        assert_eq!(app.history().len(), 1);
        assert_eq!(app.all_high_scores().len(), 1);

        assert_eq!(
            *recorder.0.lock().unwrap(),
            vec![Cue::Keystroke, Cue::Keystroke, Cue::Keystroke, Cue::Complete]
        );
    }

    #[test]
    fn test_result_with_elapsed_time_is_high_score() {
        let (mut app, _) = english("cat");
        type_str(&mut app, "ca");
        for _ in 0..6 {
            app.on_tick();
        }
        type_str(&mut app, "t");
        let result = app.last_result().unwrap();
        assert_eq!(result.entry.score.wpm, 6);
        assert!(result.is_new_high_score);
        assert_eq!(app.leaderboard().len(), 1);
        assert_eq!(app.best_score().unwrap().wpm, 6);

        app.toggle_language();
        assert!(app.leaderboard().is_empty());
        assert!(app.best_score().is_none());
    }

    #[test]
    fn test_timer_expiry_records_one_result() {
        let config = Config {
            language: Language::English,
            duration_secs: 30,
            ..Config::default()
        };
        let (mut app, recorder) = app_with("a long passage to type", config);
        type_str(&mut app, "a");
        for _ in 0..40 {
            app.on_tick();
        }
        assert_eq!(app.screen(), Screen::Results);
        assert_eq!(app.last_result().unwrap().reason, FinishReason::TimeUp);
        assert_eq!(app.history().len(), 1);
        assert!(!recorder.0.lock().unwrap().contains(&Cue::Complete));
    }

    #[test]
    fn test_ticks_without_typing_do_nothing() {
        let (mut app, _) = english("cat");
        for _ in 0..100 {
            assert_eq!(app.on_tick(), Step::Continue);
        }
        assert_eq!(app.session().state(), SessionState::Idle);
        assert!(app.history().is_empty());
    }

    #[test]
    fn test_typing_after_finish_is_ignored() {
        let (mut app, _) = english("hi");
        type_str(&mut app, "hi");
        app.restart(true);
        type_str(&mut app, "hi");
        assert_eq!(app.history().len(), 2);

        // results screen keys do not reach the session
        app.on_key(key(KeyCode::Char('x')));
        assert_eq!(app.session().raw_input(), "hi");
        assert_eq!(app.history().len(), 2);
    }

    #[test]
    fn test_errors_play_error_cue_and_mute_silences() {
        let config = Config {
            language: Language::English,
            sound: CueSettings {
                keystroke: false,
                error: true,
                complete: false,
            },
            ..Config::default()
        };
        let (mut app, recorder) = app_with("cat", config);
        type_str(&mut app, "cxt");
        assert_eq!(*recorder.0.lock().unwrap(), vec![Cue::Error]);
        assert_eq!(app.last_result().unwrap().entry.score.accuracy, 67);
    }

    #[test]
    fn test_restart_keeps_or_replaces_session() {
        let (mut app, _) = english("cat");
        type_str(&mut app, "c");
        app.on_key(key(KeyCode::Left));
        assert_eq!(app.session().state(), SessionState::Idle);
        assert_eq!(app.session().passage().text(), "cat");
        assert!(!app.session().clock_running());

        type_str(&mut app, "c");
        app.on_key(key(KeyCode::Right));
        assert_eq!(app.session().state(), SessionState::Idle);
        assert_eq!(app.screen(), Screen::Typing);
    }

    #[test]
    fn test_language_and_duration_locked_while_active() {
        let (mut app, _) = english("cat");
        type_str(&mut app, "c");
        app.on_key(ctrl('l'));
        app.on_key(ctrl('d'));
        assert_eq!(app.config().language, Language::English);
        assert_eq!(app.config().duration_secs, 60);
        assert!(app.session().is_active());
    }

    #[test]
    fn test_language_change_while_idle_resets_session() {
        let (mut app, _) = english("cat");
        app.on_key(ctrl('l'));
        assert_eq!(app.config().language, Language::Nepali);
        assert_eq!(app.session().language(), Language::Nepali);
    }

    #[test]
    fn test_duration_cycles_through_options() {
        let (mut app, _) = english("cat");
        app.on_key(ctrl('d'));
        assert_eq!(app.config().duration_secs, 120);
        assert_eq!(app.session().time_left(), 120);
        assert!(!app.session().clock_running());
        app.on_key(ctrl('d'));
        assert_eq!(app.config().duration_secs, 30);
        app.set_duration(45);
        assert_eq!(app.config().duration_secs, 30);
    }

    #[test]
    fn test_panels_and_clear_history() {
        let (mut app, _) = english("hi");
        type_str(&mut app, "hi");
        app.on_key(key(KeyCode::Char('y')));
        assert_eq!(app.screen(), Screen::History);
        app.on_key(key(KeyCode::Char('c')));
        assert!(app.history().is_empty());
        app.on_key(key(KeyCode::Tab));
        assert_eq!(app.screen(), Screen::HighScores);
        app.on_key(key(KeyCode::Char('b')));
        assert_eq!(app.screen(), Screen::Results);
    }

    #[test]
    fn test_tab_opens_leaderboard_only_when_idle() {
        let (mut app, _) = english("cat");
        app.on_key(key(KeyCode::Tab));
        assert_eq!(app.screen(), Screen::HighScores);
        app.on_key(key(KeyCode::Backspace));
        assert_eq!(app.screen(), Screen::Typing);

        type_str(&mut app, "c");
        app.on_key(key(KeyCode::Tab));
        assert_eq!(app.screen(), Screen::Typing);
    }

    #[test]
    fn test_quit_keys() {
        let (mut app, _) = english("cat");
        assert_eq!(app.on_key(key(KeyCode::Esc)), Step::Quit);
        assert_eq!(app.on_key(ctrl('c')), Step::Quit);
    }

    #[test]
    fn test_settings_persist_through_config_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let (app, _) = english("cat");
        let mut app = app.with_config_store(Box::new(FileConfigStore::with_path(&path)));

        app.on_key(ctrl('t'));
        app.on_key(ctrl('s'));

        let saved = FileConfigStore::with_path(&path).load();
        assert_eq!(saved.theme, Theme::Light);
        assert_eq!(saved.sound, CueSettings::muted());
        // language was never changed in the app, so it keeps the stored value
        assert_eq!(saved.language, Language::Nepali);
    }

    #[test]
    fn test_run_only_overrides_are_not_saved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        store.save(&Config::default()).unwrap();

        // as if started with --light --mute
        let config = Config {
            theme: Theme::Light,
            sound: CueSettings::muted(),
            ..Config::default()
        };
        let (app, _) = app_with("cat", config);
        let mut app = app.with_config_store(Box::new(FileConfigStore::with_path(&path)));

        app.on_key(ctrl('l'));
        app.on_key(ctrl('d'));
        assert_eq!(app.config().theme, Theme::Light);

        let saved = store.load();
        assert_eq!(saved.language, Language::English);
        assert_eq!(saved.duration_secs, 120);
        assert_eq!(saved.theme, Theme::Dark);
        assert_eq!(saved.sound, CueSettings::default());
    }

    #[test]
    fn test_last_typed_follows_input() {
        let (mut app, _) = english("ab");
        assert_eq!(app.last_typed(), None);
        type_str(&mut app, "a");
        assert_eq!(app.last_typed(), Some('a'));
        type_str(&mut app, "b");
        // dropped after finish
        app.dispatch(SessionEvent::Type('z'));
        assert_eq!(app.last_typed(), Some('b'));
        app.on_key(key(KeyCode::Char('n')));
        assert_eq!(app.last_typed(), None);
    }

    #[test]
    fn test_restart_keeps_duration_and_resets_clock() {
        let (mut app, _) = english("cats");
        app.on_key(ctrl('d'));
        type_str(&mut app, "ca");
        app.on_tick();
        assert_eq!(app.session().time_left(), 119);

        app.on_key(key(KeyCode::Left));
        assert_eq!(app.session().state(), SessionState::Idle);
        assert_eq!(app.session().duration_secs(), 120);
        assert_eq!(app.session().time_left(), 120);
        assert_eq!(app.session().raw_input(), "");
    }

    #[test]
    fn test_blank_passage_is_rejected() {
        let result = App::new(
            Config::default(),
            Box::new(FixedPassage("  ".into())),
            Box::new(Scoreboard::new(MemoryKeyValueStore::default())),
            Audio::silent(),
        );
        assert!(matches!(result, Err(PassageError::Empty)));
    }
}
