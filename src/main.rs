use anyhow::Context;
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use likhit::{
    app::{App, Step},
    app_dirs::AppDirs,
    audio::{Audio, BellSink, CueSettings},
    config::{Config, ConfigStore, FileConfigStore, Theme},
    logging::init_file_logger,
    passage::{EmbeddedPassages, FixedPassage, Language, PassageProvider},
    runtime::{AppEvent, CrosstermEventSource, FixedTicker, Runner},
    store::Scoreboard,
    timer::DURATION_OPTIONS,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    io::{self, stdin},
    path::PathBuf,
};

/// typing practice for nepali and english in the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Timed typing practice for Nepali and English. Devanagari is scored per grapheme cluster, and high scores and recent sessions are kept between runs."
)]
pub struct Cli {
    /// language of the practice passages
    #[clap(short = 'l', long, value_enum)]
    language: Option<Language>,

    /// session length in seconds: 30, 60 or 120
    #[clap(short = 'd', long, value_parser = parse_duration)]
    duration: Option<u32>,

    /// custom passage to type instead of a random one
    #[clap(short = 'p', long)]
    passage: Option<String>,

    /// disable all sound cues
    #[clap(long)]
    mute: bool,

    /// no cue for correct keystrokes
    #[clap(long)]
    no_keystroke_sound: bool,

    /// no cue for mistakes
    #[clap(long)]
    no_error_sound: bool,

    /// no cue when a passage is completed
    #[clap(long)]
    no_complete_sound: bool,

    /// start with the light theme
    #[clap(long)]
    light: bool,

    /// directory for high scores and history
    #[clap(long)]
    data_dir: Option<PathBuf>,
}

fn parse_duration(value: &str) -> Result<u32, String> {
    let secs: u32 = value
        .parse()
        .map_err(|_| format!("`{value}` is not a number of seconds"))?;
    if DURATION_OPTIONS.contains(&secs) {
        Ok(secs)
    } else {
        Err(format!("duration must be one of {DURATION_OPTIONS:?}"))
    }
}

impl Cli {
    /// Flags given on the command line win over the stored config
    fn apply(&self, mut config: Config) -> Config {
        if let Some(language) = self.language {
            config.language = language;
        }
        if let Some(duration) = self.duration {
            config.duration_secs = duration;
        }
        if self.mute {
            config.sound = CueSettings::muted();
        }
        if self.no_keystroke_sound {
            config.sound.keystroke = false;
        }
        if self.no_error_sound {
            config.sound.error = false;
        }
        if self.no_complete_sound {
            config.sound.complete = false;
        }
        if self.light {
            config.theme = Theme::Light;
        }
        config
    }

    fn passages(&self) -> anyhow::Result<Box<dyn PassageProvider>> {
        match &self.passage {
            Some(text) => Ok(Box::new(FixedPassage(text.clone()))),
            None => Ok(Box::new(
                EmbeddedPassages::load().context("bundled passages are unreadable")?,
            )),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Some(path) = AppDirs::log_path() {
        init_file_logger(&path);
    }
    log::info!("likhit {} starting", env!("CARGO_PKG_VERSION"));

    let config_store = FileConfigStore::new();
    let config = cli.apply(config_store.load());
    let data_dir = cli
        .data_dir
        .clone()
        .or_else(AppDirs::data_dir)
        .context("could not determine a data directory")?;
    log::info!("scores stored in {}", data_dir.display());

    // --mute only changes the cue settings, so ctrl-s can still unmute
    let audio = Audio::new(Box::new(BellSink::stdout()), config.sound);
    let mut app = App::new(
        config,
        cli.passages()?,
        Box::new(Scoreboard::open(&data_dir)),
        audio,
    )
    .context("could not prepare a passage")?
    .with_config_store(Box::new(config_store));

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);
    app.shutdown();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        log::error!("exiting after error: {e:#}");
    }
    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> anyhow::Result<()> {
    let mut runner = Runner::new(CrosstermEventSource::new(), FixedTicker::every_second());

    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        let step = match runner.step() {
            AppEvent::Key(key) => app.on_key(key),
            AppEvent::Tick => app.on_tick(),
            AppEvent::Resize => Step::Continue,
        };

        match step {
            Step::Quit => break,
            Step::Started => runner.restart_ticks(),
            Step::Continue => {}
        }
    }

    log::info!("quitting");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use likhit::store::MemoryKeyValueStore;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["likhit"]);

        assert_eq!(cli.language, None);
        assert_eq!(cli.duration, None);
        assert_eq!(cli.passage, None);
        assert!(!cli.mute);
        assert!(!cli.light);
        assert_eq!(cli.apply(Config::default()), Config::default());
    }

    #[test]
    fn test_cli_language() {
        let cli = Cli::parse_from(["likhit", "-l", "english"]);
        assert_eq!(cli.language, Some(Language::English));

        let cli = Cli::parse_from(["likhit", "--language", "nepali"]);
        assert_eq!(cli.language, Some(Language::Nepali));

        assert!(Cli::try_parse_from(["likhit", "-l", "hindi"]).is_err());
    }

    #[test]
    fn test_cli_duration_limited_to_options() {
        let cli = Cli::parse_from(["likhit", "-d", "30"]);
        assert_eq!(cli.duration, Some(30));

        let cli = Cli::parse_from(["likhit", "--duration", "120"]);
        assert_eq!(cli.duration, Some(120));

        assert!(Cli::try_parse_from(["likhit", "-d", "45"]).is_err());
        assert!(Cli::try_parse_from(["likhit", "-d", "soon"]).is_err());
    }

    #[test]
    fn test_cli_custom_passage() {
        let cli = Cli::parse_from(["likhit", "-p", "hello world"]);
        assert_eq!(cli.passage, Some("hello world".to_string()));
    }

    #[test]
    fn test_cli_overrides_stored_config() {
        let stored = Config {
            language: Language::Nepali,
            duration_secs: 60,
            ..Config::default()
        };
        let cli = Cli::parse_from([
            "likhit",
            "-l",
            "english",
            "-d",
            "30",
            "--no-error-sound",
            "--light",
        ]);
        let config = cli.apply(stored);

        assert_eq!(config.language, Language::English);
        assert_eq!(config.duration_secs, 30);
        assert_eq!(config.theme, Theme::Light);
        assert_eq!(
            config.sound,
            CueSettings {
                keystroke: true,
                error: false,
                complete: true,
            }
        );
    }

    #[test]
    fn test_cli_sound_flags_independent() {
        let cli = Cli::parse_from(["likhit", "--no-keystroke-sound", "--no-complete-sound"]);
        let sound = cli.apply(Config::default()).sound;
        assert!(!sound.keystroke);
        assert!(sound.error);
        assert!(!sound.complete);
    }

    #[test]
    fn test_cli_mute_silences_every_cue() {
        let cli = Cli::parse_from(["likhit", "--mute"]);
        assert_eq!(cli.apply(Config::default()).sound, CueSettings::muted());
    }

    #[derive(Clone, Default)]
    struct CapturedOutput(Arc<Mutex<Vec<u8>>>);

    impl Write for CapturedOutput {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_muted_start_can_be_unmuted_in_app() {
        let cli = Cli::parse_from(["likhit", "--mute", "-l", "english"]);
        let config = cli.apply(Config::default());
        let sound = config.sound;
        let terminal = CapturedOutput::default();
        let sink = {
            let terminal = terminal.clone();
            BellSink::new(move || Ok(Box::new(terminal.clone()) as Box<dyn Write + Send>))
        };
        let mut app = App::new(
            config,
            Box::new(FixedPassage("ab".into())),
            Box::new(Scoreboard::new(MemoryKeyValueStore::default())),
            Audio::new(Box::new(sink), sound),
        )
        .unwrap();

        app.on_key(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE));
        assert!(terminal.0.lock().unwrap().is_empty());

        app.on_key(KeyEvent::new(KeyCode::Left, KeyModifiers::NONE));
        app.on_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL));
        assert!(app.config().sound.error);

        app.on_key(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE));
        assert_eq!(*terminal.0.lock().unwrap(), b"\x07".to_vec());
    }

    #[test]
    fn test_cli_data_dir() {
        let cli = Cli::parse_from(["likhit", "--data-dir", "/tmp/likhit-scores"]);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/likhit-scores")));
    }

    #[test]
    fn test_cli_passages_from_flag() {
        let cli = Cli::parse_from(["likhit", "-p", "custom text"]);
        let provider = cli.passages().unwrap();
        assert_eq!(provider.random_passage(Language::Nepali), "custom text");
    }
}
