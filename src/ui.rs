pub mod keyboard;
pub mod panels;
pub mod theme;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Gauge, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, Screen};
use crate::compare::UnitState;
use crate::session::FinishReason;
use keyboard::{KeyboardReference, KEYBOARD_HEIGHT};
use theme::Palette;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;
/// Remaining seconds at which the clock turns to the warning color
pub const WARNING_SECS: u32 = 10;
const SPACE_MARKER: &str = "·";
/// Smallest terminal that also fits the on-screen keyboard
const KEYBOARD_MIN_HEIGHT: u16 = 18;
const KEYBOARD_MIN_WIDTH: u16 = 60;

fn clock(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let palette = Palette::for_theme(self.config().theme);
        Block::default().style(palette.base()).render(area, buf);

        match self.screen() {
            Screen::Typing => render_typing(self, &palette, area, buf),
            Screen::Results => render_results(self, &palette, area, buf),
            Screen::HighScores | Screen::History => render_panel(self, &palette, area, buf),
        }
    }
}

fn header(app: &App, palette: &Palette) -> Line<'static> {
    let config = app.config();
    let sound = if config.sound.any_enabled() {
        "sound on"
    } else {
        "muted"
    };
    Line::from(vec![
        Span::styled("likhit", palette.accent()),
        Span::styled(" · ", palette.dim()),
        Span::styled(config.language.native_name(), palette.bold()),
        Span::styled(" · ", palette.dim()),
        Span::styled(format!("{}s", config.duration_secs), palette.bold()),
        Span::styled(" · ", palette.dim()),
        Span::styled(sound, palette.dim()),
    ])
}

fn stats_line(app: &App, palette: &Palette) -> Line<'static> {
    let session = app.session();
    let metrics = session.metrics();
    let time_style = if session.has_started() && (1..=WARNING_SECS).contains(&metrics.time_left) {
        palette.warning()
    } else {
        palette.bold()
    };
    Line::from(vec![
        Span::styled("WPM ", palette.dim()),
        Span::styled(metrics.wpm.to_string(), palette.bold()),
        Span::styled("   Accuracy ", palette.dim()),
        Span::styled(format!("{}%", metrics.accuracy), palette.bold()),
        Span::styled("   Time ", palette.dim()),
        Span::styled(clock(metrics.time_left), time_style),
    ])
}

/// The passage with each unit colored by how it was typed
fn passage_spans(app: &App, palette: &Palette) -> Vec<Span<'static>> {
    let session = app.session();
    session
        .passage()
        .units()
        .iter()
        .zip(session.unit_states())
        .map(|(unit, state)| match state {
            UnitState::Correct => Span::styled(unit.clone(), palette.correct()),
            UnitState::Incorrect if unit.trim().is_empty() => {
                Span::styled(SPACE_MARKER, palette.incorrect())
            }
            UnitState::Incorrect => Span::styled(unit.clone(), palette.incorrect()),
            UnitState::Cursor => Span::styled(unit.clone(), palette.cursor()),
            UnitState::Pending => Span::styled(unit.clone(), palette.dim()),
        })
        .collect()
}

fn render_typing(app: &App, palette: &Palette, area: Rect, buf: &mut Buffer) {
    let session = app.session();
    let max_width = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
    let text_width = session.passage().text().width();
    let keyboard_height =
        if area.height >= KEYBOARD_MIN_HEIGHT && area.width >= KEYBOARD_MIN_WIDTH {
            KEYBOARD_HEIGHT
        } else {
            0
        };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(keyboard_height),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    Paragraph::new(header(app, palette))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    Paragraph::new(stats_line(app, palette))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    let progress = session.progress_percent();
    Gauge::default()
        .gauge_style(palette.accent())
        .ratio((progress / 100.0).clamp(0.0, 1.0))
        .label(Span::styled(format!("{progress:.0}%"), palette.bold()))
        .render(chunks[2], buf);

    Paragraph::new(Line::from(passage_spans(app, palette)))
        .alignment(if text_width <= max_width as usize {
            Alignment::Center
        } else {
            Alignment::Left
        })
        .wrap(Wrap { trim: false })
        .render(chunks[4], buf);

    if keyboard_height > 0 {
        KeyboardReference::new(app.config().language, app.last_typed(), palette)
            .render(chunks[5], buf);
    }

    let hint = if session.has_started() {
        ""
    } else {
        "start typing to begin"
    };
    Paragraph::new(Span::styled(hint, palette.italic()))
        .alignment(Alignment::Center)
        .render(chunks[6], buf);

    let legend = if session.is_active() {
        "(←) retry / (→) new / (esc)ape"
    } else {
        "(←) retry / (→) new / (tab) scores / (ctrl-l) language / (ctrl-d) duration / (ctrl-s) sound / (ctrl-t) theme / (esc)ape"
    };
    Paragraph::new(Span::styled(legend, palette.italic()))
        .wrap(Wrap { trim: true })
        .render(chunks[7], buf);
}

fn render_results(app: &App, palette: &Palette, area: Rect, buf: &mut Buffer) {
    let session = app.session();
    let metrics = session.metrics();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(8),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    Paragraph::new(header(app, palette))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    let title = match session.finish_reason() {
        Some(FinishReason::TimeUp) => "Time's up!",
        _ => "Passage complete!",
    };

    let mut lines = vec![Line::styled(title, palette.accent())];
    if app.last_result().is_some_and(|r| r.is_new_high_score) {
        lines.push(Line::styled("★ New high score! ★", palette.warning()));
    } else {
        lines.push(Line::default());
    }
    lines.push(Line::default());
    lines.push(Line::from(vec![
        Span::styled(metrics.wpm.to_string(), palette.bold()),
        Span::styled(" wpm   ", palette.dim()),
        Span::styled(format!("{}%", metrics.accuracy), palette.bold()),
        Span::styled(" accuracy", palette.dim()),
    ]));
    lines.push(Line::styled(
        format!(
            "{} correct · {} errors · {}s of {}s",
            metrics.correct,
            metrics.errors,
            metrics.elapsed_secs,
            session.duration_secs()
        ),
        palette.base(),
    ));
    lines.push(Line::default());
    if let Some(best) = app.best_score() {
        lines.push(Line::styled(
            format!("best {} wpm at {}% accuracy", best.wpm, best.accuracy),
            palette.dim(),
        ));
    }

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .render(chunks[2], buf);

    Paragraph::new(Span::styled(
        "(r)etry / (n)ew / (h)igh scores / histor(y) / (l)anguage / (d)uration / (s)ound / (t)heme / (esc)ape",
        palette.italic(),
    ))
    .wrap(Wrap { trim: true })
    .render(chunks[4], buf);
}

fn render_panel(app: &App, palette: &Palette, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);

    Paragraph::new(header(app, palette))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    let legend = if app.screen() == Screen::History {
        panels::render_history(app.history(), palette, chunks[1], buf);
        "(c)lear / (tab) high scores / (b)ack / (r)etry / (n)ew / (esc)ape"
    } else {
        panels::render_high_scores(
            app.leaderboard(),
            app.config().language.native_name(),
            palette,
            chunks[1],
            buf,
        );
        "(tab) history / (b)ack / (r)etry / (n)ew / (esc)ape"
    };

    Paragraph::new(Span::styled(legend, palette.italic()))
        .wrap(Wrap { trim: true })
        .render(chunks[2], buf);
}
