use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Paragraph, Row, Table, Widget},
};

use crate::store::{HighScore, HistoryEntry};
use crate::ui::theme::Palette;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

fn format_date(score: &HighScore) -> String {
    score
        .date
        .with_timezone(&chrono::Local)
        .format(DATE_FORMAT)
        .to_string()
}

fn render_empty(message: &str, block: Block, palette: &Palette, area: Rect, buf: &mut Buffer) {
    Paragraph::new(Span::styled(message, palette.italic()))
        .block(block)
        .render(area, buf);
}

/// Top scores for one language, best first
pub fn render_high_scores(
    scores: &[HighScore],
    language_name: &str,
    palette: &Palette,
    area: Rect,
    buf: &mut Buffer,
) {
    let block = Block::bordered()
        .title(Line::styled(format!(" High scores · {language_name} "), palette.accent()))
        .style(palette.base());

    if scores.is_empty() {
        render_empty("No scores yet. Finish a session to get on the board.", block, palette, area, buf);
        return;
    }

    let header = Row::new(vec!["#", "WPM", "Accuracy", "Time", "Date"]).style(palette.bold());
    let rows = scores.iter().enumerate().map(|(idx, score)| {
        let style = if idx == 0 { palette.accent() } else { palette.base() };
        Row::new(vec![
            format!("{}", idx + 1),
            score.wpm.to_string(),
            format!("{}%", score.accuracy),
            format!("{}s", score.duration),
            format_date(score),
        ])
        .style(style)
    });

    Table::new(
        rows,
        [
            Constraint::Length(3),
            Constraint::Length(6),
            Constraint::Length(10),
            Constraint::Length(6),
            Constraint::Min(16),
        ],
    )
    .header(header)
    .block(block)
    .render(area, buf);
}

/// Recent sessions across both languages, newest first
pub fn render_history(entries: &[HistoryEntry], palette: &Palette, area: Rect, buf: &mut Buffer) {
    let block = Block::bordered()
        .title(Line::styled(" Recent sessions ", palette.accent()))
        .style(palette.base());

    if entries.is_empty() {
        render_empty("No sessions recorded.", block, palette, area, buf);
        return;
    }

    let header = Row::new(vec!["WPM", "Accuracy", "Language", "Time", "Date"]).style(palette.bold());
    let rows = entries.iter().map(|entry| {
        let score = &entry.score;
        Row::new(vec![
            score.wpm.to_string(),
            format!("{}%", score.accuracy),
            score.language.native_name().to_string(),
            format!("{}s", score.duration),
            format_date(score),
        ])
    });

    Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(6),
            Constraint::Min(16),
        ],
    )
    .header(header)
    .block(block)
    .style(palette.base())
    .render(area, buf);
}
