//! On-screen keyboard for the current language

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

use super::theme::Palette;
use crate::keymap::{self, ROWS, SHIFTED_ROWS};
use crate::passage::Language;

/// Three key rows plus the layout caption
pub const KEYBOARD_HEIGHT: u16 = 4;
const CAP_WIDTH: usize = 3;
/// Shown under combining marks that have nothing to sit on
const BASE_MARK: &str = "◌";

/// Key rows with the key of the last typed character highlighted. The
/// shifted layer is shown while that key needs shift.
pub struct KeyboardReference<'a> {
    language: Language,
    last_typed: Option<char>,
    palette: &'a Palette,
}

impl<'a> KeyboardReference<'a> {
    pub fn new(language: Language, last_typed: Option<char>, palette: &'a Palette) -> Self {
        Self {
            language,
            last_typed,
            palette,
        }
    }
}

fn cap(label: &str) -> String {
    let label = if label.width() == 0 {
        format!("{BASE_MARK}{label}")
    } else {
        label.to_string()
    };
    let pad = CAP_WIDTH.saturating_sub(label.width());
    let left = pad / 2;
    format!("{}{}{}", " ".repeat(left), label, " ".repeat(pad - left))
}

impl Widget for KeyboardReference<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let active = self
            .last_typed
            .and_then(|c| keymap::key_for(self.language, c));
        let rows = if active.is_some_and(keymap::is_shifted) {
            SHIFTED_ROWS
        } else {
            ROWS
        };

        let mut lines: Vec<Line> = rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let mut spans = vec![Span::raw(" ".repeat(i * 2))];
                for key in row.chars() {
                    let style = if Some(key) == active {
                        self.palette.accent().add_modifier(Modifier::REVERSED)
                    } else {
                        self.palette.base()
                    };
                    spans.push(Span::styled(cap(&keymap::label(self.language, key)), style));
                    spans.push(Span::styled(" ", self.palette.base()));
                }
                Line::from(spans)
            })
            .collect();
        lines.push(Line::styled(
            keymap::layout_name(self.language),
            self.palette.italic(),
        ));

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .render(area, buf);
    }
}
