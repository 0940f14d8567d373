use ratatui::style::{Color, Modifier, Style};

use crate::config::Theme;

/// Colors used across every screen for one theme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Color,
    pub text: Color,
    pub muted: Color,
    pub correct: Color,
    pub incorrect: Color,
    pub accent: Color,
    pub warning: Color,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                background: Color::Reset,
                text: Color::White,
                muted: Color::DarkGray,
                correct: Color::Green,
                incorrect: Color::Red,
                accent: Color::Magenta,
                warning: Color::LightRed,
            },
            Theme::Light => Self {
                background: Color::Rgb(250, 248, 240),
                text: Color::Rgb(30, 30, 30),
                muted: Color::Rgb(150, 150, 150),
                correct: Color::Rgb(22, 128, 60),
                incorrect: Color::Rgb(200, 30, 30),
                accent: Color::Rgb(120, 60, 170),
                warning: Color::Rgb(200, 30, 30),
            },
        }
    }

    pub fn base(&self) -> Style {
        Style::default().fg(self.text).bg(self.background)
    }

    pub fn bold(&self) -> Style {
        self.base().add_modifier(Modifier::BOLD)
    }

    pub fn dim(&self) -> Style {
        self.base().fg(self.muted)
    }

    pub fn italic(&self) -> Style {
        self.dim().add_modifier(Modifier::ITALIC)
    }

    pub fn correct(&self) -> Style {
        self.bold().fg(self.correct)
    }

    pub fn incorrect(&self) -> Style {
        self.bold().fg(self.incorrect)
    }

    pub fn cursor(&self) -> Style {
        self.bold().add_modifier(Modifier::UNDERLINED)
    }

    pub fn accent(&self) -> Style {
        self.bold().fg(self.accent)
    }

    pub fn warning(&self) -> Style {
        self.bold().fg(self.warning)
    }
}
