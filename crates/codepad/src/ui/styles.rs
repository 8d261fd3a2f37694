use codepad_core::Theme;
use ratatui::style::{Color, Modifier, Style};

use crate::constants::prefixes;

pub struct Styles;

impl Styles {
    pub fn base(theme: Theme) -> Style {
        match theme {
            Theme::Light => Style::default().fg(Color::Black).bg(Color::White),
            Theme::Dark => Style::default().fg(Color::White).bg(Color::Black),
        }
    }

    pub fn dimmed() -> Style {
        Style::default().fg(Color::DarkGray)
    }

    pub fn header(theme: Theme) -> Style {
        let bg = match theme {
            Theme::Light => Color::Blue,
            Theme::Dark => Color::DarkGray,
        };
        Style::default().fg(Color::White).bg(bg).add_modifier(Modifier::BOLD)
    }

    pub fn running_indicator() -> Style {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    }

    pub fn ready_indicator() -> Style {
        Style::default().fg(Color::Green)
    }

    pub fn pane_border(theme: Theme) -> Style {
        match theme {
            Theme::Light => Style::default().fg(Color::Blue),
            Theme::Dark => Style::default().fg(Color::Gray),
        }
    }

    pub fn help_key() -> Style {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    }

    pub fn help_desc() -> Style {
        Style::default().fg(Color::Gray)
    }

    pub fn status_info() -> Style {
        Style::default().fg(Color::Green)
    }

    pub fn status_error() -> Style {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    }

    pub fn for_output_line(line: &str, theme: Theme) -> Style {
        if line.starts_with(prefixes::SYSTEM_ERROR) || line.starts_with(prefixes::EXECUTION_ERROR) {
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        } else if line.starts_with(prefixes::ERROR) {
            Style::default().fg(Color::Red)
        } else if line.starts_with(prefixes::WARN) {
            Style::default().fg(Color::Yellow)
        } else if line.starts_with(prefixes::INFO) {
            Style::default().fg(Color::Cyan)
        } else if line.starts_with(prefixes::LOG) {
            Self::base(theme)
        } else {
            Self::dimmed()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fault_lines_are_bold_red() {
        let style = Styles::for_output_line("EXECUTION ERROR: boom", Theme::Dark);
        assert_eq!(style.fg, Some(Color::Red));
        assert!(style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn channel_prefixes_pick_colors() {
        assert_eq!(Styles::for_output_line("WARN: w", Theme::Light).fg, Some(Color::Yellow));
        assert_eq!(Styles::for_output_line("INFO: i", Theme::Light).fg, Some(Color::Cyan));
        assert_eq!(Styles::for_output_line("ERROR: e", Theme::Light).fg, Some(Color::Red));
        assert_eq!(Styles::for_output_line("LOG: l", Theme::Dark).fg, Some(Color::White));
    }
}
