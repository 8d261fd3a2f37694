use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::styles::Styles;
use crate::app::App;
use crate::constants::messages;
use crate::types::StatusLevel;

pub struct HeaderBar;

impl HeaderBar {
    pub fn render(frame: &mut Frame, area: &Rect, app: &App) {
        let (state, state_style) = if app.is_executing() {
            ("Running...", Styles::running_indicator())
        } else {
            ("Ready", Styles::ready_indicator())
        };
        let mut spans = vec![
            Span::raw(" JS  JavaScript Playground  "),
            Span::styled(format!("[{}]", state), state_style),
        ];
        if let Some(ms) = app.last_elapsed_ms {
            spans.push(Span::raw(format!("  last run {} ms", ms)));
        }
        spans.push(Span::raw(format!("  theme: {}", app.theme.as_str())));

        let widget = Paragraph::new(Line::from(spans)).style(Styles::header(app.theme));
        frame.render_widget(widget, *area);
    }
}

pub struct EditorPane;

impl EditorPane {
    pub fn render(frame: &mut Frame, area: &Rect, app: &App) {
        let block = Self::block(app);
        let inner = block.inner(*area);
        let (top, left) = Self::viewport(app, inner);

        let lines: Vec<Line> = app.editor.lines().iter().map(|l| Line::from(l.as_str())).collect();
        let widget = Paragraph::new(lines)
            .block(block)
            .style(Styles::base(app.theme))
            .scroll((top as u16, left as u16));
        frame.render_widget(widget, *area);
    }

    fn block(app: &App) -> Block<'static> {
        Block::default()
            .title(" Editor ")
            .borders(Borders::ALL)
            .border_style(Styles::pane_border(app.theme))
    }

    /// First visible row and column, chosen so the cursor stays on screen.
    pub fn viewport(app: &App, inner: Rect) -> (usize, usize) {
        let cursor = app.editor.cursor();
        let height = inner.height.max(1) as usize;
        let width = inner.width.max(1) as usize;
        let top = (cursor.row + 1).saturating_sub(height);
        let left = (cursor.col + 1).saturating_sub(width);
        (top, left)
    }

    /// Terminal cell for the editor cursor.
    pub fn cursor_position(app: &App, area: &Rect) -> (u16, u16) {
        let inner = Self::block(app).inner(*area);
        let (top, left) = Self::viewport(app, inner);
        let cursor = app.editor.cursor();
        let x = inner.x + (cursor.col - left) as u16;
        let y = inner.y + (cursor.row - top) as u16;
        (x, y)
    }
}

pub struct OutputPane;

impl OutputPane {
    pub fn render(frame: &mut Frame, area: &Rect, app: &App) {
        let block = Block::default()
            .title(" Output ")
            .borders(Borders::ALL)
            .border_style(Styles::pane_border(app.theme));

        let widget = if app.is_executing() {
            Paragraph::new(messages::EXECUTING).style(Styles::running_indicator())
        } else if app.output.is_empty() {
            Paragraph::new(Self::placeholder()).style(Styles::dimmed())
        } else {
            let lines: Vec<Line> = app
                .output
                .iter()
                .map(|line| Line::styled(line.as_str(), Styles::for_output_line(line, app.theme)))
                .collect();
            Paragraph::new(lines)
                .style(Styles::base(app.theme))
                .scroll((app.scroll.offset as u16, 0))
        };

        frame.render_widget(widget.block(block).wrap(Wrap { trim: false }), *area);
    }

    fn placeholder() -> Vec<Line<'static>> {
        vec![
            Line::from("Press Ctrl+R to execute your JavaScript code and see the output here."),
            Line::from(""),
            Line::from("Tips:"),
            Line::from("  • Use console.log() to print values"),
            Line::from("  • Try console.error() for error messages"),
            Line::from("  • Use console.warn() and console.info() for different message types"),
            Line::from("  • Press F5 or Ctrl+Enter to run code quickly"),
        ]
    }
}

pub struct HelpPane;

impl HelpPane {
    pub fn render(frame: &mut Frame, area: &Rect, _app: &App) {
        let mut spans = Vec::new();
        for (key, desc) in Self::shortcuts() {
            spans.push(Span::styled(format!(" {} ", key), Styles::help_key()));
            spans.push(Span::styled(format!("{} ", desc), Styles::help_desc()));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), *area);
    }

    fn shortcuts() -> [(&'static str, &'static str); 7] {
        [
            ("Ctrl+R", "Run"),
            ("Ctrl+S", "Save"),
            ("Ctrl+O", "Share"),
            ("Ctrl+L", "Clear"),
            ("Ctrl+T", "Theme"),
            ("PgUp/PgDn", "Scroll"),
            ("Ctrl+Q", "Quit"),
        ]
    }
}

pub struct StatusLine;

impl StatusLine {
    pub fn render(frame: &mut Frame, area: &Rect, app: &App) {
        let Some(status) = &app.status else {
            return;
        };
        let style = match status.level {
            StatusLevel::Info => Styles::status_info(),
            StatusLevel::Error => Styles::status_error(),
        };
        let widget = Paragraph::new(status.text.as_str())
            .style(style)
            .alignment(Alignment::Left);
        frame.render_widget(widget, *area);
    }
}
