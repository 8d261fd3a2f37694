mod components;
mod layout;
mod styles;

use ratatui::Frame;

use crate::app::App;
use components::{EditorPane, HeaderBar, HelpPane, OutputPane, StatusLine};
use layout::LayoutManager;

pub use styles::Styles;

pub struct UI;

impl UI {
    pub fn draw(frame: &mut Frame, app: &App) {
        let chunks = LayoutManager::create_main_layout(frame.area());

        HeaderBar::render(frame, &chunks.header, app);
        EditorPane::render(frame, &chunks.editor, app);
        OutputPane::render(frame, &chunks.output, app);
        HelpPane::render(frame, &chunks.help, app);
        StatusLine::render(frame, &chunks.status, app);

        frame.set_cursor_position(EditorPane::cursor_position(app, &chunks.editor));
    }
}
