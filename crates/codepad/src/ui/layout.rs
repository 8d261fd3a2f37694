use ratatui::layout::{Constraint, Direction, Layout, Rect};

pub struct MainLayout {
    pub header: Rect,
    pub editor: Rect,
    pub output: Rect,
    pub help: Rect,
    pub status: Rect,
}

pub struct LayoutManager;

impl LayoutManager {
    pub fn create_main_layout(area: Rect) -> MainLayout {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Header
                Constraint::Min(5),    // Editor and output
                Constraint::Length(1), // Shortcuts
                Constraint::Length(1), // Status line
            ])
            .split(area);

        let panes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[1]);

        MainLayout {
            header: rows[0],
            editor: panes[0],
            output: panes[1],
            help: rows[2],
            status: rows[3],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panes_split_the_body_evenly() {
        let layout = LayoutManager::create_main_layout(Rect::new(0, 0, 100, 30));
        assert_eq!(layout.header.height, 1);
        assert_eq!(layout.editor.width, 50);
        assert_eq!(layout.output.width, 50);
        assert_eq!(layout.editor.height, 27);
        assert_eq!(layout.status.y, 29);
    }
}
