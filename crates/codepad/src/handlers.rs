use anyhow::{anyhow, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{App, AppCommand};
use crate::constants::{PAGE_SCROLL, TAB_WIDTH};
use crate::types::ScrollDirection;

pub struct InputHandler;

impl InputHandler {
    /// Returns `true` when the user asked to quit.
    pub async fn handle_key(app: &mut App, key: KeyEvent) -> Result<bool> {
        if !Self::is_valid_event(key) {
            return Ok(false);
        }

        if Self::is_quit(key) {
            return Ok(true);
        }

        if let Some(cmd) = Self::command_for(key) {
            app.cmd_tx
                .send(cmd)
                .await
                .map_err(|_| anyhow!("command channel closed"))?;
            return Ok(false);
        }

        Self::handle_editing(app, key);
        Ok(false)
    }

    fn is_valid_event(key: KeyEvent) -> bool {
        matches!(key.kind, KeyEventKind::Press)
    }

    fn is_quit(key: KeyEvent) -> bool {
        key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q'))
    }

    fn command_for(key: KeyEvent) -> Option<AppCommand> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::F(5) => Some(AppCommand::Run),
            KeyCode::Enter if ctrl => Some(AppCommand::Run),
            KeyCode::Char(c) if ctrl => match c.to_ascii_lowercase() {
                'r' => Some(AppCommand::Run),
                's' => Some(AppCommand::Save),
                'o' => Some(AppCommand::Share),
                'l' => Some(AppCommand::ClearOutput),
                't' => Some(AppCommand::ToggleTheme),
                _ => None,
            },
            _ => None,
        }
    }

    fn handle_editing(app: &mut App, key: KeyEvent) {
        match (key.code, key.modifiers) {
            (KeyCode::PageUp, _) => app.handle_scroll(ScrollDirection::PageUp, PAGE_SCROLL),
            (KeyCode::PageDown, _) => app.handle_scroll(ScrollDirection::PageDown, PAGE_SCROLL),
            (KeyCode::Esc, _) => app.dismiss_status(),
            (KeyCode::Enter, _) => app.editor.newline(),
            (KeyCode::Tab, _) => app.editor.insert_str(&" ".repeat(TAB_WIDTH)),
            (KeyCode::Backspace, _) => app.editor.backspace(),
            (KeyCode::Delete, _) => app.editor.delete(),
            (KeyCode::Left, _) => app.editor.move_left(),
            (KeyCode::Right, _) => app.editor.move_right(),
            (KeyCode::Up, _) => app.editor.move_up(),
            (KeyCode::Down, _) => app.editor.move_down(),
            (KeyCode::Home, _) => app.editor.move_home(),
            (KeyCode::End, _) => app.editor.move_end(),
            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => app.editor.insert_char(c),
            _ => {}
        }
    }
}
