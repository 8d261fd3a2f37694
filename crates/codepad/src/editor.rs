//! Line-based text buffer backing the editor pane.

/// Cursor position; `col` counts characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorBuffer {
    lines: Vec<String>,
    cursor: Position,
}

impl EditorBuffer {
    pub fn new() -> Self {
        Self { lines: vec![String::new()], cursor: Position::default() }
    }

    pub fn from_text(text: &str) -> Self {
        let lines = text.split('\n').map(|l| l.trim_end_matches('\r').to_string()).collect();
        Self { lines, cursor: Position::default() }
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Replace the whole contents and put the cursor at the start.
    pub fn set_text(&mut self, text: &str) {
        *self = Self::from_text(text);
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn cursor(&self) -> Position {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.lines.len() == 1 && self.lines[0].is_empty()
    }

    fn line_len(&self, row: usize) -> usize {
        self.lines.get(row).map(|l| l.chars().count()).unwrap_or(0)
    }

    fn byte_index(line: &str, col: usize) -> usize {
        line.char_indices().nth(col).map(|(i, _)| i).unwrap_or(line.len())
    }

    pub fn insert_char(&mut self, ch: char) {
        if ch == '\n' {
            self.newline();
            return;
        }
        let Position { row, col } = self.cursor;
        let line = &mut self.lines[row];
        let at = Self::byte_index(line, col);
        line.insert(at, ch);
        self.cursor.col += 1;
    }

    pub fn insert_str(&mut self, text: &str) {
        for ch in text.chars() {
            if ch != '\r' {
                self.insert_char(ch);
            }
        }
    }

    /// Split the current line at the cursor.
    pub fn newline(&mut self) {
        let Position { row, col } = self.cursor;
        let line = &mut self.lines[row];
        let at = Self::byte_index(line, col);
        let rest = line.split_off(at);
        self.lines.insert(row + 1, rest);
        self.cursor = Position::new(row + 1, 0);
    }

    /// Delete the character before the cursor, joining lines at column 0.
    pub fn backspace(&mut self) {
        let Position { row, col } = self.cursor;
        if col > 0 {
            let line = &mut self.lines[row];
            let at = Self::byte_index(line, col - 1);
            line.remove(at);
            self.cursor.col -= 1;
        } else if row > 0 {
            let current = self.lines.remove(row);
            let prev_len = self.line_len(row - 1);
            self.lines[row - 1].push_str(&current);
            self.cursor = Position::new(row - 1, prev_len);
        }
    }

    /// Delete the character under the cursor, joining the next line at end of line.
    pub fn delete(&mut self) {
        let Position { row, col } = self.cursor;
        if col < self.line_len(row) {
            let line = &mut self.lines[row];
            let at = Self::byte_index(line, col);
            line.remove(at);
        } else if row + 1 < self.lines.len() {
            let next = self.lines.remove(row + 1);
            self.lines[row].push_str(&next);
        }
    }

    pub fn move_left(&mut self) {
        if self.cursor.col > 0 {
            self.cursor.col -= 1;
        } else if self.cursor.row > 0 {
            self.cursor.row -= 1;
            self.cursor.col = self.line_len(self.cursor.row);
        }
    }

    pub fn move_right(&mut self) {
        if self.cursor.col < self.line_len(self.cursor.row) {
            self.cursor.col += 1;
        } else if self.cursor.row + 1 < self.lines.len() {
            self.cursor = Position::new(self.cursor.row + 1, 0);
        }
    }

    pub fn move_up(&mut self) {
        if self.cursor.row > 0 {
            self.cursor.row -= 1;
            self.clamp_col();
        }
    }

    pub fn move_down(&mut self) {
        if self.cursor.row + 1 < self.lines.len() {
            self.cursor.row += 1;
            self.clamp_col();
        }
    }

    pub fn move_home(&mut self) {
        self.cursor.col = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor.col = self.line_len(self.cursor.row);
    }

    fn clamp_col(&mut self) {
        self.cursor.col = self.cursor.col.min(self.line_len(self.cursor.row));
    }
}

impl Default for EditorBuffer {
    fn default() -> Self {
        Self::new()
    }
}
