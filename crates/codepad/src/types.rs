#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Idle,
    /// A run request is in flight; further runs are refused.
    Executing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub level: StatusLevel,
    pub text: String,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self { level: StatusLevel::Info, text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { level: StatusLevel::Error, text: text.into() }
    }

    pub fn from_protocol(status: &protocol::Status) -> Self {
        match status.level.as_str() {
            "error" | "warn" => Self::error(status.text.clone()),
            _ => Self::info(status.text.clone()),
        }
    }
}

#[derive(Debug, Default)]
pub struct ScrollState {
    pub offset: usize,
}

impl ScrollState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.offset = 0;
    }

    pub fn scroll_up(&mut self, amount: usize) {
        self.offset = self.offset.saturating_sub(amount);
    }

    pub fn scroll_down(&mut self, amount: usize, max: usize) {
        self.offset = std::cmp::min(self.offset + amount, max);
    }

    pub fn scroll_to_bottom(&mut self, max: usize) {
        self.offset = max;
    }
}
