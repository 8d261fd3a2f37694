use anyhow::{anyhow, Result};

pub trait ClipboardService: Send {
    fn copy_to_clipboard(&mut self, text: &str) -> Result<()>;
}

/// System clipboard via `arboard`, opened on first use.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&mut self) -> Result<&mut arboard::Clipboard> {
        if self.inner.is_none() {
            let clipboard = arboard::Clipboard::new()
                .map_err(|e| anyhow!("Failed to open clipboard: {}", e))?;
            self.inner = Some(clipboard);
        }
        self.inner.as_mut().ok_or_else(|| anyhow!("Clipboard unavailable"))
    }
}

impl ClipboardService for SystemClipboard {
    fn copy_to_clipboard(&mut self, text: &str) -> Result<()> {
        self.handle()?
            .set_text(text.to_owned())
            .map_err(|e| anyhow!("Failed to write to clipboard: {}", e))
    }
}

/// Keeps copied text in memory; used by tests and when no display is present.
#[derive(Default)]
pub struct MemoryClipboard {
    pub contents: Option<String>,
    pub fail: bool,
}

impl ClipboardService for MemoryClipboard {
    fn copy_to_clipboard(&mut self, text: &str) -> Result<()> {
        if self.fail {
            return Err(anyhow!("clipboard unavailable"));
        }
        self.contents = Some(text.to_string());
        Ok(())
    }
}
