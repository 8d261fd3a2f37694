use std::path::PathBuf;

use anyhow::{anyhow, Result};
use codepad_core::{CoreHandles, Settings, Theme};
use protocol::Message;
use tokio::sync::mpsc::{self, error::TryRecvError};
use tracing::{debug, info, warn};

use crate::clipboard::ClipboardService;
use crate::constants::{self, messages};
use crate::editor::EditorBuffer;
use crate::types::{Mode, ScrollDirection, ScrollState, StatusMessage};

/// Requests raised by key handlers and applied by the main loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    Run,
    Save,
    Share,
    ClearOutput,
    ToggleTheme,
}

pub struct App {
    pub editor: EditorBuffer,
    pub output: Vec<String>,
    pub mode: Mode,
    pub theme: Theme,
    pub scroll: ScrollState,
    pub status: Option<StatusMessage>,
    pub last_elapsed_ms: Option<u64>,
    pub settings: Settings,
    /// Where theme changes are persisted; `None` keeps them in memory.
    pub settings_path: Option<PathBuf>,
    pub cmd_tx: mpsc::Sender<AppCommand>,
    cmd_rx: mpsc::Receiver<AppCommand>,
    core_in_tx: mpsc::Sender<Message>,
    core_out_rx: Option<mpsc::Receiver<Message>>,
    pending_run: Option<String>,
    clipboard: Box<dyn ClipboardService>,
}

impl App {
    pub fn new(
        settings: Settings,
        handles: CoreHandles,
        clipboard: Box<dyn ClipboardService>,
        initial_code: &str,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(100);
        Self {
            editor: EditorBuffer::from_text(initial_code),
            output: Vec::new(),
            mode: Mode::Idle,
            theme: settings.theme,
            scroll: ScrollState::new(),
            status: None,
            last_elapsed_ms: None,
            settings,
            settings_path: Settings::default_path(),
            cmd_tx,
            cmd_rx,
            core_in_tx: handles.inbound_tx,
            core_out_rx: Some(handles.outbound_rx),
            pending_run: None,
            clipboard,
        }
    }

    pub fn command_sender(&self) -> mpsc::Sender<AppCommand> {
        self.cmd_tx.clone()
    }

    pub fn is_executing(&self) -> bool {
        self.mode == Mode::Executing
    }

    pub fn set_output(&mut self, text: &str) {
        self.output = text.lines().map(str::to_string).collect();
        self.trim_output();
        self.scroll.reset();
    }

    fn trim_output(&mut self) {
        if self.output.len() > constants::MAX_OUTPUT_LINES {
            let excess = self.output.len() - constants::MAX_OUTPUT_LINES;
            self.output.drain(..excess);
        }
    }

    pub fn get_max_scroll(&self) -> usize {
        self.output.len().saturating_sub(1)
    }

    pub fn handle_scroll(&mut self, direction: ScrollDirection, amount: usize) {
        let max = self.get_max_scroll();
        match direction {
            ScrollDirection::Up | ScrollDirection::PageUp => self.scroll.scroll_up(amount),
            ScrollDirection::Down | ScrollDirection::PageDown => self.scroll.scroll_down(amount, max),
            ScrollDirection::Home => self.scroll.reset(),
            ScrollDirection::End => self.scroll.scroll_to_bottom(max),
        }
    }

    pub fn dismiss_status(&mut self) {
        self.status = None;
    }

    /// Apply every queued command.
    pub async fn process_commands(&mut self) -> Result<()> {
        let mut buffered = Vec::new();
        loop {
            match self.cmd_rx.try_recv() {
                Ok(cmd) => buffered.push(cmd),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        for cmd in buffered {
            self.apply_command(cmd).await?;
        }
        Ok(())
    }

    pub async fn apply_command(&mut self, cmd: AppCommand) -> Result<()> {
        debug!(?cmd, "applying command");
        match cmd {
            AppCommand::Run => self.request_run().await,
            AppCommand::Save => self.send_to_core(Message::save_snippet(self.editor.text())).await,
            AppCommand::Share => self.send_to_core(Message::share_request(self.editor.text())).await,
            AppCommand::ClearOutput => {
                self.output.clear();
                self.scroll.reset();
                self.last_elapsed_ms = None;
                Ok(())
            }
            AppCommand::ToggleTheme => {
                self.toggle_theme();
                Ok(())
            }
        }
    }

    async fn request_run(&mut self) -> Result<()> {
        if self.is_executing() {
            self.status = Some(StatusMessage::error(messages::ALREADY_RUNNING));
            return Ok(());
        }

        let request = Message::run_request(self.editor.text());
        if let Message::RunRequest(ref req) = request {
            self.pending_run = Some(req.id.clone());
        }
        self.mode = Mode::Executing;
        self.status = None;

        if let Err(e) = self.send_to_core(request).await {
            self.pending_run = None;
            self.mode = Mode::Idle;
            return Err(e);
        }
        Ok(())
    }

    async fn send_to_core(&mut self, msg: Message) -> Result<()> {
        self.core_in_tx
            .send(msg)
            .await
            .map_err(|_| anyhow!("playground core has stopped"))
    }

    fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        self.settings.theme = self.theme;
        if let Some(path) = &self.settings_path {
            if let Err(e) = self.settings.save_to(path) {
                warn!(error = %e, "failed to persist theme");
            }
        }
    }

    /// Drain replies from the core without blocking.
    pub fn poll_core(&mut self) {
        let Some(rx) = &mut self.core_out_rx else { return };
        let mut buffered = Vec::new();
        loop {
            match rx.try_recv() {
                Ok(msg) => buffered.push(msg),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    warn!("playground core channel closed");
                    self.core_out_rx = None;
                    break;
                }
            }
        }
        for msg in buffered {
            self.apply_core_message(msg);
        }
    }

    /// Wait for the next reply from the core and apply it. Returns `false`
    /// once the core is gone.
    pub async fn next_core_message(&mut self) -> bool {
        let Some(rx) = &mut self.core_out_rx else { return false };
        match rx.recv().await {
            Some(msg) => {
                self.apply_core_message(msg);
                true
            }
            None => {
                self.core_out_rx = None;
                false
            }
        }
    }

    pub fn apply_core_message(&mut self, msg: Message) {
        match msg {
            Message::RunResult(result) => {
                if self.pending_run.as_deref() != Some(result.reply_to.as_str()) {
                    debug!(reply_to = %result.reply_to, "ignoring stale run result");
                    return;
                }
                self.pending_run = None;
                self.mode = Mode::Idle;
                self.last_elapsed_ms = Some(result.elapsed_ms);
                self.set_output(&result.output);
            }
            Message::SnippetSaved(saved) => {
                info!(id = saved.id, name = %saved.name, "snippet saved");
                self.status = Some(StatusMessage::info(format!(
                    "{} ({})",
                    messages::SNIPPET_SAVED,
                    saved.name
                )));
            }
            Message::ShareLink(link) => match self.clipboard.copy_to_clipboard(&link.url) {
                Ok(()) => self.status = Some(StatusMessage::info(messages::LINK_COPIED)),
                Err(e) => {
                    warn!(error = %e, "clipboard copy failed");
                    self.status = Some(StatusMessage::info(format!(
                        "{} {}",
                        messages::COPY_LINK_FALLBACK,
                        link.url
                    )));
                }
            },
            Message::Status(status) => self.status = Some(StatusMessage::from_protocol(&status)),
            Message::RunRequest(_) | Message::SaveSnippet(_) | Message::ShareRequest(_) => {}
        }
    }
}
