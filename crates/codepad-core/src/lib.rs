pub mod capture;
pub mod error;
pub mod ports;
pub mod settings;
pub mod snippets;

pub use capture::{
    CaptureEngine, ExecutionLimits, ExecutionResult, IsolatedRunner, ProcessRunner,
};
pub use error::{PlaygroundError, Result};
pub use settings::{Settings, Theme};
pub use snippets::{JsonFileStore, MemoryStore, Snippet};

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{info, warn};

use ports::{OutboundPort, RunnerPort, SnippetStore};

/// Headless playground core: consumes protocol messages, emits protocol messages.
///
/// Messages are handled one at a time, so at most one snippet runs at once.
pub struct PlaygroundCore<R: RunnerPort, S: SnippetStore, O: OutboundPort> {
    runner: R,
    store: S,
    outbound: O,
    share_base_url: String,
}

impl<R: RunnerPort, S: SnippetStore, O: OutboundPort> PlaygroundCore<R, S, O> {
    pub fn new(runner: R, store: S, outbound: O, share_base_url: impl Into<String>) -> Self {
        Self { runner, store, outbound, share_base_url: share_base_url.into() }
    }

    /// Entry point for inbound messages
    pub async fn handle(&self, msg: protocol::Message) -> Result<()> {
        match msg {
            protocol::Message::RunRequest(req) => self.handle_run(req).await,
            protocol::Message::SaveSnippet(req) => self.handle_save(req).await,
            protocol::Message::ShareRequest(req) => self.handle_share(req).await,
            // outbound-only variants
            protocol::Message::RunResult(_)
            | protocol::Message::SnippetSaved(_)
            | protocol::Message::ShareLink(_)
            | protocol::Message::Status(_) => Ok(()),
        }
    }

    async fn handle_run(&self, req: protocol::RunRequest) -> Result<()> {
        let started = Instant::now();
        let result = self.runner.run(&req.code).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;
        info!(id = %req.id, elapsed_ms, system_fault = result.is_system_fault(), "run finished");
        self.outbound
            .send(protocol::Message::run_result(req.id, result.render(), elapsed_ms))
            .await
    }

    async fn handle_save(&self, req: protocol::SaveSnippet) -> Result<()> {
        match self.store.save(&req.code).await {
            Ok(snippet) => self.outbound.send(snippet.to_message()).await,
            Err(e) => {
                warn!(error = %e, "saving snippet failed");
                self.outbound
                    .send(protocol::Message::status("error", format!("save failed: {e}")))
                    .await
            }
        }
    }

    async fn handle_share(&self, req: protocol::ShareRequest) -> Result<()> {
        match snippets::share_url(&self.share_base_url, &req.code) {
            Ok(url) => self.outbound.send(protocol::Message::share_link(url)).await,
            Err(e) => {
                warn!(error = %e, base = %self.share_base_url, "building share link failed");
                self.outbound
                    .send(protocol::Message::status("error", format!("share failed: {e}")))
                    .await
            }
        }
    }
}

#[derive(Clone)]
pub struct ChannelOutbound(pub mpsc::Sender<protocol::Message>);

#[async_trait]
impl OutboundPort for ChannelOutbound {
    async fn send(&self, msg: protocol::Message) -> Result<()> {
        self.0.send(msg).await.map_err(|e| PlaygroundError::Channel(e.to_string()))
    }
}

pub struct CoreHandles {
    pub inbound_tx: mpsc::Sender<protocol::Message>,
    pub outbound_rx: mpsc::Receiver<protocol::Message>,
}

/// Spawn the core's processing loop and hand back its channels.
pub fn start_core<R, S>(runner: R, store: S, share_base_url: impl Into<String>) -> CoreHandles
where
    R: RunnerPort + 'static,
    S: SnippetStore + 'static,
{
    let (in_tx, mut in_rx) = mpsc::channel::<protocol::Message>(100);
    let (out_tx, out_rx) = mpsc::channel::<protocol::Message>(100);

    let core = Arc::new(PlaygroundCore::new(runner, store, ChannelOutbound(out_tx), share_base_url));
    tokio::spawn(async move {
        while let Some(msg) = in_rx.recv().await {
            if let Err(e) = core.handle(msg).await {
                warn!(error = %e, "core failed to handle message");
            }
        }
    });

    CoreHandles { inbound_tx: in_tx, outbound_rx: out_rx }
}

// Simple in-crate mocks for demo/testing
pub mod mocks {
    use super::*;

    /// Returns the same result for every snippet and remembers what it was asked to run.
    pub struct ScriptedRunner {
        result: ExecutionResult,
        seen: std::sync::Mutex<Vec<String>>,
    }

    impl ScriptedRunner {
        pub fn new(result: ExecutionResult) -> Self {
            Self { result, seen: std::sync::Mutex::new(Vec::new()) }
        }

        pub fn seen(&self) -> Vec<String> {
            self.seen.lock().map(|s| s.clone()).unwrap_or_default()
        }
    }

    #[async_trait]
    impl RunnerPort for ScriptedRunner {
        async fn run(&self, code: &str) -> ExecutionResult {
            if let Ok(mut seen) = self.seen.lock() {
                seen.push(code.to_string());
            }
            self.result.clone()
        }
    }

    /// Fails every operation, for exercising error paths.
    pub struct BrokenStore;

    #[async_trait]
    impl SnippetStore for BrokenStore {
        async fn save(&self, _code: &str) -> Result<Snippet> {
            Err(PlaygroundError::Io(std::io::Error::other("disk unavailable")))
        }
        async fn list(&self) -> Result<Vec<Snippet>> {
            Ok(Vec::new())
        }
        async fn get(&self, _id: i64) -> Result<Option<Snippet>> {
            Ok(None)
        }
        async fn delete(&self, _id: i64) -> Result<bool> {
            Ok(false)
        }
    }
}
