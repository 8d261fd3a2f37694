use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::thread;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use super::engine::{CaptureEngine, ExecutionLimits};
use super::transcript::{ExecutionResult, Sink, Transcript};
use crate::error::Result;
use crate::ports::RunnerPort;
use crate::settings::Settings;

pub(super) const RUNNER_STACK_SIZE: usize = 16 * 1024 * 1024;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5_000);

/// Runs each snippet on its own thread under a wall-clock deadline.
///
/// When the deadline passes the partial transcript is returned with a timeout
/// fault. A thread cannot be killed, so the abandoned one keeps running until
/// the loop and recursion limits stop it; its sink is closed so nothing it
/// records is observed. Long-lived hosts should use [`ProcessRunner`], which
/// kills its worker instead.
///
/// [`ProcessRunner`]: super::worker::ProcessRunner
#[derive(Debug, Clone)]
pub struct IsolatedRunner {
    engine: CaptureEngine,
    timeout: Duration,
}

impl IsolatedRunner {
    pub fn new(engine: CaptureEngine, timeout: Duration) -> Self {
        Self { engine, timeout }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let limits = ExecutionLimits {
            loop_iteration_limit: settings.loop_iteration_limit,
            recursion_limit: settings.recursion_limit,
        };
        Self::new(CaptureEngine::new(limits), Duration::from_millis(settings.run_timeout_ms))
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn run(&self, source: &str) -> ExecutionResult {
        let sink = Sink::new();
        let (tx, rx) = oneshot::channel();

        let engine = self.engine;
        let thread_sink = sink.clone();
        let code = source.to_string();
        let spawned = thread::Builder::new()
            .name("snippet-runner".to_string())
            .stack_size(RUNNER_STACK_SIZE)
            .spawn(move || {
                let outcome =
                    panic::catch_unwind(AssertUnwindSafe(|| engine.run_into(&code, &thread_sink)));
                let _ = tx.send(outcome);
            });
        if let Err(e) = spawned {
            warn!(error = %e, "could not spawn runner thread");
            return ExecutionResult::SystemFault(format!("failed to start runner: {e}"));
        }

        let outcome = match tokio::time::timeout(self.timeout, rx).await {
            Ok(outcome) => outcome,
            Err(_) => return self.timed_out(&sink),
        };

        match outcome {
            Ok(Ok(Ok(()))) => finish(sink.close()),
            Ok(Ok(Err(e))) => ExecutionResult::SystemFault(e.to_string()),
            Ok(Err(payload)) => {
                let reason = panic_message(payload.as_ref());
                warn!(%reason, "runner thread panicked");
                ExecutionResult::SystemFault(format!("runner panicked: {reason}"))
            }
            Err(_) => ExecutionResult::SystemFault(
                "runner exited without reporting a result".to_string(),
            ),
        }
    }

    fn timed_out(&self, sink: &Sink) -> ExecutionResult {
        let ms = self.timeout.as_millis() as u64;
        warn!(timeout_ms = ms, "snippet exceeded its deadline");
        if let Err(e) = sink.fault(format!("execution timed out after {ms} ms")) {
            return ExecutionResult::SystemFault(e.to_string());
        }
        finish(sink.close())
    }
}

impl Default for IsolatedRunner {
    fn default() -> Self {
        Self::new(CaptureEngine::default(), DEFAULT_TIMEOUT)
    }
}

#[async_trait]
impl RunnerPort for IsolatedRunner {
    async fn run(&self, code: &str) -> ExecutionResult {
        debug!(bytes = code.len(), "running snippet");
        IsolatedRunner::run(self, code).await
    }
}

fn finish(transcript: Result<Transcript>) -> ExecutionResult {
    match transcript {
        Ok(t) => ExecutionResult::Transcript(t),
        Err(e) => ExecutionResult::SystemFault(e.to_string()),
    }
}

pub(super) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
