//! Out-of-process execution.
//!
//! The parent writes a snippet to a child's stdin and reads back one JSON
//! event per line. A child that outlives its deadline is killed, so a runaway
//! snippet never keeps burning CPU after its partial output has been shown.

use std::io::Write;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{ChildStdin, ChildStdout, Command};
use tracing::{debug, warn};

use super::engine::CaptureEngine;
use super::runner::{panic_message, RUNNER_STACK_SIZE};
use super::transcript::{ExecutionResult, LogEntry, Sink, Transcript};
use crate::error::Result;
use crate::ports::RunnerPort;

/// One line of worker output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WorkerEvent {
    Entry(LogEntry),
    Fault { message: String },
    SystemFault { message: String },
    Done,
}

/// Child side: run `source` and stream its events to `out` as they happen.
pub fn serve_worker<W: Write>(engine: CaptureEngine, source: &str, out: &mut W) -> Result<()> {
    let (tx, rx) = mpsc::channel();
    let entry_tx = tx.clone();
    let sink = Sink::observed(move |entry| {
        let _ = entry_tx.send(WorkerEvent::Entry(entry.clone()));
    });

    let code = source.to_string();
    let handle = thread::Builder::new()
        .name("snippet-worker".to_string())
        .stack_size(RUNNER_STACK_SIZE)
        .spawn(move || {
            let last = match engine.run_with_sink(&code, &sink) {
                ExecutionResult::Transcript(t) => {
                    t.fault().map(|f| WorkerEvent::Fault { message: f.to_string() })
                }
                ExecutionResult::SystemFault(message) => Some(WorkerEvent::SystemFault { message }),
            };
            if let Some(event) = last {
                let _ = tx.send(event);
            }
            let _ = tx.send(WorkerEvent::Done);
        })?;

    let mut done = false;
    for event in rx {
        done = matches!(event, WorkerEvent::Done);
        write_event(out, &event)?;
    }

    if let Err(payload) = handle.join() {
        let reason = panic_message(payload.as_ref());
        warn!(%reason, "worker thread panicked");
        write_event(out, &WorkerEvent::SystemFault { message: format!("runner panicked: {reason}") })?;
    }
    if !done {
        write_event(out, &WorkerEvent::Done)?;
    }
    Ok(())
}

fn write_event<W: Write>(out: &mut W, event: &WorkerEvent) -> Result<()> {
    let line = serde_json::to_string(event)?;
    writeln!(out, "{line}")?;
    out.flush()?;
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum Completion {
    Done,
    SystemFault(String),
    Closed,
}

/// Fold worker events into `transcript` until the worker reports it is done.
async fn read_events<R>(reader: R, transcript: &mut Transcript) -> Result<Completion>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<WorkerEvent>(&line)? {
            WorkerEvent::Entry(entry) => transcript.push(entry.channel, entry.message),
            WorkerEvent::Fault { message } => transcript.set_fault(message),
            WorkerEvent::SystemFault { message } => return Ok(Completion::SystemFault(message)),
            WorkerEvent::Done => return Ok(Completion::Done),
        }
    }
    Ok(Completion::Closed)
}

async fn exchange(
    mut stdin: ChildStdin,
    stdout: ChildStdout,
    source: &str,
    transcript: &mut Transcript,
) -> Result<Completion> {
    stdin.write_all(source.as_bytes()).await?;
    stdin.shutdown().await?;
    drop(stdin);
    read_events(BufReader::new(stdout), transcript).await
}

/// Runs each snippet in a fresh child process under a wall-clock deadline.
///
/// `program` and `args` must start a process that reads the snippet from stdin
/// and answers through [`serve_worker`].
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    program: PathBuf,
    args: Vec<String>,
    timeout: Duration,
}

impl ProcessRunner {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>, timeout: Duration) -> Self {
        Self { program: program.into(), args, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn run(&self, source: &str) -> ExecutionResult {
        let spawned = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn();
        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => {
                warn!(error = %e, program = %self.program.display(), "could not spawn worker");
                return ExecutionResult::SystemFault(format!("failed to start runner: {e}"));
            }
        };
        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            return ExecutionResult::SystemFault("runner pipes unavailable".to_string());
        };

        let mut transcript = Transcript::new();
        let outcome =
            tokio::time::timeout(self.timeout, exchange(stdin, stdout, source, &mut transcript))
                .await;

        match outcome {
            Ok(Ok(Completion::Done)) => {
                if let Err(e) = child.wait().await {
                    debug!(error = %e, "reaping worker failed");
                }
                ExecutionResult::Transcript(transcript)
            }
            Ok(Ok(Completion::SystemFault(message))) => ExecutionResult::SystemFault(message),
            Ok(Ok(Completion::Closed)) => ExecutionResult::SystemFault(
                "runner exited without reporting a result".to_string(),
            ),
            Ok(Err(e)) => {
                warn!(error = %e, "worker exchange failed");
                ExecutionResult::SystemFault(e.to_string())
            }
            Err(_) => {
                let ms = self.timeout.as_millis() as u64;
                warn!(timeout_ms = ms, "snippet exceeded its deadline, killing worker");
                if let Err(e) = child.kill().await {
                    warn!(error = %e, "killing worker failed");
                }
                transcript.set_fault(format!("execution timed out after {ms} ms"));
                ExecutionResult::Transcript(transcript)
            }
        }
    }
}

#[async_trait]
impl RunnerPort for ProcessRunner {
    async fn run(&self, code: &str) -> ExecutionResult {
        debug!(bytes = code.len(), "running snippet in worker");
        ProcessRunner::run(self, code).await
    }
}
