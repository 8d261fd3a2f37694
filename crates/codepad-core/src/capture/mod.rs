//! Execution capture: run a snippet, intercept its `console` calls and turn
//! them into a transcript.

pub mod engine;
pub mod format;
pub mod runner;
pub mod transcript;
pub mod worker;

pub use engine::{CaptureEngine, ExecutionLimits};
pub use format::FormattedArg;
pub use runner::IsolatedRunner;
pub use transcript::{
    Channel, ExecutionResult, LogEntry, Sink, Transcript, EXECUTION_ERROR_PREFIX, NO_OUTPUT,
    SYSTEM_ERROR_PREFIX,
};
pub use worker::{serve_worker, ProcessRunner, WorkerEvent};
