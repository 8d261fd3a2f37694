use std::fmt;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::error::{PlaygroundError, Result};

/// Display text for a run that produced no entries and no fault.
pub const NO_OUTPUT: &str = "Code executed successfully (no output)";
pub const EXECUTION_ERROR_PREFIX: &str = "EXECUTION ERROR: ";
pub const SYSTEM_ERROR_PREFIX: &str = "SYSTEM ERROR: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Log,
    Warn,
    Info,
    Error,
}

impl Channel {
    pub const ALL: [Channel; 4] = [Channel::Log, Channel::Warn, Channel::Info, Channel::Error];

    /// Name of the console method bound to this channel.
    pub fn method(self) -> &'static str {
        match self {
            Channel::Log => "log",
            Channel::Warn => "warn",
            Channel::Info => "info",
            Channel::Error => "error",
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Channel::Log => "LOG: ",
            Channel::Warn => "WARN: ",
            Channel::Info => "INFO: ",
            Channel::Error => "ERROR: ",
        }
    }

    pub fn is_error(self) -> bool {
        matches!(self, Channel::Error)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub channel: Channel,
    pub message: String,
}

impl LogEntry {
    pub fn new(channel: Channel, message: impl Into<String>) -> Self {
        Self { channel, message: message.into() }
    }

    pub fn line(&self) -> String {
        format!("{}{}", self.channel.tag(), self.message)
    }
}

/// Everything one run recorded, in call order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    entries: Vec<LogEntry>,
    fault: Option<String>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, channel: Channel, message: impl Into<String>) {
        self.entries.push(LogEntry::new(channel, message));
    }

    /// Record the snippet fault. Only the first fault of a run is kept.
    pub fn set_fault(&mut self, message: impl Into<String>) {
        if self.fault.is_none() {
            self.fault = Some(message.into());
        }
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn fault(&self) -> Option<&str> {
        self.fault.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.fault.is_none()
    }

    /// Display lines: LOG/WARN/INFO in call order, then ERROR in call order,
    /// then the execution fault.
    pub fn lines(&self) -> Vec<String> {
        let normal = self.entries.iter().filter(|e| !e.channel.is_error());
        let errors = self.entries.iter().filter(|e| e.channel.is_error());
        normal
            .chain(errors)
            .map(LogEntry::line)
            .chain(self.fault.iter().map(|f| format!("{EXECUTION_ERROR_PREFIX}{f}")))
            .collect()
    }

    pub fn render(&self) -> String {
        if self.is_empty() {
            return NO_OUTPUT.to_string();
        }
        self.lines().join("\n")
    }
}

/// Final observable result of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionResult {
    Transcript(Transcript),
    /// The capture machinery itself failed.
    SystemFault(String),
}

impl ExecutionResult {
    pub fn render(&self) -> String {
        self.to_string()
    }

    pub fn transcript(&self) -> Option<&Transcript> {
        match self {
            ExecutionResult::Transcript(t) => Some(t),
            ExecutionResult::SystemFault(_) => None,
        }
    }

    pub fn is_system_fault(&self) -> bool {
        matches!(self, ExecutionResult::SystemFault(_))
    }
}

impl fmt::Display for ExecutionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionResult::Transcript(t) => f.write_str(&t.render()),
            ExecutionResult::SystemFault(msg) => write!(f, "{SYSTEM_ERROR_PREFIX}{msg}"),
        }
    }
}

#[derive(Debug, Default)]
struct SinkState {
    transcript: Transcript,
    closed: bool,
}

type Observer = Arc<dyn Fn(&LogEntry) + Send + Sync>;

/// Shared handle the console methods write into.
///
/// A runner keeps a clone so it can read a partial transcript when the snippet
/// outlives its deadline. Once closed, further records are dropped.
#[derive(Clone, Default)]
pub struct Sink {
    inner: Arc<Mutex<SinkState>>,
    observer: Option<Observer>,
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sink")
            .field("inner", &self.inner)
            .field("observed", &self.observer.is_some())
            .finish()
    }
}

impl Sink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that also hands every accepted entry to `observer` as it arrives.
    pub fn observed<F>(observer: F) -> Self
    where
        F: Fn(&LogEntry) + Send + Sync + 'static,
    {
        Self { inner: Arc::default(), observer: Some(Arc::new(observer)) }
    }

    pub fn record(&self, channel: Channel, message: String) -> Result<()> {
        let mut state = self.lock()?;
        if state.closed {
            return Ok(());
        }
        let entry = LogEntry::new(channel, message);
        if let Some(observer) = &self.observer {
            observer(&entry);
        }
        state.transcript.entries.push(entry);
        Ok(())
    }

    pub fn fault(&self, message: String) -> Result<()> {
        let mut state = self.lock()?;
        if !state.closed {
            state.transcript.set_fault(message);
        }
        Ok(())
    }

    /// Stop accepting records and return what was captured so far.
    pub fn close(&self) -> Result<Transcript> {
        let mut state = self.lock()?;
        state.closed = true;
        Ok(state.transcript.clone())
    }

    pub fn snapshot(&self) -> Result<Transcript> {
        Ok(self.lock()?.transcript.clone())
    }

    #[cfg(test)]
    pub(crate) fn poison(&self) {
        let inner = Arc::clone(&self.inner);
        let _ = std::thread::spawn(move || {
            let _guard = inner.lock();
            panic!("poisoning transcript lock");
        })
        .join();
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, SinkState>> {
        self.inner
            .lock()
            .map_err(|_| PlaygroundError::Capture("transcript lock poisoned".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_channel_lines_follow_normal_lines() {
        let mut t = Transcript::new();
        t.push(Channel::Log, "a");
        t.push(Channel::Error, "b");
        t.push(Channel::Warn, "c");
        t.push(Channel::Info, "d");
        assert_eq!(t.render(), "LOG: a\nWARN: c\nINFO: d\nERROR: b");
        // chronological order is kept underneath
        assert_eq!(t.entries()[1].channel, Channel::Error);
    }

    #[test]
    fn fault_line_is_last() {
        let mut t = Transcript::new();
        t.push(Channel::Error, "first");
        t.set_fault("boom");
        t.push(Channel::Log, "late");
        assert_eq!(t.lines(), vec!["LOG: late", "ERROR: first", "EXECUTION ERROR: boom"]);
    }

    #[test]
    fn empty_transcript_renders_no_output_sentence() {
        assert_eq!(Transcript::new().render(), NO_OUTPUT);
        assert_eq!(ExecutionResult::Transcript(Transcript::new()).render(), NO_OUTPUT);
    }

    #[test]
    fn system_fault_renders_prefixed() {
        let r = ExecutionResult::SystemFault("lock poisoned".into());
        assert_eq!(r.render(), "SYSTEM ERROR: lock poisoned");
        assert!(r.transcript().is_none());
    }

    #[test]
    fn closed_sink_drops_records() {
        let sink = Sink::new();
        sink.record(Channel::Log, "kept".into()).unwrap();
        let partial = sink.close().unwrap();
        sink.record(Channel::Log, "dropped".into()).unwrap();
        sink.fault("late fault".into()).unwrap();
        assert_eq!(partial.lines(), vec!["LOG: kept"]);
        assert_eq!(sink.snapshot().unwrap(), partial);
    }

    #[test]
    fn observer_sees_accepted_entries_only() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        let sink = Sink::observed(move |entry| log.lock().unwrap().push(entry.line()));
        sink.record(Channel::Warn, "w".into()).unwrap();
        sink.close().unwrap();
        sink.record(Channel::Log, "dropped".into()).unwrap();
        assert_eq!(*seen.lock().unwrap(), vec!["WARN: w"]);
    }

    #[test]
    fn poisoned_sink_reports_capture_error() {
        let sink = Sink::new();
        sink.poison();
        let err = sink.record(Channel::Log, "x".into()).unwrap_err();
        assert!(matches!(err, PlaygroundError::Capture(_)));
    }
}
