use serde::{Deserialize, Serialize};

/// Protocol version (bumped when breaking changes are introduced)
pub const VERSION: u8 = 1;

/// Top-level message envelope exchanged between a UI and the playground core.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    RunRequest(RunRequest),
    RunResult(RunResult),
    SaveSnippet(SaveSnippet),
    SnippetSaved(SnippetSaved),
    ShareRequest(ShareRequest),
    ShareLink(ShareLink),
    Status(Status),
}

/// Ask the core to execute a snippet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub v: Option<u8>,
    pub id: String,
    pub code: String,
}

/// Display text produced by one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub v: Option<u8>,
    pub reply_to: String,
    pub output: String,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveSnippet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub v: Option<u8>,
    pub code: String,
}

/// Summary of a stored snippet, without its code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnippetSaved {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub v: Option<u8>,
    pub id: i64,
    pub name: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub v: Option<u8>,
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareLink {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub v: Option<u8>,
    pub url: String,
}

/// Informational status line for UIs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Status {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub v: Option<u8>,
    pub level: String, // info|warn|error
    pub text: String,
}

impl Message {
    /// Build a run request with a fresh id.
    pub fn run_request<S: Into<String>>(code: S) -> Self {
        Message::RunRequest(RunRequest {
            v: Some(VERSION),
            id: uuid::Uuid::new_v4().to_string(),
            code: code.into(),
        })
    }

    pub fn run_result(reply_to: impl Into<String>, output: impl Into<String>, elapsed_ms: u64) -> Self {
        Message::RunResult(RunResult {
            v: Some(VERSION),
            reply_to: reply_to.into(),
            output: output.into(),
            elapsed_ms,
        })
    }

    pub fn save_snippet<S: Into<String>>(code: S) -> Self {
        Message::SaveSnippet(SaveSnippet { v: Some(VERSION), code: code.into() })
    }

    pub fn share_request<S: Into<String>>(code: S) -> Self {
        Message::ShareRequest(ShareRequest { v: Some(VERSION), code: code.into() })
    }

    pub fn share_link<S: Into<String>>(url: S) -> Self {
        Message::ShareLink(ShareLink { v: Some(VERSION), url: url.into() })
    }

    pub fn status<S: Into<String>>(level: &str, text: S) -> Self {
        Message::Status(Status { v: Some(VERSION), level: level.to_string(), text: text.into() })
    }
}
