//! Saved snippets and shareable links.

pub mod share;

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{PlaygroundError, Result};
use crate::ports::SnippetStore;

pub use share::{code_from_url, share_url};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
    /// Creation time in milliseconds since the epoch, unique within a store.
    pub id: i64,
    pub code: String,
    pub timestamp: DateTime<Utc>,
    pub name: String,
}

impl Snippet {
    /// Build the next snippet to append after `existing`.
    pub fn next(existing: &[Snippet], code: &str, now: DateTime<Utc>) -> Self {
        let millis = now.timestamp_millis();
        let timestamp = DateTime::from_timestamp_millis(millis).unwrap_or(now);
        let last_id = existing.iter().map(|s| s.id).max().unwrap_or(i64::MIN);
        Self {
            id: millis.max(last_id.saturating_add(1)),
            code: code.to_string(),
            timestamp,
            name: format!("Snippet {}", existing.len() + 1),
        }
    }

    pub fn to_message(&self) -> protocol::Message {
        protocol::Message::SnippetSaved(protocol::SnippetSaved {
            v: Some(protocol::VERSION),
            id: self.id,
            name: self.name.clone(),
            timestamp: self.timestamp.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        })
    }
}

/// Snippets persisted as one pretty-printed JSON array.
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub const FILE_NAME: &'static str = "snippets.json";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), lock: Mutex::new(()) }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(Self::FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<Vec<Snippet>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content).map_err(|e| PlaygroundError::CorruptStore {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    async fn write_all(&self, snippets: &[Snippet]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(snippets)?;
        let staging = self.path.with_extension("json.tmp");
        tokio::fs::write(&staging, content).await?;
        tokio::fs::rename(&staging, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl SnippetStore for JsonFileStore {
    async fn save(&self, code: &str) -> Result<Snippet> {
        let _guard = self.lock.lock().await;
        let mut snippets = self.read_all().await?;
        let snippet = Snippet::next(&snippets, code, Utc::now());
        snippets.push(snippet.clone());
        self.write_all(&snippets).await?;
        info!(id = snippet.id, name = %snippet.name, path = %self.path.display(), "snippet saved");
        Ok(snippet)
    }

    async fn list(&self) -> Result<Vec<Snippet>> {
        let _guard = self.lock.lock().await;
        self.read_all().await
    }

    async fn get(&self, id: i64) -> Result<Option<Snippet>> {
        let _guard = self.lock.lock().await;
        Ok(self.read_all().await?.into_iter().find(|s| s.id == id))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let _guard = self.lock.lock().await;
        let mut snippets = self.read_all().await?;
        let before = snippets.len();
        snippets.retain(|s| s.id != id);
        if snippets.len() == before {
            return Ok(false);
        }
        self.write_all(&snippets).await?;
        debug!(id, "snippet deleted");
        Ok(true)
    }
}

/// Process-local store used by tests and `--ephemeral` sessions.
#[derive(Default)]
pub struct MemoryStore {
    snippets: Mutex<Vec<Snippet>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnippetStore for MemoryStore {
    async fn save(&self, code: &str) -> Result<Snippet> {
        let mut snippets = self.snippets.lock().await;
        let snippet = Snippet::next(&snippets, code, Utc::now());
        snippets.push(snippet.clone());
        Ok(snippet)
    }

    async fn list(&self) -> Result<Vec<Snippet>> {
        Ok(self.snippets.lock().await.clone())
    }

    async fn get(&self, id: i64) -> Result<Option<Snippet>> {
        Ok(self.snippets.lock().await.iter().find(|s| s.id == id).cloned())
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let mut snippets = self.snippets.lock().await;
        let before = snippets.len();
        snippets.retain(|s| s.id != id);
        Ok(snippets.len() != before)
    }
}
