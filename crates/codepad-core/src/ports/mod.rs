pub mod storage;

pub use storage::SnippetStore;

use async_trait::async_trait;

use crate::capture::ExecutionResult;
use crate::error::Result;

/// Executes snippets on behalf of the core.
#[async_trait]
pub trait RunnerPort: Send + Sync {
    async fn run(&self, code: &str) -> ExecutionResult;
}

/// Where the core delivers its replies.
#[async_trait]
pub trait OutboundPort: Send + Sync {
    async fn send(&self, msg: protocol::Message) -> Result<()>;
}
