use async_trait::async_trait;

use crate::error::Result;
use crate::snippets::Snippet;

/// Ordered list of saved snippets, oldest first.
#[async_trait]
pub trait SnippetStore: Send + Sync {
    async fn save(&self, code: &str) -> Result<Snippet>;

    async fn list(&self) -> Result<Vec<Snippet>>;

    async fn get(&self, id: i64) -> Result<Option<Snippet>>;

    /// Returns whether a snippet was removed.
    async fn delete(&self, id: i64) -> Result<bool>;
}

#[async_trait]
impl<T: SnippetStore + ?Sized> SnippetStore for std::sync::Arc<T> {
    async fn save(&self, code: &str) -> Result<Snippet> {
        (**self).save(code).await
    }

    async fn list(&self) -> Result<Vec<Snippet>> {
        (**self).list().await
    }

    async fn get(&self, id: i64) -> Result<Option<Snippet>> {
        (**self).get(id).await
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        (**self).delete(id).await
    }
}
