use async_trait::async_trait;

use crate::types::{ArticleSummary, GeneratedPost};

#[async_trait]
pub trait ContentGenerator: Send + Sync {
    fn name(&self) -> &str;

    /// Turns a news article into a blog post.
    ///
    /// Failures are logged by the implementation and surface as `None`.
    async fn generate(&self, article: &ArticleSummary) -> Option<GeneratedPost>;
}
