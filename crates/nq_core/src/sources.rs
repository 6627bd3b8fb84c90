use async_trait::async_trait;

use crate::types::ArticleSummary;

#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// Returns the name of the news feed
    fn source(&self) -> &str;

    /// Fetches at most `max_count` candidate articles for `topic`.
    ///
    /// Never fails: transport and configuration problems are logged and
    /// yield an empty list.
    async fn fetch_candidate_articles(&self, topic: &str, max_count: usize) -> Vec<ArticleSummary>;
}
