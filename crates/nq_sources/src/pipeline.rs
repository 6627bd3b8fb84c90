use nq_core::config::PipelineConfig;
use nq_core::{ArticleSource, ArticleSummary, ContentGenerator, NewPost, PipelineReport, PostStore};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArticleStatus {
    Created,
    MissingUrl,
    MissingImage,
    AlreadyStored,
    GenerationFailed,
    LostRace,
    StoreFailed,
}

/// Fetch, filter, generate and persist, one article at a time.
pub struct BlogPipeline {
    source: Arc<dyn ArticleSource>,
    generator: Arc<dyn ContentGenerator>,
    store: Arc<dyn PostStore>,
    config: PipelineConfig,
}

impl BlogPipeline {
    pub fn new(
        source: Arc<dyn ArticleSource>,
        generator: Arc<dyn ContentGenerator>,
        store: Arc<dyn PostStore>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            source,
            generator,
            store,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs one batch. Never fails: every per-article problem is logged and
    /// only excludes that article from the count.
    pub async fn run(&self) -> PipelineReport {
        info!(
            "🚀 Starting blog generation pipeline ({} via {}, {})",
            self.config.topic,
            self.source.source(),
            self.generator.name()
        );

        let articles = self
            .source
            .fetch_candidate_articles(&self.config.topic, self.config.max_articles)
            .await;
        if articles.is_empty() {
            warn!("No articles fetched. Pipeline ending.");
            return PipelineReport::no_articles();
        }

        let mut new_posts = 0;
        for article in &articles {
            let status = self.process_article(article).await;
            debug!(?status, article = article.display_title(), "Article processed");
            if status == ArticleStatus::Created {
                new_posts += 1;
            }
        }

        info!("✨ Blog generation pipeline finished. Added {} new posts.", new_posts);
        PipelineReport::success(new_posts)
    }

    async fn process_article(&self, article: &ArticleSummary) -> ArticleStatus {
        let Some(source_url) = article.source_url() else {
            warn!("Skipping article with no source URL.");
            return ArticleStatus::MissingUrl;
        };

        let Some(image_url) = article.image() else {
            warn!(source_url, "Skipping article without an image.");
            return ArticleStatus::MissingImage;
        };

        match self.store.exists(source_url).await {
            Ok(false) => {}
            Ok(true) => {
                info!("⏭️ Skipping already existing article: {}", source_url);
                return ArticleStatus::AlreadyStored;
            }
            Err(e) => {
                error!(error = %e, source_url, "Could not check for an existing post, skipping");
                return ArticleStatus::StoreFailed;
            }
        }

        let Some(generated) = self.generator.generate(article).await else {
            error!("Failed to generate blog data for: {}", source_url);
            return ArticleStatus::GenerationFailed;
        };

        let post = NewPost::from_generated(generated, source_url, Some(image_url), &self.config.author);
        match self.store.insert_if_absent(post).await {
            Ok(Some(post)) => {
                info!("🆕 Successfully created post: {}", post.title);
                ArticleStatus::Created
            }
            Ok(None) => {
                warn!(source_url, "Post was stored by a concurrent run, skipping");
                ArticleStatus::LostRace
            }
            Err(e) => {
                error!(error = %e, source_url, "Error saving post to the store");
                ArticleStatus::StoreFailed
            }
        }
    }
}
