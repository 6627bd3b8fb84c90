use async_trait::async_trait;
use nq_core::config::PipelineConfig;
use nq_core::{
    ArticleSource, ArticleSummary, Comment, ContentGenerator, Error, GeneratedPost, NewComment,
    NewPost, Post, PostStore, Result, RunStatus,
};
use nq_sources::BlogPipeline;
use nq_storage::MemoryStorage;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

struct FakeSource {
    articles: Vec<ArticleSummary>,
    calls: Mutex<Vec<(String, usize)>>,
}

impl FakeSource {
    fn new(articles: Vec<ArticleSummary>) -> Arc<Self> {
        Arc::new(Self {
            articles,
            calls: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl ArticleSource for FakeSource {
    fn source(&self) -> &str {
        "fake"
    }

    async fn fetch_candidate_articles(&self, topic: &str, max_count: usize) -> Vec<ArticleSummary> {
        self.calls.lock().unwrap().push((topic.to_string(), max_count));
        self.articles.clone()
    }
}

/// Succeeds for every URL except those listed in `failing`.
#[derive(Default)]
struct FakeGenerator {
    failing: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl FakeGenerator {
    fn failing_for(urls: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            failing: urls.iter().map(|u| u.to_string()).collect(),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentGenerator for FakeGenerator {
    fn name(&self) -> &str {
        "fake"
    }

    async fn generate(&self, article: &ArticleSummary) -> Option<GeneratedPost> {
        let url = article.url.clone().unwrap_or_default();
        self.calls.lock().unwrap().push(url.clone());
        if self.failing.contains(&url) {
            return None;
        }
        Some(GeneratedPost {
            blog_title: format!("Blog about {}", article.display_title()),
            blog_summary: "Summary".to_string(),
            blog_content: "<p>Content</p>".to_string(),
            original_source_url: "https://model.example.com/echoed".to_string(),
            image_url: String::new(),
            tags: "tech".to_string(),
            key_takeaways: vec!["takeaway".to_string()],
            discussion_questions: vec!["question?".to_string()],
        })
    }
}

/// Reports every URL as new but never wins the insert, as if a concurrent
/// run kept beating it; optionally fails writes outright.
struct RacingStore {
    inner: MemoryStorage,
    fail_writes: bool,
}

#[async_trait]
impl PostStore for RacingStore {
    async fn exists(&self, _source_url: &str) -> Result<bool> {
        Ok(false)
    }

    async fn create(&self, post: NewPost) -> Result<Post> {
        self.inner.create(post).await
    }

    async fn insert_if_absent(&self, _post: NewPost) -> Result<Option<Post>> {
        if self.fail_writes {
            return Err(Error::Database("disk full".to_string()));
        }
        Ok(None)
    }

    async fn list_recent(&self, offset: usize, limit: usize) -> Result<Vec<Post>> {
        self.inner.list_recent(offset, limit).await
    }

    async fn count(&self) -> Result<u64> {
        self.inner.count().await
    }

    async fn get(&self, id: Uuid) -> Result<Option<Post>> {
        self.inner.get(id).await
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        self.inner.delete(id).await
    }

    async fn list_comments(&self, post_id: Uuid) -> Result<Vec<Comment>> {
        self.inner.list_comments(post_id).await
    }

    async fn add_comment(&self, post_id: Uuid, comment: NewComment) -> Result<Comment> {
        self.inner.add_comment(post_id, comment).await
    }
}

fn article(n: u32) -> ArticleSummary {
    ArticleSummary {
        title: Some(format!("Article {}", n)),
        description: Some("Description".to_string()),
        content: Some("Content".to_string()),
        url: Some(format!("https://news.example.com/{}", n)),
        image_url: Some(format!("https://img.example.com/{}.png", n)),
    }
}

fn pipeline(
    source: Arc<FakeSource>,
    generator: Arc<FakeGenerator>,
    store: Arc<dyn PostStore>,
) -> BlogPipeline {
    BlogPipeline::new(source, generator, store, PipelineConfig::default())
}

#[tokio::test]
async fn test_empty_feed_reports_no_articles() {
    let source = FakeSource::new(vec![]);
    let generator = FakeGenerator::failing_for(&[]);
    let store = Arc::new(MemoryStorage::new());

    let report = pipeline(source.clone(), generator.clone(), store).run().await;

    assert_eq!(report.status, RunStatus::NoArticles);
    assert_eq!(report.new_post_count, 0);
    assert!(generator.calls().is_empty());
    assert_eq!(
        *source.calls.lock().unwrap(),
        vec![("technology".to_string(), 3)]
    );
}

#[tokio::test]
async fn test_two_of_three_generated() {
    let source = FakeSource::new(vec![article(1), article(2), article(3)]);
    let generator = FakeGenerator::failing_for(&["https://news.example.com/2"]);
    let store = Arc::new(MemoryStorage::new());

    let report = pipeline(source, generator.clone(), store.clone()).run().await;

    assert_eq!(report.status, RunStatus::Success);
    assert_eq!(report.new_post_count, 2);
    assert_eq!(generator.calls().len(), 3);

    let posts = store.list_recent(0, 10).await.unwrap();
    assert_eq!(posts.len(), 2);
    assert!(posts.iter().all(|p| p.author == "AI Author"));
    assert!(store.exists("https://news.example.com/1").await.unwrap());
    assert!(!store.exists("https://news.example.com/2").await.unwrap());
    assert!(store.exists("https://news.example.com/3").await.unwrap());
}

#[tokio::test]
async fn test_source_url_and_image_come_from_the_article() {
    let source = FakeSource::new(vec![article(7)]);
    let store = Arc::new(MemoryStorage::new());

    pipeline(source, FakeGenerator::failing_for(&[]), store.clone()).run().await;

    let post = store.list_recent(0, 1).await.unwrap().remove(0);
    assert_eq!(post.source_url, "https://news.example.com/7");
    assert_eq!(post.image_url.as_deref(), Some("https://img.example.com/7.png"));
    assert!(!store.exists("https://model.example.com/echoed").await.unwrap());
}

#[tokio::test]
async fn test_second_run_is_idempotent() {
    let source = FakeSource::new(vec![article(1), article(2)]);
    let generator = FakeGenerator::failing_for(&[]);
    let store = Arc::new(MemoryStorage::new());
    let pipeline = pipeline(source, generator.clone(), store.clone());

    let first = pipeline.run().await;
    let second = pipeline.run().await;

    assert_eq!(first.new_post_count, 2);
    assert_eq!(second.status, RunStatus::Success);
    assert_eq!(second.new_post_count, 0);
    assert_eq!(store.count().await.unwrap(), 2);
    // Stored URLs are skipped before the generator is called
    assert_eq!(generator.calls().len(), 2);
}

#[tokio::test]
async fn test_articles_without_url_or_image_are_skipped() {
    let mut no_image = article(1);
    no_image.image_url = None;
    let mut blank_image = article(2);
    blank_image.image_url = Some("  ".to_string());
    let mut no_url = article(3);
    no_url.url = None;

    let source = FakeSource::new(vec![no_image, blank_image, no_url, article(4)]);
    let generator = FakeGenerator::failing_for(&[]);
    let store = Arc::new(MemoryStorage::new());

    let report = pipeline(source, generator.clone(), store.clone()).run().await;

    assert_eq!(report.new_post_count, 1);
    assert_eq!(generator.calls(), vec!["https://news.example.com/4".to_string()]);
    assert!(!store.exists("https://news.example.com/1").await.unwrap());
    assert!(!store.exists("https://news.example.com/2").await.unwrap());
}

#[tokio::test]
async fn test_all_generation_failures_still_success() {
    let source = FakeSource::new(vec![article(1), article(2)]);
    let generator = FakeGenerator::failing_for(&[
        "https://news.example.com/1",
        "https://news.example.com/2",
    ]);
    let store = Arc::new(MemoryStorage::new());

    let report = pipeline(source, generator, store.clone()).run().await;

    assert_eq!(report.status, RunStatus::Success);
    assert_eq!(report.new_post_count, 0);
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_preexisting_post_skips_generation() {
    let store = Arc::new(MemoryStorage::new());
    store
        .create(NewPost {
            title: "Old".to_string(),
            summary: "Old".to_string(),
            content: "<p>Old</p>".to_string(),
            image_url: None,
            source_url: "https://news.example.com/1".to_string(),
            author: "AI Author".to_string(),
            tags: None,
            key_takeaways: None,
            discussion_questions: None,
        })
        .await
        .unwrap();

    let source = FakeSource::new(vec![article(1), article(2)]);
    let generator = FakeGenerator::failing_for(&[]);

    let report = pipeline(source, generator.clone(), store.clone()).run().await;

    assert_eq!(report.new_post_count, 1);
    assert_eq!(generator.calls(), vec!["https://news.example.com/2".to_string()]);
}

#[tokio::test]
async fn test_lost_race_and_write_errors_are_benign_skips() {
    let source = FakeSource::new(vec![article(1), article(2)]);

    for fail_writes in [false, true] {
        let store = Arc::new(RacingStore {
            inner: MemoryStorage::new(),
            fail_writes,
        });
        let report = pipeline(source.clone(), FakeGenerator::failing_for(&[]), store).run().await;
        assert_eq!(report.status, RunStatus::Success);
        assert_eq!(report.new_post_count, 0);
    }
}
