use async_trait::async_trait;
use nq_core::{ArticleSummary, ContentGenerator, GeneratedPost};
use std::fmt;

/// Offline generator that rearranges the article's own text into a post.
/// Useful for local runs without model credentials.
pub struct DummyGenerator;

impl fmt::Debug for DummyGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyGenerator").finish()
    }
}

impl DummyGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DummyGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn sentences(text: &str) -> Vec<String> {
    text.split(|c| c == '.' || c == '!' || c == '?')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("{}.", s))
        .collect()
}

#[async_trait]
impl ContentGenerator for DummyGenerator {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn generate(&self, article: &ArticleSummary) -> Option<GeneratedPost> {
        let source_url = article.source_url()?.to_string();
        let title = article.display_title().to_string();
        let description = article.description.clone().unwrap_or_default();
        let body = article.content.clone().unwrap_or_default();

        let takeaways: Vec<String> = sentences(&description).into_iter().take(3).collect();
        let summary = takeaways
            .first()
            .cloned()
            .unwrap_or_else(|| format!("A quick look at {}.", title));

        let mut content = format!("<h2>What happened</h2>\n<p>{}</p>\n", description.trim());
        if !body.trim().is_empty() {
            content.push_str(&format!("<h2>The details</h2>\n<p>{}</p>\n", body.trim()));
        }
        content.push_str("<h2>Why This Matters</h2>\n<p>Read the original report for the full story.</p>\n");

        let post = GeneratedPost {
            blog_title: format!("What to know: {}", title),
            blog_summary: summary,
            blog_content: content,
            original_source_url: source_url,
            image_url: article.image().unwrap_or_default().to_string(),
            tags: "technology".to_string(),
            key_takeaways: takeaways,
            discussion_questions: vec![format!("How will \"{}\" affect you?", title)],
        };

        match post.validate() {
            Ok(()) => {
                tracing::debug!("Generated dummy post for: {}", title);
                Some(post)
            }
            Err(e) => {
                tracing::error!(error = %e, "Dummy generator produced an invalid post");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dummy_generator() {
        let generator = DummyGenerator::new();
        let article = ArticleSummary {
            title: Some("Robots learn to fold laundry".to_string()),
            description: Some("A lab trained robots. They fold shirts now! Socks are next.".to_string()),
            content: Some("Full story".to_string()),
            url: Some("https://news.example.com/robots".to_string()),
            image_url: Some("https://img.example.com/r.png".to_string()),
        };

        let post = generator.generate(&article).await.unwrap();
        assert_eq!(post.blog_title, "What to know: Robots learn to fold laundry");
        assert_eq!(post.blog_summary, "A lab trained robots.");
        assert_eq!(post.key_takeaways.len(), 3);
        assert_eq!(post.original_source_url, "https://news.example.com/robots");
        assert!(post.blog_content.contains("<h2>Why This Matters</h2>"));
    }

    #[tokio::test]
    async fn test_dummy_generator_needs_url() {
        let generator = DummyGenerator::new();
        assert!(generator.generate(&ArticleSummary::default()).await.is_none());
    }
}
