use async_trait::async_trait;
use nq_core::config::NewsSourceConfig;
use nq_core::{ArticleSource, ArticleSummary, Error, Result};
use reqwest::Client;
use serde::Deserialize;
use std::fmt;
use tracing::{error, info};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HeadlinesResponse {
    #[serde(default)]
    total_articles: Option<u64>,
    #[serde(default)]
    articles: Vec<GNewsArticle>,
}

#[derive(Debug, Deserialize)]
struct GNewsArticle {
    title: Option<String>,
    description: Option<String>,
    content: Option<String>,
    url: Option<String>,
    image: Option<String>,
}

impl From<GNewsArticle> for ArticleSummary {
    fn from(article: GNewsArticle) -> Self {
        Self {
            title: article.title,
            description: article.description,
            content: article.content,
            url: article.url,
            image_url: article.image,
        }
    }
}

/// Client for the GNews top-headlines feed.
pub struct GNewsClient {
    client: Client,
    config: NewsSourceConfig,
}

impl GNewsClient {
    pub fn new(config: NewsSourceConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    async fn try_fetch(&self, topic: &str, max_count: usize) -> Result<Vec<ArticleSummary>> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::Configuration("GNEWS_API_KEY is not set".to_string()))?;

        let max = max_count.to_string();
        // The key travels in the query string, so it is stripped from any error
        let response = self
            .client
            .get(format!("{}/top-headlines", self.config.base_url.trim_end_matches('/')))
            .query(&[
                ("topic", topic),
                ("lang", self.config.language.as_str()),
                ("max", max.as_str()),
                ("apikey", api_key),
            ])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| e.without_url())?;

        let headlines: HeadlinesResponse = response.json().await.map_err(|e| e.without_url())?;
        tracing::debug!(total = ?headlines.total_articles, "GNews headlines received");

        Ok(headlines
            .articles
            .into_iter()
            .take(max_count)
            .map(ArticleSummary::from)
            .collect())
    }
}

impl fmt::Debug for GNewsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GNewsClient")
            .field("client", &"<reqwest::Client>")
            .field("config", &self.config)
            .finish()
    }
}

#[async_trait]
impl ArticleSource for GNewsClient {
    fn source(&self) -> &str {
        "GNews"
    }

    async fn fetch_candidate_articles(&self, topic: &str, max_count: usize) -> Vec<ArticleSummary> {
        match self.try_fetch(topic, max_count).await {
            Ok(articles) => {
                info!("📰 Fetched {} articles from GNews", articles.len());
                articles
            }
            Err(e) => {
                error!(error = %e, "Error fetching GNews articles");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, api_key: Option<&str>) -> GNewsClient {
        GNewsClient::new(NewsSourceConfig::new(api_key.map(str::to_string)).with_base_url(server.uri()))
    }

    fn headlines() -> serde_json::Value {
        json!({
            "totalArticles": 120,
            "articles": [
                {
                    "title": "Chipmaker unveils 2nm node",
                    "description": "Smaller transistors.",
                    "content": "Full text...",
                    "url": "https://news.example.com/2nm",
                    "image": "https://img.example.com/2nm.jpg",
                    "publishedAt": "2025-01-01T10:00:00Z",
                    "source": {"name": "Example", "url": "https://news.example.com"}
                },
                {
                    "title": "No picture story",
                    "url": "https://news.example.com/plain",
                    "image": null
                }
            ]
        })
    }

    #[tokio::test]
    async fn test_fetch_sends_topic_language_and_cap() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/top-headlines"))
            .and(query_param("topic", "technology"))
            .and(query_param("lang", "en"))
            .and(query_param("max", "3"))
            .and(query_param("apikey", "news-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(headlines()))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Some("news-key"));
        let articles = client.fetch_candidate_articles("technology", 3).await;

        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].title.as_deref(), Some("Chipmaker unveils 2nm node"));
        assert_eq!(articles[0].image(), Some("https://img.example.com/2nm.jpg"));
        assert_eq!(articles[1].image(), None);
    }

    #[tokio::test]
    async fn test_fetch_truncates_to_cap() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(headlines()))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("news-key"));
        assert_eq!(client.fetch_candidate_articles("technology", 1).await.len(), 1);
    }

    #[tokio::test]
    async fn test_error_status_yields_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({"errors": ["bad key"]})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Some("news-key"));
        assert!(client.fetch_candidate_articles("technology", 3).await.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_body_yields_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("news-key"));
        assert!(client.fetch_candidate_articles("technology", 3).await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_api_key_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(headlines()))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        assert!(client.fetch_candidate_articles("technology", 3).await.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_feed_yields_empty() {
        let client = GNewsClient::new(
            NewsSourceConfig::new(Some("news-key".to_string())).with_base_url("http://127.0.0.1:9"),
        );
        assert!(client.fetch_candidate_articles("technology", 3).await.is_empty());
    }
}
