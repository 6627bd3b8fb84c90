use anyhow::anyhow;
use async_trait::async_trait;
use nq_core::config::GeneratorConfig;
use nq_core::{ArticleSummary, ContentGenerator, Error, GeneratedPost, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::{error, info};

use crate::prompt::{article_prompt, response_schema, SYSTEM_PROMPT};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

/// A failed generation together with whatever the service sent back.
struct GenerationFailure {
    error: Error,
    raw: Option<String>,
}

impl GenerationFailure {
    fn with_raw(error: Error, raw: &str) -> Self {
        Self {
            error,
            raw: Some(raw.to_string()),
        }
    }
}

impl From<Error> for GenerationFailure {
    fn from(error: Error) -> Self {
        Self { error, raw: None }
    }
}

impl From<reqwest::Error> for GenerationFailure {
    fn from(error: reqwest::Error) -> Self {
        Error::from(error).into()
    }
}

/// Content generator backed by Gemini's `generateContent` endpoint in
/// schema-constrained JSON mode.
pub struct GeminiGenerator {
    client: Client,
    config: GeneratorConfig,
}

impl GeminiGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    fn build_request(article: &ArticleSummary) -> GenerateContentRequest {
        GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: Some(SYSTEM_PROMPT.to_string()),
                }],
            },
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(article_prompt(article)),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: response_schema(),
            },
        }
    }

    async fn try_generate(&self, article: &ArticleSummary) -> std::result::Result<GeneratedPost, GenerationFailure> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::Configuration("GEMINI_API_KEY is not set".to_string()))?;

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&Self::build_request(article))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(GenerationFailure::with_raw(
                Error::External(anyhow!("Gemini returned HTTP {}", status)),
                &body,
            ));
        }

        let envelope: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|e| GenerationFailure::with_raw(e.into(), &body))?;
        let text = candidate_text(&envelope).ok_or_else(|| {
            let reason = envelope
                .candidates
                .first()
                .and_then(|c| c.finish_reason.as_deref())
                .unwrap_or("no candidates");
            GenerationFailure::with_raw(
                Error::Validation(format!("response has no text ({})", reason)),
                &body,
            )
        })?;

        parse_generated_post(&text).map_err(|e| GenerationFailure::with_raw(e, &text))
    }
}

impl fmt::Debug for GeminiGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiGenerator")
            .field("client", &"<reqwest::Client>")
            .field("config", &self.config)
            .finish()
    }
}

#[async_trait]
impl ContentGenerator for GeminiGenerator {
    fn name(&self) -> &str {
        "Gemini"
    }

    async fn generate(&self, article: &ArticleSummary) -> Option<GeneratedPost> {
        match self.try_generate(article).await {
            Ok(post) => {
                info!("✍️ Successfully generated blog for: {}", article.display_title());
                Some(post)
            }
            Err(failure) => {
                error!(
                    error = %failure.error,
                    article = article.display_title(),
                    "Error generating content with Gemini"
                );
                if let Some(raw) = failure.raw {
                    error!(raw_response = %raw, "Gemini raw response");
                }
                None
            }
        }
    }
}

fn candidate_text(response: &GenerateContentResponse) -> Option<String> {
    let content = response.candidates.first()?.content.as_ref()?;
    let text: String = content
        .parts
        .iter()
        .filter_map(|p| p.text.as_deref())
        .collect();
    (!text.trim().is_empty()).then_some(text)
}

/// Parses and validates the model's JSON text.
///
/// A surrounding markdown code fence is tolerated.
pub fn parse_generated_post(text: &str) -> Result<GeneratedPost> {
    let trimmed = text.trim();
    let json = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.trim_end().strip_suffix("```"))
        .unwrap_or(trimmed);

    let post: GeneratedPost = serde_json::from_str(json.trim())?;
    post.validate()?;
    Ok(post)
}
