use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::{Error, Result};

pub const MAX_COMMENT_NAME_LEN: usize = 100;

/// A candidate article as returned by a news feed.
///
/// Every field is optional because feeds routinely omit them; blank strings
/// are treated the same as missing ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleSummary {
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub url: Option<String>,
    pub image_url: Option<String>,
}

impl ArticleSummary {
    pub fn source_url(&self) -> Option<&str> {
        non_blank(self.url.as_deref())
    }

    pub fn image(&self) -> Option<&str> {
        non_blank(self.image_url.as_deref())
    }

    pub fn display_title(&self) -> &str {
        non_blank(self.title.as_deref()).unwrap_or("<untitled>")
    }
}

/// Structured output of the generative model.
///
/// Field names match the JSON schema sent to the model, so this type
/// deserializes straight from the response text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPost {
    pub blog_title: String,
    pub blog_summary: String,
    pub blog_content: String,
    pub original_source_url: String,
    pub image_url: String,
    pub tags: String,
    pub key_takeaways: Vec<String>,
    pub discussion_questions: Vec<String>,
}

impl GeneratedPost {
    /// Field-by-field check of the model output. Schema-constrained output is
    /// a best-effort contract, so nothing is trusted after parsing.
    pub fn validate(&self) -> Result<()> {
        require_text("blogTitle", &self.blog_title)?;
        require_text("blogSummary", &self.blog_summary)?;
        require_text("blogContent", &self.blog_content)?;
        require_text("originalSourceUrl", &self.original_source_url)?;
        require_url("originalSourceUrl", &self.original_source_url)?;
        require_entries("keyTakeaways", &self.key_takeaways)?;
        require_entries("discussionQuestions", &self.discussion_questions)?;
        Ok(())
    }
}

/// A post ready to be persisted. Ids and timestamps are assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub title: String,
    pub summary: String,
    pub content: String,
    pub image_url: Option<String>,
    pub source_url: String,
    pub author: String,
    pub tags: Option<String>,
    pub key_takeaways: Option<Vec<String>>,
    pub discussion_questions: Option<Vec<String>>,
}

impl NewPost {
    /// Builds a post from model output. `source_url` is the fetched article
    /// URL and always wins over the URL echoed back by the model, since it is
    /// the de-duplication key.
    pub fn from_generated(
        generated: GeneratedPost,
        source_url: &str,
        fallback_image: Option<&str>,
        author: &str,
    ) -> Self {
        // Anything that is not a URL ("N/A", "none") counts as no image
        let image_url = non_blank(Some(generated.image_url.as_str()))
            .filter(|v| Url::parse(v).is_ok())
            .or(fallback_image)
            .map(str::to_string);
        let tags = non_blank(Some(generated.tags.as_str())).map(str::to_string);

        Self {
            title: generated.blog_title.trim().to_string(),
            summary: generated.blog_summary.trim().to_string(),
            content: generated.blog_content,
            image_url,
            source_url: source_url.to_string(),
            author: author.to_string(),
            tags,
            key_takeaways: Some(generated.key_takeaways),
            discussion_questions: Some(generated.discussion_questions),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub summary: String,
    pub content: String,
    pub image_url: Option<String>,
    pub source_url: String,
    pub author: String,
    pub tags: Option<String>,
    pub key_takeaways: Option<Vec<String>>,
    pub discussion_questions: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
}

impl Post {
    pub fn new(post: NewPost) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: post.title,
            summary: post.summary,
            content: post.content,
            image_url: post.image_url,
            source_url: post.source_url,
            author: post.author,
            tags: post.tags,
            key_takeaways: post.key_takeaways,
            discussion_questions: post.discussion_questions,
            created_at: now(),
        }
    }

    pub fn tag_list(&self) -> Vec<String> {
        self.tags
            .as_deref()
            .map(|tags| {
                tags.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn to_summary(&self) -> PostSummary {
        PostSummary {
            id: self.id,
            title: self.title.clone(),
            summary: self.summary.clone(),
            image_url: self.image_url.clone(),
            author: self.author.clone(),
            created_at: self.created_at,
        }
    }
}

/// Listing projection of a [`Post`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    pub id: Uuid,
    pub title: String,
    pub summary: String,
    pub image_url: Option<String>,
    pub author: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub name: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(post_id: Uuid, comment: NewComment) -> Self {
        Self {
            id: Uuid::new_v4(),
            post_id,
            name: comment.name,
            message: comment.message,
            created_at: now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewComment {
    pub name: String,
    pub message: String,
}

impl NewComment {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Trims both fields and rejects blank values or over-long names.
    pub fn validated(self) -> Result<Self> {
        let name = self.name.trim().to_string();
        let message = self.message.trim().to_string();
        require_text("name", &name)?;
        require_text("message", &message)?;
        if name.chars().count() > MAX_COMMENT_NAME_LEN {
            return Err(Error::Validation(format!(
                "name must be at most {} characters",
                MAX_COMMENT_NAME_LEN
            )));
        }
        Ok(Self { name, message })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    NoArticles,
    Success,
}

/// Outcome of one pipeline invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineReport {
    pub status: RunStatus,
    pub new_post_count: usize,
}

impl PipelineReport {
    pub fn no_articles() -> Self {
        Self {
            status: RunStatus::NoArticles,
            new_post_count: 0,
        }
    }

    pub fn success(new_post_count: usize) -> Self {
        Self {
            status: RunStatus::Success,
            new_post_count,
        }
    }
}

// Stores keep microseconds, so timestamps are truncated up front
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Validation(format!("{} must not be blank", field)));
    }
    Ok(())
}

fn require_url(field: &str, value: &str) -> Result<()> {
    Url::parse(value.trim())
        .map(|_| ())
        .map_err(|e| Error::Validation(format!("{} is not a valid URL: {}", field, e)))
}

fn require_entries(field: &str, values: &[String]) -> Result<()> {
    if let Some(pos) = values.iter().position(|v| v.trim().is_empty()) {
        return Err(Error::Validation(format!(
            "{} has a blank entry at index {}",
            field, pos
        )));
    }
    Ok(())
}
