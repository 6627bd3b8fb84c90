//! Prompts and the output schema sent to the generative model.

use nq_core::ArticleSummary;
use serde_json::{json, Value};

pub const SYSTEM_PROMPT: &str = r#"You are an expert tech blogger. Your tone is engaging, insightful, and easy to understand.
Your task is to write an interactive and engaging blog post based on the provided news article.

RULES:
- Do NOT just copy the article.
- Use the article's title, description, and content as a source of facts.
- Write an original piece in your own voice in English only.
- Create a new, catchy title for the blog post.
- Language must be easy to understand.
- Structure the content with clear sections:
    * Start with an engaging introduction
    * Break down key points into sections with <h2> subheadings
    * Use <h3> for any nested subsections
    * Include a "Quick Takeaways" section (which you'll also put in the JSON)
    * End with a "Why This Matters" section
- Format requirements for 'blogContent' HTML:
    * Use <h2> for main sections
    * Use <h3> for subsections
    * Use <p> tags for paragraphs. Add a blank line between paragraphs.
    * Use <blockquote> for important quotes or highlights
    * Use <ul> and <li> for bullet points
    * Include a <table> if relevant data is available
- Add interactive elements to 'blogContent':
    * Include a "Key Points" summary box using a <div> with class 'key-points-box'.
    * Add a "Did You Know?" fact box using a <div> with class 'did-you-know-box'.
    * Include thought-provoking questions for readers at the end of the post (which you'll also put in the JSON).
- The output MUST be in the provided JSON format.
- The 'blogSummary' should be a concise one or two-sentence summary of the new post."#;

/// Per-article data prompt.
pub fn article_prompt(article: &ArticleSummary) -> String {
    let or_na = |value: &Option<String>| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or("N/A")
            .to_string()
    };

    format!(
        "Please write a blog post based on this article:\n\
         - Title: {}\n\
         - Description: {}\n\
         - Content: {}\n\
         - Source URL: {}\n\
         - Image URL: {}\n",
        or_na(&article.title),
        or_na(&article.description),
        or_na(&article.content),
        article.source_url().unwrap_or_default(),
        article.image().unwrap_or_default(),
    )
}

pub const REQUIRED_FIELDS: [&str; 8] = [
    "blogTitle",
    "blogSummary",
    "blogContent",
    "originalSourceUrl",
    "imageUrl",
    "tags",
    "keyTakeaways",
    "discussionQuestions",
];

/// JSON schema of `GeneratedPost` in the model's structured-output dialect.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "blogTitle": {"type": "STRING"},
            "blogSummary": {"type": "STRING"},
            "blogContent": {"type": "STRING"},
            "originalSourceUrl": {"type": "STRING"},
            "imageUrl": {"type": "STRING"},
            "tags": {"type": "STRING"},
            "keyTakeaways": {"type": "ARRAY", "items": {"type": "STRING"}},
            "discussionQuestions": {"type": "ARRAY", "items": {"type": "STRING"}}
        },
        "required": REQUIRED_FIELDS
    })
}
