//! Configuration values handed to each component's constructor.

pub const DEFAULT_TOPIC: &str = "technology";
pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_MAX_ARTICLES: usize = 3;
pub const DEFAULT_AUTHOR: &str = "AI Author";
pub const DEFAULT_GNEWS_URL: &str = "https://gnews.io/api/v4";
pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash-preview-09-2025";

#[derive(Clone)]
pub struct NewsSourceConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub language: String,
}

impl NewsSourceConfig {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl Default for NewsSourceConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_GNEWS_URL.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

impl std::fmt::Debug for NewsSourceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewsSourceConfig")
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("language", &self.language)
            .finish()
    }
}

#[derive(Clone)]
pub struct GeneratorConfig {
    /// Backend name understood by `nq_inference::create_generator`
    pub backend: String,
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

impl GeneratorConfig {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            backend: "gemini".to_string(),
            api_key: None,
            base_url: DEFAULT_GEMINI_URL.to_string(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
        }
    }
}

impl std::fmt::Debug for GeneratorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratorConfig")
            .field("backend", &self.backend)
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub topic: String,
    pub max_articles: usize,
    pub author: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            topic: DEFAULT_TOPIC.to_string(),
            max_articles: DEFAULT_MAX_ARTICLES,
            author: DEFAULT_AUTHOR.to_string(),
        }
    }
}
