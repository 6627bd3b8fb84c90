pub mod models;
pub mod prompt;

pub mod prelude {
    pub use super::models::create_generator;
    pub use super::models::dummy::DummyGenerator;
    pub use super::models::gemini::GeminiGenerator;
    pub use nq_core::{ArticleSummary, ContentGenerator, Error, GeneratedPost, Result};
}

pub use models::create_generator;
