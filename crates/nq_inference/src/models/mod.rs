use nq_core::config::GeneratorConfig;
use nq_core::{ContentGenerator, Error, Result};
use std::sync::Arc;

pub mod dummy;
pub mod gemini;

pub use dummy::DummyGenerator;
pub use gemini::GeminiGenerator;

pub const AVAILABLE_GENERATORS: [&str; 2] = ["gemini", "dummy"];

/// Builds the content generator named by `config.backend`.
pub fn create_generator(config: &GeneratorConfig) -> Result<Arc<dyn ContentGenerator>> {
    match config.backend.as_str() {
        "gemini" => {
            if config.api_key.is_none() {
                tracing::warn!("GEMINI_API_KEY not set; generation calls will be skipped");
            }
            Ok(Arc::new(GeminiGenerator::new(config.clone())))
        }
        "dummy" => Ok(Arc::new(DummyGenerator::new())),
        other => Err(Error::Configuration(format!(
            "Unknown generator '{}'. Available generators: {}",
            other,
            AVAILABLE_GENERATORS.join(", ")
        ))),
    }
}
