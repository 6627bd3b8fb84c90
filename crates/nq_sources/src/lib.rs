pub mod gnews;
pub mod pipeline;

pub use gnews::GNewsClient;
pub use pipeline::BlogPipeline;

pub mod prelude {
    pub use super::gnews::GNewsClient;
    pub use super::pipeline::BlogPipeline;
    pub use nq_core::{ArticleSource, ArticleSummary, PipelineReport, Result, Error};
}
