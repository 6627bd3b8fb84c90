pub mod config;
pub mod error;
pub mod models;
pub mod sources;
pub mod storage;
pub mod types;

pub use error::{Error, Result};
pub use models::ContentGenerator;
pub use sources::ArticleSource;
pub use storage::PostStore;
pub use types::{
    ArticleSummary, Comment, GeneratedPost, NewComment, NewPost, PipelineReport, Post,
    PostSummary, RunStatus,
};

pub mod prelude {
    pub use crate::config::{GeneratorConfig, NewsSourceConfig, PipelineConfig};
    pub use crate::{ArticleSource, ContentGenerator, PostStore};
    pub use crate::{ArticleSummary, Comment, GeneratedPost, NewComment, NewPost, Post};
    pub use crate::{Error, Result};
}
