use async_trait::async_trait;
use nq_core::{Error, PostStore, Result};
use std::path::Path;
use std::sync::Arc;

pub mod backends;

pub use backends::*;

pub const DEFAULT_DATABASE_PATH: &str = "newsquill.db";

#[async_trait]
pub trait StorageBackend: Send + Sync {
    fn get_error_message() -> &'static str;
    /// Opens the backend. Backends without a file ignore `database_path`.
    async fn open(database_path: &Path) -> Result<Self>
    where
        Self: Sized;
}

async fn open_backend<T>(database_path: &Path) -> Result<Arc<dyn PostStore>>
where
    T: StorageBackend + PostStore + 'static,
{
    match T::open(database_path).await {
        Ok(storage) => Ok(Arc::new(storage)),
        Err(e) => {
            tracing::error!(error = %e, "{}", T::get_error_message());
            Err(e)
        }
    }
}

/// Builds a post store by backend name (`memory` or `sqlite`).
pub async fn create_storage(kind: &str, database_path: Option<&Path>) -> Result<Arc<dyn PostStore>> {
    let path = database_path.unwrap_or_else(|| Path::new(DEFAULT_DATABASE_PATH));
    match kind {
        "memory" => open_backend::<MemoryStorage>(path).await,
        #[cfg(feature = "sqlite")]
        "sqlite" => open_backend::<SQLiteStorage>(path).await,
        other => Err(Error::Configuration(format!("Unknown storage backend: {}", other))),
    }
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{create_storage, StorageBackend};
}
