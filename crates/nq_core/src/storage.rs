use async_trait::async_trait;
use uuid::Uuid;

use crate::types::{Comment, NewComment, NewPost, Post};
use crate::Result;

#[async_trait]
pub trait PostStore: Send + Sync {
    /// Returns true if a post with this exact source URL is stored
    async fn exists(&self, source_url: &str) -> Result<bool>;

    /// Stores a post, failing with `Error::ConstraintViolation` on a duplicate source URL
    async fn create(&self, post: NewPost) -> Result<Post>;

    /// Atomically stores a post unless its source URL is already present.
    /// Returns `None` when another writer got there first.
    async fn insert_if_absent(&self, post: NewPost) -> Result<Option<Post>>;

    /// Returns posts newest first
    async fn list_recent(&self, offset: usize, limit: usize) -> Result<Vec<Post>>;

    /// Total number of stored posts
    async fn count(&self) -> Result<u64>;

    async fn get(&self, id: Uuid) -> Result<Option<Post>>;

    /// Removes a post together with its comments
    async fn delete(&self, id: Uuid) -> Result<bool>;

    /// Returns the comments of a post, newest first
    async fn list_comments(&self, post_id: Uuid) -> Result<Vec<Comment>>;

    /// Attaches a comment, failing with `Error::NotFound` if the post does not exist
    async fn add_comment(&self, post_id: Uuid, comment: NewComment) -> Result<Comment>;
}
