use async_trait::async_trait;
use nq_core::{Comment, Error, NewComment, NewPost, Post, PostStore, Result};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::StorageBackend;

/// Posts and comments kept in insertion order, oldest first.
#[derive(Default)]
pub struct MemoryStore {
    posts: Vec<Post>,
    comments: Vec<Comment>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn contains(&self, source_url: &str) -> bool {
        self.posts.iter().any(|p| p.source_url == source_url)
    }

    fn push_post(&mut self, post: NewPost) -> Post {
        let post = Post::new(post);
        self.posts.push(post.clone());
        post
    }

    fn remove_post(&mut self, id: Uuid) -> bool {
        let before = self.posts.len();
        self.posts.retain(|p| p.id != id);
        if self.posts.len() == before {
            return false;
        }
        self.comments.retain(|c| c.post_id != id);
        true
    }
}

#[derive(Clone, Default)]
pub struct MemoryStorage {
    store: Arc<RwLock<MemoryStore>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageBackend for MemoryStorage {
    fn get_error_message() -> &'static str {
        "Memory storage should be available"
    }

    async fn open(_database_path: &Path) -> Result<Self> {
        Ok(MemoryStorage::new())
    }
}

#[async_trait]
impl PostStore for MemoryStorage {
    async fn exists(&self, source_url: &str) -> Result<bool> {
        Ok(self.store.read().await.contains(source_url))
    }

    async fn create(&self, post: NewPost) -> Result<Post> {
        let mut store = self.store.write().await;
        if store.contains(&post.source_url) {
            return Err(Error::ConstraintViolation(format!(
                "a post with source URL {} already exists",
                post.source_url
            )));
        }
        Ok(store.push_post(post))
    }

    async fn insert_if_absent(&self, post: NewPost) -> Result<Option<Post>> {
        let mut store = self.store.write().await;
        if store.contains(&post.source_url) {
            return Ok(None);
        }
        Ok(Some(store.push_post(post)))
    }

    async fn list_recent(&self, offset: usize, limit: usize) -> Result<Vec<Post>> {
        let store = self.store.read().await;
        Ok(store.posts.iter().rev().skip(offset).take(limit).cloned().collect())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.store.read().await.posts.len() as u64)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Post>> {
        let store = self.store.read().await;
        Ok(store.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        Ok(self.store.write().await.remove_post(id))
    }

    async fn list_comments(&self, post_id: Uuid) -> Result<Vec<Comment>> {
        let store = self.store.read().await;
        Ok(store
            .comments
            .iter()
            .rev()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect())
    }

    async fn add_comment(&self, post_id: Uuid, comment: NewComment) -> Result<Comment> {
        let comment = comment.validated()?;
        let mut store = self.store.write().await;
        if !store.posts.iter().any(|p| p.id == post_id) {
            return Err(Error::not_found("Post", post_id));
        }
        let comment = Comment::new(post_id, comment);
        store.comments.push(comment.clone());
        Ok(comment)
    }
}
