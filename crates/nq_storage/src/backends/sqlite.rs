use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use nq_core::{Comment, Error, NewComment, NewPost, Post, PostStore, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::path::Path;
use uuid::Uuid;

use crate::StorageBackend;

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS posts (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        summary TEXT NOT NULL,
        content TEXT NOT NULL,
        image_url TEXT,
        source_url TEXT NOT NULL UNIQUE,
        author TEXT NOT NULL DEFAULT 'AI Author',
        tags TEXT,
        key_takeaways TEXT,
        discussion_questions TEXT,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS comments (
        id TEXT PRIMARY KEY,
        post_id TEXT NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
        name TEXT NOT NULL,
        message TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_posts_created_at ON posts(created_at)",
    "CREATE INDEX IF NOT EXISTS idx_comments_post_id ON comments(post_id)",
    // Add future migrations here
];

const POST_COLUMNS: &str = "id, title, summary, content, image_url, source_url, author, tags, \
     key_takeaways, discussion_questions, created_at";

pub struct SQLiteStorage {
    pool: SqlitePool,
}

#[async_trait]
impl StorageBackend for SQLiteStorage {
    fn get_error_message() -> &'static str {
        "SQLite database should be writable at the configured path"
    }

    async fn open(database_path: &Path) -> Result<Self> {
        Self::new_with_path(database_path).await
    }
}

impl SQLiteStorage {
    pub async fn new_with_path(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(db_error("Failed to connect to database"))?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(|e| Error::Database(format!("Failed to run migration {}: {}", i, e)))?;
        }

        tracing::debug!(path = %db_path.display(), "SQLite post store ready");

        Ok(Self { pool })
    }

    async fn insert_post(&self, post: &Post, ignore_duplicate: bool) -> std::result::Result<u64, sqlx::Error> {
        let statement = format!(
            "INSERT INTO posts ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?){}",
            POST_COLUMNS,
            if ignore_duplicate { " ON CONFLICT(source_url) DO NOTHING" } else { "" }
        );

        let result = sqlx::query(&statement)
            .bind(post.id.to_string())
            .bind(&post.title)
            .bind(&post.summary)
            .bind(&post.content)
            .bind(post.image_url.as_deref())
            .bind(&post.source_url)
            .bind(&post.author)
            .bind(post.tags.as_deref())
            .bind(encode_list(&post.key_takeaways))
            .bind(encode_list(&post.discussion_questions))
            .bind(encode_time(&post.created_at))
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn post_exists(&self, id: Uuid) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM posts WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to look up post"))?;
        Ok(row.is_some())
    }
}

#[async_trait]
impl PostStore for SQLiteStorage {
    async fn exists(&self, source_url: &str) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM posts WHERE source_url = ?")
            .bind(source_url)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to check source URL"))?;
        Ok(row.is_some())
    }

    async fn create(&self, post: NewPost) -> Result<Post> {
        let post = Post::new(post);
        match self.insert_post(&post, false).await {
            Ok(_) => Ok(post),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(Error::ConstraintViolation(
                format!("a post with source URL {} already exists", post.source_url),
            )),
            Err(e) => Err(db_error("Failed to store post")(e)),
        }
    }

    async fn insert_if_absent(&self, post: NewPost) -> Result<Option<Post>> {
        let post = Post::new(post);
        let inserted = self
            .insert_post(&post, true)
            .await
            .map_err(db_error("Failed to store post"))?;
        Ok((inserted > 0).then_some(post))
    }

    async fn list_recent(&self, offset: usize, limit: usize) -> Result<Vec<Post>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM posts ORDER BY created_at DESC, rowid DESC LIMIT ? OFFSET ?",
            POST_COLUMNS
        ))
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .bind(i64::try_from(offset).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list posts"))?;

        rows.iter().map(post_from_row).collect()
    }

    async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count posts"))?;
        Ok(count as u64)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Post>> {
        let row = sqlx::query(&format!("SELECT {} FROM posts WHERE id = ?", POST_COLUMNS))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to get post"))?;

        row.as_ref().map(post_from_row).transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete post"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_comments(&self, post_id: Uuid) -> Result<Vec<Comment>> {
        let rows = sqlx::query(
            r#"
            SELECT id, post_id, name, message, created_at FROM comments
            WHERE post_id = ?
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .bind(post_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list comments"))?;

        rows.iter().map(comment_from_row).collect()
    }

    async fn add_comment(&self, post_id: Uuid, comment: NewComment) -> Result<Comment> {
        let comment = comment.validated()?;
        if !self.post_exists(post_id).await? {
            return Err(Error::not_found("Post", post_id));
        }

        let comment = Comment::new(post_id, comment);
        let result = sqlx::query(
            "INSERT INTO comments (id, post_id, name, message, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(comment.id.to_string())
        .bind(post_id.to_string())
        .bind(&comment.name)
        .bind(&comment.message)
        .bind(encode_time(&comment.created_at))
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(comment),
            // The post was deleted between the lookup and the insert
            Err(sqlx::Error::Database(e)) if e.is_foreign_key_violation() => {
                Err(Error::not_found("Post", post_id))
            }
            Err(e) => Err(db_error("Failed to store comment")(e)),
        }
    }
}

fn db_error(context: &'static str) -> impl Fn(sqlx::Error) -> Error {
    move |e| Error::Database(format!("{}: {}", context, e))
}

fn encode_time(time: &DateTime<Utc>) -> String {
    // Fixed precision keeps the text column sortable
    time.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn decode_time(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| Error::Database(format!("Failed to parse date {}: {}", value, e)))
}

fn encode_list(list: &Option<Vec<String>>) -> Option<String> {
    list.as_ref().and_then(|l| serde_json::to_string(l).ok())
}

fn decode_list(value: Option<String>) -> Result<Option<Vec<String>>> {
    value.map(|v| serde_json::from_str::<Vec<String>>(&v)).transpose().map_err(Error::from)
}

fn decode_id(value: &str) -> Result<Uuid> {
    Uuid::parse_str(value).map_err(|e| Error::Database(format!("Invalid id {}: {}", value, e)))
}

fn post_from_row(row: &SqliteRow) -> Result<Post> {
    let get = |column: &str| -> Result<String> {
        row.try_get::<String, _>(column)
            .map_err(db_error("Failed to read post row"))
    };
    let get_opt = |column: &str| -> Result<Option<String>> {
        row.try_get::<Option<String>, _>(column)
            .map_err(db_error("Failed to read post row"))
    };

    Ok(Post {
        id: decode_id(&get("id")?)?,
        title: get("title")?,
        summary: get("summary")?,
        content: get("content")?,
        image_url: get_opt("image_url")?,
        source_url: get("source_url")?,
        author: get("author")?,
        tags: get_opt("tags")?,
        key_takeaways: decode_list(get_opt("key_takeaways")?)?,
        discussion_questions: decode_list(get_opt("discussion_questions")?)?,
        created_at: decode_time(&get("created_at")?)?,
    })
}

fn comment_from_row(row: &SqliteRow) -> Result<Comment> {
    let get = |column: &str| -> Result<String> {
        row.try_get::<String, _>(column)
            .map_err(db_error("Failed to read comment row"))
    };

    Ok(Comment {
        id: decode_id(&get("id")?)?,
        post_id: decode_id(&get("post_id")?)?,
        name: get("name")?,
        message: get("message")?,
        created_at: decode_time(&get("created_at")?)?,
    })
}
