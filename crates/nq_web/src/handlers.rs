use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use nq_core::{Comment, Error, NewComment, Post, PostSummary};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::AppState;

pub const DEFAULT_PAGE_SIZE: usize = 9;
pub const MAX_PAGE_SIZE: usize = 100;

pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Runs the generation pipeline on demand.
///
/// The run happens on its own task so a panic anywhere inside it turns into
/// a 500 response instead of tearing down the connection.
pub async fn generate(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let pipeline = state.pipeline.clone();
    match tokio::spawn(async move { pipeline.run().await }).await {
        Ok(report) => (StatusCode::OK, Json(json!(report))),
        Err(e) => {
            tracing::error!(error = %e, "Blog generation pipeline crashed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "status": "error", "message": e.to_string() })),
            )
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPage {
    pub page: usize,
    pub page_size: usize,
    pub total: u64,
    pub results: Vec<PostSummary>,
}

pub async fn list_posts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<PostPage>> {
    let page = params.page.unwrap_or(1).max(1);
    let page_size = params.page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);

    let posts = state
        .store
        .list_recent((page - 1).saturating_mul(page_size), page_size)
        .await?;
    let total = state.store.count().await?;

    Ok(Json(PostPage {
        page,
        page_size,
        total,
        results: posts.iter().map(Post::to_summary).collect(),
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetail {
    #[serde(flatten)]
    pub post: Post,
    pub tag_list: Vec<String>,
    pub comments: Vec<Comment>,
}

pub async fn get_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<PostDetail>> {
    let not_found = || AppError::from(Error::not_found("Post", &id));
    let post_id = Uuid::parse_str(&id).map_err(|_| not_found())?;
    let post = state.store.get(post_id).await?.ok_or_else(not_found)?;
    let comments = state.store.list_comments(post_id).await?;

    Ok(Json(PostDetail {
        tag_list: post.tag_list(),
        post,
        comments,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub post_id: Option<String>,
    pub name: Option<String>,
    pub message: Option<String>,
}

pub async fn create_comment(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CreateCommentRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Comment>)> {
    let Json(request) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let (Some(post_id), Some(name), Some(message)) = (request.post_id, request.name, request.message)
    else {
        return Err(Error::Validation("postId, name and message are required".to_string()).into());
    };

    let id = Uuid::parse_str(post_id.trim()).map_err(|_| Error::not_found("Post", &post_id))?;
    let comment = state.store.add_comment(id, NewComment::new(name, message)).await?;
    tracing::info!(post_id = %id, comment_id = %comment.id, "💬 Comment added");

    Ok((StatusCode::CREATED, Json(comment)))
}
