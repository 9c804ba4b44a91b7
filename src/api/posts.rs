use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use bson::oid::ObjectId;
use chrono::Utc;
use serde::Deserialize;

use crate::app::AppState;
use crate::auth::middleware::{SignedIn, Viewer};
use crate::db::models::{
    annotate_saved, MessageResponse, NewPostRequest, Post, PostIdRequest, PostView, User,
};
use crate::db::post_repository::PostRepository;
use crate::db::user_repository::UserRepository;
use crate::error::AppError;
use crate::search::posts::search_posts;

/// Create a post authored by `author`.
pub async fn process_new_post(
    posts: &dyn PostRepository,
    users: &dyn UserRepository,
    author: &User,
    request: NewPostRequest,
) -> Result<Post, AppError> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Post name cannot be empty".into()));
    }
    if request.kind.trim().is_empty() {
        return Err(AppError::BadRequest("Post type cannot be empty".into()));
    }

    let post = Post {
        id: ObjectId::new(),
        name: name.to_string(),
        description: request.description,
        saves: 0,
        perks: request.perks,
        author_id: author.id.to_hex(),
        kind: request.kind,
        created_at: Utc::now(),
    };

    posts.create(post.clone()).await?;
    users.increment_post_count(&author.id).await?;

    tracing::info!(post_id = %post.id, author_id = %post.author_id, "created post");
    Ok(post)
}

/// Add a post to the user's saved list. Saving twice is a no-op.
pub async fn process_save_post(
    posts: &dyn PostRepository,
    users: &dyn UserRepository,
    user: &User,
    post_id: &str,
) -> Result<MessageResponse, AppError> {
    let post = posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".into()))?;

    if !users.add_saved_post(&user.id, &post.id.to_hex()).await? {
        return Ok(MessageResponse::new("already was saved"));
    }
    posts.adjust_saves(&post.id, 1).await?;

    Ok(MessageResponse::new("saved"))
}

/// Remove a post from the user's saved list.
pub async fn process_unsave_post(
    posts: &dyn PostRepository,
    users: &dyn UserRepository,
    user: &User,
    post_id: &str,
) -> Result<MessageResponse, AppError> {
    let post = posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".into()))?;

    if !users.remove_saved_post(&user.id, &post.id.to_hex()).await? {
        return Ok(MessageResponse::new("not a saved post"));
    }
    posts.adjust_saves(&post.id, -1).await?;

    Ok(MessageResponse::new("unsaved"))
}

/// `GET /posts`
pub async fn list_posts_handler(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
) -> Result<Json<Vec<PostView>>, AppError> {
    let posts = state.post_repo.list_all().await?;
    Ok(Json(annotate_saved(&posts, viewer.as_ref())))
}

/// `GET /posts/{id}`
pub async fn get_post_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Viewer(viewer): Viewer,
) -> Result<Json<PostView>, AppError> {
    let post = state
        .post_repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".into()))?;

    let saved = viewer
        .as_ref()
        .is_some_and(|user| user.has_saved(&post.id.to_hex()));
    Ok(Json(PostView::new(&post, saved)))
}

/// `POST /newpost`
pub async fn new_post_handler(
    State(state): State<AppState>,
    SignedIn(user): SignedIn,
    Json(request): Json<NewPostRequest>,
) -> Result<Json<PostView>, AppError> {
    let post = process_new_post(
        state.post_repo.as_ref(),
        state.user_repo.as_ref(),
        &user,
        request,
    )
    .await?;

    Ok(Json(PostView::new(&post, false)))
}

/// `POST /savepost`
pub async fn save_post_handler(
    State(state): State<AppState>,
    SignedIn(user): SignedIn,
    Json(request): Json<PostIdRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let response = process_save_post(
        state.post_repo.as_ref(),
        state.user_repo.as_ref(),
        &user,
        &request.post_id,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// `POST /unsavepost`
pub async fn unsave_post_handler(
    State(state): State<AppState>,
    SignedIn(user): SignedIn,
    Json(request): Json<PostIdRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let response = process_unsave_post(
        state.post_repo.as_ref(),
        state.user_repo.as_ref(),
        &user,
        &request.post_id,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(response)))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub query: String,
}

/// `GET /searchPosts?query=...`
pub async fn search_posts_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
    Viewer(viewer): Viewer,
) -> Result<Json<Vec<PostView>>, AppError> {
    if params.query.trim().is_empty() {
        return Ok(Json(vec![]));
    }

    let posts = state.post_repo.list_all().await?;
    let perks = state.perk_repo.list_all().await?;

    let results = search_posts(&params.query, &posts, &perks);
    Ok(Json(annotate_saved(results, viewer.as_ref())))
}
