use axum::extract::{Path, State};
use axum::Json;

use crate::app::AppState;
use crate::auth::middleware::{SignedIn, Viewer};
use crate::db::models::{annotate_saved, MessageResponse, PostView, User, UserView};
use crate::db::user_repository::UserRepository;
use crate::error::AppError;

async fn load_user(users: &dyn UserRepository, id: &str) -> Result<User, AppError> {
    users
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

/// Follow another user, bumping their follower count.
pub async fn process_follow(
    users: &dyn UserRepository,
    follower: &User,
    target_id: &str,
) -> Result<MessageResponse, AppError> {
    let target = load_user(users, target_id).await?;
    if target.id == follower.id {
        return Err(AppError::BadRequest("Cannot follow yourself".into()));
    }

    if users.follow(&follower.id, &target.id).await? {
        tracing::info!(user_id = %follower.id, target_id = %target.id, "followed user");
        Ok(MessageResponse::new("followed"))
    } else {
        Ok(MessageResponse::new("already following"))
    }
}

pub async fn process_unfollow(
    users: &dyn UserRepository,
    follower: &User,
    target_id: &str,
) -> Result<MessageResponse, AppError> {
    let target = load_user(users, target_id).await?;

    if users.unfollow(&follower.id, &target.id).await? {
        Ok(MessageResponse::new("unfollowed"))
    } else {
        Ok(MessageResponse::new("not following"))
    }
}

/// `GET /users/{id}`
pub async fn get_user_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserView>, AppError> {
    let user = load_user(state.user_repo.as_ref(), &id).await?;
    Ok(Json(UserView::from(&user)))
}

/// `GET /users/{id}/savedpostIDs`
pub async fn saved_post_ids_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<String>>, AppError> {
    let user = load_user(state.user_repo.as_ref(), &id).await?;
    Ok(Json(user.saved_posts))
}

/// `GET /users/{id}/savedposts`
pub async fn saved_posts_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Viewer(viewer): Viewer,
) -> Result<Json<Vec<PostView>>, AppError> {
    let user = load_user(state.user_repo.as_ref(), &id).await?;
    let posts = state.post_repo.find_by_ids(&user.saved_posts).await?;
    Ok(Json(annotate_saved(&posts, viewer.as_ref())))
}

/// `GET /users/{id}/posts`
pub async fn user_posts_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Viewer(viewer): Viewer,
) -> Result<Json<Vec<PostView>>, AppError> {
    let user = load_user(state.user_repo.as_ref(), &id).await?;
    let posts = state.post_repo.find_by_author(&user.id.to_hex()).await?;
    Ok(Json(annotate_saved(&posts, viewer.as_ref())))
}

/// `POST /users/{id}/follow`
pub async fn follow_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    SignedIn(user): SignedIn,
) -> Result<Json<MessageResponse>, AppError> {
    let response = process_follow(state.user_repo.as_ref(), &user, &id).await?;
    Ok(Json(response))
}

/// `POST /users/{id}/unfollow`
pub async fn unfollow_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    SignedIn(user): SignedIn,
) -> Result<Json<MessageResponse>, AppError> {
    let response = process_unfollow(state.user_repo.as_ref(), &user, &id).await?;
    Ok(Json(response))
}
