use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::FromRef;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use axum_extra::extract::cookie::Key;
use tower_http::cors::CorsLayer;

use crate::api;
use crate::auth::{self, demo_auth, OidcProvider};
use crate::db::perk_repository::PerkRepository;
use crate::db::post_repository::PostRepository;
use crate::db::user_repository::UserRepository;
use crate::error::AppError;

/// Shared application state available to every handler.
#[derive(Clone)]
pub struct AppState {
    pub post_repo: Arc<dyn PostRepository>,
    pub perk_repo: Arc<dyn PerkRepository>,
    pub user_repo: Arc<dyn UserRepository>,
    /// Provider sign-in; `None` when no OIDC provider is configured.
    pub oidc: Option<Arc<OidcProvider>>,
    /// Signing key for session cookies.
    pub cookie_key: Key,
    /// Front-end origin, used for post-login redirects.
    pub client_url: String,
    pub perk_definitions_path: PathBuf,
    pub demo_mode: bool,
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Build the API router. Layers (CORS, tracing) are added by the caller.
pub fn router(state: AppState) -> Router {
    Router::new()
        // Auth
        .route("/auth/demo-login", post(demo_auth::demo_login_handler))
        .route("/auth/logout", get(auth::logout_handler))
        .route("/auth/{provider}", get(auth::login_handler))
        .route("/auth/{provider}/callback", get(auth::callback_handler))
        .route("/getuser", get(auth::current_user_handler))
        // Posts
        .route("/posts", get(api::posts::list_posts_handler))
        .route("/posts/{id}", get(api::posts::get_post_handler))
        .route("/newpost", post(api::posts::new_post_handler))
        .route("/savepost", post(api::posts::save_post_handler))
        .route("/unsavepost", post(api::posts::unsave_post_handler))
        .route("/searchPosts", get(api::posts::search_posts_handler))
        // Users
        .route("/users/{id}", get(api::users::get_user_handler))
        .route(
            "/users/{id}/savedpostIDs",
            get(api::users::saved_post_ids_handler),
        )
        .route("/users/{id}/savedposts", get(api::users::saved_posts_handler))
        .route("/users/{id}/posts", get(api::users::user_posts_handler))
        .route("/users/{id}/follow", post(api::users::follow_handler))
        .route("/users/{id}/unfollow", post(api::users::unfollow_handler))
        // Perks
        .route("/perks", get(api::perks::list_perks_handler))
        .route("/perkDefs", get(api::perks::perk_definitions_handler))
        .route("/updatePerks", post(api::perks::update_perks_handler))
        .with_state(state)
}

/// CORS restricted to the front-end origin, with cookies allowed.
pub fn cors_layer(client_url: &str) -> Result<CorsLayer, AppError> {
    let origin = HeaderValue::from_str(client_url.trim_end_matches('/'))
        .map_err(|e| AppError::Internal(format!("Invalid client_url '{client_url}': {e}")))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]))
}
