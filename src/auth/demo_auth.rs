use axum::extract::State;
use axum::Json;
use axum_extra::extract::cookie::SignedCookieJar;
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::auth::middleware::find_or_create_user;
use crate::auth::models::{Role, SignInProfile};
use crate::auth::session;
use crate::db::models::{User, UserView};
use crate::db::user_repository::UserRepository;
use crate::error::AppError;

/// Provider name recorded on demo accounts.
pub const DEMO_PROVIDER: &str = "demo";

/// Demo login request body.
#[derive(Debug, Deserialize)]
pub struct DemoLoginRequest {
    pub username: String,
    /// Role for a newly created account; defaults to `user`.
    #[serde(default)]
    pub role: Option<String>,
}

/// Demo login response body.
#[derive(Debug, Serialize)]
pub struct DemoLoginResponse {
    pub message: String,
    pub user: UserView,
}

/// Resolve a demo sign-in to an account.
pub async fn authenticate_demo_user(
    users: &dyn UserRepository,
    request: DemoLoginRequest,
) -> Result<User, AppError> {
    let username = request.username.trim();
    if username.is_empty() {
        return Err(AppError::BadRequest("Username cannot be empty".into()));
    }

    let role = match request.role.as_deref() {
        None => Role::User,
        Some(raw) => Role::from_str_ci(raw).ok_or_else(|| {
            AppError::BadRequest(format!("Invalid role '{raw}'. Expected: user, admin"))
        })?,
    };

    let profile = SignInProfile {
        provider: DEMO_PROVIDER.to_string(),
        subject: username.to_string(),
        username: username.to_string(),
    };

    find_or_create_user(users, profile, role).await
}

/// `POST /auth/demo-login` — sign in without an identity provider.
///
/// Only served when demo mode is enabled.
pub async fn demo_login_handler(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Json(request): Json<DemoLoginRequest>,
) -> Result<(SignedCookieJar, Json<DemoLoginResponse>), AppError> {
    if !state.demo_mode {
        return Err(AppError::NotFound("Demo sign-in is disabled".into()));
    }

    let user = authenticate_demo_user(state.user_repo.as_ref(), request).await?;
    let jar = session::start_session(jar, &user.id);

    Ok((
        jar,
        Json(DemoLoginResponse {
            message: "Login successful".to_string(),
            user: UserView::from(&user),
        }),
    ))
}
