use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::SignedCookieJar;

use crate::app::AppState;
use crate::auth::models::{Role, SignInProfile};
use crate::auth::session;
use crate::db::models::{ProviderIdentity, User};
use crate::db::user_repository::UserRepository;
use crate::error::AppError;

/// Return the account linked to a provider identity, creating it on first
/// sign-in.
///
/// `role` only applies to newly created accounts.
pub async fn find_or_create_user(
    users: &dyn UserRepository,
    profile: SignInProfile,
    role: Role,
) -> Result<User, AppError> {
    if let Some(user) = users
        .find_by_identity(&profile.provider, &profile.subject)
        .await?
    {
        tracing::info!(user_id = %user.id, provider = %profile.provider, "user signed in");
        return Ok(user);
    }

    let mut user = User::new(
        ProviderIdentity {
            provider: profile.provider,
            subject: profile.subject,
        },
        profile.username,
    );
    user.role = role;
    users.create(user.clone()).await?;

    tracing::info!(
        user_id = %user.id,
        provider = %user.identity.provider,
        "created user on first sign-in"
    );
    Ok(user)
}

/// The user making the request, if signed in.
pub struct Viewer(pub Option<User>);

impl FromRequestParts<AppState> for Viewer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = SignedCookieJar::from_headers(&parts.headers, state.cookie_key.clone());
        let Some(user_id) = session::session_user_id(&jar) else {
            return Ok(Viewer(None));
        };

        // A session for a deleted account behaves like no session.
        let user = state.user_repo.find_by_id(&user_id).await?;
        Ok(Viewer(user))
    }
}

/// A signed-in user; rejects with 401 otherwise.
pub struct SignedIn(pub User);

impl FromRequestParts<AppState> for SignedIn {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Viewer(user) = Viewer::from_request_parts(parts, state).await?;
        user.map(SignedIn)
            .ok_or_else(|| AppError::Auth("Not signed in".into()))
    }
}

/// A signed-in administrator; rejects with 401 or 403 otherwise.
pub struct Admin(pub User);

impl FromRequestParts<AppState> for Admin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let SignedIn(user) = SignedIn::from_request_parts(parts, state).await?;
        if !user.role.has_access(Role::Admin) {
            return Err(AppError::Forbidden("Administrator role required".into()));
        }
        Ok(Admin(user))
    }
}
