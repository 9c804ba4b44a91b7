pub mod config;
pub mod demo_auth;
pub mod middleware;
pub mod models;
pub mod session;

use axum::extract::{Path, Query, State};
use axum::response::Redirect;
use axum::Json;
use axum_extra::extract::cookie::SignedCookieJar;
use openidconnect::core::{CoreAuthenticationFlow, CoreClient, CoreProviderMetadata};
use openidconnect::{
    AuthorizationCode, ClientId, ClientSecret, CsrfToken, IssuerUrl, Nonce, RedirectUrl, Scope,
    TokenResponse,
};
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::auth::config::OidcConfig;
use crate::auth::middleware::{find_or_create_user, Viewer};
use crate::auth::models::{Role, SignInProfile};
use crate::db::models::UserView;
use crate::error::AppError;

/// An OpenID Connect identity provider discovered at startup.
pub struct OidcProvider {
    config: OidcConfig,
    metadata: CoreProviderMetadata,
    http: openidconnect::reqwest::Client,
}

impl OidcProvider {
    pub async fn discover(config: OidcConfig) -> Result<Self, AppError> {
        let http = openidconnect::reqwest::ClientBuilder::new()
            // Following redirects would expose the client to SSRF.
            .redirect(openidconnect::reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {e}")))?;

        let issuer = IssuerUrl::new(config.issuer_url.clone())
            .map_err(|e| AppError::Auth(format!("Invalid issuer URL: {e}")))?;

        let metadata = CoreProviderMetadata::discover_async(issuer, &http)
            .await
            .map_err(|e| AppError::Auth(format!("Failed to discover OIDC provider: {e}")))?;

        Ok(Self {
            config,
            metadata,
            http,
        })
    }

    pub fn name(&self) -> &str {
        &self.config.provider
    }

    fn redirect_url(&self) -> Result<RedirectUrl, AppError> {
        RedirectUrl::new(self.config.redirect_uri.clone())
            .map_err(|e| AppError::Internal(format!("Invalid redirect URL: {e}")))
    }

    /// Build the provider authorization URL together with the CSRF state and
    /// nonce that the callback must present.
    pub fn authorize(&self) -> Result<(String, CsrfToken, Nonce), AppError> {
        let client = CoreClient::from_provider_metadata(
            self.metadata.clone(),
            ClientId::new(self.config.client_id.clone()),
            Some(ClientSecret::new(self.config.client_secret.clone())),
        )
        .set_redirect_uri(self.redirect_url()?);

        let (url, csrf, nonce) = client
            .authorize_url(
                CoreAuthenticationFlow::AuthorizationCode,
                CsrfToken::new_random,
                Nonce::new_random,
            )
            .add_scope(Scope::new("profile".to_string()))
            .url();

        Ok((url.to_string(), csrf, nonce))
    }

    /// Exchange an authorization code and verify the returned ID token.
    pub async fn complete(&self, code: String, nonce: &Nonce) -> Result<SignInProfile, AppError> {
        let client = CoreClient::from_provider_metadata(
            self.metadata.clone(),
            ClientId::new(self.config.client_id.clone()),
            Some(ClientSecret::new(self.config.client_secret.clone())),
        )
        .set_redirect_uri(self.redirect_url()?);

        let token_response = client
            .exchange_code(AuthorizationCode::new(code))
            .map_err(|e| AppError::Auth(format!("Provider has no token endpoint: {e}")))?
            .request_async(&self.http)
            .await
            .map_err(|e| AppError::Auth(format!("Failed to exchange code: {e}")))?;

        let id_token = token_response
            .id_token()
            .ok_or_else(|| AppError::Auth("Provider returned no ID token".into()))?;
        let claims = id_token
            .claims(&client.id_token_verifier(), nonce)
            .map_err(|e| AppError::Auth(format!("Invalid ID token: {e}")))?;

        let username = claims
            .given_name()
            .and_then(|name| name.get(None))
            .map(|name| name.as_str().to_string())
            .or_else(|| {
                claims
                    .preferred_username()
                    .map(|name| name.as_str().to_string())
            })
            .unwrap_or_else(|| "player".to_string());

        Ok(SignInProfile {
            provider: self.config.provider.clone(),
            subject: claims.subject().as_str().to_string(),
            username,
        })
    }
}

/// CSRF state and nonce kept between the redirect and the callback.
#[derive(Debug, Serialize, Deserialize)]
struct PendingLogin {
    csrf: String,
    nonce: String,
}

#[derive(Debug, Deserialize)]
pub struct AuthCallbackQuery {
    pub code: String,
    pub state: String,
}

fn provider<'a>(state: &'a AppState, name: &str) -> Result<&'a OidcProvider, AppError> {
    state
        .oidc
        .as_deref()
        .filter(|p| p.name() == name)
        .ok_or_else(|| AppError::NotFound(format!("Sign-in provider '{name}' is not configured")))
}

/// `GET /auth/{provider}` — redirect to the identity provider.
pub async fn login_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    jar: SignedCookieJar,
) -> Result<(SignedCookieJar, Redirect), AppError> {
    let oidc = provider(&state, &name)?;
    let (url, csrf, nonce) = oidc.authorize()?;

    let pending = serde_json::to_string(&PendingLogin {
        csrf: csrf.secret().to_string(),
        nonce: nonce.secret().to_string(),
    })
    .map_err(|e| AppError::Internal(format!("Failed to serialize login state: {e}")))?;

    Ok((session::store_pending_login(jar, pending), Redirect::to(&url)))
}

/// `GET /auth/{provider}/callback` — finish sign-in and start a session.
pub async fn callback_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<AuthCallbackQuery>,
    jar: SignedCookieJar,
) -> Result<(SignedCookieJar, Redirect), AppError> {
    let oidc = provider(&state, &name)?;

    let (jar, pending) = session::take_pending_login(jar);
    let pending: PendingLogin = pending
        .and_then(|value| serde_json::from_str(&value).ok())
        .ok_or_else(|| AppError::Auth("No sign-in in progress".into()))?;

    if pending.csrf != query.state {
        return Err(AppError::Auth("Invalid CSRF token".into()));
    }

    let profile = oidc
        .complete(query.code, &Nonce::new(pending.nonce))
        .await?;
    let user = find_or_create_user(state.user_repo.as_ref(), profile, Role::User).await?;

    let jar = session::start_session(jar, &user.id);
    Ok((jar, Redirect::to(&format!("{}/profile", state.client_url))))
}

/// `GET /auth/logout` — clears the session cookie.
pub async fn logout_handler(jar: SignedCookieJar) -> (SignedCookieJar, &'static str) {
    (session::end_session(jar), "Logged out")
}

/// `GET /getuser` — the signed-in user, or `null`.
pub async fn current_user_handler(Viewer(user): Viewer) -> Json<Option<UserView>> {
    Json(user.as_ref().map(UserView::from))
}
