use serde::Deserialize;

/// OpenID Connect provider settings, the `[oidc]` table of the config file.
///
/// Environment overrides use a double underscore, e.g.
/// `PERKBOARD_OIDC__CLIENT_SECRET`.
#[derive(Debug, Clone, Deserialize)]
pub struct OidcConfig {
    /// Route name of the provider, `/auth/{provider}`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// e.g. `https://accounts.google.com`
    pub issuer_url: String,
    pub client_id: String,
    pub client_secret: String,
    /// Must point at `/auth/{provider}/callback` on this server.
    pub redirect_uri: String,
}

fn default_provider() -> String {
    "google".to_string()
}
