use std::path::{Path, PathBuf};

use axum_extra::extract::cookie::Key;
use serde::Deserialize;

use crate::auth::config::OidcConfig;
use crate::error::AppError;

/// Default location of the optional configuration file.
pub const DEFAULT_CONFIG_FILE: &str = "perkboard.toml";

/// Server configuration.
///
/// Sources, later ones overriding earlier ones: built-in defaults, the
/// optional config file, then `PERKBOARD_*` environment variables
/// (e.g. `PERKBOARD_MONGODB_URI`, `PERKBOARD_OIDC__CLIENT_ID`).
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub listen_addr: String,
    pub mongodb_uri: String,
    pub mongodb_database: String,
    pub client_url: String,
    pub session_secret: String,
    pub perk_definitions_path: PathBuf,
    pub demo_mode: bool,
    /// Provider sign-in is disabled when absent.
    #[serde(default)]
    pub oidc: Option<OidcConfig>,
}

impl AppConfig {
    pub fn load(file: &Path) -> Result<Self, AppError> {
        let settings = config::Config::builder()
            .set_default("listen_addr", "0.0.0.0:5000")
            .and_then(|b| b.set_default("mongodb_uri", "mongodb://localhost:27017"))
            .and_then(|b| b.set_default("mongodb_database", "perkboard"))
            .and_then(|b| b.set_default("client_url", "http://localhost:3000"))
            .and_then(|b| b.set_default("session_secret", ""))
            .and_then(|b| b.set_default("perk_definitions_path", "assets/perk_definitions.txt"))
            .and_then(|b| b.set_default("demo_mode", false))?
            .add_source(config::File::from(file).required(false))
            .add_source(
                config::Environment::with_prefix("PERKBOARD")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Signing key for session cookies, derived from `session_secret`.
    pub fn cookie_key(&self) -> Result<Key, AppError> {
        Key::try_from(self.session_secret.as_bytes()).map_err(|_| {
            AppError::Internal("session_secret must be at least 64 bytes long".into())
        })
    }
}
