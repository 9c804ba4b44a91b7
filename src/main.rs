use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use perkboard::app::{cors_layer, router, AppState};
use perkboard::auth::OidcProvider;
use perkboard::config::{AppConfig, DEFAULT_CONFIG_FILE};
use perkboard::db::perk_repository::MongoPerkRepository;
use perkboard::db::post_repository::MongoPostRepository;
use perkboard::db::user_repository::MongoUserRepository;

#[derive(Parser)]
#[command(about = "Perk loadout sharing backend")]
struct Args {
    /// Configuration file; missing files are ignored
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "perkboard=info,tower_http=info".into()),
        )
        .init();

    let args = Args::parse();
    let config = AppConfig::load(&args.config)?;
    let cookie_key = config.cookie_key()?;

    tracing::info!("Starting perkboard server...");

    let mongo_client = mongodb::Client::with_uri_str(&config.mongodb_uri)
        .await
        .context("Failed to connect to MongoDB")?;
    let mongo_db = mongo_client.database(&config.mongodb_database);
    tracing::info!(database = %config.mongodb_database, "Connected to MongoDB");

    let oidc = match config.oidc.clone() {
        Some(oidc_config) => {
            let provider = OidcProvider::discover(oidc_config).await?;
            tracing::info!(provider = provider.name(), "OIDC sign-in enabled");
            Some(Arc::new(provider))
        }
        None => {
            tracing::warn!("No [oidc] configuration; provider sign-in disabled");
            None
        }
    };

    if config.demo_mode {
        tracing::warn!("Demo mode enabled: POST /auth/demo-login signs in without a provider");
    }

    let state = AppState {
        post_repo: Arc::new(MongoPostRepository::new(&mongo_db)),
        perk_repo: Arc::new(MongoPerkRepository::new(&mongo_db)),
        user_repo: Arc::new(MongoUserRepository::new(&mongo_db)),
        oidc,
        cookie_key,
        client_url: config.client_url.clone(),
        perk_definitions_path: config.perk_definitions_path.clone(),
        demo_mode: config.demo_mode,
    };

    let app = router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors_layer(&config.client_url)?),
    );

    let listener = TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;
    tracing::info!("Listening on http://{}", config.listen_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
