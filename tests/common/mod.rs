#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum_extra::extract::cookie::Key;
use bson::oid::ObjectId;
use chrono::Utc;
use testcontainers::runners::AsyncRunner;
use testcontainers::ContainerAsync;
use testcontainers_modules::mongo::Mongo;

use perkboard::app::{router, AppState};
use perkboard::db::models::{Perk, Post};
use perkboard::db::perk_repository::{MongoPerkRepository, PerkRepository};
use perkboard::db::post_repository::{MongoPostRepository, PostRepository};
use perkboard::db::user_repository::{MongoUserRepository, UserRepository};

/// Holds the MongoDB container and provides the Axum router for integration tests.
///
/// The container is kept alive for as long as this struct lives.
pub struct TestEnv {
    _mongo: ContainerAsync<Mongo>,
    pub db: mongodb::Database,
    pub router: Router,
    pub post_repo: Arc<dyn PostRepository>,
    pub perk_repo: Arc<dyn PerkRepository>,
    pub user_repo: Arc<dyn UserRepository>,
}

impl TestEnv {
    /// Start MongoDB and build a router with demo sign-in enabled.
    pub async fn start() -> Self {
        Self::start_with(true).await
    }

    pub async fn start_with(demo_mode: bool) -> Self {
        let mongo_container = Mongo::default()
            .start()
            .await
            .expect("Failed to start MongoDB container");
        let mongo_port = mongo_container
            .get_host_port_ipv4(27017)
            .await
            .expect("Failed to get MongoDB port");
        let mongo_uri = format!("mongodb://127.0.0.1:{}", mongo_port);
        let mongo_client = mongodb::Client::with_uri_str(&mongo_uri)
            .await
            .expect("Failed to connect to MongoDB");
        let db = mongo_client.database("perkboard_test");

        let post_repo: Arc<dyn PostRepository> = Arc::new(MongoPostRepository::new(&db));
        let perk_repo: Arc<dyn PerkRepository> = Arc::new(MongoPerkRepository::new(&db));
        let user_repo: Arc<dyn UserRepository> = Arc::new(MongoUserRepository::new(&db));

        let state = AppState {
            post_repo: post_repo.clone(),
            perk_repo: perk_repo.clone(),
            user_repo: user_repo.clone(),
            oidc: None,
            cookie_key: Key::generate(),
            client_url: "http://localhost:3000".to_string(),
            perk_definitions_path: PathBuf::from(env!("CARGO_MANIFEST_DIR"))
                .join("assets/perk_definitions.txt"),
            demo_mode,
        };

        Self {
            _mongo: mongo_container,
            db,
            router: router(state),
            post_repo,
            perk_repo,
            user_repo,
        }
    }

    /// Build an `axum_test::TestServer` that keeps cookies between requests.
    pub fn server(&self) -> axum_test::TestServer {
        axum_test::TestServer::builder()
            .save_cookies()
            .try_build(self.router.clone())
            .expect("Failed to build TestServer")
    }

    /// Insert a post directly through the repository.
    pub async fn seed_post(&self, name: &str, description: &str, perks: &[&Perk]) -> Post {
        let post = Post {
            id: ObjectId::new(),
            name: name.to_string(),
            description: description.to_string(),
            saves: 0,
            perks: perks.iter().map(|p| p.id.to_hex()).collect(),
            author_id: ObjectId::new().to_hex(),
            kind: "Survivor".to_string(),
            created_at: Utc::now(),
        };
        self.post_repo
            .create(post.clone())
            .await
            .expect("Failed to seed post");
        post
    }

    /// Insert a perk directly into the `perks` collection.
    pub async fn seed_perk(&self, name: &str) -> Perk {
        let perk = Perk {
            id: ObjectId::new(),
            name: name.to_string(),
            description: format!("{name} description"),
            owner: "Meg Thomas".to_string(),
            role: "Survivor".to_string(),
            img_url: String::new(),
        };
        self.db
            .collection::<Perk>("perks")
            .insert_one(&perk)
            .await
            .expect("Failed to seed perk");
        perk
    }
}

/// Sign in through demo login and return the user JSON.
pub async fn login(
    server: &axum_test::TestServer,
    username: &str,
    role: Option<&str>,
) -> serde_json::Value {
    let response = server
        .post("/auth/demo-login")
        .json(&serde_json::json!({
            "username": username,
            "role": role,
        }))
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    body["user"].clone()
}
