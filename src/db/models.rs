use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::models::Role;
use crate::perks::definitions::PerkDefinition;
use crate::search::fuzzy::FuzzyKeys;

/// A user-authored bundle of perks, stored in the `posts` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Number of users that saved this post.
    #[serde(default)]
    pub saves: i64,
    /// Hex ids of the perks tagged on this post.
    pub perks: Vec<String>,
    pub author_id: String,
    /// Loadout category chosen by the author (e.g. "Survivor").
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl FuzzyKeys for Post {
    fn fuzzy_keys(&self) -> Vec<&str> {
        vec![&self.name, &self.description]
    }
}

/// A game perk, stored in the `perks` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Perk {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub description: String,
    pub owner: String,
    pub role: String,
    #[serde(default)]
    pub img_url: String,
}

impl FuzzyKeys for Perk {
    fn fuzzy_keys(&self) -> Vec<&str> {
        vec![&self.name]
    }
}

/// The external account a user signed in with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderIdentity {
    /// Provider name, e.g. `google`.
    pub provider: String,
    /// Stable subject identifier issued by the provider.
    pub subject: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    #[serde(default)]
    pub perk_skin: Option<String>,
}

/// A site member, stored in the `users` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub identity: ProviderIdentity,
    pub username: String,
    #[serde(default)]
    pub saved_posts: Vec<String>,
    #[serde(default)]
    pub profile_pic: Option<String>,
    /// Hex ids of the users this user follows.
    #[serde(default)]
    pub following: Vec<String>,
    #[serde(default)]
    pub followers: i64,
    #[serde(default)]
    pub save_count: i64,
    #[serde(default)]
    pub post_count: i64,
    #[serde(default)]
    pub settings: Option<UserSettings>,
    #[serde(default)]
    pub role: Role,
}

impl User {
    /// A fresh account for a first-time sign-in.
    pub fn new(identity: ProviderIdentity, username: String) -> Self {
        Self {
            id: ObjectId::new(),
            identity,
            username,
            saved_posts: vec![],
            profile_pic: None,
            following: vec![],
            followers: 0,
            save_count: 0,
            post_count: 0,
            settings: None,
            role: Role::User,
        }
    }

    pub fn has_saved(&self, post_id: &str) -> bool {
        self.saved_posts.iter().any(|id| id == post_id)
    }
}

/// Post as returned to clients, annotated for the viewing user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub saves: i64,
    pub perks: Vec<String>,
    pub author_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub created_at: DateTime<Utc>,
    pub is_saved: bool,
}

impl PostView {
    pub fn new(post: &Post, is_saved: bool) -> Self {
        Self {
            id: post.id.to_hex(),
            name: post.name.clone(),
            description: post.description.clone(),
            saves: post.saves,
            perks: post.perks.clone(),
            author_id: post.author_id.clone(),
            kind: post.kind.clone(),
            created_at: post.created_at,
            is_saved,
        }
    }
}

/// Annotate posts with whether `viewer` has saved them.
///
/// Anonymous viewers see every post as unsaved.
pub fn annotate_saved<'a, I>(posts: I, viewer: Option<&User>) -> Vec<PostView>
where
    I: IntoIterator<Item = &'a Post>,
{
    posts
        .into_iter()
        .map(|post| {
            let saved = viewer.is_some_and(|user| user.has_saved(&post.id.to_hex()));
            PostView::new(post, saved)
        })
        .collect()
}

/// Public user profile returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserView {
    pub id: String,
    pub username: String,
    pub profile_pic: Option<String>,
    pub saved_posts: Vec<String>,
    pub following: Vec<String>,
    pub followers: i64,
    pub save_count: i64,
    pub post_count: i64,
    pub settings: Option<UserSettings>,
    pub role: Role,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_hex(),
            username: user.username.clone(),
            profile_pic: user.profile_pic.clone(),
            saved_posts: user.saved_posts.clone(),
            following: user.following.clone(),
            followers: user.followers,
            save_count: user.save_count,
            post_count: user.post_count,
            settings: user.settings.clone(),
            role: user.role,
        }
    }
}

/// The request payload for creating a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPostRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub perks: Vec<String>,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Body of `/savepost` and `/unsavepost`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostIdRequest {
    pub post_id: String,
}

/// A plain `{ "message": ... }` acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// One entry of the `/updatePerks` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerkUpdate {
    #[serde(flatten)]
    pub definition: PerkDefinition,
    #[serde(default)]
    pub img_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePerksResponse {
    pub message: String,
    pub upserted: usize,
}
