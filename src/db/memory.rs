//! In-memory repositories for unit tests.

use std::sync::Mutex;

use async_trait::async_trait;
use bson::oid::ObjectId;

use crate::db::models::{Post, User};
use crate::db::post_repository::PostRepository;
use crate::db::user_repository::UserRepository;
use crate::error::AppError;

#[derive(Default)]
pub struct MemoryPosts {
    pub posts: Mutex<Vec<Post>>,
}

impl MemoryPosts {
    pub fn with(posts: Vec<Post>) -> Self {
        Self {
            posts: Mutex::new(posts),
        }
    }

    pub fn get(&self, id: &ObjectId) -> Option<Post> {
        self.posts.lock().unwrap().iter().find(|p| p.id == *id).cloned()
    }
}

#[async_trait]
impl PostRepository for MemoryPosts {
    async fn list_all(&self) -> Result<Vec<Post>, AppError> {
        Ok(self.posts.lock().unwrap().clone())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Post>, AppError> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(None);
        };
        Ok(self.get(&oid))
    }

    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<Post>, AppError> {
        Ok(self
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| ids.contains(&p.id.to_hex()))
            .cloned()
            .collect())
    }

    async fn find_by_author(&self, author_id: &str) -> Result<Vec<Post>, AppError> {
        Ok(self
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.author_id == author_id)
            .cloned()
            .collect())
    }

    async fn create(&self, post: Post) -> Result<(), AppError> {
        self.posts.lock().unwrap().push(post);
        Ok(())
    }

    async fn adjust_saves(&self, id: &ObjectId, delta: i64) -> Result<(), AppError> {
        if let Some(post) = self.posts.lock().unwrap().iter_mut().find(|p| p.id == *id) {
            post.saves += delta;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryUsers {
    pub users: Mutex<Vec<User>>,
}

impl MemoryUsers {
    pub fn with(users: Vec<User>) -> Self {
        Self {
            users: Mutex::new(users),
        }
    }

    pub fn get(&self, id: &ObjectId) -> Option<User> {
        self.users.lock().unwrap().iter().find(|u| u.id == *id).cloned()
    }

    fn update<F: FnOnce(&mut User) -> bool>(&self, id: &ObjectId, f: F) -> bool {
        self.users
            .lock()
            .unwrap()
            .iter_mut()
            .find(|u| u.id == *id)
            .map(f)
            .unwrap_or(false)
    }
}

#[async_trait]
impl UserRepository for MemoryUsers {
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(None);
        };
        Ok(self.get(&oid))
    }

    async fn find_by_identity(
        &self,
        provider: &str,
        subject: &str,
    ) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.identity.provider == provider && u.identity.subject == subject)
            .cloned())
    }

    async fn create(&self, user: User) -> Result<(), AppError> {
        self.users.lock().unwrap().push(user);
        Ok(())
    }

    async fn add_saved_post(&self, user_id: &ObjectId, post_id: &str) -> Result<bool, AppError> {
        Ok(self.update(user_id, |u| {
            if u.has_saved(post_id) {
                return false;
            }
            u.saved_posts.push(post_id.to_string());
            true
        }))
    }

    async fn remove_saved_post(
        &self,
        user_id: &ObjectId,
        post_id: &str,
    ) -> Result<bool, AppError> {
        Ok(self.update(user_id, |u| {
            let before = u.saved_posts.len();
            u.saved_posts.retain(|id| id != post_id);
            u.saved_posts.len() != before
        }))
    }

    async fn follow(&self, user_id: &ObjectId, target_id: &ObjectId) -> Result<bool, AppError> {
        let target = target_id.to_hex();
        let added = self.update(user_id, |u| {
            if u.following.contains(&target) {
                return false;
            }
            u.following.push(target.clone());
            true
        });
        if added {
            self.update(target_id, |u| {
                u.followers += 1;
                true
            });
        }
        Ok(added)
    }

    async fn unfollow(&self, user_id: &ObjectId, target_id: &ObjectId) -> Result<bool, AppError> {
        let target = target_id.to_hex();
        let removed = self.update(user_id, |u| {
            let before = u.following.len();
            u.following.retain(|id| *id != target);
            u.following.len() != before
        });
        if removed {
            self.update(target_id, |u| {
                u.followers -= 1;
                true
            });
        }
        Ok(removed)
    }

    async fn increment_post_count(&self, user_id: &ObjectId) -> Result<(), AppError> {
        self.update(user_id, |u| {
            u.post_count += 1;
            true
        });
        Ok(())
    }
}
