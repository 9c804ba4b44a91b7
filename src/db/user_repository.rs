use async_trait::async_trait;
use bson::doc;
use bson::oid::ObjectId;

use crate::db::models::User;
use crate::error::AppError;

/// Repository trait for user accounts.
///
/// The list-mutating operations report whether anything changed so callers
/// can keep related counters in step.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by hex id. Malformed ids are treated as missing.
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError>;

    /// Find the account linked to a provider identity.
    async fn find_by_identity(
        &self,
        provider: &str,
        subject: &str,
    ) -> Result<Option<User>, AppError>;

    async fn create(&self, user: User) -> Result<(), AppError>;

    /// Add `post_id` to the user's saved posts. Returns `false` if it was
    /// already saved.
    async fn add_saved_post(&self, user_id: &ObjectId, post_id: &str) -> Result<bool, AppError>;

    /// Remove `post_id` from the user's saved posts. Returns `false` if it
    /// was not saved.
    async fn remove_saved_post(&self, user_id: &ObjectId, post_id: &str)
        -> Result<bool, AppError>;

    /// Record that `user_id` follows `target_id` and bump the target's
    /// follower count. Returns `false` if already following.
    async fn follow(&self, user_id: &ObjectId, target_id: &ObjectId) -> Result<bool, AppError>;

    /// Reverse of [`UserRepository::follow`].
    async fn unfollow(&self, user_id: &ObjectId, target_id: &ObjectId) -> Result<bool, AppError>;

    async fn increment_post_count(&self, user_id: &ObjectId) -> Result<(), AppError>;
}

/// MongoDB implementation of the UserRepository.
pub struct MongoUserRepository {
    collection: mongodb::Collection<User>,
}

impl MongoUserRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        Self {
            collection: db.collection("users"),
        }
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(None);
        };

        Ok(self.collection.find_one(doc! { "_id": oid }).await?)
    }

    async fn find_by_identity(
        &self,
        provider: &str,
        subject: &str,
    ) -> Result<Option<User>, AppError> {
        let filter = doc! {
            "identity.provider": provider,
            "identity.subject": subject,
        };

        Ok(self.collection.find_one(filter).await?)
    }

    async fn create(&self, user: User) -> Result<(), AppError> {
        self.collection.insert_one(&user).await?;
        Ok(())
    }

    async fn add_saved_post(&self, user_id: &ObjectId, post_id: &str) -> Result<bool, AppError> {
        let result = self
            .collection
            .update_one(
                doc! { "_id": *user_id },
                doc! { "$addToSet": { "saved_posts": post_id } },
            )
            .await?;

        Ok(result.modified_count > 0)
    }

    async fn remove_saved_post(
        &self,
        user_id: &ObjectId,
        post_id: &str,
    ) -> Result<bool, AppError> {
        let result = self
            .collection
            .update_one(
                doc! { "_id": *user_id },
                doc! { "$pull": { "saved_posts": post_id } },
            )
            .await?;

        Ok(result.modified_count > 0)
    }

    async fn follow(&self, user_id: &ObjectId, target_id: &ObjectId) -> Result<bool, AppError> {
        let result = self
            .collection
            .update_one(
                doc! { "_id": *user_id },
                doc! { "$addToSet": { "following": target_id.to_hex() } },
            )
            .await?;

        if result.modified_count == 0 {
            return Ok(false);
        }

        self.collection
            .update_one(
                doc! { "_id": *target_id },
                doc! { "$inc": { "followers": 1_i64 } },
            )
            .await?;

        Ok(true)
    }

    async fn unfollow(&self, user_id: &ObjectId, target_id: &ObjectId) -> Result<bool, AppError> {
        let result = self
            .collection
            .update_one(
                doc! { "_id": *user_id },
                doc! { "$pull": { "following": target_id.to_hex() } },
            )
            .await?;

        if result.modified_count == 0 {
            return Ok(false);
        }

        self.collection
            .update_one(
                doc! { "_id": *target_id },
                doc! { "$inc": { "followers": -1_i64 } },
            )
            .await?;

        Ok(true)
    }

    async fn increment_post_count(&self, user_id: &ObjectId) -> Result<(), AppError> {
        self.collection
            .update_one(
                doc! { "_id": *user_id },
                doc! { "$inc": { "post_count": 1_i64 } },
            )
            .await?;
        Ok(())
    }
}
