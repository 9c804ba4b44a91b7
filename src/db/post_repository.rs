use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::doc;
use futures::TryStreamExt;

use crate::db::models::Post;
use crate::error::AppError;

/// Repository trait for post operations.
///
/// This trait allows mocking the database layer in tests.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// List every post, oldest first.
    async fn list_all(&self) -> Result<Vec<Post>, AppError>;

    /// Find a post by its hex id. Malformed ids are treated as missing.
    async fn find_by_id(&self, id: &str) -> Result<Option<Post>, AppError>;

    /// Fetch the posts whose ids appear in `ids`.
    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<Post>, AppError>;

    /// Posts written by the given author.
    async fn find_by_author(&self, author_id: &str) -> Result<Vec<Post>, AppError>;

    async fn create(&self, post: Post) -> Result<(), AppError>;

    /// Add `delta` to the post's save counter.
    async fn adjust_saves(&self, id: &ObjectId, delta: i64) -> Result<(), AppError>;
}

/// MongoDB implementation of the PostRepository.
pub struct MongoPostRepository {
    collection: mongodb::Collection<Post>,
}

impl MongoPostRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        Self {
            collection: db.collection("posts"),
        }
    }

    async fn find_many(&self, filter: bson::Document) -> Result<Vec<Post>, AppError> {
        let mut cursor = self.collection.find(filter).await?;

        let mut posts = Vec::new();
        while let Some(post) = cursor.try_next().await? {
            posts.push(post);
        }

        Ok(posts)
    }
}

#[async_trait]
impl PostRepository for MongoPostRepository {
    async fn list_all(&self) -> Result<Vec<Post>, AppError> {
        self.find_many(doc! {}).await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Post>, AppError> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(None);
        };

        Ok(self.collection.find_one(doc! { "_id": oid }).await?)
    }

    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<Post>, AppError> {
        let oids: Vec<ObjectId> = ids
            .iter()
            .filter_map(|id| ObjectId::parse_str(id).ok())
            .collect();

        self.find_many(doc! { "_id": { "$in": oids } }).await
    }

    async fn find_by_author(&self, author_id: &str) -> Result<Vec<Post>, AppError> {
        self.find_many(doc! { "author_id": author_id }).await
    }

    async fn create(&self, post: Post) -> Result<(), AppError> {
        self.collection.insert_one(&post).await?;
        Ok(())
    }

    async fn adjust_saves(&self, id: &ObjectId, delta: i64) -> Result<(), AppError> {
        self.collection
            .update_one(doc! { "_id": *id }, doc! { "$inc": { "saves": delta } })
            .await?;
        Ok(())
    }
}
