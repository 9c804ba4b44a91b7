use async_trait::async_trait;

use crate::db::models::{Perk, PerkUpdate};
use crate::error::AppError;

/// Repository trait for perk operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PerkRepository: Send + Sync {
    /// List all stored perks, sorted by name.
    async fn list_all(&self) -> Result<Vec<Perk>, AppError>;

    /// Insert or replace perks matched by name. Returns how many were written.
    async fn upsert_by_name(&self, perks: Vec<PerkUpdate>) -> Result<usize, AppError>;
}

/// MongoDB implementation of the PerkRepository.
pub struct MongoPerkRepository {
    collection: mongodb::Collection<Perk>,
}

impl MongoPerkRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        Self {
            collection: db.collection("perks"),
        }
    }
}

#[async_trait]
impl PerkRepository for MongoPerkRepository {
    async fn list_all(&self) -> Result<Vec<Perk>, AppError> {
        use futures::TryStreamExt;
        use mongodb::bson::doc;
        use mongodb::options::FindOptions;

        let options = FindOptions::builder().sort(doc! { "name": 1 }).build();

        let mut cursor = self
            .collection
            .find(doc! {})
            .with_options(options)
            .await?;

        let mut perks = Vec::new();
        while let Some(perk) = cursor.try_next().await? {
            perks.push(perk);
        }

        Ok(perks)
    }

    async fn upsert_by_name(&self, perks: Vec<PerkUpdate>) -> Result<usize, AppError> {
        use mongodb::bson::doc;
        use mongodb::options::UpdateOptions;

        let mut written = 0;
        for update in perks {
            let definition = update.definition;
            let mut fields = doc! {
                "name": &definition.name,
                "description": &definition.description,
                "owner": &definition.owner,
                "role": &definition.role,
            };
            if let Some(img_url) = &update.img_url {
                fields.insert("img_url", img_url);
            }

            let options = UpdateOptions::builder().upsert(true).build();
            self.collection
                .update_one(
                    doc! { "name": &definition.name },
                    doc! { "$set": fields },
                )
                .with_options(options)
                .await?;
            written += 1;
        }

        Ok(written)
    }
}
