use axum::extract::State;
use axum::Json;

use crate::app::AppState;
use crate::auth::middleware::Admin;
use crate::db::models::{Perk, PerkUpdate, UpdatePerksResponse};
use crate::db::perk_repository::PerkRepository;
use crate::error::AppError;
use crate::perks::definitions::{read_perk_definitions, PerkDefinition};

/// Validate and upsert a batch of perks by name.
pub async fn process_update_perks(
    repo: &dyn PerkRepository,
    updates: Vec<PerkUpdate>,
) -> Result<UpdatePerksResponse, AppError> {
    if let Some(index) = updates
        .iter()
        .position(|u| u.definition.name.trim().is_empty())
    {
        return Err(AppError::BadRequest(format!(
            "Perk at index {index} has an empty name"
        )));
    }

    let requested = updates.len();
    let upserted = repo.upsert_by_name(updates).await?;

    tracing::info!(requested, upserted, "updated perks");
    Ok(UpdatePerksResponse {
        message: "Perks updated".to_string(),
        upserted,
    })
}

/// `GET /perks`
pub async fn list_perks_handler(State(state): State<AppState>) -> Result<Json<Vec<Perk>>, AppError> {
    Ok(Json(state.perk_repo.list_all().await?))
}

/// `GET /perkDefs` — parse the definitions asset. Nothing is stored.
pub async fn perk_definitions_handler(
    State(state): State<AppState>,
    Admin(_): Admin,
) -> Result<Json<Vec<PerkDefinition>>, AppError> {
    let definitions = read_perk_definitions(&state.perk_definitions_path).await?;
    Ok(Json(definitions))
}

/// `POST /updatePerks`
pub async fn update_perks_handler(
    State(state): State<AppState>,
    Admin(admin): Admin,
    Json(updates): Json<Vec<PerkUpdate>>,
) -> Result<Json<UpdatePerksResponse>, AppError> {
    tracing::info!(admin_id = %admin.id, count = updates.len(), "perk update requested");
    let response = process_update_perks(state.perk_repo.as_ref(), updates).await?;
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::perk_repository::MockPerkRepository;

    fn update(name: &str) -> PerkUpdate {
        PerkUpdate {
            definition: PerkDefinition {
                name: name.to_string(),
                description: "Break into a sprint.".to_string(),
                owner: "Meg Thomas".to_string(),
                role: "Survivor".to_string(),
            },
            img_url: None,
        }
    }

    #[tokio::test]
    async fn test_update_perks_reports_count() {
        let mut repo = MockPerkRepository::new();
        repo.expect_upsert_by_name()
            .withf(|perks| perks.len() == 2 && perks[0].definition.name == "Sprint Burst")
            .times(1)
            .returning(|perks| Ok(perks.len()));

        let response = process_update_perks(&repo, vec![update("Sprint Burst"), update("Adrenaline")])
            .await
            .unwrap();

        assert_eq!(response.upserted, 2);
        assert_eq!(response.message, "Perks updated");
    }

    #[tokio::test]
    async fn test_update_perks_rejects_empty_name() {
        let mut repo = MockPerkRepository::new();
        repo.expect_upsert_by_name().never();

        let result = process_update_perks(&repo, vec![update("Sprint Burst"), update(" ")]).await;

        match result {
            Err(AppError::BadRequest(msg)) => assert!(msg.contains("index 1")),
            other => panic!("Expected BadRequest error, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_update_perks_propagates_database_error() {
        let mut repo = MockPerkRepository::new();
        repo.expect_upsert_by_name()
            .returning(|_| Err(AppError::Database("connection reset".into())));

        let result = process_update_perks(&repo, vec![update("Sprint Burst")]).await;
        assert!(matches!(result, Err(AppError::Database(_))));
    }
}
