use uuid::Uuid;

use shared_database::Database;

use crate::models::{Insurer, InsurerError, Tariff};

pub struct InsurerService {
    db: Database,
}

impl InsurerService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn list_insurers(&self) -> Result<Vec<Insurer>, InsurerError> {
        sqlx::query_as("SELECT * FROM insurers WHERE active = true ORDER BY name")
            .fetch_all(self.db.pool())
            .await
            .map_err(|e| InsurerError::DatabaseError(e.to_string()))
    }

    pub async fn get_insurer(&self, insurer_id: Uuid) -> Result<Insurer, InsurerError> {
        sqlx::query_as("SELECT * FROM insurers WHERE id = $1")
            .bind(insurer_id)
            .fetch_optional(self.db.pool())
            .await
            .map_err(|e| InsurerError::DatabaseError(e.to_string()))?
            .ok_or(InsurerError::NotFound)
    }

    /// Active tariff templates for an insurer. 404s when the insurer itself
    /// does not exist so the caller can tell "no insurer" from "no tariffs".
    pub async fn list_tariffs(&self, insurer_id: Uuid) -> Result<Vec<Tariff>, InsurerError> {
        self.get_insurer(insurer_id).await?;

        sqlx::query_as(
            "SELECT * FROM tariffs WHERE insurer_id = $1 AND active = true ORDER BY name",
        )
        .bind(insurer_id)
        .fetch_all(self.db.pool())
        .await
        .map_err(|e| InsurerError::DatabaseError(e.to_string()))
    }
}
