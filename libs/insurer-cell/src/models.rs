use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use patient_cell::models::PatientType;
use shared_models::AppError;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Insurer {
    pub id: Uuid,
    pub name: String,
    /// Colombian tax id.
    pub nit: Option<String>,
    pub active: bool,
    /// Sentinel row used by the UI to represent out-of-pocket billing.
    pub is_private: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Pricing template the booking form uses to prefill the session price and
/// copay for an insurer/affiliation-type combination.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tariff {
    pub id: Uuid,
    pub name: String,
    pub insurer_id: Uuid,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub patient_type: PatientType,
    pub cost_total: i64,
    pub copay_amount: i64,
    pub insurer_amount: i64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum InsurerError {
    #[error("Insurer not found")]
    NotFound,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<InsurerError> for AppError {
    fn from(e: InsurerError) -> Self {
        match e {
            InsurerError::NotFound => AppError::NotFound(e.to_string()),
            InsurerError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}
