use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::AppError;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Doctor {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub speciality: String,
    pub phone: Option<String>,
    /// Hex color used by the scheduling calendar.
    pub color_code: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Doctor {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDoctorRequest {
    pub first_name: String,
    pub last_name: String,
    pub speciality: String,
    pub phone: Option<String>,
    pub color_code: Option<String>,
}

impl CreateDoctorRequest {
    pub fn validate(&self) -> Result<(), DoctorError> {
        if self.first_name.trim().len() < 2 {
            return Err(DoctorError::ValidationError(
                "First name must be at least 2 characters".to_string(),
            ));
        }
        if self.last_name.trim().len() < 2 {
            return Err(DoctorError::ValidationError(
                "Last name must be at least 2 characters".to_string(),
            ));
        }
        if self.speciality.trim().is_empty() {
            return Err(DoctorError::ValidationError(
                "Speciality is required".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum DoctorError {
    #[error("Doctor not found")]
    NotFound,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<DoctorError> for AppError {
    fn from(e: DoctorError) -> Self {
        match e {
            DoctorError::NotFound => AppError::NotFound(e.to_string()),
            DoctorError::ValidationError(msg) => AppError::ValidationError(msg),
            DoctorError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn accepts_complete_request() {
        let request = CreateDoctorRequest {
            first_name: "Laura".to_string(),
            last_name: "Gómez".to_string(),
            speciality: "Fonoaudiología".to_string(),
            phone: None,
            color_code: Some("#4f46e5".to_string()),
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn rejects_blank_speciality() {
        let request = CreateDoctorRequest {
            first_name: "Laura".to_string(),
            last_name: "Gómez".to_string(),
            speciality: "  ".to_string(),
            phone: None,
            color_code: None,
        };
        assert_matches!(request.validate().unwrap_err(), DoctorError::ValidationError(_));
    }
}
