use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use shared_models::AppError;

// ==============================================================================
// CORE AUTHORIZATION MODELS
// ==============================================================================

/// An insurer-issued allowance of N sessions for a patient, valid within a
/// date range. Appointments billed against it consume `used_sessions`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Authorization {
    pub id: Uuid,
    pub code: String,
    pub insurer_id: Uuid,
    pub patient_id: Uuid,
    pub total_sessions: i32,
    pub used_sessions: i32,
    pub valid_from: NaiveDate,
    pub valid_until: NaiveDate,
    pub status: AuthorizationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Authorization {
    pub fn remaining_sessions(&self) -> i32 {
        self.total_sessions - self.used_sessions
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "authorization_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthorizationStatus {
    Active,
    Completed,
    Expired,
}

impl fmt::Display for AuthorizationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthorizationStatus::Active => write!(f, "ACTIVE"),
            AuthorizationStatus::Completed => write!(f, "COMPLETED"),
            AuthorizationStatus::Expired => write!(f, "EXPIRED"),
        }
    }
}

/// What to do with a still-ACTIVE authorization when a new one supersedes it.
/// Only terminal states are valid choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PreviousAuthAction {
    Completed,
    Expired,
}

impl PreviousAuthAction {
    pub fn as_status(self) -> AuthorizationStatus {
        match self {
            PreviousAuthAction::Completed => AuthorizationStatus::Completed,
            PreviousAuthAction::Expired => AuthorizationStatus::Expired,
        }
    }
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAuthorizationRequest {
    pub patient_id: Uuid,
    pub insurer_id: Uuid,
    pub code: String,
    pub total_sessions: i32,
    pub valid_from: NaiveDate,
    pub valid_until: NaiveDate,
    pub previous_auth_action: Option<PreviousAuthAction>,
}

impl CreateAuthorizationRequest {
    /// Shape validation; returns the first violated constraint's message.
    pub fn validate(&self) -> Result<(), AuthorizationError> {
        validate_authorization_fields(
            &self.code,
            self.total_sessions,
            self.valid_from,
            self.valid_until,
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAuthorizationRequest {
    pub code: String,
    pub total_sessions: i32,
    pub valid_from: NaiveDate,
    pub valid_until: NaiveDate,
}

impl UpdateAuthorizationRequest {
    pub fn validate(&self) -> Result<(), AuthorizationError> {
        validate_authorization_fields(
            &self.code,
            self.total_sessions,
            self.valid_from,
            self.valid_until,
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAuthorizationStatusRequest {
    pub status: AuthorizationStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizationSearchQuery {
    pub patient_id: Option<Uuid>,
    pub insurer_id: Option<Uuid>,
    pub status: Option<AuthorizationStatus>,
}

pub(crate) fn validate_authorization_fields(
    code: &str,
    total_sessions: i32,
    valid_from: NaiveDate,
    valid_until: NaiveDate,
) -> Result<(), AuthorizationError> {
    if code.trim().len() < 3 {
        return Err(AuthorizationError::ValidationError(
            "Authorization code must be at least 3 characters".to_string(),
        ));
    }
    if total_sessions < 1 {
        return Err(AuthorizationError::ValidationError(
            "An authorization must cover at least 1 session".to_string(),
        ));
    }
    if total_sessions > 100 {
        return Err(AuthorizationError::ValidationError(
            "An authorization cannot cover more than 100 sessions".to_string(),
        ));
    }
    if valid_until < valid_from {
        return Err(AuthorizationError::ValidationError(
            "Validity end date cannot precede the start date".to_string(),
        ));
    }
    Ok(())
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthorizationError {
    #[error("Authorization not found")]
    NotFound,

    #[error("This code already exists for this insurer")]
    DuplicateCode,

    #[error("An active authorization already exists; decide what to do with it first")]
    ActiveAuthorizationUndecided,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<AuthorizationError> for AppError {
    fn from(e: AuthorizationError) -> Self {
        match e {
            AuthorizationError::NotFound => AppError::NotFound(e.to_string()),
            AuthorizationError::DuplicateCode => AppError::Conflict(e.to_string()),
            AuthorizationError::ActiveAuthorizationUndecided => AppError::Conflict(e.to_string()),
            AuthorizationError::ValidationError(msg) => AppError::ValidationError(msg),
            AuthorizationError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn base_request() -> CreateAuthorizationRequest {
        CreateAuthorizationRequest {
            patient_id: Uuid::new_v4(),
            insurer_id: Uuid::new_v4(),
            code: "AUT-001".to_string(),
            total_sessions: 10,
            valid_from: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            valid_until: NaiveDate::from_ymd_opt(2026, 6, 30).unwrap(),
            previous_auth_action: None,
        }
    }

    #[test]
    fn accepts_well_formed_request() {
        assert!(base_request().validate().is_ok());
    }

    #[test]
    fn rejects_short_code() {
        let mut request = base_request();
        request.code = "A1".to_string();
        let err = request.validate().unwrap_err();
        assert_matches!(err, AuthorizationError::ValidationError(_));
    }

    #[test]
    fn rejects_session_count_outside_bounds() {
        let mut request = base_request();
        request.total_sessions = 0;
        assert!(request.validate().is_err());

        request.total_sessions = 101;
        assert!(request.validate().is_err());

        request.total_sessions = 100;
        assert!(request.validate().is_ok());
    }

    #[test]
    fn rejects_inverted_validity_window() {
        let mut request = base_request();
        request.valid_until = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn previous_action_maps_to_terminal_status() {
        assert_eq!(
            PreviousAuthAction::Completed.as_status(),
            AuthorizationStatus::Completed
        );
        assert_eq!(
            PreviousAuthAction::Expired.as_status(),
            AuthorizationStatus::Expired
        );
    }
}
