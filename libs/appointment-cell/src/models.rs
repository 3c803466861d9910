use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use shared_models::AppError;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    /// Authorization the session bills against; NULL for private patients
    /// or when no ACTIVE authorization existed at booking time.
    pub authorization_id: Option<Uuid>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub appointment_type: AppointmentType,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub price_total: i64,
    pub price_copay: i64,
    pub price_insurer: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "appointment_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
    NoShow,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "SCHEDULED"),
            AppointmentStatus::Completed => write!(f, "COMPLETED"),
            AppointmentStatus::Cancelled => write!(f, "CANCELLED"),
            AppointmentStatus::NoShow => write!(f, "NO_SHOW"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "appointment_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentType {
    FirstTime,
    Evaluation,
    FollowUp,
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

pub const MIN_DURATION_MINUTES: i64 = 15;
pub const MAX_DURATION_MINUTES: i64 = 240;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppointmentRequest {
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub duration_minutes: i64,
    #[serde(rename = "type")]
    pub appointment_type: AppointmentType,
    pub notes: Option<String>,
    pub price_total: i64,
    /// Declared copay; only meaningful for INSURANCE_COPAY patients.
    pub price_copay: Option<i64>,
}

impl CreateAppointmentRequest {
    pub fn validate(&self) -> Result<(), AppointmentError> {
        validate_appointment_fields(self.duration_minutes, self.price_total, self.price_copay)
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        self.start_time + Duration::minutes(self.duration_minutes)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub doctor_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub duration_minutes: i64,
    #[serde(rename = "type")]
    pub appointment_type: AppointmentType,
    pub notes: Option<String>,
    pub price_total: i64,
    pub price_copay: Option<i64>,
}

impl UpdateAppointmentRequest {
    pub fn validate(&self) -> Result<(), AppointmentError> {
        validate_appointment_fields(self.duration_minutes, self.price_total, self.price_copay)
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        self.start_time + Duration::minutes(self.duration_minutes)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAppointmentStatusRequest {
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentSearchQuery {
    pub patient_id: Option<Uuid>,
    pub doctor_id: Option<Uuid>,
    pub status: Option<AppointmentStatus>,
    #[serde(rename = "type")]
    pub appointment_type: Option<AppointmentType>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

fn validate_appointment_fields(
    duration_minutes: i64,
    price_total: i64,
    price_copay: Option<i64>,
) -> Result<(), AppointmentError> {
    if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&duration_minutes) {
        return Err(AppointmentError::ValidationError(format!(
            "Duration must be between {} and {} minutes",
            MIN_DURATION_MINUTES, MAX_DURATION_MINUTES
        )));
    }
    if price_total < 0 {
        return Err(AppointmentError::ValidationError(
            "Session price cannot be negative".to_string(),
        ));
    }
    if let Some(copay) = price_copay {
        if copay < 0 {
            return Err(AppointmentError::ValidationError(
                "Copay cannot be negative".to_string(),
            ));
        }
        if copay > price_total {
            return Err(AppointmentError::CopayExceedsTotal);
        }
    }
    Ok(())
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Patient not found")]
    PatientNotFound,

    #[error("The patient already has an appointment in this time slot")]
    ScheduleConflict,

    #[error("Only scheduled appointments can be modified")]
    NotEditable,

    #[error("Copay cannot exceed the session price")]
    CopayExceedsTotal,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<AppointmentError> for AppError {
    fn from(e: AppointmentError) -> Self {
        match e {
            AppointmentError::NotFound => AppError::NotFound(e.to_string()),
            AppointmentError::PatientNotFound => AppError::NotFound(e.to_string()),
            AppointmentError::ScheduleConflict => AppError::Conflict(e.to_string()),
            AppointmentError::NotEditable => AppError::Conflict(e.to_string()),
            AppointmentError::CopayExceedsTotal => AppError::BadRequest(e.to_string()),
            AppointmentError::ValidationError(msg) => AppError::ValidationError(msg),
            AppointmentError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::TimeZone;

    fn base_request() -> CreateAppointmentRequest {
        CreateAppointmentRequest {
            patient_id: Uuid::new_v4(),
            doctor_id: Uuid::new_v4(),
            start_time: Utc.with_ymd_and_hms(2026, 3, 2, 14, 0, 0).unwrap(),
            duration_minutes: 45,
            appointment_type: AppointmentType::FollowUp,
            notes: None,
            price_total: 100_000,
            price_copay: Some(30_000),
        }
    }

    #[test]
    fn computes_end_from_duration() {
        let request = base_request();
        assert_eq!(
            request.end_time(),
            Utc.with_ymd_and_hms(2026, 3, 2, 14, 45, 0).unwrap()
        );
    }

    #[test]
    fn rejects_duration_outside_bounds() {
        let mut request = base_request();
        request.duration_minutes = 10;
        assert!(request.validate().is_err());

        request.duration_minutes = 241;
        assert!(request.validate().is_err());

        request.duration_minutes = 240;
        assert!(request.validate().is_ok());
    }

    #[test]
    fn rejects_copay_above_total() {
        let mut request = base_request();
        request.price_total = 100_000;
        request.price_copay = Some(150_000);
        assert_matches!(
            request.validate().unwrap_err(),
            AppointmentError::CopayExceedsTotal
        );
    }

    #[test]
    fn rejects_negative_amounts() {
        let mut request = base_request();
        request.price_total = -1;
        assert!(request.validate().is_err());

        request.price_total = 100_000;
        request.price_copay = Some(-1);
        assert!(request.validate().is_err());
    }
}
