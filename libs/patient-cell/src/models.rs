use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use shared_models::AppError;

// ==============================================================================
// CORE PATIENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Patient {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub document_type: DocumentType,
    pub document_id: String,
    pub email: Option<String>,
    pub phone: String,
    pub birth_date: NaiveDate,
    pub gender: Gender,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub patient_type: PatientType,
    pub insurer_id: Option<Uuid>,
    pub treating_doctor_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Patient {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn age(&self) -> i32 {
        let today = Utc::now().date_naive();
        today.years_since(self.birth_date).unwrap_or(0) as i32
    }
}

/// Affiliation type. Governs how a session's price splits between the
/// patient's copay and the amount billed to the insurer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "patient_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PatientType {
    Private,
    InsuranceCopay,
    InsurancePackage,
}

impl fmt::Display for PatientType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatientType::Private => write!(f, "PRIVATE"),
            PatientType::InsuranceCopay => write!(f, "INSURANCE_COPAY"),
            PatientType::InsurancePackage => write!(f, "INSURANCE_PACKAGE"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "gender", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// Colombian identity document classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "document_type")]
pub enum DocumentType {
    CC,
    CE,
    CD,
    PA,
    SC,
    PE,
    PT,
    RC,
    TI,
    CN,
    AS,
    MS,
    DE,
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePatientRequest {
    pub first_name: String,
    pub last_name: String,
    pub document_type: DocumentType,
    pub document_id: String,
    pub email: Option<String>,
    pub phone: String,
    pub birth_date: NaiveDate,
    pub gender: Gender,
    #[serde(rename = "type")]
    pub patient_type: PatientType,
    pub insurer_id: Option<Uuid>,
    pub treating_doctor_id: Option<Uuid>,
}

impl CreatePatientRequest {
    pub fn validate(&self) -> Result<(), PatientError> {
        validate_patient_fields(
            &self.first_name,
            &self.last_name,
            &self.document_id,
            &self.phone,
            self.patient_type,
            self.insurer_id,
        )
    }

    /// PRIVATE patients never carry an insurer, whatever the form sent.
    pub fn effective_insurer_id(&self) -> Option<Uuid> {
        match self.patient_type {
            PatientType::Private => None,
            _ => self.insurer_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePatientRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: String,
    pub birth_date: NaiveDate,
    pub gender: Gender,
    #[serde(rename = "type")]
    pub patient_type: PatientType,
    pub insurer_id: Option<Uuid>,
    pub treating_doctor_id: Option<Uuid>,
}

impl UpdatePatientRequest {
    pub fn validate(&self) -> Result<(), PatientError> {
        validate_patient_fields(
            &self.first_name,
            &self.last_name,
            "---", // document is immutable on update
            &self.phone,
            self.patient_type,
            self.insurer_id,
        )
    }

    pub fn effective_insurer_id(&self) -> Option<Uuid> {
        match self.patient_type {
            PatientType::Private => None,
            _ => self.insurer_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientSearchQuery {
    pub name: Option<String>,
    pub document_id: Option<String>,
    #[serde(rename = "type")]
    pub patient_type: Option<PatientType>,
    pub insurer_id: Option<Uuid>,
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

// ==============================================================================
// PATIENT CARD READ MODELS
// ==============================================================================

// Slim projections for the patient card. The owning cells hold the full
// entities; these only carry what the card displays, with enum columns cast
// to text to keep this cell decoupled from theirs.

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct InsurerSummary {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct DoctorSummary {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub speciality: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AppointmentSummary {
    pub id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub appointment_type: String,
    pub price_total: i64,
}

fn validate_patient_fields(
    first_name: &str,
    last_name: &str,
    document_id: &str,
    phone: &str,
    patient_type: PatientType,
    insurer_id: Option<Uuid>,
) -> Result<(), PatientError> {
    if first_name.trim().len() < 2 {
        return Err(PatientError::ValidationError(
            "First name must be at least 2 characters".to_string(),
        ));
    }
    if last_name.trim().len() < 2 {
        return Err(PatientError::ValidationError(
            "Last name must be at least 2 characters".to_string(),
        ));
    }
    if document_id.trim().len() < 3 {
        return Err(PatientError::ValidationError(
            "Document number is required".to_string(),
        ));
    }
    if phone.trim().len() < 7 {
        return Err(PatientError::ValidationError(
            "Phone number is required".to_string(),
        ));
    }
    if patient_type != PatientType::Private && insurer_id.is_none() {
        return Err(PatientError::ValidationError(
            "An insurer is required for this affiliation type".to_string(),
        ));
    }
    Ok(())
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum PatientError {
    #[error("Patient not found")]
    NotFound,

    #[error("A patient with this document already exists")]
    DuplicateDocument,

    #[error("Cannot delete a patient with appointments or authorizations")]
    HasLinkedRecords,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<PatientError> for AppError {
    fn from(e: PatientError) -> Self {
        match e {
            PatientError::NotFound => AppError::NotFound(e.to_string()),
            PatientError::DuplicateDocument => AppError::Conflict(e.to_string()),
            PatientError::HasLinkedRecords => AppError::Conflict(e.to_string()),
            PatientError::ValidationError(msg) => AppError::ValidationError(msg),
            PatientError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn base_request() -> CreatePatientRequest {
        CreatePatientRequest {
            first_name: "Pepito".to_string(),
            last_name: "López".to_string(),
            document_type: DocumentType::TI,
            document_id: "111222333".to_string(),
            email: None,
            phone: "3001234567".to_string(),
            birth_date: NaiveDate::from_ymd_opt(2015, 3, 14).unwrap(),
            gender: Gender::Male,
            patient_type: PatientType::InsuranceCopay,
            insurer_id: Some(Uuid::new_v4()),
            treating_doctor_id: None,
        }
    }

    #[test]
    fn accepts_insured_patient_with_insurer() {
        assert!(base_request().validate().is_ok());
    }

    #[test]
    fn insured_patient_requires_insurer() {
        let mut request = base_request();
        request.insurer_id = None;
        let err = request.validate().unwrap_err();
        assert_matches!(err, PatientError::ValidationError(_));

        request.patient_type = PatientType::InsurancePackage;
        assert!(request.validate().is_err());
    }

    #[test]
    fn private_patient_needs_no_insurer() {
        let mut request = base_request();
        request.patient_type = PatientType::Private;
        request.insurer_id = None;
        assert!(request.validate().is_ok());
    }

    #[test]
    fn private_patient_drops_supplied_insurer() {
        let mut request = base_request();
        request.patient_type = PatientType::Private;
        assert!(request.insurer_id.is_some());
        assert_eq!(request.effective_insurer_id(), None);
    }

    #[test]
    fn rejects_short_names() {
        let mut request = base_request();
        request.first_name = "P".to_string();
        assert!(request.validate().is_err());
    }
}
