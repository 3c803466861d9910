use tracing::{debug, info, warn};
use uuid::Uuid;

use authorization_cell::models::Authorization;
use shared_database::Database;

use crate::models::{
    AppointmentSummary, CreatePatientRequest, DoctorSummary, InsurerSummary, Patient,
    PatientError, PatientSearchQuery, UpdatePatientRequest,
};

pub struct PatientService {
    db: Database,
}

impl PatientService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn create_patient(
        &self,
        request: CreatePatientRequest,
    ) -> Result<Patient, PatientError> {
        request.validate()?;

        debug!("Creating patient with document {}", request.document_id);

        let mut tx = self
            .db
            .begin()
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        let existing: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM patients WHERE document_id = $1")
                .bind(&request.document_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        if existing.is_some() {
            return Err(PatientError::DuplicateDocument);
        }

        let patient: Patient = sqlx::query_as(
            "INSERT INTO patients \
             (first_name, last_name, document_type, document_id, email, phone, \
              birth_date, gender, type, insurer_id, treating_doctor_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING *",
        )
        .bind(&request.first_name)
        .bind(&request.last_name)
        .bind(request.document_type)
        .bind(&request.document_id)
        .bind(&request.email)
        .bind(&request.phone)
        .bind(request.birth_date)
        .bind(request.gender)
        .bind(request.patient_type)
        .bind(request.effective_insurer_id())
        .bind(request.treating_doctor_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        info!("Patient {} created", patient.id);
        Ok(patient)
    }

    /// Update a patient's details. Changing the affiliation type or insurer
    /// expires every still-ACTIVE authorization of the patient in the same
    /// transaction, since those authorizations no longer correspond to a
    /// valid insurer/type combination.
    pub async fn update_patient(
        &self,
        patient_id: Uuid,
        request: UpdatePatientRequest,
    ) -> Result<Patient, PatientError> {
        request.validate()?;

        debug!("Updating patient {}", patient_id);

        let mut tx = self
            .db
            .begin()
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        let current: Option<Patient> = sqlx::query_as("SELECT * FROM patients WHERE id = $1")
            .bind(patient_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        let current = current.ok_or(PatientError::NotFound)?;

        let new_insurer_id = request.effective_insurer_id();
        let coverage_changed = current.patient_type != request.patient_type
            || current.insurer_id != new_insurer_id;

        let updated: Patient = sqlx::query_as(
            "UPDATE patients \
             SET first_name = $1, last_name = $2, email = $3, phone = $4, \
                 birth_date = $5, gender = $6, type = $7, insurer_id = $8, \
                 treating_doctor_id = $9, updated_at = now() \
             WHERE id = $10 \
             RETURNING *",
        )
        .bind(&request.first_name)
        .bind(&request.last_name)
        .bind(&request.email)
        .bind(&request.phone)
        .bind(request.birth_date)
        .bind(request.gender)
        .bind(request.patient_type)
        .bind(new_insurer_id)
        .bind(request.treating_doctor_id)
        .bind(patient_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        if coverage_changed {
            let expired = sqlx::query(
                "UPDATE authorizations SET status = 'EXPIRED', updated_at = now() \
                 WHERE patient_id = $1 AND status = 'ACTIVE'",
            )
            .bind(patient_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

            if expired.rows_affected() > 0 {
                warn!(
                    "Coverage change for patient {} expired {} active authorization(s)",
                    patient_id,
                    expired.rows_affected()
                );
            }
        }

        tx.commit()
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        Ok(updated)
    }

    /// Remove a patient record. Patients with history stay; the registry
    /// only lets go of entries created by mistake.
    pub async fn delete_patient(&self, patient_id: Uuid) -> Result<(), PatientError> {
        let mut tx = self
            .db
            .begin()
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        let current: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM patients WHERE id = $1")
            .bind(patient_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        if current.is_none() {
            return Err(PatientError::NotFound);
        }

        let (linked,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM appointments WHERE patient_id = $1) \
                 OR EXISTS(SELECT 1 FROM authorizations WHERE patient_id = $1)",
        )
        .bind(patient_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        if linked {
            return Err(PatientError::HasLinkedRecords);
        }

        sqlx::query("DELETE FROM patients WHERE id = $1")
            .bind(patient_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        info!("Patient {} deleted", patient_id);
        Ok(())
    }

    pub async fn get_patient(&self, patient_id: Uuid) -> Result<Patient, PatientError> {
        sqlx::query_as("SELECT * FROM patients WHERE id = $1")
            .bind(patient_id)
            .fetch_optional(self.db.pool())
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?
            .ok_or(PatientError::NotFound)
    }

    /// Full authorization ledger for the patient card, newest first.
    pub async fn authorization_history(
        &self,
        patient_id: Uuid,
    ) -> Result<Vec<Authorization>, PatientError> {
        sqlx::query_as(
            "SELECT * FROM authorizations WHERE patient_id = $1 ORDER BY created_at DESC",
        )
        .bind(patient_id)
        .fetch_all(self.db.pool())
        .await
        .map_err(|e| PatientError::DatabaseError(e.to_string()))
    }

    pub async fn insurer_summary(
        &self,
        insurer_id: Uuid,
    ) -> Result<Option<InsurerSummary>, PatientError> {
        sqlx::query_as("SELECT id, name FROM insurers WHERE id = $1")
            .bind(insurer_id)
            .fetch_optional(self.db.pool())
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))
    }

    pub async fn doctor_summary(
        &self,
        doctor_id: Uuid,
    ) -> Result<Option<DoctorSummary>, PatientError> {
        sqlx::query_as("SELECT id, first_name, last_name, speciality FROM doctors WHERE id = $1")
            .bind(doctor_id)
            .fetch_optional(self.db.pool())
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))
    }

    pub async fn recent_appointments(
        &self,
        patient_id: Uuid,
        limit: i64,
    ) -> Result<Vec<AppointmentSummary>, PatientError> {
        sqlx::query_as(
            "SELECT id, start_time, end_time, status::text AS status, \
                    type::text AS \"type\", price_total \
             FROM appointments WHERE patient_id = $1 \
             ORDER BY start_time DESC LIMIT $2",
        )
        .bind(patient_id)
        .bind(limit)
        .fetch_all(self.db.pool())
        .await
        .map_err(|e| PatientError::DatabaseError(e.to_string()))
    }

    pub async fn list_patients(&self) -> Result<Vec<Patient>, PatientError> {
        sqlx::query_as("SELECT * FROM patients ORDER BY created_at DESC")
            .fetch_all(self.db.pool())
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))
    }

    pub async fn search_patients(
        &self,
        query: PatientSearchQuery,
    ) -> Result<Vec<Patient>, PatientError> {
        let name_filter = query.name.map(|n| format!("%{}%", n));

        sqlx::query_as(
            "SELECT * FROM patients \
             WHERE ($1::text IS NULL OR first_name ILIKE $1 OR last_name ILIKE $1) \
               AND ($2::text IS NULL OR document_id = $2) \
               AND ($3::patient_type IS NULL OR type = $3) \
               AND ($4::uuid IS NULL OR insurer_id = $4) \
             ORDER BY created_at DESC \
             LIMIT $5 OFFSET $6",
        )
        .bind(name_filter)
        .bind(query.document_id)
        .bind(query.patient_type)
        .bind(query.insurer_id)
        .bind(query.limit.unwrap_or(50))
        .bind(query.offset.unwrap_or(0))
        .fetch_all(self.db.pool())
        .await
        .map_err(|e| PatientError::DatabaseError(e.to_string()))
    }
}
