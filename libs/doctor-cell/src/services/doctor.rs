use tracing::info;
use uuid::Uuid;

use shared_database::Database;

use crate::models::{CreateDoctorRequest, Doctor, DoctorError};

pub struct DoctorService {
    db: Database,
}

impl DoctorService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn create_doctor(
        &self,
        request: CreateDoctorRequest,
    ) -> Result<Doctor, DoctorError> {
        request.validate()?;

        let doctor: Doctor = sqlx::query_as(
            "INSERT INTO doctors (first_name, last_name, speciality, phone, color_code) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING *",
        )
        .bind(&request.first_name)
        .bind(&request.last_name)
        .bind(&request.speciality)
        .bind(&request.phone)
        .bind(&request.color_code)
        .fetch_one(self.db.pool())
        .await
        .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        info!("Doctor {} created", doctor.id);
        Ok(doctor)
    }

    pub async fn get_doctor(&self, doctor_id: Uuid) -> Result<Doctor, DoctorError> {
        sqlx::query_as("SELECT * FROM doctors WHERE id = $1")
            .bind(doctor_id)
            .fetch_optional(self.db.pool())
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?
            .ok_or(DoctorError::NotFound)
    }

    pub async fn list_doctors(&self) -> Result<Vec<Doctor>, DoctorError> {
        sqlx::query_as(
            "SELECT * FROM doctors WHERE active = true ORDER BY first_name, last_name",
        )
        .fetch_all(self.db.pool())
        .await
        .map_err(|e| DoctorError::DatabaseError(e.to_string()))
    }
}
