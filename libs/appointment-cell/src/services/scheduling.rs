use sqlx::{Postgres, Transaction};
use tracing::{debug, info};
use uuid::Uuid;

use authorization_cell::models::Authorization;
use patient_cell::models::{Patient, PatientType};
use shared_database::Database;

use crate::models::{
    Appointment, AppointmentError, AppointmentSearchQuery, AppointmentStatus,
    CreateAppointmentRequest, UpdateAppointmentRequest,
};
use crate::services::billing::{compute_price_split, PriceSplit};
use crate::services::conflict::patient_has_conflict;
use crate::services::lifecycle::session_delta;

pub struct AppointmentService {
    db: Database,
}

impl AppointmentService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Book a session. One transaction covers the conflict check, the
    /// authorization lookup, the price split and the insert, so two
    /// concurrent bookings cannot both pass the overlap check and commit
    /// against the same snapshot.
    pub async fn create_appointment(
        &self,
        request: CreateAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        request.validate()?;

        let end_time = request.end_time();
        debug!(
            "Booking appointment for patient {} at {}",
            request.patient_id, request.start_time
        );

        let mut tx = self
            .db
            .begin()
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let patient = fetch_patient(&mut tx, request.patient_id).await?;

        if patient_has_conflict(&mut tx, patient.id, request.start_time, end_time, None).await? {
            return Err(AppointmentError::ScheduleConflict);
        }

        let authorization = resolve_authorization(&mut tx, &patient).await?;
        let split = compute_price_split(patient.patient_type, request.price_total, request.price_copay)?;

        let appointment: Appointment = sqlx::query_as(
            "INSERT INTO appointments \
             (patient_id, doctor_id, authorization_id, start_time, end_time, \
              type, status, notes, price_total, price_copay, price_insurer) \
             VALUES ($1, $2, $3, $4, $5, $6, 'SCHEDULED', $7, $8, $9, $10) \
             RETURNING *",
        )
        .bind(patient.id)
        .bind(request.doctor_id)
        .bind(authorization.as_ref().map(|a| a.id))
        .bind(request.start_time)
        .bind(end_time)
        .bind(request.appointment_type)
        .bind(&request.notes)
        .bind(split.total)
        .bind(split.copay)
        .bind(split.insurer)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        info!("Appointment {} booked", appointment.id);
        Ok(appointment)
    }

    /// Reschedule or reprice a SCHEDULED appointment. The conflict check
    /// excludes the appointment's own slot; the authorization link and the
    /// price split are recomputed from the patient's current coverage.
    pub async fn update_appointment(
        &self,
        appointment_id: Uuid,
        request: UpdateAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        request.validate()?;

        let end_time = request.end_time();

        let mut tx = self
            .db
            .begin()
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let current = fetch_appointment(&mut tx, appointment_id).await?;
        if current.status != AppointmentStatus::Scheduled {
            return Err(AppointmentError::NotEditable);
        }

        let patient = fetch_patient(&mut tx, current.patient_id).await?;

        if patient_has_conflict(
            &mut tx,
            patient.id,
            request.start_time,
            end_time,
            Some(appointment_id),
        )
        .await?
        {
            return Err(AppointmentError::ScheduleConflict);
        }

        let authorization = resolve_authorization(&mut tx, &patient).await?;
        let split: PriceSplit =
            compute_price_split(patient.patient_type, request.price_total, request.price_copay)?;

        let appointment: Appointment = sqlx::query_as(
            "UPDATE appointments \
             SET doctor_id = $1, authorization_id = $2, start_time = $3, end_time = $4, \
                 type = $5, notes = $6, price_total = $7, price_copay = $8, \
                 price_insurer = $9, updated_at = now() \
             WHERE id = $10 \
             RETURNING *",
        )
        .bind(request.doctor_id)
        .bind(authorization.as_ref().map(|a| a.id))
        .bind(request.start_time)
        .bind(end_time)
        .bind(request.appointment_type)
        .bind(&request.notes)
        .bind(split.total)
        .bind(split.copay)
        .bind(split.insurer)
        .bind(appointment_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        Ok(appointment)
    }

    /// Move an appointment between statuses. The status write and the
    /// session-counter update on the linked authorization commit together,
    /// so the ledger can never drift from the calendar.
    pub async fn update_status(
        &self,
        appointment_id: Uuid,
        next: AppointmentStatus,
    ) -> Result<Appointment, AppointmentError> {
        let mut tx = self
            .db
            .begin()
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let current = fetch_appointment(&mut tx, appointment_id).await?;
        let delta = session_delta(current.status, next);

        let appointment: Appointment = sqlx::query_as(
            "UPDATE appointments SET status = $1, updated_at = now() \
             WHERE id = $2 RETURNING *",
        )
        .bind(next)
        .bind(appointment_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        if delta != 0 {
            if let Some(authorization_id) = appointment.authorization_id {
                sqlx::query(
                    "UPDATE authorizations \
                     SET used_sessions = used_sessions + $1, updated_at = now() \
                     WHERE id = $2",
                )
                .bind(delta)
                .bind(authorization_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

                debug!(
                    "Authorization {} used_sessions adjusted by {}",
                    authorization_id, delta
                );
            }
        }

        tx.commit()
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        info!(
            "Appointment {} moved {} -> {}",
            appointment_id, current.status, next
        );
        Ok(appointment)
    }

    pub async fn delete_appointment(
        &self,
        appointment_id: Uuid,
    ) -> Result<(), AppointmentError> {
        let mut tx = self
            .db
            .begin()
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let current = fetch_appointment(&mut tx, appointment_id).await?;
        if current.status != AppointmentStatus::Scheduled {
            return Err(AppointmentError::NotEditable);
        }

        sqlx::query("DELETE FROM appointments WHERE id = $1")
            .bind(appointment_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        info!("Appointment {} deleted", appointment_id);
        Ok(())
    }

    pub async fn get_appointment(
        &self,
        appointment_id: Uuid,
    ) -> Result<Appointment, AppointmentError> {
        sqlx::query_as("SELECT * FROM appointments WHERE id = $1")
            .bind(appointment_id)
            .fetch_optional(self.db.pool())
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?
            .ok_or(AppointmentError::NotFound)
    }

    pub async fn search_appointments(
        &self,
        query: AppointmentSearchQuery,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        sqlx::query_as(
            "SELECT * FROM appointments \
             WHERE ($1::uuid IS NULL OR patient_id = $1) \
               AND ($2::uuid IS NULL OR doctor_id = $2) \
               AND ($3::appointment_status IS NULL OR status = $3) \
               AND ($4::appointment_type IS NULL OR type = $4) \
               AND ($5::timestamptz IS NULL OR start_time >= $5) \
               AND ($6::timestamptz IS NULL OR start_time < $6) \
             ORDER BY start_time DESC \
             LIMIT $7 OFFSET $8",
        )
        .bind(query.patient_id)
        .bind(query.doctor_id)
        .bind(query.status)
        .bind(query.appointment_type)
        .bind(query.from)
        .bind(query.to)
        .bind(query.limit.unwrap_or(50))
        .bind(query.offset.unwrap_or(0))
        .fetch_all(self.db.pool())
        .await
        .map_err(|e| AppointmentError::DatabaseError(e.to_string()))
    }
}

async fn fetch_appointment(
    tx: &mut Transaction<'_, Postgres>,
    appointment_id: Uuid,
) -> Result<Appointment, AppointmentError> {
    sqlx::query_as("SELECT * FROM appointments WHERE id = $1 FOR UPDATE")
        .bind(appointment_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?
        .ok_or(AppointmentError::NotFound)
}

async fn fetch_patient(
    tx: &mut Transaction<'_, Postgres>,
    patient_id: Uuid,
) -> Result<Patient, AppointmentError> {
    sqlx::query_as("SELECT * FROM patients WHERE id = $1")
        .bind(patient_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?
        .ok_or(AppointmentError::PatientNotFound)
}

/// The ACTIVE authorization the session bills against, if the patient's
/// coverage carries one. Private patients never link an authorization.
async fn resolve_authorization(
    tx: &mut Transaction<'_, Postgres>,
    patient: &Patient,
) -> Result<Option<Authorization>, AppointmentError> {
    if patient.patient_type == PatientType::Private {
        return Ok(None);
    }
    let Some(insurer_id) = patient.insurer_id else {
        return Ok(None);
    };

    sqlx::query_as(
        "SELECT * FROM authorizations \
         WHERE patient_id = $1 AND insurer_id = $2 AND status = 'ACTIVE' \
         ORDER BY created_at DESC LIMIT 1",
    )
    .bind(patient.id)
    .bind(insurer_id)
    .fetch_optional(&mut **tx)
    .await
    .map_err(|e| AppointmentError::DatabaseError(e.to_string()))
}
