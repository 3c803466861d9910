use chrono::{DateTime, Utc};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::models::AppointmentError;

/// Half-open interval overlap: `[a_start, a_end)` against `[b_start, b_end)`.
/// Back-to-back slots sharing a boundary do not overlap.
pub fn overlaps(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && a_end > b_start
}

/// True when the patient already has a non-cancelled appointment overlapping
/// the candidate slot. Runs inside the booking transaction so the check and
/// the insert see the same snapshot. `exclude_id` skips the appointment
/// being edited.
pub async fn patient_has_conflict(
    tx: &mut Transaction<'_, Postgres>,
    patient_id: Uuid,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    exclude_id: Option<Uuid>,
) -> Result<bool, AppointmentError> {
    let (found,): (bool,) = sqlx::query_as(
        "SELECT EXISTS( \
             SELECT 1 FROM appointments \
             WHERE patient_id = $1 \
               AND status <> 'CANCELLED' \
               AND start_time < $3 \
               AND end_time > $2 \
               AND ($4::uuid IS NULL OR id <> $4) \
         )",
    )
    .bind(patient_id)
    .bind(start_time)
    .bind(end_time)
    .bind(exclude_id)
    .fetch_one(&mut **tx)
    .await
    .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, hour, minute, 0).unwrap()
    }

    #[test]
    fn detects_partial_overlap() {
        assert!(overlaps(at(14, 0), at(15, 0), at(14, 30), at(15, 30)));
        assert!(overlaps(at(14, 30), at(15, 30), at(14, 0), at(15, 0)));
    }

    #[test]
    fn detects_containment() {
        assert!(overlaps(at(14, 0), at(16, 0), at(14, 30), at(15, 0)));
        assert!(overlaps(at(14, 30), at(15, 0), at(14, 0), at(16, 0)));
    }

    #[test]
    fn back_to_back_slots_do_not_conflict() {
        assert!(!overlaps(at(14, 0), at(15, 0), at(15, 0), at(16, 0)));
        assert!(!overlaps(at(15, 0), at(16, 0), at(14, 0), at(15, 0)));
    }

    #[test]
    fn disjoint_slots_do_not_conflict() {
        assert!(!overlaps(at(9, 0), at(10, 0), at(14, 0), at(15, 0)));
    }
}
