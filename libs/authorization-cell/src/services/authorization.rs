use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_database::Database;

use crate::models::{
    Authorization, AuthorizationError, AuthorizationSearchQuery, AuthorizationStatus,
    CreateAuthorizationRequest, PreviousAuthAction, UpdateAuthorizationRequest,
};

pub struct AuthorizationService {
    db: Database,
}

impl AuthorizationService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Create a new authorization for a (patient, insurer) pair.
    ///
    /// Runs as one transaction: code uniqueness, supersession of any still
    /// ACTIVE authorization for the pair, and the insert must be atomic so
    /// two ACTIVE authorizations can never coexist.
    pub async fn create_authorization(
        &self,
        request: CreateAuthorizationRequest,
    ) -> Result<Authorization, AuthorizationError> {
        request.validate()?;

        info!(
            "Creating authorization {} for patient {} with insurer {}",
            request.code, request.patient_id, request.insurer_id
        );

        let mut tx = self
            .db
            .begin()
            .await
            .map_err(|e| AuthorizationError::DatabaseError(e.to_string()))?;

        let duplicate: Option<(Uuid,)> = sqlx::query_as(
            "SELECT id FROM authorizations WHERE code = $1 AND insurer_id = $2",
        )
        .bind(&request.code)
        .bind(request.insurer_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AuthorizationError::DatabaseError(e.to_string()))?;

        if duplicate.is_some() {
            return Err(AuthorizationError::DuplicateCode);
        }

        let active: Option<Authorization> = sqlx::query_as(
            "SELECT * FROM authorizations \
             WHERE patient_id = $1 AND insurer_id = $2 AND status = 'ACTIVE'",
        )
        .bind(request.patient_id)
        .bind(request.insurer_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AuthorizationError::DatabaseError(e.to_string()))?;

        let closing = resolve_supersession(active.as_ref(), request.previous_auth_action)?;
        if let (Some(prior), Some(closing_status)) = (active.as_ref(), closing) {
            warn!(
                "Superseding active authorization {} with status {}",
                prior.id, closing_status
            );
            sqlx::query(
                "UPDATE authorizations SET status = $1, updated_at = now() WHERE id = $2",
            )
            .bind(closing_status)
            .bind(prior.id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AuthorizationError::DatabaseError(e.to_string()))?;
        }

        let created: Authorization = sqlx::query_as(
            "INSERT INTO authorizations \
             (code, insurer_id, patient_id, total_sessions, used_sessions, \
              valid_from, valid_until, status) \
             VALUES ($1, $2, $3, $4, 0, $5, $6, 'ACTIVE') \
             RETURNING *",
        )
        .bind(&request.code)
        .bind(request.insurer_id)
        .bind(request.patient_id)
        .bind(request.total_sessions)
        .bind(request.valid_from)
        .bind(request.valid_until)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AuthorizationError::DatabaseError(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| AuthorizationError::DatabaseError(e.to_string()))?;

        info!("Authorization {} created", created.id);
        Ok(created)
    }

    /// Edit code, session allowance and validity window. `used_sessions` and
    /// `status` are deliberately not editable here.
    pub async fn update_authorization(
        &self,
        authorization_id: Uuid,
        request: UpdateAuthorizationRequest,
    ) -> Result<Authorization, AuthorizationError> {
        request.validate()?;

        debug!("Updating authorization {}", authorization_id);

        let mut tx = self
            .db
            .begin()
            .await
            .map_err(|e| AuthorizationError::DatabaseError(e.to_string()))?;

        let current: Option<Authorization> =
            sqlx::query_as("SELECT * FROM authorizations WHERE id = $1")
                .bind(authorization_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| AuthorizationError::DatabaseError(e.to_string()))?;

        let current = current.ok_or(AuthorizationError::NotFound)?;

        let clash: Option<(Uuid,)> = sqlx::query_as(
            "SELECT id FROM authorizations \
             WHERE code = $1 AND insurer_id = $2 AND id <> $3",
        )
        .bind(&request.code)
        .bind(current.insurer_id)
        .bind(authorization_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AuthorizationError::DatabaseError(e.to_string()))?;

        if clash.is_some() {
            return Err(AuthorizationError::DuplicateCode);
        }

        let updated: Authorization = sqlx::query_as(
            "UPDATE authorizations \
             SET code = $1, total_sessions = $2, valid_from = $3, valid_until = $4, \
                 updated_at = now() \
             WHERE id = $5 \
             RETURNING *",
        )
        .bind(&request.code)
        .bind(request.total_sessions)
        .bind(request.valid_from)
        .bind(request.valid_until)
        .bind(authorization_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AuthorizationError::DatabaseError(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| AuthorizationError::DatabaseError(e.to_string()))?;

        Ok(updated)
    }

    pub async fn update_status(
        &self,
        authorization_id: Uuid,
        status: AuthorizationStatus,
    ) -> Result<Authorization, AuthorizationError> {
        debug!("Setting authorization {} status to {}", authorization_id, status);

        sqlx::query_as(
            "UPDATE authorizations SET status = $1, updated_at = now() \
             WHERE id = $2 RETURNING *",
        )
        .bind(status)
        .bind(authorization_id)
        .fetch_optional(self.db.pool())
        .await
        .map_err(|e| AuthorizationError::DatabaseError(e.to_string()))?
        .ok_or(AuthorizationError::NotFound)
    }

    pub async fn get_authorization(
        &self,
        authorization_id: Uuid,
    ) -> Result<Authorization, AuthorizationError> {
        sqlx::query_as("SELECT * FROM authorizations WHERE id = $1")
            .bind(authorization_id)
            .fetch_optional(self.db.pool())
            .await
            .map_err(|e| AuthorizationError::DatabaseError(e.to_string()))?
            .ok_or(AuthorizationError::NotFound)
    }

    /// Ledger listing, newest first.
    pub async fn search_authorizations(
        &self,
        query: AuthorizationSearchQuery,
    ) -> Result<Vec<Authorization>, AuthorizationError> {
        sqlx::query_as(
            "SELECT * FROM authorizations \
             WHERE ($1::uuid IS NULL OR patient_id = $1) \
               AND ($2::uuid IS NULL OR insurer_id = $2) \
               AND ($3::authorization_status IS NULL OR status = $3) \
             ORDER BY created_at DESC",
        )
        .bind(query.patient_id)
        .bind(query.insurer_id)
        .bind(query.status)
        .fetch_all(self.db.pool())
        .await
        .map_err(|e| AuthorizationError::DatabaseError(e.to_string()))
    }
}

/// Decide what happens to a prior ACTIVE authorization when creating a new
/// one. Returns the status to close it with, or None when nothing is active.
/// Failing to decide while one is active is an error, never an implicit
/// overwrite.
pub fn resolve_supersession(
    active: Option<&Authorization>,
    action: Option<PreviousAuthAction>,
) -> Result<Option<AuthorizationStatus>, AuthorizationError> {
    match (active, action) {
        (None, _) => Ok(None),
        (Some(_), None) => Err(AuthorizationError::ActiveAuthorizationUndecided),
        (Some(_), Some(action)) => Ok(Some(action.as_status())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{NaiveDate, Utc};

    fn active_authorization() -> Authorization {
        Authorization {
            id: Uuid::new_v4(),
            code: "AUT-100".to_string(),
            insurer_id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            total_sessions: 10,
            used_sessions: 2,
            valid_from: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            valid_until: NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(),
            status: AuthorizationStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn no_active_authorization_needs_no_decision() {
        assert_eq!(resolve_supersession(None, None).unwrap(), None);
        assert_eq!(
            resolve_supersession(None, Some(PreviousAuthAction::Expired)).unwrap(),
            None
        );
    }

    #[test]
    fn active_authorization_without_decision_fails() {
        let auth = active_authorization();
        let err = resolve_supersession(Some(&auth), None).unwrap_err();
        assert_matches!(err, AuthorizationError::ActiveAuthorizationUndecided);
    }

    #[test]
    fn active_authorization_closes_with_chosen_status() {
        let auth = active_authorization();
        assert_eq!(
            resolve_supersession(Some(&auth), Some(PreviousAuthAction::Completed)).unwrap(),
            Some(AuthorizationStatus::Completed)
        );
        assert_eq!(
            resolve_supersession(Some(&auth), Some(PreviousAuthAction::Expired)).unwrap(),
            Some(AuthorizationStatus::Expired)
        );
    }

    #[test]
    fn remaining_sessions_subtracts_used() {
        let auth = active_authorization();
        assert_eq!(auth.remaining_sessions(), 8);
    }
}
