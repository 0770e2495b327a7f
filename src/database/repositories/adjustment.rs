use anyhow::Result;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::{
    models::{AdjustmentRequest, AdjustmentRequestInput, AdjustmentStatus},
    utils::sql,
};

#[derive(Clone)]
pub struct AdjustmentRepository {
    pool: PgPool,
}

const ADJUSTMENT_COLUMNS: &str = r#"
    id,
    user_id,
    reference_date,
    original_punch_id,
    proposed_time,
    punch_kind,
    kind,
    justification,
    status,
    rejection_reason,
    decided_by,
    created_at,
    updated_at
"#;

impl AdjustmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new pending adjustment request for the given employee.
    pub async fn create_request(
        &self,
        user_id: Uuid,
        input: AdjustmentRequestInput,
    ) -> Result<AdjustmentRequest> {
        let now = Utc::now();

        let request = sqlx::query_as::<_, AdjustmentRequest>(&sql(&format!(
            r#"
            INSERT INTO
                adjustment_requests (
                    id,
                    user_id,
                    reference_date,
                    original_punch_id,
                    proposed_time,
                    punch_kind,
                    kind,
                    justification,
                    status,
                    created_at,
                    updated_at
                )
            VALUES
                (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {ADJUSTMENT_COLUMNS}
            "#
        )))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(input.reference_date)
        .bind(input.original_punch_id)
        .bind(input.proposed_time)
        .bind(input.punch_kind)
        .bind(input.kind)
        .bind(input.justification)
        .bind(AdjustmentStatus::Pendente)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(request)
    }

    pub async fn get_request_by_id(&self, id: Uuid) -> Result<Option<AdjustmentRequest>> {
        let request = sqlx::query_as::<_, AdjustmentRequest>(&format!(
            "SELECT {ADJUSTMENT_COLUMNS} FROM adjustment_requests WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    /// The employee's own requests, newest first.
    pub async fn list_for_user(&self, user_id: Uuid, limit: i64) -> Result<Vec<AdjustmentRequest>> {
        let requests = sqlx::query_as::<_, AdjustmentRequest>(&format!(
            r#"
            SELECT {ADJUSTMENT_COLUMNS}
            FROM adjustment_requests
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    /// Pending queue for the master's approval screen.
    pub async fn list_pending(&self) -> Result<Vec<AdjustmentRequest>> {
        let requests = sqlx::query_as::<_, AdjustmentRequest>(&format!(
            r#"
            SELECT {ADJUSTMENT_COLUMNS}
            FROM adjustment_requests
            WHERE status = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(AdjustmentStatus::Pendente)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    /// Mark a request rejected with the stored reason. No ledger mutation.
    /// Guarded like the approval flip: a request already decided by a
    /// concurrent master stays decided, and `None` comes back.
    pub async fn reject_request(
        &self,
        id: Uuid,
        decided_by: Uuid,
        reason: Option<String>,
    ) -> Result<Option<AdjustmentRequest>> {
        let request = sqlx::query_as::<_, AdjustmentRequest>(&format!(
            r#"
            UPDATE adjustment_requests
            SET
                status = $1,
                rejection_reason = $2,
                decided_by = $3,
                updated_at = $4
            WHERE
                id = $5 AND status = $6
            RETURNING {ADJUSTMENT_COLUMNS}
            "#
        ))
        .bind(AdjustmentStatus::Reprovado)
        .bind(reason)
        .bind(decided_by)
        .bind(Utc::now())
        .bind(id)
        .bind(AdjustmentStatus::Pendente)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }
}
