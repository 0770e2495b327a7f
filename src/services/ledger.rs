//! Punch ledger mutations. Every write to one employee-day (punch append,
//! adjustment application) runs inside a single transaction holding an
//! advisory lock on (user, date), then recomputes the cached daily summary
//! before committing. Two concurrent writers on the same employee-day
//! serialize instead of silently racing on the summary row.

use chrono::{NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::database::models::{
    AdjustmentKind, AdjustmentRequest, AdjustmentStatus, DailySummary, PunchKind, PunchRecord,
    SchedulePattern, User, MANUAL_PUNCH_LATITUDE, MANUAL_PUNCH_LONGITUDE,
};
use crate::error::AppError;
use crate::services::balance::{self, CalculationWarning, ShiftConfig};

#[derive(Clone)]
pub struct LedgerService {
    pool: PgPool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PunchOutcome {
    pub punch: PunchRecord,
    pub summary: DailySummary,
    pub warnings: Vec<CalculationWarning>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustmentOutcome {
    pub request: AdjustmentRequest,
    pub summary: DailySummary,
    pub warnings: Vec<CalculationWarning>,
}

impl LedgerService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Why punching is blocked on this date under a rigid schedule, if it is.
    pub fn punch_block_reason(config: &ShiftConfig, date: NaiveDate) -> Option<String> {
        if balance::is_workday(config, date) {
            return None;
        }
        match config.schedule {
            SchedulePattern::FiveByTwo => {
                Some("Escala 5x2: Fim de Semana (Folga)".to_string())
            }
            SchedulePattern::TwelveByThirtySix => {
                Some("Escala 12x36: Dia de Folga Calculado".to_string())
            }
            SchedulePattern::Livre => None,
        }
    }

    /// Append the next punch of the day for `user` and refresh the summary.
    pub async fn register_punch(
        &self,
        user: &User,
        date: NaiveDate,
        time: NaiveTime,
        latitude: Option<String>,
        longitude: Option<String>,
    ) -> Result<PunchOutcome, AppError> {
        let config = ShiftConfig::from(user);

        if let Some(reason) = Self::punch_block_reason(&config, date) {
            return Err(AppError::Forbidden(reason));
        }

        let mut tx = self.pool.begin().await?;
        lock_employee_day(&mut tx, user.id, date).await?;

        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM punch_records WHERE user_id = $1 AND punch_date = $2",
        )
        .bind(user.id)
        .bind(date)
        .fetch_one(&mut *tx)
        .await?;

        let kind = PunchKind::next_for_count(count as usize);
        let punch = insert_punch(&mut tx, user.id, date, time, kind, latitude, longitude).await?;

        let (summary, warnings) = recompute_in_tx(&mut tx, &config, user.id, date).await?;
        tx.commit().await?;

        log::info!(
            "Punch {} registered for user {} on {} ({})",
            kind,
            user.username,
            date,
            summary.status
        );

        Ok(PunchOutcome {
            punch,
            summary,
            warnings,
        })
    }

    /// Recompute one day's summary from the current ledger. Idempotent.
    pub async fn recompute_day(
        &self,
        user: &User,
        date: NaiveDate,
    ) -> Result<DailySummary, AppError> {
        let config = ShiftConfig::from(user);

        let mut tx = self.pool.begin().await?;
        lock_employee_day(&mut tx, user.id, date).await?;
        let (summary, _) = recompute_in_tx(&mut tx, &config, user.id, date).await?;
        tx.commit().await?;

        Ok(summary)
    }

    /// Recompute every summarized or punched day for the user. Invoked when
    /// the shift configuration changes, since cached summaries go stale
    /// otherwise.
    pub async fn recompute_all_for_user(&self, user: &User) -> Result<usize, AppError> {
        let dates: Vec<(NaiveDate,)> = sqlx::query_as(
            r#"
            SELECT punch_date FROM punch_records WHERE user_id = $1
            UNION
            SELECT reference_date FROM daily_summaries WHERE user_id = $1
            ORDER BY 1
            "#,
        )
        .bind(user.id)
        .fetch_all(&self.pool)
        .await?;

        for (date,) in &dates {
            self.recompute_day(user, *date).await?;
        }

        if !dates.is_empty() {
            log::info!(
                "Recomputed {} day(s) for user {} after configuration change",
                dates.len(),
                user.username
            );
        }

        Ok(dates.len())
    }

    /// Apply an approved adjustment to the ledger, flip the request to
    /// approved and refresh the summary, all in one transaction.
    pub async fn approve_adjustment(
        &self,
        user: &User,
        request: &AdjustmentRequest,
        decided_by: Uuid,
    ) -> Result<AdjustmentOutcome, AppError> {
        let config = ShiftConfig::from(user);
        let date = request.reference_date;

        let mut tx = self.pool.begin().await?;
        lock_employee_day(&mut tx, user.id, date).await?;

        match request.kind {
            AdjustmentKind::Edicao => {
                let punch_id = request.original_punch_id.ok_or_else(|| {
                    AppError::BadRequest("Edit request has no referenced punch".to_string())
                })?;
                let time = parse_proposed_time(request)?;
                let kind = required_punch_kind(request)?;

                let updated = sqlx::query(
                    "UPDATE punch_records SET punch_time = $1, kind = $2 WHERE id = $3",
                )
                .bind(time)
                .bind(kind)
                .bind(punch_id)
                .execute(&mut *tx)
                .await?;

                if updated.rows_affected() == 0 {
                    return Err(AppError::NotFound("Referenced punch not found".to_string()));
                }
            }
            AdjustmentKind::Inclusao => {
                let time = parse_proposed_time(request)?;
                let kind = required_punch_kind(request)?;

                insert_punch(
                    &mut tx,
                    user.id,
                    date,
                    time,
                    kind,
                    Some(MANUAL_PUNCH_LATITUDE.to_string()),
                    Some(MANUAL_PUNCH_LONGITUDE.to_string()),
                )
                .await?;
            }
            AdjustmentKind::Exclusao => {
                let punch_id = request.original_punch_id.ok_or_else(|| {
                    AppError::BadRequest("Delete request has no referenced punch".to_string())
                })?;

                let deleted = sqlx::query("DELETE FROM punch_records WHERE id = $1")
                    .bind(punch_id)
                    .execute(&mut *tx)
                    .await?;

                if deleted.rows_affected() == 0 {
                    return Err(AppError::NotFound("Referenced punch not found".to_string()));
                }
            }
        }

        // Guarded transition: a request decided by a concurrent master stays
        // decided.
        let approved = sqlx::query_as::<_, AdjustmentRequest>(
            r#"
            UPDATE adjustment_requests
            SET status = $1, decided_by = $2, updated_at = $3
            WHERE id = $4 AND status = $5
            RETURNING
                id, user_id, reference_date, original_punch_id, proposed_time,
                punch_kind, kind, justification, status, rejection_reason,
                decided_by, created_at, updated_at
            "#,
        )
        .bind(AdjustmentStatus::Aprovado)
        .bind(decided_by)
        .bind(Utc::now())
        .bind(request.id)
        .bind(AdjustmentStatus::Pendente)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::BadRequest("Request is no longer pending".to_string()))?;

        let (summary, warnings) = recompute_in_tx(&mut tx, &config, user.id, date).await?;
        tx.commit().await?;

        Ok(AdjustmentOutcome {
            request: approved,
            summary,
            warnings,
        })
    }
}

/// Serialize writers on one employee-day for the rest of the transaction.
async fn lock_employee_day(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    date: NaiveDate,
) -> Result<(), AppError> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1)::bigint)")
        .bind(format!("{}:{}", user_id, date))
        .execute(&mut **tx)
        .await?;
    Ok(())
}

async fn insert_punch(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    date: NaiveDate,
    time: NaiveTime,
    kind: PunchKind,
    latitude: Option<String>,
    longitude: Option<String>,
) -> Result<PunchRecord, AppError> {
    let punch = sqlx::query_as::<_, PunchRecord>(
        r#"
        INSERT INTO punch_records
            (id, user_id, punch_date, punch_time, kind, latitude, longitude, created_at)
        VALUES
            ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING
            id, user_id, punch_date, punch_time, kind, latitude, longitude, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(date)
    .bind(time)
    .bind(kind)
    .bind(latitude)
    .bind(longitude)
    .bind(Utc::now())
    .fetch_one(&mut **tx)
    .await?;

    Ok(punch)
}

async fn recompute_in_tx(
    tx: &mut Transaction<'_, Postgres>,
    config: &ShiftConfig,
    user_id: Uuid,
    date: NaiveDate,
) -> Result<(DailySummary, Vec<CalculationWarning>), AppError> {
    let times: Vec<(NaiveTime,)> = sqlx::query_as(
        r#"
        SELECT punch_time
        FROM punch_records
        WHERE user_id = $1 AND punch_date = $2
        ORDER BY punch_time
        "#,
    )
    .bind(user_id)
    .bind(date)
    .fetch_all(&mut **tx)
    .await?;

    let times: Vec<NaiveTime> = times.into_iter().map(|(t,)| t).collect();
    let calc = balance::calculate_day(config, date, &times);

    for warning in &calc.warnings {
        log::warn!(
            "Calculation warning for user {} on {}: {:?}",
            user_id,
            date,
            warning
        );
    }

    let summary = sqlx::query_as::<_, DailySummary>(
        r#"
        INSERT INTO daily_summaries
            (id, user_id, reference_date, worked_minutes, expected_minutes,
             balance_minutes, status, updated_at)
        VALUES
            ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (user_id, reference_date) DO UPDATE SET
            worked_minutes = EXCLUDED.worked_minutes,
            expected_minutes = EXCLUDED.expected_minutes,
            balance_minutes = EXCLUDED.balance_minutes,
            status = EXCLUDED.status,
            updated_at = EXCLUDED.updated_at
        RETURNING
            id, user_id, reference_date, worked_minutes, expected_minutes,
            balance_minutes, status, updated_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(date)
    .bind(calc.worked_minutes)
    .bind(calc.expected_minutes)
    .bind(calc.balance_minutes)
    .bind(calc.status)
    .bind(Utc::now())
    .fetch_one(&mut **tx)
    .await?;

    Ok((summary, calc.warnings))
}

fn parse_proposed_time(request: &AdjustmentRequest) -> Result<NaiveTime, AppError> {
    let value = request
        .proposed_time
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("Request has no proposed time".to_string()))?;
    balance::parse_hhmm(value).map_err(|e| AppError::BadRequest(e.to_string()))
}

fn required_punch_kind(request: &AdjustmentRequest) -> Result<PunchKind, AppError> {
    request
        .punch_kind
        .ok_or_else(|| AppError::BadRequest("Request has no punch kind".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn punch_kind_ladder_follows_the_day() {
        assert_eq!(PunchKind::next_for_count(0), PunchKind::Entrada);
        assert_eq!(PunchKind::next_for_count(1), PunchKind::IdaAlmoco);
        assert_eq!(PunchKind::next_for_count(2), PunchKind::VoltaAlmoco);
        assert_eq!(PunchKind::next_for_count(3), PunchKind::Saida);
        assert_eq!(PunchKind::next_for_count(4), PunchKind::Extra);
        assert_eq!(PunchKind::next_for_count(9), PunchKind::Extra);
    }

    #[test]
    fn five_by_two_blocks_weekend_punches() {
        let config = ShiftConfig {
            schedule: SchedulePattern::FiveByTwo,
            ..Default::default()
        };

        // 2026-08-22 is a Saturday, 2026-08-24 a Monday.
        let reason = LedgerService::punch_block_reason(&config, d(2026, 8, 22));
        assert_eq!(reason.as_deref(), Some("Escala 5x2: Fim de Semana (Folga)"));
        assert_eq!(
            LedgerService::punch_block_reason(&config, d(2026, 8, 24)),
            None
        );
    }

    #[test]
    fn twelve_thirty_six_blocks_calculated_off_days() {
        let config = ShiftConfig {
            schedule: SchedulePattern::TwelveByThirtySix,
            anchor_date: Some(d(2026, 8, 10)),
            ..Default::default()
        };

        assert_eq!(
            LedgerService::punch_block_reason(&config, d(2026, 8, 10)),
            None
        );
        assert_eq!(
            LedgerService::punch_block_reason(&config, d(2026, 8, 11)).as_deref(),
            Some("Escala 12x36: Dia de Folga Calculado")
        );
    }

    #[test]
    fn livre_never_blocks() {
        let config = ShiftConfig::default();
        assert_eq!(
            LedgerService::punch_block_reason(&config, d(2026, 8, 22)),
            None
        );
    }
}
