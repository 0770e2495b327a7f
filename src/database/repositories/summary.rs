use anyhow::Result;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::DailySummary;

#[derive(Clone)]
pub struct SummaryRepository {
    pool: PgPool,
}

const SUMMARY_COLUMNS: &str = r#"
    id,
    user_id,
    reference_date,
    worked_minutes,
    expected_minutes,
    balance_minutes,
    status,
    updated_at
"#;

impl SummaryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, user_id: Uuid, date: NaiveDate) -> Result<Option<DailySummary>> {
        let summary = sqlx::query_as::<_, DailySummary>(&format!(
            r#"
            SELECT {SUMMARY_COLUMNS}
            FROM daily_summaries
            WHERE user_id = $1 AND reference_date = $2
            "#
        ))
        .bind(user_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(summary)
    }

    pub async fn find_for_dates(
        &self,
        user_id: Uuid,
        dates: &[NaiveDate],
    ) -> Result<Vec<DailySummary>> {
        let summaries = sqlx::query_as::<_, DailySummary>(&format!(
            r#"
            SELECT {SUMMARY_COLUMNS}
            FROM daily_summaries
            WHERE user_id = $1 AND reference_date = ANY($2)
            ORDER BY reference_date DESC
            "#
        ))
        .bind(user_id)
        .bind(dates)
        .fetch_all(&self.pool)
        .await?;

        Ok(summaries)
    }

    /// Period totals per employee, master report. Every employee appears;
    /// one with no summarized days in the period comes back as zeroes. Rows
    /// come back ordered by employee name.
    pub async fn balance_report(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<BalanceReportRow>> {
        let rows = sqlx::query_as::<_, BalanceReportRow>(
            r#"
            SELECT
                u.id AS user_id,
                u.real_name,
                COALESCE(SUM(s.worked_minutes), 0)::INT AS worked_minutes,
                COALESCE(SUM(s.expected_minutes), 0)::INT AS expected_minutes,
                COALESCE(SUM(s.balance_minutes), 0)::INT AS balance_minutes
            FROM users u
            LEFT JOIN daily_summaries s
                ON s.user_id = u.id AND s.reference_date BETWEEN $1 AND $2
            GROUP BY u.id, u.real_name
            ORDER BY u.real_name
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BalanceReportRow {
    pub user_id: Uuid,
    pub real_name: String,
    pub worked_minutes: i32,
    pub expected_minutes: i32,
    pub balance_minutes: i32,
}
