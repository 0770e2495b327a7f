use anyhow::Result;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::PunchRecord;

#[derive(Clone)]
pub struct PunchRepository {
    pool: PgPool,
}

const PUNCH_COLUMNS: &str = r#"
    id,
    user_id,
    punch_date,
    punch_time,
    kind,
    latitude,
    longitude,
    created_at
"#;

impl PunchRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<PunchRecord>> {
        let punch = sqlx::query_as::<_, PunchRecord>(&format!(
            "SELECT {PUNCH_COLUMNS} FROM punch_records WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(punch)
    }

    /// All punches for one employee-day, in chronological order. The
    /// calculator depends on this ordering.
    pub async fn list_for_day(&self, user_id: Uuid, date: NaiveDate) -> Result<Vec<PunchRecord>> {
        let punches = sqlx::query_as::<_, PunchRecord>(&format!(
            r#"
            SELECT {PUNCH_COLUMNS}
            FROM punch_records
            WHERE user_id = $1 AND punch_date = $2
            ORDER BY punch_time
            "#
        ))
        .bind(user_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        Ok(punches)
    }

    /// Recent punches for the mirror view: newest day first, chronological
    /// within a day, optionally narrowed to a single date.
    pub async fn list_recent(
        &self,
        user_id: Uuid,
        date: Option<NaiveDate>,
        limit: i64,
    ) -> Result<Vec<PunchRecord>> {
        let mut query = format!(
            r#"
            SELECT {PUNCH_COLUMNS}
            FROM punch_records
            WHERE user_id = $1
            "#
        );

        if date.is_some() {
            query.push_str(" AND punch_date = $2");
        }
        query.push_str(" ORDER BY punch_date DESC, punch_time");

        let mut prepared = sqlx::query_as::<_, PunchRecord>(&query).bind(user_id);
        if let Some(d) = date {
            prepared = prepared.bind(d);
        }

        let mut punches = prepared.fetch_all(&self.pool).await?;
        // Limit by whole days so no day is shown half-empty.
        let mut days_seen: Vec<NaiveDate> = Vec::new();
        punches.retain(|p| {
            if !days_seen.contains(&p.punch_date) {
                days_seen.push(p.punch_date);
            }
            days_seen.iter().position(|d| *d == p.punch_date).unwrap() < limit as usize
        });

        Ok(punches)
    }
}
