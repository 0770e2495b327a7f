use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;

/// One cached row per (user, date), always derivable from the punch ledger
/// plus the user's shift configuration. Upserted by the balance calculator,
/// never written directly by a user action.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    pub id: Uuid,
    pub user_id: Uuid,
    pub reference_date: NaiveDate,
    pub worked_minutes: i32,
    pub expected_minutes: i32,
    pub balance_minutes: i32,
    pub status: DayStatus,
    pub updated_at: DateTime<Utc>,
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    pub enum DayStatus {
        /// Scheduled workday with no punches at all.
        #[serde(rename = "Falta")]
        Falta => "Falta",
        /// Off-day with no punches.
        #[serde(rename = "Folga")]
        Folga => "Folga",
        /// Odd punch count; the trailing punch is unmatched and the balance
        /// is zeroed until someone fixes the day.
        #[serde(rename = "Erro: Ímpar")]
        ErroImpar => "Erro: Ímpar",
        /// Worked on an off-day; the whole worked time counts as overtime.
        #[serde(rename = "Hora Extra (Folga)")]
        HoraExtraFolga => "Hora Extra (Folga)",
        #[serde(rename = "Normal")]
        Normal => "Normal",
        #[serde(rename = "Hora Extra")]
        HoraExtra => "Hora Extra",
        #[serde(rename = "Atraso/Débito")]
        AtrasoDebito => "Atraso/Débito",
    }
}
