use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;

/// Geolocation sentinel stored on punches created through an approved
/// adjustment, so the mirror can tell manual entries from real ones.
pub const MANUAL_PUNCH_LATITUDE: &str = "Ajuste Manual";
pub const MANUAL_PUNCH_LONGITUDE: &str = "Aprovado pelo Master";

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PunchRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub punch_date: NaiveDate,
    pub punch_time: NaiveTime,
    pub kind: PunchKind,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub created_at: DateTime<Utc>,
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "snake_case")]
    pub enum PunchKind {
        Entrada => "entrada",
        IdaAlmoco => "ida_almoco",
        VoltaAlmoco => "volta_almoco",
        Saida => "saida",
        Extra => "extra",
    }
}

impl PunchKind {
    /// Human-readable label shown on the mirror and the punch screen.
    pub fn label(&self) -> &'static str {
        match self {
            PunchKind::Entrada => "Entrada",
            PunchKind::IdaAlmoco => "Ida Almoço",
            PunchKind::VoltaAlmoco => "Volta Almoço",
            PunchKind::Saida => "Saída",
            PunchKind::Extra => "Extra",
        }
    }

    /// Next punch in the day's ladder, given how many punches already exist.
    pub fn next_for_count(count: usize) -> PunchKind {
        match count {
            0 => PunchKind::Entrada,
            1 => PunchKind::IdaAlmoco,
            2 => PunchKind::VoltaAlmoco,
            3 => PunchKind::Saida,
            _ => PunchKind::Extra,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PunchInput {
    pub latitude: Option<String>,
    pub longitude: Option<String>,
}
