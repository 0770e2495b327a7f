use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;
use super::punch::PunchKind;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AdjustmentRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub reference_date: NaiveDate,
    pub original_punch_id: Option<Uuid>,
    /// Proposed wall-clock value as typed by the employee, "HH:MM".
    pub proposed_time: Option<String>,
    pub punch_kind: Option<PunchKind>,
    pub kind: AdjustmentKind,
    pub justification: Option<String>,
    pub status: AdjustmentStatus,
    pub rejection_reason: Option<String>,
    pub decided_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    pub enum AdjustmentKind {
        /// Rewrite the time/kind of an existing punch.
        #[serde(rename = "edicao")]
        Edicao => "edicao",
        /// Append a punch that was never registered.
        #[serde(rename = "inclusao")]
        Inclusao => "inclusao",
        /// Remove a punch registered by mistake.
        #[serde(rename = "exclusao")]
        Exclusao => "exclusao",
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    pub enum AdjustmentStatus {
        #[serde(rename = "pendente")]
        Pendente => "pendente",
        #[serde(rename = "aprovado")]
        Aprovado => "aprovado",
        #[serde(rename = "reprovado")]
        Reprovado => "reprovado",
    }
}

impl AdjustmentStatus {
    /// Whether a request in this state can still be decided. Approved and
    /// rejected are terminal; every decision path (including the SQL
    /// `WHERE status = 'pendente'` guards) enforces this.
    pub fn is_pending(&self) -> bool {
        matches!(self, AdjustmentStatus::Pendente)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustmentRequestInput {
    pub reference_date: NaiveDate,
    pub original_punch_id: Option<Uuid>,
    pub proposed_time: Option<String>,
    pub punch_kind: Option<PunchKind>,
    pub kind: AdjustmentKind,
    pub justification: Option<String>,
}
