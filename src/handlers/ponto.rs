use actix_web::{web, HttpResponse};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::database::models::{DayStatus, PunchInput, PunchKind, PunchRecord};
use crate::database::repositories::{PunchRepository, SummaryRepository, UserRepository};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::balance::{self, ShiftConfig};
use crate::services::{Claims, LedgerService};

/// Days of history shown on the mirror when no date filter is given.
const ESPELHO_DAY_LIMIT: i64 = 31;

/// Register the next punch of the day for the authenticated employee.
pub async fn register_punch(
    claims: Claims,
    config: web::Data<Config>,
    user_repo: web::Data<UserRepository>,
    ledger: web::Data<LedgerService>,
    input: web::Json<PunchInput>,
) -> Result<HttpResponse, AppError> {
    let user = user_repo
        .find_by_id(claims.user_id())
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let now = config.local_now();
    let input = input.into_inner();

    let outcome = ledger
        .register_punch(&user, now.date(), now.time(), input.latitude, input.longitude)
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::success(outcome)))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayResponse {
    pub date: NaiveDate,
    pub punches: Vec<PunchRecord>,
    pub next_kind: PunchKind,
    pub next_kind_label: &'static str,
    pub blocked: bool,
    pub block_reason: Option<String>,
    /// Today's cached saldo, present once at least one punch was computed.
    pub saldo: Option<String>,
}

/// Today's punches, the next punch in the ladder, and whether the rigid
/// schedule blocks punching today.
pub async fn today(
    claims: Claims,
    config: web::Data<Config>,
    user_repo: web::Data<UserRepository>,
    punch_repo: web::Data<PunchRepository>,
    summary_repo: web::Data<SummaryRepository>,
) -> Result<HttpResponse, AppError> {
    let user = user_repo
        .find_by_id(claims.user_id())
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let date = config.local_now().date();
    let punches = punch_repo.list_for_day(user.id, date).await?;
    let summary = summary_repo.find(user.id, date).await?;

    let shift = ShiftConfig::from(&user);
    let block_reason = LedgerService::punch_block_reason(&shift, date);
    let next_kind = PunchKind::next_for_count(punches.len());

    Ok(HttpResponse::Ok().json(ApiResponse::success(TodayResponse {
        date,
        next_kind,
        next_kind_label: next_kind.label(),
        blocked: block_reason.is_some(),
        block_reason,
        saldo: summary.map(|s| balance::format_saldo(s.balance_minutes)),
        punches,
    })))
}

#[derive(Debug, Deserialize)]
pub struct EspelhoQuery {
    pub user_id: Option<Uuid>,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EspelhoDay {
    pub date: NaiveDate,
    pub punches: Vec<PunchRecord>,
    /// Signed saldo, "+HH:MM" / "-HH:MM"; "--:--" when not yet computed.
    pub saldo: String,
    pub status: Option<DayStatus>,
}

/// Timesheet mirror: punches grouped per day, newest day first, with the
/// cached saldo and status. Employees see themselves; masters may pass any
/// `user_id`.
pub async fn espelho(
    claims: Claims,
    punch_repo: web::Data<PunchRepository>,
    summary_repo: web::Data<SummaryRepository>,
    query: web::Query<EspelhoQuery>,
) -> Result<HttpResponse, AppError> {
    let target_user = if claims.is_master() {
        query.user_id.unwrap_or_else(|| claims.user_id())
    } else {
        claims.user_id()
    };

    let punches = punch_repo
        .list_recent(target_user, query.date, ESPELHO_DAY_LIMIT)
        .await?;

    let mut days: Vec<EspelhoDay> = Vec::new();
    for punch in punches {
        match days.last_mut() {
            Some(day) if day.date == punch.punch_date => day.punches.push(punch),
            _ => days.push(EspelhoDay {
                date: punch.punch_date,
                punches: vec![punch],
                saldo: "--:--".to_string(),
                status: None,
            }),
        }
    }

    let dates: Vec<NaiveDate> = days.iter().map(|d| d.date).collect();
    let summaries = summary_repo.find_for_dates(target_user, &dates).await?;
    for day in &mut days {
        if let Some(summary) = summaries.iter().find(|s| s.reference_date == day.date) {
            day.saldo = balance::format_saldo(summary.balance_minutes);
            day.status = Some(summary.status);
        }
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(days)))
}
