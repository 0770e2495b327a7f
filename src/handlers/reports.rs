use actix_web::{web, HttpResponse};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::repositories::SummaryRepository;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::balance;
use crate::services::Claims;

#[derive(Debug, Deserialize)]
pub struct BalanceReportQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceReportEntry {
    pub user_id: Uuid,
    pub real_name: String,
    pub worked_minutes: i32,
    pub expected_minutes: i32,
    pub balance_minutes: i32,
    pub worked: String,
    pub expected: String,
    pub saldo: String,
}

/// Period totals of worked/expected/balance per employee, masters only.
pub async fn balance_report(
    claims: Claims,
    summary_repo: web::Data<SummaryRepository>,
    query: web::Query<BalanceReportQuery>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_master() {
        return Err(AppError::Forbidden(
            "Only masters can view reports".to_string(),
        ));
    }

    if query.start_date > query.end_date {
        return Err(AppError::BadRequest(
            "start_date must not be after end_date".to_string(),
        ));
    }

    let rows = summary_repo
        .balance_report(query.start_date, query.end_date)
        .await?;

    let entries: Vec<BalanceReportEntry> = rows
        .into_iter()
        .map(|row| BalanceReportEntry {
            user_id: row.user_id,
            real_name: row.real_name,
            worked: balance::format_minutes_hm(row.worked_minutes),
            expected: balance::format_minutes_hm(row.expected_minutes),
            saldo: balance::format_saldo(row.balance_minutes),
            worked_minutes: row.worked_minutes,
            expected_minutes: row.expected_minutes,
            balance_minutes: row.balance_minutes,
        })
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(entries)))
}
