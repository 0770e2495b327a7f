use actix_web::{web, HttpResponse, Result};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::{AdjustmentKind, AdjustmentRequestInput};
use crate::database::repositories::{AdjustmentRepository, PunchRepository, UserRepository};
use crate::handlers::shared::ApiResponse;
use crate::services::{Claims, LedgerService};

#[derive(Debug, Deserialize)]
pub struct RejectionInput {
    pub reason: Option<String>,
}

/// Employee files an adjustment request for one of their own days.
pub async fn create_request(
    claims: Claims,
    repo: web::Data<AdjustmentRepository>,
    punch_repo: web::Data<PunchRepository>,
    input: web::Json<AdjustmentRequestInput>,
) -> Result<HttpResponse> {
    let input = input.into_inner();

    // Edits and deletions must point at one of the requester's own punches.
    if matches!(input.kind, AdjustmentKind::Edicao | AdjustmentKind::Exclusao) {
        let Some(punch_id) = input.original_punch_id else {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error(
                "This request kind needs an existing punch",
            )));
        };
        match punch_repo.find_by_id(punch_id).await {
            Ok(Some(punch)) if punch.user_id == claims.user_id() => {}
            Ok(_) => {
                return Ok(HttpResponse::NotFound()
                    .json(ApiResponse::<()>::error("Punch record not found")));
            }
            Err(err) => {
                log::error!("Error checking referenced punch: {}", err);
                return Ok(HttpResponse::InternalServerError()
                    .json(ApiResponse::<()>::error("Failed to create request")));
            }
        }
    }

    match repo.create_request(claims.user_id(), input).await {
        Ok(request) => Ok(HttpResponse::Created().json(ApiResponse::success(request))),
        Err(err) => {
            log::error!("Error creating adjustment request: {}", err);
            Ok(HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("Failed to create request")))
        }
    }
}

/// The employee's own recent requests.
pub async fn my_requests(
    claims: Claims,
    repo: web::Data<AdjustmentRepository>,
) -> Result<HttpResponse> {
    match repo.list_for_user(claims.user_id(), 20).await {
        Ok(requests) => Ok(HttpResponse::Ok().json(ApiResponse::success(requests))),
        Err(err) => {
            log::error!("Error fetching adjustment requests: {}", err);
            Ok(HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("Failed to fetch requests")))
        }
    }
}

/// Pending queue, masters only.
pub async fn pending_requests(
    claims: Claims,
    repo: web::Data<AdjustmentRepository>,
) -> Result<HttpResponse> {
    if !claims.is_master() {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::<()>::error(
            "Only masters can review requests",
        )));
    }

    match repo.list_pending().await {
        Ok(requests) => Ok(HttpResponse::Ok().json(ApiResponse::success(requests))),
        Err(err) => {
            log::error!("Error fetching pending requests: {}", err);
            Ok(HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("Failed to fetch requests")))
        }
    }
}

/// Approve and apply a request: the ledger mutation, the status flip and the
/// summary recomputation commit together.
pub async fn approve_request(
    claims: Claims,
    repo: web::Data<AdjustmentRepository>,
    user_repo: web::Data<UserRepository>,
    ledger: web::Data<LedgerService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    if !claims.is_master() {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::<()>::error(
            "Only masters can approve requests",
        )));
    }

    let request_id = path.into_inner();

    let request = match repo.get_request_by_id(request_id).await {
        Ok(Some(request)) => request,
        Ok(None) => {
            return Ok(HttpResponse::NotFound()
                .json(ApiResponse::<()>::error("Adjustment request not found")));
        }
        Err(err) => {
            log::error!("Error fetching adjustment request: {}", err);
            return Ok(HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("Failed to fetch request")));
        }
    };

    if !request.status.is_pending() {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::<()>::error("Request is no longer pending")));
    }

    let user = match user_repo.find_by_id(request.user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return Ok(HttpResponse::NotFound()
                .json(ApiResponse::<()>::error("Employee no longer exists")));
        }
        Err(err) => {
            log::error!("Error fetching employee for approval: {}", err);
            return Ok(HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("Failed to fetch employee")));
        }
    };

    match ledger
        .approve_adjustment(&user, &request, claims.user_id())
        .await
    {
        Ok(outcome) => {
            log::info!(
                "Adjustment {} ({}) approved for user {} on {}",
                request.id,
                request.kind,
                user.username,
                request.reference_date
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(outcome)))
        }
        Err(err) => Err(err.into()),
    }
}

/// Reject with a stored reason. The ledger is untouched.
pub async fn reject_request(
    claims: Claims,
    repo: web::Data<AdjustmentRepository>,
    path: web::Path<Uuid>,
    input: web::Json<RejectionInput>,
) -> Result<HttpResponse> {
    if !claims.is_master() {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::<()>::error(
            "Only masters can reject requests",
        )));
    }

    let request_id = path.into_inner();

    match repo.get_request_by_id(request_id).await {
        Ok(Some(request)) if request.status.is_pending() => {}
        Ok(Some(_)) => {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::<()>::error("Request is no longer pending")));
        }
        Ok(None) => {
            return Ok(HttpResponse::NotFound()
                .json(ApiResponse::<()>::error("Adjustment request not found")));
        }
        Err(err) => {
            log::error!("Error fetching adjustment request: {}", err);
            return Ok(HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("Failed to fetch request")));
        }
    }

    match repo
        .reject_request(request_id, claims.user_id(), input.into_inner().reason)
        .await
    {
        Ok(Some(rejected)) => Ok(HttpResponse::Ok().json(ApiResponse::success(rejected))),
        // Decided by a concurrent master between the read above and the
        // guarded update.
        Ok(None) => Ok(HttpResponse::BadRequest()
            .json(ApiResponse::<()>::error("Request is no longer pending"))),
        Err(err) => {
            log::error!("Error rejecting adjustment request: {}", err);
            Ok(HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("Failed to reject request")))
        }
    }
}
