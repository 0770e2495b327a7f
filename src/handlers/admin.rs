use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::{CreateUserInput, UpdateUserInput, User};
use crate::database::repositories::UserRepository;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::{AuthService, Claims, LedgerService};

fn require_master(claims: &Claims) -> Result<(), AppError> {
    if claims.is_master() {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Only masters can manage users".to_string(),
        ))
    }
}

pub async fn list_users(
    claims: Claims,
    user_repo: web::Data<UserRepository>,
) -> Result<HttpResponse, AppError> {
    require_master(&claims)?;

    let users = user_repo.list_users().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(users)))
}

pub async fn create_user(
    claims: Claims,
    auth_service: web::Data<AuthService>,
    input: web::Json<CreateUserInput>,
) -> Result<HttpResponse, AppError> {
    require_master(&claims)?;

    let user = auth_service.register(input.into_inner()).await?;
    log::info!("User {} created by {}", user.username, claims.username);

    Ok(HttpResponse::Created().json(ApiResponse::success(user)))
}

pub async fn get_user(
    claims: Claims,
    user_repo: web::Data<UserRepository>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    require_master(&claims)?;

    let user = user_repo
        .find_by_id(path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(user)))
}

fn shift_config_changed(before: &User, input: &UpdateUserInput) -> bool {
    before.entry_time != input.entry_time
        || before.lunch_out_time != input.lunch_out_time
        || before.lunch_in_time != input.lunch_in_time
        || before.exit_time != input.exit_time
        || before.schedule != input.schedule
        || before.schedule_anchor_date != input.schedule_anchor_date
}

/// Update an employee. A shift configuration change invalidates every cached
/// summary for that employee, so they are all recomputed here.
pub async fn update_user(
    claims: Claims,
    user_repo: web::Data<UserRepository>,
    ledger: web::Data<LedgerService>,
    path: web::Path<Uuid>,
    input: web::Json<UpdateUserInput>,
) -> Result<HttpResponse, AppError> {
    require_master(&claims)?;

    let user_id = path.into_inner();
    let input = input.into_inner();

    let existing = user_repo
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let needs_recompute = shift_config_changed(&existing, &input);
    let updated = user_repo.update_user(user_id, &input).await?;

    if needs_recompute {
        let recomputed = ledger.recompute_all_for_user(&updated).await?;
        return Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            Some(updated),
            &format!("Shift configuration changed; {} day(s) recomputed", recomputed),
        )));
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(updated)))
}

#[derive(Debug, Deserialize)]
pub struct PasswordInput {
    pub password: String,
}

pub async fn reset_password(
    claims: Claims,
    user_repo: web::Data<UserRepository>,
    path: web::Path<Uuid>,
    input: web::Json<PasswordInput>,
) -> Result<HttpResponse, AppError> {
    require_master(&claims)?;

    let user_id = path.into_inner();
    user_repo
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let password_hash = bcrypt::hash(&input.password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::internal_server_error_message(e.to_string()))?;
    user_repo.update_password(user_id, &password_hash).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_with_message(
        None,
        "Password updated",
    )))
}

pub async fn delete_user(
    claims: Claims,
    user_repo: web::Data<UserRepository>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    require_master(&claims)?;

    let user_id = path.into_inner();
    let user = user_repo
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    // Punches, summaries and requests cascade with the user row.
    user_repo.delete_user(user_id).await?;
    log::info!("User {} deleted by {}", user.username, claims.username);

    Ok(HttpResponse::NoContent().finish())
}
