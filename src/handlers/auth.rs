use actix_web::{web, HttpResponse, Result};

use crate::database::models::{LoginInput, UserInfo};
use crate::database::repositories::UserRepository;
use crate::handlers::shared::ApiResponse;
use crate::services::auth::{AuthService, Claims};

pub async fn login(
    auth_service: web::Data<AuthService>,
    input: web::Json<LoginInput>,
) -> Result<HttpResponse> {
    match auth_service.login(input.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(response))),
        Err(err) => {
            log::warn!("Login failed: {}", err);
            Ok(HttpResponse::Unauthorized()
                .json(ApiResponse::<()>::error("Invalid username or password")))
        }
    }
}

pub async fn me(claims: Claims, user_repo: web::Data<UserRepository>) -> Result<HttpResponse> {
    match user_repo.find_by_id(claims.user_id()).await {
        Ok(Some(user)) => {
            Ok(HttpResponse::Ok().json(ApiResponse::success(UserInfo::from(user))))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::<()>::error("User not found"))),
        Err(err) => {
            log::error!("Error fetching current user: {}", err);
            Ok(HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("Failed to fetch user")))
        }
    }
}
