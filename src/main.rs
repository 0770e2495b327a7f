use actix_cors::Cors;
use actix_web::{get, middleware::Logger, web, App, HttpResponse, HttpServer, Responder};
use anyhow::Result;

use shahin_gestao::database::{
    init_database,
    repositories::{AdjustmentRepository, PunchRepository, SummaryRepository, UserRepository},
};
use shahin_gestao::handlers::{adjustments, admin, auth, ponto, reports};
use shahin_gestao::{AuthService, Config, LedgerService};

#[get("/")]
async fn hello() -> impl Responder {
    HttpResponse::Ok().body("Shahin Gestão API v1.0")
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now()
    }))
}

#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = Config::from_env()?;
    log::info!(
        "Starting Shahin Gestão API (environment: {})",
        config.environment
    );

    let pool = init_database(&config.database_url).await?;
    log::info!("Database initialized");

    let user_repository = UserRepository::new(pool.clone());
    let punch_repository = PunchRepository::new(pool.clone());
    let summary_repository = SummaryRepository::new(pool.clone());
    let adjustment_repository = AdjustmentRepository::new(pool.clone());

    let auth_service = AuthService::new(user_repository.clone(), config.clone());
    let ledger_service = LedgerService::new(pool.clone());

    let user_repo_data = web::Data::new(user_repository);
    let punch_repo_data = web::Data::new(punch_repository);
    let summary_repo_data = web::Data::new(summary_repository);
    let adjustment_repo_data = web::Data::new(adjustment_repository);
    let auth_service_data = web::Data::new(auth_service);
    let ledger_service_data = web::Data::new(ledger_service);
    let config_data = web::Data::new(config.clone());

    let server_address = config.server_address();
    log::info!("Server starting on http://{}", server_address);

    HttpServer::new(move || {
        App::new()
            .app_data(user_repo_data.clone())
            .app_data(punch_repo_data.clone())
            .app_data(summary_repo_data.clone())
            .app_data(adjustment_repo_data.clone())
            .app_data(auth_service_data.clone())
            .app_data(ledger_service_data.clone())
            .app_data(config_data.clone())
            .wrap(
                Cors::default()
                    .allowed_origin("http://localhost:3000")
                    .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                    .allowed_headers(vec!["Authorization", "Content-Type", "Accept"])
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(hello)
            .service(health)
            .service(
                web::scope("/api/v1")
                    .service(
                        web::scope("/auth")
                            .route("/login", web::post().to(auth::login))
                            .route("/me", web::get().to(auth::me)),
                    )
                    .service(
                        web::scope("/ponto")
                            .route("/punch", web::post().to(ponto::register_punch))
                            .route("/today", web::get().to(ponto::today))
                            .route("/espelho", web::get().to(ponto::espelho)),
                    )
                    .service(
                        web::scope("/adjustments")
                            .route("", web::post().to(adjustments::create_request))
                            .route("/my", web::get().to(adjustments::my_requests))
                            .route("/pending", web::get().to(adjustments::pending_requests))
                            .route(
                                "/{id}/approve",
                                web::post().to(adjustments::approve_request),
                            )
                            .route("/{id}/reject", web::post().to(adjustments::reject_request)),
                    )
                    .service(
                        web::scope("/admin/users")
                            .route("", web::get().to(admin::list_users))
                            .route("", web::post().to(admin::create_user))
                            .route("/{id}", web::get().to(admin::get_user))
                            .route("/{id}", web::put().to(admin::update_user))
                            .route("/{id}", web::delete().to(admin::delete_user))
                            .route("/{id}/password", web::put().to(admin::reset_password)),
                    )
                    .service(
                        web::scope("/reports")
                            .route("/balance", web::get().to(reports::balance_report)),
                    ),
            )
    })
    .bind(&server_address)?
    .run()
    .await
    .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
