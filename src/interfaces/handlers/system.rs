use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;
use serde::Serialize;

use crate::{constants::START_TIME, AppState};

#[derive(Serialize)]
struct HealthCheckResponse {
    status: String,
    uptime_seconds: i64,
    timestamp: String,
    database: String,
    version: String,
}

#[get("/health")]
pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let now = Utc::now();

    let database = match sqlx::query("SELECT 1").execute(&state.db_pool).await {
        Ok(_) => "connected".to_string(),
        Err(e) => {
            tracing::error!("health check database ping failed: {}", e);
            format!("error: {e}")
        }
    };

    let status = if database == "connected" { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthCheckResponse {
        status: status.to_string(),
        uptime_seconds: now.signed_duration_since(*START_TIME).num_seconds(),
        timestamp: now.to_rfc3339(),
        database,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
