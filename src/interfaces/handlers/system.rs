use actix_web::{get, web, HttpResponse, Responder};
use humantime::format_duration;
use chrono::Utc;
use std::time::Duration;
use serde::Serialize;

use crate::{constants::START_TIME, repositories::rate_limit::RateLimitRepository, AppState};

#[derive(Serialize)]
struct StoreStatus {
    backend: &'static str,
    status: &'static str,
}

#[derive(Serialize)]
struct HealthCheckResponse {
    status: &'static str,
    version: &'static str,
    uptime: String,
    started_at: String,
    timestamp: String,
    rate_limit_store: StoreStatus,
}

#[get("/health")]
pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let now_utc = Utc::now();
    let uptime = now_utc.signed_duration_since(*START_TIME);
    let human_uptime = format_duration(Duration::from_secs(uptime.num_seconds().max(0) as u64));

    let repo = &state.contact_handler.rate_limit_repo;
    let store_status = match repo.ping().await {
        Ok(()) => "OK",
        Err(e) => {
            tracing::warn!("Rate limit store unhealthy: {}", e);
            "Unavailable"
        }
    };

    HttpResponse::Ok().json(HealthCheckResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        uptime: human_uptime.to_string(),
        started_at: START_TIME.to_rfc3339(),
        timestamp: now_utc.to_rfc3339(),
        rate_limit_store: StoreStatus {
            backend: repo.backend(),
            status: store_status,
        },
    })
}
