use actix_web::{web, HttpResponse, Result};
use serde::Serialize;

use crate::models::ApiResponse;

#[derive(Serialize)]
struct Health {
    status: &'static str,
    service: &'static str,
    version: &'static str,
}

/// GET /api/v1/health（不需要认证）
pub async fn health_check() -> Result<HttpResponse> {
    let response = ApiResponse::success(Health {
        status: "healthy",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    });
    Ok(HttpResponse::Ok().json(response))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check));
}
