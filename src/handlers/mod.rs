pub mod dashboard;
pub mod health;
pub mod stock;

use actix_web::{web, HttpResponse};

use crate::error::AnalysisError;
use crate::models::ApiResponse;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(health::config)
            .configure(stock::config)
            .configure(dashboard::config)
    );
}

/// 数据获取错误：无数据 → 404，请求失败 → 502
pub(crate) fn analysis_error(err: &AnalysisError) -> HttpResponse {
    let response = ApiResponse::<()>::error(err.to_string());
    match err {
        AnalysisError::NoData => HttpResponse::NotFound().json(response),
        AnalysisError::FetchFailure(_) => HttpResponse::BadGateway().json(response),
    }
}

/// 参数错误 → 400
pub(crate) fn bad_request(message: String) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::<()>::error(message))
}
