//! 看板接口处理器
//!
//! - GET /dashboard - 当前看板视图
//! - POST /dashboard/analyze - 提交股票代码和时间范围

use actix_web::{web, HttpResponse, Result};
use tokio::sync::Mutex;

use super::bad_request;
use crate::models::{ApiResponse, DashboardRequest};
use crate::services::session::{submit, AnalysisRequest, DashboardSession};
use crate::services::stock::StockDataProvider;

/// 当前看板视图
pub async fn get_dashboard(session: web::Data<Mutex<DashboardSession>>) -> Result<HttpResponse> {
    let session = session.lock().await;
    Ok(HttpResponse::Ok().json(ApiResponse::success(session.view())))
}

/// 提交分析请求
pub async fn analyze(
    provider: web::Data<dyn StockDataProvider>,
    session: web::Data<Mutex<DashboardSession>>,
    body: web::Json<DashboardRequest>,
) -> Result<HttpResponse> {
    let period = match body.period() {
        Ok(period) => period,
        Err(e) => return Ok(bad_request(e)),
    };
    let request = AnalysisRequest::new(&body.symbol, period);

    submit(session.get_ref(), provider.get_ref(), request, body.analyze).await;
    let session = session.lock().await;
    Ok(HttpResponse::Ok().json(ApiResponse::success(session.view())))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/dashboard")
            .route("", web::get().to(get_dashboard))
            .route("/analyze", web::post().to(analyze))
    );
}
