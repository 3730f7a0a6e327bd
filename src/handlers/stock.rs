//! 股票分析接口处理器
//!
//! ## API 列表
//! - GET /stocks/periods - 可选时间范围
//! - GET /stocks/popular - 热门股票
//! - GET /stocks/{symbol}/analysis?period=1y - 公司信息、指标表和三张图表
//! - GET /stocks/{symbol}/metrics?period=1y - 公司信息和指标表
//! - GET /stocks/{symbol}/history?period=1y&round=true - 历史数据（含均线）
//! - GET /stocks/{symbol}/history.csv?period=1y&round=true - 下载 CSV

use actix_web::http::header::ContentDisposition;
use actix_web::{web, HttpResponse, Result};

use super::{analysis_error, bad_request};
use crate::models::{normalize_symbol, ApiResponse, Period, PeriodOption, StockQuery};
use crate::services::analysis_service;
use crate::services::export::{export_filename, to_csv, CSV_CONTENT_TYPE};
use crate::services::stock::StockDataProvider;

type Provider = web::Data<dyn StockDataProvider>;

/// 获取可选时间范围
pub async fn list_periods() -> Result<HttpResponse> {
    let periods: Vec<PeriodOption> = Period::ALL.into_iter().map(PeriodOption::from).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::success(periods)))
}

/// 获取热门股票
pub async fn list_popular() -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(ApiResponse::success(analysis_service::popular_symbols())))
}

/// 完整分析
///
/// GET /api/v1/stocks/{symbol}/analysis
pub async fn get_analysis(
    provider: Provider,
    path: web::Path<String>,
    query: web::Query<StockQuery>,
) -> Result<HttpResponse> {
    let symbol = path.into_inner();
    let period = match query.period() {
        Ok(period) => period,
        Err(e) => return Ok(bad_request(e)),
    };

    match analysis_service::analyze(provider.get_ref(), &symbol, period).await {
        Ok(analysis) => Ok(HttpResponse::Ok().json(ApiResponse::success(analysis))),
        Err(e) => Ok(analysis_error(&e)),
    }
}

/// 公司信息和指标表
pub async fn get_metrics(
    provider: Provider,
    path: web::Path<String>,
    query: web::Query<StockQuery>,
) -> Result<HttpResponse> {
    let symbol = path.into_inner();
    let period = match query.period() {
        Ok(period) => period,
        Err(e) => return Ok(bad_request(e)),
    };

    match analysis_service::get_metrics(provider.get_ref(), &symbol, period).await {
        Ok(metrics) => Ok(HttpResponse::Ok().json(ApiResponse::success(metrics))),
        Err(e) => Ok(analysis_error(&e)),
    }
}

/// 历史数据（含 MA20 / MA50）
pub async fn get_history(
    provider: Provider,
    path: web::Path<String>,
    query: web::Query<StockQuery>,
) -> Result<HttpResponse> {
    let symbol = path.into_inner();
    let period = match query.period() {
        Ok(period) => period,
        Err(e) => return Ok(bad_request(e)),
    };

    match analysis_service::get_history(provider.get_ref(), &symbol, period, query.round).await {
        Ok(rows) => Ok(HttpResponse::Ok().json(ApiResponse::success(rows))),
        Err(e) => Ok(analysis_error(&e)),
    }
}

/// 下载历史数据 CSV（文件名 `{SYMBOL}_historical_data.csv`）
pub async fn download_history_csv(
    provider: Provider,
    path: web::Path<String>,
    query: web::Query<StockQuery>,
) -> Result<HttpResponse> {
    let symbol = normalize_symbol(&path.into_inner());
    let period = match query.period() {
        Ok(period) => period,
        Err(e) => return Ok(bad_request(e)),
    };

    let series = match analysis_service::get_series(provider.get_ref(), &symbol, period).await {
        Ok(series) => series,
        Err(e) => return Ok(analysis_error(&e)),
    };

    match to_csv(&series, query.round) {
        Ok(csv) => Ok(HttpResponse::Ok()
            .content_type(CSV_CONTENT_TYPE)
            .insert_header(ContentDisposition::attachment(export_filename(&symbol)))
            .body(csv)),
        Err(e) => {
            log::error!("[{}] 导出 CSV 失败: {:#}", symbol, e);
            Ok(HttpResponse::InternalServerError().json(ApiResponse::<()>::error(e.to_string())))
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/stocks")
            .route("/periods", web::get().to(list_periods))
            .route("/popular", web::get().to(list_popular))
            .route("/{symbol}/analysis", web::get().to(get_analysis))
            .route("/{symbol}/metrics", web::get().to(get_metrics))
            .route("/{symbol}/history.csv", web::get().to(download_history_csv))
            .route("/{symbol}/history", web::get().to(get_history))
    );
}
