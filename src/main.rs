//! 股票分析后端服务
//!
//! 获取股票元数据和历史K线，计算关键指标，生成K线图、成交量图和均线图
//! 数据来源：Yahoo Finance

mod config;     // 配置
mod error;      // 错误类型
mod handlers;   // HTTP 请求处理器
mod middleware; // 中间件
mod models;     // 数据模型定义
mod services;   // 业务逻辑服务

use std::sync::Arc;

use actix_web::{middleware::{Condition, Logger}, web, App, HttpServer};
use env_logger::Env;
use tokio::sync::Mutex;

use crate::config::AppConfig;
use crate::middleware::ApiKeyMiddleware;
use crate::services::session::DashboardSession;
use crate::services::stock::{StockDataProvider, YahooFinance};

/// 应用程序入口
///
/// 加载配置，启动 HTTP 服务器
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let (config, source) = AppConfig::load();

    // 初始化日志系统，默认日志级别取自配置
    env_logger::init_from_env(Env::default().default_filter_or(config.log.level.as_str()));
    log::info!("使用配置: {}", source);

    let provider: Arc<dyn StockDataProvider> = match YahooFinance::new(&config) {
        Ok(provider) => Arc::new(provider),
        Err(e) => {
            log::error!("创建数据源失败: {:#}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()));
        }
    };
    let provider = web::Data::from(provider);
    let session = web::Data::new(Mutex::new(DashboardSession::new()));

    if !config.auth_enabled() {
        log::warn!("未设置 API Key，接口不启用认证");
    }

    let bind_addr = config.bind_addr();
    log::info!("启动股票分析服务，监听 {}", bind_addr);

    let auth_enabled = config.auth_enabled();
    let api_key = config.api.api_key.clone();

    let mut server = HttpServer::new(move || {
        // API Key 认证
        let auth = Condition::new(auth_enabled, ApiKeyMiddleware::new(api_key.clone()));
        App::new()
            .wrap(auth)
            .wrap(Logger::default()) // 请求日志
            .app_data(provider.clone())
            .app_data(session.clone())
            .configure(handlers::config) // 配置路由
    });

    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server.bind(bind_addr)?.run().await
}
