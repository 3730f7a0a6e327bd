//! 股票数据服务模块
//!
//! 定义数据源接口，默认实现对接 Yahoo Finance

pub mod yahoo;

#[cfg(test)]
pub mod mock;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Period, PriceSeries, TickerMetadata};

pub use yahoo::YahooFinance;

/// 股票数据源
///
/// 每次调用都是一次全新的网络请求：不重试、不缓存。
/// 序列为空返回 `AnalysisError::NoData`，其余失败返回 `AnalysisError::FetchFailure`
#[async_trait]
pub trait StockDataProvider: Send + Sync {
    async fn fetch(&self, symbol: &str, period: Period) -> Result<(TickerMetadata, PriceSeries)>;
}
