//! 测试用数据源

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use serde_json::json;

use super::StockDataProvider;
use crate::error::{AnalysisError, Result};
use crate::models::{Period, PriceRecord, PriceSeries, TickerMetadata};

/// 按代码返回固定数据：AAPL 有数据，EMPTY 返回空序列，其余返回请求失败
pub struct MockProvider {
    calls: AtomicUsize,
    series_len: usize,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            series_len: 60,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

pub fn sample_metadata() -> TickerMetadata {
    vec![
        ("longName", json!("Apple Inc.")),
        ("sector", json!("Technology")),
        ("currentPrice", json!(150.0)),
        ("previousClose", json!(145.0)),
        ("dayLow", json!(148.0)),
        ("dayHigh", json!(151.0)),
        ("volume", json!(45_300_000)),
        ("marketCap", json!(2_950_000_000_000.0)),
    ]
    .into_iter()
    .collect()
}

pub fn sample_series(len: usize) -> PriceSeries {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    PriceSeries::new(
        (0..len)
            .map(|i| PriceRecord {
                date: start + Duration::days(i as i64),
                open: 100.0 + i as f64,
                high: 101.0 + i as f64,
                low: 99.0 + i as f64,
                close: 100.5 + i as f64,
                volume: 1_000_000,
                dividends: 0.0,
                stock_splits: 0.0,
            })
            .collect(),
    )
}

#[async_trait]
impl StockDataProvider for MockProvider {
    async fn fetch(&self, symbol: &str, _period: Period) -> Result<(TickerMetadata, PriceSeries)> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match symbol {
            "AAPL" => Ok((sample_metadata(), sample_series(self.series_len))),
            "EMPTY" => Err(AnalysisError::NoData),
            other => Err(AnalysisError::FetchFailure(format!(
                "Not Found: Quote not found for symbol: {}",
                other
            ))),
        }
    }
}
