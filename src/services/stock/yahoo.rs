//! Yahoo Finance 股票接口实现
//!
//! 提供基本面元数据和日K线数据
//! 对接 https://query1.finance.yahoo.com 和 https://query2.finance.yahoo.com

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use url::Url;

use super::StockDataProvider;
use crate::config::{AppConfig, ProviderConfig};
use crate::error::AnalysisError;
use crate::models::{Period, PriceRecord, PriceSeries, TickerMetadata};

/// quoteSummary 模块，按优先级排列（同名字段取先出现的）
const SUMMARY_MODULES: [&str; 5] = [
    "price",
    "summaryDetail",
    "financialData",
    "defaultKeyStatistics",
    "assetProfile",
];

/// Yahoo Finance 数据源
///
/// ## 数据来源
/// - quoteSummary：公司信息、估值、利润率等元数据（需要 cookie + crumb）
/// - chart：日K线，含分红和拆股事件
pub struct YahooFinance {
    /// HTTP 客户端（开启 cookie）
    client: Client,
    /// 接口地址
    config: ProviderConfig,
    /// crumb 认证令牌，失效时刷新
    crumb: Mutex<Option<String>>,
}

impl YahooFinance {
    /// 创建数据源实例
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.provider.user_agent.as_str())
            .cookie_store(true)
            .gzip(true)
            .timeout(Duration::from_secs(config.api.timeout_secs))
            .connect_timeout(Duration::from_secs(config.api.connect_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            config: config.provider.clone(),
            crumb: Mutex::new(None),
        })
    }

    /// 获取 crumb；先访问 cookie 地址建立会话（该地址返回 404 也会下发 cookie）
    async fn crumb(&self, refresh: bool) -> Result<String> {
        let mut cached = self.crumb.lock().await;
        if !refresh {
            if let Some(crumb) = cached.as_ref() {
                return Ok(crumb.clone());
            }
        }

        if let Err(e) = self.client.get(&self.config.cookie_url).send().await {
            log::warn!("获取会话 cookie 失败: {}", e);
        }

        let response = self.client.get(&self.config.crumb_url).send().await?;
        if !response.status().is_success() {
            bail!("failed to obtain crumb: HTTP {}", response.status());
        }

        let crumb = response.text().await?.trim().to_string();
        if crumb.is_empty() || crumb.contains('<') {
            bail!("failed to obtain crumb: unexpected response");
        }

        log::debug!("crumb 已更新");
        *cached = Some(crumb.clone());
        Ok(crumb)
    }

    /// 获取元数据（公司信息、估值、利润率等）
    pub async fn fetch_metadata(&self, symbol: &str) -> Result<TickerMetadata> {
        let url = endpoint(&self.config.quote_summary_url, symbol)?;
        log::debug!("📡 请求元数据 URL: {}", url);

        let crumb = self.crumb(false).await?;
        let mut response = self.quote_summary(url.clone(), &crumb).await?;

        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            log::warn!("[{}] crumb 已失效，重新获取", symbol);
            let crumb = self.crumb(true).await?;
            response = self.quote_summary(url, &crumb).await?;
        }

        let status = response.status();
        let body = response.text().await?;
        parse_quote_summary(status, &body)
    }

    async fn quote_summary(&self, url: Url, crumb: &str) -> Result<reqwest::Response> {
        let modules = SUMMARY_MODULES.join(",");
        let response = self
            .client
            .get(url)
            .query(&[("modules", modules.as_str()), ("crumb", crumb)])
            .send()
            .await?;
        Ok(response)
    }

    /// 获取日K线历史数据
    pub async fn fetch_history(&self, symbol: &str, period: Period) -> Result<PriceSeries> {
        let url = endpoint(&self.config.chart_url, symbol)?;
        log::debug!("📡 请求日K线数据 URL: {} range={}", url, period);

        let response = self
            .client
            .get(url)
            .query(&[
                ("range", period.code()),
                ("interval", "1d"),
                ("events", "div,splits"),
                ("includeAdjustedClose", "true"),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        parse_chart(status, &body)
    }
}

#[async_trait]
impl StockDataProvider for YahooFinance {
    async fn fetch(
        &self,
        symbol: &str,
        period: Period,
    ) -> crate::error::Result<(TickerMetadata, PriceSeries)> {
        let metadata = self.fetch_metadata(symbol).await.map_err(|e| {
            log::warn!("[{}] 获取元数据失败: {:#}", symbol, e);
            AnalysisError::from(e)
        })?;

        let series = self.fetch_history(symbol, period).await.map_err(|e| {
            log::warn!("[{}] 获取K线数据失败: {:#}", symbol, e);
            AnalysisError::from(e)
        })?;

        if metadata.is_empty() {
            log::warn!("[{}] 未获取到公司元数据", symbol);
        }

        if series.is_empty() {
            log::info!("[{}] {} 区间内没有K线数据", symbol, period);
            return Err(AnalysisError::NoData);
        }

        log::info!(
            "[{}] 获取 {} 个元数据字段, {} 条K线",
            symbol,
            metadata.len(),
            series.len()
        );
        Ok((metadata, series))
    }
}

/// 拼接接口地址，股票代码作为单个路径段（`/`、`?`、`#`、空格会被转义，`^` 原样保留）
fn endpoint(base: &str, symbol: &str) -> Result<Url> {
    let mut url = Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| anyhow!("invalid provider url: {}", base))?
        .push(symbol);
    Ok(url)
}

// ==================== 响应结构 ====================

#[derive(Debug, Deserialize)]
struct ProviderError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

impl ProviderError {
    fn message(&self) -> String {
        match (self.code.is_empty(), self.description.is_empty()) {
            (false, false) => format!("{}: {}", self.code, self.description),
            (true, false) => self.description.clone(),
            _ => self.code.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryEnvelope {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummaryBody,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryBody {
    result: Option<Vec<Map<String, Value>>>,
    error: Option<ProviderError>,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ProviderError>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    #[serde(default)]
    events: ChartEvents,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    exchange_timezone_name: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct ChartEvents {
    #[serde(default)]
    dividends: HashMap<String, DividendEvent>,
    #[serde(default)]
    splits: HashMap<String, SplitEvent>,
}

#[derive(Debug, Deserialize)]
struct DividendEvent {
    amount: f64,
    date: i64,
}

#[derive(Debug, Deserialize)]
struct SplitEvent {
    date: i64,
    numerator: f64,
    denominator: f64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
    #[serde(default)]
    adjclose: Vec<AdjClose>,
}

#[derive(Debug, Deserialize, Default)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

// ==================== 解析 ====================

/// 解析 quoteSummary 响应并展开为扁平的元数据
fn parse_quote_summary(status: StatusCode, body: &str) -> Result<TickerMetadata> {
    let envelope: QuoteSummaryEnvelope = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(_) if !status.is_success() => bail!("HTTP {}", status),
        Err(e) => return Err(anyhow!("failed to decode quote summary: {}", e)),
    };

    if let Some(error) = envelope.quote_summary.error {
        bail!(error.message());
    }
    if !status.is_success() {
        bail!("HTTP {}", status);
    }

    let modules = envelope
        .quote_summary
        .result
        .and_then(|mut result| (!result.is_empty()).then(|| result.swap_remove(0)))
        .ok_or_else(|| anyhow!("quote summary returned no result"))?;

    Ok(flatten_modules(&modules))
}

/// 展开各模块字段：`{raw, fmt}` 取 raw，空对象、数组、null 丢弃
fn flatten_modules(modules: &Map<String, Value>) -> TickerMetadata {
    let mut metadata = TickerMetadata::new();

    for module in SUMMARY_MODULES {
        let Some(Value::Object(fields)) = modules.get(module) else {
            continue;
        };

        for (key, value) in fields {
            if metadata.contains(key) {
                continue;
            }
            if let Some(scalar) = scalar_value(value) {
                metadata.insert(key.clone(), scalar);
            }
        }
    }

    metadata
}

fn at(values: &[Option<f64>], i: usize) -> Option<f64> {
    values.get(i).copied().flatten()
}

fn scalar_value(value: &Value) -> Option<Value> {
    match value {
        Value::Object(object) => object
            .get("raw")
            .filter(|raw| !raw.is_object() && !raw.is_array() && !raw.is_null())
            .cloned(),
        Value::Array(_) | Value::Null => None,
        other => Some(other.clone()),
    }
}

/// 解析日K线响应
///
/// 时间戳按交易所时区转为日期；开高低收任一为空的行丢弃；
/// 有 adjclose 时按 adjclose / close 复权开高低收
fn parse_chart(status: StatusCode, body: &str) -> Result<PriceSeries> {
    let envelope: ChartEnvelope = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(_) if !status.is_success() => bail!("HTTP {}", status),
        Err(e) => return Err(anyhow!("failed to decode chart data: {}", e)),
    };

    if let Some(error) = envelope.chart.error {
        bail!(error.message());
    }
    if !status.is_success() {
        bail!("HTTP {}", status);
    }

    let Some(result) = envelope.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(PriceSeries::default());
    };

    let tz: Tz = result
        .meta
        .exchange_timezone_name
        .as_deref()
        .and_then(|name| name.parse().ok())
        .unwrap_or(Tz::UTC);
    let to_date = |ts: i64| {
        DateTime::from_timestamp(ts, 0).map(|dt| dt.with_timezone(&tz).date_naive())
    };

    let dividends: HashMap<NaiveDate, f64> = result
        .events
        .dividends
        .values()
        .filter_map(|d| to_date(d.date).map(|date| (date, d.amount)))
        .collect();
    let splits: HashMap<NaiveDate, f64> = result
        .events
        .splits
        .values()
        .filter(|s| s.denominator != 0.0)
        .filter_map(|s| to_date(s.date).map(|date| (date, s.numerator / s.denominator)))
        .collect();

    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let adjclose = result
        .indicators
        .adjclose
        .into_iter()
        .next()
        .map(|a| a.adjclose)
        .unwrap_or_default();

    let mut records = Vec::with_capacity(result.timestamp.len());
    for (i, ts) in result.timestamp.iter().enumerate() {
        let (Some(open), Some(high), Some(low), Some(close)) = (
            at(&quote.open, i),
            at(&quote.high, i),
            at(&quote.low, i),
            at(&quote.close, i),
        ) else {
            continue;
        };
        let Some(date) = to_date(*ts) else {
            continue;
        };

        let ratio = match at(&adjclose, i) {
            Some(adj) if close != 0.0 => adj / close,
            _ => 1.0,
        };

        records.push(PriceRecord {
            date,
            open: open * ratio,
            high: high * ratio,
            low: low * ratio,
            close: close * ratio,
            volume: at(&quote.volume, i).unwrap_or(0.0).max(0.0) as u64,
            dividends: dividends.get(&date).copied().unwrap_or(0.0),
            stock_splits: splits.get(&date).copied().unwrap_or(0.0),
        });
    }

    Ok(PriceSeries::new(records))
}
