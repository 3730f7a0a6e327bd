//! 股票数据模型
//!
//! 定义行情元数据、历史K线序列、指标表和分析结果等数据结构

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use super::chart::ChartFigure;

/// 查询时间范围
///
/// 对应数据源的 range 参数（1mo, 3mo, 6mo, 1y, 2y, 5y）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Period {
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[serde(rename = "6mo")]
    SixMonths,
    #[default]
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "2y")]
    TwoYears,
    #[serde(rename = "5y")]
    FiveYears,
}

impl Period {
    pub const ALL: [Period; 6] = [
        Period::OneMonth,
        Period::ThreeMonths,
        Period::SixMonths,
        Period::OneYear,
        Period::TwoYears,
        Period::FiveYears,
    ];

    /// 数据源使用的时间范围代码
    pub fn code(&self) -> &'static str {
        match self {
            Period::OneMonth => "1mo",
            Period::ThreeMonths => "3mo",
            Period::SixMonths => "6mo",
            Period::OneYear => "1y",
            Period::TwoYears => "2y",
            Period::FiveYears => "5y",
        }
    }

    /// 展示用名称
    pub fn label(&self) -> &'static str {
        match self {
            Period::OneMonth => "1 Month",
            Period::ThreeMonths => "3 Months",
            Period::SixMonths => "6 Months",
            Period::OneYear => "1 Year",
            Period::TwoYears => "2 Years",
            Period::FiveYears => "5 Years",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Period::ALL
            .into_iter()
            .find(|p| p.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unsupported period: {}", s))
    }
}

/// 时间范围选项（供前端下拉框使用）
#[derive(Debug, Serialize)]
pub struct PeriodOption {
    pub label: &'static str,
    pub code: &'static str,
    pub default: bool,
}

impl From<Period> for PeriodOption {
    fn from(period: Period) -> Self {
        Self {
            label: period.label(),
            code: period.code(),
            default: period == Period::default(),
        }
    }
}

/// 股票元数据
///
/// 字段名与数据源保持一致（currentPrice, previousClose, marketCap ...），
/// 缺失字段直接不存在，不视为错误
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct TickerMetadata {
    fields: BTreeMap<String, Value>,
}

impl TickerMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.fields.insert(key.into(), value);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key).filter(|v| !v.is_null())
    }

    /// 数值字段；非数值或 NaN 视为缺失
    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key)
            .and_then(Value::as_f64)
            .filter(|v| !v.is_nan())
    }

    /// 文本字段；空字符串视为缺失
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for TickerMetadata {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// 单日K线数据
///
/// 包含单日的 OHLCV 数据及分红、拆股信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    /// 交易日（交易所当地日期）
    pub date: NaiveDate,
    /// 开盘价
    pub open: f64,
    /// 最高价
    pub high: f64,
    /// 最低价
    pub low: f64,
    /// 收盘价
    pub close: f64,
    /// 成交量
    pub volume: u64,
    /// 每股分红（无则为 0）
    #[serde(default)]
    pub dividends: f64,
    /// 拆股比例（无则为 0）
    #[serde(default)]
    pub stock_splits: f64,
}

/// 按日期升序排列的历史K线序列
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceSeries {
    records: Vec<PriceRecord>,
}

impl PriceSeries {
    /// 构造序列，按日期排序
    pub fn new(mut records: Vec<PriceRecord>) -> Self {
        records.sort_by_key(|r| r.date);
        Self { records }
    }

    pub fn records(&self) -> &[PriceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.records.iter().map(|r| r.date).collect()
    }

    pub fn opens(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.open).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.low).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.close).collect()
    }

    pub fn volumes(&self) -> Vec<u64> {
        self.records.iter().map(|r| r.volume).collect()
    }
}

/// 带均线的K线行（历史数据接口返回）
#[derive(Debug, Clone, Serialize)]
pub struct HistoryRow {
    #[serde(flatten)]
    pub record: PriceRecord,
    pub ma20: Option<f64>,
    pub ma50: Option<f64>,
}

/// 指标表中的一行
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricRow {
    pub label: &'static str,
    pub value: String,
}

/// 关键财务指标表（固定 20 行，顺序固定）
///
/// 序列化为左右两栏：`{"left": [...], "right": [...]}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsTable {
    rows: Vec<MetricRow>,
}

impl MetricsTable {
    pub fn new(rows: Vec<MetricRow>) -> Self {
        Self { rows }
    }

    #[cfg(test)]
    pub fn rows(&self) -> &[MetricRow] {
        &self.rows
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// 按标签查找取值
    #[cfg(test)]
    pub fn value(&self, label: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|row| row.label == label)
            .map(|row| row.value.as_str())
    }

    /// 拆分为左右两栏（前 10 行 / 其余）
    pub fn split_columns(&self) -> (&[MetricRow], &[MetricRow]) {
        self.rows.split_at(self.rows.len().min(10))
    }
}

impl Serialize for MetricsTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let (left, right) = self.split_columns();
        let mut columns = serializer.serialize_struct("MetricsTable", 2)?;
        columns.serialize_field("left", left)?;
        columns.serialize_field("right", right)?;
        columns.end()
    }
}

/// 公司基本信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyInfo {
    pub name: String,
    pub sector: String,
    pub industry: String,
    pub country: String,
    pub website: String,
    pub employees: String,
    pub exchange: String,
    pub currency: String,
    pub business_summary: Option<String>,
}

/// 三张图表
#[derive(Debug, Clone, Serialize)]
pub struct StockCharts {
    pub price: ChartFigure,
    pub volume: ChartFigure,
    pub moving_averages: ChartFigure,
}

/// 单只股票的完整分析结果
#[derive(Debug, Clone, Serialize)]
pub struct StockAnalysis {
    pub symbol: String,
    pub period: Period,
    pub company: CompanyInfo,
    pub metrics: MetricsTable,
    pub charts: StockCharts,
}

/// 公司信息 + 指标（不含图表）
#[derive(Debug, Clone, Serialize)]
pub struct StockMetrics {
    pub symbol: String,
    pub period: Period,
    pub company: CompanyInfo,
    pub metrics: MetricsTable,
}

/// 股票查询参数
#[derive(Debug, Deserialize, Default)]
pub struct StockQuery {
    /// 时间范围代码（默认 1y）
    pub period: Option<String>,
    /// 是否保留两位小数
    #[serde(default)]
    pub round: bool,
}

impl StockQuery {
    pub fn period(&self) -> Result<Period, String> {
        match self.period.as_deref() {
            None | Some("") => Ok(Period::default()),
            Some(code) => code.parse(),
        }
    }
}

/// 看板分析请求体
#[derive(Debug, Deserialize)]
pub struct DashboardRequest {
    /// 股票代码（大小写不敏感）
    #[serde(default)]
    pub symbol: String,
    /// 时间范围代码（默认 1y）
    pub period: Option<String>,
    /// 显式触发分析（即使与上次相同也重新获取）
    #[serde(default)]
    pub analyze: bool,
}

impl DashboardRequest {
    pub fn period(&self) -> Result<Period, String> {
        match self.period.as_deref() {
            None | Some("") => Ok(Period::default()),
            Some(code) => code.parse(),
        }
    }
}

/// 热门股票分组（欢迎页展示）
#[derive(Debug, Clone, Serialize)]
pub struct PopularGroup {
    pub sector: &'static str,
    pub symbols: Vec<PopularSymbol>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PopularSymbol {
    pub symbol: &'static str,
    pub name: &'static str,
}

/// 规范化股票代码：去除空白并转为大写
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}
