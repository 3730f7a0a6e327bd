//! 关键指标计算
//!
//! 从股票元数据生成涨跌额、涨跌幅、固定顺序的 20 行指标表以及公司信息。
//! 每个字段独立取值，任何字段缺失只影响对应的一行（显示 "N/A"）

use crate::models::{CompanyInfo, MetricRow, MetricsTable, TickerMetadata};

use super::format::{format_currency, format_number, NOT_AVAILABLE};

/// 指标表的行标签（顺序固定）
pub const METRIC_LABELS: [&str; 20] = [
    "Current Price",
    "Previous Close",
    "Price Change",
    "Price Change (%)",
    "Day Range",
    "52 Week Range",
    "Volume",
    "Average Volume",
    "Market Cap",
    "Enterprise Value",
    "P/E Ratio",
    "Forward P/E",
    "Price to Book",
    "Price to Sales",
    "Dividend Yield",
    "Beta",
    "EPS (TTM)",
    "Revenue (TTM)",
    "Profit Margin",
    "Operating Margin",
];

/// 涨跌额与涨跌幅
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceChange {
    pub current: Option<f64>,
    pub previous: Option<f64>,
    pub change: Option<f64>,
    pub change_percent: Option<f64>,
}

/// 计算涨跌
///
/// 当前价优先取 currentPrice，缺失时取 regularMarketPrice。
/// 当前价或昨收任一缺失，涨跌额和涨跌幅都为空；昨收为 0 时涨跌幅为空
pub fn price_change(meta: &TickerMetadata) -> PriceChange {
    let current = meta
        .number("currentPrice")
        .or_else(|| meta.number("regularMarketPrice"));
    let previous = meta.number("previousClose");

    let (change, change_percent) = match (current, previous) {
        (Some(current), Some(previous)) => {
            let change = current - previous;
            let percent = if previous != 0.0 {
                Some(change / previous * 100.0)
            } else {
                None
            };
            (Some(change), percent)
        }
        _ => (None, None),
    };

    PriceChange {
        current,
        previous,
        change,
        change_percent,
    }
}

/// 生成关键财务指标表
pub fn key_metrics(meta: &TickerMetadata) -> MetricsTable {
    let change = price_change(meta);

    let values = [
        dollars(change.current),
        dollars(change.previous),
        dollars(change.change),
        percent(change.change_percent),
        range(meta, "dayLow", "dayHigh"),
        range(meta, "fiftyTwoWeekLow", "fiftyTwoWeekHigh"),
        format_number(meta.number("volume")),
        format_number(meta.number("averageVolume")),
        format_currency(meta.number("marketCap")),
        format_currency(meta.number("enterpriseValue")),
        ratio(nonzero(meta, "trailingPE")),
        ratio(nonzero(meta, "forwardPE")),
        ratio(nonzero(meta, "priceToBook")),
        ratio(nonzero(meta, "priceToSalesTrailing12Months")),
        percent(nonzero(meta, "dividendYield").map(|v| v * 100.0)),
        ratio(nonzero(meta, "beta")),
        dollars(nonzero(meta, "trailingEps")),
        format_currency(meta.number("totalRevenue")),
        percent(nonzero(meta, "profitMargins").map(|v| v * 100.0)),
        percent(nonzero(meta, "operatingMargins").map(|v| v * 100.0)),
    ];

    MetricsTable::new(
        METRIC_LABELS
            .into_iter()
            .zip(values)
            .map(|(label, value)| MetricRow { label, value })
            .collect(),
    )
}

/// 公司基本信息
pub fn company_info(meta: &TickerMetadata) -> CompanyInfo {
    let text = |key: &str| meta.text(key).unwrap_or(NOT_AVAILABLE).to_string();

    CompanyInfo {
        name: text("longName"),
        sector: text("sector"),
        industry: text("industry"),
        country: text("country"),
        website: text("website"),
        employees: format_number(meta.number("fullTimeEmployees")),
        exchange: text("exchange"),
        currency: text("currency"),
        business_summary: meta.text("longBusinessSummary").map(str::to_string),
    }
}

/// 非零数值；0 与缺失同样视为不可用
fn nonzero(meta: &TickerMetadata, key: &str) -> Option<f64> {
    meta.number(key).filter(|v| *v != 0.0)
}

fn dollars(value: Option<f64>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |v| format!("${:.2}", v))
}

fn percent(value: Option<f64>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |v| format!("{:.2}%", v))
}

fn ratio(value: Option<f64>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |v| format!("{:.2}", v))
}

/// 区间只有上下界都可用时才展示
fn range(meta: &TickerMetadata, low_key: &str, high_key: &str) -> String {
    match (nonzero(meta, low_key), nonzero(meta, high_key)) {
        (Some(low), Some(high)) => format!("${:.2} - ${:.2}", low, high),
        _ => NOT_AVAILABLE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn meta(fields: Vec<(&str, Value)>) -> TickerMetadata {
        fields.into_iter().collect()
    }

    fn full_meta() -> TickerMetadata {
        meta(vec![
            ("longName", json!("Apple Inc.")),
            ("sector", json!("Technology")),
            ("industry", json!("Consumer Electronics")),
            ("country", json!("United States")),
            ("website", json!("https://www.apple.com")),
            ("fullTimeEmployees", json!(161000)),
            ("exchange", json!("NMS")),
            ("currency", json!("USD")),
            ("longBusinessSummary", json!("Apple Inc. designs smartphones.")),
            ("currentPrice", json!(150.0)),
            ("previousClose", json!(145.0)),
            ("dayLow", json!(148.5)),
            ("dayHigh", json!(151.25)),
            ("fiftyTwoWeekLow", json!(124.17)),
            ("fiftyTwoWeekHigh", json!(199.62)),
            ("volume", json!(45_300_000)),
            ("averageVolume", json!(58_120_000)),
            ("marketCap", json!(2_950_000_000_000.0)),
            ("enterpriseValue", json!(3_010_000_000_000.0)),
            ("trailingPE", json!(29.456)),
            ("forwardPE", json!(26.1)),
            ("priceToBook", json!(45.2)),
            ("priceToSalesTrailing12Months", json!(7.77)),
            ("dividendYield", json!(0.0044)),
            ("beta", json!(1.286)),
            ("trailingEps", json!(6.43)),
            ("totalRevenue", json!(383_290_000_000.0)),
            ("profitMargins", json!(0.2531)),
            ("operatingMargins", json!(0.3012)),
        ])
    }

    #[test]
    fn test_price_change() {
        let change = price_change(&meta(vec![
            ("currentPrice", json!(150.0)),
            ("previousClose", json!(145.0)),
        ]));
        assert_eq!(change.change, Some(5.0));
        let pct = change.change_percent.unwrap();
        assert!((pct - 3.448275862).abs() < 1e-6);
        assert_eq!(percent(change.change_percent), "3.45%");
    }

    #[test]
    fn test_price_change_falls_back_to_market_price() {
        let change = price_change(&meta(vec![
            ("regularMarketPrice", json!(140.0)),
            ("previousClose", json!(145.0)),
        ]));
        assert_eq!(change.current, Some(140.0));
        assert_eq!(change.change, Some(-5.0));
    }

    #[test]
    fn test_price_change_requires_both_prices() {
        let table = key_metrics(&meta(vec![("currentPrice", json!(150.0))]));
        assert_eq!(table.value("Current Price"), Some("$150.00"));
        assert_eq!(table.value("Previous Close"), Some("N/A"));
        assert_eq!(table.value("Price Change"), Some("N/A"));
        assert_eq!(table.value("Price Change (%)"), Some("N/A"));
    }

    #[test]
    fn test_zero_previous_close_has_no_percentage() {
        let change = price_change(&meta(vec![
            ("currentPrice", json!(1.0)),
            ("previousClose", json!(0.0)),
        ]));
        assert_eq!(change.change, Some(1.0));
        assert_eq!(change.change_percent, None);
    }

    #[test]
    fn test_full_table_order_and_values() {
        let table = key_metrics(&full_meta());
        let labels: Vec<&str> = table.rows().iter().map(|r| r.label).collect();
        assert_eq!(labels, METRIC_LABELS.to_vec());

        let values: Vec<&str> = table.rows().iter().map(|r| r.value.as_str()).collect();
        assert_eq!(
            values,
            vec![
                "$150.00",
                "$145.00",
                "$5.00",
                "3.45%",
                "$148.50 - $151.25",
                "$124.17 - $199.62",
                "45.30M",
                "58.12M",
                "$2.95T",
                "$3.01T",
                "29.46",
                "26.10",
                "45.20",
                "7.77",
                "0.44%",
                "1.29",
                "$6.43",
                "$383.29B",
                "25.31%",
                "30.12%",
            ]
        );
    }

    #[test]
    fn test_empty_metadata_degrades_every_row() {
        let table = key_metrics(&TickerMetadata::new());
        assert_eq!(table.len(), 20);
        assert!(table.rows().iter().all(|r| r.value == "N/A"));
    }

    #[test]
    fn test_day_range_needs_both_bounds() {
        let table = key_metrics(&meta(vec![("dayLow", json!(148.5))]));
        assert_eq!(table.value("Day Range"), Some("N/A"));

        let table = key_metrics(&meta(vec![("dayHigh", json!(151.0))]));
        assert_eq!(table.value("Day Range"), Some("N/A"));

        let table = key_metrics(&meta(vec![
            ("fiftyTwoWeekLow", json!(100.0)),
            ("fiftyTwoWeekHigh", Value::Null),
        ]));
        assert_eq!(table.value("52 Week Range"), Some("N/A"));
    }

    #[test]
    fn test_missing_field_does_not_block_others() {
        let mut fields = full_meta();
        fields.insert("marketCap", Value::Null);
        let table = key_metrics(&fields);
        assert_eq!(table.value("Market Cap"), Some("N/A"));
        assert_eq!(table.value("Enterprise Value"), Some("$3.01T"));
        assert_eq!(table.value("Volume"), Some("45.30M"));
    }

    #[test]
    fn test_zero_ratio_is_not_available() {
        let table = key_metrics(&meta(vec![
            ("dividendYield", json!(0)),
            ("volume", json!(0)),
        ]));
        assert_eq!(table.value("Dividend Yield"), Some("N/A"));
        assert_eq!(table.value("Volume"), Some("0.00"));
    }

    #[test]
    fn test_split_columns() {
        let table = key_metrics(&full_meta());
        let (left, right) = table.split_columns();
        assert_eq!(left.len(), 10);
        assert_eq!(right.len(), 10);
        assert_eq!(left[0].label, "Current Price");
        assert_eq!(right[0].label, "P/E Ratio");

        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json["left"][0]["value"], "$150.00");
        assert_eq!(json["right"][9]["label"], "Operating Margin");
    }

    #[test]
    fn test_company_info() {
        let info = company_info(&full_meta());
        assert_eq!(info.name, "Apple Inc.");
        assert_eq!(info.employees, "161.00K");
        assert_eq!(info.exchange, "NMS");
        assert!(info.business_summary.is_some());

        let info = company_info(&TickerMetadata::new());
        assert_eq!(info.name, "N/A");
        assert_eq!(info.employees, "N/A");
        assert_eq!(info.business_summary, None);
    }
}
