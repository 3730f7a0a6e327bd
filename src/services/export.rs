//! 历史数据导出
//!
//! 将K线序列（含 MA20 / MA50）导出为 CSV 文本，供下载

use anyhow::Result;

use crate::models::{HistoryRow, PriceRecord, PriceSeries};

use super::indicators::{MA_LONG_WINDOW, MA_SHORT_WINDOW};

/// CSV 下载的 Content-Type
pub const CSV_CONTENT_TYPE: &str = "text/csv";

/// 下载文件名，如 `AAPL_historical_data.csv`
pub fn export_filename(symbol: &str) -> String {
    format!("{}_historical_data.csv", symbol)
}

/// 附带均线的历史数据行；`round` 为 true 时所有浮点列保留两位小数
pub fn history_rows(series: &PriceSeries, round: bool) -> Vec<HistoryRow> {
    let ma20 = series.moving_average(MA_SHORT_WINDOW);
    let ma50 = series.moving_average(MA_LONG_WINDOW);
    let r = |v: f64| if round { round2(v) } else { v };

    series
        .records()
        .iter()
        .zip(ma20)
        .zip(ma50)
        .map(|((record, ma20), ma50)| HistoryRow {
            record: PriceRecord {
                date: record.date,
                open: r(record.open),
                high: r(record.high),
                low: r(record.low),
                close: r(record.close),
                volume: record.volume,
                dividends: r(record.dividends),
                stock_splits: r(record.stock_splits),
            },
            ma20: ma20.map(r),
            ma50: ma50.map(r),
        })
        .collect()
}

/// 导出 CSV 文本；未定义的均线单元格留空
pub fn to_csv(series: &PriceSeries, round: bool) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record([
        "Date",
        "Open",
        "High",
        "Low",
        "Close",
        "Volume",
        "Dividends",
        "Stock Splits",
        "MA20",
        "MA50",
    ])?;

    for row in history_rows(series, round) {
        let record = &row.record;
        writer.write_record([
            record.date.to_string(),
            record.open.to_string(),
            record.high.to_string(),
            record.low.to_string(),
            record.close.to_string(),
            record.volume.to_string(),
            record.dividends.to_string(),
            record.stock_splits.to_string(),
            optional_cell(row.ma20),
            optional_cell(row.ma50),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

fn optional_cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
