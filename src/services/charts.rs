//! 图表构建
//!
//! 由同一份K线序列生成 K线图、成交量图和均线图，不重复请求数据

use crate::models::{
    Axis, ChartFigure, Layout, Legend, Line, Marker, PriceSeries, RangeSlider, Title, Trace,
};

use super::indicators::{MA_LONG_WINDOW, MA_SHORT_WINDOW};

/// K线图（蜡烛图），隐藏底部区间滑块
pub fn price_chart(series: &PriceSeries, symbol: &str) -> ChartFigure {
    let trace = Trace::Candlestick {
        name: symbol.to_string(),
        x: series.dates(),
        open: series.opens(),
        high: series.highs(),
        low: series.lows(),
        close: series.closes(),
    };

    ChartFigure {
        data: vec![trace],
        layout: Layout {
            title: Title::new(format!("{} Stock Price", symbol)),
            xaxis: Axis {
                title: Title::new("Date"),
                rangeslider: Some(RangeSlider { visible: false }),
            },
            yaxis: Axis::titled("Price ($)"),
            height: 600,
            showlegend: false,
            legend: None,
        },
    }
}

/// 成交量柱状图
pub fn volume_chart(series: &PriceSeries, symbol: &str) -> ChartFigure {
    let trace = Trace::Bar {
        name: "Volume".to_string(),
        x: series.dates(),
        y: series.volumes(),
        marker: Marker { color: "lightblue" },
    };

    ChartFigure {
        data: vec![trace],
        layout: Layout {
            title: Title::new(format!("{} Trading Volume", symbol)),
            xaxis: Axis::titled("Date"),
            yaxis: Axis::titled("Volume"),
            height: 400,
            showlegend: false,
            legend: None,
        },
    }
}

/// 收盘价 + 20 日 / 50 日均线
pub fn moving_average_chart(series: &PriceSeries, symbol: &str) -> ChartFigure {
    let dates = series.dates();
    let line = |name: &str, y: Vec<Option<f64>>, color: &'static str| Trace::Scatter {
        name: name.to_string(),
        mode: "lines",
        x: dates.clone(),
        y,
        line: Line { color },
    };

    let close: Vec<Option<f64>> = series.closes().into_iter().map(Some).collect();

    ChartFigure {
        data: vec![
            line("Close Price", close, "blue"),
            line("20-day MA", series.moving_average(MA_SHORT_WINDOW), "orange"),
            line("50-day MA", series.moving_average(MA_LONG_WINDOW), "red"),
        ],
        layout: Layout {
            title: Title::new(format!("{} Price with Moving Averages", symbol)),
            xaxis: Axis::titled("Date"),
            yaxis: Axis::titled("Price ($)"),
            height: 500,
            showlegend: true,
            legend: Some(Legend { x: 0.0, y: 1.0 }),
        },
    }
}
