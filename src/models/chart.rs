//! 图表数据模型
//!
//! 输出与 Plotly 兼容的 figure JSON（`{"data": [...], "layout": {...}}`），
//! 前端可直接交给 `Plotly.newPlot` 渲染

use chrono::NaiveDate;
use serde::Serialize;

/// 图表（traces + 布局）
#[derive(Debug, Clone, Serialize)]
pub struct ChartFigure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

/// 图表序列
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    /// K线（蜡烛图）
    Candlestick {
        name: String,
        x: Vec<NaiveDate>,
        open: Vec<f64>,
        high: Vec<f64>,
        low: Vec<f64>,
        close: Vec<f64>,
    },
    /// 柱状图
    Bar {
        name: String,
        x: Vec<NaiveDate>,
        y: Vec<u64>,
        marker: Marker,
    },
    /// 折线图；`None` 序列化为 null，该点不绘制
    Scatter {
        name: String,
        mode: &'static str,
        x: Vec<NaiveDate>,
        y: Vec<Option<f64>>,
        line: Line,
    },
}

#[cfg(test)]
impl Trace {
    pub fn name(&self) -> &str {
        match self {
            Trace::Candlestick { name, .. }
            | Trace::Bar { name, .. }
            | Trace::Scatter { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Marker {
    pub color: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Line {
    pub color: &'static str,
}

/// 图表布局
#[derive(Debug, Clone, Serialize)]
pub struct Layout {
    pub title: Title,
    pub xaxis: Axis,
    pub yaxis: Axis,
    pub height: u32,
    pub showlegend: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend: Option<Legend>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Title {
    pub text: String,
}

impl Title {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// 坐标轴
#[derive(Debug, Clone, Serialize)]
pub struct Axis {
    pub title: Title,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rangeslider: Option<RangeSlider>,
}

impl Axis {
    pub fn titled(text: &str) -> Self {
        Self {
            title: Title::new(text),
            rangeslider: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RangeSlider {
    pub visible: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Legend {
    pub x: f64,
    pub y: f64,
}
