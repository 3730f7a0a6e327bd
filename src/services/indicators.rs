//! 技术指标计算

use crate::models::PriceSeries;

/// 20 日均线窗口
pub const MA_SHORT_WINDOW: usize = 20;
/// 50 日均线窗口
pub const MA_LONG_WINDOW: usize = 50;

/// 计算尾随简单移动平均
///
/// 第 i 个值为 `values[i + 1 - window ..= i]` 的算术平均；
/// 前 `window - 1` 个位置数据不足，返回 `None`（图表中不绘制）
pub fn trailing_sma(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut averages = vec![None; values.len()];

    if window == 0 || values.len() < window {
        return averages;
    }

    for i in (window - 1)..values.len() {
        let start = i + 1 - window;
        let sum: f64 = values[start..=i].iter().sum();
        averages[i] = Some(sum / window as f64);
    }

    averages
}

impl PriceSeries {
    /// 收盘价的尾随均线
    pub fn moving_average(&self, window: usize) -> Vec<Option<f64>> {
        trailing_sma(&self.closes(), window)
    }
}
