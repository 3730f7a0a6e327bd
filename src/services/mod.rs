//! 业务逻辑服务模块
//!
//! 封装数据获取、指标计算、图表构建和导出逻辑

pub mod analysis_service; // 分析流程编排
pub mod charts;           // 图表构建
pub mod export;           // CSV 导出
pub mod format;           // 数值格式化
pub mod indicators;       // 均线等技术指标
pub mod metrics;          // 关键指标
pub mod session;          // 看板状态机
pub mod stock;            // 股票数据源
