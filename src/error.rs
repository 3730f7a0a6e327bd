use thiserror::Error as ThisError;

/// 提示用户检查股票代码
pub const SYMBOL_HINT: &str = "Please check the stock symbol and try again. Make sure it's a valid ticker symbol (e.g., AAPL, GOOGL, TSLA).";

/// 数据获取错误
///
/// 只有两类：数据源返回空序列，或请求本身失败（原始错误信息透传）
#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("No data found for this symbol")]
    NoData,

    #[error("Error fetching data: {0}")]
    FetchFailure(String),
}

impl AnalysisError {
    pub fn hint(&self) -> &'static str {
        SYMBOL_HINT
    }
}

impl From<anyhow::Error> for AnalysisError {
    fn from(err: anyhow::Error) -> Self {
        AnalysisError::FetchFailure(format!("{:#}", err))
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
