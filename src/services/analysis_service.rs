//! 股票分析服务
//!
//! 一次请求 → 计算指标 → 构建图表，组装为完整的分析结果

use crate::error::Result;
use crate::models::{
    normalize_symbol, HistoryRow, Period, PopularGroup, PopularSymbol, PriceSeries, StockAnalysis,
    StockCharts, StockMetrics, TickerMetadata,
};

use super::charts::{moving_average_chart, price_chart, volume_chart};
use super::export::history_rows;
use super::metrics::{company_info, key_metrics};
use super::stock::StockDataProvider;

/// 获取数据并生成完整分析（公司信息、指标表、三张图表）
pub async fn analyze(
    provider: &dyn StockDataProvider,
    symbol: &str,
    period: Period,
) -> Result<StockAnalysis> {
    let symbol = normalize_symbol(symbol);
    let (metadata, series) = provider.fetch(&symbol, period).await?;
    Ok(build_analysis(symbol, period, &metadata, &series))
}

/// 由已获取的数据生成分析结果，三张图表共用同一份序列
pub fn build_analysis(
    symbol: String,
    period: Period,
    metadata: &TickerMetadata,
    series: &PriceSeries,
) -> StockAnalysis {
    let charts = StockCharts {
        price: price_chart(series, &symbol),
        volume: volume_chart(series, &symbol),
        moving_averages: moving_average_chart(series, &symbol),
    };

    StockAnalysis {
        company: company_info(metadata),
        metrics: key_metrics(metadata),
        charts,
        symbol,
        period,
    }
}

/// 公司信息 + 指标表
pub async fn get_metrics(
    provider: &dyn StockDataProvider,
    symbol: &str,
    period: Period,
) -> Result<StockMetrics> {
    let symbol = normalize_symbol(symbol);
    let (metadata, _) = provider.fetch(&symbol, period).await?;

    Ok(StockMetrics {
        company: company_info(&metadata),
        metrics: key_metrics(&metadata),
        symbol,
        period,
    })
}

/// 原始历史数据（含均线）
pub async fn get_history(
    provider: &dyn StockDataProvider,
    symbol: &str,
    period: Period,
    round: bool,
) -> Result<Vec<HistoryRow>> {
    let (_, series) = provider.fetch(&normalize_symbol(symbol), period).await?;
    Ok(history_rows(&series, round))
}

/// 原始K线序列
pub async fn get_series(
    provider: &dyn StockDataProvider,
    symbol: &str,
    period: Period,
) -> Result<PriceSeries> {
    let (_, series) = provider.fetch(&normalize_symbol(symbol), period).await?;
    Ok(series)
}

/// 热门股票（欢迎页）
pub fn popular_symbols() -> Vec<PopularGroup> {
    let group = |sector: &'static str, symbols: [(&'static str, &'static str); 4]| PopularGroup {
        sector,
        symbols: symbols
            .into_iter()
            .map(|(symbol, name)| PopularSymbol { symbol, name })
            .collect(),
    };

    vec![
        group(
            "Technology",
            [
                ("AAPL", "Apple"),
                ("GOOGL", "Alphabet"),
                ("MSFT", "Microsoft"),
                ("TSLA", "Tesla"),
            ],
        ),
        group(
            "Finance",
            [
                ("JPM", "JPMorgan"),
                ("BAC", "Bank of America"),
                ("WFC", "Wells Fargo"),
                ("GS", "Goldman Sachs"),
            ],
        ),
        group(
            "Healthcare",
            [
                ("JNJ", "Johnson & Johnson"),
                ("PFE", "Pfizer"),
                ("UNH", "UnitedHealth"),
                ("ABBV", "AbbVie"),
            ],
        ),
        group(
            "Consumer",
            [
                ("AMZN", "Amazon"),
                ("WMT", "Walmart"),
                ("KO", "Coca-Cola"),
                ("PG", "Procter & Gamble"),
            ],
        ),
    ]
}
