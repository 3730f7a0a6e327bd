//! 看板会话状态机
//!
//! 状态：Idle → Fetching → Rendered | Errored。
//! 是否重新获取数据只取决于（上次成功渲染的请求，本次请求，是否显式触发）

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::AnalysisError;
use crate::models::{normalize_symbol, Period, PopularGroup, StockAnalysis};

use super::analysis_service::{analyze, popular_symbols};
use super::stock::StockDataProvider;

/// 一次分析请求（股票代码 + 时间范围）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub symbol: String,
    pub period: Period,
}

impl AnalysisRequest {
    pub fn new(symbol: &str, period: Period) -> Self {
        Self {
            symbol: normalize_symbol(symbol),
            period,
        }
    }
}

/// 是否需要重新获取数据
///
/// 代码为空时不获取；否则显式触发、首次请求或请求与上次成功渲染的不同时获取
pub fn should_fetch(
    last_rendered: Option<&AnalysisRequest>,
    current: &AnalysisRequest,
    explicit: bool,
) -> bool {
    if current.symbol.is_empty() {
        return false;
    }
    explicit || last_rendered != Some(current)
}

/// 看板状态
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DashboardState {
    Idle,
    Fetching {
        request: AnalysisRequest,
    },
    Rendered {
        analysis: Box<StockAnalysis>,
    },
    Errored {
        request: AnalysisRequest,
        error: String,
        hint: &'static str,
    },
}

/// 看板视图；空闲时附带热门股票
#[derive(Debug, Serialize)]
pub struct DashboardView<'a> {
    #[serde(flatten)]
    pub state: &'a DashboardState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub popular: Option<Vec<PopularGroup>>,
}

/// 看板会话
#[derive(Debug)]
pub struct DashboardSession {
    state: DashboardState,
    /// 上次成功渲染的请求及其结果
    rendered: Option<(AnalysisRequest, Box<StockAnalysis>)>,
}

impl Default for DashboardSession {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardSession {
    pub fn new() -> Self {
        Self {
            state: DashboardState::Idle,
            rendered: None,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    #[cfg(test)]
    pub fn last_rendered(&self) -> Option<&AnalysisRequest> {
        self.rendered.as_ref().map(|(request, _)| request)
    }

    pub fn view(&self) -> DashboardView<'_> {
        DashboardView {
            state: &self.state,
            popular: matches!(self.state, DashboardState::Idle).then(popular_symbols),
        }
    }

    /// 回到空闲状态
    pub fn reset(&mut self) {
        self.state = DashboardState::Idle;
        self.rendered = None;
    }

    /// 判断是否需要获取，需要时进入 Fetching
    ///
    /// 不需要获取时恢复上次渲染的结果
    pub fn begin(&mut self, request: &AnalysisRequest, explicit: bool) -> bool {
        let last = self.rendered.as_ref().map(|(last, _)| last);
        if should_fetch(last, request, explicit) {
            self.state = DashboardState::Fetching {
                request: request.clone(),
            };
            return true;
        }

        if let Some((_, analysis)) = &self.rendered {
            self.state = DashboardState::Rendered {
                analysis: analysis.clone(),
            };
        }
        false
    }

    /// 获取结束：成功进入 Rendered 并记录请求，失败进入 Errored
    ///
    /// 只有仍在等待该请求时才生效，已被后续请求取代的结果直接丢弃
    pub fn complete(
        &mut self,
        request: AnalysisRequest,
        outcome: Result<StockAnalysis, AnalysisError>,
    ) -> bool {
        let pending = matches!(
            &self.state,
            DashboardState::Fetching { request: current } if *current == request
        );
        if !pending {
            log::debug!("{} ({}) 的结果已过期，丢弃", request.symbol, request.period);
            return false;
        }

        self.state = match outcome {
            Ok(analysis) => {
                let analysis = Box::new(analysis);
                self.rendered = Some((request, analysis.clone()));
                DashboardState::Rendered { analysis }
            }
            Err(e) => DashboardState::Errored {
                request,
                hint: e.hint(),
                error: e.to_string(),
            },
        };
        true
    }
}

/// 提交一次请求，按需获取数据并完成状态迁移
///
/// 获取期间不持有会话锁，其他请求可以看到 Fetching 状态
pub async fn submit(
    session: &Mutex<DashboardSession>,
    provider: &dyn StockDataProvider,
    request: AnalysisRequest,
    explicit: bool,
) {
    {
        let mut session = session.lock().await;
        if request.symbol.is_empty() {
            session.reset();
            return;
        }
        if !session.begin(&request, explicit) {
            log::debug!("{} ({}) 已渲染，跳过获取", request.symbol, request.period);
            return;
        }
    }

    log::info!("看板获取 {} ({})", request.symbol, request.period);
    let outcome = analyze(provider, &request.symbol, request.period).await;
    if let Err(e) = &outcome {
        log::warn!("看板获取 {} 失败: {}", request.symbol, e);
    }
    session.lock().await.complete(request, outcome);
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use tokio::sync::Notify;

    use super::*;
    use crate::models::{PriceSeries, TickerMetadata};
    use crate::services::stock::mock::MockProvider;

    fn request(symbol: &str, period: Period) -> AnalysisRequest {
        AnalysisRequest::new(symbol, period)
    }

    fn new_session() -> Mutex<DashboardSession> {
        Mutex::new(DashboardSession::new())
    }

    fn is_rendered(state: &DashboardState, symbol: &str) -> bool {
        matches!(state, DashboardState::Rendered { analysis } if analysis.symbol == symbol)
    }

    /// 收到放行通知后才返回数据
    struct GatedProvider {
        inner: MockProvider,
        release: Notify,
    }

    #[async_trait]
    impl StockDataProvider for GatedProvider {
        async fn fetch(
            &self,
            symbol: &str,
            period: Period,
        ) -> crate::error::Result<(TickerMetadata, PriceSeries)> {
            self.release.notified().await;
            self.inner.fetch(symbol, period).await
        }
    }

    #[test]
    fn test_should_fetch() {
        let aapl = request("AAPL", Period::OneYear);

        assert!(should_fetch(None, &aapl, false));
        assert!(!should_fetch(Some(&aapl), &aapl, false));
        assert!(should_fetch(Some(&aapl), &aapl, true));
        assert!(should_fetch(
            Some(&aapl),
            &request("AAPL", Period::FiveYears),
            false
        ));
        assert!(should_fetch(Some(&aapl), &request("MSFT", Period::OneYear), false));
        assert!(!should_fetch(None, &request("  ", Period::OneYear), true));
    }

    #[test]
    fn test_request_is_normalized() {
        assert_eq!(request(" aapl", Period::OneYear), request("AAPL", Period::OneYear));
    }

    #[tokio::test]
    async fn test_same_request_is_not_refetched() {
        let provider = MockProvider::new();
        let session = new_session();

        submit(&session, &provider, request("AAPL", Period::OneYear), false).await;
        assert!(is_rendered(session.lock().await.state(), "AAPL"));
        assert_eq!(provider.calls(), 1);

        submit(&session, &provider, request("aapl", Period::OneYear), false).await;
        assert_eq!(provider.calls(), 1);
        assert!(is_rendered(session.lock().await.state(), "AAPL"));

        submit(&session, &provider, request("AAPL", Period::OneYear), true).await;
        assert_eq!(provider.calls(), 2);

        submit(&session, &provider, request("AAPL", Period::TwoYears), false).await;
        assert_eq!(provider.calls(), 3);
        assert_eq!(
            session.lock().await.last_rendered(),
            Some(&request("AAPL", Period::TwoYears))
        );
    }

    #[tokio::test]
    async fn test_error_keeps_last_rendered_and_retries() {
        let provider = MockProvider::new();
        let session = new_session();

        submit(&session, &provider, request("AAPL", Period::OneYear), false).await;
        submit(&session, &provider, request("ZZZZZZ", Period::OneYear), false).await;

        {
            let session = session.lock().await;
            match session.state() {
                DashboardState::Errored { request, error, hint } => {
                    assert_eq!(request.symbol, "ZZZZZZ");
                    assert!(error.starts_with("Error fetching data: "));
                    assert!(hint.contains("valid ticker symbol"));
                }
                other => panic!("unexpected state: {:?}", other),
            }
            assert_eq!(session.last_rendered(), Some(&request("AAPL", Period::OneYear)));
        }

        // 失败的请求再次提交会重新获取
        submit(&session, &provider, request("ZZZZZZ", Period::OneYear), false).await;
        assert_eq!(provider.calls(), 3);

        submit(&session, &provider, request("EMPTY", Period::OneYear), false).await;
        match session.lock().await.state() {
            DashboardState::Errored { error, .. } => {
                assert_eq!(error, "No data found for this symbol")
            }
            other => panic!("unexpected state: {:?}", other),
        };
    }

    #[tokio::test]
    async fn test_returning_to_rendered_request_after_error() {
        let provider = MockProvider::new();
        let session = new_session();

        submit(&session, &provider, request("AAPL", Period::OneYear), false).await;
        submit(&session, &provider, request("ZZZZZZ", Period::OneYear), false).await;
        submit(&session, &provider, request("AAPL", Period::OneYear), false).await;

        assert_eq!(provider.calls(), 2);
        let session = session.lock().await;
        assert!(is_rendered(session.state(), "AAPL"));
        let view = serde_json::to_value(session.view()).unwrap();
        assert_eq!(view["state"], "rendered");
        assert_eq!(view["analysis"]["symbol"], "AAPL");
    }

    #[tokio::test]
    async fn test_empty_symbol_returns_to_idle() {
        let provider = MockProvider::new();
        let session = new_session();

        submit(&session, &provider, request("AAPL", Period::OneYear), false).await;
        submit(&session, &provider, request("", Period::OneYear), true).await;

        let session = session.lock().await;
        assert!(matches!(session.state(), DashboardState::Idle));
        assert_eq!(session.last_rendered(), None);
        assert_eq!(provider.calls(), 1);

        let view = serde_json::to_value(session.view()).unwrap();
        assert_eq!(view["state"], "idle");
        assert_eq!(view["popular"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_begin_enters_fetching() {
        let mut session = DashboardSession::new();
        assert!(session.begin(&request("AAPL", Period::OneYear), false));
        assert!(matches!(session.state(), DashboardState::Fetching { .. }));

        let view = serde_json::to_value(session.view()).unwrap();
        assert_eq!(view["state"], "fetching");
        assert_eq!(view["request"]["symbol"], "AAPL");
        assert_eq!(view["request"]["period"], "1y");
        assert!(view.get("popular").is_none());
    }

    #[test]
    fn test_superseded_result_is_discarded() {
        let mut session = DashboardSession::new();
        let aapl = request("AAPL", Period::OneYear);
        let msft = request("MSFT", Period::OneYear);

        assert!(session.begin(&aapl, false));
        assert!(session.begin(&msft, false));
        assert!(!session.complete(aapl, Err(AnalysisError::NoData)));

        match session.state() {
            DashboardState::Fetching { request } => assert_eq!(request.symbol, "MSFT"),
            other => panic!("unexpected state: {:?}", other),
        }
        assert_eq!(session.last_rendered(), None);
    }

    #[tokio::test]
    async fn test_fetching_is_visible_while_loading() {
        let provider = GatedProvider {
            inner: MockProvider::new(),
            release: Notify::new(),
        };
        let session = new_session();

        let load = submit(&session, &provider, request("AAPL", Period::OneYear), false);
        let observe = async {
            loop {
                {
                    let session = session.lock().await;
                    if let DashboardState::Fetching { request } = session.state() {
                        assert_eq!(request.symbol, "AAPL");
                        break;
                    }
                }
                tokio::task::yield_now().await;
            }
            provider.release.notify_one();
        };
        tokio::join!(load, observe);

        assert!(is_rendered(session.lock().await.state(), "AAPL"));
        assert_eq!(provider.inner.calls(), 1);
    }
}
