//! 配置模块
//!
//! 支持从 JSON 文件加载系统配置

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,
    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
    /// 工作线程数（0 表示使用 CPU 核心数）
    #[serde(default)]
    pub workers: usize,
}

/// API 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API Key（为空则不启用认证）
    #[serde(default)]
    pub api_key: String,
    /// 请求超时时间（秒）
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// 连接超时时间（秒）
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// 日志级别: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// 数据源配置（Yahoo Finance 接口地址）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// 日K线接口
    #[serde(default = "default_chart_url")]
    pub chart_url: String,
    /// 基本面 / 行情摘要接口
    #[serde(default = "default_quote_summary_url")]
    pub quote_summary_url: String,
    /// crumb 接口
    #[serde(default = "default_crumb_url")]
    pub crumb_url: String,
    /// 获取会话 cookie 的地址
    #[serde(default = "default_cookie_url")]
    pub cookie_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,
    /// API 配置
    #[serde(default)]
    pub api: ApiConfig,
    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
    /// 数据源配置
    #[serde(default)]
    pub provider: ProviderConfig,
}

// 默认值函数
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_timeout() -> u64 { 30 }
fn default_connect_timeout() -> u64 { 10 }
fn default_log_level() -> String { "info".to_string() }
fn default_chart_url() -> String { "https://query1.finance.yahoo.com/v8/finance/chart".to_string() }
fn default_quote_summary_url() -> String {
    "https://query2.finance.yahoo.com/v10/finance/quoteSummary".to_string()
}
fn default_crumb_url() -> String { "https://query1.finance.yahoo.com/v1/test/getcrumb".to_string() }
fn default_cookie_url() -> String { "https://fc.yahoo.com".to_string() }
fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: 0,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            chart_url: default_chart_url(),
            quote_summary_url: default_quote_summary_url(),
            crumb_url: default_crumb_url(),
            cookie_url: default_cookie_url(),
            user_agent: default_user_agent(),
        }
    }
}

impl AppConfig {
    /// 从 JSON 文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// 加载配置，优先从文件，失败则使用默认值；
    /// 环境变量 API_KEY 覆盖文件中的 api_key
    ///
    /// 此时日志系统尚未初始化，加载过程只能在返回后补记
    pub fn load() -> (Self, String) {
        let config_paths = ["config.json", "config/config.json"];
        let mut source = "默认配置".to_string();
        let mut config = Self::default();

        for path in config_paths {
            if Path::new(path).exists() {
                match Self::from_file(path) {
                    Ok(loaded) => {
                        config = loaded;
                        source = path.to_string();
                        break;
                    }
                    Err(e) => {
                        source = format!("默认配置（{} 加载失败: {}）", path, e);
                    }
                }
            }
        }

        if let Ok(key) = env::var("API_KEY") {
            config.api.api_key = key;
        }

        (config, source)
    }

    /// 获取服务器绑定地址
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// 是否启用 API Key 认证
    pub fn auth_enabled(&self) -> bool {
        !self.api.api_key.is_empty()
    }
}
