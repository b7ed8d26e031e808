//! 运行配置
//!
//! 后端地址优先级：localStorage `cinema_api_url` > 编译期 `CINEMA_API_URL` > 默认值。
//! 日志级别取编译期 `CINEMA_LOG_LEVEL`，默认 info。

use cinema_shared::{ApiConfig, KeyValueStore};
use tracing::Level;

use crate::web::BrowserStorage;

pub const DEFAULT_API_URL: &str = "http://localhost:8080/Cinema-1.0-SNAPSHOT/api";
pub const STORAGE_API_URL_KEY: &str = "cinema_api_url";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api_url: String,
    pub log_level: Level,
}

impl AppConfig {
    pub fn load() -> Self {
        Self::resolve(
            BrowserStorage.get(STORAGE_API_URL_KEY),
            option_env!("CINEMA_API_URL"),
            option_env!("CINEMA_LOG_LEVEL"),
        )
    }

    fn resolve(stored_url: Option<String>, build_url: Option<&str>, level: Option<&str>) -> Self {
        let api_url = stored_url
            .filter(|url| !url.trim().is_empty())
            .or_else(|| build_url.map(str::to_string))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let log_level = level
            .and_then(|level| level.trim().parse().ok())
            .unwrap_or(Level::INFO);
        Self { api_url, log_level }
    }

    pub fn api_config(&self) -> ApiConfig {
        ApiConfig::new(self.api_url.as_str())
    }
}
