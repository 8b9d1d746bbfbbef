use std::env;
use std::time::Duration;

/// 配置错误
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    Missing(&'static str),
    #[error("environment variable {name} has invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// 运行模式，决定错误响应是否携带内部细节
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    Development,
    #[default]
    Production,
}

impl RunMode {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Self::Development,
            _ => Self::Production,
        }
    }

    pub fn exposes_details(&self) -> bool {
        matches!(self, Self::Development)
    }
}

/// 服务端配置
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub port: u16,
    pub run_mode: RunMode,
    /// 启动时补建 generated_images 表
    pub bootstrap_schema: bool,
}

impl ServerConfig {
    pub const DEFAULT_PORT: u16 = 3000;

    /// 从环境变量（以及 `.env` 文件）加载
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let port = match env::var("PORT") {
            Ok(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid { name: "PORT", value })?,
            Err(_) => Self::DEFAULT_PORT,
        };

        let run_mode = env::var("APP_ENV")
            .map(|v| RunMode::parse(&v))
            .unwrap_or_default();

        let bootstrap_schema = env::var("DATABASE_BOOTSTRAP")
            .map(|v| parse_flag(&v))
            .unwrap_or(false);

        Ok(Self {
            database_url,
            port,
            run_mode,
            bootstrap_schema,
        })
    }
}

/// 客户端 feed 配置
#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub api_base_url: String,
    pub page_size: u32,
    pub cache_max_age: Duration,
    pub cleanup_interval: Duration,
    pub throttle_window: Duration,
    pub timeout_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3000/api".to_string(),
            page_size: 12,
            cache_max_age: Duration::from_secs(5 * 60),
            cleanup_interval: Duration::from_secs(60),
            throttle_window: Duration::from_millis(500),
            timeout_secs: 30,
        }
    }
}

impl FeedConfig {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        let mut config = Self::default();
        if let Ok(url) = env::var("GALLERY_API_BASE_URL") {
            let url = url.trim().trim_end_matches('/');
            if !url.is_empty() {
                config.api_base_url = url.to_string();
            }
        }
        config
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_mode_parse() {
        assert_eq!(RunMode::parse("development"), RunMode::Development);
        assert_eq!(RunMode::parse(" Dev "), RunMode::Development);
        assert_eq!(RunMode::parse("production"), RunMode::Production);
        assert_eq!(RunMode::parse(""), RunMode::Production);
        assert!(!RunMode::default().exposes_details());
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag("1"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag("nope"));
    }

    #[test]
    fn test_feed_config_defaults() {
        let config = FeedConfig::default();
        assert_eq!(config.page_size, 12);
        assert_eq!(config.cache_max_age, Duration::from_secs(300));
        assert_eq!(config.throttle_window, Duration::from_millis(500));
    }
}
