pub mod config;
pub mod database;
pub mod feed;
pub mod http;
pub mod page;
pub mod server;

use tracing_subscriber::EnvFilter;

/// 初始化日志（只初始化一次），`RUST_LOG` 未设置时默认 info
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init();
}
