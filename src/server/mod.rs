//! 只读图片 feed 的 HTTP 服务
pub mod error;
pub mod images;
pub mod pagination;

use std::any::Any;
use std::fmt::Display;
use std::sync::Arc;

use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use sea_orm::DatabaseConnection;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;

use crate::config::{RunMode, ServerConfig};

pub use error::{ApiError, ErrorBody};
pub use pagination::PageParams;

/// 请求共享状态
#[derive(Clone)]
pub struct AppState {
    db: Option<Arc<DatabaseConnection>>,
    run_mode: RunMode,
}

impl AppState {
    pub fn new(db: DatabaseConnection, run_mode: RunMode) -> Self {
        Self {
            db: Some(Arc::new(db)),
            run_mode,
        }
    }

    /// 没有可用数据库的状态，所有数据接口返回 503
    pub fn without_store(run_mode: RunMode) -> Self {
        Self { db: None, run_mode }
    }

    pub fn run_mode(&self) -> RunMode {
        self.run_mode
    }

    pub(crate) fn conn(&self) -> Result<&DatabaseConnection, ApiError> {
        self.db.as_deref().ok_or_else(|| {
            tracing::error!("Request rejected: database connection not established");
            ApiError::StoreUnavailable {
                details: self.detail("Database pool not initialized"),
            }
        })
    }

    /// 记录错误并生成 500 响应
    pub(crate) fn internal_error(&self, message: &'static str, error: &dyn Display) -> ApiError {
        tracing::error!(error = %error, "{}", message);
        ApiError::Internal {
            message,
            details: self.detail(error),
        }
    }

    fn detail(&self, detail: impl ToString) -> Option<String> {
        self.run_mode
            .exposes_details()
            .then(|| detail.to_string())
    }
}

pub fn router(state: AppState) -> Router {
    with_middleware(routes(), state)
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/test-db", get(images::test_db))
        .route("/api/images", get(images::list_images))
        .route("/api/images/:id", get(images::get_image))
        .fallback(not_found)
}

fn with_middleware(routes: Router<AppState>, state: AppState) -> Router {
    let run_mode = state.run_mode;
    routes
        .layer(CatchPanicLayer::custom(move |panic: Box<dyn Any + Send + 'static>| {
            panic_response(run_mode, panic)
        }))
        .with_state(state)
}

async fn not_found() -> ApiError {
    ApiError::NotFound("Not found")
}

/// handler panic 时的兜底 500
fn panic_response(run_mode: RunMode, panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    tracing::error!(error = %detail, "Unhandled error while serving request");
    ApiError::Internal {
        message: "Something went wrong on the server",
        details: run_mode.exposes_details().then_some(detail),
    }
    .into_response()
}

/// 在已绑定的 listener 上提供服务
pub async fn serve(listener: TcpListener, state: AppState) -> anyhow::Result<()> {
    axum::serve(listener, router(state)).await?;
    Ok(())
}

/// 按配置绑定端口并启动服务
pub async fn run(config: &ServerConfig, db: DatabaseConnection) -> anyhow::Result<()> {
    let listener = TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!("Server running at http://localhost:{}", config.port);

    serve(listener, AppState::new(db, config.run_mode)).await
}
