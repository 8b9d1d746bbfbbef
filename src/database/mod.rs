pub mod connection;
pub mod entities;
pub mod migration;

use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::DatabaseConnection;

static CREDENTIALS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"//[^@/]*@").unwrap());

/// 连接数据库并验证可用性
///
/// `bootstrap` 为 true 时在缺失的情况下建表；生产库的表结构由外部维护。
pub async fn init_database(db_url: &str, bootstrap: bool) -> anyhow::Result<DatabaseConnection> {
    let conn = connection::connect(db_url, connection::POOL_SIZE).await?;

    connection::ping(&conn).await?;
    tracing::info!("Database query test successful");

    if bootstrap {
        migration::run_migrations(&conn).await?;
    }

    Ok(conn)
}

/// 隐藏连接串中的用户名和密码，用于日志输出
pub fn mask_credentials(db_url: &str) -> String {
    CREDENTIALS_RE.replace(db_url, "//****:****@").into_owned()
}
