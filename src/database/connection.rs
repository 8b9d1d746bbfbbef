use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::time::Duration;

/// 连接池上限
pub const POOL_SIZE: u32 = 10;

pub async fn connect(db_url: &str, max_connections: u32) -> anyhow::Result<DatabaseConnection> {
    let mut opt = ConnectOptions::new(db_url);
    opt.max_connections(max_connections)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(300))
        .sqlx_logging(false);

    let conn = Database::connect(opt).await?;

    tracing::info!("Database connected: {}", super::mask_credentials(db_url));

    Ok(conn)
}

/// 执行 `SELECT 1` 验证连接可用
pub async fn ping(conn: &DatabaseConnection) -> anyhow::Result<()> {
    let backend = conn.get_database_backend();
    conn.query_one(Statement::from_string(backend, "SELECT 1"))
        .await?
        .ok_or_else(|| anyhow::anyhow!("SELECT 1 returned no rows"))?;
    Ok(())
}
