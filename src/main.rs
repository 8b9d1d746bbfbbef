use gallery_feed::config::ServerConfig;
use gallery_feed::{database, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    gallery_feed::init_logging();

    let config = ServerConfig::from_env()?;

    let db = match database::init_database(&config.database_url, config.bootstrap_schema).await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!(
                error = %e,
                uri = %database::mask_credentials(&config.database_url),
                "Database initialization error"
            );
            tracing::error!("Failed to initialize database. Server not started.");
            std::process::exit(1);
        }
    };

    server::run(&config, db).await
}
