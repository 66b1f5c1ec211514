use std::sync::Arc;
use std::time::Duration;

use migration::{Migrator, MigratorTrait};
use settings::Database;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;
    let mut tasks = tokio::task::JoinSet::new();

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "kolo={level},server={level},ledger={level}",
            level = settings.app.level
        ))
        .init();

    if let Some(server) = settings.server {
        let reconciler_settings = settings.reconciler;
        tasks.spawn(async move {
            tracing::info!("Found server settings...");
            let db = match parse_database(&server.database).await {
                Ok(db) => db,
                Err(err) => {
                    tracing::error!("failed to initialize database: {err}");
                    return;
                }
            };

            let engine = match ledger::Engine::builder().database(db).build().await {
                Ok(engine) => Arc::new(engine),
                Err(err) => {
                    tracing::error!("failed to build ledger engine: {err}");
                    return;
                }
            };

            let interval = reconciler_settings
                .and_then(|reconciler| reconciler.interval_secs)
                .map(Duration::from_secs)
                .unwrap_or(ledger::DEFAULT_SWEEP_INTERVAL);
            let reconciler = Arc::new(ledger::Reconciler::new(Arc::clone(&engine), interval));
            reconciler.start().await;

            let bind = server.bind.unwrap_or_else(|| "127.0.0.1".to_string());
            let addr = format!("{}:{}", bind, server.port);
            let listener = match tokio::net::TcpListener::bind(addr).await {
                Ok(listener) => listener,
                Err(err) => {
                    tracing::error!("failed to bind server listener: {err}");
                    return;
                }
            };
            if let Err(err) = server::run_with_listener(engine, reconciler, listener).await {
                tracing::error!("server failed: {err}");
            }
        });
    }

    while tasks.join_next().await.is_some() {
        tasks.shutdown().await;
    }

    Ok(())
}

async fn parse_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
