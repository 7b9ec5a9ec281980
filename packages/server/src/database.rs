use std::time::Duration;

use common::retry::calculate_backoff;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use tracing::{info, warn};

use crate::config::DatabaseConfig;

const MAX_RETRY_DELAY_MS: u64 = 30_000;

/// Connect with retries, then sync the schema of every registered entity.
pub async fn init_db(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let db = connect_with_retry(config).await?;
    db.get_schema_registry("catalog_server::entity::*")
        .sync(&db)
        .await?;

    Ok(db)
}

async fn connect_with_retry(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut attempt: u8 = 0;

    loop {
        attempt += 1;
        match Database::connect(connect_options(config)).await {
            Ok(db) => {
                info!(attempt, "Connected to database");
                return Ok(db);
            }
            Err(e) if attempt < config.connect_retries.max(1) => {
                let delay = calculate_backoff(attempt, config.retry_delay_ms, MAX_RETRY_DELAY_MS);
                warn!(
                    attempt,
                    max_attempts = config.connect_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Database connection failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

fn connect_options(config: &DatabaseConfig) -> ConnectOptions {
    let mut opt = ConnectOptions::new(config.url.clone());

    opt.max_connections(config.max_connections)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(300))
        .sqlx_logging(false);

    opt
}
