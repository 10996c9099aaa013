use crate::config::AppConfig;
use crate::services::status_store::SqlStatusStore;
use sea_orm::{ConnectOptions, Database};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Connect the status store's pool once for the whole process and make sure
/// the status table exists.
pub async fn setup_status_store(config: &AppConfig) -> anyhow::Result<Arc<SqlStatusStore>> {
    info!(
        "📂 Status store: {} (table: {})",
        config.database_url, config.status_table
    );

    let mut opt = ConnectOptions::new(&config.database_url);
    opt.max_connections(20)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(30))
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Debug);

    let db = Database::connect(opt).await?;
    info!("✅ Database connected successfully");

    let store = SqlStatusStore::new(db, config.status_table.clone());
    store.ensure_table().await?;

    Ok(Arc::new(store))
}
