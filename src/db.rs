use std::time::Duration;

use anyhow::Context;
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool,
};
use tokio::time::timeout;
use tracing::{info, warn};

use crate::config::DbConfig;

/// Build the pool without connecting; connections are opened on first use so
/// the service can start while the database is still unreachable.
pub fn init_pool(cfg: &DbConfig) -> anyhow::Result<PgPool> {
    let options: PgConnectOptions = cfg.url.parse().context("parse DATABASE_URL")?;
    let pool = PgPoolOptions::new()
        .max_connections(cfg.max_connections)
        .acquire_timeout(cfg.connect_timeout())
        .connect_lazy_with(options);
    Ok(pool)
}

/// `SELECT 1` bounded by `limit`.
pub async fn ping(db: &PgPool, limit: Duration) -> bool {
    let probe = sqlx::query("SELECT 1").execute(db);
    matches!(timeout(limit, probe).await, Ok(Ok(_)))
}

/// Ping once and apply migrations. Failures are logged, not fatal.
pub async fn bootstrap(db: &PgPool, cfg: &DbConfig) {
    if !ping(db, cfg.connect_timeout()).await {
        warn!("database unreachable; starting without connectivity");
        return;
    }
    info!("database ping successful");

    match timeout(cfg.migrate_timeout(), sqlx::migrate!("./migrations").run(db)).await {
        Ok(Ok(())) => info!("migrations applied"),
        Ok(Err(e)) => warn!(error = %e, "migration failed; continuing"),
        Err(_) => warn!("migration timed out; continuing"),
    }
}
