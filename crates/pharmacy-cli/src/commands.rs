//! Command handlers for the CLI.
//!
//! Every command talks to Postgres through a pool built from the loaded
//! config. Results are printed to stdout, logs go to stderr.

use pharmacy_core::{AppConfig, ListFilter, NearestQuery, PharmacyStore};
use pharmacy_db::{PgPharmacyStore, PoolConfig};
use sqlx::PgPool;

pub(crate) async fn connect(config: &AppConfig) -> anyhow::Result<PgPool> {
    let database_url = config
        .database_url
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set to use pharmacy-cli"))?;
    let pool = pharmacy_db::connect_pool(database_url, PoolConfig::from_app_config(config)).await?;
    Ok(pool)
}

pub(crate) async fn run_db_ping(pool: &PgPool) -> anyhow::Result<()> {
    pharmacy_db::health_check(pool).await?;
    println!("database ok");
    Ok(())
}

pub(crate) async fn run_db_migrate(pool: &PgPool) -> anyhow::Result<()> {
    let applied = pharmacy_db::run_migrations(pool).await?;
    println!("applied {applied} migration(s)");
    Ok(())
}

/// Insert demo pharmacies until the table holds `count` rows.
pub(crate) async fn run_db_seed(pool: &PgPool, count: usize) -> anyhow::Result<()> {
    let inserted = pharmacy_db::seed_pharmacies(pool, count).await?;
    let total = pharmacy_db::count_pharmacies(pool).await?;
    println!("inserted {inserted} pharmacies, {total} total");
    Ok(())
}

pub(crate) async fn run_list(
    pool: PgPool,
    search: Option<String>,
    limit: u32,
    offset: u32,
) -> anyhow::Result<()> {
    let store = PgPharmacyStore::new(pool);
    let page = store.list(&ListFilter::new(search, limit, offset)).await?;
    tracing::info!(
        returned = page.items.len(),
        total = page.total,
        offset,
        "listed pharmacies"
    );
    println!("{}", serde_json::to_string_pretty(&page.items)?);
    Ok(())
}

/// Rank every stored pharmacy against the query point.
///
/// # Errors
///
/// Fails before connecting to the database when the coordinates, radius or
/// limit are invalid.
pub(crate) async fn run_nearest(
    config: &AppConfig,
    latitude: f64,
    longitude: f64,
    radius_km: f64,
    limit: usize,
) -> anyhow::Result<()> {
    let query = NearestQuery::new(Some(latitude), Some(longitude), radius_km, limit)?;
    let store = PgPharmacyStore::new(connect(config).await?);
    let ranked = query.rank(store.list_all().await?);
    println!("{}", serde_json::to_string_pretty(&ranked)?);
    Ok(())
}
