//! Postgres-backed [`PharmacyStore`].

use async_trait::async_trait;
use pharmacy_core::{ListFilter, NewPharmacy, Page, Pharmacy, PharmacyPatch, PharmacyStore, StoreError};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{pharmacies, DbError};

#[derive(Debug, Clone)]
pub struct PgPharmacyStore {
    pool: PgPool,
}

impl PgPharmacyStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Field name reported for a violated unique constraint.
fn duplicate_field(constraint: &str) -> &'static str {
    if constraint.contains("email") {
        "email"
    } else if constraint.contains("phone") {
        "phone number"
    } else {
        "phone number or email"
    }
}

fn map_db_error(error: DbError) -> StoreError {
    if let Some(constraint) = error.unique_violation() {
        return StoreError::DuplicateKey {
            field: duplicate_field(&constraint),
        };
    }
    StoreError::backend(error)
}

fn page_bound(value: u32) -> i64 {
    i64::from(value)
}

#[async_trait]
impl PharmacyStore for PgPharmacyStore {
    async fn list_all(&self) -> Result<Vec<Pharmacy>, StoreError> {
        let rows = pharmacies::list_all_pharmacies(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(rows.into_iter().map(Pharmacy::from).collect())
    }

    async fn list(&self, filter: &ListFilter) -> Result<Page<Pharmacy>, StoreError> {
        let (rows, total) = pharmacies::list_pharmacies(
            &self.pool,
            filter.search.as_deref(),
            page_bound(filter.limit),
            page_bound(filter.offset),
        )
        .await
        .map_err(map_db_error)?;

        Ok(Page {
            items: rows.into_iter().map(Pharmacy::from).collect(),
            total: u64::try_from(total).unwrap_or(0),
        })
    }

    async fn get(&self, id: &str) -> Result<Pharmacy, StoreError> {
        pharmacies::get_pharmacy(&self.pool, id)
            .await
            .map_err(map_db_error)?
            .map(Pharmacy::from)
            .ok_or(StoreError::NotFound)
    }

    async fn create(&self, new: NewPharmacy) -> Result<Pharmacy, StoreError> {
        let id = Uuid::new_v4().to_string();
        let row = pharmacies::insert_pharmacy(&self.pool, &id, &new)
            .await
            .map_err(map_db_error)?;
        tracing::info!(pharmacy_id = %row.id, "pharmacy created");
        Ok(Pharmacy::from(row))
    }

    async fn update(&self, id: &str, patch: PharmacyPatch) -> Result<Pharmacy, StoreError> {
        let row = pharmacies::update_pharmacy(&self.pool, id, patch)
            .await
            .map_err(map_db_error)?
            .ok_or(StoreError::NotFound)?;
        tracing::info!(pharmacy_id = %id, "pharmacy updated");
        Ok(Pharmacy::from(row))
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let deleted = pharmacies::delete_pharmacy(&self.pool, id)
            .await
            .map_err(map_db_error)?;
        if deleted {
            tracing::info!(pharmacy_id = %id, "pharmacy deleted");
            Ok(())
        } else {
            Err(StoreError::NotFound)
        }
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        crate::health_check(&self.pool).await.map_err(map_db_error)
    }
}
