//! Storage abstraction for pharmacy records.
//!
//! The [`PharmacyStore`] trait is the only thing the HTTP layer and the
//! proximity ranker know about persistence. It is passed explicitly (router
//! state, CLI wiring) so backends can be swapped: Postgres in `pharmacy-db`,
//! [`memory::InMemoryStore`] here.

pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::pharmacy::{ListFilter, NewPharmacy, Page, Pharmacy, PharmacyPatch};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("pharmacy not found")]
    NotFound,

    /// A store-wide unique field (`phone_number`, `email`) collided.
    #[error("a pharmacy with this {field} already exists")]
    DuplicateKey { field: &'static str },

    #[error("store backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    pub fn backend(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Box::new(error))
    }
}

/// Pharmacy persistence.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`list_all`](PharmacyStore::list_all) | Full snapshot, used by the proximity ranker |
/// | [`list`](PharmacyStore::list) | Name search plus offset pagination |
/// | [`get`](PharmacyStore::get) | One record by id |
/// | [`create`](PharmacyStore::create) | Insert, enforcing unique phone/email |
/// | [`update`](PharmacyStore::update) | Apply a [`PharmacyPatch`] |
/// | [`delete`](PharmacyStore::delete) | Remove by id |
/// | [`health_check`](PharmacyStore::health_check) | Backend liveness |
#[async_trait]
pub trait PharmacyStore: Send + Sync {
    async fn list_all(&self) -> Result<Vec<Pharmacy>, StoreError>;

    async fn list(&self, filter: &ListFilter) -> Result<Page<Pharmacy>, StoreError>;

    async fn get(&self, id: &str) -> Result<Pharmacy, StoreError>;

    async fn create(&self, new: NewPharmacy) -> Result<Pharmacy, StoreError>;

    async fn update(&self, id: &str, patch: PharmacyPatch) -> Result<Pharmacy, StoreError>;

    async fn delete(&self, id: &str) -> Result<(), StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}
