//! In-memory [`PharmacyStore`] for tests and database-less runs.
//!
//! Records live in a `Vec` behind a `tokio::sync::RwLock`; insertion order is
//! the snapshot order. Every write takes the write lock for its whole
//! check-then-mutate sequence, so the phone/email uniqueness checks cannot race.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::pharmacy::{ListFilter, NewPharmacy, Page, Pharmacy, PharmacyPatch};

use super::{PharmacyStore, StoreError};

#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: RwLock<Vec<Pharmacy>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing set of records, kept in the given order.
    #[must_use]
    pub fn with_records(records: Vec<Pharmacy>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }
}

fn ensure_unique(
    records: &[Pharmacy],
    candidate: &Pharmacy,
) -> Result<(), StoreError> {
    for other in records.iter().filter(|p| p.id != candidate.id) {
        if other.phone_number == candidate.phone_number {
            return Err(StoreError::DuplicateKey {
                field: "phone number",
            });
        }
        if candidate.email.is_some() && other.email == candidate.email {
            return Err(StoreError::DuplicateKey { field: "email" });
        }
    }
    Ok(())
}

fn to_u64(n: usize) -> u64 {
    u64::try_from(n).unwrap_or(u64::MAX)
}

#[async_trait]
impl PharmacyStore for InMemoryStore {
    async fn list_all(&self) -> Result<Vec<Pharmacy>, StoreError> {
        Ok(self.records.read().await.clone())
    }

    async fn list(&self, filter: &ListFilter) -> Result<Page<Pharmacy>, StoreError> {
        let records = self.records.read().await;
        let matching: Vec<&Pharmacy> = records.iter().filter(|p| filter.matches(p)).collect();
        let total = to_u64(matching.len());
        let offset = usize::try_from(filter.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(filter.limit).unwrap_or(usize::MAX);
        let items = matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();
        Ok(Page { items, total })
    }

    async fn get(&self, id: &str) -> Result<Pharmacy, StoreError> {
        self.records
            .read()
            .await
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn create(&self, new: NewPharmacy) -> Result<Pharmacy, StoreError> {
        let pharmacy = new.into_pharmacy(Uuid::new_v4().to_string(), Utc::now());
        let mut records = self.records.write().await;
        ensure_unique(&records, &pharmacy)?;
        records.push(pharmacy.clone());
        Ok(pharmacy)
    }

    async fn update(&self, id: &str, patch: PharmacyPatch) -> Result<Pharmacy, StoreError> {
        let mut records = self.records.write().await;
        let index = records
            .iter()
            .position(|p| p.id == id)
            .ok_or(StoreError::NotFound)?;

        // Patch a copy so a uniqueness failure leaves the stored record untouched.
        let mut updated = records[index].clone();
        patch.apply_to(&mut updated, Utc::now());
        ensure_unique(&records, &updated)?;
        records[index] = updated.clone();
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        let index = records
            .iter()
            .position(|p| p.id == id)
            .ok_or(StoreError::NotFound)?;
        records.remove(index);
        Ok(())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_pharmacy(name: &str, phone: &str, email: Option<&str>) -> NewPharmacy {
        NewPharmacy {
            name: name.to_string(),
            contact_person: None,
            phone_number: phone.to_string(),
            email: email.map(ToOwned::to_owned),
            address: "Kigali".to_string(),
            latitude: -1.95,
            longitude: 30.06,
            opening_hours: None,
            services: vec!["A".to_string(), "B".to_string()],
            is_registered_by_pharmacy: false,
        }
    }

    #[tokio::test]
    async fn create_then_get_round_trips_services() {
        let store = InMemoryStore::new();
        let created = store
            .create(new_pharmacy("One", "+1", None))
            .await
            .expect("create");
        let fetched = store.get(&created.id).await.expect("get");
        assert_eq!(fetched, created);
        assert_eq!(fetched.services, vec!["A".to_string(), "B".to_string()]);
    }

    #[tokio::test]
    async fn duplicate_phone_is_rejected() {
        let store = InMemoryStore::new();
        store
            .create(new_pharmacy("One", "+1", None))
            .await
            .expect("create");
        let err = store
            .create(new_pharmacy("Two", "+1", None))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { field: "phone number" }));
        assert_eq!(store.list_all().await.expect("list").len(), 1);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_but_missing_emails_do_not_collide() {
        let store = InMemoryStore::new();
        store
            .create(new_pharmacy("One", "+1", Some("a@x.rw")))
            .await
            .expect("create");
        store
            .create(new_pharmacy("Two", "+2", None))
            .await
            .expect("create");
        store
            .create(new_pharmacy("Three", "+3", None))
            .await
            .expect("two records without email");
        let err = store
            .create(new_pharmacy("Four", "+4", Some("a@x.rw")))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { field: "email" }));
    }

    #[tokio::test]
    async fn failed_update_leaves_record_unchanged() {
        let store = InMemoryStore::new();
        let one = store
            .create(new_pharmacy("One", "+1", None))
            .await
            .expect("create");
        let two = store
            .create(new_pharmacy("Two", "+2", None))
            .await
            .expect("create");

        let err = store
            .update(
                &two.id,
                PharmacyPatch {
                    name: Some("Renamed".to_string()),
                    phone_number: Some(one.phone_number.clone()),
                    ..PharmacyPatch::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { .. }));
        assert_eq!(store.get(&two.id).await.expect("get"), two);
    }

    #[tokio::test]
    async fn update_can_keep_its_own_phone_number() {
        let store = InMemoryStore::new();
        let one = store
            .create(new_pharmacy("One", "+1", Some("one@x.rw")))
            .await
            .expect("create");
        let updated = store
            .update(
                &one.id,
                PharmacyPatch {
                    phone_number: Some("+1".to_string()),
                    email: Some(Some("one@x.rw".to_string())),
                    ..PharmacyPatch::default()
                },
            )
            .await
            .expect("update");
        assert!(updated.updated_at >= one.updated_at);
    }

    #[tokio::test]
    async fn update_and_delete_unknown_id_are_not_found() {
        let store = InMemoryStore::new();
        assert!(matches!(
            store.update("missing", PharmacyPatch::default()).await,
            Err(StoreError::NotFound)
        ));
        assert!(matches!(
            store.delete("missing").await,
            Err(StoreError::NotFound)
        ));
        assert!(matches!(store.get("missing").await, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn list_filters_and_paginates_in_insertion_order() {
        let store = InMemoryStore::new();
        for (i, name) in ["Alpha Pharma", "Beta", "Gamma Pharma", "Delta Pharma"]
            .iter()
            .enumerate()
        {
            store
                .create(new_pharmacy(name, &format!("+{i}"), None))
                .await
                .expect("create");
        }

        let page = store
            .list(&ListFilter::new(Some("pharma".to_string()), 2, 1))
            .await
            .expect("list");
        assert_eq!(page.total, 3);
        let names: Vec<&str> = page.items.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Gamma Pharma", "Delta Pharma"]);
    }

    #[tokio::test]
    async fn delete_removes_record() {
        let store = InMemoryStore::new();
        let one = store
            .create(new_pharmacy("One", "+1", None))
            .await
            .expect("create");
        store.delete(&one.id).await.expect("delete");
        assert!(store.list_all().await.expect("list").is_empty());
    }
}
