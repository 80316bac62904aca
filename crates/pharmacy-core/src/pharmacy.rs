//! Pharmacy records and the request-scoped shapes built around them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored pharmacy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pharmacy {
    pub id: String,
    pub name: String,
    pub contact_person: Option<String>,
    pub phone_number: String,
    pub email: Option<String>,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub opening_hours: Option<String>,
    pub services: Vec<String>,
    pub is_registered_by_pharmacy: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A pharmacy annotated with its distance from a query point.
///
/// Serializes flat: every [`Pharmacy`] field plus `distance_km`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedPharmacy {
    #[serde(flatten)]
    pub pharmacy: Pharmacy,
    pub distance_km: f64,
}

/// Validated input for registering a pharmacy.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPharmacy {
    pub name: String,
    pub contact_person: Option<String>,
    pub phone_number: String,
    pub email: Option<String>,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub opening_hours: Option<String>,
    pub services: Vec<String>,
    pub is_registered_by_pharmacy: bool,
}

impl NewPharmacy {
    /// Materialize a full record with the given id and creation time.
    #[must_use]
    pub fn into_pharmacy(self, id: String, now: DateTime<Utc>) -> Pharmacy {
        Pharmacy {
            id,
            name: self.name,
            contact_person: self.contact_person,
            phone_number: self.phone_number,
            email: self.email,
            address: self.address,
            latitude: self.latitude,
            longitude: self.longitude,
            opening_hours: self.opening_hours,
            services: self.services,
            is_registered_by_pharmacy: self.is_registered_by_pharmacy,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Validated partial update.
///
/// `None` leaves a field untouched. For nullable fields `Some(None)` clears the
/// value. `services` is replaced wholesale when present.
// Option<Option<T>> is intentional: it separates "not sent" from "sent as null".
#[allow(clippy::option_option)]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PharmacyPatch {
    pub name: Option<String>,
    pub contact_person: Option<Option<String>>,
    pub phone_number: Option<String>,
    pub email: Option<Option<String>>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub opening_hours: Option<Option<String>>,
    pub services: Option<Vec<String>>,
    pub is_registered_by_pharmacy: Option<bool>,
}

impl PharmacyPatch {
    /// Overlay this patch onto `pharmacy` and stamp `updated_at`.
    pub fn apply_to(self, pharmacy: &mut Pharmacy, now: DateTime<Utc>) {
        if let Some(name) = self.name {
            pharmacy.name = name;
        }
        if let Some(contact_person) = self.contact_person {
            pharmacy.contact_person = contact_person;
        }
        if let Some(phone_number) = self.phone_number {
            pharmacy.phone_number = phone_number;
        }
        if let Some(email) = self.email {
            pharmacy.email = email;
        }
        if let Some(address) = self.address {
            pharmacy.address = address;
        }
        if let Some(latitude) = self.latitude {
            pharmacy.latitude = latitude;
        }
        if let Some(longitude) = self.longitude {
            pharmacy.longitude = longitude;
        }
        if let Some(opening_hours) = self.opening_hours {
            pharmacy.opening_hours = opening_hours;
        }
        if let Some(services) = self.services {
            pharmacy.services = services;
        }
        if let Some(flag) = self.is_registered_by_pharmacy {
            pharmacy.is_registered_by_pharmacy = flag;
        }
        pharmacy.updated_at = now;
    }
}

/// Listing filter: optional name substring plus offset pagination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListFilter {
    pub search: Option<String>,
    pub limit: u32,
    pub offset: u32,
}

impl ListFilter {
    /// Blank search strings are treated as no search.
    #[must_use]
    pub fn new(search: Option<String>, limit: u32, offset: u32) -> Self {
        let search = search
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty());
        Self {
            search,
            limit,
            offset,
        }
    }

    /// Case-insensitive substring match on the pharmacy name.
    #[must_use]
    pub fn matches(&self, pharmacy: &Pharmacy) -> bool {
        self.search.as_ref().is_none_or(|needle| {
            pharmacy
                .name
                .to_lowercase()
                .contains(&needle.to_lowercase())
        })
    }
}

/// One page of results plus the total number of matches.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}
