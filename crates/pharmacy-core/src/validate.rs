//! Raw request input and the rules that turn it into store commands.
//!
//! `CreatePharmacyInput` and `UpdatePharmacyInput` mirror the JSON bodies the
//! HTTP layer accepts. The update body is an allow-list: unknown keys fail
//! deserialization instead of being silently ignored.

use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::pharmacy::{NewPharmacy, PharmacyPatch};

const NAME_MAX_LEN: usize = 255;
const PHONE_MAX_LEN: usize = 50;
const TEXT_MAX_LEN: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("{field} {reason}")]
    InvalidField { field: &'static str, reason: String },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ValidationError {
    ValidationError::InvalidField {
        field,
        reason: reason.into(),
    }
}

/// Distinguishes an absent key (`None`) from an explicit `null` (`Some(None)`).
#[allow(clippy::option_option)]
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatePharmacyInput {
    pub name: Option<String>,
    pub contact_person: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub opening_hours: Option<String>,
    pub services: Option<Vec<String>>,
    pub is_registered_by_pharmacy: Option<bool>,
}

// Option<Option<T>> is intentional: outer None = "not in request" (keep current),
// Some(None) = "explicitly null", Some(Some(v)) = "set to value".
#[allow(clippy::option_option)]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdatePharmacyInput {
    #[serde(default, deserialize_with = "double_option")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub contact_person: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub phone_number: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub latitude: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub longitude: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub opening_hours: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub services: Option<Option<Vec<String>>>,
    #[serde(default, deserialize_with = "double_option")]
    pub is_registered_by_pharmacy: Option<Option<bool>>,
}

impl CreatePharmacyInput {
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingField`] for the first absent required
    /// field and [`ValidationError::InvalidField`] for malformed values.
    pub fn validate(self) -> Result<NewPharmacy, ValidationError> {
        let name = required_text("name", self.name, NAME_MAX_LEN)?;
        let phone_number = required_text("phone_number", self.phone_number, PHONE_MAX_LEN)?;
        let address = required_text("address", self.address, TEXT_MAX_LEN)?;
        let latitude = latitude(self.latitude.ok_or(ValidationError::MissingField("latitude"))?)?;
        let longitude =
            longitude(self.longitude.ok_or(ValidationError::MissingField("longitude"))?)?;

        Ok(NewPharmacy {
            name,
            contact_person: optional_text("contact_person", self.contact_person)?,
            phone_number,
            email: email(self.email)?,
            address,
            latitude,
            longitude,
            opening_hours: optional_text("opening_hours", self.opening_hours)?,
            services: services(self.services.unwrap_or_default()),
            is_registered_by_pharmacy: self.is_registered_by_pharmacy.unwrap_or(false),
        })
    }
}

impl UpdatePharmacyInput {
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidField`] when a field is malformed or a
    /// non-nullable field is sent as `null`.
    pub fn validate(self) -> Result<PharmacyPatch, ValidationError> {
        Ok(PharmacyPatch {
            name: self
                .name
                .map(|v| required_text("name", v, NAME_MAX_LEN))
                .transpose()?,
            contact_person: self
                .contact_person
                .map(|v| optional_text("contact_person", v))
                .transpose()?,
            phone_number: self
                .phone_number
                .map(|v| required_text("phone_number", v, PHONE_MAX_LEN))
                .transpose()?,
            email: self.email.map(email).transpose()?,
            address: self
                .address
                .map(|v| required_text("address", v, TEXT_MAX_LEN))
                .transpose()?,
            latitude: self
                .latitude
                .map(|v| not_null("latitude", v).and_then(latitude))
                .transpose()?,
            longitude: self
                .longitude
                .map(|v| not_null("longitude", v).and_then(longitude))
                .transpose()?,
            opening_hours: self
                .opening_hours
                .map(|v| optional_text("opening_hours", v))
                .transpose()?,
            services: self
                .services
                .map(|v| not_null("services", v).map(services))
                .transpose()?,
            is_registered_by_pharmacy: self
                .is_registered_by_pharmacy
                .map(|v| not_null("is_registered_by_pharmacy", v))
                .transpose()?,
        })
    }
}

fn not_null<T>(field: &'static str, value: Option<T>) -> Result<T, ValidationError> {
    value.ok_or_else(|| invalid(field, "must not be null"))
}

fn required_text(
    field: &'static str,
    value: Option<String>,
    max_len: usize,
) -> Result<String, ValidationError> {
    let value = value.ok_or(ValidationError::MissingField(field))?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    if trimmed.chars().count() > max_len {
        return Err(invalid(field, format!("must be at most {max_len} characters")));
    }
    Ok(trimmed.to_owned())
}

/// Blank strings collapse to `None`.
fn optional_text(
    field: &'static str,
    value: Option<String>,
) -> Result<Option<String>, ValidationError> {
    let Some(trimmed) = value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    else {
        return Ok(None);
    };
    if trimmed.chars().count() > TEXT_MAX_LEN {
        return Err(invalid(
            field,
            format!("must be at most {TEXT_MAX_LEN} characters"),
        ));
    }
    Ok(Some(trimmed.to_owned()))
}

fn email(value: Option<String>) -> Result<Option<String>, ValidationError> {
    let email = optional_text("email", value)?;
    if let Some(ref e) = email {
        let valid = e
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
        if !valid {
            return Err(invalid("email", format!("must be an email address, got '{e}'")));
        }
    }
    Ok(email)
}

fn latitude(value: f64) -> Result<f64, ValidationError> {
    if (-90.0..=90.0).contains(&value) {
        Ok(value)
    } else {
        Err(invalid("latitude", format!("must be between -90 and 90, got {value}")))
    }
}

fn longitude(value: f64) -> Result<f64, ValidationError> {
    if (-180.0..=180.0).contains(&value) {
        Ok(value)
    } else {
        Err(invalid(
            "longitude",
            format!("must be between -180 and 180, got {value}"),
        ))
    }
}

/// Trim entries and drop blanks, keeping order.
fn services(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
#[path = "validate_test.rs"]
mod tests;
