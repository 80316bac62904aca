//! Storage codec for the `services` list.
//!
//! Services are persisted as a JSON array in a single text column. Decoding
//! follows a fixed fallback rule: a missing, blank or malformed payload decodes
//! to an empty list and is never an error, because rows written by older
//! clients may hold anything in that column.

/// Serialize a services list for storage.
#[must_use]
pub fn encode(services: &[String]) -> String {
    serde_json::to_string(services).unwrap_or_else(|_| "[]".to_string())
}

/// Deserialize a stored services payload, falling back to an empty list.
#[must_use]
pub fn decode(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Vec::new();
    };

    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(services) => services,
        Err(e) => {
            tracing::warn!(error = %e, "stored services payload is not a JSON string array; using empty list");
            Vec::new()
        }
    }
}
