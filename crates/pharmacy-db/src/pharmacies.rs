//! Database operations for the `pharmacies` table.

use chrono::{DateTime, Utc};
use pharmacy_core::{services, NewPharmacy, Pharmacy, PharmacyPatch};
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `pharmacies` table. `services` is the raw stored JSON text.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PharmacyRow {
    pub id: String,
    pub name: String,
    pub contact_person: Option<String>,
    pub phone_number: String,
    pub email: Option<String>,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub opening_hours: Option<String>,
    pub services: Option<String>,
    pub is_registered_by_pharmacy: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PharmacyRow> for Pharmacy {
    fn from(row: PharmacyRow) -> Self {
        Pharmacy {
            services: services::decode(row.services.as_deref()),
            id: row.id,
            name: row.name,
            contact_person: row.contact_person,
            phone_number: row.phone_number,
            email: row.email,
            address: row.address,
            latitude: row.latitude,
            longitude: row.longitude,
            opening_hours: row.opening_hours,
            is_registered_by_pharmacy: row.is_registered_by_pharmacy,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const COLUMNS: &str = "id, name, contact_person, phone_number, email, address, latitude, \
                       longitude, opening_hours, services, is_registered_by_pharmacy, \
                       created_at, updated_at";

/// Escape `%`, `_` and `\` so user input matches literally inside `ILIKE`.
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns every pharmacy, oldest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_all_pharmacies(pool: &PgPool) -> Result<Vec<PharmacyRow>, DbError> {
    let sql = format!("SELECT {COLUMNS} FROM pharmacies ORDER BY created_at, id");
    let rows = sqlx::query_as::<_, PharmacyRow>(&sql)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Returns one page of pharmacies whose name contains `search`
/// (case-insensitive), plus the total number of matches.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if either query fails.
pub async fn list_pharmacies(
    pool: &PgPool,
    search: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<(Vec<PharmacyRow>, i64), DbError> {
    let pattern = search.map(|s| format!("%{}%", escape_like(s)));

    let sql = format!(
        "SELECT {COLUMNS} FROM pharmacies \
         WHERE $1::text IS NULL OR name ILIKE $1 \
         ORDER BY created_at, id \
         LIMIT $2 OFFSET $3"
    );
    let rows = sqlx::query_as::<_, PharmacyRow>(&sql)
        .bind(pattern.as_deref())
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

    let total: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM pharmacies WHERE $1::text IS NULL OR name ILIKE $1",
    )
    .bind(pattern.as_deref())
    .fetch_one(pool)
    .await?;

    Ok((rows, total))
}

/// Total number of stored pharmacies.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_pharmacies(pool: &PgPool) -> Result<i64, DbError> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pharmacies")
        .fetch_one(pool)
        .await?;
    Ok(total)
}

/// Returns a single pharmacy by id, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_pharmacy(pool: &PgPool, id: &str) -> Result<Option<PharmacyRow>, DbError> {
    let sql = format!("SELECT {COLUMNS} FROM pharmacies WHERE id = $1");
    let row = sqlx::query_as::<_, PharmacyRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Inserts a pharmacy under `id` and returns the stored row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails, including unique constraint
/// violations on `phone_number` or `email`.
pub async fn insert_pharmacy(
    pool: &PgPool,
    id: &str,
    new: &NewPharmacy,
) -> Result<PharmacyRow, DbError> {
    let sql = format!(
        "INSERT INTO pharmacies \
           (id, name, contact_person, phone_number, email, address, latitude, longitude, \
            opening_hours, services, is_registered_by_pharmacy) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
         RETURNING {COLUMNS}"
    );
    let row = sqlx::query_as::<_, PharmacyRow>(&sql)
        .bind(id)
        .bind(&new.name)
        .bind(new.contact_person.as_deref())
        .bind(&new.phone_number)
        .bind(new.email.as_deref())
        .bind(&new.address)
        .bind(new.latitude)
        .bind(new.longitude)
        .bind(new.opening_hours.as_deref())
        .bind(services::encode(&new.services))
        .bind(new.is_registered_by_pharmacy)
        .fetch_one(pool)
        .await?;
    Ok(row)
}

/// Applies `patch` to the pharmacy with `id` and returns the updated row, or
/// `None` if no such pharmacy exists.
///
/// The row is locked with `SELECT … FOR UPDATE` and rewritten inside one
/// transaction; any error drops the transaction, rolling it back. A stored
/// `services` payload is only rewritten when the patch replaces it.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if a query fails, including unique constraint
/// violations.
pub async fn update_pharmacy(
    pool: &PgPool,
    id: &str,
    patch: PharmacyPatch,
) -> Result<Option<PharmacyRow>, DbError> {
    let mut tx = pool.begin().await?;

    let select = format!("SELECT {COLUMNS} FROM pharmacies WHERE id = $1 FOR UPDATE");
    let Some(current) = sqlx::query_as::<_, PharmacyRow>(&select)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
    else {
        return Ok(None);
    };

    let services_json = patch.services.as_deref().map(services::encode);
    let mut pharmacy = Pharmacy::from(current);
    patch.apply_to(&mut pharmacy, Utc::now());

    let update = format!(
        "UPDATE pharmacies SET \
           name = $2, contact_person = $3, phone_number = $4, email = $5, address = $6, \
           latitude = $7, longitude = $8, opening_hours = $9, \
           services = COALESCE($10, services), is_registered_by_pharmacy = $11, \
           updated_at = NOW() \
         WHERE id = $1 \
         RETURNING {COLUMNS}"
    );
    let row = sqlx::query_as::<_, PharmacyRow>(&update)
        .bind(id)
        .bind(&pharmacy.name)
        .bind(pharmacy.contact_person.as_deref())
        .bind(&pharmacy.phone_number)
        .bind(pharmacy.email.as_deref())
        .bind(&pharmacy.address)
        .bind(pharmacy.latitude)
        .bind(pharmacy.longitude)
        .bind(pharmacy.opening_hours.as_deref())
        .bind(services_json)
        .bind(pharmacy.is_registered_by_pharmacy)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(Some(row))
}

/// Deletes a pharmacy. Returns `false` if no row had that id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn delete_pharmacy(pool: &PgPool, id: &str) -> Result<bool, DbError> {
    let result = sqlx::query("DELETE FROM pharmacies WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_like_escapes_wildcards() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn row_converts_with_services_fallback() {
        let now = Utc::now();
        let row = PharmacyRow {
            id: "p-1".to_string(),
            name: "Row Pharmacy".to_string(),
            contact_person: None,
            phone_number: "+250700000000".to_string(),
            email: None,
            address: "Huye".to_string(),
            latitude: -2.5966,
            longitude: 29.7394,
            opening_hours: None,
            services: Some("not json".to_string()),
            is_registered_by_pharmacy: true,
            created_at: now,
            updated_at: now,
        };

        let pharmacy = Pharmacy::from(row.clone());
        assert!(pharmacy.services.is_empty());
        assert!(pharmacy.is_registered_by_pharmacy);

        let pharmacy = Pharmacy::from(PharmacyRow {
            services: Some(r#"["Prescriptions","OTC"]"#.to_string()),
            ..row
        });
        assert_eq!(pharmacy.services, vec!["Prescriptions", "OTC"]);
    }
}
