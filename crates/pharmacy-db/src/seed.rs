//! Demo data for local development.

use pharmacy_core::{services, NewPharmacy};
use rand::Rng;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// Base locations the demo pharmacies are scattered around: (area, lat, lon).
const BASES: &[(&str, f64, f64)] = &[
    ("Kigali Central", -1.9536, 29.8739),
    ("Nyarugenge", -1.95, 29.87),
    ("Gasabo", -1.96, 29.88),
    ("Kicukiro", -1.98, 30.05),
    ("Huye", -2.7566, 29.25),
    ("Gisenyi", -1.7, 29.26),
    ("Butare", -2.595, 29.74),
    ("Musanze", -1.5, 29.63),
    ("Kigali Airport", -1.9686, 30.1395),
    ("Kigali Heights", -1.944, 30.062),
];

/// Generate `count` demo pharmacies jittered around [`BASES`].
///
/// Phone numbers are random, so a caller inserting these must tolerate the
/// occasional collision.
pub fn sample_pharmacies<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<NewPharmacy> {
    (1..=count)
        .map(|i| {
            let (area, lat, lon) = BASES[rng.random_range(0..BASES.len())];
            let services = if rng.random_bool(0.4) {
                vec!["Prescriptions", "OTC", "Vaccinations"]
            } else {
                vec!["Prescriptions", "OTC"]
            };
            NewPharmacy {
                name: format!("Sample Pharmacy {i}"),
                contact_person: None,
                phone_number: format!("+2507{}", rng.random_range(10_000_000..100_000_000)),
                email: None,
                address: format!("{area} - Block {}", rng.random_range(1..=50)),
                latitude: lat + rng.random_range(-0.02..0.02),
                longitude: lon + rng.random_range(-0.03..0.03),
                opening_hours: Some("8:00 AM - 9:00 PM".to_string()),
                services: services.into_iter().map(str::to_owned).collect(),
                is_registered_by_pharmacy: true,
            }
        })
        .collect()
}

/// Top the table up to `target` pharmacies with demo data.
///
/// Does nothing when the table already holds `target` or more rows. All
/// inserts run in one transaction; rows whose phone number collides are
/// skipped. Returns the number of rows inserted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any database operation fails.
pub async fn seed_pharmacies(pool: &PgPool, target: usize) -> Result<usize, DbError> {
    let existing = usize::try_from(crate::count_pharmacies(pool).await?).unwrap_or(0);
    if existing >= target {
        tracing::info!(existing, target, "pharmacies already seeded");
        return Ok(0);
    }

    let batch = sample_pharmacies(target - existing, &mut rand::rng());
    let mut tx = pool.begin().await?;
    let mut inserted = 0usize;

    for new in &batch {
        let result = sqlx::query(
            "INSERT INTO pharmacies \
               (id, name, contact_person, phone_number, email, address, latitude, longitude, \
                opening_hours, services, is_registered_by_pharmacy) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             ON CONFLICT DO NOTHING",
        )
        .bind(Uuid::new_v4().to_string())
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
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() > 0 {
            inserted += 1;
        }
    }

    tx.commit().await?;
    tracing::info!(inserted, target, "seeded demo pharmacies");
    Ok(inserted)
}
