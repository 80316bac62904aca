//! Offline unit tests for pharmacy-db pool configuration and row types.
//! These tests do not require a live database connection.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use pharmacy_core::{AppConfig, Environment, Pharmacy, StoreBackend};
use pharmacy_db::{PharmacyRow, PoolConfig};

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let app_config = AppConfig {
        database_url: Some("postgres://example".to_string()),
        env: Environment::Test,
        store_backend: StoreBackend::Postgres,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 4000),
        log_level: "info".to_string(),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
    };

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

/// Compile-time smoke test: confirm that [`PharmacyRow`] has all expected
/// fields with the correct types and converts into the domain type.
#[test]
fn pharmacy_row_has_expected_fields() {
    use chrono::Utc;

    let now = Utc::now();
    let row = PharmacyRow {
        id: "0b7c6c1e-5d0e-4b8e-9d43-3f1f0a1c2b3d".to_string(),
        name: "Pharmacie Conseil".to_string(),
        contact_person: Some("Jean".to_string()),
        phone_number: "+250788123456".to_string(),
        email: Some("conseil@example.rw".to_string()),
        address: "KN 3 Rd".to_string(),
        latitude: -1.9536,
        longitude: 29.8739,
        opening_hours: Some("24h".to_string()),
        services: Some(r#"["Prescriptions"]"#.to_string()),
        is_registered_by_pharmacy: false,
        created_at: now,
        updated_at: now,
    };

    let pharmacy = Pharmacy::from(row);
    assert_eq!(pharmacy.name, "Pharmacie Conseil");
    assert_eq!(pharmacy.services, vec!["Prescriptions".to_string()]);
    assert_eq!(pharmacy.email.as_deref(), Some("conseil@example.rw"));
    assert_eq!(pharmacy.created_at, now);
}
