pub mod app_config;
pub mod config;
pub mod pharmacy;
pub mod proximity;
pub mod services;
pub mod store;
pub mod validate;

pub use app_config::{AppConfig, Environment, StoreBackend};
pub use config::{load_app_config, load_app_config_from_env};
pub use pharmacy::{ListFilter, NewPharmacy, Page, Pharmacy, PharmacyPatch, RankedPharmacy};
pub use proximity::{find_nearest, haversine_km, NearestQuery, ProximityError};
pub use store::{memory::InMemoryStore, PharmacyStore, StoreError};
pub use validate::{CreatePharmacyInput, UpdatePharmacyInput, ValidationError};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
