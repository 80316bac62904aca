//! Radius-filtered nearest-pharmacy ranking.
//!
//! The ranker is a pure function over a snapshot of records: it computes the
//! haversine distance from the query point to every record, keeps those within
//! the radius, orders them by distance and truncates to the limit. No spatial
//! index is involved; every call is a linear scan.

use thiserror::Error;

use crate::pharmacy::{Pharmacy, RankedPharmacy};

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProximityError {
    #[error("{0}")]
    InvalidArgument(String),
}

/// Great-circle distance in kilometres between two points given in degrees.
#[must_use]
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();

    let a = (dlat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (dlon / 2.0).sin().powi(2);
    // Rounding can push `a` a hair past 1 for antipodal points. `clamp` keeps
    // NaN, so bad coordinates still yield a NaN distance.
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

fn round_2dp(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A validated proximity query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestQuery {
    latitude: f64,
    longitude: f64,
    radius_km: f64,
    limit: usize,
}

impl NearestQuery {
    /// Validate the query point, radius and limit.
    ///
    /// # Errors
    ///
    /// Returns [`ProximityError::InvalidArgument`] when either coordinate is
    /// missing or out of range, the radius is negative or not finite, or the
    /// limit is zero.
    pub fn new(
        latitude: Option<f64>,
        longitude: Option<f64>,
        radius_km: f64,
        limit: usize,
    ) -> Result<Self, ProximityError> {
        let (Some(latitude), Some(longitude)) = (latitude, longitude) else {
            return Err(ProximityError::InvalidArgument(
                "latitude and longitude are required".to_string(),
            ));
        };
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(ProximityError::InvalidArgument(format!(
                "latitude must be between -90 and 90, got {latitude}"
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(ProximityError::InvalidArgument(format!(
                "longitude must be between -180 and 180, got {longitude}"
            )));
        }
        if !radius_km.is_finite() || radius_km < 0.0 {
            return Err(ProximityError::InvalidArgument(format!(
                "radius must be a non-negative number of kilometres, got {radius_km}"
            )));
        }
        if limit == 0 {
            return Err(ProximityError::InvalidArgument(
                "limit must be a positive integer".to_string(),
            ));
        }

        Ok(Self {
            latitude,
            longitude,
            radius_km,
            limit,
        })
    }

    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    #[must_use]
    pub fn radius_km(&self) -> f64 {
        self.radius_km
    }

    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Rank a snapshot of records against this query.
    ///
    /// Records are not validated; one with out-of-range coordinates still gets
    /// a distance, and a NaN distance never passes the radius filter. Records
    /// whose rounded distances tie keep their snapshot order.
    pub fn rank<I>(&self, records: I) -> Vec<RankedPharmacy>
    where
        I: IntoIterator<Item = Pharmacy>,
    {
        let mut hits: Vec<RankedPharmacy> = records
            .into_iter()
            .filter_map(|pharmacy| {
                let distance = haversine_km(
                    self.latitude,
                    self.longitude,
                    pharmacy.latitude,
                    pharmacy.longitude,
                );
                (distance <= self.radius_km).then(|| RankedPharmacy {
                    pharmacy,
                    distance_km: round_2dp(distance),
                })
            })
            .collect();

        // `sort_by` is stable, which is what keeps tie order deterministic.
        hits.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        hits.truncate(self.limit);
        hits
    }
}

/// Validate a query and rank `all_records` against it in one call.
///
/// # Errors
///
/// Returns [`ProximityError::InvalidArgument`] for the conditions listed on
/// [`NearestQuery::new`].
pub fn find_nearest<I>(
    query_lat: Option<f64>,
    query_lon: Option<f64>,
    radius_km: f64,
    limit: usize,
    all_records: I,
) -> Result<Vec<RankedPharmacy>, ProximityError>
where
    I: IntoIterator<Item = Pharmacy>,
{
    let query = NearestQuery::new(query_lat, query_lon, radius_km, limit)?;
    Ok(query.rank(all_records))
}

#[cfg(test)]
#[path = "proximity_test.rs"]
mod tests;
