//! Coordinate parsing for new waypoints
//!
//! Only decimal degrees and whole meters are accepted.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordError {
    #[error("Latitude must be in decimal degree format")]
    LatitudeFormat,
    #[error("Latitude must be between -90 and 90")]
    LatitudeRange,
    #[error("Longitude must be in decimal degree format")]
    LongitudeFormat,
    #[error("Longitude must be between -180 and 180")]
    LongitudeRange,
    #[error("Altitude must be a positive integer number of meters")]
    Altitude,
}

/// # Errors
/// Returns `CoordError` if `raw` is not a number in [-90, 90].
pub fn latitude(raw: &str) -> Result<f64, CoordError> {
    let lat: f64 = raw.trim().parse().map_err(|_| CoordError::LatitudeFormat)?;
    if !(-90.0..=90.0).contains(&lat) {
        return Err(CoordError::LatitudeRange);
    }
    Ok(lat)
}

/// # Errors
/// Returns `CoordError` if `raw` is not a number in [-180, 180].
pub fn longitude(raw: &str) -> Result<f64, CoordError> {
    let lon: f64 = raw.trim().parse().map_err(|_| CoordError::LongitudeFormat)?;
    if !(-180.0..=180.0).contains(&lon) {
        return Err(CoordError::LongitudeRange);
    }
    Ok(lon)
}

/// # Errors
/// Returns `CoordError::Altitude` unless `raw` is a non-negative integer.
pub fn altitude(raw: &str) -> Result<u32, CoordError> {
    raw.trim().parse().map_err(|_| CoordError::Altitude)
}
