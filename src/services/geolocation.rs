//! Where the device is. Stands in for the browser's geolocation API.
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::timeout;
use tracing::info;

use crate::model::Coordinates;

/// How long a position lookup may take before manual entry takes over
pub const GEOLOCATION_TIMEOUT: Duration = Duration::from_secs(20);

#[async_trait]
pub trait Geolocator: Send + Sync {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError>;
}

/// A position given on the command line or in the environment
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub Coordinates);

#[async_trait]
impl Geolocator for FixedPosition {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        Ok(self.0)
    }
}

/// Used when no position source is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGeolocation;

#[async_trait]
impl Geolocator for NoGeolocation {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        Err(GeolocationError::Unsupported)
    }
}

/// The user declined to share their position
#[derive(Debug, Clone, Copy, Default)]
pub struct DeniedGeolocation;

#[async_trait]
impl Geolocator for DeniedGeolocation {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        Err(GeolocationError::PermissionDenied)
    }
}

/// A configured position that couldn't be understood
#[derive(Debug, Clone)]
pub struct UnreadablePosition(pub String);

#[async_trait]
impl Geolocator for UnreadablePosition {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        Err(GeolocationError::Unavailable(format!(
            "can't read a position from {:?}",
            self.0
        )))
    }
}

/// Asks `geolocator` for the position, giving up after `limit`
#[tracing::instrument(err, skip(geolocator))]
pub async fn locate(
    geolocator: &dyn Geolocator,
    limit: Duration,
) -> Result<Coordinates, GeolocationError> {
    let position = timeout(limit, geolocator.current_position())
        .await
        .map_err(|_| GeolocationError::Timeout(limit))??;

    info!("device is at {},{}", position.lat, position.lon);

    Ok(position)
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum GeolocationError {
    #[error("geolocation isn't supported")]
    Unsupported,

    #[error("geolocation permission denied")]
    PermissionDenied,

    #[error("geolocation timed out after {0:?}")]
    Timeout(Duration),

    #[error("position unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NeverAnswers;

    #[async_trait]
    impl Geolocator for NeverAnswers {
        async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn fixed_position_is_returned() {
        let coordinates = Coordinates {
            lat: 45.81,
            lon: 15.98,
        };

        let result = locate(&FixedPosition(coordinates), GEOLOCATION_TIMEOUT).await;

        assert_eq!(result, Ok(coordinates));
    }

    #[tokio::test]
    async fn no_geolocation_is_unsupported() {
        let result = locate(&NoGeolocation, GEOLOCATION_TIMEOUT).await;

        assert_eq!(result, Err(GeolocationError::Unsupported));
    }

    #[tokio::test]
    async fn unreadable_position_is_unavailable() {
        let result = locate(&UnreadablePosition("north".to_string()), GEOLOCATION_TIMEOUT).await;

        assert!(matches!(result, Err(GeolocationError::Unavailable(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_source_times_out() {
        let result = locate(&NeverAnswers, GEOLOCATION_TIMEOUT).await;

        assert_eq!(result, Err(GeolocationError::Timeout(GEOLOCATION_TIMEOUT)));
    }
}
