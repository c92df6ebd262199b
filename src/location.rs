//! Device location collaborator
//!
//! The hospital finder needs the user's position. Where it comes from is
//! outside the API client: a fixed position from config or the command
//! line, or nothing at all.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Parse `"lat,lon"` as given on the command line
    pub fn parse(raw: &str) -> Option<Self> {
        let (lat, lon) = raw.split_once(',')?;
        let latitude: f64 = lat.trim().parse().ok()?;
        let longitude: f64 = lon.trim().parse().ok()?;
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return None;
        }
        Some(Self::new(latitude, longitude))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("location is not supported")]
    Unsupported,
}

impl LocationError {
    pub fn user_message(&self) -> String {
        match self {
            LocationError::PermissionDenied => {
                "Please allow location access to find nearby care.".to_string()
            }
            LocationError::Unsupported => {
                "Location access is not supported on this device.".to_string()
            }
        }
    }
}

#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_position(&self) -> Result<Coordinates, LocationError>;

    /// Short description for the status line
    fn describe(&self) -> String;
}

/// A position supplied up front
pub struct FixedLocation {
    coords: Coordinates,
}

impl FixedLocation {
    pub fn new(coords: Coordinates) -> Self {
        Self { coords }
    }
}

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        Ok(self.coords)
    }

    fn describe(&self) -> String {
        format!(
            "fixed ({:.4}, {:.4})",
            self.coords.latitude, self.coords.longitude
        )
    }
}

/// Location sharing switched off by the user
pub struct DisabledLocation;

#[async_trait]
impl LocationProvider for DisabledLocation {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        Err(LocationError::PermissionDenied)
    }

    fn describe(&self) -> String {
        "disabled".to_string()
    }
}

/// No way to obtain a position on this machine
pub struct NoLocation;

#[async_trait]
impl LocationProvider for NoLocation {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        Err(LocationError::Unsupported)
    }

    fn describe(&self) -> String {
        "not configured".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_coordinates() {
        let c = Coordinates::parse("51.5074, -0.1278").unwrap();
        assert_eq!(c.latitude, 51.5074);
        assert_eq!(c.longitude, -0.1278);

        assert!(Coordinates::parse("51.5").is_none());
        assert!(Coordinates::parse("north,west").is_none());
        assert!(Coordinates::parse("91,0").is_none());
    }

    #[tokio::test]
    async fn test_providers() {
        let fixed = FixedLocation::new(Coordinates::new(1.0, 2.0));
        assert_eq!(
            fixed.current_position().await,
            Ok(Coordinates::new(1.0, 2.0))
        );
        assert_eq!(
            DisabledLocation.current_position().await,
            Err(LocationError::PermissionDenied)
        );
        assert_eq!(
            NoLocation.current_position().await,
            Err(LocationError::Unsupported)
        );
    }
}
