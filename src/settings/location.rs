//! Saved locations and coordinate resolution

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Settings;
use crate::data::Coordinates;

/// Errors that can occur when resolving the active location
#[derive(Debug, Error)]
pub enum LocationError {
    /// No locations are configured
    #[error("No location configured")]
    NoLocation,

    /// The selected location cannot be turned into coordinates
    #[error("Location '{0}' cannot be resolved to coordinates")]
    Unresolvable(String),

    /// Stored coordinates are out of range
    #[error("Location '{0}' has invalid coordinates")]
    InvalidCoordinates(String),
}

/// Where a saved location points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Place {
    /// Fixed latitude/longitude
    Coordinates { latitude: f64, longitude: f64 },
    /// The device's own position
    MyLocation,
}

/// A saved location with an optional custom display name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub place: Place,
}

impl Location {
    pub fn coordinates(latitude: f64, longitude: f64, name: Option<String>) -> Self {
        Self {
            name,
            place: Place::Coordinates {
                latitude,
                longitude,
            },
        }
    }

    /// Name shown in the panel: the custom name, else a description of the place
    pub fn display_name(&self) -> String {
        if let Some(name) = self.name.as_deref().filter(|n| !n.trim().is_empty()) {
            return name.to_string();
        }

        match self.place {
            Place::Coordinates {
                latitude,
                longitude,
            } => format!("{:.2}, {:.2}", latitude, longitude),
            Place::MyLocation => "My Location".to_string(),
        }
    }
}

/// Yields coordinates for the active location
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn coordinates(&self, settings: &Settings) -> Result<Coordinates, LocationError>;
}

/// Resolves the selected saved location from settings
#[derive(Debug, Clone, Copy, Default)]
pub struct SettingsLocationProvider;

#[async_trait]
impl LocationProvider for SettingsLocationProvider {
    async fn coordinates(&self, settings: &Settings) -> Result<Coordinates, LocationError> {
        let location = settings.active_location().ok_or(LocationError::NoLocation)?;

        match location.place {
            Place::Coordinates {
                latitude,
                longitude,
            } => {
                let coordinates = Coordinates::new(latitude, longitude);
                if coordinates.is_valid() {
                    Ok(coordinates)
                } else {
                    Err(LocationError::InvalidCoordinates(location.display_name()))
                }
            }
            Place::MyLocation => Err(LocationError::Unresolvable(location.display_name())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_with(locations: Vec<Location>, selected: usize) -> Settings {
        Settings {
            locations,
            selected_location: selected,
            ..Settings::default()
        }
    }

    #[tokio::test]
    async fn test_provider_resolves_selected_location() {
        let settings = settings_with(
            vec![
                Location::coordinates(49.28, -123.12, Some("Vancouver".to_string())),
                Location::coordinates(51.5, -0.12, Some("London".to_string())),
            ],
            1,
        );

        let coordinates = SettingsLocationProvider
            .coordinates(&settings)
            .await
            .expect("Should resolve London");
        assert_eq!(coordinates, Coordinates::new(51.5, -0.12));
    }

    #[tokio::test]
    async fn test_provider_without_locations() {
        let settings = settings_with(vec![], 0);
        let result = SettingsLocationProvider.coordinates(&settings).await;
        assert!(matches!(result, Err(LocationError::NoLocation)));
    }

    #[tokio::test]
    async fn test_provider_rejects_my_location() {
        let settings = settings_with(
            vec![Location {
                name: None,
                place: Place::MyLocation,
            }],
            0,
        );
        let result = SettingsLocationProvider.coordinates(&settings).await;
        assert!(matches!(result, Err(LocationError::Unresolvable(_))));
    }

    #[tokio::test]
    async fn test_provider_rejects_out_of_range_coordinates() {
        let settings = settings_with(vec![Location::coordinates(120.0, 0.0, None)], 0);
        let result = SettingsLocationProvider.coordinates(&settings).await;
        assert!(matches!(result, Err(LocationError::InvalidCoordinates(_))));
    }

    #[test]
    fn test_display_name() {
        let named = Location::coordinates(49.28, -123.12, Some("Home".to_string()));
        assert_eq!(named.display_name(), "Home");

        let unnamed = Location::coordinates(49.2827, -123.1207, None);
        assert_eq!(unnamed.display_name(), "49.28, -123.12");

        let blank = Location {
            name: Some("  ".to_string()),
            place: Place::MyLocation,
        };
        assert_eq!(blank.display_name(), "My Location");
    }

    #[test]
    fn test_place_serialization_is_tagged() {
        let json = serde_json::to_string(&Place::MyLocation).unwrap();
        assert_eq!(json, r#"{"type":"my_location"}"#);
    }
}
