//! Upgrades settings documents written by older versions
//!
//! Migrations run on the raw JSON document before it is deserialized, so
//! values that no longer exist in the current types can still be read. Each
//! step checks for the old shape first and is a no-op on current documents.

use serde_json::{json, Map, Value};
use tracing::warn;

/// Separator between entries of the legacy `city` string
const LEGACY_CITY_SEPARATOR: &str = " && ";

/// Place marker for "my location" in the legacy `city` string
const LEGACY_MY_LOCATION: &str = "here";

/// Applies every migration step to `document`
///
/// Returns `true` if anything changed.
pub fn migrate(document: &mut Value) -> bool {
    let Some(root) = document.as_object_mut() else {
        return false;
    };

    let mut changed = migrate_legacy_city(root);
    changed |= migrate_hpa_pressure(root);
    changed |= clamp_selected_location(root);
    changed
}

/// Converts the legacy `city` string into the `locations` list
///
/// The string holds entries like `"49.28,-123.12>Vancouver && here>"`. A
/// place of `here` stands for the device's own location.
fn migrate_legacy_city(root: &mut Map<String, Value>) -> bool {
    let Some(city) = root.remove("city") else {
        return false;
    };

    let city = city.as_str().unwrap_or_default();
    if city.trim().is_empty() {
        // An empty legacy value is simply dropped
        return true;
    }

    let locations: Vec<Value> = city
        .split(LEGACY_CITY_SEPARATOR)
        .filter_map(legacy_location)
        .collect();

    root.insert("locations".to_string(), Value::Array(locations));
    true
}

/// Parses one `place>name` entry of the legacy `city` string
fn legacy_location(entry: &str) -> Option<Value> {
    let mut parts = entry.splitn(2, '>');
    let place: String = parts
        .next()
        .unwrap_or_default()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    let name = parts.next().map(str::trim).filter(|n| !n.is_empty());

    let place = if place == LEGACY_MY_LOCATION {
        json!({ "type": "my_location" })
    } else {
        let coordinates = place.split_once(',').and_then(|(lat, lon)| {
            Some((lat.parse::<f64>().ok()?, lon.parse::<f64>().ok()?))
        });
        match coordinates {
            Some((latitude, longitude)) => json!({
                "type": "coordinates",
                "latitude": latitude,
                "longitude": longitude,
            }),
            None => {
                warn!(entry, "Dropping legacy location with unreadable coordinates");
                return None;
            }
        }
    };

    let mut location = json!({ "place": place });
    if let Some(name) = name {
        location["name"] = Value::String(name.to_string());
    }
    Some(location)
}

/// Rewrites the retired `hpa` pressure unit as the equivalent `mbar`
fn migrate_hpa_pressure(root: &mut Map<String, Value>) -> bool {
    let Some(pressure) = root
        .get_mut("units")
        .and_then(|units| units.get_mut("pressure"))
    else {
        return false;
    };

    if pressure.as_str() == Some("hpa") {
        *pressure = Value::String("mbar".to_string());
        true
    } else {
        false
    }
}

/// Pulls an out-of-range selected location index back into range
fn clamp_selected_location(root: &mut Map<String, Value>) -> bool {
    let Some(selected) = root.get("selected_location").and_then(Value::as_i64) else {
        return false;
    };
    let count = root
        .get("locations")
        .and_then(Value::as_array)
        .map_or(0, Vec::len) as i64;

    let clamped = if selected < 0 || count == 0 {
        0
    } else if selected >= count {
        count - 1
    } else {
        return false;
    };

    if clamped == selected {
        return false;
    }

    root.insert("selected_location".to_string(), json!(clamped));
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{Location, Place, Settings};
    use crate::units::PressureUnit;

    fn migrated(mut document: Value) -> (bool, Settings) {
        let changed = migrate(&mut document);
        let settings = serde_json::from_value(document).expect("Migrated document should parse");
        (changed, settings)
    }

    #[test]
    fn test_legacy_city_becomes_locations() {
        let (changed, settings) = migrated(json!({
            "city": "49.28,-123.12>Vancouver && here> && 51.5, -0.12>"
        }));

        assert!(changed);
        assert_eq!(
            settings.locations,
            vec![
                Location::coordinates(49.28, -123.12, Some("Vancouver".to_string())),
                Location {
                    name: None,
                    place: Place::MyLocation,
                },
                Location::coordinates(51.5, -0.12, None),
            ]
        );
    }

    #[test]
    fn test_legacy_city_with_named_my_location() {
        let (_, settings) = migrated(json!({ "city": "here>Wherever I am" }));
        assert_eq!(settings.locations[0].name.as_deref(), Some("Wherever I am"));
        assert_eq!(settings.locations[0].place, Place::MyLocation);
    }

    #[test]
    fn test_unreadable_legacy_entry_is_dropped() {
        let (_, settings) = migrated(json!({ "city": "nowhere>Bad && 10,20>Good" }));
        assert_eq!(settings.locations.len(), 1);
        assert_eq!(settings.locations[0].display_name(), "Good");
    }

    #[test]
    fn test_empty_legacy_city_is_removed() {
        let mut document = json!({ "city": "" });
        assert!(migrate(&mut document));
        assert!(document.get("city").is_none());
    }

    #[test]
    fn test_hpa_becomes_mbar() {
        let (changed, settings) = migrated(json!({ "units": { "pressure": "hpa" } }));
        assert!(changed);
        assert_eq!(settings.units.pressure, PressureUnit::Millibar);
    }

    #[test]
    fn test_other_pressure_units_untouched() {
        let (changed, settings) = migrated(json!({ "units": { "pressure": "inhg" } }));
        assert!(!changed);
        assert_eq!(settings.units.pressure, PressureUnit::InchesOfMercury);
    }

    #[test]
    fn test_selected_location_is_clamped() {
        let locations = json!([
            { "place": { "type": "coordinates", "latitude": 1.0, "longitude": 2.0 } },
            { "place": { "type": "coordinates", "latitude": 3.0, "longitude": 4.0 } }
        ]);

        let (changed, settings) = migrated(json!({
            "locations": locations.clone(),
            "selected_location": 5
        }));
        assert!(changed);
        assert_eq!(settings.selected_location, 1);

        let mut negative = json!({ "locations": locations, "selected_location": -2 });
        assert!(migrate(&mut negative));
        assert_eq!(negative["selected_location"], json!(0));
    }

    #[test]
    fn test_current_document_is_unchanged() {
        let current = serde_json::to_value(Settings {
            locations: vec![Location::coordinates(49.28, -123.12, None)],
            ..Settings::default()
        })
        .unwrap();

        let mut document = current.clone();
        assert!(!migrate(&mut document));
        assert_eq!(document, current);
    }

    #[test]
    fn test_non_object_document_is_ignored() {
        let mut document = json!([1, 2, 3]);
        assert!(!migrate(&mut document));
    }
}
