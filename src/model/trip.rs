use serde::{Deserialize, Serialize};
use std::{convert::Infallible, fmt, str::FromStr};

use super::place::{Coordinates, Place};
use crate::utils::deserialize_coordinate;

/// Body of `POST /api/create_trip/`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TripRequestPayload {
    /// "lat,lon"
    pub current_location: String,
    pub current_location_address: String,
    /// "lat,lon"
    pub pickup_location: String,
    pub pickup_address: String,
    /// "lat,lon"
    pub dropoff_location: String,
    pub dropoff_address: String,
    /// Hours already used in the current duty cycle, passed through as typed
    pub current_cycle_used: String,
}

impl TripRequestPayload {
    pub fn new(
        current: &Coordinates,
        current_address: &str,
        pickup: &Place,
        dropoff: &Place,
        cycle_hours: &str,
    ) -> Self {
        TripRequestPayload {
            current_location: current.to_pair_string(),
            current_location_address: current_address.to_string(),
            pickup_location: pickup.coordinates().to_pair_string(),
            pickup_address: pickup.display_name.clone(),
            dropoff_location: dropoff.coordinates().to_pair_string(),
            dropoff_address: dropoff.display_name.clone(),
            current_cycle_used: cycle_hours.to_string(),
        }
    }
}

/// The trip record returned by the trip service.
/// Only the fields needed for rendering are typed, the rest are kept as is.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TripResponse {
    pub id: TripId,
    #[serde(default)]
    pub route_geometry: RouteGeometry,
    #[serde(default)]
    pub stops: Vec<Stop>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// The backend may hand out numeric or string ids
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum TripId {
    Number(u64),
    Text(String),
}

impl fmt::Display for TripId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TripId::Number(n) => write!(f, "{n}"),
            TripId::Text(s) => write!(f, "{s}"),
        }
    }
}

impl TripId {
    /// The id as it can appear in a file name: anything but ASCII letters, digits,
    /// `-` and `_` becomes `_`
    pub fn file_stem(&self) -> String {
        self.to_string()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }
}

impl FromStr for TripId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(match s.parse::<u64>() {
            Ok(n) => TripId::Number(n),
            Err(_) => TripId::Text(s.to_string()),
        })
    }
}

/// GeoJSON-like line geometry
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RouteGeometry {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// `[lon, lat]` pairs
    #[serde(default)]
    pub coordinates: Vec<[f64; 2]>,
}

/// A rest, fuel, pickup or dropoff stop along the route
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Stop {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(deserialize_with = "deserialize_coordinate")]
    pub location_lat: f64,
    #[serde(deserialize_with = "deserialize_coordinate")]
    pub location_lon: f64,
    /// Shown as sent; `null` when the service leaves it out
    #[serde(default)]
    pub duration_minutes: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_uses_lat_lon_pairs() {
        let pickup = Place {
            display_name: "Chicago, Illinois".to_string(),
            lat: 41.88,
            lon: -87.63,
        };
        let dropoff = Place {
            display_name: "Denver, Colorado".to_string(),
            lat: 39.74,
            lon: -104.99,
        };
        let current = Coordinates {
            lat: 40.0,
            lon: -80.5,
        };

        let payload = TripRequestPayload::new(&current, "Home", &pickup, &dropoff, "12");

        assert_eq!(payload.current_location, "40,-80.5");
        assert_eq!(payload.current_location_address, "Home");
        assert_eq!(payload.pickup_location, "41.88,-87.63");
        assert_eq!(payload.pickup_address, "Chicago, Illinois");
        assert_eq!(payload.dropoff_location, "39.74,-104.99");
        assert_eq!(payload.current_cycle_used, "12");
    }

    #[test]
    fn parses_trip_response() -> Result<(), anyhow::Error> {
        let json = r#"{
            "id": 17,
            "distance_miles": 1003.2,
            "route_geometry": {"type": "LineString", "coordinates": [[-87.63, 41.88], [-104.99, 39.74]]},
            "stops": [
                {"type": "rest", "location_lat": "40.1", "location_lon": -95.2, "duration_minutes": 600},
                {"type": "fuel", "location_lat": 40.5, "location_lon": -99.0, "duration_minutes": 30.5}
            ]
        }"#;

        let trip: TripResponse = serde_json::from_str(json)?;

        assert_eq!(trip.id, TripId::Number(17));
        assert_eq!(trip.id.to_string(), "17");
        assert_eq!(trip.route_geometry.coordinates.len(), 2);
        assert_eq!(trip.stops[0].location_lat, 40.1);
        assert_eq!(trip.stops[0].duration_minutes.to_string(), "600");
        assert_eq!(trip.stops[1].duration_minutes.to_string(), "30.5");
        assert!(trip.extra.contains_key("distance_miles"));

        Ok(())
    }

    #[test]
    fn stop_without_duration_still_parses() -> Result<(), anyhow::Error> {
        let json = r#"{
            "id": 4,
            "stops": [
                {"type": "pickup", "location_lat": 41.88, "location_lon": -87.63},
                {"type": "dropoff", "location_lat": 39.74, "location_lon": -104.99, "duration_minutes": null}
            ]
        }"#;

        let trip: TripResponse = serde_json::from_str(json)?;

        assert_eq!(trip.stops.len(), 2);
        assert!(trip.stops.iter().all(|stop| stop.duration_minutes.is_null()));

        Ok(())
    }

    #[test]
    fn trip_id_file_stem_has_no_separators() {
        assert_eq!(TripId::Number(17).file_stem(), "17");
        assert_eq!(TripId::Text("7f3a-b_c".to_string()).file_stem(), "7f3a-b_c");
        assert_eq!(
            TripId::Text("x/../../escaped".to_string()).file_stem(),
            "x_______escaped"
        );
        assert_eq!(TripId::Text("a\\b".to_string()).file_stem(), "a_b");
    }

    #[test]
    fn trip_id_from_str() {
        assert_eq!("42".parse(), Ok(TripId::Number(42)));
        assert_eq!(" 7f3a ".parse(), Ok(TripId::Text("7f3a".to_string())));
    }

    #[test]
    fn missing_route_is_empty() -> Result<(), anyhow::Error> {
        let trip: TripResponse = serde_json::from_str(r#"{"id": "abc"}"#)?;

        assert_eq!(trip.id.to_string(), "abc");
        assert!(trip.route_geometry.coordinates.is_empty());
        assert!(trip.stops.is_empty());

        Ok(())
    }
}
