use serde::{Deserialize, Serialize};

use super::nominatim_api_model::NominatimSuggestion;

/// A location the user has confirmed, either by picking a suggestion or through
/// reverse geocoding of the device position.
///
/// Never built from partially typed text.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Place {
    pub display_name: String,
    pub lat: f64,
    pub lon: f64,
}

impl Place {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            lat: self.lat,
            lon: self.lon,
        }
    }
}

impl From<&NominatimSuggestion> for Place {
    fn from(value: &NominatimSuggestion) -> Self {
        Place {
            display_name: value.display_name.clone(),
            lat: value.lat,
            lon: value.lon,
        }
    }
}

/// Raw device position
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    /// `"lat,lon"` as the trip service expects it
    pub fn to_pair_string(&self) -> String {
        format!("{},{}", self.lat, self.lon)
    }
}
