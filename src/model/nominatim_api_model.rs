use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::utils::deserialize_coordinate;

/// One entry of a Nominatim `/search` response
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct NominatimSuggestion {
    pub display_name: String,
    #[serde(deserialize_with = "deserialize_coordinate")]
    pub lat: f64,
    #[serde(deserialize_with = "deserialize_coordinate")]
    pub lon: f64,
    #[serde(default)]
    pub place_id: Option<u64>,
    #[serde(default)]
    pub osm_type: Option<String>,
    /// Only present when the request asked for `addressdetails=1`
    #[serde(default)]
    pub address: Option<HashMap<String, String>>,
}

/// Nominatim `/reverse` response. Only the display name is used.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct NominatimReverse {
    #[serde(default)]
    pub display_name: Option<String>,
    /// Set instead of a place when nothing is found at the coordinates
    #[serde(default)]
    pub error: Option<String>,
}
