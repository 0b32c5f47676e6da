use serde::{Deserialize, Deserializer, de};

/// Parses a `"lat,lon"` pair
pub fn parse_coordinate_pair(pair: &str) -> Option<(f64, f64)> {
    let (lat, lon) = pair.split_once(',')?;

    let lat: f64 = lat.trim().parse().ok()?;
    let lon: f64 = lon.trim().parse().ok()?;

    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return None;
    }

    Some((lat, lon))
}

// Nominatim and the trip service send coordinates as decimal strings like "48.8588897"
pub fn deserialize_coordinate<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawCoordinate {
        Text(String),
        Number(f64),
    }

    match RawCoordinate::deserialize(deserializer)? {
        RawCoordinate::Number(n) => Ok(n),
        RawCoordinate::Text(s) => s.trim().parse().map_err(de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::parse_coordinate_pair;

    #[test]
    fn test_parse_coordinate_pair() {
        assert_eq!(parse_coordinate_pair("48.85, 2.35"), Some((48.85, 2.35)));
        assert_eq!(parse_coordinate_pair("-33.9,151.2"), Some((-33.9, 151.2)));
        assert_eq!(parse_coordinate_pair("48.85"), None);
        assert_eq!(parse_coordinate_pair("north,east"), None);
        assert_eq!(parse_coordinate_pair("91,0"), None);
    }
}
