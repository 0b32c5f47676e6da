//! Turns a planned trip into something that can be drawn: a polyline for the route
//! and a marker per stop.
use itertools::Itertools;
use serde_json::{Value, json};

use crate::model::{Coordinates, RouteGeometry, Stop};

pub const DEFAULT_ZOOM: u8 = 6;

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    /// `[lat, lon]`
    pub position: [f64; 2],
    pub kind: String,
    pub duration_minutes: Value,
}

impl Marker {
    pub fn popup(&self) -> String {
        format!("{}\nDuration: {} minutes", self.kind, self.duration())
    }

    fn duration(&self) -> String {
        match &self.duration_minutes {
            Value::Null => "unknown".to_string(),
            Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapView {
    /// `[lat, lon]`
    pub center: [f64; 2],
    pub zoom: u8,
    /// `[lat, lon]` positions in route order
    pub polyline: Vec<[f64; 2]>,
    pub markers: Vec<Marker>,
}

impl MapView {
    pub fn new(route: &RouteGeometry, stops: &[Stop], current: Option<Coordinates>) -> Self {
        MapView {
            center: initial_center(Some(route), current),
            zoom: DEFAULT_ZOOM,
            polyline: route
                .coordinates
                .iter()
                .map(|[lon, lat]| [*lat, *lon])
                .collect_vec(),
            markers: stops
                .iter()
                .map(|stop| Marker {
                    position: [stop.location_lat, stop.location_lon],
                    kind: stop.kind.clone(),
                    duration_minutes: stop.duration_minutes.clone(),
                })
                .collect_vec(),
        }
    }

    /// GeoJSON FeatureCollection: one LineString for the route, one Point per stop
    pub fn to_geojson(&self) -> Value {
        let mut features = Vec::with_capacity(self.markers.len() + 1);

        if !self.polyline.is_empty() {
            features.push(json!({
                "type": "Feature",
                "geometry": {
                    "type": "LineString",
                    "coordinates": self.polyline.iter().map(|[lat, lon]| [*lon, *lat]).collect_vec(),
                },
                "properties": { "kind": "route" },
            }));
        }

        features.extend(self.markers.iter().map(|marker| {
            json!({
                "type": "Feature",
                "geometry": {
                    "type": "Point",
                    "coordinates": [marker.position[1], marker.position[0]],
                },
                "properties": {
                    "type": marker.kind,
                    "duration_minutes": marker.duration_minutes,
                    "popup": marker.popup(),
                },
            })
        }));

        json!({
            "type": "FeatureCollection",
            "features": features,
            "properties": {
                "center": self.center,
                "zoom": self.zoom,
            },
        })
    }

    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![format!(
            "Route map centered on {:.5},{:.5} (zoom {}), {} route points",
            self.center[0],
            self.center[1],
            self.zoom,
            self.polyline.len()
        )];

        lines.extend(self.markers.iter().enumerate().map(|(i, marker)| {
            format!(
                "  {}. {} at {:.5},{:.5}, Duration: {} minutes",
                i + 1,
                marker.kind,
                marker.position[0],
                marker.position[1],
                marker.duration()
            )
        }));

        lines
    }
}

/// The first route point when there is one, else the current location, else 0,0
pub fn initial_center(route: Option<&RouteGeometry>, current: Option<Coordinates>) -> [f64; 2] {
    if let Some([lon, lat]) = route.and_then(|r| r.coordinates.first()) {
        return [*lat, *lon];
    }

    current.map_or([0.0, 0.0], |c| [c.lat, c.lon])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route() -> RouteGeometry {
        RouteGeometry {
            kind: Some("LineString".to_string()),
            coordinates: vec![[-87.63, 41.88], [-95.99, 41.25], [-104.99, 39.74]],
        }
    }

    fn stops() -> Vec<Stop> {
        vec![
            Stop {
                kind: "rest".to_string(),
                location_lat: 41.25,
                location_lon: -95.99,
                duration_minutes: 600u32.into(),
            },
            Stop {
                kind: "fuel".to_string(),
                location_lat: 40.0,
                location_lon: -100.0,
                duration_minutes: 30u32.into(),
            },
        ]
    }

    #[test]
    fn polyline_swaps_to_lat_lon() {
        let view = MapView::new(&route(), &stops(), None);

        assert_eq!(
            view.polyline,
            vec![[41.88, -87.63], [41.25, -95.99], [39.74, -104.99]]
        );
        assert_eq!(view.center, [41.88, -87.63]);
        assert_eq!(view.zoom, DEFAULT_ZOOM);
    }

    #[test]
    fn markers_carry_type_and_duration() {
        let view = MapView::new(&route(), &stops(), None);

        assert_eq!(view.markers.len(), 2);
        assert_eq!(view.markers[0].position, [41.25, -95.99]);
        assert_eq!(view.markers[0].popup(), "rest\nDuration: 600 minutes");
        assert_eq!(view.markers[1].popup(), "fuel\nDuration: 30 minutes");
    }

    #[test]
    fn unknown_duration_still_gets_a_marker() {
        let mut stops = stops();
        stops[0].duration_minutes = Value::Null;
        stops[1].duration_minutes = json!("45");

        let view = MapView::new(&route(), &stops, None);

        assert_eq!(view.markers[0].popup(), "rest\nDuration: unknown minutes");
        assert_eq!(view.markers[1].popup(), "fuel\nDuration: 45 minutes");
    }

    #[test]
    fn center_falls_back_to_current_location() {
        let current = Coordinates {
            lat: 45.0,
            lon: 16.0,
        };

        assert_eq!(initial_center(Some(&RouteGeometry::default()), Some(current)), [45.0, 16.0]);
        assert_eq!(initial_center(None, Some(current)), [45.0, 16.0]);
        assert_eq!(initial_center(None, None), [0.0, 0.0]);
    }

    #[test]
    fn geojson_has_route_and_stops() {
        let geojson = MapView::new(&route(), &stops(), None).to_geojson();

        let features = geojson["features"].as_array().unwrap();
        assert_eq!(features.len(), 3);
        assert_eq!(features[0]["geometry"]["type"], "LineString");
        assert_eq!(features[0]["geometry"]["coordinates"][0], json!([-87.63, 41.88]));
        assert_eq!(features[1]["geometry"]["coordinates"], json!([-95.99, 41.25]));
        assert_eq!(features[2]["properties"]["type"], "fuel");
        assert_eq!(features[2]["properties"]["duration_minutes"], 30);
    }

    #[test]
    fn empty_route_has_only_stop_features() {
        let geojson = MapView::new(&RouteGeometry::default(), &stops(), None).to_geojson();

        assert_eq!(geojson["features"].as_array().unwrap().len(), 2);
    }
}
