//! Rendering surface abstraction
//!
//! The correlation core never draws anything itself. It issues marker and
//! path requests against a [`RenderSurface`]. The surface is append-only
//! within one load cycle; the core never removes or mutates a request it has
//! already issued.
//!
//! Two implementations ship with the crate:
//!
//! - [`GeoJsonSurface`] collects requests into a GeoJSON FeatureCollection
//!   for the static map page (markers as Points, association paths as
//!   LineStrings, style carried in properties).
//! - [`RecordingSurface`] captures requests in memory for tests and dry runs.

use serde_json::json;

use crate::geo::Position;

/// A point-marker request issued by the core.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerRequest {
    pub position: Position,
    pub color: &'static str,
    pub popup: String,
}

/// Stroke styling for an association path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathStyle {
    pub color: &'static str,
    pub weight: u32,
    pub dash_array: Option<&'static str>,
}

impl PathStyle {
    /// The style used for rig → target-well association paths.
    pub const fn association() -> Self {
        Self {
            color: "#546e7a",
            weight: 2,
            dash_array: Some("6 4"),
        }
    }
}

/// A path request connecting a rig position to its target well.
#[derive(Debug, Clone, PartialEq)]
pub struct PathRequest {
    pub from: Position,
    pub to: Position,
    pub style: PathStyle,
}

/// Where marker and path requests go.
///
/// Implementations decide how requests become pixels; the core only issues
/// them. Within a load cycle the surface is append-only.
pub trait RenderSurface {
    /// Request a point marker at a position with a fill color and a popup
    /// payload.
    fn add_point_marker(&mut self, position: Position, color: &'static str, popup: String);

    /// Request a path between two positions.
    fn add_path(&mut self, from: Position, to: Position, style: PathStyle);
}

// ============================================================================
// GeoJSON Surface
// ============================================================================

/// Collects render requests into a GeoJSON FeatureCollection.
///
/// Marker color lands in `marker-color` and path styling in `stroke` /
/// `stroke-width` / `stroke-dasharray`, which the map front end reads back
/// when building Leaflet layers.
#[derive(Debug, Default)]
pub struct GeoJsonSurface {
    features: Vec<serde_json::Value>,
}

impl GeoJsonSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of features collected so far.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Finish the load cycle and produce the FeatureCollection document.
    pub fn into_document(self) -> serde_json::Value {
        json!({
            "type": "FeatureCollection",
            "features": self.features,
        })
    }
}

impl RenderSurface for GeoJsonSurface {
    fn add_point_marker(&mut self, position: Position, color: &'static str, popup: String) {
        self.features.push(json!({
            "type": "Feature",
            "geometry": {
                "type": "Point",
                // GeoJSON coordinate order is [lon, lat]
                "coordinates": [position.lon, position.lat],
            },
            "properties": {
                "marker-color": color,
                "popup": popup,
            },
        }));
    }

    fn add_path(&mut self, from: Position, to: Position, style: PathStyle) {
        self.features.push(json!({
            "type": "Feature",
            "geometry": {
                "type": "LineString",
                "coordinates": [[from.lon, from.lat], [to.lon, to.lat]],
            },
            "properties": {
                "stroke": style.color,
                "stroke-width": style.weight,
                "stroke-dasharray": style.dash_array,
            },
        }));
    }
}

// ============================================================================
// Recording Surface
// ============================================================================

/// Captures every request verbatim. Used by tests asserting on the exact
/// request set, and by dry runs that only want counts.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub markers: Vec<MarkerRequest>,
    pub paths: Vec<PathRequest>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderSurface for RecordingSurface {
    fn add_point_marker(&mut self, position: Position, color: &'static str, popup: String) {
        self.markers.push(MarkerRequest { position, color, popup });
    }

    fn add_path(&mut self, from: Position, to: Position, style: PathStyle) {
        self.paths.push(PathRequest { from, to, style });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geojson_surface_emits_point_and_linestring() {
        let mut surface = GeoJsonSurface::new();
        surface.add_point_marker(
            Position { lat: 60.0, lon: 3.0 },
            "#2e7d32",
            "<b>15/9-F-1</b>".to_string(),
        );
        surface.add_path(
            Position { lat: 60.1, lon: 3.1 },
            Position { lat: 60.0, lon: 3.0 },
            PathStyle::association(),
        );

        let doc = surface.into_document();
        let features = doc["features"].as_array().expect("feature array");
        assert_eq!(features.len(), 2);

        assert_eq!(features[0]["geometry"]["type"], "Point");
        // [lon, lat] order
        assert_eq!(features[0]["geometry"]["coordinates"][0], 3.0);
        assert_eq!(features[0]["geometry"]["coordinates"][1], 60.0);
        assert_eq!(features[0]["properties"]["marker-color"], "#2e7d32");

        assert_eq!(features[1]["geometry"]["type"], "LineString");
        assert_eq!(features[1]["properties"]["stroke-width"], 2);
    }

    #[test]
    fn test_recording_surface_is_append_only() {
        let mut surface = RecordingSurface::new();
        let p = Position { lat: 60.0, lon: 3.0 };
        surface.add_point_marker(p, "#757575", String::new());
        surface.add_point_marker(p, "#757575", String::new());
        assert_eq!(surface.markers.len(), 2);
        assert!(surface.paths.is_empty());
    }
}
