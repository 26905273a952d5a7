use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::lenient::number as coordinate;

/// Canonical coordinate shape used everywhere past the API boundary.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Returns `None` unless both components are finite numbers.
    pub fn checked(lat: f64, lng: f64) -> Option<Self> {
        (lat.is_finite() && lng.is_finite()).then_some(Self { lat, lng })
    }

    /// Linear interpolation towards `to`, `t` in `0.0..=1.0`.
    pub fn lerp(self, to: LatLng, t: f64) -> LatLng {
        LatLng {
            lat: self.lat + (to.lat - self.lat) * t,
            lng: self.lng + (to.lng - self.lng) * t,
        }
    }
}

/// Normalizes a location that arrives either as a GeoJSON point
/// (`{"type": "Point", "coordinates": [lng, lat]}`) or as an already paired
/// `{"lat": .., "lng": ..}` object.
pub fn normalize_location(raw: &Value) -> Option<LatLng> {
    let obj = raw.as_object()?;

    if obj.get("type").and_then(Value::as_str) == Some("Point") {
        if let Some(coordinates) = obj.get("coordinates").and_then(Value::as_array) {
            // GeoJSON orders longitude first
            return match coordinates.as_slice() {
                [lng, lat, ..] => LatLng::checked(coordinate(lat)?, coordinate(lng)?),
                _ => None,
            };
        }
    }

    LatLng::checked(coordinate(obj.get("lat")?)?, coordinate(obj.get("lng")?)?)
}


#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl Bounds {
    pub fn around(point: LatLng) -> Self {
        Self {
            south_west: point,
            north_east: point,
        }
    }

    pub fn extend(&mut self, point: LatLng) {
        self.south_west.lat = self.south_west.lat.min(point.lat);
        self.south_west.lng = self.south_west.lng.min(point.lng);
        self.north_east.lat = self.north_east.lat.max(point.lat);
        self.north_east.lng = self.north_east.lng.max(point.lng);
    }

    pub fn from_points(points: impl IntoIterator<Item = LatLng>) -> Option<Self> {
        let mut points = points.into_iter();
        let mut bounds = Bounds::around(points.next()?);
        points.for_each(|point| bounds.extend(point));
        Some(bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn geojson_point_is_longitude_first() {
        let raw = json!({ "type": "Point", "coordinates": [77.5946, 12.9716] });
        assert_eq!(
            normalize_location(&raw),
            Some(LatLng::new(12.9716, 77.5946))
        );
    }

    #[test]
    fn paired_shape_passes_through() {
        let raw = json!({ "lat": 28.61, "lng": 77.2 });
        assert_eq!(normalize_location(&raw), Some(LatLng::new(28.61, 77.2)));
    }

    #[test]
    fn numeric_strings_are_accepted() {
        let raw = json!({ "lat": "28.61", "lng": " 77.2" });
        assert_eq!(normalize_location(&raw), Some(LatLng::new(28.61, 77.2)));
    }

    #[test]
    fn zero_is_a_valid_component() {
        let raw = json!({ "type": "Point", "coordinates": [0.0, 51.47] });
        assert_eq!(normalize_location(&raw), Some(LatLng::new(51.47, 0.0)));
    }

    #[test]
    fn malformed_shapes_normalize_to_none() {
        assert_eq!(normalize_location(&json!(null)), None);
        assert_eq!(normalize_location(&json!([12.0, 77.0])), None);
        assert_eq!(normalize_location(&json!({ "lat": 12.0 })), None);
        assert_eq!(
            normalize_location(&json!({ "type": "Point", "coordinates": [77.0] })),
            None
        );
        assert_eq!(
            normalize_location(&json!({ "lat": "north", "lng": 77.0 })),
            None
        );
    }

    #[test]
    fn point_without_coordinate_array_falls_back_to_pair() {
        let raw = json!({ "type": "Point", "lat": 1.5, "lng": 2.5 });
        assert_eq!(normalize_location(&raw), Some(LatLng::new(1.5, 2.5)));
    }

    #[test]
    fn non_finite_components_are_rejected() {
        assert_eq!(LatLng::checked(f64::NAN, 1.0), None);
        assert_eq!(LatLng::checked(1.0, f64::INFINITY), None);
    }

    #[test]
    fn bounds_cover_every_point() {
        let points = [
            LatLng::new(12.9, 77.6),
            LatLng::new(13.1, 77.5),
            LatLng::new(12.95, 77.7),
        ];
        let bounds = Bounds::from_points(points).unwrap();
        assert_eq!(bounds.south_west, LatLng::new(12.9, 77.5));
        assert_eq!(bounds.north_east, LatLng::new(13.1, 77.7));
        assert!(points.iter().all(|p| {
            (bounds.south_west.lat..=bounds.north_east.lat).contains(&p.lat)
                && (bounds.south_west.lng..=bounds.north_east.lng).contains(&p.lng)
        }));
        assert!(Bounds::from_points(std::iter::empty()).is_none());
    }
}
