use serde::{Deserialize, Serialize};
use serde_json::Value;
use trip_types::{lenient, normalize_location, LatLng};

pub const JOIN_RIDE_ROOM: &str = "joinRideRoom";
pub const LEAVE_RIDE_ROOM: &str = "leaveRideRoom";
pub const UPDATE_DRIVER_LOCATION: &str = "updateDriverLocation";
pub const DRIVER_LIVE_LOCATION: &str = "driverLiveLocation";

/// Handshake query sent when the socket opens.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionPayload {
    pub role: String,
    pub ride_id: String,
}

impl ConnectionPayload {
    /// Anonymous viewer of a shared ride link.
    pub fn public_viewer(ride_id: &str) -> Self {
        Self {
            role: "public".to_string(),
            ride_id: ride_id.to_string(),
        }
    }

    pub fn query(&self) -> Vec<(&'static str, &str)> {
        vec![("role", self.role.as_str()), ("rideId", self.ride_id.as_str())]
    }
}

/// Payload of `updateDriverLocation`.
///
/// Every field is read on its own so one oddly typed side field never costs
/// the position.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(from = "Value")]
pub struct LocationUpdate {
    position: Option<LatLng>,
    pub heading: Option<f64>,
    pub speed: Option<f64>,
    pub ride_id: Option<String>,
    pub driver_id: Option<String>,
}

impl LocationUpdate {
    pub fn from_payload(payload: &Value) -> Self {
        let field = |key: &str| payload.get(key);
        Self {
            position: normalize_location(payload),
            heading: field("heading").and_then(lenient::number),
            speed: field("speed").and_then(lenient::number),
            ride_id: field("rideId").and_then(lenient::text),
            driver_id: field("driverId").and_then(lenient::text),
        }
    }

    pub fn position(&self) -> Option<LatLng> {
        self.position
    }
}

impl From<Value> for LocationUpdate {
    fn from(payload: Value) -> Self {
        LocationUpdate::from_payload(&payload)
    }
}

/// Payload a driver app emits with `driverLiveLocation`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverLiveLocation {
    pub ride_id: String,
    pub ride_booking_id: Option<String>,
    pub booking_id: Option<String>,
    pub driver_id: String,
    pub lat: f64,
    pub lng: f64,
    pub heading: Option<f64>,
    pub speed: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRideRoom<'a> {
    pub ride_id: &'a str,
    pub driver_id: &'a str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRideRoom<'a> {
    pub ride_id: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn update_with_both_components_has_a_position() {
        let update: LocationUpdate = serde_json::from_value(json!({
            "rideId": "6982e014bbda598007f477a5",
            "lat": 12.9716,
            "lng": 77.5946,
            "heading": 90.0
        }))
        .unwrap();
        assert_eq!(update.position(), Some(LatLng::new(12.9716, 77.5946)));
        assert_eq!(update.ride_id.as_deref(), Some("6982e014bbda598007f477a5"));
    }

    #[test]
    fn string_coordinates_give_a_position() {
        let update = LocationUpdate::from_payload(&json!({ "lat": "12.97", "lng": "77.59" }));
        assert_eq!(update.position(), Some(LatLng::new(12.97, 77.59)));
    }

    #[test]
    fn odd_side_fields_keep_the_position() {
        let update = LocationUpdate::from_payload(&json!({
            "lat": 12.97,
            "lng": 77.59,
            "speed": "31.5",
            "heading": "east",
            "rideId": 42
        }));
        assert_eq!(update.position(), Some(LatLng::new(12.97, 77.59)));
        assert_eq!(update.speed, Some(31.5));
        assert_eq!(update.heading, None);
        assert_eq!(update.ride_id.as_deref(), Some("42"));
    }

    #[test]
    fn geojson_update_is_longitude_first() {
        let update = LocationUpdate::from_payload(&json!({
            "type": "Point",
            "coordinates": [77.59, 12.97]
        }));
        assert_eq!(update.position(), Some(LatLng::new(12.97, 77.59)));
    }

    #[test]
    fn partial_update_is_ignored() {
        let update: LocationUpdate = serde_json::from_value(json!({ "lat": 12.9 })).unwrap();
        assert_eq!(update.position(), None);
    }

    #[test]
    fn driver_payload_uses_backend_field_names() {
        let payload = DriverLiveLocation {
            ride_id: "r1".into(),
            ride_booking_id: None,
            booking_id: Some("BK-1".into()),
            driver_id: "d1".into(),
            lat: 1.0,
            lng: 2.0,
            heading: None,
            speed: Some(31.5),
        };
        let value = serde_json::to_value(payload).unwrap();
        assert_eq!(value["rideId"], json!("r1"));
        assert_eq!(value["bookingId"], json!("BK-1"));
        assert_eq!(value["driverId"], json!("d1"));
        assert_eq!(value["speed"], json!(31.5));
    }
}
