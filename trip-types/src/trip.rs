use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::api::{ApiCab, ApiDriver, ApiTrip};
use crate::geo::{normalize_location, Bounds, LatLng};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TripRecordError {
    #[error("trip {trip_id} has no usable {field} coordinates")]
    MissingCoordinates {
        trip_id: String,
        field: &'static str,
    },
}

/// Status labels the backend is known to send. Anything else is kept verbatim.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum TripStatus {
    InProgress,
    RideStarted,
    Completed,
    Dropped,
    Other(String),
}

impl TripStatus {
    pub fn parse(label: &str) -> Self {
        match label.trim() {
            s if s.eq_ignore_ascii_case("In Progress") => TripStatus::InProgress,
            s if s.eq_ignore_ascii_case("Ride Started") => TripStatus::RideStarted,
            s if s.eq_ignore_ascii_case("Completed") => TripStatus::Completed,
            s if s.eq_ignore_ascii_case("Dropped") => TripStatus::Dropped,
            other => TripStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TripStatus::InProgress => "In Progress",
            TripStatus::RideStarted => "Ride Started",
            TripStatus::Completed => "Completed",
            TripStatus::Dropped => "Dropped",
            TripStatus::Other(label) => label,
        }
    }

    /// The cab is on its way or carrying the passenger.
    pub fn is_live(&self) -> bool {
        matches!(self, TripStatus::InProgress | TripStatus::RideStarted)
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, TripStatus::Completed | TripStatus::Dropped)
    }
}

impl From<String> for TripStatus {
    fn from(label: String) -> Self {
        TripStatus::parse(&label)
    }
}

impl From<TripStatus> for String {
    fn from(status: TripStatus) -> Self {
        status.as_str().to_string()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum PaymentStatus {
    Paid,
    AdvancePaid,
    Unpaid(String),
}

impl PaymentStatus {
    pub fn parse(label: &str) -> Self {
        match label.trim() {
            s if s.eq_ignore_ascii_case("Paid") => PaymentStatus::Paid,
            s if s.eq_ignore_ascii_case("Advance Paid") => PaymentStatus::AdvancePaid,
            other => PaymentStatus::Unpaid(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PaymentStatus::Paid => "Paid",
            PaymentStatus::AdvancePaid => "Advance Paid",
            PaymentStatus::Unpaid(label) => label,
        }
    }
}

impl From<String> for PaymentStatus {
    fn from(label: String) -> Self {
        PaymentStatus::parse(&label)
    }
}

impl From<PaymentStatus> for String {
    fn from(status: PaymentStatus) -> Self {
        status.as_str().to_string()
    }
}

/// Pickup or drop point.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Waypoint {
    pub address: String,
    pub coordinates: LatLng,
    pub time: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Stop {
    pub address: String,
    pub coordinates: LatLng,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DriverInfo {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub image: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CabInfo {
    pub vehicle_type: String,
    pub model: String,
    pub number: String,
    pub color: String,
    pub image: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PaymentInfo {
    pub advance_amount: f64,
    pub pending_amount: f64,
    pub total_amount: f64,
    pub status: PaymentStatus,
}

/// Normalized client-side representation of one ride.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TripRecord {
    pub id: String,
    pub booking_id: String,
    pub status: TripStatus,
    pub pickup: Waypoint,
    pub drop: Waypoint,
    pub stops: Vec<Stop>,
    pub trip_start_time: Option<String>,
    pub trip_end_time: Option<String>,
    pub driver: Option<DriverInfo>,
    pub cab: CabInfo,
    pub payment: PaymentInfo,
    pub current_location: Option<LatLng>,
    pub ride_type: String,
    pub booking_type: String,
}

impl TripRecord {
    pub fn from_api(api: ApiTrip) -> Result<Self, TripRecordError> {
        let pickup_coordinates = required_coordinates(&api.id, "pickup", &api.pickup_coordinates)?;
        let drop_coordinates = required_coordinates(&api.id, "drop", &api.drop_coordinates)?;

        let raw_stops = api
            .stops
            .filter(|stops| !stops.is_empty())
            .or(api.pickups)
            .unwrap_or_default();

        Ok(TripRecord {
            booking_id: api.booking_id.unwrap_or_default(),
            status: TripStatus::parse(api.status.as_deref().unwrap_or_default()),
            pickup: Waypoint {
                address: api.pickup_location.unwrap_or_default(),
                coordinates: pickup_coordinates,
                time: api.date,
            },
            drop: Waypoint {
                address: api.drop_location.unwrap_or_default(),
                coordinates: drop_coordinates,
                time: api.trip_end_time.clone(),
            },
            stops: raw_stops.iter().filter_map(parse_stop).collect(),
            trip_start_time: api.trip_start_time,
            trip_end_time: api.trip_end_time,
            driver: api.assigned_driver.map(DriverInfo::from),
            cab: CabInfo::from(api.cab_details.unwrap_or_default()),
            payment: PaymentInfo {
                advance_amount: api.advance_amount.unwrap_or(0.0),
                pending_amount: api.pending_amount.unwrap_or(0.0),
                total_amount: api.total_amount.unwrap_or(0.0),
                status: PaymentStatus::parse(api.payment_status.as_deref().unwrap_or_default()),
            },
            current_location: api.driver_location.as_ref().and_then(normalize_location),
            ride_type: api.ride_type.unwrap_or_default(),
            booking_type: api.booking_type.unwrap_or_default(),
            id: api.id,
        })
    }

    /// Pickup, intermediate stops in order, then drop.
    pub fn route_path(&self) -> Vec<LatLng> {
        std::iter::once(self.pickup.coordinates)
            .chain(self.stops.iter().map(|stop| stop.coordinates))
            .chain(std::iter::once(self.drop.coordinates))
            .collect()
    }

    /// Smallest box holding every point the map should show on load.
    pub fn fit_bounds(&self) -> Bounds {
        let mut bounds = Bounds::around(self.pickup.coordinates);
        bounds.extend(self.drop.coordinates);
        if let Some(current) = self.current_location {
            bounds.extend(current);
        }
        self.stops
            .iter()
            .for_each(|stop| bounds.extend(stop.coordinates));
        bounds
    }
}

fn required_coordinates(
    trip_id: &str,
    field: &'static str,
    raw: &Option<Value>,
) -> Result<LatLng, TripRecordError> {
    raw.as_ref()
        .and_then(normalize_location)
        .ok_or_else(|| TripRecordError::MissingCoordinates {
            trip_id: trip_id.to_string(),
            field,
        })
}

fn parse_stop(raw: &Value) -> Option<Stop> {
    let coordinates = raw
        .get("coordinates")
        .and_then(normalize_location)
        .or_else(|| normalize_location(raw))?;
    let address = ["location", "address"]
        .iter()
        .find_map(|key| raw.get(*key).and_then(Value::as_str))
        .unwrap_or_default()
        .to_string();
    Some(Stop {
        address,
        coordinates,
    })
}

fn or_default(value: Option<String>, fallback: &str) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

impl From<ApiDriver> for DriverInfo {
    fn from(driver: ApiDriver) -> Self {
        DriverInfo {
            name: or_default(driver.name, "Not Assigned"),
            phone: or_default(driver.phone, "N/A"),
            email: or_default(driver.email, "N/A"),
            image: or_default(driver.image, "N/A"),
        }
    }
}

impl From<ApiCab> for CabInfo {
    fn from(cab: ApiCab) -> Self {
        CabInfo {
            vehicle_type: or_default(cab.vehicle_type, "Unknown"),
            model: or_default(cab.vehicle_variant, "Unknown"),
            number: or_default(cab.vehicle_number, "N/A"),
            // the backend does not report a color yet
            color: "White".to_string(),
            image: cab.cab_image.filter(|url| !url.trim().is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn api_trip() -> ApiTrip {
        ApiTrip {
            id: "6982e014bbda598007f477a5".to_string(),
            pickup_coordinates: Some(json!({ "lat": 12.97, "lng": 77.59 })),
            drop_coordinates: Some(json!({ "lat": 13.19, "lng": 77.70 })),
            ..ApiTrip::default()
        }
    }

    #[test]
    fn status_labels_are_classified() {
        assert!(TripStatus::parse("In Progress").is_live());
        assert!(TripStatus::parse("Ride Started").is_live());
        assert!(TripStatus::parse("completed").is_finished());
        assert!(TripStatus::parse("Dropped").is_finished());

        let other = TripStatus::parse("Driver Assigned");
        assert_eq!(other, TripStatus::Other("Driver Assigned".to_string()));
        assert!(!other.is_live() && !other.is_finished());
        assert_eq!(other.as_str(), "Driver Assigned");
    }

    #[test]
    fn status_serializes_as_its_label() {
        let value = serde_json::to_value(TripStatus::RideStarted).unwrap();
        assert_eq!(value, json!("Ride Started"));
        let back: TripStatus = serde_json::from_value(value).unwrap();
        assert_eq!(back, TripStatus::RideStarted);
    }

    #[test]
    fn payment_status_keeps_unknown_labels() {
        assert_eq!(PaymentStatus::parse("Paid"), PaymentStatus::Paid);
        assert_eq!(PaymentStatus::parse("Advance Paid"), PaymentStatus::AdvancePaid);
        assert_eq!(PaymentStatus::parse("Pending").as_str(), "Pending");
    }

    #[test]
    fn payment_labels_ignore_case_like_trip_labels() {
        assert_eq!(PaymentStatus::parse("paid"), PaymentStatus::Paid);
        assert_eq!(PaymentStatus::parse(" ADVANCE PAID "), PaymentStatus::AdvancePaid);
        assert_eq!(TripStatus::parse("ride started"), TripStatus::RideStarted);
    }

    #[test]
    fn missing_optional_sections_take_defaults() {
        let trip = TripRecord::from_api(api_trip()).unwrap();

        assert!(trip.driver.is_none());
        assert_eq!(trip.cab.vehicle_type, "Unknown");
        assert_eq!(trip.cab.model, "Unknown");
        assert_eq!(trip.cab.number, "N/A");
        assert_eq!(trip.cab.color, "White");
        assert_eq!(trip.cab.image, None);
        assert_eq!(trip.payment.total_amount, 0.0);
        assert_eq!(trip.current_location, None);
        assert!(trip.stops.is_empty());
    }

    #[test]
    fn empty_driver_fields_fall_back() {
        let mut api = api_trip();
        api.assigned_driver = Some(ApiDriver {
            name: Some("  ".to_string()),
            phone: Some("+91 98450 00000".to_string()),
            ..ApiDriver::default()
        });
        let driver = TripRecord::from_api(api).unwrap().driver.unwrap();
        assert_eq!(driver.name, "Not Assigned");
        assert_eq!(driver.phone, "+91 98450 00000");
        assert_eq!(driver.email, "N/A");
    }

    #[test]
    fn missing_pickup_coordinates_is_an_error() {
        let mut api = api_trip();
        api.pickup_coordinates = Some(json!({ "lat": null, "lng": 77.0 }));
        assert_eq!(
            TripRecord::from_api(api),
            Err(TripRecordError::MissingCoordinates {
                trip_id: "6982e014bbda598007f477a5".to_string(),
                field: "pickup",
            })
        );
    }

    #[test]
    fn stops_fall_back_to_pickups_and_skip_malformed_entries() {
        let mut api = api_trip();
        api.stops = Some(vec![]);
        api.pickups = Some(vec![
            json!({ "location": "MG Road", "coordinates": { "lat": 12.975, "lng": 77.606 } }),
            json!({ "address": "Hebbal", "lat": 13.035, "lng": 77.597 }),
            json!({ "location": "nowhere" }),
        ]);
        let trip = TripRecord::from_api(api).unwrap();
        assert_eq!(
            trip.stops,
            vec![
                Stop {
                    address: "MG Road".to_string(),
                    coordinates: LatLng::new(12.975, 77.606),
                },
                Stop {
                    address: "Hebbal".to_string(),
                    coordinates: LatLng::new(13.035, 77.597),
                },
            ]
        );
    }

    #[test]
    fn route_and_bounds_include_every_point() {
        let mut api = api_trip();
        api.driver_location = Some(json!({ "type": "Point", "coordinates": [77.50, 12.90] }));
        api.stops = Some(vec![json!({ "coordinates": { "lat": 13.05, "lng": 77.80 } })]);
        let trip = TripRecord::from_api(api).unwrap();

        assert_eq!(
            trip.route_path(),
            vec![
                LatLng::new(12.97, 77.59),
                LatLng::new(13.05, 77.80),
                LatLng::new(13.19, 77.70),
            ]
        );

        let bounds = trip.fit_bounds();
        assert_eq!(bounds.south_west, LatLng::new(12.90, 77.50));
        assert_eq!(bounds.north_east, LatLng::new(13.19, 77.80));
    }
}
