//! Wire shapes returned by the ride backend's `activeRide` endpoint.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::lenient;
use crate::trip::{TripRecord, TripRecordError};

#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

/// Outcome of a trip lookup once the backend answered.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum TripLookup {
    Found(Box<TripRecord>),
    NotFound(String),
}

impl ApiEnvelope<ApiTrip> {
    pub fn into_lookup(self) -> Result<TripLookup, TripRecordError> {
        match (self.success, self.data) {
            (true, Some(trip)) => Ok(TripLookup::Found(Box::new(TripRecord::from_api(trip)?))),
            _ => Ok(TripLookup::NotFound(
                self.message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| "Trip not found".to_string()),
            )),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ApiTrip {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub booking_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub pickup_location: Option<String>,
    pub pickup_coordinates: Option<Value>,
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub drop_location: Option<String>,
    pub drop_coordinates: Option<Value>,
    pub trip_start_time: Option<String>,
    pub trip_end_time: Option<String>,
    pub assigned_driver: Option<ApiDriver>,
    pub cab_details: Option<ApiCab>,
    #[serde(default, deserialize_with = "lenient::optional_number")]
    pub advance_amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient::optional_number")]
    pub pending_amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient::optional_number")]
    pub total_amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub payment_status: Option<String>,
    pub driver_location: Option<Value>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub ride_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub booking_type: Option<String>,
    pub stops: Option<Vec<Value>>,
    pub pickups: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ApiDriver {
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub email: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ApiCab {
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub vehicle_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub vehicle_variant: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub vehicle_number: Option<String>,
    pub cab_image: Option<String>,
}
