mod api;
mod format;
mod geo;
pub mod lenient;
mod trip;

pub use api::{ApiCab, ApiDriver, ApiEnvelope, ApiTrip, TripLookup};
pub use format::{format_amount, format_optional_timestamp, format_timestamp};
pub use geo::{normalize_location, Bounds, LatLng};
pub use trip::{
    CabInfo, DriverInfo, PaymentInfo, PaymentStatus, Stop, TripRecord, TripRecordError,
    TripStatus, Waypoint,
};
