use thiserror::Error;
use trip_types::TripRecordError;

/// Failures while loading a trip from the ride backend.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[cfg(feature = "ssr")]
    #[error("backend request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Failed to fetch trip data (HTTP {0})")]
    Status(u16),
    #[error(transparent)]
    Record(#[from] TripRecordError),
}
