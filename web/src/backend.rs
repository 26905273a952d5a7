use std::sync::OnceLock;

use trip_types::{ApiEnvelope, ApiTrip, TripLookup};

use crate::config::AppConfig;
use crate::error::TrackerError;

pub fn active_ride_url(config: &AppConfig, trip_id: &str) -> String {
    format!(
        "{}/activeRide/{}",
        config.backend_url.trim_end_matches('/'),
        urlencoding::encode(trip_id)
    )
}

static HTTP_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

/// Shared client for every backend call, built on first use with the
/// configured timeout.
pub fn http_client(config: &AppConfig) -> Result<&'static reqwest::Client, TrackerError> {
    if let Some(client) = HTTP_CLIENT.get() {
        return Ok(client);
    }
    let client = reqwest::Client::builder()
        .timeout(config.backend_timeout)
        .build()?;
    Ok(HTTP_CLIENT.get_or_init(|| client))
}

/// Single GET against the ride backend, normalized into a lookup result.
pub async fn load_trip(config: &AppConfig, trip_id: &str) -> Result<TripLookup, TrackerError> {
    let url = active_ride_url(config, trip_id);
    tracing::debug!(%url, "fetching trip");

    let response = http_client(config)?.get(&url).send().await?;

    let status = response.status();
    if !status.is_success() {
        tracing::warn!(trip_id, status = status.as_u16(), "backend rejected trip lookup");
        return Err(TrackerError::Status(status.as_u16()));
    }

    let envelope: ApiEnvelope<ApiTrip> = response.json().await?;
    let lookup = envelope.into_lookup()?;
    match &lookup {
        TripLookup::Found(trip) => {
            tracing::info!(trip_id, status = trip.status.as_str(), "trip loaded")
        }
        TripLookup::NotFound(message) => tracing::info!(trip_id, %message, "trip not found"),
    }
    Ok(lookup)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trip_id_is_escaped_into_the_path() {
        let config = AppConfig {
            backend_url: "https://rides.example.com/api/".to_string(),
            ..AppConfig::default()
        };
        assert_eq!(
            active_ride_url(&config, "abc/../x"),
            "https://rides.example.com/api/activeRide/abc%2F..%2Fx"
        );
    }

    #[test]
    fn lookups_share_one_client() {
        let config = AppConfig::default();
        let first = http_client(&config).unwrap();
        let second = http_client(&config).unwrap();
        assert!(std::ptr::eq(first, second));
    }
}
