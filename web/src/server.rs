use leptos::prelude::*;
use leptos::server;
use trip_types::TripLookup;

use crate::push::PushSettings;

/// Shown to the rider whenever the backend lookup itself fails.
pub const FETCH_FAILED: &str = "Failed to fetch trip data";

/// Message for the error screen: what the server function said, without the
/// transport prefix.
pub fn load_error_message(err: &ServerFnError) -> String {
    match err {
        ServerFnError::ServerError(message) => message.clone(),
        _ => FETCH_FAILED.to_string(),
    }
}

/// Looks up the trip behind a tracking link. A missing id falls back to the
/// configured default trip.
#[server]
pub async fn fetch_trip(trip_id: Option<String>) -> Result<TripLookup, ServerFnError> {
    use crate::backend::load_trip;
    use crate::config::get_config;

    let config = get_config();
    let Some(trip_id) = trip_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .or_else(|| config.default_trip_id.clone())
    else {
        return Ok(TripLookup::NotFound(
            "This tracking link does not name a trip".to_string(),
        ));
    };

    load_trip(config, &trip_id).await.map_err(|e| {
        tracing::error!(%trip_id, error = %e, "trip lookup failed");
        ServerFnError::new(FETCH_FAILED)
    })
}

#[server]
pub async fn get_push_settings() -> Result<PushSettings, ServerFnError> {
    Ok(crate::config::get_config().push.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_screen_shows_the_server_message_only() {
        let err: ServerFnError = ServerFnError::new(FETCH_FAILED);
        assert_eq!(load_error_message(&err), FETCH_FAILED);
    }

    #[test]
    fn transport_failures_read_as_a_failed_fetch() {
        let err: ServerFnError = ServerFnError::Request("connection refused".to_string());
        assert_eq!(load_error_message(&err), FETCH_FAILED);
    }
}
