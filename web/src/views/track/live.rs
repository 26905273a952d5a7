use leptos::prelude::*;
use trip_types::LatLng;

/// Subscribes to the ride's push channel for as long as the calling component
/// lives, writing every usable driver position into `live_location`.
///
/// Leaves the tracking room and closes the connection on cleanup.
pub fn use_live_location(ride_id: String, live_location: RwSignal<Option<LatLng>>) {
    #[cfg(feature = "hydrate")]
    {
        use leptos::logging::{error, log};

        use crate::push::browser::PushChannel;
        use crate::push::ConnectionPayload;
        use crate::server::get_push_settings;

        let settings = LocalResource::new(|| get_push_settings());
        let channel = StoredValue::new_local(None::<PushChannel>);

        let subscribe_ride = ride_id.clone();
        Effect::new(move |_| {
            let Some(settings) = settings.get() else {
                return;
            };
            if channel.with_value(|channel| channel.is_some()) {
                return;
            }
            let settings = match settings.as_ref() {
                Ok(settings) => settings.clone(),
                Err(err) => {
                    error!("push settings unavailable, live tracking disabled: {err}");
                    return;
                }
            };

            let push = PushChannel::new(settings);
            let payload = ConnectionPayload::public_viewer(&subscribe_ride);
            if let Err(err) = push.initialize_connection(&payload) {
                error!("could not open push channel: {err}");
                return;
            }
            push.join_ride_tracking_room(&subscribe_ride);

            let listening = push.on_ride_location_update(move |update| {
                log!("live location update: {update:?}");
                if let Some(position) = update.position() {
                    live_location.set(Some(position));
                }
            });
            if let Err(err) = listening {
                error!("could not listen for location updates: {err}");
            }
            channel.set_value(Some(push));
        });

        on_cleanup(move || {
            if let Some(Some(push)) = channel.try_get_value() {
                push.leave_ride_tracking_room(&ride_id);
                push.disconnect();
            }
        });
    }

    #[cfg(not(feature = "hydrate"))]
    {
        let _ = (ride_id, live_location);
    }
}
