use leptos::prelude::*;
use leptos_router::hooks::use_query_map;
use trip_types::{TripLookup, TripRecord};

use crate::{
    components::{LoadingScreen, ScreenTone, StatusScreen},
    server::{fetch_trip, load_error_message},
    views::track::{
        details::{DriverCabCard, PaymentCard, RouteCard, StatusBadge},
        live::use_live_location,
        trip_map::TripMap,
    },
};

/// Public page behind a shared tracking link: `/?tripId=<id>`.
#[component]
pub fn TrackingPage() -> impl IntoView {
    let query = use_query_map();
    let trip_id = Memo::new(move |_| query.with(|params| params.get("tripId")));

    let trip = LocalResource::new(move || fetch_trip(trip_id.get()));

    view! {
        <Suspense fallback=|| view! { <LoadingScreen /> }>
            {move || {
                trip.get().map(|result| match result.as_ref() {
                    Ok(TripLookup::Found(trip)) => {
                        leptos::logging::log!("tracking trip {} ({})", trip.booking_id, trip.status.as_str());
                        view! { <TripTracker trip=(**trip).clone() /> }.into_any()
                    }
                    Ok(TripLookup::NotFound(message)) => view! {
                        <StatusScreen
                            tone=ScreenTone::Neutral
                            title="Trip Not Found"
                            message=message.clone()
                        />
                    }.into_any(),
                    Err(err) => {
                        leptos::logging::error!("error fetching trip data: {err}");
                        view! {
                            <StatusScreen
                                tone=ScreenTone::Error
                                title="Error Loading"
                                message=load_error_message(err)
                            />
                        }.into_any()
                    }
                })
            }}
        </Suspense>
    }
}

#[component]
fn TripTracker(trip: TripRecord) -> impl IntoView {
    let live_location = RwSignal::new(trip.current_location);
    use_live_location(trip.id.clone(), live_location);

    view! {
        <div class="tracking-page">
            <header class="tracking-header">
                <div class="tracking-header-inner">
                    <div class="tracking-title">
                        <div class="tracking-logo">"🧭"</div>
                        <div>
                            <h1>"Live Trip Tracking"</h1>
                            <p class="tracking-subtitle">{format!("Trip ID: {}", trip.booking_id)}</p>
                        </div>
                    </div>
                    <StatusBadge status=trip.status.clone() />
                </div>
            </header>

            <main class="tracking-main">
                <section class="card map-card">
                    <TripMap trip=trip.clone() live_location=live_location />
                </section>

                <div class="details-grid">
                    <RouteCard trip=trip.clone() />
                    <div class="details-side">
                        <DriverCabCard driver=trip.driver.clone() cab=trip.cab.clone() />
                        <PaymentCard payment=trip.payment.clone() />
                    </div>
                </div>
            </main>
        </div>
    }
}
