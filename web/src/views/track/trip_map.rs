use leptos::prelude::*;
use leptos_leaflet::leaflet::Map;
use leptos_leaflet::prelude::*;
use trip_types::{LatLng, TripRecord, TripStatus};

use super::markers::{
    pin_icon, to_position, DROP_FILL, PICKUP_FILL, PIN_ANCHOR, PIN_SIZE, ROUTE_COLOR,
};

#[component]
pub fn TripMap(trip: TripRecord, live_location: RwSignal<Option<LatLng>>) -> impl IntoView {
    let map: JsRwSignal<Option<Map>> = JsRwSignal::new_local(None::<Map>);

    let center = live_location
        .get_untracked()
        .unwrap_or(trip.pickup.coordinates);
    let route: Vec<Position> = trip.route_path().into_iter().map(to_position).collect();
    let completed = trip.status == TripStatus::Completed;

    #[cfg(feature = "hydrate")]
    follow_cab(map, trip.fit_bounds(), live_location);

    view! {
        <div class="trip-map">
            <MapContainer
                class="trip-map-container"
                center=to_position(center)
                zoom=13.0
                set_view=true
                map=map.write_only()
            >
                <TileLayer
                    url="https://tile.openstreetmap.org/{z}/{x}/{y}.png"
                    attribution="&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors"
                />
                <Marker
                    position=to_position(trip.pickup.coordinates)
                    draggable=false
                    icon_url=Some(pin_icon(PICKUP_FILL, 'A'))
                    icon_size=Some(PIN_SIZE)
                    icon_anchor=Some(PIN_ANCHOR)
                />
                <Marker
                    position=to_position(trip.drop.coordinates)
                    draggable=false
                    icon_url=Some(pin_icon(DROP_FILL, 'B'))
                    icon_size=Some(PIN_SIZE)
                    icon_anchor=Some(PIN_ANCHOR)
                />
                {(route.len() >= 2).then(|| view! {
                    <Polyline positions=route color=ROUTE_COLOR weight=4.0 opacity=0.8 />
                })}
            </MapContainer>

            {completed.then(|| view! {
                <div class="trip-completed-overlay">
                    <span class="trip-completed-check">"✓"</span>
                    <span>"Trip Completed"</span>
                </div>
            })}
        </div>
    }
}

/// Fits the map to the trip once it exists, then keeps the cab marker and
/// the viewport on the latest live location.
#[cfg(feature = "hydrate")]
fn follow_cab(
    map: JsRwSignal<Option<Map>>,
    bounds: trip_types::Bounds,
    live_location: RwSignal<Option<LatLng>>,
) {
    use leptos_leaflet::leaflet;

    use super::markers::{cab_icon, CAB_ANCHOR, CAB_SIZE};
    use crate::animation::{GlideAnimator, MarkerGlide};

    fn to_lat_lng(point: LatLng) -> leaflet::LatLng {
        leaflet::LatLng::new(point.lat, point.lng)
    }

    let fitted = StoredValue::new(false);
    Effect::new(move |_| {
        let Some(map) = map.get() else {
            return;
        };
        if fitted.get_value() {
            return;
        }
        fitted.set_value(true);
        map.fit_bounds(&leaflet::LatLngBounds::new(
            &to_lat_lng(bounds.south_west),
            &to_lat_lng(bounds.north_east),
        ));
    });

    let cab_marker = StoredValue::new_local(None::<leaflet::Marker>);
    let shown = StoredValue::new(None::<LatLng>);
    let animator = StoredValue::new_local(GlideAnimator::new());

    Effect::new(move |_| {
        let target = live_location.get();
        let (Some(map), Some(target)) = (map.get(), target) else {
            return;
        };
        let previous = shown.get_value();
        shown.set_value(Some(target));

        match (cab_marker.get_value(), previous) {
            (Some(marker), Some(from)) => {
                animator.with_value(|animator| {
                    animator.start(MarkerGlide::new(from, target), move |position| {
                        marker.set_lat_lng(&to_lat_lng(position));
                    })
                });
            }
            (Some(marker), None) => {
                marker.set_lat_lng(&to_lat_lng(target));
            }
            (None, _) => {
                let icon_options = leaflet::IconOptions::new();
                icon_options.set_icon_url(cab_icon());
                icon_options.set_icon_size(leaflet::Point::new(CAB_SIZE.0, CAB_SIZE.1));
                icon_options.set_icon_anchor(leaflet::Point::new(CAB_ANCHOR.0, CAB_ANCHOR.1));
                let marker_options = leaflet::MarkerOptions::new();
                marker_options.set_icon(leaflet::Icon::new(&icon_options));

                let marker = leaflet::Marker::new_with_options(&to_lat_lng(target), &marker_options);
                marker.add_to(&map);
                cab_marker.set_value(Some(marker));
            }
        }

        map.pan_to(&to_lat_lng(target));
    });

    on_cleanup(move || {
        animator.try_with_value(|animator| animator.cancel());
    });
}
