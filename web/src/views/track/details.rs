use leptos::prelude::*;
use trip_types::{
    format_amount, format_optional_timestamp, CabInfo, DriverInfo, PaymentInfo, PaymentStatus,
    TripRecord, TripStatus, Waypoint,
};

pub fn status_badge_class(status: &TripStatus) -> Option<&'static str> {
    if status.is_live() {
        Some("status-badge status-live")
    } else if status.is_finished() {
        Some("status-badge status-finished")
    } else {
        None
    }
}

pub fn payment_badge_class(status: &PaymentStatus) -> &'static str {
    match status {
        PaymentStatus::Paid => "payment-badge payment-paid",
        PaymentStatus::AdvancePaid => "payment-badge payment-advance",
        PaymentStatus::Unpaid(_) => "payment-badge payment-unpaid",
    }
}

fn is_image_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://") || value.starts_with("data:")
}

#[component]
pub fn StatusBadge(status: TripStatus) -> impl IntoView {
    let live = status.is_live();
    status_badge_class(&status).map(|class| {
        view! {
            <div class=class>
                {live.then(|| view! { <span class="status-dot"></span> })}
                <span>{status.as_str().to_string()}</span>
            </div>
        }
    })
}

#[component]
fn WaypointRow(waypoint: Waypoint, label: &'static str, marker_class: &'static str) -> impl IntoView {
    view! {
        <div class="waypoint">
            <div class=format!("waypoint-marker {marker_class}")>
                <div class="waypoint-dot"></div>
            </div>
            <div class="waypoint-body">
                <p class="waypoint-label">{label}</p>
                <p class="waypoint-address">{waypoint.address}</p>
                <p class="waypoint-time">
                    "🕒 " {format_optional_timestamp(waypoint.time.as_deref())}
                </p>
            </div>
        </div>
    }
}

#[component]
pub fn RouteCard(trip: TripRecord) -> impl IntoView {
    view! {
        <section class="card route-card">
            <h2 class="card-title">"📍 Trip Route"</h2>

            <div class="waypoints">
                <WaypointRow waypoint=trip.pickup label="Pickup Location" marker_class="pickup" />
                {trip.stops.into_iter().enumerate().map(|(index, stop)| view! {
                    <div class="waypoint waypoint-stop">
                        <div class="waypoint-marker stop">
                            <div class="waypoint-dot"></div>
                        </div>
                        <div class="waypoint-body">
                            <p class="waypoint-label">{format!("Stop {}", index + 1)}</p>
                            <p class="waypoint-address">{stop.address}</p>
                        </div>
                    </div>
                }).collect_view()}
                <WaypointRow waypoint=trip.drop label="Drop Location" marker_class="drop" />
            </div>

            <div class="trip-info">
                <div class="trip-info-tile ride-type">
                    <p class="tile-label">"Ride Type"</p>
                    <p class="tile-value">{trip.ride_type}</p>
                </div>
                <div class="trip-info-tile booking-type">
                    <p class="tile-label">"Booking Type"</p>
                    <p class="tile-value">{trip.booking_type}</p>
                </div>
            </div>
        </section>
    }
}

#[component]
pub fn DriverCabCard(driver: Option<DriverInfo>, cab: CabInfo) -> impl IntoView {
    view! {
        <section class="card driver-card">
            <h2 class="card-title">"👤 Driver & Cab Details"</h2>

            {driver.map(|driver| {
                let initial = driver.name.chars().next().unwrap_or('D').to_string();
                view! {
                    <div class="driver">
                        {if is_image_url(&driver.image) {
                            view! {
                                <img class="driver-photo" src=driver.image.clone() alt=driver.name.clone() />
                            }.into_any()
                        } else {
                            view! { <div class="driver-initial">{initial}</div> }.into_any()
                        }}
                        <div>
                            <p class="driver-label">"Driver"</p>
                            <p class="driver-name">{driver.name}</p>
                            <p class="driver-phone">{driver.phone}</p>
                        </div>
                    </div>
                }
            })}

            <div class="cab">
                {cab.image.map(|image| view! {
                    <img class="cab-photo" src=image alt="Cab" />
                })}
                <div class="cab-vehicle">
                    <span class="cab-icon">"🚕"</span>
                    <div>
                        <p class="cab-label">"Vehicle"</p>
                        <p class="cab-model">{format!("{} ({})", cab.model, cab.vehicle_type)}</p>
                    </div>
                </div>
                <div class="cab-plate">
                    <p class="cab-label">"Vehicle Number"</p>
                    <p class="cab-number">{cab.number}</p>
                </div>
            </div>
        </section>
    }
}

#[component]
pub fn PaymentCard(payment: PaymentInfo) -> impl IntoView {
    view! {
        <section class="card payment-card">
            <h2 class="card-title">"💳 Payment Details"</h2>

            <div class="payment-rows">
                <div class="payment-row">
                    <span>"Payment Status"</span>
                    <span class=payment_badge_class(&payment.status)>
                        {payment.status.as_str().to_string()}
                    </span>
                </div>
                <div class="payment-row">
                    <span>"Total Amount"</span>
                    <span class="payment-amount">{format_amount(payment.total_amount)}</span>
                </div>
                <div class="payment-row">
                    <span>"Advance Paid"</span>
                    <span class="payment-amount payment-advance-amount">
                        {format_amount(payment.advance_amount)}
                    </span>
                </div>
                <div class="payment-remaining">
                    <span>"Remaining"</span>
                    <span class="payment-remaining-amount">
                        {format_amount(payment.pending_amount)}
                    </span>
                </div>
            </div>
        </section>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trip_status_badges() {
        assert_eq!(
            status_badge_class(&TripStatus::RideStarted),
            Some("status-badge status-live")
        );
        assert_eq!(
            status_badge_class(&TripStatus::Dropped),
            Some("status-badge status-finished")
        );
        assert_eq!(
            status_badge_class(&TripStatus::Other("Driver Assigned".into())),
            None
        );
    }

    #[test]
    fn payment_badges() {
        assert_eq!(payment_badge_class(&PaymentStatus::Paid), "payment-badge payment-paid");
        assert_eq!(
            payment_badge_class(&PaymentStatus::AdvancePaid),
            "payment-badge payment-advance"
        );
        assert_eq!(
            payment_badge_class(&PaymentStatus::Unpaid("Pending".into())),
            "payment-badge payment-unpaid"
        );
    }

    #[test]
    fn placeholder_images_are_not_rendered() {
        assert!(is_image_url("https://cdn.example.com/d.jpg"));
        assert!(!is_image_url("N/A"));
    }
}
