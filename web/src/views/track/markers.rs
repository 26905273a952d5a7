use leptos_leaflet::prelude::Position;
use trip_types::LatLng;

pub const PICKUP_FILL: &str = "%2310B981";
pub const DROP_FILL: &str = "%23EF4444";
pub const ROUTE_COLOR: &str = "#FF8C12";

pub const PIN_SIZE: (f64, f64) = (36.0, 48.0);
pub const PIN_ANCHOR: (f64, f64) = (18.0, 46.0);
pub const CAB_SIZE: (f64, f64) = (48.0, 48.0);
pub const CAB_ANCHOR: (f64, f64) = (24.0, 24.0);

pub fn to_position(point: LatLng) -> Position {
    Position::new(point.lat, point.lng)
}

/// Map pin with a one letter label, as an SVG data URL.
pub fn pin_icon(fill: &str, label: char) -> String {
    format!(
        "data:image/svg+xml,%3Csvg xmlns='http://www.w3.org/2000/svg' width='36' height='48' viewBox='0 0 24 32'%3E%3Cdefs%3E%3Cfilter id='shadow' x='-50%25' y='-50%25' width='200%25' height='200%25'%3E%3CfeDropShadow dx='0' dy='1' stdDeviation='1' flood-color='%23000' flood-opacity='0.3'/%3E%3C/filter%3E%3C/defs%3E%3Cpath fill='{fill}' stroke='%23ffffff' stroke-width='1.5' filter='url(%23shadow)' d='M12 2C7.03 2 3 6.03 3 11c0 6.75 9 19 9 19s9-12.25 9-19c0-4.97-4.03-9-9-9z'/%3E%3Ctext x='12' y='14.5' text-anchor='middle' font-family='Arial, sans-serif' font-size='9' font-weight='bold' fill='%23ffffff'%3E{label}%3C/text%3E%3C/svg%3E"
    )
}

/// Top-down taxi used for the live cab marker.
pub fn cab_icon() -> String {
    "data:image/svg+xml,%3Csvg xmlns='http://www.w3.org/2000/svg' width='48' height='48' viewBox='0 0 48 48'%3E%3Ccircle cx='24' cy='24' r='22' fill='%23ffffff' fill-opacity='0.85' stroke='%23FF8C12' stroke-width='2'/%3E%3Crect x='15' y='9' width='18' height='30' rx='6' fill='%23FACC15' stroke='%23111827' stroke-width='1.5'/%3E%3Crect x='17.5' y='14' width='13' height='6' rx='2' fill='%23111827'/%3E%3Crect x='17.5' y='29' width='13' height='5' rx='2' fill='%23111827'/%3E%3Crect x='20' y='22' width='8' height='4' rx='1' fill='%23111827'/%3E%3C/svg%3E".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pin_carries_fill_and_label() {
        let icon = pin_icon(PICKUP_FILL, 'A');
        assert!(icon.starts_with("data:image/svg+xml,"));
        assert!(icon.contains("fill='%2310B981'"));
        assert!(icon.contains("%3EA%3C/text%3E"));
        assert!(!icon.contains('#'));
    }

    #[test]
    fn cab_icon_is_url_safe() {
        assert!(!cab_icon().contains('#'));
        assert!(!cab_icon().contains('<'));
    }
}
