use chrono::DateTime;

/// Renders an RFC 3339 timestamp as `16 Oct 2026, 09:05 AM` in the offset it
/// was sent with. Anything that does not parse is shown verbatim.
pub fn format_timestamp(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw.trim()) {
        Ok(timestamp) => timestamp.format("%d %b %Y, %I:%M %p").to_string(),
        Err(_) => raw.to_string(),
    }
}

pub fn format_optional_timestamp(raw: Option<&str>) -> String {
    raw.filter(|s| !s.trim().is_empty())
        .map(format_timestamp)
        .unwrap_or_else(|| "--".to_string())
}

/// Rupee amount, decimals only when the amount has paise.
pub fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("₹{:.0}", amount)
    } else {
        format!("₹{:.2}", amount)
    }
}
