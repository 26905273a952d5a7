use std::time::Duration;

use super::PushSettings;

/// Exponential backoff between reconnection attempts, capped at `delay_max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconnectPolicy {
    pub enabled: bool,
    pub delay: Duration,
    pub delay_max: Duration,
    pub attempts: u32,
}

impl ReconnectPolicy {
    /// Delay before attempt `attempt` (0-based), `None` once attempts run out.
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        if !self.enabled || attempt >= self.attempts {
            return None;
        }
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        Some(self.delay.saturating_mul(factor).min(self.delay_max))
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        ReconnectPolicy::from(&PushSettings::default())
    }
}

impl From<&PushSettings> for ReconnectPolicy {
    fn from(settings: &PushSettings) -> Self {
        Self {
            enabled: settings.reconnection,
            delay: Duration::from_millis(settings.reconnection_delay_ms),
            delay_max: Duration::from_millis(
                settings
                    .reconnection_delay_max_ms
                    .max(settings.reconnection_delay_ms),
            ),
            attempts: settings.reconnection_attempts,
        }
    }
}
