//! Push channel used to receive live driver locations for one ride.
//!
//! `packet` and `channel` are plain Rust and hold every decision the channel
//! makes. `browser` binds them to a `web_sys::WebSocket` in the hydrated app.

#[cfg(feature = "hydrate")]
pub mod browser;
pub mod channel;
pub mod events;
pub mod packet;
pub mod reconnect;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use channel::{handshake_url, Action, ChannelCore, ListenerRegistry};
pub use events::{ConnectionPayload, DriverLiveLocation, LocationUpdate};
pub use reconnect::ReconnectPolicy;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PushError {
    #[error("empty frame")]
    EmptyFrame,
    #[error("unknown packet type {0:?}")]
    UnknownPacket(char),
    #[error("binary packets are not supported")]
    BinaryUnsupported,
    #[error("malformed packet payload: {0}")]
    Payload(String),
    #[error("invalid push channel url {0:?}")]
    InvalidUrl(String),
    #[error("socket not initialized")]
    NotInitialized,
    #[error("websocket error: {0}")]
    Socket(String),
    #[error("push channel is down and will not reconnect")]
    ChannelDown,
    #[error("{0} frames already waiting for the connection")]
    OutboxFull(usize),
    #[error("frame of {len} bytes exceeds the server limit of {max}")]
    PayloadTooLarge { len: usize, max: u64 },
}

/// Connection settings handed to the browser by the server.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PushSettings {
    pub url: String,
    pub reconnection: bool,
    pub reconnection_delay_ms: u64,
    pub reconnection_delay_max_ms: u64,
    pub reconnection_attempts: u32,
}

impl Default for PushSettings {
    fn default() -> Self {
        Self {
            url: "http://localhost:9000".to_string(),
            reconnection: true,
            reconnection_delay_ms: 1000,
            reconnection_delay_max_ms: 5000,
            reconnection_attempts: 5,
        }
    }
}
