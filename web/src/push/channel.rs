use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use serde_json::Value;

use super::events::JOIN_RIDE_ROOM;
use super::packet::{EnginePacket, Handshake, SocketPacket, DEFAULT_NAMESPACE};
use super::{PushError, ReconnectPolicy};

const SOCKET_IO_PATH: &str = "/socket.io/";
/// Emits held back while the namespace handshake is pending.
pub const OUTBOX_LIMIT: usize = 64;

/// Builds the websocket URL for an Engine.IO v4 session.
///
/// `http`/`https` bases are switched to `ws`/`wss`; any path on the base is
/// kept as a prefix in front of `/socket.io/`.
pub fn handshake_url(base: &str, query: &[(&str, &str)]) -> Result<String, PushError> {
    let base = base.trim();
    let (scheme, rest) = base
        .split_once("://")
        .ok_or_else(|| PushError::InvalidUrl(base.to_string()))?;
    let scheme = match scheme.to_ascii_lowercase().as_str() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        _ => return Err(PushError::InvalidUrl(base.to_string())),
    };
    let rest = rest.trim_end_matches('/');
    if rest.is_empty() {
        return Err(PushError::InvalidUrl(base.to_string()));
    }

    let mut url = format!("{scheme}://{rest}{SOCKET_IO_PATH}?EIO=4&transport=websocket");
    for (key, value) in query {
        url.push('&');
        url.push_str(&urlencoding::encode(key));
        url.push('=');
        url.push_str(&urlencoding::encode(value));
    }
    Ok(url)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    /// Websocket requested, waiting for the Engine.IO open packet.
    Opening,
    /// Engine.IO session up, waiting for the namespace connect ack.
    Handshaking,
    Connected,
    Closed,
}

/// What the socket binding has to do after feeding the core.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Send(String),
    Dispatch { event: String, payload: Value },
    Connected,
    ConnectError(String),
    Disconnected(String),
    /// (Re)start the heartbeat timer; the session is dead if it fires.
    ArmHeartbeat(Duration),
}

/// Connection state machine for one push channel, independent of the
/// websocket implementation.
#[derive(Debug)]
pub struct ChannelCore {
    state: ConnectionState,
    policy: ReconnectPolicy,
    attempt: u32,
    handshake: Option<Handshake>,
    gave_up: bool,
    outbox: VecDeque<String>,
    tracked_rooms: Vec<String>,
    connected_once: bool,
    closed_on_purpose: bool,
}

impl ChannelCore {
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            state: ConnectionState::Idle,
            policy,
            attempt: 0,
            handshake: None,
            gave_up: false,
            outbox: VecDeque::new(),
            tracked_rooms: Vec::new(),
            connected_once: false,
            closed_on_purpose: false,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// Called whenever a websocket is (re)opened.
    pub fn opening(&mut self) {
        self.state = ConnectionState::Opening;
        self.closed_on_purpose = false;
        self.gave_up = false;
        self.handshake = None;
    }

    fn session_open(&self) -> bool {
        matches!(
            self.state,
            ConnectionState::Handshaking | ConnectionState::Connected
        )
    }

    fn heartbeat(&self) -> Option<Action> {
        self.handshake
            .as_ref()
            .map(|handshake| Action::ArmHeartbeat(handshake.ping_deadline()))
    }

    pub fn on_frame(&mut self, frame: &str) -> Result<Vec<Action>, PushError> {
        match EnginePacket::decode(frame)? {
            EnginePacket::Open(handshake) => {
                self.state = ConnectionState::Handshaking;
                self.handshake = Some(handshake);
                let mut actions = vec![Action::Send(SocketPacket::connect().to_frame())];
                actions.extend(self.heartbeat());
                Ok(actions)
            }
            EnginePacket::Ping(data) => {
                let mut actions = vec![Action::Send(EnginePacket::Pong(data).encode())];
                actions.extend(self.heartbeat());
                Ok(actions)
            }
            EnginePacket::Close => {
                self.state = ConnectionState::Closed;
                Ok(vec![Action::Disconnected("transport close".to_string())])
            }
            EnginePacket::Pong(_) | EnginePacket::Upgrade | EnginePacket::Noop => Ok(Vec::new()),
            EnginePacket::Message(payload) => self.on_packet(SocketPacket::decode(&payload)?),
        }
    }

    fn on_packet(&mut self, packet: SocketPacket) -> Result<Vec<Action>, PushError> {
        if packet.namespace() != DEFAULT_NAMESPACE {
            return Ok(Vec::new());
        }

        Ok(match packet {
            SocketPacket::Connect { .. } => {
                let mut actions = vec![Action::Connected];
                if self.connected_once {
                    actions.extend(self.tracked_rooms.iter().map(|ride_id| {
                        Action::Send(
                            SocketPacket::event(JOIN_RIDE_ROOM, Value::String(ride_id.clone()))
                                .to_frame(),
                        )
                    }));
                }
                actions.extend(self.outbox.drain(..).map(Action::Send));
                self.state = ConnectionState::Connected;
                self.attempt = 0;
                self.connected_once = true;
                actions
            }
            SocketPacket::ConnectError { message, .. } => vec![Action::ConnectError(message)],
            SocketPacket::Disconnect { .. } => {
                // the server kicked us; do not fight it with reconnects
                self.closed_on_purpose = true;
                self.state = ConnectionState::Closed;
                vec![Action::Disconnected("io server disconnect".to_string())]
            }
            SocketPacket::Event { event, args, .. } => vec![Action::Dispatch {
                event,
                payload: args.into_iter().next().unwrap_or(Value::Null),
            }],
            SocketPacket::Ack { .. } => Vec::new(),
        })
    }

    /// The heartbeat timer fired without a ping in between. Stale timers
    /// for a session that already ended are ignored.
    pub fn on_ping_timeout(&mut self) -> Vec<Action> {
        if !self.session_open() {
            return Vec::new();
        }
        self.state = ConnectionState::Closed;
        vec![Action::Disconnected("ping timeout".to_string())]
    }

    /// Returns the frame to send now, or buffers it until the namespace
    /// handshake completes.
    pub fn emit(&mut self, event: &str, data: Value) -> Result<Option<String>, PushError> {
        if self.state == ConnectionState::Closed && (self.gave_up || self.closed_on_purpose) {
            return Err(PushError::ChannelDown);
        }

        let frame = SocketPacket::event(event, data).to_frame();
        if let Some(max) = self.handshake.as_ref().and_then(|h| h.max_payload) {
            if frame.len() as u64 > max {
                return Err(PushError::PayloadTooLarge {
                    len: frame.len(),
                    max,
                });
            }
        }

        if self.is_connected() {
            return Ok(Some(frame));
        }
        if self.outbox.len() >= OUTBOX_LIMIT {
            return Err(PushError::OutboxFull(OUTBOX_LIMIT));
        }
        self.outbox.push_back(frame);
        Ok(None)
    }

    /// Remembers a ride room so it is joined again after a reconnect.
    pub fn track_room(&mut self, ride_id: &str) {
        if !self.tracked_rooms.iter().any(|r| r == ride_id) {
            self.tracked_rooms.push(ride_id.to_string());
        }
    }

    pub fn untrack_room(&mut self, ride_id: &str) {
        self.tracked_rooms.retain(|r| r != ride_id);
    }

    /// The websocket went away. Returns the delay before the next attempt, or
    /// `None` when the channel should stay down.
    pub fn on_transport_closed(&mut self) -> Option<Duration> {
        self.state = ConnectionState::Closed;
        if self.closed_on_purpose {
            return None;
        }
        let Some(delay) = self.policy.delay_for(self.attempt) else {
            self.gave_up = true;
            self.outbox.clear();
            return None;
        };
        self.attempt += 1;
        Some(delay)
    }

    /// Client initiated disconnect. Returns the farewell frame if the
    /// namespace was connected.
    pub fn close(&mut self) -> Option<String> {
        let was_connected = self.is_connected();
        self.closed_on_purpose = true;
        self.state = ConnectionState::Closed;
        self.outbox.clear();
        self.tracked_rooms.clear();
        was_connected.then(|| {
            SocketPacket::Disconnect {
                namespace: DEFAULT_NAMESPACE.to_string(),
            }
            .to_frame()
        })
    }
}

/// One listener per event name; registering again replaces the old one.
#[derive(Debug)]
pub struct ListenerRegistry<F> {
    listeners: HashMap<String, F>,
}

impl<F> Default for ListenerRegistry<F> {
    fn default() -> Self {
        Self {
            listeners: HashMap::new(),
        }
    }
}

impl<F> ListenerRegistry<F> {
    /// Returns the listener that was replaced, if any.
    pub fn on(&mut self, event: &str, listener: F) -> Option<F> {
        self.listeners.insert(event.to_string(), listener)
    }

    pub fn off(&mut self, event: &str) -> Option<F> {
        self.listeners.remove(event)
    }

    pub fn get(&self, event: &str) -> Option<&F> {
        self.listeners.get(event)
    }

    pub fn clear(&mut self) -> usize {
        let removed = self.listeners.len();
        self.listeners.clear();
        removed
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const OPEN: &str =
        r#"0{"sid":"x1","upgrades":[],"pingInterval":25000,"pingTimeout":20000,"maxPayload":1000000}"#;

    fn connected_core() -> ChannelCore {
        let mut core = ChannelCore::new(ReconnectPolicy::default());
        core.opening();
        core.on_frame(OPEN).unwrap();
        core.on_frame(r#"40{"sid":"ns1"}"#).unwrap();
        core
    }

    #[test]
    fn handshake_url_switches_scheme_and_encodes_query() {
        let url = handshake_url(
            "https://cab-booking.example.com/",
            &[("role", "public"), ("rideId", "6982e014 bb&")],
        )
        .unwrap();
        assert_eq!(
            url,
            "wss://cab-booking.example.com/socket.io/?EIO=4&transport=websocket&role=public&rideId=6982e014%20bb%26"
        );
        assert_eq!(
            handshake_url("http://localhost:9000/api", &[]).unwrap(),
            "ws://localhost:9000/api/socket.io/?EIO=4&transport=websocket"
        );
    }

    #[test]
    fn handshake_url_rejects_other_schemes() {
        assert!(matches!(
            handshake_url("ftp://example.com", &[]),
            Err(PushError::InvalidUrl(_))
        ));
        assert!(matches!(handshake_url("example.com", &[]), Err(PushError::InvalidUrl(_))));
        assert!(matches!(handshake_url("https://", &[]), Err(PushError::InvalidUrl(_))));
    }

    #[test]
    fn open_packet_triggers_namespace_connect() {
        let mut core = ChannelCore::new(ReconnectPolicy::default());
        core.opening();
        assert_eq!(
            core.on_frame(OPEN).unwrap(),
            vec![
                Action::Send("40".into()),
                Action::ArmHeartbeat(Duration::from_millis(45_000)),
            ]
        );
        assert_eq!(core.state(), ConnectionState::Handshaking);
    }

    #[test]
    fn emits_before_connect_are_flushed_in_order() {
        let mut core = ChannelCore::new(ReconnectPolicy::default());
        core.opening();
        assert_eq!(core.emit("joinRideRoom", json!("r1")), Ok(None));
        assert_eq!(core.emit("hello", json!({ "a": 1 })), Ok(None));
        core.on_frame(OPEN).unwrap();

        let actions = core.on_frame("40").unwrap();
        assert_eq!(
            actions,
            vec![
                Action::Connected,
                Action::Send(r#"42["joinRideRoom","r1"]"#.into()),
                Action::Send(r#"42["hello",{"a":1}]"#.into()),
            ]
        );
        assert!(core.is_connected());
        assert_eq!(
            core.emit("leaveRideRoom", json!("r1")),
            Ok(Some(r#"42["leaveRideRoom","r1"]"#.into()))
        );
    }

    #[test]
    fn ping_gets_pong_and_events_dispatch() {
        let mut core = connected_core();
        assert_eq!(
            core.on_frame("2").unwrap(),
            vec![
                Action::Send("3".into()),
                Action::ArmHeartbeat(Duration::from_millis(45_000)),
            ]
        );
        assert_eq!(
            core.on_frame(r#"42["updateDriverLocation",{"lat":1.5,"lng":2.5}]"#).unwrap(),
            vec![Action::Dispatch {
                event: "updateDriverLocation".into(),
                payload: json!({ "lat": 1.5, "lng": 2.5 }),
            }]
        );
        assert_eq!(core.on_frame(r#"42/admin,["secret",1]"#).unwrap(), vec![]);
    }

    #[test]
    fn lost_transport_reconnects_with_backoff_and_rejoins_rooms() {
        let mut core = connected_core();
        core.track_room("r1");

        assert_eq!(core.on_transport_closed(), Some(Duration::from_millis(1000)));
        assert_eq!(core.on_transport_closed(), Some(Duration::from_millis(2000)));

        core.opening();
        core.on_frame(OPEN).unwrap();
        let actions = core.on_frame("40").unwrap();
        assert_eq!(
            actions,
            vec![
                Action::Connected,
                Action::Send(r#"42["joinRideRoom","r1"]"#.into()),
            ]
        );
        // a successful connect resets the backoff
        assert_eq!(core.on_transport_closed(), Some(Duration::from_millis(1000)));
    }

    #[test]
    fn reconnect_gives_up_after_the_configured_attempts() {
        let mut core = connected_core();
        let delays: Vec<_> = std::iter::from_fn(|| core.on_transport_closed()).collect();
        assert_eq!(delays.len(), 5);
        assert_eq!(core.on_transport_closed(), None);
    }

    #[test]
    fn missed_ping_drops_the_session_and_reconnects() {
        let mut core = connected_core();
        core.track_room("r1");

        assert_eq!(
            core.on_ping_timeout(),
            vec![Action::Disconnected("ping timeout".into())]
        );
        assert!(!core.is_connected());
        assert_eq!(core.on_transport_closed(), Some(Duration::from_millis(1000)));

        // a timer left over from the dead session changes nothing
        assert_eq!(core.on_ping_timeout(), vec![]);

        core.opening();
        assert_eq!(core.on_ping_timeout(), vec![]);
        core.on_frame(OPEN).unwrap();
        assert_eq!(
            core.on_frame("40").unwrap(),
            vec![
                Action::Connected,
                Action::Send(r#"42["joinRideRoom","r1"]"#.into()),
            ]
        );
    }

    #[test]
    fn emits_fail_once_reconnection_gives_up() {
        let mut core = connected_core();
        while core.on_transport_closed().is_some() {}

        assert_eq!(
            core.emit("joinRideRoom", json!("r1")),
            Err(PushError::ChannelDown)
        );

        let mut core = connected_core();
        core.close();
        assert_eq!(core.emit("hello", json!(1)), Err(PushError::ChannelDown));
    }

    #[test]
    fn pending_emits_are_capped() {
        let mut core = ChannelCore::new(ReconnectPolicy::default());
        core.opening();
        for n in 0..OUTBOX_LIMIT {
            assert_eq!(core.emit("tick", json!(n)), Ok(None));
        }
        assert_eq!(
            core.emit("tick", json!("late")),
            Err(PushError::OutboxFull(OUTBOX_LIMIT))
        );
    }

    #[test]
    fn frames_over_the_server_limit_are_refused() {
        let mut core = ChannelCore::new(ReconnectPolicy::default());
        core.opening();
        core.on_frame(r#"0{"sid":"x2","pingInterval":25000,"pingTimeout":20000,"maxPayload":32}"#)
            .unwrap();
        core.on_frame("40").unwrap();

        assert!(matches!(
            core.emit("driverLiveLocation", json!({ "rideId": "6982e014bbda598007f477a5" })),
            Err(PushError::PayloadTooLarge { max: 32, .. })
        ));
        assert_eq!(core.emit("ok", json!(1)), Ok(Some(r#"42["ok",1]"#.into())));
    }

    #[test]
    fn server_disconnect_and_manual_close_do_not_reconnect() {
        let mut core = connected_core();
        assert_eq!(
            core.on_frame("41").unwrap(),
            vec![Action::Disconnected("io server disconnect".into())]
        );
        assert_eq!(core.on_transport_closed(), None);

        let mut core = connected_core();
        assert_eq!(core.close(), Some("41".into()));
        assert_eq!(core.on_transport_closed(), None);
        assert_eq!(core.close(), None);
    }

    #[test]
    fn connect_error_is_reported() {
        let mut core = ChannelCore::new(ReconnectPolicy::default());
        core.opening();
        core.on_frame(OPEN).unwrap();
        assert_eq!(
            core.on_frame(r#"44{"message":"invalid ride"}"#).unwrap(),
            vec![Action::ConnectError("invalid ride".into())]
        );
        assert!(!core.is_connected());
    }

    #[test]
    fn registry_keeps_one_listener_per_event() {
        let mut registry = ListenerRegistry::default();
        assert_eq!(registry.on("updateDriverLocation", 1), None);
        assert_eq!(registry.on("updateDriverLocation", 2), Some(1));
        assert_eq!(registry.on("messageDeleted", 3), None);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("updateDriverLocation"), Some(&2));

        assert_eq!(registry.off("updateDriverLocation"), Some(2));
        assert_eq!(registry.off("updateDriverLocation"), None);
        assert_eq!(registry.clear(), 1);
        assert!(registry.is_empty());
    }
}
