//! Engine.IO v4 / Socket.IO v5 text framing.
//!
//! Every websocket frame is one Engine.IO packet: a single type digit followed
//! by its payload. Socket.IO packets travel inside Engine.IO `message` packets
//! as `<type>[/namespace,][ack id][json]`.

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use super::PushError;

pub const DEFAULT_NAMESPACE: &str = "/";

/// Session parameters the server sends in the Engine.IO `open` packet.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    pub sid: String,
    pub ping_interval: u64,
    pub ping_timeout: u64,
    #[serde(default)]
    pub max_payload: Option<u64>,
}

impl Handshake {
    /// How long the client waits for the next server ping before it treats
    /// the session as dead.
    pub fn ping_deadline(&self) -> Duration {
        Duration::from_millis(self.ping_interval.saturating_add(self.ping_timeout))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EnginePacket {
    Open(Handshake),
    Close,
    Ping(String),
    Pong(String),
    Message(String),
    Upgrade,
    Noop,
}

impl EnginePacket {
    pub fn decode(frame: &str) -> Result<Self, PushError> {
        let mut chars = frame.chars();
        let kind = chars.next().ok_or(PushError::EmptyFrame)?;
        let payload = chars.as_str();

        Ok(match kind {
            '0' => EnginePacket::Open(
                serde_json::from_str(payload).map_err(|e| PushError::Payload(e.to_string()))?,
            ),
            '1' => EnginePacket::Close,
            '2' => EnginePacket::Ping(payload.to_string()),
            '3' => EnginePacket::Pong(payload.to_string()),
            '4' => EnginePacket::Message(payload.to_string()),
            '5' => EnginePacket::Upgrade,
            '6' => EnginePacket::Noop,
            // base64 encoded binary frames start with 'b'
            'b' => return Err(PushError::BinaryUnsupported),
            other => return Err(PushError::UnknownPacket(other)),
        })
    }

    /// Only the packets a client ever sends are encodable.
    pub fn encode(&self) -> String {
        match self {
            EnginePacket::Close => "1".to_string(),
            EnginePacket::Ping(data) => format!("2{data}"),
            EnginePacket::Pong(data) => format!("3{data}"),
            EnginePacket::Message(data) => format!("4{data}"),
            EnginePacket::Upgrade => "5".to_string(),
            EnginePacket::Noop => "6".to_string(),
            EnginePacket::Open(_) => "0".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    Connect {
        namespace: String,
        data: Option<Value>,
    },
    Disconnect {
        namespace: String,
    },
    Event {
        namespace: String,
        id: Option<u64>,
        event: String,
        args: Vec<Value>,
    },
    Ack {
        namespace: String,
        id: u64,
        args: Vec<Value>,
    },
    ConnectError {
        namespace: String,
        message: String,
    },
}

impl SocketPacket {
    pub fn connect() -> Self {
        SocketPacket::Connect {
            namespace: DEFAULT_NAMESPACE.to_string(),
            data: None,
        }
    }

    pub fn event(event: &str, data: Value) -> Self {
        SocketPacket::Event {
            namespace: DEFAULT_NAMESPACE.to_string(),
            id: None,
            event: event.to_string(),
            args: vec![data],
        }
    }

    pub fn namespace(&self) -> &str {
        match self {
            SocketPacket::Connect { namespace, .. }
            | SocketPacket::Disconnect { namespace }
            | SocketPacket::Event { namespace, .. }
            | SocketPacket::Ack { namespace, .. }
            | SocketPacket::ConnectError { namespace, .. } => namespace,
        }
    }

    pub fn decode(payload: &str) -> Result<Self, PushError> {
        let mut chars = payload.chars();
        let kind = chars.next().ok_or(PushError::EmptyFrame)?;
        let rest = chars.as_str();
        if matches!(kind, '5' | '6') {
            return Err(PushError::BinaryUnsupported);
        }

        let (namespace, rest) = match rest.strip_prefix('/') {
            Some(_) => match rest.split_once(',') {
                Some((namespace, rest)) => (namespace.to_string(), rest),
                None => (rest.to_string(), ""),
            },
            None => (DEFAULT_NAMESPACE.to_string(), rest),
        };

        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        let (id, json) = rest.split_at(digits);
        let id = if id.is_empty() {
            None
        } else {
            Some(id.parse::<u64>().map_err(|e| PushError::Payload(e.to_string()))?)
        };

        let data = if json.is_empty() {
            None
        } else {
            Some(serde_json::from_str::<Value>(json).map_err(|e| PushError::Payload(e.to_string()))?)
        };

        match kind {
            '0' => Ok(SocketPacket::Connect { namespace, data }),
            '1' => Ok(SocketPacket::Disconnect { namespace }),
            '2' => {
                let mut args = match data {
                    Some(Value::Array(args)) => args,
                    _ => return Err(PushError::Payload("event payload is not an array".into())),
                };
                if args.is_empty() {
                    return Err(PushError::Payload("event without a name".into()));
                }
                let event = match args.remove(0) {
                    Value::String(event) => event,
                    other => return Err(PushError::Payload(format!("event name {other}"))),
                };
                Ok(SocketPacket::Event {
                    namespace,
                    id,
                    event,
                    args,
                })
            }
            '3' => Ok(SocketPacket::Ack {
                namespace,
                id: id.ok_or_else(|| PushError::Payload("ack without id".into()))?,
                args: match data {
                    Some(Value::Array(args)) => args,
                    _ => Vec::new(),
                },
            }),
            '4' => Ok(SocketPacket::ConnectError {
                namespace,
                message: data
                    .as_ref()
                    .and_then(|d| d.get("message").and_then(Value::as_str).map(str::to_string))
                    .or_else(|| data.as_ref().and_then(|d| d.as_str().map(str::to_string)))
                    .unwrap_or_else(|| "connection refused".to_string()),
            }),
            other => Err(PushError::UnknownPacket(other)),
        }
    }

    pub fn encode(&self) -> String {
        let (kind, namespace) = match self {
            SocketPacket::Connect { namespace, .. } => ('0', namespace),
            SocketPacket::Disconnect { namespace } => ('1', namespace),
            SocketPacket::Event { namespace, .. } => ('2', namespace),
            SocketPacket::Ack { namespace, .. } => ('3', namespace),
            SocketPacket::ConnectError { namespace, .. } => ('4', namespace),
        };

        let mut out = String::from(kind);
        if namespace != DEFAULT_NAMESPACE {
            out.push_str(namespace);
            out.push(',');
        }

        match self {
            SocketPacket::Connect { data: Some(data), .. } => out.push_str(&data.to_string()),
            SocketPacket::Connect { data: None, .. } | SocketPacket::Disconnect { .. } => {}
            SocketPacket::Event { id, event, args, .. } => {
                if let Some(id) = id {
                    out.push_str(&id.to_string());
                }
                let mut array = Vec::with_capacity(args.len() + 1);
                array.push(Value::String(event.clone()));
                array.extend(args.iter().cloned());
                out.push_str(&Value::Array(array).to_string());
            }
            SocketPacket::Ack { id, args, .. } => {
                out.push_str(&id.to_string());
                out.push_str(&Value::Array(args.clone()).to_string());
            }
            SocketPacket::ConnectError { message, .. } => {
                out.push_str(&serde_json::json!({ "message": message }).to_string());
            }
        }
        out
    }

    /// Full websocket frame: the packet wrapped in an Engine.IO message.
    pub fn to_frame(&self) -> String {
        EnginePacket::Message(self.encode()).encode()
    }
}
