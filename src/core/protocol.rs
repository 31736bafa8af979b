//! Relay message protocol definitions
//!
//! Every frame is a UTF-8 text frame carrying one JSON object. The relay only
//! looks at the `type` discriminator, and at `room` / `userName` for joins;
//! everything else is forwarded to the other room members untouched.
//!
//! ## Client → Server Messages
//!
//! ```json
//! // Join (or create) a room
//! {"type": "join", "room": "r1", "userName": "alice"}
//!
//! // Anything else is relayed verbatim to the other members of the room
//! {"type": "offer", "sdp": "..."}
//! ```
//!
//! ## Server → Client Messages
//!
//! ```json
//! // Sent only to the joining connection
//! {"type": "joined", "room": "r1"}
//!
//! // Sent to the members already in the room
//! {"type": "user-joined", "userName": "bob"}
//!
//! // Sent to the remaining members when someone disconnects
//! {"type": "user-left", "userName": "alice"}
//! ```

use crate::core::error::DecodeError;
use axum::extract::ws::{Message, Utf8Bytes};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Display name recorded when a join carries no usable `userName`
pub const DEFAULT_USER_NAME: &str = "Anonymous";

/// Discriminator of the only message type the relay interprets
pub const JOIN_TYPE: &str = "join";

/// A decoded client frame
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    /// Join a room, creating it if it does not exist yet
    Join {
        /// Room identifier, case-sensitive and not validated
        room: String,
        /// Display name announced to the other members
        user_name: String,
    },
    /// Any other message type, forwarded as-is
    Relay(RelayFrame),
}

impl InboundMessage {
    /// Decode one text frame
    ///
    /// Unknown message types are not an error: they become [`InboundMessage::Relay`].
    pub fn decode(text: Utf8Bytes) -> Result<Self, DecodeError> {
        let fields = match serde_json::from_str::<Value>(text.as_str())? {
            Value::Object(fields) => fields,
            other => return Err(DecodeError::NotAnObject(json_kind(&other))),
        };

        let message_type = match fields.get("type") {
            None | Some(Value::Null) => None,
            Some(Value::String(t)) => Some(t.clone()),
            Some(_) => return Err(DecodeError::InvalidType),
        };

        if message_type.as_deref() == Some(JOIN_TYPE) {
            let room = match fields.get("room") {
                Some(Value::String(room)) => room.clone(),
                _ => {
                    return Err(DecodeError::InvalidField {
                        message_type: JOIN_TYPE,
                        field: "room",
                    });
                }
            };

            let user_name = match fields.get("userName") {
                None | Some(Value::Null) => DEFAULT_USER_NAME.to_string(),
                Some(Value::String(name)) if name.is_empty() => DEFAULT_USER_NAME.to_string(),
                Some(Value::String(name)) => name.clone(),
                Some(_) => {
                    return Err(DecodeError::InvalidField {
                        message_type: JOIN_TYPE,
                        field: "userName",
                    });
                }
            };

            return Ok(InboundMessage::Join { room, user_name });
        }

        Ok(InboundMessage::Relay(RelayFrame {
            message_type,
            frame: OutboundFrame(text),
        }))
    }

    /// The `type` discriminator, for logging
    pub fn message_type(&self) -> &str {
        match self {
            InboundMessage::Join { .. } => JOIN_TYPE,
            InboundMessage::Relay(frame) => frame.message_type(),
        }
    }
}

/// An application message the relay does not interpret
///
/// The original text is kept so peers receive exactly the bytes the sender
/// wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayFrame {
    message_type: Option<String>,
    frame: OutboundFrame,
}

impl RelayFrame {
    /// The `type` discriminator, or `"<untyped>"` when the sender omitted it
    pub fn message_type(&self) -> &str {
        self.message_type.as_deref().unwrap_or("<untyped>")
    }

    /// The frame as it will be written to the other members
    pub fn outbound(&self) -> OutboundFrame {
        self.frame.clone()
    }

    pub fn as_str(&self) -> &str {
        self.frame.as_str()
    }
}

/// Messages synthesized by the relay itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMessage {
    /// Join acknowledgment, sent to the joining connection only
    Joined {
        /// The room that was joined
        room: String,
    },
    /// A new member entered the room
    UserJoined {
        #[serde(rename = "userName")]
        user_name: String,
    },
    /// A member disconnected
    UserLeft {
        #[serde(rename = "userName")]
        user_name: String,
    },
}

impl ServerMessage {
    /// Encode once; the resulting frame is shared by every recipient
    pub fn to_frame(&self) -> Result<OutboundFrame, serde_json::Error> {
        let json = serde_json::to_string(self)?;
        Ok(OutboundFrame(Utf8Bytes::from(json)))
    }
}

/// An encoded text frame ready to be written to a socket
///
/// Cloning is cheap: the underlying buffer is reference counted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundFrame(Utf8Bytes);

impl OutboundFrame {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Convert into a WebSocket text message
    pub fn into_message(self) -> Message {
        Message::Text(self.0)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
