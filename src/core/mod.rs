//! Core module containing the relay's fundamental types and traits

pub mod connection;
pub mod error;
pub mod outbox;
pub mod protocol;

pub use connection::{Connection, ConnectionId, ConnectionState};
pub use error::{DecodeError, RelayError};
pub use outbox::{Delivery, Outbox};
pub use protocol::{InboundMessage, OutboundFrame, RelayFrame, ServerMessage};
