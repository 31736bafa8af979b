//! # Room Relay
//!
//! A minimal real-time message relay. Clients connect over WebSocket, join a
//! named room, and every message they send is forwarded verbatim to the other
//! members of that room.
//!
//! ## Features
//!
//! - **Rooms on demand**: created by the first join, deleted when the last member leaves
//! - **Opaque payloads**: only `type`, `room` and `userName` are interpreted
//! - **Presence events**: `joined`, `user-joined` and `user-left` are synthesized by the relay
//! - **Slow-consumer isolation**: bounded per-peer queues, never a blocking fan-out
//! - **Single port**: the static page and the WebSocket endpoint share one listener
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use relay::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     RelayServerBuilder::new()
//!         .with_config(RelayConfig::load()?)
//!         .serve()
//!         .await
//! }
//! ```

pub mod config;
pub mod core;
pub mod rooms;
pub mod server;

/// Re-exports of commonly used types
pub mod prelude {
    pub use crate::config::{RelayConfig, SlowConsumerPolicy};
    pub use crate::core::{
        Connection, ConnectionId, ConnectionState, Delivery, InboundMessage, Outbox,
        OutboundFrame, RelayError, RelayFrame, ServerMessage,
    };
    pub use crate::rooms::{FanOut, RoomBroadcaster, RoomRegistry};
    pub use crate::server::{RelayExposure, RelayHost, RelayServerBuilder};

    pub use anyhow::Result;
}
