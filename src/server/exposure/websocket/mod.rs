//! WebSocket exposure: the connection gateway and the per-connection loop
//!
//! # Architecture
//!
//! ```text
//! Client ──ws──▶ upgrade() ──▶ handle_socket() ──on_frame──▶ RoomBroadcaster
//!                                    ▲                              │
//!                                    │                          deliver
//!                              write loop ◀── bounded mpsc ◀── Gateway
//! ```
//!
//! # Protocol
//!
//! Client → Server (JSON):
//! - `{"type": "join", "room": "...", "userName": "..."}`
//! - any other object, relayed verbatim to the rest of the room
//!
//! Server → Client (JSON):
//! - `{"type": "joined", "room": "..."}`
//! - `{"type": "user-joined", "userName": "..."}`
//! - `{"type": "user-left", "userName": "..."}`

mod gateway;
mod handler;

pub use gateway::{Gateway, PeerReceiver};
pub use handler::{on_frame, upgrade};
