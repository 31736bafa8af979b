//! Delivery seam between the room broadcaster and the transport
//!
//! The broadcaster never touches sockets. It hands encoded frames to an
//! [`Outbox`], which decides whether the target can take them right now.

use crate::core::connection::ConnectionId;
use crate::core::protocol::OutboundFrame;

/// Result of handing one frame to one peer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Queued for the peer's write loop
    Delivered,
    /// Peer is unknown or already closed
    Skipped,
    /// Peer's queue is full; this frame was discarded
    Dropped,
    /// Peer's queue is full; the peer is being disconnected
    Evicted,
}

impl Delivery {
    pub fn is_delivered(self) -> bool {
        matches!(self, Delivery::Delivered)
    }
}

/// Best-effort, non-blocking delivery of frames to individual connections
///
/// Implementations must never block: one slow peer may not stall a fan-out
/// to the others.
pub trait Outbox: Send + Sync {
    /// Hand `frame` to the connection identified by `to`
    fn deliver(&self, to: &ConnectionId, frame: OutboundFrame) -> Delivery;
}
