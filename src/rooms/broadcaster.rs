//! Room broadcaster: join, relay and leave
//!
//! The `RoomBroadcaster` is the sole mutator of room membership. Each
//! operation takes the registry lock once, snapshots the member ids it has
//! to notify, releases the lock, then delivers through the [`Outbox`].
//!
//! # Architecture
//!
//! ```text
//! socket task ──join/relay/leave──▶ RoomBroadcaster
//!                                        │
//!                              RwLock<RoomRegistry> (snapshot)
//!                                        │
//!                              for each peer except sender
//!                                        │
//!                              Outbox::deliver (never blocks)
//! ```

use super::registry::RoomRegistry;
use crate::core::connection::{Connection, ConnectionId, ConnectionState};
use crate::core::outbox::{Delivery, Outbox};
use crate::core::protocol::{OutboundFrame, RelayFrame, ServerMessage};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Per-fan-out delivery counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanOut {
    pub delivered: usize,
    pub skipped: usize,
    pub dropped: usize,
    pub evicted: usize,
}

impl FanOut {
    fn record(&mut self, delivery: Delivery) {
        match delivery {
            Delivery::Delivered => self.delivered += 1,
            Delivery::Skipped => self.skipped += 1,
            Delivery::Dropped => self.dropped += 1,
            Delivery::Evicted => self.evicted += 1,
        }
    }

    /// Number of peers the fan-out targeted
    pub fn targeted(&self) -> usize {
        self.delivered + self.skipped + self.dropped + self.evicted
    }
}

/// Owns the room registry and implements the membership lifecycle
pub struct RoomBroadcaster {
    registry: RwLock<RoomRegistry>,
    outbox: Arc<dyn Outbox>,
}

impl RoomBroadcaster {
    pub fn new(outbox: Arc<dyn Outbox>) -> Self {
        Self {
            registry: RwLock::new(RoomRegistry::new()),
            outbox,
        }
    }

    /// Add `conn` to `room`
    ///
    /// Existing members receive `user-joined`, then `conn` receives `joined`.
    /// A connection that is already in another room leaves it first.
    pub async fn join(&self, conn: &mut Connection, room: String, user_name: String) {
        if !conn.is_open() {
            return;
        }

        if conn.room().is_some_and(|current| current != room) {
            self.leave(conn).await;
        }

        let peers = {
            let mut registry = self.registry.write().await;
            let insertion = registry.insert(&room, conn.id());
            if insertion.room_created {
                tracing::info!(room = %room, "Room created");
            }
            registry.members_except(&room, conn.id())
        };

        conn.enter_room(room.clone(), user_name.clone());

        let notified = self.broadcast(
            &peers,
            &ServerMessage::UserJoined {
                user_name: user_name.clone(),
            },
        );
        self.send(conn.id(), &ServerMessage::Joined { room: room.clone() });

        tracing::info!(
            connection_id = %conn.id(),
            room = %room,
            user_name = %user_name,
            peers = notified.targeted(),
            "User joined room"
        );
    }

    /// Forward `frame` verbatim to every other member of the sender's room
    ///
    /// A sender that has not joined a room is ignored.
    pub async fn relay(&self, conn: &Connection, frame: &RelayFrame) -> FanOut {
        let Some(room) = conn.room() else {
            tracing::debug!(
                connection_id = %conn.id(),
                message_type = frame.message_type(),
                "Dropping message from connection outside any room"
            );
            return FanOut::default();
        };

        let peers = self.registry.read().await.members_except(room, conn.id());
        let report = self.fan_out(&peers, frame.outbound());

        tracing::debug!(
            connection_id = %conn.id(),
            room = %room,
            message_type = frame.message_type(),
            delivered = report.delivered,
            "Relayed message"
        );

        report
    }

    /// Remove `conn` from its room, notifying the remaining members
    ///
    /// No-op for a connection that never joined. The room is deleted when
    /// its last member leaves.
    pub async fn leave(&self, conn: &mut Connection) {
        let ConnectionState::Member { room, user_name } = conn.leave_room() else {
            return;
        };

        let (peers, room_deleted) = {
            let mut registry = self.registry.write().await;
            let peers = registry.members_except(&room, conn.id());
            let removal = registry.remove(&room, conn.id());
            (peers, removal.room_deleted)
        };

        self.broadcast(&peers, &ServerMessage::UserLeft { user_name });

        if room_deleted {
            tracing::info!(room = %room, "Room deleted");
        }
    }

    /// Whether `room` currently exists
    pub async fn has_room(&self, room: &str) -> bool {
        self.registry.read().await.contains_room(room)
    }

    /// Number of members in `room`
    pub async fn room_size(&self, room: &str) -> usize {
        self.registry.read().await.member_count(room)
    }

    pub async fn room_count(&self) -> usize {
        self.registry.read().await.room_count()
    }

    pub async fn room_names(&self) -> Vec<String> {
        self.registry.read().await.room_names()
    }

    fn broadcast(&self, peers: &[ConnectionId], message: &ServerMessage) -> FanOut {
        match message.to_frame() {
            Ok(frame) => self.fan_out(peers, frame),
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize ServerMessage");
                FanOut::default()
            }
        }
    }

    fn send(&self, to: &ConnectionId, message: &ServerMessage) -> Delivery {
        match message.to_frame() {
            Ok(frame) => self.outbox.deliver(to, frame),
            Err(e) => {
                tracing::error!(connection_id = %to, error = %e, "Failed to serialize ServerMessage");
                Delivery::Skipped
            }
        }
    }

    /// Best-effort delivery to every peer; one failure never stops the loop
    fn fan_out(&self, peers: &[ConnectionId], frame: OutboundFrame) -> FanOut {
        let mut report = FanOut::default();

        for peer in peers {
            let delivery = self.outbox.deliver(peer, frame.clone());
            if !delivery.is_delivered() {
                tracing::debug!(
                    connection_id = %peer,
                    delivery = ?delivery,
                    "Frame not delivered to peer"
                );
            }
            report.record(delivery);
        }

        report
    }
}
