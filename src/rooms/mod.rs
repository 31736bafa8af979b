//! Room membership and broadcast engine
//!
//! This module owns the registry mapping room identifiers to member sets and
//! the join / relay / leave algorithms built on top of it. It is agnostic to
//! the transport: frames leave through the [`Outbox`](crate::core::Outbox) trait.

pub mod broadcaster;
pub mod registry;

pub use broadcaster::{FanOut, RoomBroadcaster};
pub use registry::{Insertion, Removal, RoomRegistry};
