//! Server host holding the relay's shared state
//!
//! Built once at startup and injected into every handler as axum state;
//! there is no process-wide global.

use crate::config::RelayConfig;
use crate::rooms::RoomBroadcaster;
use crate::server::exposure::Gateway;
use std::sync::Arc;

/// Host context containing all relay state
pub struct RelayHost {
    /// Resolved configuration
    pub config: Arc<RelayConfig>,

    /// Live connections and their outbound queues
    pub gateway: Arc<Gateway>,

    /// Room registry and membership lifecycle
    pub broadcaster: Arc<RoomBroadcaster>,
}

impl RelayHost {
    /// Wire the gateway and the broadcaster together
    pub fn new(config: RelayConfig) -> Self {
        let gateway = Arc::new(Gateway::new(config.peer_buffer, config.slow_consumer));
        let broadcaster = Arc::new(RoomBroadcaster::new(gateway.clone()));

        Self {
            config: Arc::new(config),
            gateway,
            broadcaster,
        }
    }
}
