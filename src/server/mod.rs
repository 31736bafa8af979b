//! Server module: shared host, HTTP/WebSocket exposure and builder

pub mod builder;
pub mod exposure;
pub mod host;

pub use builder::RelayServerBuilder;
pub use exposure::RelayExposure;
pub use host::RelayHost;
