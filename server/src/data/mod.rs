//! Upstream service clients
//!
//! - `proxy` - read-only provenance proxy, the production [`TraceSource`]
//! - `connector` - payload uploads
//!
//! [`TraceSource`]: crate::domain::provenance::TraceSource

pub mod connector;
pub mod proxy;

pub use connector::{ConnectorClient, ConnectorError};
pub use proxy::{ProxyClient, ProxyError};
