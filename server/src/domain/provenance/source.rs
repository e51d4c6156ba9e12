//! Boundary to the upstream trace service

use std::fmt;

use async_trait::async_trait;

use super::types::{Event, Facility, ItemMaster, Payload};
use crate::data::proxy::ProxyError;

/// Opaque bearer credential forwarded unmodified to the upstream service.
///
/// The value is never inspected and never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Most recent event for an item plus the events linked to it
#[derive(Debug, Clone, PartialEq)]
pub struct EventChain {
    pub root: Event,
    pub linked: Vec<Event>,
}

impl EventChain {
    /// Root first, then linked events in upstream order
    pub fn into_events(self) -> Vec<Event> {
        let mut events = Vec::with_capacity(1 + self.linked.len());
        events.push(self.root);
        events.extend(self.linked);
        events
    }
}

/// Batched retrieval of trace records.
///
/// Each `fetch_*` call is one round trip for one kind of record. The calls
/// are independent of each other and may run concurrently.
#[async_trait]
pub trait TraceSource: Send + Sync {
    /// Event chain for an item; `None` when the item is unknown upstream
    async fn fetch_event_chain(
        &self,
        credential: &Credential,
        epc: &str,
    ) -> Result<Option<EventChain>, ProxyError>;

    /// Single event by id; `None` when the event is unknown upstream
    async fn fetch_event(
        &self,
        credential: &Credential,
        event_id: &str,
    ) -> Result<Option<Event>, ProxyError>;

    async fn fetch_facilities(
        &self,
        credential: &Credential,
        glns: &[String],
    ) -> Result<Vec<Facility>, ProxyError>;

    /// Payloads declared for any of the given items
    async fn fetch_item_payloads(
        &self,
        credential: &Credential,
        epcs: &[String],
    ) -> Result<Vec<Payload>, ProxyError>;

    /// Payloads declared for any of the given locations
    async fn fetch_location_payloads(
        &self,
        credential: &Credential,
        glns: &[String],
    ) -> Result<Vec<Payload>, ProxyError>;

    async fn fetch_item_masters(
        &self,
        credential: &Credential,
        gtins: &[String],
    ) -> Result<Vec<ItemMaster>, ProxyError>;

    /// Human-readable backend name
    fn name(&self) -> &'static str;
}
