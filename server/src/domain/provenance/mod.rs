//! Supply-chain provenance for traced items
//!
//! A query for one item builds a request-scoped [`RecordSet`] from the
//! upstream trace service and renders it as one of two views:
//!
//! - a nested event graph with facilities, payloads and item masters inlined
//! - a consumer narrative of lifecycle stages (incubation to delivery)

mod builder;
mod custom_fields;
mod error;
mod index;
mod keys;
mod lifecycle;
mod narrative;
mod nested;
mod record_set;
mod service;
mod source;
mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use builder::RecordSetBuilder;
pub use custom_fields::{
    CONSUMER_APP_MARKER, CustomField, CustomFields, MISSING_FIELD_VALUE, consumer_app_fields,
};
pub use error::ProvenanceError;
pub use index::{Direction, is_internal};
pub use keys::{TraceKeys, extract_keys};
pub use lifecycle::{
    DeliveryEvent, FeedingEvent, GrowEvent, IncubationEvent, LifecycleEvent, SacrificeEvent,
    synthesize,
};
pub use narrative::{DataModelUi, NarrativeDetail, assemble};
pub use nested::{NestedEvent, NestedFacility, project};
pub use record_set::RecordSet;
pub use service::ProvenanceService;
pub use source::{Credential, EventChain, TraceSource};
pub use types::{
    DestinationRef, Event, EventData, EventType, Facility, ItemMaster, PartyAddress, PartyRole,
    PartyRoleInfo, Payload, SourceRef,
};
