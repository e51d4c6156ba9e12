//! Domain logic
//!
//! - `provenance` - trace record sets and the views rendered from them

pub mod provenance;

pub use provenance::{ProvenanceError, ProvenanceService};
