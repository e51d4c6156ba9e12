//! Denormalized event graph
//!
//! Every event is returned with its facilities, item payloads and item
//! masters inlined so clients can render a trace without further lookups.

use std::collections::BTreeMap;

use serde::Serialize;

use super::record_set::RecordSet;
use super::types::{Event, Facility, ItemMaster, Payload};

/// Facility record plus the payloads declared for its location
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NestedFacility {
    #[serde(flatten)]
    pub facility: Facility,
    pub payload_list: Vec<Payload>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NestedEvent {
    #[serde(flatten)]
    pub event: Event,
    pub source_facility_list: Vec<NestedFacility>,
    pub destination_facility_list: Vec<NestedFacility>,
    /// Resolved masters only; GTINs without a record are left out
    pub object_master_list: Vec<ItemMaster>,
    pub epc_payload_map: BTreeMap<String, Vec<Payload>>,
}

/// Project every event of the record set, in event-map order
pub fn project(record_set: &RecordSet) -> Vec<NestedEvent> {
    record_set
        .events()
        .map(|event| nest_event(record_set, event))
        .collect()
}

fn nest_event(record_set: &RecordSet, event: &Event) -> NestedEvent {
    let data = &event.data;

    let epc_payload_map = data
        .item_ids()
        .iter()
        .map(|epc| (epc.clone(), record_set.item_payloads_for(epc).to_vec()))
        .collect();

    let object_master_list = data
        .gtins()
        .iter()
        .filter_map(|gtin| record_set.item_master(gtin).cloned())
        .collect();

    NestedEvent {
        event: event.clone(),
        source_facility_list: data
            .source_glns()
            .map(|gln| nest_facility(record_set, gln))
            .collect(),
        destination_facility_list: data
            .destination_glns()
            .map(|gln| nest_facility(record_set, gln))
            .collect(),
        object_master_list,
        epc_payload_map,
    }
}

fn nest_facility(record_set: &RecordSet, gln: &str) -> NestedFacility {
    let facility = match record_set.facility(gln) {
        Some(facility) => facility.clone(),
        None => {
            tracing::debug!(gln = %gln, "Facility not in record set, nesting placeholder");
            Facility::unresolved(gln)
        }
    };
    NestedFacility {
        facility,
        payload_list: record_set.location_payloads_for(gln).to_vec(),
    }
}
