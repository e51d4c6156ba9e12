//! Identifier extraction over an event list

use std::collections::BTreeSet;

use super::types::Event;

/// Distinct identifiers referenced by a set of events
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceKeys {
    /// Facility GLNs, from both source and destination references
    pub facility_ids: BTreeSet<String>,
    /// Traced item EPCs
    pub item_ids: BTreeSet<String>,
    /// Product-class GTINs
    pub gtins: BTreeSet<String>,
}

impl TraceKeys {
    pub fn is_empty(&self) -> bool {
        self.facility_ids.is_empty() && self.item_ids.is_empty() && self.gtins.is_empty()
    }

    pub fn facility_list(&self) -> Vec<String> {
        self.facility_ids.iter().cloned().collect()
    }

    pub fn item_list(&self) -> Vec<String> {
        self.item_ids.iter().cloned().collect()
    }

    pub fn gtin_list(&self) -> Vec<String> {
        self.gtins.iter().cloned().collect()
    }
}

pub fn extract_keys<'a, I>(events: I) -> TraceKeys
where
    I: IntoIterator<Item = &'a Event>,
{
    let mut keys = TraceKeys::default();
    for event in events {
        let data = &event.data;
        keys.facility_ids
            .extend(data.source_glns().chain(data.destination_glns()).map(str::to_string));
        keys.item_ids.extend(data.item_ids().iter().cloned());
        keys.gtins.extend(data.gtins().iter().cloned());
    }
    keys
}
