//! Request-scoped aggregate of trace records
//!
//! A [`RecordSet`] is built per query, read by the views, and dropped with the
//! response. Maps are ordered by key so every view over the same record set
//! produces the same output.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::types::{Event, Facility, ItemMaster, Payload};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSet {
    /// event id -> event
    pub event_map: BTreeMap<String, Event>,
    /// GLN -> facility
    pub facility_map: BTreeMap<String, Facility>,
    /// GLN -> payloads declared for that location
    #[serde(rename = "glnPayloadMap")]
    pub location_payloads: BTreeMap<String, Vec<Payload>>,
    /// EPC -> payloads declared for that item
    #[serde(rename = "epcPayloadMap")]
    pub item_payloads: BTreeMap<String, Vec<Payload>>,
    /// GTIN -> item master record
    #[serde(rename = "objectMasterMap")]
    pub item_masters: BTreeMap<String, ItemMaster>,
    /// Item the record set was built for
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queried_epc: Option<String>,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.event_map.is_empty()
    }

    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.event_map.values()
    }

    pub fn insert_event(&mut self, event: Event) {
        self.event_map.insert(event.id().to_string(), event);
    }

    pub fn facility(&self, gln: &str) -> Option<&Facility> {
        self.facility_map.get(gln)
    }

    pub fn location_payloads_for(&self, gln: &str) -> &[Payload] {
        self.location_payloads
            .get(gln)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn item_payloads_for(&self, epc: &str) -> &[Payload] {
        self.item_payloads
            .get(epc)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn item_master(&self, gtin: &str) -> Option<&ItemMaster> {
        self.item_masters.get(gtin)
    }

    /// Index facilities by GLN. Only requested GLNs are kept; a later record
    /// for the same GLN replaces an earlier one.
    pub fn fold_facilities(&mut self, requested: &BTreeSet<String>, facilities: Vec<Facility>) {
        for facility in facilities {
            if !requested.contains(&facility.location_gln) {
                tracing::debug!(gln = %facility.location_gln, "Dropping unrequested facility");
                continue;
            }
            if self.facility_map.contains_key(&facility.location_gln) {
                tracing::debug!(gln = %facility.location_gln, "Duplicate facility record, keeping last");
            }
            self.facility_map
                .insert(facility.location_gln.clone(), facility);
        }
    }

    /// Index item payloads under every requested EPC each payload declares
    pub fn fold_item_payloads(&mut self, requested: &BTreeSet<String>, payloads: Vec<Payload>) {
        for payload in payloads {
            let epcs = declared_ids(&payload.epc_list, requested);
            push_under_each(&mut self.item_payloads, epcs, payload);
        }
    }

    /// Index location payloads under every requested GLN each payload declares
    pub fn fold_location_payloads(
        &mut self,
        requested: &BTreeSet<String>,
        payloads: Vec<Payload>,
    ) {
        for payload in payloads {
            let glns = declared_ids(&payload.location_gln_list, requested);
            push_under_each(&mut self.location_payloads, glns, payload);
        }
    }

    pub fn fold_item_masters(&mut self, requested: &BTreeSet<String>, masters: Vec<ItemMaster>) {
        for master in masters {
            if requested.contains(&master.object_id) {
                self.item_masters.insert(master.object_id.clone(), master);
            }
        }
    }

    /// Copy every entry of `from` into `self`, overwriting on key collision.
    ///
    /// The queried-item marker is left untouched.
    pub fn merge_from(&mut self, from: RecordSet) {
        self.event_map.extend(from.event_map);
        self.facility_map.extend(from.facility_map);
        self.item_masters.extend(from.item_masters);
        self.item_payloads.extend(from.item_payloads);
        self.location_payloads.extend(from.location_payloads);
    }
}

/// Distinct ids from `declared` that were part of the request, in declaration order
fn declared_ids(declared: &[String], requested: &BTreeSet<String>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    declared
        .iter()
        .filter(|id| requested.contains(*id) && seen.insert(id.as_str()))
        .cloned()
        .collect()
}

fn push_under_each(map: &mut BTreeMap<String, Vec<Payload>>, keys: Vec<String>, payload: Payload) {
    let Some((last, rest)) = keys.split_last() else {
        tracing::debug!(payload_id = %payload.payload_id, "Payload matches no requested id");
        return;
    };
    for key in rest {
        map.entry(key.clone()).or_default().push(payload.clone());
    }
    map.entry(last.clone()).or_default().push(payload);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::provenance::testing::{EventBuilder, facility, item_master, payload};
    use serde_json::json;

    fn ids(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn sample() -> RecordSet {
        let mut rs = RecordSet::new();
        rs.insert_event(EventBuilder::new("e1", 1).source("G1").destination("G2").build());
        rs.fold_facilities(&ids(&["G1", "G2"]), vec![facility("G1", "FARM"), facility("G2", "SLAUGHTERER")]);
        rs.fold_item_payloads(
            &ids(&["epc1"]),
            vec![payload("p1", json!([])).with_epcs(&["epc1"])],
        );
        rs.fold_location_payloads(
            &ids(&["G1"]),
            vec![payload("p2", json!([])).with_glns(&["G1"])],
        );
        rs.fold_item_masters(&ids(&["gtin1"]), vec![item_master("gtin1")]);
        rs.queried_epc = Some("epc1".to_string());
        rs
    }

    #[test]
    fn test_payload_indexed_under_every_declared_id() {
        let mut rs = RecordSet::new();
        rs.fold_item_payloads(
            &ids(&["epc1", "epc2"]),
            vec![payload("p1", json!([])).with_epcs(&["epc1", "epc2", "epc1"])],
        );

        assert_eq!(rs.item_payloads_for("epc1").len(), 1);
        assert_eq!(rs.item_payloads_for("epc2").len(), 1);
        assert_eq!(rs.item_payloads_for("epc2")[0].payload_id, "p1");
    }

    #[test]
    fn test_fold_drops_unrequested_ids() {
        let mut rs = RecordSet::new();
        rs.fold_location_payloads(
            &ids(&["G1"]),
            vec![payload("p1", json!([])).with_glns(&["G1", "G-other"])],
        );
        rs.fold_facilities(&ids(&["G1"]), vec![facility("G-other", "FARM")]);
        rs.fold_item_masters(&ids(&["gtin1"]), vec![item_master("gtin-other")]);

        assert_eq!(rs.location_payloads.keys().collect::<Vec<_>>(), vec!["G1"]);
        assert!(rs.facility_map.is_empty());
        assert!(rs.item_masters.is_empty());
    }

    #[test]
    fn test_duplicate_facility_last_write_wins() {
        let mut rs = RecordSet::new();
        let mut second = facility("G1", "SLAUGHTERER");
        second.party_address.name = "Second".to_string();
        rs.fold_facilities(&ids(&["G1"]), vec![facility("G1", "FARM"), second]);

        assert_eq!(rs.facility("G1").unwrap().party_address.name, "Second");
    }

    #[test]
    fn test_missing_lookups_are_empty() {
        let rs = RecordSet::new();
        assert!(rs.location_payloads_for("G1").is_empty());
        assert!(rs.item_payloads_for("epc1").is_empty());
        assert!(rs.item_master("gtin1").is_none());
        assert!(rs.is_empty());
    }

    #[test]
    fn test_merge_into_self_is_idempotent() {
        let original = sample();
        let mut merged = original.clone();
        merged.merge_from(original.clone());
        assert_eq!(merged, original);
    }

    #[test]
    fn test_merge_overwrites_on_collision_and_keeps_marker() {
        let mut into = sample();
        let mut from = RecordSet::new();
        from.insert_event(EventBuilder::new("e1", 5).source("G9").build());
        from.insert_event(EventBuilder::new("e2", 6).build());
        from.queried_epc = Some("other".to_string());

        into.merge_from(from);

        assert_eq!(into.event_map.len(), 2);
        assert_eq!(into.event_map["e1"].data.source_glns().collect::<Vec<_>>(), vec!["G9"]);
        assert_eq!(into.queried_epc.as_deref(), Some("epc1"));
        assert_eq!(into.facility_map.len(), 2);
    }

    #[test]
    fn test_serializes_with_upstream_map_names() {
        let value = serde_json::to_value(sample()).unwrap();
        for key in [
            "eventMap",
            "facilityMap",
            "glnPayloadMap",
            "epcPayloadMap",
            "objectMasterMap",
            "queriedEpc",
        ] {
            assert!(value.get(key).is_some(), "missing {}", key);
        }
    }
}
