//! Record-set assembly from the upstream trace service
//!
//! Two strategies produce equivalent record sets:
//!
//! - **batched**: one chain lookup, then one retrieval per record kind for
//!   the whole chain
//! - **per event**: one record set per chain event, merged in chain order
//!
//! Both fail fast: if any retrieval fails, no record set is returned.

use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;

use futures::future::try_join_all;

use super::error::ProvenanceError;
use super::keys::{TraceKeys, extract_keys};
use super::record_set::RecordSet;
use super::source::{Credential, TraceSource};
use super::types::{Event, Facility, ItemMaster, Payload};
use crate::data::proxy::ProxyError;

/// Records related to a set of events, as returned upstream
struct Related {
    facilities: Vec<Facility>,
    item_payloads: Vec<Payload>,
    location_payloads: Vec<Payload>,
    item_masters: Vec<ItemMaster>,
}

pub struct RecordSetBuilder<'a> {
    source: &'a dyn TraceSource,
    credential: &'a Credential,
}

impl<'a> RecordSetBuilder<'a> {
    pub fn new(source: &'a dyn TraceSource, credential: &'a Credential) -> Self {
        Self { source, credential }
    }

    /// Record set for the most recent event chain of `epc`.
    ///
    /// An item unknown upstream yields an empty record set.
    pub async fn build_from_item(&self, epc: &str) -> Result<RecordSet, ProvenanceError> {
        let Some(events) = self.chain_events(epc).await? else {
            return Ok(queried(RecordSet::new(), epc));
        };

        let keys = extract_keys(&events);
        let related = self.fetch_related(&keys).await?;

        let mut record_set = RecordSet::new();
        for event in events {
            record_set.insert_event(event);
        }
        fold_related(&mut record_set, &keys, related);

        tracing::debug!(
            epc = %epc,
            events = record_set.event_map.len(),
            facilities = record_set.facility_map.len(),
            "Built record set"
        );
        Ok(queried(record_set, epc))
    }

    /// Record set for a single event.
    ///
    /// Every facility the event references must resolve to exactly one
    /// facility record.
    pub async fn build_from_event(&self, event: Event) -> Result<RecordSet, ProvenanceError> {
        let keys = extract_keys([&event]);
        let related = self.fetch_related(&keys).await?;
        check_single_facility_per_gln(&keys, &related.facilities)?;

        let mut record_set = RecordSet::new();
        record_set.insert_event(event);
        fold_related(&mut record_set, &keys, related);
        Ok(record_set)
    }

    /// Record set for `epc`, built one chain event at a time and merged in
    /// chain order.
    pub async fn build_from_item_per_event(
        &self,
        epc: &str,
    ) -> Result<RecordSet, ProvenanceError> {
        let Some(events) = self.chain_events(epc).await? else {
            return Ok(queried(RecordSet::new(), epc));
        };

        let parts = try_join_all(events.into_iter().map(|event| self.build_from_event(event))).await?;

        let mut record_set = RecordSet::new();
        for part in parts {
            record_set.merge_from(part);
        }

        tracing::debug!(
            epc = %epc,
            events = record_set.event_map.len(),
            "Built record set per event"
        );
        Ok(queried(record_set, epc))
    }

    async fn chain_events(&self, epc: &str) -> Result<Option<Vec<Event>>, ProvenanceError> {
        let chain = self.source.fetch_event_chain(self.credential, epc).await?;
        if chain.is_none() {
            tracing::debug!(epc = %epc, source = self.source.name(), "Item unknown upstream");
        }
        Ok(chain.map(|chain| chain.into_events()))
    }

    async fn fetch_related(&self, keys: &TraceKeys) -> Result<Related, ProvenanceError> {
        let facility_ids = keys.facility_list();
        let item_ids = keys.item_list();
        let gtins = keys.gtin_list();
        let (source, credential) = (self.source, self.credential);

        let (facilities, item_payloads, location_payloads, item_masters) = tokio::try_join!(
            unless_empty(&facility_ids, || source.fetch_facilities(credential, &facility_ids)),
            unless_empty(&item_ids, || source.fetch_item_payloads(credential, &item_ids)),
            unless_empty(&facility_ids, || source
                .fetch_location_payloads(credential, &facility_ids)),
            unless_empty(&gtins, || source.fetch_item_masters(credential, &gtins)),
        )?;

        Ok(Related {
            facilities,
            item_payloads,
            location_payloads,
            item_masters,
        })
    }
}

/// Skip the round trip when there is nothing to ask for
async fn unless_empty<T, F, Fut>(ids: &[String], fetch: F) -> Result<Vec<T>, ProxyError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<T>, ProxyError>>,
{
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    fetch().await
}

fn queried(mut record_set: RecordSet, epc: &str) -> RecordSet {
    record_set.queried_epc = Some(epc.to_string());
    record_set
}

fn fold_related(record_set: &mut RecordSet, keys: &TraceKeys, related: Related) {
    record_set.fold_facilities(&keys.facility_ids, related.facilities);
    record_set.fold_item_payloads(&keys.item_ids, related.item_payloads);
    record_set.fold_location_payloads(&keys.facility_ids, related.location_payloads);
    record_set.fold_item_masters(&keys.gtins, related.item_masters);
}

fn check_single_facility_per_gln(
    keys: &TraceKeys,
    facilities: &[Facility],
) -> Result<(), ProvenanceError> {
    let mut counts: BTreeMap<&str, usize> = keys
        .facility_ids
        .iter()
        .map(|gln| (gln.as_str(), 0))
        .collect();
    for facility in facilities {
        if let Some(count) = counts.get_mut(facility.location_gln.as_str()) {
            *count += 1;
        }
    }

    let bad: BTreeSet<String> = counts
        .into_iter()
        .filter(|(_, count)| *count != 1)
        .map(|(gln, count)| format!("{} ({} records)", gln, count))
        .collect();
    if bad.is_empty() {
        return Ok(());
    }
    Err(ProvenanceError::invariant(format!(
        "only a single facility should be returned per GLN: {}",
        bad.into_iter().collect::<Vec<_>>().join(", ")
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::provenance::testing::{
        EventBuilder, FakeTraceSource, facility, item_master, marker_fields, payload,
    };
    use serde_json::json;

    fn credential() -> Credential {
        Credential::new("Bearer test")
    }

    fn farm_to_plant() -> FakeTraceSource {
        let mut source = FakeTraceSource::with_chain(vec![
            EventBuilder::new("e2", 20)
                .source("G2")
                .destination("G3")
                .items(&["lot1"])
                .gtins(&["gtin1"])
                .build(),
            EventBuilder::new("e1", 10)
                .source("G1")
                .destination("G2")
                .items(&["lot1", "lot0"])
                .build(),
        ]);
        source.facilities = vec![
            facility("G1", "FARM"),
            facility("G2", "SLAUGHTERER"),
            facility("G3", "RETAILER"),
            facility("G-unrelated", "FARM"),
        ];
        source.item_payloads = vec![payload("ip", marker_fields(&["IncuCo"])).with_epcs(&["lot1", "lot0"])];
        source.location_payloads = vec![payload("lp", json!([])).with_glns(&["G1"])];
        source.item_masters = vec![item_master("gtin1")];
        source
    }

    #[tokio::test]
    async fn test_build_from_item_populates_every_map() {
        let source = farm_to_plant();
        let credential = credential();
        let rs = RecordSetBuilder::new(&source, &credential)
            .build_from_item("lot1")
            .await
            .unwrap();

        assert_eq!(rs.event_map.keys().collect::<Vec<_>>(), vec!["e1", "e2"]);
        assert_eq!(rs.facility_map.keys().collect::<Vec<_>>(), vec!["G1", "G2", "G3"]);
        assert_eq!(rs.item_payloads_for("lot0").len(), 1);
        assert_eq!(rs.item_payloads_for("lot1").len(), 1);
        assert_eq!(rs.location_payloads_for("G1").len(), 1);
        assert!(rs.item_master("gtin1").is_some());
        assert_eq!(rs.queried_epc.as_deref(), Some("lot1"));
    }

    #[tokio::test]
    async fn test_build_from_item_batches_each_kind_once() {
        let source = farm_to_plant();
        let credential = credential();
        RecordSetBuilder::new(&source, &credential)
            .build_from_item("lot1")
            .await
            .unwrap();

        let mut calls = source.calls();
        calls.sort();
        assert_eq!(
            calls,
            vec![
                "getFacilities:G1,G2,G3",
                "getItemsByGTINs:gtin1",
                "getMostRecentEventByEPCClass:lot1",
                "getPayloadsForEPCs:lot0,lot1",
                "getPayloadsForGLNs:G1,G2,G3",
            ]
        );
    }

    #[tokio::test]
    async fn test_unknown_item_yields_empty_record_set() {
        let source = FakeTraceSource::default();
        let credential = credential();
        let rs = RecordSetBuilder::new(&source, &credential)
            .build_from_item("nope")
            .await
            .unwrap();

        assert!(rs.is_empty());
        assert!(rs.facility_map.is_empty());
        assert_eq!(rs.queried_epc.as_deref(), Some("nope"));
        assert_eq!(source.calls(), vec!["getMostRecentEventByEPCClass:nope"]);
    }

    #[tokio::test]
    async fn test_failed_retrieval_aborts_build() {
        let mut source = farm_to_plant();
        source.failing = Some("getPayloadsForGLNs");
        let credential = credential();

        let result = RecordSetBuilder::new(&source, &credential)
            .build_from_item("lot1")
            .await;
        assert!(matches!(result, Err(ProvenanceError::Upstream(_))));
    }

    #[tokio::test]
    async fn test_failed_chain_lookup_aborts_build() {
        let mut source = farm_to_plant();
        source.failing = Some("getMostRecentEventByEPCClass");
        let credential = credential();

        let result = RecordSetBuilder::new(&source, &credential)
            .build_from_item("lot1")
            .await;
        assert!(matches!(result, Err(ProvenanceError::Upstream(_))));
        assert_eq!(source.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_id_sets_skip_round_trips() {
        let source = FakeTraceSource::with_chain(vec![EventBuilder::new("e1", 0).source("G1").build()]);
        let credential = credential();
        RecordSetBuilder::new(&source, &credential)
            .build_from_item("lot1")
            .await
            .unwrap();

        let calls = source.calls();
        assert!(calls.iter().all(|c| !c.starts_with("getPayloadsForEPCs")));
        assert!(calls.iter().all(|c| !c.starts_with("getItemsByGTINs")));
        assert!(calls.contains(&"getFacilities:G1".to_string()));
    }

    #[tokio::test]
    async fn test_build_from_event_requires_one_facility_per_gln() {
        let mut source = FakeTraceSource::default();
        source.facilities = vec![facility("G1", "FARM"), facility("G1", "FARM")];
        let credential = credential();
        let builder = RecordSetBuilder::new(&source, &credential);

        let duplicated = EventBuilder::new("e1", 0).source("G1").build();
        let err = builder.build_from_event(duplicated).await.unwrap_err();
        assert!(matches!(err, ProvenanceError::InvariantViolation(_)));
        assert!(err.to_string().contains("G1 (2 records)"));

        let missing = EventBuilder::new("e2", 0).source("G9").build();
        let err = builder.build_from_event(missing).await.unwrap_err();
        assert!(err.to_string().contains("G9 (0 records)"));
    }

    #[tokio::test]
    async fn test_per_event_strategy_matches_batched() {
        let mut source = farm_to_plant();
        source.facilities.retain(|f| f.location_gln != "G-unrelated");
        let credential = credential();
        let builder = RecordSetBuilder::new(&source, &credential);

        let batched = builder.build_from_item("lot1").await.unwrap();
        let per_event = builder.build_from_item_per_event("lot1").await.unwrap();

        assert_eq!(per_event.event_map, batched.event_map);
        assert_eq!(per_event.facility_map, batched.facility_map);
        assert_eq!(per_event.item_masters, batched.item_masters);
        assert_eq!(per_event.queried_epc, batched.queried_epc);
    }

    #[tokio::test]
    async fn test_per_event_strategy_unknown_item() {
        let source = FakeTraceSource::default();
        let credential = credential();
        let rs = RecordSetBuilder::new(&source, &credential)
            .build_from_item_per_event("nope")
            .await
            .unwrap();
        assert!(rs.is_empty());
        assert_eq!(rs.queried_epc.as_deref(), Some("nope"));
    }
}
