//! Fixtures and an in-memory trace source for tests

use std::collections::BTreeSet;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Map, Value as JsonValue, json};

use super::custom_fields::CONSUMER_APP_MARKER;
use super::source::{Credential, EventChain, TraceSource};
use super::types::{
    DestinationRef, Event, EventData, EventType, Facility, ItemMaster, PartyAddress,
    PartyRoleInfo, Payload, SourceRef,
};
use crate::data::proxy::ProxyError;

const BASE_TIMESTAMP: i64 = 1_527_811_200;

/// Timestamp `offset_secs` after a fixed base instant
pub fn at(offset_secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(BASE_TIMESTAMP + offset_secs, 0)
        .single()
        .unwrap()
}

pub struct EventBuilder {
    data: EventData,
}

impl EventBuilder {
    pub fn new(id: &str, offset_secs: i64) -> Self {
        Self {
            data: EventData {
                event_id: id.to_string(),
                event_time: at(offset_secs),
                record_time: None,
                biz_step: String::new(),
                disposition: String::new(),
                read_point: String::new(),
                biz_location: String::new(),
                action: "OBSERVE".to_string(),
                parent_id: None,
                source_list_gln: Vec::new(),
                destination_list_gln: Vec::new(),
                flat_trace_epc_list: Vec::new(),
                flat_epc_list: Vec::new(),
                flat_gtin_list: Vec::new(),
                extra: Map::new(),
            },
        }
    }

    pub fn source(mut self, gln: &str) -> Self {
        self.data.source_list_gln.push(SourceRef {
            source: gln.to_string(),
            kind: "owning_party".to_string(),
        });
        self
    }

    pub fn destination(mut self, gln: &str) -> Self {
        self.data.destination_list_gln.push(DestinationRef {
            destination: gln.to_string(),
            kind: "owning_party".to_string(),
        });
        self
    }

    pub fn items(mut self, epcs: &[&str]) -> Self {
        self.data
            .flat_trace_epc_list
            .extend(epcs.iter().map(|s| s.to_string()));
        self
    }

    pub fn gtins(mut self, gtins: &[&str]) -> Self {
        self.data
            .flat_gtin_list
            .extend(gtins.iter().map(|s| s.to_string()));
        self
    }

    pub fn build(self) -> Event {
        Event {
            event_type: EventType::Object,
            data: self.data,
            blockchain_tx_id: None,
            blockchain_tx_timestamp: None,
        }
    }
}

pub fn facility(gln: &str, role: &str) -> Facility {
    facility_at(gln, role, &format!("{} name", gln), &format!("{} city", gln))
}

pub fn facility_at(gln: &str, role: &str, name: &str, city: &str) -> Facility {
    Facility {
        location_gln: gln.to_string(),
        party_role: PartyRoleInfo {
            party_role_code: role.to_string().into(),
            party_name: name.to_string(),
            extra: Map::new(),
        },
        party_address: PartyAddress {
            name: name.to_string(),
            city: city.to_string(),
            ..Default::default()
        },
        is_party_active: Some(true),
        registering_party: None,
        extra: Map::new(),
    }
}

pub fn payload(id: &str, content: JsonValue) -> Payload {
    Payload {
        payload_id: id.to_string(),
        content,
        payload_time: None,
        payload_content_type: "application/json".to_string(),
        payload_type_uri: "urn:test:payload".to_string(),
        epc_list: Vec::new(),
        location_gln_list: Vec::new(),
        location_list: Vec::new(),
        event_id_list: Vec::new(),
    }
}

impl Payload {
    pub fn with_epcs(mut self, epcs: &[&str]) -> Self {
        self.epc_list = epcs.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_glns(mut self, glns: &[&str]) -> Self {
        self.location_gln_list = glns.iter().map(|s| s.to_string()).collect();
        self
    }
}

/// Field list led by the consumer-app marker, followed by `values`
pub fn marker_fields(values: &[&str]) -> JsonValue {
    let mut fields = vec![json!({ "type": "string", "value": CONSUMER_APP_MARKER })];
    fields.extend(
        values
            .iter()
            .enumerate()
            .map(|(i, v)| json!({ "type": "string", "key": format!("field{}", i), "value": v })),
    );
    JsonValue::Array(fields)
}

pub fn item_master(gtin: &str) -> ItemMaster {
    ItemMaster {
        object_id: gtin.to_string(),
        object_sku: format!("SKU-{}", gtin),
        object_description: format!("Product {}", gtin),
        data_source_gln: None,
        data_recipient_gln: None,
        extra: Map::new(),
    }
}

/// In-memory trace source that answers like the upstream service would
#[derive(Default)]
pub struct FakeTraceSource {
    pub chain: Option<EventChain>,
    pub events: Vec<Event>,
    pub facilities: Vec<Facility>,
    pub item_payloads: Vec<Payload>,
    pub location_payloads: Vec<Payload>,
    pub item_masters: Vec<ItemMaster>,
    /// Endpoint name that answers with an HTTP 500
    pub failing: Option<&'static str>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeTraceSource {
    pub fn with_chain(events: Vec<Event>) -> Self {
        let mut events = events.into_iter();
        let chain = events.next().map(|root| EventChain {
            root,
            linked: events.collect(),
        });
        Self {
            chain,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, endpoint: &'static str, ids: &[String]) -> Result<(), ProxyError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{}:{}", endpoint, ids.join(",")));
        if self.failing == Some(endpoint) {
            return Err(ProxyError::Status {
                endpoint,
                status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            });
        }
        Ok(())
    }
}

fn any_requested(declared: &[String], requested: &BTreeSet<&String>) -> bool {
    declared.iter().any(|id| requested.contains(id))
}

#[async_trait]
impl TraceSource for FakeTraceSource {
    async fn fetch_event_chain(
        &self,
        _credential: &Credential,
        epc: &str,
    ) -> Result<Option<EventChain>, ProxyError> {
        self.record("getMostRecentEventByEPCClass", &[epc.to_string()])?;
        Ok(self.chain.clone())
    }

    async fn fetch_event(
        &self,
        _credential: &Credential,
        event_id: &str,
    ) -> Result<Option<Event>, ProxyError> {
        self.record("getEventDetailByEventId", &[event_id.to_string()])?;
        Ok(self.events.iter().find(|e| e.id() == event_id).cloned())
    }

    async fn fetch_facilities(
        &self,
        _credential: &Credential,
        glns: &[String],
    ) -> Result<Vec<Facility>, ProxyError> {
        self.record("getFacilities", glns)?;
        Ok(self
            .facilities
            .iter()
            .filter(|f| glns.contains(&f.location_gln))
            .cloned()
            .collect())
    }

    async fn fetch_item_payloads(
        &self,
        _credential: &Credential,
        epcs: &[String],
    ) -> Result<Vec<Payload>, ProxyError> {
        self.record("getPayloadsForEPCs", epcs)?;
        let requested: BTreeSet<&String> = epcs.iter().collect();
        Ok(self
            .item_payloads
            .iter()
            .filter(|p| any_requested(&p.epc_list, &requested))
            .cloned()
            .collect())
    }

    async fn fetch_location_payloads(
        &self,
        _credential: &Credential,
        glns: &[String],
    ) -> Result<Vec<Payload>, ProxyError> {
        self.record("getPayloadsForGLNs", glns)?;
        let requested: BTreeSet<&String> = glns.iter().collect();
        Ok(self
            .location_payloads
            .iter()
            .filter(|p| any_requested(&p.location_gln_list, &requested))
            .cloned()
            .collect())
    }

    async fn fetch_item_masters(
        &self,
        _credential: &Credential,
        gtins: &[String],
    ) -> Result<Vec<ItemMaster>, ProxyError> {
        self.record("getItemsByGTINs", gtins)?;
        Ok(self
            .item_masters
            .iter()
            .filter(|m| gtins.contains(&m.object_id))
            .cloned()
            .collect())
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}
