//! Upstream trace records
//!
//! These mirror the provenance proxy's JSON shapes (camelCase keys). Keys the
//! service does not interpret are kept in `extra` maps so the nested-graph
//! view can hand them back to clients untouched.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::utils::json::deserialize_lenient_string;

/// Business-step category of an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventType {
    Object,
    Aggregation,
    Transformation,
    Transaction,
    Other(String),
}

impl EventType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Object => "ObjectEvent",
            Self::Aggregation => "AggregationEvent",
            Self::Transformation => "TransformationEvent",
            Self::Transaction => "TransactionEvent",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for EventType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "ObjectEvent" => Self::Object,
            "AggregationEvent" => Self::Aggregation,
            "TransformationEvent" => Self::Transformation,
            "TransactionEvent" => Self::Transaction,
            _ => Self::Other(s),
        }
    }
}

impl From<EventType> for String {
    fn from(t: EventType) -> Self {
        match t {
            EventType::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    pub source: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestinationRef {
    pub destination: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// Structured body of an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventData {
    #[serde(rename = "eventID")]
    pub event_id: String,
    pub event_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub biz_step: String,
    #[serde(default)]
    pub disposition: String,
    #[serde(default)]
    pub read_point: String,
    #[serde(default)]
    pub biz_location: String,
    #[serde(default)]
    pub action: String,
    #[serde(rename = "parentID", default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(rename = "sourceListGLN", default)]
    pub source_list_gln: Vec<SourceRef>,
    #[serde(rename = "destinationListGLN", default)]
    pub destination_list_gln: Vec<DestinationRef>,
    #[serde(rename = "flatTraceEPCList", default)]
    pub flat_trace_epc_list: Vec<String>,
    #[serde(rename = "flatEPCList", default)]
    pub flat_epc_list: Vec<String>,
    #[serde(rename = "flatGTINList", default)]
    pub flat_gtin_list: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl EventData {
    pub fn source_glns(&self) -> impl Iterator<Item = &str> {
        self.source_list_gln.iter().map(|s| s.source.as_str())
    }

    pub fn destination_glns(&self) -> impl Iterator<Item = &str> {
        self.destination_list_gln.iter().map(|d| d.destination.as_str())
    }

    /// Traced item identifiers (EPCs) this event touches
    pub fn item_ids(&self) -> &[String] {
        &self.flat_trace_epc_list
    }

    pub fn gtins(&self) -> &[String] {
        &self.flat_gtin_list
    }
}

/// A single recorded supply-chain action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub event_type: EventType,
    pub data: EventData,
    #[serde(rename = "BlockchainTXID", default, skip_serializing_if = "Option::is_none")]
    pub blockchain_tx_id: Option<String>,
    #[serde(
        rename = "BlockchainTxTimestamp",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub blockchain_tx_timestamp: Option<String>,
}

impl Event {
    pub fn id(&self) -> &str {
        &self.data.event_id
    }

    pub fn time(&self) -> DateTime<Utc> {
        self.data.event_time
    }
}

/// Party role of a facility
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PartyRole {
    Farm,
    Slaughterer,
    /// Any role code without lifecycle semantics (retailer, processor, ...)
    Other(String),
}

impl From<String> for PartyRole {
    fn from(s: String) -> Self {
        match s.as_str() {
            "FARM" => Self::Farm,
            "SLAUGHTERER" => Self::Slaughterer,
            _ => Self::Other(s),
        }
    }
}

impl From<PartyRole> for String {
    fn from(role: PartyRole) -> Self {
        match role {
            PartyRole::Farm => "FARM".to_string(),
            PartyRole::Slaughterer => "SLAUGHTERER".to_string(),
            PartyRole::Other(s) => s,
        }
    }
}

impl Default for PartyRole {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyRoleInfo {
    #[serde(default)]
    pub party_role_code: PartyRole,
    #[serde(default)]
    pub party_name: String,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyAddress {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub street_address: String,
    #[serde(default)]
    pub state: String,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub postal_code: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub country_code: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// A registered location, keyed by GLN
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Facility {
    #[serde(rename = "locationGLN")]
    pub location_gln: String,
    #[serde(default)]
    pub party_role: PartyRoleInfo,
    #[serde(default)]
    pub party_address: PartyAddress,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_party_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registering_party: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl Facility {
    pub fn role(&self) -> &PartyRole {
        &self.party_role.party_role_code
    }

    /// Stand-in for a GLN that has no facility record
    pub fn unresolved(gln: &str) -> Self {
        Self {
            location_gln: gln.to_string(),
            ..Default::default()
        }
    }
}

/// Application payload attached to events, items and/or facilities.
///
/// `content` is the already-decoded payload body; upstream ships it as a
/// JSON-encoded string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payload {
    #[serde(rename = "payloadID")]
    pub payload_id: String,
    #[serde(rename = "payload")]
    pub content: JsonValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload_time: Option<String>,
    #[serde(default)]
    pub payload_content_type: String,
    #[serde(rename = "payloadTypeURI", default)]
    pub payload_type_uri: String,
    #[serde(default)]
    pub epc_list: Vec<String>,
    #[serde(rename = "locationGLNList", default)]
    pub location_gln_list: Vec<String>,
    #[serde(default)]
    pub location_list: Vec<String>,
    #[serde(rename = "eventIDList", default)]
    pub event_id_list: Vec<String>,
}

/// Product-class reference data, keyed by GTIN
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemMaster {
    #[serde(rename = "objectID")]
    pub object_id: String,
    #[serde(rename = "objectSKU", default)]
    pub object_sku: String,
    #[serde(default)]
    pub object_description: String,
    #[serde(rename = "dataSourceGLN", default, skip_serializing_if = "Option::is_none")]
    pub data_source_gln: Option<String>,
    #[serde(
        rename = "dataRecipientGLN",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub data_recipient_gln: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}
