//! Response envelopes of the provenance proxy

use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::error::ProxyError;
use crate::domain::provenance::{Event, EventChain, EventData, EventType, Payload};

/// `{ "data": { "assets": [ { "data": T }, ... ] } }`
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct AssetList<T> {
    #[serde(default)]
    data: Option<AssetPage<T>>,
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct AssetPage<T> {
    #[serde(default = "Vec::new")]
    assets: Vec<Asset<T>>,
}

#[derive(Debug, Deserialize)]
struct Asset<T> {
    data: T,
}

impl<T> AssetList<T> {
    pub fn into_records(self) -> Vec<T> {
        self.data
            .map(|page| page.assets.into_iter().map(|asset| asset.data).collect())
            .unwrap_or_default()
    }
}

/// Most recent event of an item, with linked events nested below it.
///
/// Every field is optional: an unknown item comes back as `{}`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventLink {
    #[serde(default)]
    event_type: Option<EventType>,
    #[serde(default)]
    data: Option<EventData>,
    #[serde(default)]
    linked: Vec<EventLink>,
}

impl EventLink {
    /// Root event plus every linked event, depth first.
    ///
    /// `None` when the root carries no event data.
    pub fn into_chain(self) -> Option<EventChain> {
        let EventLink {
            event_type,
            data,
            linked,
        } = self;
        let root = to_event(event_type, data?);

        let mut flattened = Vec::new();
        for link in linked {
            link.flatten_into(&mut flattened);
        }
        Some(EventChain {
            root,
            linked: flattened,
        })
    }

    fn flatten_into(self, out: &mut Vec<Event>) {
        match self.data {
            Some(data) => out.push(to_event(self.event_type, data)),
            None => tracing::debug!("Skipping linked event without data"),
        }
        for link in self.linked {
            link.flatten_into(out);
        }
    }
}

fn to_event(event_type: Option<EventType>, data: EventData) -> Event {
    Event {
        event_type: event_type.unwrap_or_else(|| EventType::Other(String::new())),
        data,
        blockchain_tx_id: None,
        blockchain_tx_timestamp: None,
    }
}

/// Upstream ships payload bodies as JSON-encoded strings
pub fn decode_payload(endpoint: &'static str, mut payload: Payload) -> Result<Payload, ProxyError> {
    if let JsonValue::String(encoded) = &payload.content {
        payload.content = serde_json::from_str(encoded).map_err(|e| {
            ProxyError::parse(endpoint, format!("payload {}: {}", payload.payload_id, e))
        })?;
    }
    Ok(payload)
}

/// `null` and `{}` stand for "no such event"
pub fn decode_optional_event(
    endpoint: &'static str,
    body: JsonValue,
) -> Result<Option<Event>, ProxyError> {
    match &body {
        JsonValue::Null => Ok(None),
        JsonValue::Object(map) if map.is_empty() => Ok(None),
        _ => serde_json::from_value(body)
            .map(Some)
            .map_err(|e| ProxyError::parse(endpoint, e)),
    }
}
