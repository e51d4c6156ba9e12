//! Consumer-facing narrative of an item's life

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::custom_fields::consumer_app_fields;
use super::error::ProvenanceError;
use super::lifecycle::{LifecycleEvent, synthesize};
use super::record_set::RecordSet;

/// Descriptive header shown above the lifecycle events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct NarrativeDetail {
    pub description: String,
    pub end_date: String,
    /// Degrees C
    pub high_temp: i32,
    /// Degrees C
    pub low_temp: i32,
    pub provider_image_list: Vec<String>,
    pub use_mode: String,
}

impl Default for NarrativeDetail {
    fn default() -> Self {
        Self {
            description: "Example Description".to_string(),
            end_date: String::new(),
            high_temp: 4,
            low_temp: 4,
            provider_image_list: vec![String::new()],
            use_mode: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DataModelUi {
    pub detail: NarrativeDetail,
    pub event_list: Vec<LifecycleEvent>,
}

/// Lifecycle events of every facility in GLN order, closed by a delivery
/// event for the queried item.
pub fn assemble(
    record_set: &RecordSet,
    detail: NarrativeDetail,
) -> Result<DataModelUi, ProvenanceError> {
    let mut event_list = Vec::new();
    for facility in record_set.facility_map.values() {
        event_list.extend(synthesize(facility, record_set)?);
    }

    let delivery_fields = record_set
        .queried_epc
        .as_deref()
        .map(|epc| consumer_app_fields(record_set.item_payloads_for(epc)))
        .unwrap_or_default();
    event_list.push(LifecycleEvent::delivery(delivery_fields.text_or_default(0)));

    tracing::debug!(
        facilities = record_set.facility_map.len(),
        events = event_list.len(),
        "Narrative assembled"
    );

    Ok(DataModelUi { detail, event_list })
}
