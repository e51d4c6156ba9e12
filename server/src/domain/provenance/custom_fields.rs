//! Consumer-app custom fields carried inside generic payloads
//!
//! A payload whose content is a field list led by a string field equal to
//! [`CONSUMER_APP_MARKER`] carries application data in the fields that follow
//! the marker. Readers address those fields by position.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::types::Payload;
use crate::utils::json::scalar_to_string;

/// Marker value that opens a consumer-app field list
pub const CONSUMER_APP_MARKER: &str = "C4 Consumer App Data";

/// Value reported for a custom field that is not present
pub const MISSING_FIELD_VALUE: &str = "NA";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomField {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default)]
    pub value: JsonValue,
}

impl CustomField {
    fn is_marker(&self) -> bool {
        self.kind == "string" && self.value.as_str() == Some(CONSUMER_APP_MARKER)
    }

    pub fn text(&self) -> Option<String> {
        scalar_to_string(&self.value)
    }
}

/// Positional custom fields that follow the marker
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomFields(Vec<CustomField>);

impl CustomFields {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, index: usize) -> Option<&CustomField> {
        self.0.get(index)
    }

    /// Text of field `index`, or [`MISSING_FIELD_VALUE`]
    pub fn text_or_default(&self, index: usize) -> String {
        self.get(index)
            .and_then(CustomField::text)
            .unwrap_or_else(|| MISSING_FIELD_VALUE.to_string())
    }
}

/// Custom fields of the first payload that carries the consumer-app marker.
///
/// Payloads whose content is not a field list are skipped.
pub fn consumer_app_fields(payloads: &[Payload]) -> CustomFields {
    for payload in payloads {
        let Ok(mut fields) = serde_json::from_value::<Vec<CustomField>>(payload.content.clone())
        else {
            continue;
        };
        if fields.first().is_some_and(CustomField::is_marker) {
            fields.remove(0);
            return CustomFields(fields);
        }
    }
    CustomFields::default()
}
