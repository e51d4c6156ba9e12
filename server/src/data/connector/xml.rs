//! Payload envelope accepted by the connector

use std::fmt::Write;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::domain::provenance::Payload;

const NAMESPACE: &str = "urn:ibm:ift:xsd:1";

fn xml_escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// `<list><item>..</item>...</list>`, or nothing for an empty list
fn push_list(out: &mut String, list: &str, item: &str, values: &[String]) {
    if values.is_empty() {
        return;
    }
    let _ = write!(out, "<{}>", list);
    for value in values {
        let _ = write!(out, "<{item}>{}</{item}>", xml_escape(value));
    }
    let _ = write!(out, "</{}>", list);
}

/// Render one payload message; `payload_time` replaces the payload's own
/// timestamp.
pub fn payload_xml(payload: &Payload, payload_time: DateTime<Utc>) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>");
    let _ = write!(out, "<ift:payload xmlns:ift=\"{}\">", NAMESPACE);
    out.push_str("<payloadMessage>");
    let _ = write!(out, "<payloadID>{}</payloadID>", xml_escape(&payload.payload_id));
    let _ = write!(
        out,
        "<payloadTime>{}</payloadTime>",
        payload_time.to_rfc3339_opts(SecondsFormat::Millis, true)
    );
    let _ = write!(
        out,
        "<payloadContentType>{}</payloadContentType>",
        xml_escape(&payload.payload_content_type)
    );
    let _ = write!(
        out,
        "<payloadTypeURI>{}</payloadTypeURI>",
        xml_escape(&payload.payload_type_uri)
    );
    push_list(&mut out, "eventIDList", "eventID", &payload.event_id_list);
    push_list(&mut out, "epcList", "epc", &payload.epc_list);
    push_list(&mut out, "locationList", "location", &payload.location_list);
    let _ = write!(
        out,
        "<payload>{}</payload>",
        xml_escape(&payload.content.to_string())
    );
    out.push_str("</payloadMessage>");
    out.push_str("</ift:payload>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn payload() -> Payload {
        serde_json::from_value(json!({
            "payloadID": "p<1>",
            "payload": [{ "type": "string", "value": "Tom & Jerry's" }],
            "payloadContentType": "application/json",
            "payloadTypeURI": "urn:ibm:ift:payload:type:json:c4",
            "epcList": ["urn:epc:1", "urn:epc:2"]
        }))
        .unwrap()
    }

    fn time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2018, 6, 1, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_envelope_fields() {
        let xml = payload_xml(&payload(), time());

        assert!(xml.contains("<ift:payload xmlns:ift=\"urn:ibm:ift:xsd:1\">"));
        assert!(xml.contains("<payloadID>p&lt;1&gt;</payloadID>"));
        assert!(xml.contains("<payloadTime>2018-06-01T10:00:00.000Z</payloadTime>"));
        assert!(xml.contains("<payloadContentType>application/json</payloadContentType>"));
        assert!(xml.contains("<payloadTypeURI>urn:ibm:ift:payload:type:json:c4</payloadTypeURI>"));
        assert!(xml.ends_with("</payloadMessage></ift:payload>"));
    }

    #[test]
    fn test_only_non_empty_lists_are_emitted() {
        let xml = payload_xml(&payload(), time());

        assert!(xml.contains("<epcList><epc>urn:epc:1</epc><epc>urn:epc:2</epc></epcList>"));
        assert!(!xml.contains("eventIDList"));
        assert!(!xml.contains("locationList"));
    }

    #[test]
    fn test_content_is_escaped_json() {
        let xml = payload_xml(&payload(), time());
        assert!(xml.contains(
            "<payload>[{&quot;type&quot;:&quot;string&quot;,&quot;value&quot;:&quot;Tom &amp; Jerry&apos;s&quot;}]</payload>"
        ));
    }
}
