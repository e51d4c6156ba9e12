//! Payload upload through the connector

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::Router;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::{AuthCredential, ValidatedJson};
use crate::api::types::ApiError;
use crate::core::constants::MAX_ID_LEN;
use crate::data::ConnectorClient;
use crate::domain::provenance::Payload;

#[derive(Clone)]
pub struct PayloadsApiState {
    /// `None` when no connector URL is configured
    pub connector: Option<Arc<ConnectorClient>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadPayloadRequest {
    #[serde(rename = "payloadID")]
    #[validate(length(min = 1, max = 256, message = "payloadID must be 1-256 characters"))]
    pub payload_id: String,
    /// Any JSON document; sent to the connector JSON-encoded
    #[serde(rename = "payload")]
    #[schema(value_type = Object)]
    pub content: JsonValue,
    #[validate(length(min = 1, message = "payloadContentType is required"))]
    pub payload_content_type: String,
    #[serde(rename = "payloadTypeURI")]
    #[validate(length(min = 1, message = "payloadTypeURI is required"))]
    pub payload_type_uri: String,
    #[serde(default)]
    #[validate(custom(function = "validate_id_list"))]
    pub epc_list: Vec<String>,
    #[serde(rename = "eventIDList", default)]
    #[validate(custom(function = "validate_id_list"))]
    pub event_id_list: Vec<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_id_list"))]
    pub location_list: Vec<String>,
}

fn validate_id_list(ids: &[String]) -> Result<(), validator::ValidationError> {
    if ids.iter().any(|id| id.is_empty() || id.len() > MAX_ID_LEN) {
        return Err(validator::ValidationError::new("id_length").with_message(
            format!("Identifiers must be 1-{} characters", MAX_ID_LEN).into(),
        ));
    }
    Ok(())
}

impl UploadPayloadRequest {
    fn into_payload(self) -> Payload {
        Payload {
            payload_id: self.payload_id,
            content: self.content,
            payload_time: None,
            payload_content_type: self.payload_content_type,
            payload_type_uri: self.payload_type_uri,
            epc_list: self.epc_list,
            location_gln_list: Vec::new(),
            location_list: self.location_list,
            event_id_list: self.event_id_list,
        }
    }
}

pub fn routes(connector: Option<Arc<ConnectorClient>>) -> Router<()> {
    let state = PayloadsApiState { connector };
    Router::new()
        .route("/", post(upload_payload))
        .with_state(state)
}

/// Upload a payload to the connector
#[utoipa::path(
    post,
    path = "/api/v1/payloads",
    tag = "payloads",
    request_body = UploadPayloadRequest,
    responses(
        (status = 202, description = "Payload accepted by the connector"),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Missing Authorization header"),
        (status = 502, description = "Connector rejected the payload"),
        (status = 503, description = "No connector configured")
    )
)]
pub async fn upload_payload(
    State(state): State<PayloadsApiState>,
    AuthCredential(credential): AuthCredential,
    ValidatedJson(request): ValidatedJson<UploadPayloadRequest>,
) -> Result<StatusCode, ApiError> {
    let Some(connector) = state.connector.as_ref() else {
        return Err(ApiError::service_unavailable(
            "Payload uploads are disabled: no connector URL configured",
        ));
    };
    connector
        .upload_payload(&credential, &request.into_payload())
        .await?;
    Ok(StatusCode::ACCEPTED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use httpmock::prelude::*;
    use serde_json::json;
    use tower::ServiceExt;

    fn body() -> JsonValue {
        json!({
            "payloadID": "p-42",
            "payload": [{ "type": "string", "value": "C4 Consumer App Data" }],
            "payloadContentType": "application/json",
            "payloadTypeURI": "urn:ibm:ift:payload:type:json:consumer",
            "epcList": ["urn:epc:id:sgtin:4012345.011111.1"]
        })
    }

    async fn post_payload(
        connector: Option<Arc<ConnectorClient>>,
        body: JsonValue,
    ) -> (StatusCode, JsonValue) {
        let resp = routes(connector)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header("Authorization", "Bearer onboarding")
                    .header("Content-Type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            JsonValue::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn test_upload_accepted() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/fs/connector/v1/assets")
                    .header("Authorization", "Bearer onboarding")
                    .body_includes("<payloadID>p-42</payloadID>");
                then.status(200);
            })
            .await;
        let connector = ConnectorClient::new(&server.base_url(), 5).unwrap();

        let (status, _) = post_payload(Some(Arc::new(connector)), body()).await;

        assert_eq!(status, StatusCode::ACCEPTED);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_no_connector_is_503() {
        let (status, body) = post_payload(None, body()).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["code"], "SERVICE_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_missing_type_uri_is_400() {
        let mut invalid = body();
        invalid["payloadTypeURI"] = json!("");
        let (status, body) = post_payload(None, invalid).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["message"], "payloadTypeURI is required");
    }

    #[tokio::test]
    async fn test_connector_rejection_is_502() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/fs/connector/v1/assets");
                then.status(422);
            })
            .await;
        let connector = ConnectorClient::new(&server.base_url(), 5).unwrap();

        let (status, body) = post_payload(Some(Arc::new(connector)), body()).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["code"], "UPSTREAM_FAILURE");
    }
}
