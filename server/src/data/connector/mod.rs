//! Upload client for the food-trust connector

mod xml;

use std::time::Duration;

use chrono::Utc;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{StatusCode, Url};
use thiserror::Error;

use crate::domain::provenance::{Credential, Payload};

const ASSETS_PATH: &str = "/fs/connector/v1/assets";

#[derive(Error, Debug)]
pub enum ConnectorError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Connector rejected payload {payload_id}: {status}")]
    Rejected {
        payload_id: String,
        status: StatusCode,
    },

    #[error("Invalid connector URL: {0}")]
    InvalidUrl(String),
}

#[derive(Debug, Clone)]
pub struct ConnectorClient {
    client: reqwest::Client,
    assets_url: Url,
}

impl ConnectorClient {
    pub fn new(url: &str, timeout_secs: u64) -> Result<Self, ConnectorError> {
        let raw = format!("{}{}", url.trim_end_matches('/'), ASSETS_PATH);
        let assets_url =
            Url::parse(&raw).map_err(|e| ConnectorError::InvalidUrl(format!("{}: {}", raw, e)))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        tracing::debug!(url = %assets_url, "Connector client initialized");
        Ok(Self { client, assets_url })
    }

    /// POST one payload as an XML payload message
    pub async fn upload_payload(
        &self,
        credential: &Credential,
        payload: &Payload,
    ) -> Result<(), ConnectorError> {
        let body = xml::payload_xml(payload, Utc::now());
        tracing::debug!(payload_id = %payload.payload_id, bytes = body.len(), "Uploading payload");

        let resp = self
            .client
            .post(self.assets_url.clone())
            .header(AUTHORIZATION, credential.expose())
            .header(CONTENT_TYPE, "application/xml")
            .body(body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ConnectorError::Rejected {
                payload_id: payload.payload_id.clone(),
                status,
            });
        }
        tracing::info!(payload_id = %payload.payload_id, "Payload uploaded");
        Ok(())
    }
}
