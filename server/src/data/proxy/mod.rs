//! HTTP client for the provenance proxy
//!
//! Every call is a `GET {base}/CONSUMER/{endpoint}?{param}=id1,id2,...`
//! carrying the caller's credential in `Authorization`.

mod error;
mod wire;

pub use error::ProxyError;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::core::config::ProxyConfig;
use crate::domain::provenance::{
    Credential, Event, EventChain, Facility, ItemMaster, Payload, TraceSource,
};
use wire::{AssetList, EventLink, decode_optional_event, decode_payload};

const EVENT_CHAIN: &str = "getMostRecentEventByEPCClass";
const EVENT_DETAIL: &str = "getEventDetailByEventId";
const FACILITIES: &str = "getFacilities";
const ITEM_PAYLOADS: &str = "getPayloadsForEPCs";
const LOCATION_PAYLOADS: &str = "getPayloadsForGLNs";
const ITEM_MASTERS: &str = "getItemsByGTINs";

#[derive(Debug, Clone)]
pub struct ProxyClient {
    client: reqwest::Client,
    base_url: String,
}

impl ProxyClient {
    pub fn new(config: &ProxyConfig) -> Result<Self, ProxyError> {
        let base_url = config.url.trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|e| ProxyError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        tracing::debug!(url = %base_url, timeout_secs = config.timeout_secs, "Proxy client initialized");
        Ok(Self { client, base_url })
    }

    /// `{base}/CONSUMER/{endpoint}?{param}=a,b`, commas left literal
    fn endpoint_url(&self, endpoint: &'static str, param: &str, ids: &[&str]) -> Result<Url, ProxyError> {
        let raw = format!("{}/CONSUMER/{}", self.base_url, endpoint);
        let mut url = Url::parse(&raw).map_err(|e| ProxyError::InvalidUrl(format!("{}: {}", raw, e)))?;
        let value: Vec<String> = ids.iter().map(|id| encode_query_value(id)).collect();
        url.set_query(Some(&format!("{}={}", param, value.join(","))));
        Ok(url)
    }

    async fn send(
        &self,
        credential: &Credential,
        endpoint: &'static str,
        param: &str,
        ids: &[&str],
    ) -> Result<reqwest::Response, ProxyError> {
        let url = self.endpoint_url(endpoint, param, ids)?;
        let resp = self
            .client
            .get(url)
            .header(AUTHORIZATION, credential.expose())
            .send()
            .await?;
        tracing::debug!(endpoint, status = resp.status().as_u16(), "Proxy call");
        Ok(resp)
    }

    /// Single-record lookup; 404 or an empty body means the record is unknown
    async fn get_lookup<T: DeserializeOwned>(
        &self,
        credential: &Credential,
        endpoint: &'static str,
        param: &str,
        id: &str,
    ) -> Result<Option<T>, ProxyError> {
        let resp = self.send(credential, endpoint, param, &[id]).await?;
        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(ProxyError::Status { endpoint, status });
        }
        let body = resp.text().await?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&body)
            .map(Some)
            .map_err(|e| ProxyError::parse(endpoint, e))
    }

    /// Batched lookup; any non-2xx status fails the whole batch
    async fn get_assets<T: DeserializeOwned>(
        &self,
        credential: &Credential,
        endpoint: &'static str,
        param: &str,
        ids: &[String],
    ) -> Result<Vec<T>, ProxyError> {
        let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
        let resp = self.send(credential, endpoint, param, &ids).await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ProxyError::Status { endpoint, status });
        }
        let body = resp.text().await?;
        let list: AssetList<T> =
            serde_json::from_str(&body).map_err(|e| ProxyError::parse(endpoint, e))?;
        let records = list.into_records();
        tracing::debug!(endpoint, requested = ids.len(), returned = records.len(), "Fetched assets");
        Ok(records)
    }

    async fn get_payloads(
        &self,
        credential: &Credential,
        endpoint: &'static str,
        param: &str,
        ids: &[String],
    ) -> Result<Vec<Payload>, ProxyError> {
        self.get_assets(credential, endpoint, param, ids)
            .await?
            .into_iter()
            .map(|payload| decode_payload(endpoint, payload))
            .collect()
    }
}

/// Percent-encode the characters that would split a query value
fn encode_query_value(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    for c in id.chars() {
        match c {
            '%' => out.push_str("%25"),
            '&' => out.push_str("%26"),
            '+' => out.push_str("%2B"),
            ',' => out.push_str("%2C"),
            '=' => out.push_str("%3D"),
            '#' => out.push_str("%23"),
            ' ' => out.push_str("%20"),
            _ => out.push(c),
        }
    }
    out
}

#[async_trait]
impl TraceSource for ProxyClient {
    async fn fetch_event_chain(
        &self,
        credential: &Credential,
        epc: &str,
    ) -> Result<Option<EventChain>, ProxyError> {
        let link: Option<EventLink> = self.get_lookup(credential, EVENT_CHAIN, "epc", epc).await?;
        Ok(link.and_then(EventLink::into_chain))
    }

    async fn fetch_event(
        &self,
        credential: &Credential,
        event_id: &str,
    ) -> Result<Option<Event>, ProxyError> {
        let body: Option<JsonValue> = self
            .get_lookup(credential, EVENT_DETAIL, "eventID", event_id)
            .await?;
        match body {
            Some(body) => decode_optional_event(EVENT_DETAIL, body),
            None => Ok(None),
        }
    }

    async fn fetch_facilities(
        &self,
        credential: &Credential,
        glns: &[String],
    ) -> Result<Vec<Facility>, ProxyError> {
        self.get_assets(credential, FACILITIES, "glns", glns).await
    }

    async fn fetch_item_payloads(
        &self,
        credential: &Credential,
        epcs: &[String],
    ) -> Result<Vec<Payload>, ProxyError> {
        self.get_payloads(credential, ITEM_PAYLOADS, "epcs", epcs).await
    }

    async fn fetch_location_payloads(
        &self,
        credential: &Credential,
        glns: &[String],
    ) -> Result<Vec<Payload>, ProxyError> {
        self.get_payloads(credential, LOCATION_PAYLOADS, "glns", glns).await
    }

    async fn fetch_item_masters(
        &self,
        credential: &Credential,
        gtins: &[String],
    ) -> Result<Vec<ItemMaster>, ProxyError> {
        self.get_assets(credential, ITEM_MASTERS, "gtins", gtins).await
    }

    fn name(&self) -> &'static str {
        "provenance-proxy"
    }
}
