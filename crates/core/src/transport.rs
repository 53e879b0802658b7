//! Delivery of outbound bundles to the client endpoint.
//!
//! The responder only depends on [`BundleTransport`]; [`RestClient`] is the HTTP implementation
//! used in production. Each send is a FHIR transaction: the bundle is POSTed to the client base
//! URL as `application/json+fhir`.

use crate::constants::TRANSPORT_TIMEOUT_SECS;
use crate::TransportError;
use async_trait::async_trait;
use fhir::{Bundle, FHIR_JSON_MIME};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Url};
use std::time::Duration;

/// What the client endpoint answered to a transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionReceipt {
    pub status: u16,
    /// Number of entries in the returned bundle, when the body was one.
    pub entries: Option<usize>,
}

/// Sends a bundle to the client endpoint.
#[async_trait]
pub trait BundleTransport: Send + Sync {
    async fn transaction(&self, bundle: &Bundle) -> Result<TransactionReceipt, TransportError>;
}

/// HTTP transport for the configured client base URL.
#[derive(Clone, Debug)]
pub struct RestClient {
    http_client: Client,
    base_url: Url,
}

impl RestClient {
    /// # Errors
    ///
    /// Returns [`TransportError::Client`] if the HTTP client cannot be constructed.
    pub fn new(base_url: Url) -> Result<Self, TransportError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(TRANSPORT_TIMEOUT_SECS))
            .build()
            .map_err(TransportError::Client)?;
        Ok(Self {
            http_client,
            base_url,
        })
    }
}

#[async_trait]
impl BundleTransport for RestClient {
    async fn transaction(&self, bundle: &Bundle) -> Result<TransactionReceipt, TransportError> {
        let body = bundle.to_json().map_err(TransportError::Serialization)?;

        let response = self
            .http_client
            .post(self.base_url.clone())
            .header(CONTENT_TYPE, FHIR_JSON_MIME)
            .header(ACCEPT, FHIR_JSON_MIME)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(TransactionReceipt {
            status: status.as_u16(),
            entries: count_entries(&text),
        })
    }
}

fn count_entries(body: &str) -> Option<usize> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    if value.get("resourceType")?.as_str()? != "Bundle" {
        return None;
    }
    Some(
        value
            .get("entry")
            .and_then(serde_json::Value::as_array)
            .map_or(0, Vec::len),
    )
}
