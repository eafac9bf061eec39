use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, info_span, Instrument};

use crate::config::RelayConfig;
use crate::error::{RelayError, Result, UpstreamTarget};
use crate::models::{MemoryRetrieveRequest, MemoryStoreRequest, TriggerResponse, WebhookTriggerRequest};

// Cap on how much of a downstream error body ends up in the gateway detail
const MAX_ERROR_BODY_CHARS: usize = 1024;

// The Relay
// Holds one pooled HTTP client for the lifetime of the process.
// Cloning is cheap and every clone shares the same connection pool.
#[derive(Debug, Clone)]
pub struct Relay {
    client: Client,
    webhook_url: String,
    memory_store_url: String,
    memory_retrieve_url: String,
}

impl Relay {
    pub fn new(config: &RelayConfig) -> Result<Self> {
        // 3xx answers are surfaced as-is, never followed as a bodiless GET
        let client = Client::builder()
            .timeout(config.upstream_timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| RelayError::Config(format!("failed to build HTTP client: {e}")))?;

        info!(
            webhook_host = config.webhook_url.host_str().unwrap_or("-"),
            memory = %config.memory_base_url,
            "Relay ready"
        );

        Ok(Self {
            client,
            webhook_url: config.webhook_url.to_string(),
            memory_store_url: config.memory_store_url(),
            memory_retrieve_url: config.memory_retrieve_url(),
        })
    }

    /// Fires the Zapier webhook and wraps whatever it answers.
    pub async fn trigger_webhook(&self, request: &WebhookTriggerRequest) -> Result<TriggerResponse> {
        let body = self
            .forward(UpstreamTarget::ZapierWebhook, &self.webhook_url, request)
            .await?;
        Ok(TriggerResponse::triggered(body))
    }

    pub async fn store_memory(&self, request: &MemoryStoreRequest) -> Result<Value> {
        self.forward(UpstreamTarget::MemoryStore, &self.memory_store_url, request)
            .await
    }

    pub async fn retrieve_memory(&self, request: &MemoryRetrieveRequest) -> Result<Value> {
        self.forward(UpstreamTarget::MemoryRetrieve, &self.memory_retrieve_url, request)
            .await
    }

    // One POST, one answer. No retries.
    async fn forward<T: Serialize>(&self, target: UpstreamTarget, url: &str, payload: &T) -> Result<Value> {
        let span = info_span!("forward", upstream = %target, url = %url);

        async move {
            let result = self.send(target, url, payload).await;
            if let Err(e) = &result {
                error!("{}", e);
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn send<T: Serialize>(&self, target: UpstreamTarget, url: &str, payload: &T) -> Result<Value> {
        // 1. Ship it
        let response = self
            .client
            .post(url)
            .json(payload)
            .send()
            .await
            .map_err(|e| RelayError::upstream(target, describe_transport_error(&e)))?;

        // 2. Anything but 2xx is the downstream's failure, passed back with its own words
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(RelayError::upstream(target, describe_status(status, url, &text)));
        }

        // 3. The answer has to be JSON, we hand it back untouched
        let body = response.bytes().await.map_err(|e| {
            RelayError::upstream(target, format!("failed to read response body: {}", describe_transport_error(&e)))
        })?;
        let value: Value = serde_json::from_slice(&body).map_err(|e| {
            RelayError::upstream(target, format!("invalid JSON in response from '{url}': {e}"))
        })?;

        info!(status = status.as_u16(), "{} succeeded", target);
        Ok(value)
    }
}

fn describe_transport_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("request timed out: {e}")
    } else if e.is_connect() {
        format!("connection failed: {e}")
    } else {
        e.to_string()
    }
}

fn describe_status(status: StatusCode, url: &str, body: &str) -> String {
    let kind = if status.is_client_error() {
        "Client error"
    } else if status.is_server_error() {
        "Server error"
    } else {
        "Unexpected status"
    };

    let body = body.trim();
    if body.is_empty() {
        return format!("{kind} '{status}' for url '{url}'");
    }

    let excerpt: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
    let ellipsis = if excerpt.len() < body.len() { "..." } else { "" };
    format!("{kind} '{status}' for url '{url}': {excerpt}{ellipsis}")
}
