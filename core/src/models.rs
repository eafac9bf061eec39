use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{RelayError, Result};

// --- Inbound Shapes ---
// Every field is forwarded as-is. Absent optionals go out as `null`,
// unknown inbound fields are dropped on the floor.

// Payload for the Zapier "catch hook"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookTriggerRequest {
    pub user_input: String,
    pub entity_id: String,
    pub task_type: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub mobile: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub skills: Option<String>,
    #[serde(default)]
    pub tools: Option<String>,
    #[serde(default)]
    pub suggestedroadmap: Option<String>,
    #[serde(default)]
    pub budget: Option<String>,
}

// Something for the memory agent to remember
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryStoreRequest {
    pub text: String,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>, // Opaque, never replaced with `{}`
}

pub const DEFAULT_TOP_K: i64 = 5;

fn default_top_k() -> Option<i64> {
    Some(DEFAULT_TOP_K)
}

// A recall query for the memory agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRetrieveRequest {
    pub query: String,
    pub entity_id: String,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub thread_id: Option<String>,
    // Omitted -> 5. An explicit `null` stays `null`.
    #[serde(default = "default_top_k")]
    pub top_k: Option<i64>,
}

// --- Outbound Shapes ---

pub const TRIGGERED: &str = "triggered";

// What /zapier-action answers with
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriggerResponse {
    pub status: String,
    pub response: Value, // The webhook's own JSON body
}

impl TriggerResponse {
    pub fn triggered(response: Value) -> Self {
        Self {
            status: TRIGGERED.to_string(),
            response,
        }
    }
}

/// Decodes a raw request body into one of the request shapes.
///
/// Structural problems only: bad JSON, a missing required field, or a field of the
/// wrong type. Nothing is checked against the downstream services.
pub fn parse_request<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| RelayError::Validation(e.to_string()))
}
