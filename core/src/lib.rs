//! Relay core: request shapes, configuration and the outbound client that
//! forwards validated requests to the webhook and memory services.

pub mod config;
pub mod error;
pub mod models;
pub mod relay;

pub use config::RelayConfig;
pub use error::{RelayError, Result, UpstreamTarget};
pub use models::{
    parse_request, MemoryRetrieveRequest, MemoryStoreRequest, TriggerResponse, WebhookTriggerRequest,
};
pub use relay::Relay;
