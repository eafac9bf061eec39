use std::fmt;

use thiserror::Error;

// Which downstream collaborator a forward was aimed at.
// The context string is the prefix every gateway error detail starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamTarget {
    ZapierWebhook,
    MemoryStore,
    MemoryRetrieve,
}

impl UpstreamTarget {
    pub fn context(&self) -> &'static str {
        match self {
            UpstreamTarget::ZapierWebhook => "Error calling Zapier webhook",
            UpstreamTarget::MemoryStore => "Error forwarding to memory agent store",
            UpstreamTarget::MemoryRetrieve => "Error forwarding to memory agent retrieve",
        }
    }
}

impl fmt::Display for UpstreamTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UpstreamTarget::ZapierWebhook => "zapier_webhook",
            UpstreamTarget::MemoryStore => "memory_store",
            UpstreamTarget::MemoryRetrieve => "memory_retrieve",
        };
        f.write_str(name)
    }
}

/// Everything that can go wrong between receiving a request and answering it.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The inbound body did not match the request schema. Raised before any outbound call.
    #[error("{0}")]
    Validation(String),

    /// The downstream call failed: transport error, timeout, non-2xx status or a body that isn't JSON.
    #[error("{}: {message}", .target.context())]
    Upstream {
        target: UpstreamTarget,
        message: String,
    },

    /// Missing or unusable configuration at start-up.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl RelayError {
    pub fn upstream(target: UpstreamTarget, message: impl Into<String>) -> Self {
        RelayError::Upstream {
            target,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;
