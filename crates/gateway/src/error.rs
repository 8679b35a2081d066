//! Error types for the gateway crate

use sparx_core::DomainError;
use thiserror::Error;

/// Transport-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Channel closed")]
    ChannelClosed,
}

/// Gateway-level errors (decoding and normalizing exchange messages)
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Malformed message: {0}")]
    Malformed(String),

    #[error("Upstream channel error: {0}")]
    Upstream(String),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid market data: {0}")]
    Domain(#[from] DomainError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GatewayError {
    /// True for errors caused by a single bad message, after which the
    /// stream can continue
    pub fn is_per_message(&self) -> bool {
        matches!(
            self,
            GatewayError::Malformed(_)
                | GatewayError::Upstream(_)
                | GatewayError::Decode(_)
                | GatewayError::Domain(_)
        )
    }
}
