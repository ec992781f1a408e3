//! Error types for the gateway crate

use crate::config::ConfigError;
use crate::messages::ClientHandle;
use thiserror::Error;
use tradegate_core::DomainError;

/// Transport-level errors
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Channel closed")]
    ChannelClosed,

    #[error("Unknown client: {0}")]
    UnknownClient(ClientHandle),

    #[error("Send failed: {0}")]
    Send(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for TransportError {
    fn from(e: serde_json::Error) -> Self {
        TransportError::Serialization(e.to_string())
    }
}

/// The broker session refused a call before it reached the wire
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("broker session refused the call (code {code})")]
pub struct SessionError {
    pub code: i32,
}

/// Gateway-level errors, raised synchronously before any broker call
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Broker session not ready")]
    NotReady,

    #[error("Unsupported order type: {0:?}")]
    UnsupportedOrderType(String),

    #[error("Unsupported order dir: {0:?}")]
    UnsupportedDirection(String),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl From<DomainError> for GatewayError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::UnsupportedOrderType(s) => GatewayError::UnsupportedOrderType(s),
            DomainError::UnsupportedDirection(s) => GatewayError::UnsupportedDirection(s),
            DomainError::UnsupportedHedgeFlag(_) => GatewayError::Validation(e.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;
