//! Parse errors for the client-facing enumerations

use thiserror::Error;

/// Raised when a client string does not name a known enumerator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("unsupported order type: {0:?}")]
    UnsupportedOrderType(String),

    #[error("unsupported order dir: {0:?}")]
    UnsupportedDirection(String),

    #[error("unsupported hedge flag: {0:?}")]
    UnsupportedHedgeFlag(String),
}
