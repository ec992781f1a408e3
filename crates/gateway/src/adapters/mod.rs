//! Broker adapters
//!
//! Adapters translate between a broker's native API and the client-facing
//! order model. CTP is the only one so far.

pub mod ctp;

pub use ctp::{BrokerCallbacks, BrokerEvent, BrokerSession, CtpGateway};
