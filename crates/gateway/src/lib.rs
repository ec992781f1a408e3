//! Tradegate Gateway
//!
//! Bridges a CTP futures broker session to JSON clients. Provides:
//! - Broker session state machine (connect, authenticate, login, settle)
//! - Order and query correlation across the two asynchronous streams
//! - Translation between CTP records and the client order model
//! - Transport abstraction (tokio channels, with traits for the client server)
//!
//! ## Architecture
//!
//! ```text
//!   JSON clients
//!         │ insert_order / cancel_order / query_order
//!    ┌────▼────┐
//!    │ Gateway │  dispatcher ─► BrokerSession
//!    │         │  router     ◄─ BrokerCallbacks
//!    └────┬────┘
//!         │ order_confirm / order_status / order_deal (broadcast)
//!         │ query_reply (to the asking client)
//!         ▼
//!   JSON clients
//! ```
//!
//! ## Transport
//!
//! Client commands arrive through a `CommandSender`/`CommandReceiver`
//! pair and notifications leave through a `ChannelEmitter`. The socket
//! server that frames JSON on the wire lives outside this crate.

pub mod adapters;
pub mod audit;
pub mod config;
pub mod error;
pub mod messages;
pub mod transport;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use adapters::ctp::{BrokerCallbacks, BrokerEvent, BrokerSession, CtpGateway};
pub use config::{ConfigError, GatewayConfig, ListenConfig};
pub use error::{GatewayError, Result, SessionError, TransportError};
pub use messages::{
    ClientCommand, ClientHandle, ClientRequest, CommandOutcome, Notification, OrderWithStatus,
    RejectReason,
};
pub use transport::{
    ChannelEmitter, CommandReceiver, CommandSender, NotificationEmitter, PendingCommand, Publisher,
    Requester, Subscriber, command_channel,
    channel::{ChannelPublisher, ChannelSubscriber},
};
