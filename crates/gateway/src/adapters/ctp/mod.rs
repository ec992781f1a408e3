//! CTP (China futures) adapter
//!
//! Bridges a CTP trader session to JSON clients.
//!
//! ```text
//! client command ─► RequestDispatcher ─► BrokerSession (vendor API)
//!                        │ records                 │
//!                        ▼                         ▼
//!              Order/Query correlation ◄── EventRouter ◄── BrokerCallbacks
//!                                              │
//!                                              ▼
//!                                    NotificationEmitter ─► clients
//! ```

pub mod correlation;
pub mod dispatcher;
pub mod gateway;
pub mod router;
pub mod session;
pub mod state;
pub mod translator;
pub mod wire;

pub use correlation::{OrderCorrelationStore, PendingOrderKey, QueryCorrelationCache};
pub use dispatcher::RequestDispatcher;
pub use gateway::CtpGateway;
pub use router::EventRouter;
pub use session::{BrokerCallbacks, BrokerEvent, BrokerSession};
pub use state::{ConnectionContext, SessionCommand, SessionState, SessionStateMachine};
