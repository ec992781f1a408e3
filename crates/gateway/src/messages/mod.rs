//! Message types exchanged with clients
//!
//! Clients speak JSON; every message is a `{"msg", "data"}` envelope.

pub mod client;

pub use client::{
    ClientCommand, ClientHandle, ClientRequest, CommandOutcome, Notification, OrderWithStatus,
    QUERY_EXPIRED, RejectReason, SESSION_LOST,
};
