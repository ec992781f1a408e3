//! Tradegate Core Domain
//!
//! Client-facing domain types for the tradegate futures gateway: orders,
//! queries, status and deal notifications, and the enumerations clients
//! spell as strings (`limit`, `open_long`, `speculation`).
//! This crate contains no async, no I/O, and is 100% unit testable.

pub mod entities;
pub mod error;
pub mod instruments;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{
    Direction, HedgeFlag, OffsetAction, Order, OrderDealNotify, OrderQuery, OrderStatus,
    OrderStatusNotify, OrderType, PositionSide, SubmitStatus,
};
pub use error::DomainError;
pub use instruments::{join_instrument, split_instrument};
pub use values::{Price, Quantity, TimestampMs};
