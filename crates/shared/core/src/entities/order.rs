use serde::{Deserialize, Serialize};

use crate::instruments::join_instrument;
use crate::values::{Price, Quantity, TimestampMs};

/// Client-facing order
///
/// The enumerated fields (`order_type`, `dir`, `hedge_flag`) stay as the raw
/// client strings so an unknown value is reported by the gateway as a typed
/// error instead of a JSON decoding failure. Parse them with
/// [`OrderType`](super::OrderType), [`Direction`](super::Direction) and
/// [`HedgeFlag`](super::HedgeFlag).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Order {
    /// Source protocol that produced the order (e.g. `ctp`)
    pub market: String,
    pub exchange: String,
    /// Instrument class (e.g. `future`)
    #[serde(rename = "type")]
    pub instrument_type: String,
    /// Product code, e.g. `rb`
    pub symbol: String,
    /// Delivery month, e.g. `2501`
    pub contract: String,
    pub contract_id: String,
    /// `limit` or `market`
    pub order_type: String,
    /// `<action>_<side>`, e.g. `open_long`
    pub dir: String,
    #[serde(rename = "order_flag1")]
    pub hedge_flag: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Price,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Quantity,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Price,
    /// Unix milliseconds
    pub ts: TimestampMs,
    /// Broker-assigned id, empty until the broker has acknowledged the order
    pub outside_id: String,
}

impl Order {
    /// Wire instrument code (`symbol` followed by `contract`)
    pub fn instrument_code(&self) -> String {
        join_instrument(&self.symbol, &self.contract)
    }

    pub fn has_outside_id(&self) -> bool {
        !self.outside_id.is_empty()
    }
}
