use serde::{Deserialize, Serialize};

use super::{OrderStatus, SubmitStatus};
use crate::values::{Price, Quantity, TimestampMs};

/// Status update for an order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderStatusNotify {
    pub order_status: OrderStatus,
    #[serde(rename = "order_submit_status")]
    pub submit_status: SubmitStatus,
    /// Requested amount
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Quantity,
    /// Filled so far
    #[serde(with = "rust_decimal::serde::float")]
    pub dealed_amount: Quantity,
}

impl OrderStatusNotify {
    pub fn remaining(&self) -> Quantity {
        self.amount - self.dealed_amount
    }
}

/// One execution against an order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderDealNotify {
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Price,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Quantity,
    /// Exchange trading day, `YYYYMMDD`
    pub trading_day: String,
    pub trade_id: String,
    /// Unix milliseconds
    pub ts: TimestampMs,
}
