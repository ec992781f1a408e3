use rust_decimal::Decimal;

/// Price value - uses Decimal for precision
pub type Price = Decimal;

/// Amount in contracts
pub type Quantity = Decimal;

/// Unix timestamp in milliseconds, as carried in client messages
pub type TimestampMs = i64;
