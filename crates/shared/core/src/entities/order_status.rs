use serde::{Deserialize, Serialize};

/// Client-visible order status
///
/// The broker reports many fine-grained states; they collapse into these four.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Unknown,
    PartiallyFilled,
    FullyFilled,
    Canceled,
}

impl OrderStatus {
    /// Returns true if no further fills can arrive
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::FullyFilled | OrderStatus::Canceled)
    }
}

/// Client-visible submission status of the last insert/cancel/modify request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitStatus {
    #[default]
    Unknown,
    Submitted,
    Accepted,
    Rejected,
}
