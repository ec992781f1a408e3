use serde::{Deserialize, Serialize};

/// Order query filters; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exchange: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outside_id: Option<String>,
}

impl OrderQuery {
    /// Exchange filter, ignoring empty strings
    pub fn exchange(&self) -> Option<&str> {
        non_empty(&self.exchange)
    }

    /// Instrument filter; only set when both symbol and contract are given
    pub fn instrument(&self) -> Option<(&str, &str)> {
        non_empty(&self.symbol).zip(non_empty(&self.contract))
    }

    /// Outside id filter, ignoring empty strings
    pub fn outside_id(&self) -> Option<&str> {
        non_empty(&self.outside_id)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}
