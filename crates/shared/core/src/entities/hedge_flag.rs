use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::DomainError;

/// Trading intent attached to an order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HedgeFlag {
    #[default]
    Speculation,
    Arbitrage,
    Hedge,
    MarketMaker,
}

impl HedgeFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Speculation => "speculation",
            Self::Arbitrage => "arbitrage",
            Self::Hedge => "hedge",
            Self::MarketMaker => "marketmaker",
        }
    }

    /// Parse a client value, treating an empty string as speculation
    pub fn parse_or_default(s: &str) -> Result<Self, DomainError> {
        if s.is_empty() {
            Ok(Self::default())
        } else {
            s.parse()
        }
    }
}

impl std::fmt::Display for HedgeFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HedgeFlag {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "speculation" => Ok(Self::Speculation),
            "arbitrage" => Ok(Self::Arbitrage),
            "hedge" => Ok(Self::Hedge),
            "marketmaker" => Ok(Self::MarketMaker),
            _ => Err(DomainError::UnsupportedHedgeFlag(s.to_string())),
        }
    }
}
