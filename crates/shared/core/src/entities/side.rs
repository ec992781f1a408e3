use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::DomainError;

/// Position effect of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OffsetAction {
    Open,
    Close,
    CloseToday,
    CloseYesterday,
}

impl OffsetAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Close => "close",
            Self::CloseToday => "closetoday",
            Self::CloseYesterday => "closeyesterday",
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "open" => Some(Self::Open),
            "close" => Some(Self::Close),
            "closetoday" => Some(Self::CloseToday),
            "closeyesterday" => Some(Self::CloseYesterday),
            _ => None,
        }
    }
}

/// Which side of the position the order affects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionSide {
    Long,
    Short,
}

impl PositionSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Long => "long",
            Self::Short => "short",
        }
    }

    /// Returns the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Self::Long => Self::Short,
            Self::Short => Self::Long,
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "long" => Some(Self::Long),
            "short" => Some(Self::Short),
            _ => None,
        }
    }
}

/// Client order direction, written `<action>_<side>` on the wire (e.g. `open_long`)
///
/// Opening a long and closing a short both buy; the other two combinations
/// sell. `is_buy` and `from_buy` encode that rule in both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Direction {
    pub action: OffsetAction,
    pub side: PositionSide,
}

impl Direction {
    pub fn new(action: OffsetAction, side: PositionSide) -> Self {
        Self { action, side }
    }

    /// True when this direction results in a buy
    pub fn is_buy(&self) -> bool {
        match self.action {
            OffsetAction::Open => self.side == PositionSide::Long,
            _ => self.side == PositionSide::Short,
        }
    }

    /// Recover the position side from the action and the buy/sell flag
    pub fn from_buy(action: OffsetAction, is_buy: bool) -> Self {
        let opening_side = if is_buy {
            PositionSide::Long
        } else {
            PositionSide::Short
        };
        let side = if action.is_open() {
            opening_side
        } else {
            opening_side.opposite()
        };
        Self { action, side }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.action.as_str(), self.side.as_str())
    }
}

impl FromStr for Direction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unsupported = || DomainError::UnsupportedDirection(s.to_string());

        let (action, side) = s.split_once('_').ok_or_else(unsupported)?;
        let action = OffsetAction::parse(action).ok_or_else(unsupported)?;
        let side = PositionSide::parse(side).ok_or_else(unsupported)?;

        Ok(Self { action, side })
    }
}
