//! Client JSON protocol
//!
//! Requests and notifications are framed as `{"msg": <kind>, "data": <body>}`.

use crate::error::{GatewayError, TransportError};
use serde::{Deserialize, Serialize};
use tradegate_core::{Order, OrderDealNotify, OrderQuery, OrderStatusNotify};

/// Query reply error id when the broker session dropped before the reply completed
pub const SESSION_LOST: i32 = -1;

/// Query reply error id when the broker never finished the reply in time
pub const QUERY_EXPIRED: i32 = -2;

/// One client connection, as numbered by the client transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClientHandle(pub u64);

impl std::fmt::Display for ClientHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "client#{}", self.0)
    }
}

/// Command sent by a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "msg", content = "data", rename_all = "snake_case")]
pub enum ClientRequest {
    InsertOrder(Order),
    CancelOrder(Order),
    QueryOrder(OrderQuery),
}

impl ClientRequest {
    pub fn from_json(json: &str) -> Result<Self, GatewayError> {
        serde_json::from_str(json)
            .map_err(|e| GatewayError::Validation(format!("malformed request: {e}")))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::InsertOrder(_) => "insert_order",
            Self::CancelOrder(_) => "cancel_order",
            Self::QueryOrder(_) => "query_order",
        }
    }
}

/// An order paired with its status, as listed in a query reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderWithStatus {
    pub order: Order,
    pub status: OrderStatusNotify,
}

/// Notification pushed to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "msg", content = "data", rename_all = "snake_case")]
pub enum Notification {
    /// The broker accepted or rejected an insert or cancel
    OrderConfirm {
        order: Order,
        error_id: i32,
        error_msg: String,
    },
    OrderStatus {
        order: Order,
        status: OrderStatusNotify,
        error_id: i32,
        error_msg: String,
    },
    OrderDeal {
        order: Order,
        deal: OrderDealNotify,
    },
    /// Consolidated answer to one `query_order`, sent to the asking client only
    QueryReply {
        query: OrderQuery,
        orders: Vec<OrderWithStatus>,
        error_id: i32,
    },
}

impl Notification {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::OrderConfirm { .. } => "order_confirm",
            Self::OrderStatus { .. } => "order_status",
            Self::OrderDeal { .. } => "order_deal",
            Self::QueryReply { .. } => "query_reply",
        }
    }

    pub fn to_json(&self) -> Result<String, TransportError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// A client request tagged with the connection it came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientCommand {
    pub client: ClientHandle,
    pub request: ClientRequest,
}

impl ClientCommand {
    pub fn new(client: ClientHandle, request: ClientRequest) -> Self {
        Self { client, request }
    }
}

/// Why a command was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    Validation,
    NotReady,
    UnsupportedOrderType,
    UnsupportedDirection,
    SessionRefused,
    Transport,
    Config,
}

impl From<&GatewayError> for RejectReason {
    fn from(e: &GatewayError) -> Self {
        match e {
            GatewayError::Validation(_) => RejectReason::Validation,
            GatewayError::NotReady => RejectReason::NotReady,
            GatewayError::UnsupportedOrderType(_) => RejectReason::UnsupportedOrderType,
            GatewayError::UnsupportedDirection(_) => RejectReason::UnsupportedDirection,
            GatewayError::Session(_) => RejectReason::SessionRefused,
            GatewayError::Transport(_) => RejectReason::Transport,
            GatewayError::Config(_) => RejectReason::Config,
        }
    }
}

/// Synchronous answer to a client command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CommandOutcome {
    /// Handed to the broker session under this request id
    Accepted { request_id: i32 },
    Rejected {
        reason: RejectReason,
        message: String,
    },
}

impl CommandOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

impl From<Result<i32, GatewayError>> for CommandOutcome {
    fn from(result: Result<i32, GatewayError>) -> Self {
        match result {
            Ok(request_id) => CommandOutcome::Accepted { request_id },
            Err(e) => CommandOutcome::Rejected {
                reason: RejectReason::from(&e),
                message: e.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_parse_insert_request() {
        let json = r#"{
            "msg": "insert_order",
            "data": {
                "exchange": "SHFE",
                "symbol": "rb",
                "contract": "2501",
                "order_type": "limit",
                "dir": "open_long",
                "price": 3500,
                "amount": 5
            }
        }"#;

        let request = ClientRequest::from_json(json).unwrap();
        assert_eq!(request.kind(), "insert_order");
        match request {
            ClientRequest::InsertOrder(order) => {
                assert_eq!(order.instrument_code(), "rb2501");
                assert_eq!(order.amount, dec!(5));
            }
            other => panic!("unexpected request: {other:?}"),
        }
    }

    #[test]
    fn test_parse_query_request_without_filters() {
        let request = ClientRequest::from_json(r#"{"msg":"query_order","data":{}}"#).unwrap();
        assert_eq!(request, ClientRequest::QueryOrder(OrderQuery::default()));
    }

    #[test]
    fn test_malformed_request_is_validation_error() {
        let err = ClientRequest::from_json(r#"{"msg":"transfer","data":{}}"#).unwrap_err();
        assert!(matches!(err, GatewayError::Validation(_)));

        let err = ClientRequest::from_json("not json").unwrap_err();
        assert!(matches!(err, GatewayError::Validation(_)));
    }

    #[test]
    fn test_notification_framing() {
        let notification = Notification::OrderConfirm {
            order: Order::default(),
            error_id: 22,
            error_msg: "duplicate order ref".to_string(),
        };

        let value: serde_json::Value =
            serde_json::from_str(&notification.to_json().unwrap()).unwrap();
        assert_eq!(value["msg"], "order_confirm");
        assert_eq!(value["data"]["error_id"], 22);
        assert_eq!(value["data"]["error_msg"], "duplicate order ref");
        assert_eq!(value["data"]["order"]["outside_id"], "");
    }

    #[test]
    fn test_query_reply_lists_orders_with_status() {
        let notification = Notification::QueryReply {
            query: OrderQuery {
                exchange: Some("SHFE".to_string()),
                ..Default::default()
            },
            orders: vec![OrderWithStatus {
                order: Order::default(),
                status: OrderStatusNotify::default(),
            }],
            error_id: 0,
        };

        let value = serde_json::to_value(&notification).unwrap();
        assert_eq!(value["msg"], "query_reply");
        assert_eq!(value["data"]["query"], json!({ "exchange": "SHFE" }));
        assert_eq!(value["data"]["orders"][0]["status"]["order_status"], "unknown");
    }

    #[test]
    fn test_outcome_from_result() {
        assert_eq!(
            CommandOutcome::from(Ok(7)),
            CommandOutcome::Accepted { request_id: 7 }
        );

        let outcome = CommandOutcome::from(Err(GatewayError::NotReady));
        assert!(!outcome.is_accepted());
        assert!(matches!(
            outcome,
            CommandOutcome::Rejected { reason: RejectReason::NotReady, .. }
        ));
    }
}
