//! Broker session seam
//!
//! The vendor trader API is driven through [`BrokerSession`] and reports
//! back through [`BrokerCallbacks`], which turns every callback into one
//! [`BrokerEvent`] on a channel the gateway drains.

use super::wire::{
    InputOrder, InputOrderAction, OrderField, QryOrder, ReqAuthenticate, ReqUserLogin,
    RequestId, RspAuthenticate, RspHeader, RspInfo, RspUserLogin, SettlementInfoConfirm,
    TradeField, UserLogout,
};
use crate::error::SessionError;
use log::warn;
use tokio::sync::mpsc;

/// Outbound calls on the broker session
///
/// Calls return as soon as the request is queued by the vendor API; the
/// answer arrives later as a [`BrokerEvent`] carrying the same request id.
pub trait BrokerSession: Send + Sync {
    fn authenticate(
        &self,
        req: &ReqAuthenticate,
        request_id: RequestId,
    ) -> Result<(), SessionError>;

    fn login(&self, req: &ReqUserLogin, request_id: RequestId) -> Result<(), SessionError>;

    fn confirm_settlement(
        &self,
        req: &SettlementInfoConfirm,
        request_id: RequestId,
    ) -> Result<(), SessionError>;

    fn insert_order(&self, req: &InputOrder, request_id: RequestId) -> Result<(), SessionError>;

    fn cancel_order(
        &self,
        req: &InputOrderAction,
        request_id: RequestId,
    ) -> Result<(), SessionError>;

    fn query_orders(&self, req: &QryOrder, request_id: RequestId) -> Result<(), SessionError>;
}

/// Everything the broker session reports
#[derive(Debug, Clone, PartialEq)]
pub enum BrokerEvent {
    Connected,
    Disconnected {
        reason: i32,
    },
    HeartbeatWarning {
        time_lapse: i32,
    },
    AuthAck {
        auth: Option<RspAuthenticate>,
        header: RspHeader,
    },
    LoginAck {
        login: Option<RspUserLogin>,
        header: RspHeader,
    },
    LogoutAck {
        logout: Option<UserLogout>,
        header: RspHeader,
    },
    SettlementAck {
        confirm: Option<SettlementInfoConfirm>,
        header: RspHeader,
    },
    /// Error response not tied to a specific request type
    RspError {
        header: RspHeader,
    },
    /// Insert accepted by the front or rejected by it
    OrderAck {
        input: InputOrder,
        header: RspHeader,
    },
    /// Exchange-side insert rejection
    OrderInsertError {
        input: InputOrder,
        info: Option<RspInfo>,
    },
    OrderStatus(OrderField),
    Trade(TradeField),
    CancelAck {
        action: InputOrderAction,
        header: RspHeader,
    },
    /// One part of an order query response; `order` is `None` for an empty result
    QueryOrder {
        order: Option<OrderField>,
        header: RspHeader,
    },
}

impl BrokerEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Disconnected { .. } => "disconnected",
            Self::HeartbeatWarning { .. } => "heartbeat_warning",
            Self::AuthAck { .. } => "auth_ack",
            Self::LoginAck { .. } => "login_ack",
            Self::LogoutAck { .. } => "logout_ack",
            Self::SettlementAck { .. } => "settlement_ack",
            Self::RspError { .. } => "rsp_error",
            Self::OrderAck { .. } => "order_ack",
            Self::OrderInsertError { .. } => "order_insert_error",
            Self::OrderStatus(_) => "order_status",
            Self::Trade(_) => "trade",
            Self::CancelAck { .. } => "cancel_ack",
            Self::QueryOrder { .. } => "query_order",
        }
    }
}

/// Callback surface handed to the vendor API
///
/// Cheap to clone and safe to call from any thread. Every method only
/// enqueues; the gateway run loop does the work.
#[derive(Debug, Clone)]
pub struct BrokerCallbacks {
    tx: mpsc::UnboundedSender<BrokerEvent>,
}

impl BrokerCallbacks {
    pub fn new(tx: mpsc::UnboundedSender<BrokerEvent>) -> Self {
        Self { tx }
    }

    /// Create the callback surface and the event stream it feeds
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<BrokerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn on_front_connected(&self) {
        self.push(BrokerEvent::Connected);
    }

    pub fn on_front_disconnected(&self, reason: i32) {
        self.push(BrokerEvent::Disconnected { reason });
    }

    pub fn on_heart_beat_warning(&self, time_lapse: i32) {
        self.push(BrokerEvent::HeartbeatWarning { time_lapse });
    }

    pub fn on_rsp_authenticate(
        &self,
        auth: Option<RspAuthenticate>,
        info: Option<RspInfo>,
        request_id: RequestId,
        is_last: bool,
    ) {
        self.push(BrokerEvent::AuthAck {
            auth,
            header: RspHeader::new(info, request_id, is_last),
        });
    }

    pub fn on_rsp_user_login(
        &self,
        login: Option<RspUserLogin>,
        info: Option<RspInfo>,
        request_id: RequestId,
        is_last: bool,
    ) {
        self.push(BrokerEvent::LoginAck {
            login,
            header: RspHeader::new(info, request_id, is_last),
        });
    }

    pub fn on_rsp_user_logout(
        &self,
        logout: Option<UserLogout>,
        info: Option<RspInfo>,
        request_id: RequestId,
        is_last: bool,
    ) {
        self.push(BrokerEvent::LogoutAck {
            logout,
            header: RspHeader::new(info, request_id, is_last),
        });
    }

    pub fn on_rsp_settlement_info_confirm(
        &self,
        confirm: Option<SettlementInfoConfirm>,
        info: Option<RspInfo>,
        request_id: RequestId,
        is_last: bool,
    ) {
        self.push(BrokerEvent::SettlementAck {
            confirm,
            header: RspHeader::new(info, request_id, is_last),
        });
    }

    pub fn on_rsp_error(&self, info: Option<RspInfo>, request_id: RequestId, is_last: bool) {
        self.push(BrokerEvent::RspError {
            header: RspHeader::new(info, request_id, is_last),
        });
    }

    pub fn on_rsp_order_insert(
        &self,
        input: InputOrder,
        info: Option<RspInfo>,
        request_id: RequestId,
        is_last: bool,
    ) {
        self.push(BrokerEvent::OrderAck {
            input,
            header: RspHeader::new(info, request_id, is_last),
        });
    }

    pub fn on_err_rtn_order_insert(&self, input: InputOrder, info: Option<RspInfo>) {
        self.push(BrokerEvent::OrderInsertError { input, info });
    }

    pub fn on_rtn_order(&self, order: OrderField) {
        self.push(BrokerEvent::OrderStatus(order));
    }

    pub fn on_rtn_trade(&self, trade: TradeField) {
        self.push(BrokerEvent::Trade(trade));
    }

    pub fn on_rsp_order_action(
        &self,
        action: InputOrderAction,
        info: Option<RspInfo>,
        request_id: RequestId,
        is_last: bool,
    ) {
        self.push(BrokerEvent::CancelAck {
            action,
            header: RspHeader::new(info, request_id, is_last),
        });
    }

    pub fn on_rsp_qry_order(
        &self,
        order: Option<OrderField>,
        info: Option<RspInfo>,
        request_id: RequestId,
        is_last: bool,
    ) {
        self.push(BrokerEvent::QueryOrder {
            order,
            header: RspHeader::new(info, request_id, is_last),
        });
    }

    fn push(&self, event: BrokerEvent) {
        if let Err(e) = self.tx.send(event) {
            warn!("Gateway stopped, dropping broker event {}", e.0.kind());
        }
    }
}
