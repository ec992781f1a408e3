//! Audit trail of broker traffic
//!
//! Every record sent to or received from the broker is logged as a single
//! JSON line on the `tradegate::audit` target, so it can be routed to its
//! own sink with `RUST_LOG=tradegate::audit=info`.

use crate::adapters::ctp::wire::{RequestId, RspHeader};
use log::{Level, info, log_enabled, warn};
use serde::Serialize;

pub const AUDIT_TARGET: &str = "tradegate::audit";

/// What an audit line records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditKind {
    OrderInsert,
    OrderAction,
    OrderQuery,
    Connected,
    Disconnected,
    Authenticate,
    Login,
    Logout,
    SettlementConfirm,
    RspError,
    HeartbeatWarning,
    RspOrderInsert,
    ErrRtnOrderInsert,
    RtnOrder,
    RtnTrade,
    RspOrderAction,
    RspQryOrder,
}

impl AuditKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OrderInsert => "ctp_orderinsert",
            Self::OrderAction => "ctp_orderaction",
            Self::OrderQuery => "ctp_orderquery",
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
            Self::Authenticate => "auth",
            Self::Login => "login",
            Self::Logout => "logout",
            Self::SettlementConfirm => "rspsettlementconfirm",
            Self::RspError => "on_error",
            Self::HeartbeatWarning => "heartbeat_warning",
            Self::RspOrderInsert => "ctp_rsporderinsert",
            Self::ErrRtnOrderInsert => "ctp_errrtnorderinsert",
            Self::RtnOrder => "ctp_rtnorder",
            Self::RtnTrade => "ctp_rtntrade",
            Self::RspOrderAction => "ctp_rsporderaction",
            Self::RspQryOrder => "ctp_rspqryorder",
        }
    }
}

#[derive(Serialize)]
struct AuditLine<'a, T: Serialize> {
    msg: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    req_id: Option<RequestId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_last: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_msg: Option<&'a str>,
    data: Option<&'a T>,
}

impl<'a, T: Serialize> AuditLine<'a, T> {
    fn new(kind: AuditKind, data: Option<&'a T>) -> Self {
        Self {
            msg: kind.as_str(),
            req_id: None,
            is_last: None,
            error_id: None,
            error_msg: None,
            data,
        }
    }

    fn with_header(mut self, header: &'a RspHeader) -> Self {
        self.req_id = Some(header.request_id);
        self.is_last = Some(header.is_last);
        if let Some(info) = &header.info {
            self.error_id = Some(info.error_id);
            self.error_msg = Some(&info.error_msg);
        }
        self
    }

    fn emit(&self) {
        if !log_enabled!(target: AUDIT_TARGET, Level::Info) {
            return;
        }
        match serde_json::to_string(self) {
            Ok(line) => info!(target: AUDIT_TARGET, "{}", line),
            Err(e) => warn!("Failed to serialize audit line {}: {}", self.msg, e),
        }
    }
}

/// Outbound request
pub fn request<T: Serialize>(kind: AuditKind, request_id: RequestId, data: &T) {
    let mut line = AuditLine::new(kind, Some(data));
    line.req_id = Some(request_id);
    line.emit();
}

/// Response to an earlier request
pub fn response<T: Serialize>(kind: AuditKind, header: &RspHeader, data: Option<&T>) {
    AuditLine::new(kind, data).with_header(header).emit();
}

/// Unsolicited push or session event
pub fn event<T: Serialize>(kind: AuditKind, data: &T) {
    AuditLine::new(kind, Some(data)).emit();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ctp::wire::{QryOrder, RspInfo};
    use serde_json::json;

    fn render<T: Serialize>(line: &AuditLine<'_, T>) -> serde_json::Value {
        serde_json::to_value(line).unwrap()
    }

    #[test]
    fn test_request_line() {
        let req = QryOrder {
            broker_id: "9999".to_string(),
            ..Default::default()
        };
        let mut line = AuditLine::new(AuditKind::OrderQuery, Some(&req));
        line.req_id = Some(7);

        let value = render(&line);
        assert_eq!(value["msg"], "ctp_orderquery");
        assert_eq!(value["req_id"], 7);
        assert_eq!(value["data"]["BrokerID"], "9999");
        assert!(value.get("is_last").is_none());
        assert!(value.get("error_id").is_none());
    }

    #[test]
    fn test_response_line_with_error() {
        let header = RspHeader::new(
            Some(RspInfo {
                error_id: 22,
                error_msg: "duplicate".to_string(),
            }),
            3,
            true,
        );
        let line = AuditLine::<QryOrder>::new(AuditKind::RspQryOrder, None).with_header(&header);

        assert_eq!(
            render(&line),
            json!({
                "msg": "ctp_rspqryorder",
                "req_id": 3,
                "is_last": true,
                "error_id": 22,
                "error_msg": "duplicate",
                "data": null,
            })
        );
    }

    #[test]
    fn test_emit_with_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
        event(AuditKind::Disconnected, &json!({ "reason": 4097 }));
        response::<QryOrder>(AuditKind::RspError, &RspHeader::default(), None);
    }
}
