//! Shared fixtures for unit tests

use crate::adapters::ctp::session::BrokerSession;
use crate::adapters::ctp::state::SessionStateMachine;
use crate::adapters::ctp::wire::{
    InputOrder, InputOrderAction, QryOrder, ReqAuthenticate, ReqUserLogin, RequestId,
    RspUserLogin, SettlementInfoConfirm,
};
use crate::config::GatewayConfig;
use crate::error::SessionError;
use parking_lot::Mutex;
use rust_decimal_macros::dec;
use tradegate_core::Order;

pub const FRONT_ID: i32 = 3;
pub const SESSION_ID: i32 = 77;
pub const TRADING_DAY: &str = "20240105";

#[derive(Debug, Clone, PartialEq)]
pub enum SessionCall {
    Authenticate(ReqAuthenticate, RequestId),
    Login(ReqUserLogin, RequestId),
    ConfirmSettlement(SettlementInfoConfirm, RequestId),
    Insert(InputOrder, RequestId),
    Cancel(InputOrderAction, RequestId),
    Query(QryOrder, RequestId),
}

/// Broker session double that records every call
#[derive(Debug, Default)]
pub struct RecordingSession {
    calls: Mutex<Vec<SessionCall>>,
    refuse_code: Mutex<Option<i32>>,
}

impl RecordingSession {
    pub fn calls(&self) -> Vec<SessionCall> {
        self.calls.lock().clone()
    }

    /// Make every later call fail with `code`
    pub fn refuse_with(&self, code: i32) {
        *self.refuse_code.lock() = Some(code);
    }

    fn record(&self, call: SessionCall) -> Result<(), SessionError> {
        if let Some(code) = *self.refuse_code.lock() {
            return Err(SessionError { code });
        }
        self.calls.lock().push(call);
        Ok(())
    }
}

impl BrokerSession for RecordingSession {
    fn authenticate(
        &self,
        req: &ReqAuthenticate,
        request_id: RequestId,
    ) -> Result<(), SessionError> {
        self.record(SessionCall::Authenticate(req.clone(), request_id))
    }

    fn login(&self, req: &ReqUserLogin, request_id: RequestId) -> Result<(), SessionError> {
        self.record(SessionCall::Login(req.clone(), request_id))
    }

    fn confirm_settlement(
        &self,
        req: &SettlementInfoConfirm,
        request_id: RequestId,
    ) -> Result<(), SessionError> {
        self.record(SessionCall::ConfirmSettlement(req.clone(), request_id))
    }

    fn insert_order(&self, req: &InputOrder, request_id: RequestId) -> Result<(), SessionError> {
        self.record(SessionCall::Insert(req.clone(), request_id))
    }

    fn cancel_order(
        &self,
        req: &InputOrderAction,
        request_id: RequestId,
    ) -> Result<(), SessionError> {
        self.record(SessionCall::Cancel(req.clone(), request_id))
    }

    fn query_orders(&self, req: &QryOrder, request_id: RequestId) -> Result<(), SessionError> {
        self.record(SessionCall::Query(req.clone(), request_id))
    }
}

pub fn test_config() -> GatewayConfig {
    GatewayConfig {
        broker_id: "9999".to_string(),
        user_id: "INV01".to_string(),
        password: "secret".to_string(),
        auth_code: "0000000000000000".to_string(),
        app_id: "tradegate_test".to_string(),
        product_info: "tradegate".to_string(),
        ..Default::default()
    }
}

pub fn login_rsp() -> RspUserLogin {
    RspUserLogin {
        trading_day: TRADING_DAY.to_string(),
        login_time: "08:55:01".to_string(),
        front_id: FRONT_ID,
        session_id: SESSION_ID,
        ..Default::default()
    }
}

/// State machine driven through the full handshake
pub fn ready_state() -> SessionStateMachine {
    let state = SessionStateMachine::new();
    state.on_connected();
    state.on_authenticated(None);
    state.on_logged_in(&login_rsp(), None);
    state.on_settlement_confirmed();
    state
}

/// SHFE rb2501 limit open_long 5 @ 3500
pub fn rb_order() -> Order {
    Order {
        exchange: "SHFE".to_string(),
        symbol: "rb".to_string(),
        contract: "2501".to_string(),
        order_type: "limit".to_string(),
        dir: "open_long".to_string(),
        price: dec!(3500),
        amount: dec!(5),
        ..Default::default()
    }
}
