//! Harness shared by the gateway integration tests

#![allow(dead_code)]

use parking_lot::Mutex;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tradegate_core::Order;
use tradegate_gateway::adapters::ctp::wire::{
    InputOrder, InputOrderAction, QryOrder, ReqAuthenticate, ReqUserLogin, RequestId, RspInfo,
    RspUserLogin, SettlementInfoConfirm,
};
use tradegate_gateway::{
    BrokerCallbacks, BrokerSession, ChannelEmitter, ClientCommand, ClientHandle, ClientRequest,
    CommandOutcome, CommandSender, CtpGateway, GatewayConfig, Requester, SessionError,
    command_channel,
};

pub const FRONT_ID: i32 = 1;
pub const SESSION_ID: i32 = 123_456;
pub const TRADING_DAY: &str = "20240105";

#[derive(Debug, Clone, PartialEq)]
pub enum SessionCall {
    Authenticate(RequestId),
    Login(RequestId),
    ConfirmSettlement(RequestId),
    Insert(InputOrder, RequestId),
    Cancel(InputOrderAction, RequestId),
    Query(QryOrder, RequestId),
}

/// Stands in for the vendor trader API
#[derive(Debug, Default)]
pub struct RecordingSession {
    calls: Mutex<Vec<SessionCall>>,
}

impl RecordingSession {
    pub fn calls(&self) -> Vec<SessionCall> {
        self.calls.lock().clone()
    }

    pub fn inserts(&self) -> Vec<(InputOrder, RequestId)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                SessionCall::Insert(req, id) => Some((req, id)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: SessionCall) -> Result<(), SessionError> {
        self.calls.lock().push(call);
        Ok(())
    }
}

impl BrokerSession for RecordingSession {
    fn authenticate(&self, _: &ReqAuthenticate, request_id: RequestId) -> Result<(), SessionError> {
        self.record(SessionCall::Authenticate(request_id))
    }

    fn login(&self, _: &ReqUserLogin, request_id: RequestId) -> Result<(), SessionError> {
        self.record(SessionCall::Login(request_id))
    }

    fn confirm_settlement(
        &self,
        _: &SettlementInfoConfirm,
        request_id: RequestId,
    ) -> Result<(), SessionError> {
        self.record(SessionCall::ConfirmSettlement(request_id))
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

pub fn config() -> GatewayConfig {
    GatewayConfig::from_json(
        r#"{
            "broker_id": "9999",
            "user_id": "INV01",
            "password": "secret",
            "auth_code": "0000000000000000",
            "app_id": "tradegate_test",
            "front_addr": "tcp://127.0.0.1:10130",
            "eviction_interval_ms": 50
        }"#,
    )
    .expect("valid config")
}

pub fn ok() -> Option<RspInfo> {
    Some(RspInfo::default())
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

/// Poll `check` until it holds
pub async fn eventually(what: &str, check: impl Fn() -> bool) {
    for _ in 0..400 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("timed out waiting for {what}");
}

/// A running gateway with its broker and client ends exposed
pub struct Harness {
    pub gateway: Arc<CtpGateway>,
    pub session: Arc<RecordingSession>,
    pub emitter: Arc<ChannelEmitter>,
    pub callbacks: BrokerCallbacks,
    pub requester: CommandSender,
    pub handle: JoinHandle<tradegate_gateway::Result<()>>,
}

impl Harness {
    pub fn start(config: GatewayConfig) -> Self {
        let session = Arc::new(RecordingSession::default());
        let emitter = Arc::new(ChannelEmitter::new(config.channel_capacity));
        let (callbacks, events) = BrokerCallbacks::channel();
        let (requester, commands) = command_channel(config.channel_capacity);

        let gateway = Arc::new(
            CtpGateway::new(config, session.clone(), emitter.clone()).expect("gateway"),
        );
        let runner = gateway.clone();
        let handle = tokio::spawn(async move { runner.run(events, commands).await });

        Self {
            gateway,
            session,
            emitter,
            callbacks,
            requester,
            handle,
        }
    }

    /// Play the broker side of connect, authenticate, login and settlement
    pub async fn handshake(&self) {
        let session = self.session.clone();
        let calls = move || session.calls().len();

        self.callbacks.on_front_connected();
        eventually("authenticate", || calls() >= 1).await;
        self.callbacks.on_rsp_authenticate(None, ok(), 1, true);
        eventually("login", || calls() >= 2).await;

        let login = RspUserLogin {
            trading_day: TRADING_DAY.to_string(),
            login_time: "08:55:01".to_string(),
            front_id: FRONT_ID,
            session_id: SESSION_ID,
            ..Default::default()
        };
        self.callbacks.on_rsp_user_login(Some(login), ok(), 2, true);
        eventually("settlement confirm", || calls() >= 3).await;
        self.callbacks.on_rsp_settlement_info_confirm(None, ok(), 3, true);
        eventually("ready", || self.gateway.is_ready()).await;
    }

    pub async fn send(&self, client: ClientHandle, request: ClientRequest) -> CommandOutcome {
        self.requester
            .request(&ClientCommand::new(client, request))
            .await
            .expect("gateway running")
    }

    /// Close both inputs and wait for the run loop to finish
    pub async fn shutdown(self) {
        let Harness {
            callbacks,
            requester,
            handle,
            ..
        } = self;
        drop(callbacks);
        drop(requester);
        handle.await.expect("run task").expect("run result");
    }
}
