//! Client command dispatch
//!
//! Validates and translates client commands, allocates identifiers and
//! hands the wire records to the broker session. Every refusal happens
//! before an identifier is allocated or the session is called.

use super::correlation::{OrderCorrelationStore, PendingOrderKey, QueryCorrelationCache};
use super::session::BrokerSession;
use super::state::{SessionCommand, SessionStateMachine};
use super::translator::{self, Account, OrderTerms};
use super::wire::{ReqAuthenticate, ReqUserLogin, RequestId, SettlementInfoConfirm};
use crate::audit::{self, AuditKind};
use crate::config::GatewayConfig;
use crate::error::{GatewayError, Result};
use crate::messages::{ClientCommand, ClientHandle, ClientRequest, CommandOutcome};
use log::{debug, info, warn};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};
use tradegate_core::{Order, OrderQuery};

pub struct RequestDispatcher {
    config: Arc<GatewayConfig>,
    session: Arc<dyn BrokerSession>,
    state: Arc<SessionStateMachine>,
    orders: Arc<OrderCorrelationStore>,
    queries: Arc<QueryCorrelationCache>,
    /// Shared by every call on the session
    next_request_id: AtomicI32,
    next_order_ref: AtomicI32,
    next_action_ref: AtomicI32,
}

impl RequestDispatcher {
    pub fn new(
        config: Arc<GatewayConfig>,
        session: Arc<dyn BrokerSession>,
        state: Arc<SessionStateMachine>,
        orders: Arc<OrderCorrelationStore>,
        queries: Arc<QueryCorrelationCache>,
    ) -> Self {
        Self {
            config,
            session,
            state,
            orders,
            queries,
            next_request_id: AtomicI32::new(1),
            next_order_ref: AtomicI32::new(1),
            next_action_ref: AtomicI32::new(1),
        }
    }

    /// Run one client command and describe the result for the client
    pub fn dispatch(&self, command: ClientCommand) -> CommandOutcome {
        let kind = command.request.kind();
        let client = command.client;
        let result = match command.request {
            ClientRequest::InsertOrder(order) => self.insert_order(order),
            ClientRequest::CancelOrder(order) => self.cancel_order(&order),
            ClientRequest::QueryOrder(query) => self.query_orders(client, query),
        };

        match &result {
            Ok(request_id) => debug!("{} from {} sent as request {}", kind, client, request_id),
            Err(e) => warn!("{} from {} rejected: {}", kind, client, e),
        }
        CommandOutcome::from(result)
    }

    /// Send a new order
    pub fn insert_order(&self, order: Order) -> Result<RequestId> {
        require("exchange", &order.exchange)?;
        require("symbol", &order.symbol)?;
        require("contract", &order.contract)?;
        require("order_type", &order.order_type)?;
        if order.amount <= Decimal::ZERO {
            return Err(GatewayError::Validation(format!(
                "amount must be positive, got {}",
                order.amount
            )));
        }
        let terms = OrderTerms::parse(&order)?;
        let ctx = self.state.ready_context()?;

        let order_ref = self.next_order_ref.fetch_add(1, Ordering::SeqCst).to_string();
        let request_id = self.next_request_id();
        let req = translator::insert_order_to_wire(
            &order,
            &terms,
            self.account(),
            &order_ref,
            request_id,
        );
        audit::request(AuditKind::OrderInsert, request_id, &req);

        // Recorded before sending: the ack may arrive before the call returns
        let key =
            PendingOrderKey::new(&self.config.user_id, &order_ref, ctx.front_id, ctx.session_id);
        self.orders.record(key.clone(), order);

        if let Err(e) = self.session.insert_order(&req, request_id) {
            self.orders.take(&key);
            return Err(e.into());
        }

        info!(
            "Order {} sent: {} {} {} x{} @ {}",
            order_ref,
            req.instrument_id,
            terms.direction,
            terms.order_type,
            terms.volume,
            req.limit_price
        );
        Ok(request_id)
    }

    /// Ask the broker to delete an acknowledged order
    pub fn cancel_order(&self, order: &Order) -> Result<RequestId> {
        require("outside_id", &order.outside_id)?;
        require("exchange", &order.exchange)?;
        require("symbol", &order.symbol)?;
        require("contract", &order.contract)?;
        let order_sys_id = translator::order_sys_id_from_outside_id(&order.outside_id)
            .ok_or_else(|| {
                GatewayError::Validation(format!("malformed outside_id {:?}", order.outside_id))
            })?;
        self.state.ready_context()?;

        let action_ref = self.next_action_ref.fetch_add(1, Ordering::SeqCst);
        let request_id = self.next_request_id();
        let req = translator::cancel_order_to_wire(
            order,
            self.account(),
            order_sys_id,
            action_ref,
            request_id,
        );
        audit::request(AuditKind::OrderAction, request_id, &req);

        self.session.cancel_order(&req, request_id)?;
        info!("Cancel {} sent for {}", action_ref, order.outside_id);
        Ok(request_id)
    }

    /// Query orders; the consolidated reply goes to `client` only
    pub fn query_orders(&self, client: ClientHandle, query: OrderQuery) -> Result<RequestId> {
        self.state.ready_context()?;

        let request_id = self.next_request_id();
        let req = translator::query_to_wire(&query, self.account());
        audit::request(AuditKind::OrderQuery, request_id, &req);

        self.queries.register(request_id, client, query);
        if let Err(e) = self.session.query_orders(&req, request_id) {
            self.queries.discard(request_id);
            return Err(e.into());
        }
        Ok(request_id)
    }

    /// Send a handshake step; not subject to the readiness gate
    pub fn send_session_command(&self, command: SessionCommand) -> Result<RequestId> {
        let request_id = self.next_request_id();
        let config = &self.config;
        match command {
            SessionCommand::Authenticate => {
                let req = ReqAuthenticate {
                    broker_id: config.broker_id.clone(),
                    user_id: config.user_id.clone(),
                    user_product_info: config.product_info.clone(),
                    auth_code: config.auth_code.clone(),
                    app_id: config.app_id.clone(),
                };
                self.session.authenticate(&req, request_id)?;
            }
            SessionCommand::Login => {
                let req = ReqUserLogin {
                    broker_id: config.broker_id.clone(),
                    user_id: config.user_id.clone(),
                    password: config.password.clone(),
                    user_product_info: config.product_info.clone(),
                };
                self.session.login(&req, request_id)?;
            }
            SessionCommand::ConfirmSettlement => {
                let req = SettlementInfoConfirm {
                    broker_id: config.broker_id.clone(),
                    investor_id: config.user_id.clone(),
                    ..Default::default()
                };
                self.session.confirm_settlement(&req, request_id)?;
            }
        }
        info!("{:?} sent as request {}", command, request_id);
        Ok(request_id)
    }

    fn next_request_id(&self) -> RequestId {
        self.next_request_id.fetch_add(1, Ordering::SeqCst)
    }

    fn account(&self) -> Account<'_> {
        Account {
            broker_id: &self.config.broker_id,
            investor_id: &self.config.user_id,
        }
    }
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(GatewayError::Validation(format!("{field} is empty")));
    }
    Ok(())
}
