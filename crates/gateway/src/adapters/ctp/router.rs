//! Broker event routing
//!
//! Single entry point for everything the broker session reports: drives the
//! state machine, resolves correlations and turns broker records into client
//! notifications.

use super::correlation::{
    OrderCorrelationStore, PendingOrderKey, QueryCorrelation, QueryCorrelationCache,
};
use super::dispatcher::RequestDispatcher;
use super::session::BrokerEvent;
use super::state::{SessionCommand, SessionStateMachine};
use super::translator;
use super::wire::{
    InputOrder, InputOrderAction, OrderField, RequestId, RspHeader, RspUserLogin, TradeField,
    WireOrderStatus,
};
use crate::audit::{self, AuditKind};
use crate::config::GatewayConfig;
use crate::error::Result;
use crate::messages::{Notification, OrderWithStatus, QUERY_EXPIRED, SESSION_LOST};
use crate::transport::NotificationEmitter;
use chrono::Utc;
use log::{debug, error, info, warn};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

pub struct EventRouter {
    config: Arc<GatewayConfig>,
    state: Arc<SessionStateMachine>,
    orders: Arc<OrderCorrelationStore>,
    queries: Arc<QueryCorrelationCache>,
    dispatcher: Arc<RequestDispatcher>,
    emitter: Arc<dyn NotificationEmitter>,
}

impl EventRouter {
    pub fn new(
        config: Arc<GatewayConfig>,
        state: Arc<SessionStateMachine>,
        orders: Arc<OrderCorrelationStore>,
        queries: Arc<QueryCorrelationCache>,
        dispatcher: Arc<RequestDispatcher>,
        emitter: Arc<dyn NotificationEmitter>,
    ) -> Self {
        Self {
            config,
            state,
            orders,
            queries,
            dispatcher,
            emitter,
        }
    }

    /// Route one broker event
    pub async fn handle(&self, event: BrokerEvent) -> Result<()> {
        match event {
            BrokerEvent::Connected => {
                audit::event(AuditKind::Connected, &json!({}));
                info!("Broker front connected");
                if let Some(command) = self.state.on_connected() {
                    self.send(command);
                }
                Ok(())
            }
            BrokerEvent::Disconnected { reason } => {
                audit::event(AuditKind::Disconnected, &json!({ "reason": reason }));
                warn!("Broker front disconnected, reason {:#x}", reason);
                self.session_lost().await
            }
            BrokerEvent::HeartbeatWarning { time_lapse } => {
                audit::event(AuditKind::HeartbeatWarning, &json!({ "time_lapse": time_lapse }));
                warn!("Broker heartbeat late by {}s", time_lapse);
                Ok(())
            }
            BrokerEvent::AuthAck { auth, header } => {
                audit::response(AuditKind::Authenticate, &header, auth.as_ref());
                if let Some(command) = self.state.on_authenticated(header.info.as_ref()) {
                    self.send(command);
                }
                Ok(())
            }
            BrokerEvent::LoginAck { login, header } => {
                audit::response(AuditKind::Login, &header, login.as_ref());
                self.on_login(login.as_ref(), &header);
                Ok(())
            }
            BrokerEvent::LogoutAck { logout, header } => {
                audit::response(AuditKind::Logout, &header, logout.as_ref());
                info!("Logged out");
                self.session_lost().await
            }
            BrokerEvent::SettlementAck { confirm, header } => {
                audit::response(AuditKind::SettlementConfirm, &header, confirm.as_ref());
                if self.state.on_settlement_confirmed() {
                    info!("Broker session ready");
                }
                Ok(())
            }
            BrokerEvent::RspError { header } => {
                audit::response::<()>(AuditKind::RspError, &header, None);
                warn!(
                    "Broker error on request {} ({}): {}",
                    header.request_id,
                    header.error_id(),
                    header.error_msg()
                );
                Ok(())
            }
            BrokerEvent::OrderAck { input, header } => {
                audit::response(AuditKind::RspOrderInsert, &header, Some(&input));
                self.on_order_ack(&input, &header).await
            }
            BrokerEvent::OrderInsertError { input, info } => {
                let header = RspHeader::new(info, input.request_id, true);
                audit::response(AuditKind::ErrRtnOrderInsert, &header, Some(&input));
                Ok(())
            }
            BrokerEvent::OrderStatus(field) => {
                audit::event(AuditKind::RtnOrder, &field);
                self.on_order_status(&field).await
            }
            BrokerEvent::Trade(trade) => {
                audit::event(AuditKind::RtnTrade, &trade);
                self.on_trade(&trade).await
            }
            BrokerEvent::CancelAck { action, header } => {
                audit::response(AuditKind::RspOrderAction, &header, Some(&action));
                self.on_cancel_ack(&action, &header).await
            }
            BrokerEvent::QueryOrder { order, header } => {
                audit::response(AuditKind::RspQryOrder, &header, order.as_ref());
                self.on_query_part(order, &header).await
            }
        }
    }

    /// Give up on queries older than `max_age`; returns how many were dropped
    ///
    /// Evicted entries are gone from the cache, so a failed reply is logged
    /// and the remaining clients are still told.
    pub async fn evict_expired(&self, max_age: Duration) -> Result<usize> {
        let expired = self.queries.evict_expired(max_age);
        let count = expired.len();
        for (request_id, correlation) in expired {
            warn!("Query {} expired after {:?}", request_id, max_age);
            if let Err(e) = self.reply_to_query(request_id, correlation, QUERY_EXPIRED).await {
                error!("Could not notify query {} of expiry: {}", request_id, e);
            }
        }
        Ok(count)
    }

    fn on_login(&self, login: Option<&RspUserLogin>, header: &RspHeader) {
        let Some(login) = login else {
            warn!("Login ack without login record ({})", header.error_id());
            return;
        };
        if let Some(command) = self.state.on_logged_in(login, header.info.as_ref()) {
            self.send(command);
        }
    }

    async fn on_order_ack(&self, input: &InputOrder, header: &RspHeader) -> Result<()> {
        let ctx = self.state.context();
        let key = PendingOrderKey::new(
            &input.user_id,
            &input.order_ref,
            ctx.front_id,
            ctx.session_id,
        );
        let base = self.orders.take(&key).unwrap_or_else(|| {
            debug!("Insert ack for {} matches no pending order", key);
            Default::default()
        });

        let order = translator::order_from_input(input, base, Utc::now().timestamp_millis());
        if header.is_error() {
            warn!(
                "Order {} rejected ({}): {}",
                input.order_ref,
                header.error_id(),
                header.error_msg()
            );
        }
        self.emitter
            .broadcast(Notification::OrderConfirm {
                order,
                error_id: header.error_id(),
                error_msg: header.error_msg().to_string(),
            })
            .await?;
        Ok(())
    }

    async fn on_order_status(&self, field: &OrderField) -> Result<()> {
        if field.order_sys_id.is_empty() && field.order_status == WireOrderStatus::Unknown {
            debug!("Order {} not yet at the exchange, skipped", field.order_ref);
            return Ok(());
        }

        let (order, status) = translator::order_from_wire(field);
        if status.order_status.is_terminal() {
            info!("Order {} finished: {:?}", order.outside_id, status.order_status);
        }
        let key = PendingOrderKey::new(
            &field.user_id,
            &field.order_ref,
            field.front_id,
            field.session_id,
        );
        let confirmed = match self.orders.take(&key) {
            Some(_) => self
                .emitter
                .broadcast(Notification::OrderConfirm {
                    order: order.clone(),
                    error_id: 0,
                    error_msg: String::new(),
                })
                .await
                .inspect_err(|e| error!("Could not confirm order {}: {}", key, e)),
            None => Ok(()),
        };

        // The status goes out even when the confirm could not
        let published = self
            .emitter
            .broadcast(Notification::OrderStatus {
                order,
                status,
                error_id: 0,
                error_msg: String::new(),
            })
            .await;
        confirmed?;
        published?;
        Ok(())
    }

    async fn on_trade(&self, trade: &TradeField) -> Result<()> {
        let (order, deal) = translator::deal_from_wire(trade);
        self.emitter
            .broadcast(Notification::OrderDeal { order, deal })
            .await?;
        Ok(())
    }

    async fn on_cancel_ack(&self, action: &InputOrderAction, header: &RspHeader) -> Result<()> {
        let trading_day = self.state.context().trading_day;
        let order = translator::order_from_action(action, &trading_day);
        if header.is_error() {
            warn!(
                "Cancel of {} rejected ({}): {}",
                order.outside_id,
                header.error_id(),
                header.error_msg()
            );
        }
        self.emitter
            .broadcast(Notification::OrderConfirm {
                order,
                error_id: header.error_id(),
                error_msg: header.error_msg().to_string(),
            })
            .await?;
        Ok(())
    }

    async fn on_query_part(&self, order: Option<OrderField>, header: &RspHeader) -> Result<()> {
        if !header.is_last {
            self.queries.append(header.request_id, order);
            return Ok(());
        }

        let correlation = self.queries.complete(header.request_id, order);
        self.reply_to_query(header.request_id, correlation, header.error_id())
            .await
    }

    async fn reply_to_query(
        &self,
        request_id: RequestId,
        correlation: QueryCorrelation,
        error_id: i32,
    ) -> Result<()> {
        let Some(client) = correlation.client else {
            debug!("Query {} has no waiting client", request_id);
            return Ok(());
        };

        let orders = correlation
            .records
            .iter()
            .map(|record| {
                let (order, status) = translator::order_from_wire(record);
                OrderWithStatus { order, status }
            })
            .collect();
        self.emitter
            .reply(
                client,
                Notification::QueryReply {
                    query: correlation.query,
                    orders,
                    error_id,
                },
            )
            .await?;
        Ok(())
    }

    /// Disconnect or logout
    async fn session_lost(&self) -> Result<()> {
        let previous = self.state.on_disconnected();
        debug!("Session lost while {}", previous);
        if !self.config.clear_on_disconnect {
            return Ok(());
        }

        let dropped = self.orders.clear();
        if dropped > 0 {
            warn!("Dropped {} unacknowledged orders", dropped);
        }
        for (request_id, correlation) in self.queries.drain() {
            if let Err(e) = self.reply_to_query(request_id, correlation, SESSION_LOST).await {
                warn!("Could not notify query {} of session loss: {}", request_id, e);
            }
        }
        Ok(())
    }

    fn send(&self, command: SessionCommand) {
        if let Err(e) = self.dispatcher.send_session_command(command) {
            error!("Failed to send {:?}: {}", command, e);
        }
    }
}
