//! CTP gateway - wires the broker session to client commands
//!
//! Owns the state machine, both correlation stores, the dispatcher and the
//! router, and runs the loop that feeds them.

use super::correlation::{OrderCorrelationStore, QueryCorrelationCache};
use super::dispatcher::RequestDispatcher;
use super::router::EventRouter;
use super::session::{BrokerEvent, BrokerSession};
use super::state::{SessionState, SessionStateMachine};
use crate::config::GatewayConfig;
use crate::error::Result;
use crate::transport::{CommandReceiver, NotificationEmitter};
use log::{debug, error, info, warn};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};

pub struct CtpGateway {
    config: Arc<GatewayConfig>,
    state: Arc<SessionStateMachine>,
    orders: Arc<OrderCorrelationStore>,
    queries: Arc<QueryCorrelationCache>,
    dispatcher: Arc<RequestDispatcher>,
    router: EventRouter,
}

impl CtpGateway {
    pub fn new(
        config: GatewayConfig,
        session: Arc<dyn BrokerSession>,
        emitter: Arc<dyn NotificationEmitter>,
    ) -> Result<Self> {
        config.validate()?;
        let config = Arc::new(config);
        let state = Arc::new(SessionStateMachine::new());
        let orders = Arc::new(OrderCorrelationStore::new());
        let queries = Arc::new(QueryCorrelationCache::new());
        let dispatcher = Arc::new(RequestDispatcher::new(
            config.clone(),
            session,
            state.clone(),
            orders.clone(),
            queries.clone(),
        ));
        let router = EventRouter::new(
            config.clone(),
            state.clone(),
            orders.clone(),
            queries.clone(),
            dispatcher.clone(),
            emitter,
        );

        Ok(Self {
            config,
            state,
            orders,
            queries,
            dispatcher,
            router,
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn session_state(&self) -> SessionState {
        self.state.state()
    }

    pub fn is_ready(&self) -> bool {
        self.state.is_ready()
    }

    pub fn pending_orders(&self) -> usize {
        self.orders.len()
    }

    pub fn pending_queries(&self) -> usize {
        self.queries.len()
    }

    pub fn dispatcher(&self) -> &RequestDispatcher {
        &self.dispatcher
    }

    pub fn router(&self) -> &EventRouter {
        &self.router
    }

    /// Run until both the broker event stream and the command channel close
    pub async fn run(
        &self,
        mut events: mpsc::UnboundedReceiver<BrokerEvent>,
        mut commands: CommandReceiver,
    ) -> Result<()> {
        info!(
            "CtpGateway started for {}/{} (front {})",
            self.config.broker_id, self.config.user_id, self.config.front_addr
        );

        let query_timeout = self.config.query_timeout();
        let mut eviction = time::interval(self.config.eviction_interval());
        eviction.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut events_open = true;
        let mut commands_open = true;

        while events_open || commands_open {
            tokio::select! {
                // Broker callbacks
                event = events.recv(), if events_open => {
                    match event {
                        Some(event) => {
                            let kind = event.kind();
                            debug!("Broker event: {}", kind);
                            if let Err(e) = self.router.handle(event).await {
                                error!("Failed to route {}: {}", kind, e);
                            }
                        }
                        None => {
                            info!("Broker event stream closed");
                            events_open = false;
                        }
                    }
                }

                // Client commands
                command = commands.next(), if commands_open => {
                    match command {
                        Some(pending) => {
                            let client = pending.command.client;
                            let outcome = self.dispatcher.dispatch(pending.command.clone());
                            if !pending.respond(outcome) {
                                warn!("{} went away before its command outcome", client);
                            }
                        }
                        None => {
                            info!("Client command channel closed");
                            commands_open = false;
                        }
                    }
                }

                // Abandoned queries
                _ = eviction.tick(), if query_timeout.is_some() => {
                    if let Some(timeout) = query_timeout {
                        match self.router.evict_expired(timeout).await {
                            Ok(0) => {}
                            Ok(count) => debug!("Evicted {} expired queries", count),
                            Err(e) => error!("Failed to evict expired queries: {}", e),
                        }
                    }
                }
            }
        }

        info!("CtpGateway stopped");
        Ok(())
    }
}
