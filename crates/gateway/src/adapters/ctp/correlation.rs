//! Correlation stores
//!
//! Both maps follow copy-out-then-unlock: an entry is removed (or its
//! contents cloned) under the shard lock and processed after the lock is
//! released. Removal is the only way to read a pending order, so each
//! entry is consumed at most once.

use super::wire::{OrderField, RequestId};
use crate::messages::ClientHandle;
use dashmap::DashMap;
use log::{debug, warn};
use std::time::Duration;
use tokio::time::Instant;
use tradegate_core::{Order, OrderQuery};

/// Identity of one in-flight insert within a broker session
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PendingOrderKey {
    pub user_id: String,
    pub order_ref: String,
    pub front_id: i32,
    pub session_id: i32,
}

impl PendingOrderKey {
    pub fn new(user_id: &str, order_ref: &str, front_id: i32, session_id: i32) -> Self {
        Self {
            user_id: user_id.to_string(),
            order_ref: order_ref.to_string(),
            front_id,
            session_id,
        }
    }
}

impl std::fmt::Display for PendingOrderKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}_{}_{}#{}",
            self.user_id, self.order_ref, self.front_id, self.session_id
        )
    }
}

/// Client orders waiting for their broker acknowledgement
#[derive(Debug, Default)]
pub struct OrderCorrelationStore {
    pending: DashMap<PendingOrderKey, Order>,
}

impl OrderCorrelationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, key: PendingOrderKey, order: Order) {
        debug!("Pending order recorded: {}", key);
        if let Some(previous) = self.pending.insert(key, order) {
            warn!(
                "Pending order replaced an unacknowledged one for {}{}",
                previous.symbol, previous.contract
            );
        }
    }

    /// Remove and return the order recorded under `key`
    pub fn take(&self, key: &PendingOrderKey) -> Option<Order> {
        self.pending.remove(key).map(|(_, order)| order)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drop every pending order, returning how many there were
    pub fn clear(&self) -> usize {
        let count = self.pending.len();
        self.pending.clear();
        count
    }
}

/// One outstanding order query and the records received for it so far
#[derive(Debug, Clone)]
pub struct QueryCorrelation {
    /// `None` when parts arrived for a request this gateway never sent
    pub client: Option<ClientHandle>,
    pub query: OrderQuery,
    pub records: Vec<OrderField>,
    pub created_at: Instant,
}

impl QueryCorrelation {
    fn new(client: Option<ClientHandle>, query: OrderQuery) -> Self {
        Self {
            client,
            query,
            records: Vec::new(),
            created_at: Instant::now(),
        }
    }
}

/// Multi-part query responses, keyed by request id
#[derive(Debug, Default)]
pub struct QueryCorrelationCache {
    entries: DashMap<RequestId, QueryCorrelation>,
}

impl QueryCorrelationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open an empty accumulator before the query is sent
    pub fn register(&self, request_id: RequestId, client: ClientHandle, query: OrderQuery) {
        self.entries
            .insert(request_id, QueryCorrelation::new(Some(client), query));
    }

    /// Add one non-terminal part. An empty part adds nothing.
    pub fn append(&self, request_id: RequestId, record: Option<OrderField>) {
        let mut entry = self.entries.entry(request_id).or_insert_with(|| {
            debug!("Query part for unknown request {}", request_id);
            QueryCorrelation::new(None, OrderQuery::default())
        });
        entry.records.extend(record);
    }

    /// Add the terminal part and remove the entry
    pub fn complete(&self, request_id: RequestId, record: Option<OrderField>) -> QueryCorrelation {
        let mut correlation = match self.entries.remove(&request_id) {
            Some((_, correlation)) => correlation,
            None => {
                debug!("Terminal query part for unknown request {}", request_id);
                QueryCorrelation::new(None, OrderQuery::default())
            }
        };
        correlation.records.extend(record);
        correlation
    }

    /// Drop an entry whose query never reached the broker
    pub fn discard(&self, request_id: RequestId) -> Option<QueryCorrelation> {
        self.entries.remove(&request_id).map(|(_, correlation)| correlation)
    }

    /// Remove every entry at least `max_age` old
    pub fn evict_expired(&self, max_age: Duration) -> Vec<(RequestId, QueryCorrelation)> {
        let expired: Vec<RequestId> = self
            .entries
            .iter()
            .filter(|entry| entry.created_at.elapsed() >= max_age)
            .map(|entry| *entry.key())
            .collect();

        expired
            .into_iter()
            .filter_map(|request_id| {
                self.entries
                    .remove_if(&request_id, |_, entry| entry.created_at.elapsed() >= max_age)
            })
            .collect()
    }

    /// Remove every entry
    pub fn drain(&self) -> Vec<(RequestId, QueryCorrelation)> {
        let ids: Vec<RequestId> = self.entries.iter().map(|entry| *entry.key()).collect();
        ids.into_iter()
            .filter_map(|request_id| self.entries.remove(&request_id))
            .collect()
    }

    pub fn contains(&self, request_id: RequestId) -> bool {
        self.entries.contains_key(&request_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
