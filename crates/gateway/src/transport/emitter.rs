//! Notification emitter
//!
//! Order confirmations, status and deal notifications go to every client;
//! query replies go only to the client that asked.

use crate::error::TransportError;
use crate::messages::{ClientHandle, Notification};
use crate::transport::Publisher;
use crate::transport::channel::{ChannelPublisher, ChannelSubscriber};
use async_trait::async_trait;
use dashmap::DashMap;
use log::{debug, warn};
use tokio::sync::mpsc;

/// Outbound side of the gateway, as seen by the event router
#[async_trait]
pub trait NotificationEmitter: Send + Sync {
    /// Send to every connected client
    async fn broadcast(&self, notification: Notification) -> Result<(), TransportError>;

    /// Send to one client
    async fn reply(
        &self,
        client: ClientHandle,
        notification: Notification,
    ) -> Result<(), TransportError>;
}

/// Emitter backed by tokio channels
///
/// The client transport calls [`register_client`](Self::register_client) when
/// a connection opens and forwards the returned receiver to the socket;
/// broadcast notifications are read from [`subscribe`](Self::subscribe).
pub struct ChannelEmitter {
    publisher: ChannelPublisher<Notification>,
    clients: DashMap<ClientHandle, mpsc::Sender<Notification>>,
    capacity: usize,
}

impl ChannelEmitter {
    pub fn new(capacity: usize) -> Self {
        Self {
            publisher: ChannelPublisher::new(capacity),
            clients: DashMap::new(),
            capacity,
        }
    }

    /// Receive broadcast notifications
    pub fn subscribe(&self) -> ChannelSubscriber<Notification> {
        self.publisher.subscribe()
    }

    /// Open a point-to-point channel for one client, replacing any previous one
    pub fn register_client(&self, client: ClientHandle) -> mpsc::Receiver<Notification> {
        let (tx, rx) = mpsc::channel(self.capacity);
        if self.clients.insert(client, tx).is_some() {
            warn!("{} registered twice, previous channel dropped", client);
        }
        rx
    }

    pub fn unregister_client(&self, client: ClientHandle) -> bool {
        self.clients.remove(&client).is_some()
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }
}

#[async_trait]
impl NotificationEmitter for ChannelEmitter {
    async fn broadcast(&self, notification: Notification) -> Result<(), TransportError> {
        if self.publisher.receiver_count() == 0 {
            debug!("No subscribers, dropping {}", notification.kind());
            return Ok(());
        }
        self.publisher.publish(&notification).await
    }

    async fn reply(
        &self,
        client: ClientHandle,
        notification: Notification,
    ) -> Result<(), TransportError> {
        // Clone the sender out so the map shard is not locked across the await
        let tx = self
            .clients
            .get(&client)
            .map(|entry| entry.value().clone())
            .ok_or(TransportError::UnknownClient(client))?;

        tx.send(notification).await.map_err(|_| {
            self.clients.remove(&client);
            TransportError::Send(format!("{client} disconnected"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::Subscriber;
    use tradegate_core::{Order, OrderQuery};

    fn confirm(error_id: i32) -> Notification {
        Notification::OrderConfirm {
            order: Order::default(),
            error_id,
            error_msg: String::new(),
        }
    }

    #[tokio::test]
    async fn test_broadcast_without_subscribers_is_dropped() {
        let emitter = ChannelEmitter::new(8);
        emitter.broadcast(confirm(0)).await.unwrap();
    }

    #[tokio::test]
    async fn test_broadcast_fans_out() {
        let emitter = ChannelEmitter::new(8);
        let mut first = emitter.subscribe();
        let mut second = emitter.subscribe();

        emitter.broadcast(confirm(3)).await.unwrap();

        assert_eq!(first.next().await.unwrap(), confirm(3));
        assert_eq!(second.next().await.unwrap(), confirm(3));
    }

    #[tokio::test]
    async fn test_reply_reaches_only_its_client() {
        let emitter = ChannelEmitter::new(8);
        let mut alice = emitter.register_client(ClientHandle(1));
        let mut bob = emitter.register_client(ClientHandle(2));

        let reply = Notification::QueryReply {
            query: OrderQuery::default(),
            orders: Vec::new(),
            error_id: 0,
        };
        emitter.reply(ClientHandle(2), reply.clone()).await.unwrap();

        assert_eq!(bob.recv().await, Some(reply));
        assert!(alice.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_reply_to_unknown_client() {
        let emitter = ChannelEmitter::new(8);
        let err = emitter.reply(ClientHandle(9), confirm(0)).await.unwrap_err();
        assert!(matches!(err, TransportError::UnknownClient(ClientHandle(9))));
    }

    #[tokio::test]
    async fn test_reply_to_closed_client_unregisters_it() {
        let emitter = ChannelEmitter::new(8);
        let rx = emitter.register_client(ClientHandle(4));
        drop(rx);

        let err = emitter.reply(ClientHandle(4), confirm(0)).await.unwrap_err();
        assert!(matches!(err, TransportError::Send(_)));
        assert_eq!(emitter.client_count(), 0);
        assert!(!emitter.unregister_client(ClientHandle(4)));
    }
}
