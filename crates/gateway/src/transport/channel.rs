//! Broadcast channel behind the notification fan-out
//!
//! Every subscriber sees every notification published after it subscribed.
//! A subscriber that falls more than `capacity` messages behind loses the
//! oldest ones and resumes from the oldest still buffered.

use crate::error::TransportError;
use crate::transport::{Publisher, Subscriber};
use async_trait::async_trait;
use log::warn;
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::broadcast::{
    self,
    error::{RecvError, TryRecvError},
};

pub struct ChannelPublisher<M> {
    tx: broadcast::Sender<M>,
}

impl<M: Clone> ChannelPublisher<M> {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> ChannelSubscriber<M> {
        ChannelSubscriber {
            rx: self.tx.subscribe(),
        }
    }

    /// Number of live subscribers
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[async_trait]
impl<M> Publisher<M> for ChannelPublisher<M>
where
    M: Serialize + Clone + Send + Sync + 'static,
{
    async fn publish(&self, msg: &M) -> Result<(), TransportError> {
        self.tx
            .send(msg.clone())
            .map(|_| ())
            .map_err(|_| TransportError::ChannelClosed)
    }
}

/// Closes once its publisher is dropped and the buffer is drained
pub struct ChannelSubscriber<M> {
    rx: broadcast::Receiver<M>,
}

#[async_trait]
impl<M> Subscriber<M> for ChannelSubscriber<M>
where
    M: DeserializeOwned + Clone + Send + 'static,
{
    async fn next(&mut self) -> Result<M, TransportError> {
        loop {
            match self.rx.recv().await {
                Ok(msg) => return Ok(msg),
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Subscriber lagged, {} notifications skipped", skipped);
                }
                Err(RecvError::Closed) => return Err(TransportError::ChannelClosed),
            }
        }
    }

    fn try_next(&mut self) -> Result<Option<M>, TransportError> {
        loop {
            match self.rx.try_recv() {
                Ok(msg) => return Ok(Some(msg)),
                Err(TryRecvError::Empty) => return Ok(None),
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!("Subscriber lagged, {} notifications skipped", skipped);
                }
                Err(TryRecvError::Closed) => return Err(TransportError::ChannelClosed),
            }
        }
    }
}
