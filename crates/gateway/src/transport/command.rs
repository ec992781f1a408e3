//! Client command channel
//!
//! Each client connection holds a clone of [`CommandSender`]; the gateway
//! loop owns the single [`CommandReceiver`] and answers every command with a
//! [`CommandOutcome`].

use crate::error::TransportError;
use crate::messages::{ClientCommand, CommandOutcome};
use crate::transport::Requester;
use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

/// A command waiting for its outcome
pub struct PendingCommand {
    pub command: ClientCommand,
    reply_tx: oneshot::Sender<CommandOutcome>,
}

impl PendingCommand {
    /// Deliver the outcome; false if the sender stopped waiting
    pub fn respond(self, outcome: CommandOutcome) -> bool {
        self.reply_tx.send(outcome).is_ok()
    }
}

pub fn command_channel(capacity: usize) -> (CommandSender, CommandReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    (CommandSender { tx }, CommandReceiver { rx })
}

#[derive(Clone)]
pub struct CommandSender {
    tx: mpsc::Sender<PendingCommand>,
}

#[async_trait]
impl Requester<ClientCommand, CommandOutcome> for CommandSender {
    async fn request(&self, command: &ClientCommand) -> Result<CommandOutcome, TransportError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        let pending = PendingCommand {
            command: command.clone(),
            reply_tx,
        };
        self.tx
            .send(pending)
            .await
            .map_err(|_| TransportError::ChannelClosed)?;
        reply_rx.await.map_err(|_| TransportError::ChannelClosed)
    }
}

pub struct CommandReceiver {
    rx: mpsc::Receiver<PendingCommand>,
}

impl CommandReceiver {
    /// Next command; None once every sender is dropped
    pub async fn next(&mut self) -> Option<PendingCommand> {
        self.rx.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::{ClientHandle, ClientRequest, RejectReason};
    use tradegate_core::OrderQuery;

    fn query_from(client: u64) -> ClientCommand {
        ClientCommand::new(
            ClientHandle(client),
            ClientRequest::QueryOrder(OrderQuery::default()),
        )
    }

    #[tokio::test]
    async fn test_outcome_returns_to_its_sender() {
        let (sender, mut receiver) = command_channel(4);
        let other = sender.clone();

        let server = tokio::spawn(async move {
            while let Some(pending) = receiver.next().await {
                let request_id = pending.command.client.0 as i32;
                assert!(pending.respond(CommandOutcome::Accepted { request_id }));
            }
        });

        assert_eq!(
            sender.request(&query_from(3)).await.unwrap(),
            CommandOutcome::Accepted { request_id: 3 }
        );
        assert_eq!(
            other.request(&query_from(5)).await.unwrap(),
            CommandOutcome::Accepted { request_id: 5 }
        );

        drop(sender);
        drop(other);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_request_fails_without_receiver() {
        let (sender, receiver) = command_channel(1);
        drop(receiver);

        let err = sender.request(&query_from(1)).await.unwrap_err();
        assert!(matches!(err, TransportError::ChannelClosed));
    }

    #[tokio::test]
    async fn test_unanswered_command_fails_request() {
        let (sender, mut receiver) = command_channel(1);
        let server = tokio::spawn(async move {
            // Dropped without an outcome
            receiver.next().await.map(|pending| pending.command)
        });

        let err = sender.request(&query_from(2)).await.unwrap_err();
        assert!(matches!(err, TransportError::ChannelClosed));
        assert_eq!(server.await.unwrap().map(|c| c.client), Some(ClientHandle(2)));
    }

    #[tokio::test]
    async fn test_respond_after_sender_gave_up() {
        let (sender, mut receiver) = command_channel(1);
        let request = tokio::spawn(async move { sender.request(&query_from(4)).await });

        let pending = receiver.next().await.unwrap();
        request.abort();
        let _ = request.await;

        let outcome = CommandOutcome::Rejected {
            reason: RejectReason::NotReady,
            message: "not ready".to_string(),
        };
        assert!(!pending.respond(outcome));
    }
}
