//! # Subscription
//!
//! Defines the receiving side of the bus.

use crate::events::Message;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tokio_stream::wrappers::ReceiverStream;

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// Every sender is gone (broker dropped).
    #[error("Message broker closed")]
    Closed,
}

/// A subscription handle for receiving messages.
///
/// Dropping the handle closes the channel; the broker prunes it on the next
/// publish to any of its topics.
pub struct Subscription {
    receiver: mpsc::Receiver<Message>,
}

impl Subscription {
    pub(crate) fn new(receiver: mpsc::Receiver<Message>) -> Self {
        Self { receiver }
    }

    /// Receive the next message.
    ///
    /// # Returns
    ///
    /// - `Some(message)` - The next message
    /// - `None` - The channel was closed (broker dropped)
    pub async fn recv(&mut self) -> Option<Message> {
        self.receiver.recv().await
    }

    /// Try to receive the next message without blocking.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(message))` - A message was available
    /// - `Ok(None)` - No message available (would block)
    /// - `Err(SubscriptionError::Closed)` - The channel was closed
    pub fn try_recv(&mut self) -> Result<Option<Message>, SubscriptionError> {
        match self.receiver.try_recv() {
            Ok(message) => Ok(Some(message)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(SubscriptionError::Closed),
        }
    }

    /// Convert into a `Stream` for use with stream combinators.
    #[must_use]
    pub fn into_stream(self) -> ReceiverStream<Message> {
        ReceiverStream::new(self.receiver)
    }
}
