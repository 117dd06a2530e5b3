//! Publish/subscribe.
//!
//! Once SUBSCRIBE is sent the connection only carries push messages: three element arrays of
//! `[kind, channel, payload]`. A [`Subscription`] owns the client for as long as it is open and
//! reads those pushes one at a time until every channel is unsubscribed or its cancellation token
//! fires.

use std::collections::{HashSet, VecDeque};

use bytes::Bytes;
use strum_macros::{AsRefStr, Display, EnumString};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, trace};

use crate::client::Client;
use crate::commands::Command;
use crate::value::Value;
use crate::{Error, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, AsRefStr, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum MessageKind {
    Subscribe,
    Unsubscribe,
    Message,
}

/// One push message.
///
/// For `Subscribe` and `Unsubscribe` acknowledgements the payload is the number of channels the
/// connection is still subscribed to; for `Message` it is the published bulk string.
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    pub kind: MessageKind,
    pub channel: String,
    pub payload: Value,
}

impl TryFrom<Value> for Message {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        let [kind, channel, payload]: [Value; 3] = match value.into_vec()?.try_into() {
            Ok(parts) => parts,
            Err(values) => {
                return Err(Error::TypeMismatch {
                    expected: "push message",
                    actual: Value::Array(Some(values)),
                })
            }
        };

        let kind = kind.into_string()?.unwrap_or_default();
        let kind: MessageKind = kind.parse().map_err(|_| Error::TypeMismatch {
            expected: "push message kind",
            actual: Value::BulkString(Some(Bytes::from(kind))),
        })?;

        Ok(Message {
            kind,
            channel: channel.into_string()?.unwrap_or_default(),
            payload,
        })
    }
}

impl Message {
    /// Subscriptions left after a subscribe or unsubscribe acknowledgement.
    pub fn remaining(&self) -> Option<i64> {
        match (self.kind, &self.payload) {
            (MessageKind::Subscribe | MessageKind::Unsubscribe, Value::Integer(n)) => Some(*n),
            _ => None,
        }
    }

    /// The published payload of a `Message`.
    pub fn data(&self) -> Option<&Bytes> {
        match (self.kind, &self.payload) {
            (MessageKind::Message, Value::BulkString(Some(data))) => Some(data),
            _ => None,
        }
    }
}

/// What the handler passed to [`Subscription::run`] wants to happen next.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Continue,
    /// Unsubscribe from these channels, or from every channel when empty.
    Unsubscribe(Vec<String>),
}

/// An open subscription borrowing its client.
///
/// Cancelling the token only stops reading: the server still considers the connection
/// subscribed. Call [`Subscription::close`] before using the client for commands again. A
/// subscription dropped without it leaves the client in subscribed mode, and pushes still in
/// flight would be read as replies to the next command.
pub struct Subscription<'a, S> {
    client: &'a mut Client<S>,
    channels: HashSet<String>,
    // Pushes read while waiting for an acknowledgement, delivered before anything new is read.
    pending: VecDeque<Message>,
    token: CancellationToken,
}

impl<'a, S> Subscription<'a, S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    fn new(client: &'a mut Client<S>) -> Self {
        Subscription {
            client,
            channels: HashSet::new(),
            pending: VecDeque::new(),
            token: CancellationToken::new(),
        }
    }

    pub fn channels(&self) -> &HashSet<String> {
        &self.channels
    }

    /// A token that stops the loop when cancelled. It is also cancelled once no channel is left.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Subscribes to more channels. The acknowledgements are delivered as messages.
    pub async fn subscribe(&mut self, channels: &[&str]) -> Result<()> {
        let channels: Vec<String> = channels.iter().map(|c| c.to_string()).collect();
        let expected = channels.len();

        self.client
            .connection_mut()
            .write_command(&Command::Subscribe { channels })
            .await?;

        let mut acknowledged = 0;
        while acknowledged < expected {
            let message = self.read_message().await?;
            if message.kind == MessageKind::Subscribe {
                self.channels.insert(message.channel.clone());
                acknowledged += 1;
            }
            self.pending.push_back(message);
        }

        debug!(channels = ?self.channels, "Subscribed");

        Ok(())
    }

    /// Unsubscribes from `channels`, or from every channel when empty, and returns the
    /// acknowledgements. Messages that arrive in the meantime are kept for [`next_message`].
    ///
    /// [`next_message`]: Subscription::next_message
    pub async fn unsubscribe(&mut self, channels: &[&str]) -> Result<Vec<Message>> {
        let channels: Vec<String> = if channels.is_empty() {
            self.channels.iter().cloned().collect()
        } else {
            channels.iter().map(|c| c.to_string()).collect()
        };

        if channels.is_empty() {
            self.token.cancel();
            return Ok(vec![]);
        }

        let expected = channels.len();
        self.client
            .connection_mut()
            .write_command(&Command::Unsubscribe { channels })
            .await?;

        let mut acks = Vec::with_capacity(expected);
        while acks.len() < expected {
            let message = self.read_message().await?;
            if message.kind == MessageKind::Unsubscribe {
                self.acknowledge_unsubscribe(&message);
                acks.push(message);
            } else {
                self.pending.push_back(message);
            }
        }

        Ok(acks)
    }

    /// The next push, or `None` once the subscription is cancelled and nothing read earlier is
    /// left to deliver.
    pub async fn next_message(&mut self) -> Result<Option<Message>> {
        if let Some(message) = self.pending.pop_front() {
            return Ok(Some(message));
        }

        if self.token.is_cancelled() {
            return Ok(None);
        }

        let value = tokio::select! {
            biased;
            _ = self.token.cancelled() => return Ok(None),
            value = self.client.connection_mut().read_value() => value?,
        };

        let message = Message::try_from(value)?;
        if message.kind == MessageKind::Unsubscribe {
            self.acknowledge_unsubscribe(&message);
        }

        Ok(Some(message))
    }

    /// Dispatches every push to `handler` until the subscription is cancelled.
    ///
    /// Decode and server errors end the loop and are returned.
    pub async fn run<F>(&mut self, mut handler: F) -> Result<()>
    where
        F: FnMut(&Message) -> Action,
    {
        while let Some(message) = self.next_message().await? {
            trace!(kind = %message.kind, channel = %message.channel, "Dispatching message");

            if let Action::Unsubscribe(channels) = handler(&message) {
                let channels: Vec<&str> = channels.iter().map(String::as_str).collect();
                self.unsubscribe(&channels).await?;
            }
        }

        Ok(())
    }

    /// Unsubscribes from whatever is left so the connection can carry commands again.
    pub async fn close(mut self) -> Result<()> {
        if !self.channels.is_empty() {
            self.unsubscribe(&[]).await?;
        }
        Ok(())
    }

    async fn read_message(&mut self) -> Result<Message> {
        let value = self.client.connection_mut().read_value().await?;
        Message::try_from(value)
    }

    fn acknowledge_unsubscribe(&mut self, message: &Message) {
        self.channels.remove(&message.channel);
        if message.remaining() == Some(0) {
            debug!("No subscriptions left");
            self.token.cancel();
        }
    }
}

impl<S> Client<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Subscribes to `channels` and hands back the open subscription.
    #[instrument(skip(self))]
    pub async fn subscription(&mut self, channels: &[&str]) -> Result<Subscription<'_, S>> {
        let mut subscription = Subscription::new(self);
        subscription.subscribe(channels).await?;
        Ok(subscription)
    }

    /// Subscribes to `channels` and dispatches every push, acknowledgements included, to
    /// `handler` until it unsubscribes from everything.
    pub async fn subscribe<F>(&mut self, channels: &[&str], handler: F) -> Result<()>
    where
        F: FnMut(&Message) -> Action,
    {
        self.subscription(channels).await?.run(handler).await
    }
}
