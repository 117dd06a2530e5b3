//! MULTI/EXEC transactions.
//!
//! ```text
//! Idle -> Watching (only with watched keys) -> Queuing -> Executing | Discarding -> Idle
//! ```
//!
//! While queuing, every command is answered with `+QUEUED` rather than its result. The real
//! results arrive together in the EXEC reply, in queue order. Consistency is left entirely to the
//! server: nothing is rolled back locally.

use futures::future::BoxFuture;
use std::fmt;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, instrument, warn};

use crate::client::Client;
use crate::commands::Command;
use crate::value::Value;
use crate::{Error, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    Idle,
    Watching,
    Queuing,
    Discarding,
    Executing,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// An open MULTI block. Only reachable from inside the body passed to [`Client::transaction`].
pub struct Transaction<'c, S> {
    client: &'c mut Client<S>,
    watched: Vec<String>,
    discard_on_failure: bool,
    queued: usize,
    state: State,
}

impl<'c, S> Transaction<'c, S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    fn new(client: &'c mut Client<S>, watched: &[&str], discard_on_failure: bool) -> Self {
        Transaction {
            client,
            watched: watched.iter().map(|key| key.to_string()).collect(),
            discard_on_failure,
            queued: 0,
            state: State::Idle,
        }
    }

    /// Queues a command. The reply it would have produced is part of the EXEC reply.
    pub async fn queue(&mut self, command: Command) -> Result<()> {
        if let Command::Multi
        | Command::Exec
        | Command::Discard
        | Command::Watch { .. }
        | Command::Subscribe { .. } = command
        {
            return Err(Error::Arity {
                command: command.name(),
                reason: String::from("not allowed inside a transaction"),
            });
        }

        match self.client.execute(command).await? {
            Value::SimpleString(s) if s == "QUEUED" => {
                self.queued += 1;
                Ok(())
            }
            actual => Err(Error::TypeMismatch {
                expected: "QUEUED",
                actual,
            }),
        }
    }

    /// Number of commands queued so far.
    pub fn queued(&self) -> usize {
        self.queued
    }

    pub fn watched(&self) -> &[String] {
        &self.watched
    }

    pub fn state(&self) -> State {
        self.state
    }

    fn transition(&mut self, to: State) {
        debug!(from = %self.state, to = %to, queued = self.queued, "Transaction state change");
        self.state = to;
    }

    async fn begin(&mut self) -> Result<()> {
        if !self.watched.is_empty() {
            self.transition(State::Watching);
            self.client
                .execute(Command::Watch {
                    keys: self.watched.clone(),
                })
                .await?
                .into_ok()?;
        }

        self.transition(State::Queuing);
        let multi = self.client.execute(Command::Multi).await;
        let res = multi.and_then(Value::into_ok);

        if let Err(err) = &res {
            self.transition(State::Idle);
            if !self.watched.is_empty() {
                debug!(error = %err, "MULTI failed, unwatching");
                if let Err(unwatch_err) = self.client.execute(Command::Unwatch).await {
                    warn!(error = %unwatch_err, "Failed to unwatch keys");
                }
            }
        }

        res
    }

    /// A nil array means a watched key changed and the server aborted the transaction.
    async fn exec(&mut self) -> Result<Value> {
        self.transition(State::Executing);
        let reply = self.client.execute(Command::Exec).await;
        self.transition(State::Idle);

        match reply? {
            reply @ Value::Array(_) => Ok(reply),
            actual => Err(Error::TypeMismatch {
                expected: "array",
                actual,
            }),
        }
    }

    async fn discard(&mut self) -> Result<Value> {
        self.transition(State::Discarding);
        let reply = self.client.execute(Command::Discard).await;
        self.transition(State::Idle);

        reply
    }
}

impl<S> Client<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Runs `body` inside MULTI/EXEC, watching `watch` first when it is not empty.
    ///
    /// Returns the EXEC reply: an array with one result per queued command, or a nil array when
    /// the server aborted the transaction because a watched key changed.
    ///
    /// When `body` fails the transaction is discarded. With `discard_on_failure` the DISCARD reply
    /// is returned; otherwise the body's error is.
    ///
    /// ```no_run
    /// # async fn run(client: &mut rustdis::Client) -> rustdis::Result<()> {
    /// use bytes::Bytes;
    /// use rustdis::Command;
    ///
    /// let reply = client
    ///     .transaction(&["balance"], false, |tx| {
    ///         Box::pin(async move {
    ///             tx.queue(Command::DecrBy { key: "balance".into(), decrement: 10 }).await?;
    ///             tx.queue(Command::RPush {
    ///                 key: "log".into(),
    ///                 values: vec![Bytes::from("-10")],
    ///             })
    ///             .await
    ///         })
    ///     })
    ///     .await?;
    /// println!("{}", reply);
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(skip_all, fields(watched = watch.len(), discard_on_failure = discard_on_failure))]
    pub async fn transaction<'c, F>(
        &'c mut self,
        watch: &[&str],
        discard_on_failure: bool,
        body: F,
    ) -> Result<Value>
    where
        F: for<'t> FnOnce(&'t mut Transaction<'c, S>) -> BoxFuture<'t, Result<()>>,
    {
        let mut tx = Transaction::new(self, watch, discard_on_failure);
        tx.begin().await?;

        match body(&mut tx).await {
            Ok(()) => tx.exec().await,
            Err(err) if tx.discard_on_failure => {
                debug!(error = %err, "Transaction body failed, discarding");
                tx.discard().await
            }
            Err(err) => {
                // Leave the connection out of MULTI state before reporting the failure.
                if let Err(discard_err) = tx.discard().await {
                    warn!(error = %discard_err, "Failed to discard transaction");
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::Connection;
    use bytes::Bytes;
    use tokio_test::io::Builder;

    fn client(mock: tokio_test::io::Mock) -> Client<tokio_test::io::Mock> {
        Client::new(Connection::new(mock))
    }

    #[tokio::test]
    async fn exec_returns_results_in_queue_order() {
        let mock = Builder::new()
            .write(b"MULTI\r\n")
            .read(b"+OK\r\n")
            .write(b"SET a \"1\"\r\n")
            .read(b"+QUEUED\r\n")
            .write(b"INCR a\r\n")
            .read(b"+QUEUED\r\n")
            .write(b"EXEC\r\n")
            .read(b"*2\r\n+OK\r\n:2\r\n")
            .build();
        let mut client = client(mock);

        let reply = client
            .transaction(&[], false, |tx| {
                Box::pin(async move {
                    tx.queue(Command::Set {
                        key: String::from("a"),
                        value: Bytes::from("1"),
                    })
                    .await?;
                    tx.queue(Command::Incr {
                        key: String::from("a"),
                    })
                    .await?;
                    assert_eq!(tx.queued(), 2);
                    Ok(())
                })
            })
            .await
            .unwrap();

        assert_eq!(
            reply,
            Value::from(vec![
                Value::SimpleString(String::from("OK")),
                Value::Integer(2)
            ])
        );
    }

    #[tokio::test]
    async fn aborted_exec_is_a_nil_array() {
        let mock = Builder::new()
            .write(b"WATCH a\r\n")
            .read(b"+OK\r\n")
            .write(b"MULTI\r\n")
            .read(b"+OK\r\n")
            .write(b"INCR a\r\n")
            .read(b"+QUEUED\r\n")
            .write(b"EXEC\r\n")
            .read(b"*-1\r\n")
            .build();
        let mut client = client(mock);

        let reply = client
            .transaction(&["a"], false, |tx| {
                Box::pin(async move {
                    assert_eq!(tx.watched(), &[String::from("a")]);
                    tx.queue(Command::Incr {
                        key: String::from("a"),
                    })
                    .await
                })
            })
            .await
            .unwrap();

        assert_eq!(reply, Value::Array(None));
    }

    #[tokio::test]
    async fn failing_body_with_discard_on_failure_returns_discard_reply() {
        let mock = Builder::new()
            .write(b"MULTI\r\n")
            .read(b"+OK\r\n")
            .write(b"INCR\r\n")
            .read(b"-ERR wrong number of arguments for 'incr' command\r\n")
            .write(b"DISCARD\r\n")
            .read(b"+OK\r\n")
            .build();
        let mut client = client(mock);

        let reply = client
            .transaction(&[], true, |tx| {
                Box::pin(async move { tx.queue(Command::Raw(String::from("INCR"))).await })
            })
            .await
            .unwrap();

        assert_eq!(reply, Value::SimpleString(String::from("OK")));
    }

    #[tokio::test]
    async fn failing_body_without_discard_on_failure_propagates() {
        let mock = Builder::new()
            .write(b"MULTI\r\n")
            .read(b"+OK\r\n")
            .write(b"DISCARD\r\n")
            .read(b"+OK\r\n")
            .build();
        let mut client = client(mock);

        let res = client
            .transaction(&[], false, |tx| {
                Box::pin(async move { tx.queue(Command::Del { keys: vec![] }).await })
            })
            .await;

        assert!(matches!(res, Err(Error::Arity { command: "DEL", .. })));
    }

    #[tokio::test]
    async fn failed_multi_unwatches_keys() {
        let mock = Builder::new()
            .write(b"WATCH a\r\n")
            .read(b"+OK\r\n")
            .write(b"MULTI\r\n")
            .read(b"-ERR MULTI calls can not be nested\r\n")
            .write(b"UNWATCH\r\n")
            .read(b"+OK\r\n")
            .build();
        let mut client = client(mock);

        let mut body_ran = false;
        let res = client
            .transaction(&["a"], false, |_| {
                body_ran = true;
                Box::pin(async move { Ok::<(), Error>(()) })
            })
            .await;

        assert!(matches!(res, Err(Error::Server(ref s)) if s.starts_with("ERR MULTI")));
        assert!(!body_ran);
    }

    #[tokio::test]
    async fn failed_multi_without_watch_sends_nothing_else() {
        let mock = Builder::new()
            .write(b"MULTI\r\n")
            .read(b"-ERR MULTI calls can not be nested\r\n")
            .build();
        let mut client = client(mock);

        let res = client
            .transaction(&[], false, |_| Box::pin(async move { Ok::<(), Error>(()) }))
            .await;

        assert!(matches!(res, Err(Error::Server(_))));
    }

    #[tokio::test]
    async fn nested_multi_is_rejected() {
        let mock = Builder::new()
            .write(b"MULTI\r\n")
            .read(b"+OK\r\n")
            .write(b"DISCARD\r\n")
            .read(b"+OK\r\n")
            .build();
        let mut client = client(mock);

        let res = client
            .transaction(&[], false, |tx| {
                Box::pin(async move { tx.queue(Command::Multi).await })
            })
            .await;

        assert!(matches!(res, Err(Error::Arity { command: "MULTI", .. })));
    }
}
