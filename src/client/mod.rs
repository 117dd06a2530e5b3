//! Command execution and the typed per-command API.
//!
//! Every typed method builds a [`Command`], runs one round trip through [`Client::execute`] and
//! narrows the reply to the shape the command documents, failing with `Error::TypeMismatch`
//! otherwise.

mod connection;
mod hashes;
mod keys;
mod lists;
mod sets;
mod sorted_sets;
mod strings;

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tracing::{debug, instrument, trace};

use crate::commands::Command;
use crate::config::Config;
use crate::connection::Connection;
use crate::value::Value;
use crate::{Error, Result};

/// A client owning one connection. Calls are strictly sequential: each one writes a command and
/// waits for its reply before returning.
pub struct Client<S = TcpStream> {
    conn: Connection<S>,
}

impl Client<TcpStream> {
    pub async fn connect(config: &Config) -> Result<Self> {
        let conn = Connection::open(config).await?;
        Ok(Client::new(conn))
    }
}

impl<S> Client<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(conn: Connection<S>) -> Client<S> {
        Client { conn }
    }

    pub fn connection(&self) -> &Connection<S> {
        &self.conn
    }

    pub(crate) fn connection_mut(&mut self) -> &mut Connection<S> {
        &mut self.conn
    }

    /// Sends one command and waits for its reply.
    ///
    /// Error replies come back as `Error::Server`. No retry is attempted.
    #[instrument(name = "execute", skip_all, fields(command = command.name()))]
    pub async fn execute(&mut self, command: Command) -> Result<Value> {
        self.conn.write_command(&command).await?;

        match self.conn.read_value().await {
            Ok(value) => {
                trace!(reply = ?value, "Received reply");
                Ok(value)
            }
            Err(Error::Server(message)) => {
                debug!(error = %message, "Server replied with an error");
                Err(Error::Server(message))
            }
            Err(err) => Err(err),
        }
    }

    /// Sends a complete command line as is, e.g. `client.raw("CONFIG GET maxmemory")`.
    pub async fn raw(&mut self, line: impl Into<String>) -> Result<Value> {
        self.execute(Command::Raw(line.into())).await
    }

    pub async fn close(self) -> Result<()> {
        self.conn.close().await
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

fn bytes(value: impl AsRef<[u8]>) -> Bytes {
    Bytes::copy_from_slice(value.as_ref())
}

fn bytes_list<V: AsRef<[u8]>>(values: &[V]) -> Vec<Bytes> {
    values.iter().map(bytes).collect()
}

/// A float reply that is never nil.
fn float(value: Value) -> Result<f64> {
    match value.into_float()? {
        Some(f) => Ok(f),
        None => Err(Error::TypeMismatch {
            expected: "float",
            actual: Value::BulkString(None),
        }),
    }
}

/// `member score member score ...` as returned by the WITHSCORES range commands.
fn scored(value: Value) -> Result<Vec<(Bytes, f64)>> {
    value
        .into_pairs()?
        .into_iter()
        .map(|(member, score)| {
            let member = member.into_bytes()?.unwrap_or_default();
            Ok((member, float(score)?))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::io::Builder;

    pub(crate) fn client(mock: tokio_test::io::Mock) -> Client<tokio_test::io::Mock> {
        Client::new(Connection::new(mock))
    }

    #[tokio::test]
    async fn execute_round_trip() {
        let mock = Builder::new().write(b"PING\r\n").read(b"+PONG\r\n").build();
        let mut client = client(mock);

        let value = client.execute(Command::Ping).await.unwrap();

        assert_eq!(value, Value::SimpleString("PONG".to_string()));
    }

    #[tokio::test]
    async fn execute_surfaces_server_errors() {
        let mock = Builder::new()
            .write(b"INCR counter\r\n")
            .read(b"-ERR value is not an integer or out of range\r\n")
            .build();
        let mut client = client(mock);

        let res = client
            .execute(Command::Incr {
                key: String::from("counter"),
            })
            .await;

        assert!(matches!(
            res,
            Err(Error::Server(ref s)) if s == "ERR value is not an integer or out of range"
        ));
    }

    #[tokio::test]
    async fn execute_surfaces_decode_errors() {
        let mock = Builder::new().write(b"GET k\r\n").read(b"?what\r\n").build();
        let mut client = client(mock);

        let res = client
            .execute(Command::Get {
                key: String::from("k"),
            })
            .await;

        assert!(matches!(res, Err(Error::Decode(_))));
    }

    #[tokio::test]
    async fn raw_command() {
        let mock = Builder::new()
            .write(b"CONFIG GET maxmemory\r\n")
            .read(b"*2\r\n$9\r\nmaxmemory\r\n$1\r\n0\r\n")
            .build();
        let mut client = client(mock);

        let value = client.raw("CONFIG GET maxmemory").await.unwrap();

        assert_eq!(value, Value::from(vec![Value::from("maxmemory"), Value::from("0")]));
    }

    #[test]
    fn scored_pairs() {
        let value = Value::from(vec![
            Value::from("a"),
            Value::from("1"),
            Value::from("b"),
            Value::from("2.5"),
        ]);

        assert_eq!(
            scored(value).unwrap(),
            vec![(Bytes::from("a"), 1.0), (Bytes::from("b"), 2.5)]
        );
    }
}
