use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncWrite};

use super::{bytes, bytes_list, owned, Client};
use crate::commands::{Command, InsertPosition};
use crate::value::Value;
use crate::Result;

/// `[key, element]` from the blocking pops, or `None` once the timeout expires.
fn popped(value: Value) -> Result<Option<(String, Bytes)>> {
    match value.into_array()? {
        None => Ok(None),
        Some(values) => {
            let mut pairs = Value::from(values).into_pairs()?.into_iter();
            match pairs.next() {
                Some((key, element)) => Ok(Some((
                    key.into_string()?.unwrap_or_default(),
                    element.into_bytes()?.unwrap_or_default(),
                ))),
                None => Ok(None),
            }
        }
    }
}

impl<S> Client<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Waits up to `timeout` seconds (0 waits forever) for an element to pop from the first
    /// non-empty list.
    pub async fn blpop(&mut self, keys: &[&str], timeout: i64) -> Result<Option<(String, Bytes)>> {
        let reply = self
            .execute(Command::BLPop {
                keys: owned(keys),
                timeout,
            })
            .await?;

        popped(reply)
    }

    pub async fn brpop(&mut self, keys: &[&str], timeout: i64) -> Result<Option<(String, Bytes)>> {
        let reply = self
            .execute(Command::BRPop {
                keys: owned(keys),
                timeout,
            })
            .await?;

        popped(reply)
    }

    /// Returns the moved element, or `None` once the timeout expires.
    pub async fn brpoplpush(
        &mut self,
        source: &str,
        destination: &str,
        timeout: i64,
    ) -> Result<Option<Bytes>> {
        let reply = self
            .execute(Command::BRPopLPush {
                source: source.to_string(),
                destination: destination.to_string(),
                timeout,
            })
            .await?;

        match reply {
            // A timeout is answered with a nil array.
            Value::Array(None) => Ok(None),
            reply => reply.into_bytes(),
        }
    }

    pub async fn lindex(&mut self, key: &str, index: i64) -> Result<Option<Bytes>> {
        self.execute(Command::LIndex {
            key: key.to_string(),
            index,
        })
        .await?
        .into_bytes()
    }

    /// Returns the new length, or -1 when `pivot` was not found.
    pub async fn linsert(
        &mut self,
        key: &str,
        position: InsertPosition,
        pivot: impl AsRef<[u8]>,
        value: impl AsRef<[u8]>,
    ) -> Result<i64> {
        self.execute(Command::LInsert {
            key: key.to_string(),
            position,
            pivot: bytes(pivot),
            value: bytes(value),
        })
        .await?
        .into_integer()
    }

    pub async fn llen(&mut self, key: &str) -> Result<i64> {
        self.execute(Command::LLen {
            key: key.to_string(),
        })
        .await?
        .into_integer()
    }

    pub async fn lpop(&mut self, key: &str) -> Result<Option<Bytes>> {
        self.execute(Command::LPop {
            key: key.to_string(),
        })
        .await?
        .into_bytes()
    }

    pub async fn lpush<V: AsRef<[u8]>>(&mut self, key: &str, values: &[V]) -> Result<i64> {
        self.execute(Command::LPush {
            key: key.to_string(),
            values: bytes_list(values),
        })
        .await?
        .into_integer()
    }

    pub async fn lpushx(&mut self, key: &str, value: impl AsRef<[u8]>) -> Result<i64> {
        self.execute(Command::LPushX {
            key: key.to_string(),
            value: bytes(value),
        })
        .await?
        .into_integer()
    }

    pub async fn lrange(&mut self, key: &str, start: i64, stop: i64) -> Result<Vec<Bytes>> {
        self.execute(Command::LRange {
            key: key.to_string(),
            start,
            stop,
        })
        .await?
        .into_bytes_list()
    }

    pub async fn lrem(&mut self, key: &str, count: i64, value: impl AsRef<[u8]>) -> Result<i64> {
        self.execute(Command::LRem {
            key: key.to_string(),
            count,
            value: bytes(value),
        })
        .await?
        .into_integer()
    }

    pub async fn lset(&mut self, key: &str, index: i64, value: impl AsRef<[u8]>) -> Result<()> {
        self.execute(Command::LSet {
            key: key.to_string(),
            index,
            value: bytes(value),
        })
        .await?
        .into_ok()
    }

    pub async fn ltrim(&mut self, key: &str, start: i64, stop: i64) -> Result<()> {
        self.execute(Command::LTrim {
            key: key.to_string(),
            start,
            stop,
        })
        .await?
        .into_ok()
    }

    pub async fn rpop(&mut self, key: &str) -> Result<Option<Bytes>> {
        self.execute(Command::RPop {
            key: key.to_string(),
        })
        .await?
        .into_bytes()
    }

    pub async fn rpoplpush(&mut self, source: &str, destination: &str) -> Result<Option<Bytes>> {
        self.execute(Command::RPopLPush {
            source: source.to_string(),
            destination: destination.to_string(),
        })
        .await?
        .into_bytes()
    }

    pub async fn rpush<V: AsRef<[u8]>>(&mut self, key: &str, values: &[V]) -> Result<i64> {
        self.execute(Command::RPush {
            key: key.to_string(),
            values: bytes_list(values),
        })
        .await?
        .into_integer()
    }

    pub async fn rpushx(&mut self, key: &str, value: impl AsRef<[u8]>) -> Result<i64> {
        self.execute(Command::RPushX {
            key: key.to_string(),
            value: bytes(value),
        })
        .await?
        .into_integer()
    }
}
