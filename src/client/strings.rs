use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncWrite};

use super::{bytes, float, owned, Client};
use crate::commands::{BitOperation, Command};
use crate::Result;

impl<S> Client<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Returns the length of the string after the append.
    pub async fn append(&mut self, key: &str, value: impl AsRef<[u8]>) -> Result<i64> {
        self.execute(Command::Append {
            key: key.to_string(),
            value: bytes(value),
        })
        .await?
        .into_integer()
    }

    /// Counts set bits, optionally within a byte range.
    pub async fn bitcount(&mut self, key: &str, range: Option<(i64, i64)>) -> Result<i64> {
        self.execute(Command::BitCount {
            key: key.to_string(),
            range,
        })
        .await?
        .into_integer()
    }

    pub async fn bitop(
        &mut self,
        operation: BitOperation,
        destination: &str,
        keys: &[&str],
    ) -> Result<i64> {
        self.execute(Command::BitOp {
            operation,
            destination: destination.to_string(),
            keys: owned(keys),
        })
        .await?
        .into_integer()
    }

    /// An `end` can only be given together with a `start`.
    pub async fn bitpos(
        &mut self,
        key: &str,
        bit: u8,
        start: Option<i64>,
        end: Option<i64>,
    ) -> Result<i64> {
        self.execute(Command::BitPos {
            key: key.to_string(),
            bit,
            start,
            end,
        })
        .await?
        .into_integer()
    }

    pub async fn decr(&mut self, key: &str) -> Result<i64> {
        self.execute(Command::Decr {
            key: key.to_string(),
        })
        .await?
        .into_integer()
    }

    pub async fn decrby(&mut self, key: &str, decrement: i64) -> Result<i64> {
        self.execute(Command::DecrBy {
            key: key.to_string(),
            decrement,
        })
        .await?
        .into_integer()
    }

    pub async fn get(&mut self, key: &str) -> Result<Option<Bytes>> {
        self.execute(Command::Get {
            key: key.to_string(),
        })
        .await?
        .into_bytes()
    }

    pub async fn getbit(&mut self, key: &str, offset: u64) -> Result<u8> {
        let bit = self
            .execute(Command::GetBit {
                key: key.to_string(),
                offset,
            })
            .await?
            .into_bool()?;

        Ok(u8::from(bit))
    }

    pub async fn getrange(&mut self, key: &str, start: i64, end: i64) -> Result<Bytes> {
        let value = self
            .execute(Command::GetRange {
                key: key.to_string(),
                start,
                end,
            })
            .await?
            .into_bytes()?;

        Ok(value.unwrap_or_default())
    }

    pub async fn getset(&mut self, key: &str, value: impl AsRef<[u8]>) -> Result<Option<Bytes>> {
        self.execute(Command::GetSet {
            key: key.to_string(),
            value: bytes(value),
        })
        .await?
        .into_bytes()
    }

    pub async fn incr(&mut self, key: &str) -> Result<i64> {
        self.execute(Command::Incr {
            key: key.to_string(),
        })
        .await?
        .into_integer()
    }

    pub async fn incrby(&mut self, key: &str, increment: i64) -> Result<i64> {
        self.execute(Command::IncrBy {
            key: key.to_string(),
            increment,
        })
        .await?
        .into_integer()
    }

    pub async fn incrbyfloat(&mut self, key: &str, increment: f64) -> Result<f64> {
        let reply = self
            .execute(Command::IncrByFloat {
                key: key.to_string(),
                increment,
            })
            .await?;

        float(reply)
    }

    pub async fn mget(&mut self, keys: &[&str]) -> Result<Vec<Option<Bytes>>> {
        self.execute(Command::MGet { keys: owned(keys) })
            .await?
            .into_optional_bytes_list()
    }

    pub async fn mset<V: AsRef<[u8]>>(&mut self, pairs: &[(&str, V)]) -> Result<()> {
        self.execute(Command::MSet {
            pairs: pairs
                .iter()
                .map(|(key, value)| (key.to_string(), bytes(value)))
                .collect(),
        })
        .await?
        .into_ok()
    }

    /// Sets every pair, or none of them if any key already exists.
    pub async fn msetnx<V: AsRef<[u8]>>(&mut self, pairs: &[(&str, V)]) -> Result<bool> {
        self.execute(Command::MSetNx {
            pairs: pairs
                .iter()
                .map(|(key, value)| (key.to_string(), bytes(value)))
                .collect(),
        })
        .await?
        .into_bool()
    }

    pub async fn set(&mut self, key: &str, value: impl AsRef<[u8]>) -> Result<()> {
        self.execute(Command::Set {
            key: key.to_string(),
            value: bytes(value),
        })
        .await?
        .into_ok()
    }

    /// Returns the bit previously stored at `offset`.
    pub async fn setbit(&mut self, key: &str, offset: u64, value: u8) -> Result<u8> {
        let bit = self
            .execute(Command::SetBit {
                key: key.to_string(),
                offset,
                value,
            })
            .await?
            .into_bool()?;

        Ok(u8::from(bit))
    }

    /// `SETEX`, or `PSETEX` when `millis` is set.
    pub async fn setex(
        &mut self,
        key: &str,
        ttl: i64,
        value: impl AsRef<[u8]>,
        millis: bool,
    ) -> Result<()> {
        self.execute(Command::SetEx {
            key: key.to_string(),
            ttl,
            value: bytes(value),
            millis,
        })
        .await?
        .into_ok()
    }

    pub async fn setnx(&mut self, key: &str, value: impl AsRef<[u8]>) -> Result<bool> {
        self.execute(Command::SetNx {
            key: key.to_string(),
            value: bytes(value),
        })
        .await?
        .into_bool()
    }

    pub async fn setrange(
        &mut self,
        key: &str,
        offset: u64,
        value: impl AsRef<[u8]>,
    ) -> Result<i64> {
        self.execute(Command::SetRange {
            key: key.to_string(),
            offset,
            value: bytes(value),
        })
        .await?
        .into_integer()
    }

    pub async fn strlen(&mut self, key: &str) -> Result<i64> {
        self.execute(Command::StrLen {
            key: key.to_string(),
        })
        .await?
        .into_integer()
    }
}
