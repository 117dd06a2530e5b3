use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncWrite};

use super::{bytes, owned, Client};
use crate::commands::{Command, SortOptions};
use crate::Result;

impl<S> Client<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Returns the number of keys removed.
    pub async fn del(&mut self, keys: &[&str]) -> Result<i64> {
        self.execute(Command::Del { keys: owned(keys) })
            .await?
            .into_integer()
    }

    /// The serialized value of `key`, as accepted by [`Client::restore`].
    pub async fn dump(&mut self, key: &str) -> Result<Option<Bytes>> {
        self.execute(Command::Dump {
            key: key.to_string(),
        })
        .await?
        .into_bytes()
    }

    /// Returns how many of the given keys exist.
    pub async fn exists(&mut self, keys: &[&str]) -> Result<i64> {
        self.execute(Command::Exists { keys: owned(keys) })
            .await?
            .into_integer()
    }

    /// `EXPIRE`, or `PEXPIRE` when `millis` is set.
    pub async fn expire(&mut self, key: &str, ttl: i64, millis: bool) -> Result<bool> {
        self.execute(Command::Expire {
            key: key.to_string(),
            ttl,
            millis,
        })
        .await?
        .into_bool()
    }

    /// `EXPIREAT`, or `PEXPIREAT` when `millis` is set.
    pub async fn expireat(&mut self, key: &str, timestamp: i64, millis: bool) -> Result<bool> {
        self.execute(Command::ExpireAt {
            key: key.to_string(),
            timestamp,
            millis,
        })
        .await?
        .into_bool()
    }

    pub async fn keys(&mut self, pattern: &str) -> Result<Vec<String>> {
        self.execute(Command::Keys {
            pattern: pattern.to_string(),
        })
        .await?
        .into_string_list()
    }

    pub async fn move_key(&mut self, key: &str, db: i64) -> Result<bool> {
        self.execute(Command::Move {
            key: key.to_string(),
            db,
        })
        .await?
        .into_bool()
    }

    pub async fn persist(&mut self, key: &str) -> Result<bool> {
        self.execute(Command::Persist {
            key: key.to_string(),
        })
        .await?
        .into_bool()
    }

    pub async fn randomkey(&mut self) -> Result<Option<String>> {
        self.execute(Command::RandomKey).await?.into_string()
    }

    pub async fn rename(&mut self, key: &str, new_key: &str) -> Result<()> {
        self.execute(Command::Rename {
            key: key.to_string(),
            new_key: new_key.to_string(),
        })
        .await?
        .into_ok()
    }

    pub async fn renamenx(&mut self, key: &str, new_key: &str) -> Result<bool> {
        self.execute(Command::RenameNx {
            key: key.to_string(),
            new_key: new_key.to_string(),
        })
        .await?
        .into_bool()
    }

    /// Recreates a key from a [`Client::dump`] payload. A `ttl` of 0 means no expiry.
    pub async fn restore(
        &mut self,
        key: &str,
        ttl: i64,
        serialized: impl AsRef<[u8]>,
        replace: bool,
    ) -> Result<()> {
        self.execute(Command::Restore {
            key: key.to_string(),
            ttl,
            serialized: bytes(serialized),
            replace,
        })
        .await?
        .into_ok()
    }

    pub async fn sort(&mut self, key: &str, options: SortOptions) -> Result<Vec<Bytes>> {
        self.execute(Command::Sort {
            key: key.to_string(),
            options,
            store: None,
        })
        .await?
        .into_bytes_list()
    }

    /// Stores the sorted elements at `destination` and returns how many there are.
    pub async fn sort_store(
        &mut self,
        key: &str,
        options: SortOptions,
        destination: &str,
    ) -> Result<i64> {
        self.execute(Command::Sort {
            key: key.to_string(),
            options,
            store: Some(destination.to_string()),
        })
        .await?
        .into_integer()
    }

    /// `TTL`, or `PTTL` when `millis` is set. Negative values mean no expiry (-1) or no key (-2).
    pub async fn ttl(&mut self, key: &str, millis: bool) -> Result<i64> {
        self.execute(Command::Ttl {
            key: key.to_string(),
            millis,
        })
        .await?
        .into_integer()
    }

    pub async fn key_type(&mut self, key: &str) -> Result<String> {
        self.execute(Command::Type {
            key: key.to_string(),
        })
        .await?
        .into_status()
    }
}
