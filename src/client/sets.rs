use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncWrite};

use super::{bytes, bytes_list, owned, Client};
use crate::commands::Command;
use crate::Result;

impl<S> Client<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Returns the number of members that were not already present.
    pub async fn sadd<V: AsRef<[u8]>>(&mut self, key: &str, members: &[V]) -> Result<i64> {
        self.execute(Command::SAdd {
            key: key.to_string(),
            members: bytes_list(members),
        })
        .await?
        .into_integer()
    }

    pub async fn scard(&mut self, key: &str) -> Result<i64> {
        self.execute(Command::SCard {
            key: key.to_string(),
        })
        .await?
        .into_integer()
    }

    pub async fn sdiff(&mut self, keys: &[&str]) -> Result<Vec<Bytes>> {
        self.execute(Command::SDiff { keys: owned(keys) })
            .await?
            .into_bytes_list()
    }

    pub async fn sdiffstore(&mut self, destination: &str, keys: &[&str]) -> Result<i64> {
        self.execute(Command::SDiffStore {
            destination: destination.to_string(),
            keys: owned(keys),
        })
        .await?
        .into_integer()
    }

    pub async fn sinter(&mut self, keys: &[&str]) -> Result<Vec<Bytes>> {
        self.execute(Command::SInter { keys: owned(keys) })
            .await?
            .into_bytes_list()
    }

    pub async fn sinterstore(&mut self, destination: &str, keys: &[&str]) -> Result<i64> {
        self.execute(Command::SInterStore {
            destination: destination.to_string(),
            keys: owned(keys),
        })
        .await?
        .into_integer()
    }

    pub async fn sismember(&mut self, key: &str, member: impl AsRef<[u8]>) -> Result<bool> {
        self.execute(Command::SIsMember {
            key: key.to_string(),
            member: bytes(member),
        })
        .await?
        .into_bool()
    }

    pub async fn smembers(&mut self, key: &str) -> Result<Vec<Bytes>> {
        self.execute(Command::SMembers {
            key: key.to_string(),
        })
        .await?
        .into_bytes_list()
    }

    pub async fn smove(
        &mut self,
        source: &str,
        destination: &str,
        member: impl AsRef<[u8]>,
    ) -> Result<bool> {
        self.execute(Command::SMove {
            source: source.to_string(),
            destination: destination.to_string(),
            member: bytes(member),
        })
        .await?
        .into_bool()
    }

    pub async fn spop(&mut self, key: &str) -> Result<Option<Bytes>> {
        self.execute(Command::SPop {
            key: key.to_string(),
        })
        .await?
        .into_bytes()
    }

    pub async fn srandmember(&mut self, key: &str) -> Result<Option<Bytes>> {
        self.execute(Command::SRandMember {
            key: key.to_string(),
            count: None,
        })
        .await?
        .into_bytes()
    }

    /// A negative `count` allows the same member to be returned several times.
    pub async fn srandmember_count(&mut self, key: &str, count: i64) -> Result<Vec<Bytes>> {
        self.execute(Command::SRandMember {
            key: key.to_string(),
            count: Some(count),
        })
        .await?
        .into_bytes_list()
    }

    pub async fn srem<V: AsRef<[u8]>>(&mut self, key: &str, members: &[V]) -> Result<i64> {
        self.execute(Command::SRem {
            key: key.to_string(),
            members: bytes_list(members),
        })
        .await?
        .into_integer()
    }

    pub async fn sunion(&mut self, keys: &[&str]) -> Result<Vec<Bytes>> {
        self.execute(Command::SUnion { keys: owned(keys) })
            .await?
            .into_bytes_list()
    }

    pub async fn sunionstore(&mut self, destination: &str, keys: &[&str]) -> Result<i64> {
        self.execute(Command::SUnionStore {
            destination: destination.to_string(),
            keys: owned(keys),
        })
        .await?
        .into_integer()
    }
}
