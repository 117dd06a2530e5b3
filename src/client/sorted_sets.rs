use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncWrite};

use super::{bytes, bytes_list, float, owned, scored, Client};
use crate::commands::{Aggregate, Command, Limit};
use crate::Result;

// Score bounds accept `-inf`, `+inf` and exclusive `(` prefixes; lex bounds use `[`, `(`, `-`
// and `+`. Both are sent through untouched.
impl<S> Client<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Returns the number of members added, not counting score updates.
    pub async fn zadd<V: AsRef<[u8]>>(&mut self, key: &str, members: &[(f64, V)]) -> Result<i64> {
        self.execute(Command::ZAdd {
            key: key.to_string(),
            members: members
                .iter()
                .map(|(score, member)| (*score, bytes(member)))
                .collect(),
        })
        .await?
        .into_integer()
    }

    pub async fn zcard(&mut self, key: &str) -> Result<i64> {
        self.execute(Command::ZCard {
            key: key.to_string(),
        })
        .await?
        .into_integer()
    }

    pub async fn zcount(&mut self, key: &str, min: &str, max: &str) -> Result<i64> {
        self.execute(Command::ZCount {
            key: key.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        })
        .await?
        .into_integer()
    }

    /// Returns the new score.
    pub async fn zincrby(
        &mut self,
        key: &str,
        increment: f64,
        member: impl AsRef<[u8]>,
    ) -> Result<f64> {
        let reply = self
            .execute(Command::ZIncrBy {
                key: key.to_string(),
                increment,
                member: bytes(member),
            })
            .await?;

        float(reply)
    }

    pub async fn zinterstore(
        &mut self,
        destination: &str,
        keys: &[&str],
        weights: Option<&[f64]>,
        aggregate: Option<Aggregate>,
    ) -> Result<i64> {
        self.execute(Command::ZInterStore {
            destination: destination.to_string(),
            keys: owned(keys),
            weights: weights.map(<[f64]>::to_vec),
            aggregate,
        })
        .await?
        .into_integer()
    }

    pub async fn zlexcount(&mut self, key: &str, min: &str, max: &str) -> Result<i64> {
        self.execute(Command::ZLexCount {
            key: key.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        })
        .await?
        .into_integer()
    }

    pub async fn zrange(&mut self, key: &str, start: i64, stop: i64) -> Result<Vec<Bytes>> {
        self.execute(Command::ZRange {
            key: key.to_string(),
            start,
            stop,
            with_scores: false,
        })
        .await?
        .into_bytes_list()
    }

    pub async fn zrange_with_scores(
        &mut self,
        key: &str,
        start: i64,
        stop: i64,
    ) -> Result<Vec<(Bytes, f64)>> {
        let reply = self
            .execute(Command::ZRange {
                key: key.to_string(),
                start,
                stop,
                with_scores: true,
            })
            .await?;

        scored(reply)
    }

    pub async fn zrangebylex(
        &mut self,
        key: &str,
        min: &str,
        max: &str,
        limit: Option<Limit>,
    ) -> Result<Vec<Bytes>> {
        self.execute(Command::ZRangeByLex {
            key: key.to_string(),
            min: min.to_string(),
            max: max.to_string(),
            limit,
        })
        .await?
        .into_bytes_list()
    }

    pub async fn zrangebyscore(
        &mut self,
        key: &str,
        min: &str,
        max: &str,
        limit: Option<Limit>,
    ) -> Result<Vec<Bytes>> {
        self.execute(Command::ZRangeByScore {
            key: key.to_string(),
            min: min.to_string(),
            max: max.to_string(),
            with_scores: false,
            limit,
        })
        .await?
        .into_bytes_list()
    }

    pub async fn zrangebyscore_with_scores(
        &mut self,
        key: &str,
        min: &str,
        max: &str,
        limit: Option<Limit>,
    ) -> Result<Vec<(Bytes, f64)>> {
        let reply = self
            .execute(Command::ZRangeByScore {
                key: key.to_string(),
                min: min.to_string(),
                max: max.to_string(),
                with_scores: true,
                limit,
            })
            .await?;

        scored(reply)
    }

    pub async fn zrank(&mut self, key: &str, member: impl AsRef<[u8]>) -> Result<Option<i64>> {
        self.execute(Command::ZRank {
            key: key.to_string(),
            member: bytes(member),
        })
        .await?
        .into_optional_integer()
    }

    pub async fn zrem<V: AsRef<[u8]>>(&mut self, key: &str, members: &[V]) -> Result<i64> {
        self.execute(Command::ZRem {
            key: key.to_string(),
            members: bytes_list(members),
        })
        .await?
        .into_integer()
    }

    pub async fn zremrangebylex(&mut self, key: &str, min: &str, max: &str) -> Result<i64> {
        self.execute(Command::ZRemRangeByLex {
            key: key.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        })
        .await?
        .into_integer()
    }

    pub async fn zremrangebyrank(&mut self, key: &str, start: i64, stop: i64) -> Result<i64> {
        self.execute(Command::ZRemRangeByRank {
            key: key.to_string(),
            start,
            stop,
        })
        .await?
        .into_integer()
    }

    pub async fn zremrangebyscore(&mut self, key: &str, min: &str, max: &str) -> Result<i64> {
        self.execute(Command::ZRemRangeByScore {
            key: key.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        })
        .await?
        .into_integer()
    }

    pub async fn zrevrange(&mut self, key: &str, start: i64, stop: i64) -> Result<Vec<Bytes>> {
        self.execute(Command::ZRevRange {
            key: key.to_string(),
            start,
            stop,
            with_scores: false,
        })
        .await?
        .into_bytes_list()
    }

    pub async fn zrevrange_with_scores(
        &mut self,
        key: &str,
        start: i64,
        stop: i64,
    ) -> Result<Vec<(Bytes, f64)>> {
        let reply = self
            .execute(Command::ZRevRange {
                key: key.to_string(),
                start,
                stop,
                with_scores: true,
            })
            .await?;

        scored(reply)
    }

    /// Note the bound order: `max` comes first.
    pub async fn zrevrangebylex(
        &mut self,
        key: &str,
        max: &str,
        min: &str,
        limit: Option<Limit>,
    ) -> Result<Vec<Bytes>> {
        self.execute(Command::ZRevRangeByLex {
            key: key.to_string(),
            max: max.to_string(),
            min: min.to_string(),
            limit,
        })
        .await?
        .into_bytes_list()
    }

    pub async fn zrevrangebyscore(
        &mut self,
        key: &str,
        max: &str,
        min: &str,
        limit: Option<Limit>,
    ) -> Result<Vec<Bytes>> {
        self.execute(Command::ZRevRangeByScore {
            key: key.to_string(),
            max: max.to_string(),
            min: min.to_string(),
            with_scores: false,
            limit,
        })
        .await?
        .into_bytes_list()
    }

    pub async fn zrevrangebyscore_with_scores(
        &mut self,
        key: &str,
        max: &str,
        min: &str,
        limit: Option<Limit>,
    ) -> Result<Vec<(Bytes, f64)>> {
        let reply = self
            .execute(Command::ZRevRangeByScore {
                key: key.to_string(),
                max: max.to_string(),
                min: min.to_string(),
                with_scores: true,
                limit,
            })
            .await?;

        scored(reply)
    }

    pub async fn zrevrank(&mut self, key: &str, member: impl AsRef<[u8]>) -> Result<Option<i64>> {
        self.execute(Command::ZRevRank {
            key: key.to_string(),
            member: bytes(member),
        })
        .await?
        .into_optional_integer()
    }

    pub async fn zscore(&mut self, key: &str, member: impl AsRef<[u8]>) -> Result<Option<f64>> {
        self.execute(Command::ZScore {
            key: key.to_string(),
            member: bytes(member),
        })
        .await?
        .into_float()
    }

    pub async fn zunionstore(
        &mut self,
        destination: &str,
        keys: &[&str],
        weights: Option<&[f64]>,
        aggregate: Option<Aggregate>,
    ) -> Result<i64> {
        self.execute(Command::ZUnionStore {
            destination: destination.to_string(),
            keys: owned(keys),
            weights: weights.map(<[f64]>::to_vec),
            aggregate,
        })
        .await?
        .into_integer()
    }
}
