use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncWrite};

use super::{bytes, float, owned, Client};
use crate::commands::Command;
use crate::Result;

impl<S> Client<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub async fn hdel(&mut self, key: &str, fields: &[&str]) -> Result<i64> {
        self.execute(Command::HDel {
            key: key.to_string(),
            fields: owned(fields),
        })
        .await?
        .into_integer()
    }

    pub async fn hexists(&mut self, key: &str, field: &str) -> Result<bool> {
        self.execute(Command::HExists {
            key: key.to_string(),
            field: field.to_string(),
        })
        .await?
        .into_bool()
    }

    pub async fn hget(&mut self, key: &str, field: &str) -> Result<Option<Bytes>> {
        self.execute(Command::HGet {
            key: key.to_string(),
            field: field.to_string(),
        })
        .await?
        .into_bytes()
    }

    /// Field/value pairs in the order the server returned them.
    pub async fn hgetall(&mut self, key: &str) -> Result<Vec<(String, Bytes)>> {
        self.execute(Command::HGetAll {
            key: key.to_string(),
        })
        .await?
        .into_pairs()?
        .into_iter()
        .map(|(field, value)| {
            Ok((
                field.into_string()?.unwrap_or_default(),
                value.into_bytes()?.unwrap_or_default(),
            ))
        })
        .collect()
    }

    pub async fn hincrby(&mut self, key: &str, field: &str, increment: i64) -> Result<i64> {
        self.execute(Command::HIncrBy {
            key: key.to_string(),
            field: field.to_string(),
            increment,
        })
        .await?
        .into_integer()
    }

    pub async fn hincrbyfloat(&mut self, key: &str, field: &str, increment: f64) -> Result<f64> {
        let reply = self
            .execute(Command::HIncrByFloat {
                key: key.to_string(),
                field: field.to_string(),
                increment,
            })
            .await?;

        float(reply)
    }

    pub async fn hkeys(&mut self, key: &str) -> Result<Vec<String>> {
        self.execute(Command::HKeys {
            key: key.to_string(),
        })
        .await?
        .into_string_list()
    }

    pub async fn hlen(&mut self, key: &str) -> Result<i64> {
        self.execute(Command::HLen {
            key: key.to_string(),
        })
        .await?
        .into_integer()
    }

    pub async fn hmget(&mut self, key: &str, fields: &[&str]) -> Result<Vec<Option<Bytes>>> {
        self.execute(Command::HMGet {
            key: key.to_string(),
            fields: owned(fields),
        })
        .await?
        .into_optional_bytes_list()
    }

    pub async fn hmset<V: AsRef<[u8]>>(&mut self, key: &str, pairs: &[(&str, V)]) -> Result<()> {
        self.execute(Command::HMSet {
            key: key.to_string(),
            pairs: pairs
                .iter()
                .map(|(field, value)| (field.to_string(), bytes(value)))
                .collect(),
        })
        .await?
        .into_ok()
    }

    /// Returns true when the field is new, false when an existing value was overwritten.
    pub async fn hset(&mut self, key: &str, field: &str, value: impl AsRef<[u8]>) -> Result<bool> {
        self.execute(Command::HSet {
            key: key.to_string(),
            field: field.to_string(),
            value: bytes(value),
        })
        .await?
        .into_bool()
    }

    pub async fn hsetnx(
        &mut self,
        key: &str,
        field: &str,
        value: impl AsRef<[u8]>,
    ) -> Result<bool> {
        self.execute(Command::HSetNx {
            key: key.to_string(),
            field: field.to_string(),
            value: bytes(value),
        })
        .await?
        .into_bool()
    }

    pub async fn hstrlen(&mut self, key: &str, field: &str) -> Result<i64> {
        self.execute(Command::HStrLen {
            key: key.to_string(),
            field: field.to_string(),
        })
        .await?
        .into_integer()
    }

    pub async fn hvals(&mut self, key: &str) -> Result<Vec<Bytes>> {
        self.execute(Command::HVals {
            key: key.to_string(),
        })
        .await?
        .into_bytes_list()
    }
}

#[cfg(test)]
mod tests {
    use crate::client::tests::client;
    use bytes::Bytes;
    use tokio_test::io::Builder;

    #[tokio::test]
    async fn hmset_and_hgetall() {
        let mock = Builder::new()
            .write(b"HMSET h f1 \"one\" f2 \"two words\"\r\n")
            .read(b"+OK\r\n")
            .write(b"HGETALL h\r\n")
            .read(b"*4\r\n$2\r\nf1\r\n$3\r\none\r\n$2\r\nf2\r\n$9\r\ntwo words\r\n")
            .build();
        let mut client = client(mock);

        client
            .hmset("h", &[("f1", "one"), ("f2", "two words")])
            .await
            .unwrap();

        assert_eq!(
            client.hgetall("h").await.unwrap(),
            vec![
                (String::from("f1"), Bytes::from("one")),
                (String::from("f2"), Bytes::from("two words")),
            ]
        );
    }

    #[tokio::test]
    async fn hincrbyfloat() {
        let mock = Builder::new()
            .write(b"HINCRBYFLOAT h f -1.5\r\n")
            .read(b"$3\r\n8.5\r\n")
            .build();
        let mut client = client(mock);

        assert_eq!(client.hincrbyfloat("h", "f", -1.5).await.unwrap(), 8.5);
    }

    #[tokio::test]
    async fn hget_missing_field() {
        let mock = Builder::new()
            .write(b"HGET h nope\r\n")
            .read(b"$-1\r\n")
            .build();
        let mut client = client(mock);

        assert_eq!(client.hget("h", "nope").await.unwrap(), None);
    }
}
