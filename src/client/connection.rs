use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncWrite};

use super::{bytes, Client};
use crate::commands::Command;
use crate::Result;

impl<S> Client<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub async fn auth(&mut self, password: impl AsRef<[u8]>) -> Result<()> {
        self.execute(Command::Auth {
            password: bytes(password),
        })
        .await?
        .into_ok()
    }

    pub async fn echo(&mut self, message: impl AsRef<[u8]>) -> Result<Bytes> {
        let reply = self
            .execute(Command::Echo {
                message: bytes(message),
            })
            .await?
            .into_bytes()?;

        Ok(reply.unwrap_or_default())
    }

    pub async fn ping(&mut self) -> Result<String> {
        self.execute(Command::Ping).await?.into_status()
    }

    pub async fn select(&mut self, index: i64) -> Result<()> {
        self.execute(Command::Select { index }).await?.into_ok()
    }

    /// Returns the number of subscribers that received the message.
    pub async fn publish(&mut self, channel: &str, message: impl AsRef<[u8]>) -> Result<i64> {
        self.execute(Command::Publish {
            channel: channel.to_string(),
            message: bytes(message),
        })
        .await?
        .into_integer()
    }
}
