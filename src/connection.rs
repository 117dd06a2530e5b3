use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufWriter};
use tokio::net::TcpStream;
use tokio_util::codec::{Decoder, Encoder};
use tracing::{info, instrument, trace, warn};
use uuid::Uuid;

use crate::codec::ReplyCodec;
use crate::commands::Command;
use crate::config::Config;
use crate::value::Value;
use crate::{Error, Result};

/// One ordered byte stream to the server.
///
/// Replies are read in the order commands were written. Several frames delivered in one read stay
/// buffered until asked for, and a frame split across reads is only decoded once complete.
pub struct Connection<S = TcpStream> {
    pub id: Uuid,
    stream: BufWriter<S>,
    // Data is read from the socket into the read buffer. When a frame is parsed, the corresponding
    // data is removed from the buffer.
    buffer: BytesMut,
    codec: ReplyCodec,
    read_buffer_size: usize,
}

impl Connection<TcpStream> {
    #[instrument(name = "connect", skip(config), fields(host = %config.host, port = config.port))]
    pub async fn open(config: &Config) -> Result<Self> {
        let stream = TcpStream::connect((config.host.as_str(), config.port)).await?;
        stream.set_nodelay(true)?;

        let conn = Connection::with_config(stream, config);
        info!(connection_id = %conn.id, "Connected");

        Ok(conn)
    }
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S) -> Connection<S> {
        Connection::with_config(stream, &Config::default())
    }

    pub fn with_config(stream: S, config: &Config) -> Connection<S> {
        Connection {
            id: Uuid::new_v4(),
            stream: BufWriter::new(stream),
            buffer: BytesMut::with_capacity(config.read_buffer_size),
            codec: ReplyCodec::new(config.max_frame_size),
            read_buffer_size: config.read_buffer_size.max(1),
        }
    }

    pub async fn send(&mut self, bytes: &[u8]) -> Result<()> {
        self.stream.write_all(bytes).await?;
        self.stream.flush().await?;
        Ok(())
    }

    /// Encodes and sends one command. Nothing is written if the command fails validation.
    pub async fn write_command(&mut self, command: &Command) -> Result<()> {
        let mut dst = BytesMut::new();
        self.codec.encode(command, &mut dst)?;

        trace!(line = ?String::from_utf8_lossy(&dst), "Sending command");

        self.send(&dst).await
    }

    /// Waits for the next complete reply.
    pub async fn read_value(&mut self) -> Result<Value> {
        loop {
            match self.codec.decode(&mut self.buffer) {
                Ok(Some(value)) => return Ok(value),
                Ok(None) => {}
                Err(Error::Decode(err)) => {
                    // There is no way to find the next frame boundary after a malformed frame.
                    warn!(connection_id = %self.id, "Discarding read buffer: {}", err);
                    self.buffer.clear();
                    return Err(Error::Decode(err));
                }
                Err(err) => return Err(err),
            }

            self.buffer.reserve(self.read_buffer_size);
            if self.stream.read_buf(&mut self.buffer).await? == 0 {
                return Err(Error::ConnectionClosed);
            }
        }
    }

    pub async fn close(mut self) -> Result<()> {
        self.stream.shutdown().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use tokio_test::io::Builder;

    #[tokio::test]
    async fn read_value_across_partial_reads() {
        let mock = Builder::new()
            .read(b"*2\r\n$3\r\nfo")
            .read(b"o\r\n$3\r\nbar\r\n")
            .build();
        let mut conn = Connection::new(mock);

        let value = conn.read_value().await.unwrap();

        assert_eq!(
            value,
            Value::Array(Some(vec![
                Value::BulkString(Some(Bytes::from("foo"))),
                Value::BulkString(Some(Bytes::from("bar"))),
            ]))
        );
    }

    #[tokio::test]
    async fn read_value_keeps_extra_frames_buffered() {
        let mock = Builder::new().read(b"+OK\r\n:7\r\n").build();
        let mut conn = Connection::new(mock);

        assert_eq!(
            conn.read_value().await.unwrap(),
            Value::SimpleString("OK".to_string())
        );
        assert_eq!(conn.read_value().await.unwrap(), Value::Integer(7));
    }

    #[tokio::test]
    async fn read_value_on_closed_stream() {
        let mock = Builder::new().read(b"$5\r\nhe").build();
        let mut conn = Connection::new(mock);

        let res = conn.read_value().await;

        assert!(matches!(res, Err(Error::ConnectionClosed)));
    }

    #[tokio::test]
    async fn write_command_sends_inline_line() {
        let mock = Builder::new().write(b"SET key \"a b c\"\r\n").build();
        let mut conn = Connection::new(mock);

        let cmd = Command::Set {
            key: String::from("key"),
            value: Bytes::from("a b c"),
        };
        conn.write_command(&cmd).await.unwrap();
    }

    #[tokio::test]
    async fn write_command_rejects_invalid_commands_before_writing() {
        let mock = Builder::new().build();
        let mut conn = Connection::new(mock);

        let res = conn.write_command(&Command::Del { keys: vec![] }).await;

        assert!(matches!(res, Err(Error::Arity { command: "DEL", .. })));
    }
}
