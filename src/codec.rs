use bytes::{Buf, BytesMut};
use std::io::Cursor;
use tokio_util::codec::{Decoder, Encoder};

use crate::commands::Command;
use crate::frame;
use crate::value::Value;
use crate::Error;

/// Decodes replies and encodes commands.
pub struct ReplyCodec {
    max_frame_size: usize,
}

impl ReplyCodec {
    pub fn new(max_frame_size: usize) -> Self {
        Self { max_frame_size }
    }
}

impl Default for ReplyCodec {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_MAX_FRAME_SIZE)
    }
}

impl Decoder for ReplyCodec {
    type Item = Value;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }

        let mut cursor = Cursor::new(&src[..]);
        let parsed = frame::parse(&mut cursor);
        let position = usize::try_from(cursor.position()).unwrap_or(usize::MAX);

        match parsed {
            Ok(value) => {
                // Remove the parsed frame from the buffer.
                src.advance(position);
                Ok(Some(value))
            }
            // The error reply was consumed in full, the next frame starts right after it.
            Err(frame::Error::Server(message)) => {
                src.advance(position);
                Err(Error::Server(message))
            }
            Err(frame::Error::Incomplete) => {
                // Check if the frame size exceeds a certain limit to prevent unbounded buffering.
                if src.len() > self.max_frame_size {
                    return Err(Error::Decode(frame::Error::FrameTooLarge {
                        size: src.len(),
                        limit: self.max_frame_size,
                    }));
                }

                // Not enough data to parse a frame.
                Ok(None)
            }
            Err(err) => Err(Error::Decode(err)),
        }
    }
}

impl Encoder<&Command> for ReplyCodec {
    type Error = Error;

    fn encode(&mut self, command: &Command, dst: &mut BytesMut) -> Result<(), Self::Error> {
        command.encode_into(dst)
    }
}
