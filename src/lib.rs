pub mod client;
pub mod codec;
pub mod commands;
pub mod config;
pub mod connection;
pub mod encoder;
pub mod frame;
pub mod pubsub;
pub mod transaction;
pub mod value;

use thiserror::Error as ThisError;

pub use client::Client;
pub use commands::Command;
pub use config::Config;
pub use connection::Connection;
pub use frame::decode;
pub use pubsub::{Action, Message, MessageKind, Subscription};
pub use transaction::Transaction;
pub use value::Value;

#[derive(Debug, ThisError)]
pub enum Error {
    /// The reply could not be decoded: unknown type byte, malformed length or integer, missing
    /// terminator, or a frame larger than the configured limit.
    #[error("protocol error; {0}")]
    Decode(frame::Error),
    /// The server answered with an error reply. Carries the server's text verbatim.
    #[error("{0}")]
    Server(String),
    #[error("transport error; {0}")]
    Transport(#[from] std::io::Error),
    #[error("transport error; connection closed by server")]
    ConnectionClosed,
    /// The command invocation does not match the shape the command accepts. Raised before
    /// anything is written, so the connection is unaffected.
    #[error("invalid {command} command; {reason}")]
    Arity {
        command: &'static str,
        reason: String,
    },
    /// A reply decoded fine but does not have the shape the caller asked for.
    #[error("unexpected reply; expected {expected}, got {actual:?}")]
    TypeMismatch {
        expected: &'static str,
        actual: Value,
    },
    #[error("invalid configuration; {0}")]
    Config(String),
}

impl From<frame::Error> for Error {
    fn from(err: frame::Error) -> Error {
        match err {
            frame::Error::Server(message) => Error::Server(message),
            err => Error::Decode(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
