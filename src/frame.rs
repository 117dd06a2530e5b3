// https://redis.io/docs/reference/protocol-spec

use bytes::Buf;
use bytes::Bytes;
use std::io::Cursor;
use std::str;
use thiserror::Error as ThisError;

use crate::value::Value;

static CRLF: &[u8; 2] = b"\r\n";

#[derive(Debug, ThisError, PartialEq)]
pub enum Error {
    #[error("not enough data is available to parse an entire frame")]
    Incomplete,
    #[error("invalid frame data type: {byte:?}, remaining payload: {remaining:?}")]
    InvalidDataType { byte: char, remaining: String },
    #[error("invalid integer: {0:?}")]
    InvalidInteger(String),
    #[error("invalid length: {0}")]
    InvalidLength(i64),
    #[error("bulk string payload is not followed by CRLF")]
    MissingTerminator,
    #[error("invalid UTF-8 string")]
    InvalidUtf8,
    #[error("frame of {size} bytes exceeds the limit of {limit} bytes")]
    FrameTooLarge { size: usize, limit: usize },
    /// An error reply. Never escapes this crate as a decode error: it is turned into
    /// `crate::Error::Server`.
    #[error("{0}")]
    Server(String),
}

/// Decodes exactly one reply from the start of `bytes`. Anything after the first frame is
/// ignored.
pub fn decode(bytes: &[u8]) -> crate::Result<Value> {
    let mut cursor = Cursor::new(bytes);
    parse(&mut cursor).map_err(crate::Error::from)
}

/// Parses one frame starting at the cursor position, leaving the cursor right after it.
///
/// Error replies are returned as `Error::Server`. When one is nested in an array, the rest of the
/// array is still consumed so the cursor ends on a frame boundary.
///
/// Arrays are filled through an explicit stack rather than by recursion, so the nesting depth is
/// bounded by the input only.
pub fn parse(src: &mut Cursor<&[u8]>) -> Result<Value, Error> {
    // Arrays still waiting for elements, innermost last.
    let mut open: Vec<PartialArray> = Vec::new();

    loop {
        let mut completed = match parse_element(src) {
            Ok(Element::Value(value)) => Ok(value),
            Ok(Element::ArrayHeader(0)) => Ok(Value::Array(Some(vec![]))),
            Ok(Element::ArrayHeader(length)) => {
                open.push(PartialArray::new(length, src.remaining()));
                continue;
            }
            Err(Error::Server(message)) => Err(message),
            Err(err) => return Err(err),
        };

        // Hand the finished element to its parent, closing every array it completes.
        loop {
            let Some(mut parent) = open.pop() else {
                return completed.map_err(Error::Server);
            };

            parent.push(completed);
            if parent.missing > 0 {
                open.push(parent);
                break;
            }
            completed = parent.finish();
        }
    }
}

enum Element {
    Value(Value),
    /// A non-empty array whose elements follow.
    ArrayHeader(usize),
}

struct PartialArray {
    values: Vec<Value>,
    missing: usize,
    server_error: Option<String>,
}

impl PartialArray {
    fn new(length: usize, buffered: usize) -> Self {
        PartialArray {
            // Every element takes at least three bytes, so a declared length larger than what is
            // buffered can't be trusted for the allocation.
            values: Vec::with_capacity(length.min(buffered / 3)),
            missing: length,
            server_error: None,
        }
    }

    fn push(&mut self, element: Result<Value, String>) {
        match element {
            Ok(value) => self.values.push(value),
            Err(message) => {
                self.server_error.get_or_insert(message);
            }
        }
        self.missing -= 1;
    }

    fn finish(self) -> Result<Value, String> {
        match self.server_error {
            Some(message) => Err(message),
            None => Ok(Value::Array(Some(self.values))),
        }
    }
}

/// Parses a scalar frame, or only the header of an array.
fn parse_element(src: &mut Cursor<&[u8]>) -> Result<Element, Error> {
    // The first byte in an RESP-serialized payload always identifies its type.
    // Subsequent bytes constitute the type's contents.
    let first_byte = get_byte(src)?;
    let data_type = DataType::try_from(first_byte).map_err(|byte| {
        let remaining = &src.get_ref()[src.position() as usize..];
        Error::InvalidDataType {
            byte: char::from(byte),
            remaining: String::from_utf8_lossy(remaining).into_owned(),
        }
    })?;

    match data_type {
        // +<data>\r\n
        DataType::SimpleString => {
            let line = get_line(src)?;
            let string = str::from_utf8(line).map_err(|_| Error::InvalidUtf8)?;
            Ok(Element::Value(Value::SimpleString(string.to_string())))
        }
        // -<error>\r\n
        DataType::SimpleError => {
            let line = get_line(src)?;
            Err(Error::Server(String::from_utf8_lossy(line).into_owned()))
        }
        // :[<+|->]<value>\r\n
        DataType::Integer => get_integer(src).map(|i| Element::Value(Value::Integer(i))),
        // $<length>\r\n<data>\r\n
        DataType::BulkString => {
            let length = get_integer(src)?;
            if length == -1 {
                return Ok(Element::Value(Value::BulkString(None)));
            }

            let length = usize::try_from(length).map_err(|_| Error::InvalidLength(length))?;
            let data = get_exact(src, length)?;

            Ok(Element::Value(Value::BulkString(Some(Bytes::copy_from_slice(
                data,
            )))))
        }
        // *<number-of-elements>\r\n<element-1>...<element-n>
        DataType::Array => {
            let length = get_integer(src)?;
            if length == -1 {
                return Ok(Element::Value(Value::Array(None)));
            }

            let length = usize::try_from(length).map_err(|_| Error::InvalidLength(length))?;
            Ok(Element::ArrayHeader(length))
        }
    }
}

/// Reads a line terminated by CRLF. Only used for headers and simple strings, never for
/// length-prefixed payloads.
fn get_line<'a>(src: &mut Cursor<&'a [u8]>) -> Result<&'a [u8], Error> {
    let start = src.position() as usize;
    let end = src.get_ref().len();

    let line_end = src.get_ref()[start..end]
        .windows(2)
        .position(|window| window == CRLF)
        .map(|index| start + index)
        .ok_or(Error::Incomplete)?;

    src.set_position((line_end + CRLF.len()) as u64);

    Ok(&src.get_ref()[start..line_end])
}

/// Reads exactly `length` bytes followed by CRLF.
fn get_exact<'a>(src: &mut Cursor<&'a [u8]>, length: usize) -> Result<&'a [u8], Error> {
    if src.remaining() < length + CRLF.len() {
        return Err(Error::Incomplete);
    }

    let start = src.position() as usize;
    let end = start + length;

    if &src.get_ref()[end..end + CRLF.len()] != CRLF {
        return Err(Error::MissingTerminator);
    }

    src.set_position((end + CRLF.len()) as u64);

    Ok(&src.get_ref()[start..end])
}

fn get_integer(src: &mut Cursor<&[u8]>) -> Result<i64, Error> {
    let line = get_line(src)?;
    let string = str::from_utf8(line).map_err(|_| Error::InvalidUtf8)?;

    string
        .parse::<i64>()
        .map_err(|_| Error::InvalidInteger(string.to_string()))
}

fn get_byte(src: &mut Cursor<&[u8]>) -> Result<u8, Error> {
    if !src.has_remaining() {
        return Err(Error::Incomplete);
    }
    Ok(src.get_u8())
}

/// The RESP2 reply types. RESP3 types are rejected as invalid.
#[derive(Debug)]
enum DataType {
    SimpleString, // '+'
    SimpleError,  // '-'
    Integer,      // ':'
    BulkString,   // '$'
    Array,        // '*'
}

impl TryFrom<u8> for DataType {
    type Error = u8;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            b'+' => Ok(Self::SimpleString),
            b'-' => Ok(Self::SimpleError),
            b':' => Ok(Self::Integer),
            b'$' => Ok(Self::BulkString),
            b'*' => Ok(Self::Array),
            _ => Err(byte),
        }
    }
}

impl From<DataType> for u8 {
    fn from(value: DataType) -> Self {
        match value {
            DataType::SimpleString => b'+',
            DataType::SimpleError => b'-',
            DataType::Integer => b':',
            DataType::BulkString => b'$',
            DataType::Array => b'*',
        }
    }
}
