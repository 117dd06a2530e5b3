use std::fmt;
use std::str;

use bytes::Bytes;
use itertools::Itertools;

use crate::{Error, Result};

/// A decoded reply.
///
/// Error replies are never represented here; they surface as `Error::Server`.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Integer(i64),
    SimpleString(String),
    /// `None` is the nil bulk string (`$-1`).
    BulkString(Option<Bytes>),
    /// `None` is the nil array (`*-1`).
    Array(Option<Vec<Value>>),
}

fn mismatch<T>(expected: &'static str, actual: Value) -> Result<T> {
    Err(Error::TypeMismatch { expected, actual })
}

impl Value {
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::BulkString(None) | Value::Array(None))
    }

    pub fn into_integer(self) -> Result<i64> {
        match self {
            Value::Integer(i) => Ok(i),
            value => mismatch("integer", value),
        }
    }

    /// Integer replies such as ZRANK, which answer nil when there is nothing to report.
    pub fn into_optional_integer(self) -> Result<Option<i64>> {
        match self {
            Value::Integer(i) => Ok(Some(i)),
            Value::BulkString(None) => Ok(None),
            value => mismatch("integer or nil", value),
        }
    }

    /// Integer replies used as flags: `:1` is true, `:0` is false.
    pub fn into_bool(self) -> Result<bool> {
        match self {
            Value::Integer(i) => Ok(i != 0),
            value => mismatch("integer", value),
        }
    }

    pub fn into_ok(self) -> Result<()> {
        match self {
            Value::SimpleString(s) if s == "OK" => Ok(()),
            value => mismatch("OK", value),
        }
    }

    pub fn into_status(self) -> Result<String> {
        match self {
            Value::SimpleString(s) => Ok(s),
            value => mismatch("simple string", value),
        }
    }

    pub fn into_bytes(self) -> Result<Option<Bytes>> {
        match self {
            Value::BulkString(bytes) => Ok(bytes),
            value => mismatch("bulk string", value),
        }
    }

    /// A bulk or simple string decoded as UTF-8.
    pub fn into_string(self) -> Result<Option<String>> {
        match self {
            Value::SimpleString(s) => Ok(Some(s)),
            Value::BulkString(None) => Ok(None),
            Value::BulkString(Some(bytes)) => match str::from_utf8(&bytes) {
                Ok(s) => Ok(Some(s.to_string())),
                Err(_) => mismatch("UTF-8 bulk string", Value::BulkString(Some(bytes))),
            },
            value => mismatch("bulk string", value),
        }
    }

    /// Redis sends floating point results (INCRBYFLOAT, ZSCORE, ...) as bulk strings.
    pub fn into_float(self) -> Result<Option<f64>> {
        match self {
            Value::BulkString(None) => Ok(None),
            Value::BulkString(Some(bytes)) => match parse_float(&bytes) {
                Some(f) => Ok(Some(f)),
                None => mismatch("float", Value::BulkString(Some(bytes))),
            },
            value => mismatch("float", value),
        }
    }

    pub fn into_array(self) -> Result<Option<Vec<Value>>> {
        match self {
            Value::Array(values) => Ok(values),
            value => mismatch("array", value),
        }
    }

    /// A non-nil array.
    pub fn into_vec(self) -> Result<Vec<Value>> {
        match self {
            Value::Array(Some(values)) => Ok(values),
            value => mismatch("array", value),
        }
    }

    /// An array of non-nil bulk strings, as returned by LRANGE, SMEMBERS, HVALS...
    pub fn into_bytes_list(self) -> Result<Vec<Bytes>> {
        self.into_vec()?
            .into_iter()
            .map(|value| match value {
                Value::BulkString(Some(bytes)) => Ok(bytes),
                value => mismatch("bulk string", value),
            })
            .collect()
    }

    /// An array of possibly nil bulk strings, as returned by MGET and HMGET.
    pub fn into_optional_bytes_list(self) -> Result<Vec<Option<Bytes>>> {
        self.into_vec()?
            .into_iter()
            .map(Value::into_bytes)
            .collect()
    }

    pub fn into_string_list(self) -> Result<Vec<String>> {
        self.into_vec()?
            .into_iter()
            .map(|value| match value.into_string()? {
                Some(s) => Ok(s),
                None => mismatch("string", Value::BulkString(None)),
            })
            .collect()
    }

    /// A flat array of alternating elements, as returned by HGETALL or ZRANGE WITHSCORES.
    pub fn into_pairs(self) -> Result<Vec<(Value, Value)>> {
        let values = self.into_vec()?;
        if values.len() % 2 != 0 {
            return mismatch("array of pairs", Value::Array(Some(values)));
        }

        Ok(values.into_iter().tuples().collect())
    }
}

fn parse_float(bytes: &[u8]) -> Option<f64> {
    let s = str::from_utf8(bytes).ok()?;
    match s {
        "inf" | "+inf" => Some(f64::INFINITY),
        "-inf" => Some(f64::NEG_INFINITY),
        s => s.parse().ok(),
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<&'static str> for Value {
    fn from(s: &'static str) -> Self {
        Value::BulkString(Some(Bytes::from(s)))
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Value::Array(Some(values))
    }
}

// Rendered the way redis-cli prints replies.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "(integer) {}", i),
            Value::SimpleString(s) => write!(f, "{}", s),
            Value::BulkString(Some(bytes)) => write!(f, "{:?}", String::from_utf8_lossy(bytes)),
            Value::BulkString(None) | Value::Array(None) => write!(f, "(nil)"),
            Value::Array(Some(values)) if values.is_empty() => write!(f, "(empty array)"),
            Value::Array(Some(values)) => write!(
                f,
                "{}",
                values
                    .iter()
                    .enumerate()
                    .format_with("\n", |(i, value), f| f(&format_args!("{}) {}", i + 1, value)))
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrow_integer() {
        assert_eq!(Value::Integer(3).into_integer().unwrap(), 3);
        assert!(Value::Integer(1).into_bool().unwrap());
        assert!(!Value::Integer(0).into_bool().unwrap());
    }

    #[test]
    fn narrow_integer_mismatch() {
        let res = Value::from("10").into_integer();

        assert!(matches!(
            res,
            Err(Error::TypeMismatch { expected: "integer", actual }) if actual == Value::from("10")
        ));
    }

    #[test]
    fn narrow_optional_integer() {
        assert_eq!(Value::Integer(2).into_optional_integer().unwrap(), Some(2));
        assert_eq!(
            Value::BulkString(None).into_optional_integer().unwrap(),
            None
        );
    }

    #[test]
    fn narrow_ok() {
        assert!(Value::SimpleString("OK".to_string()).into_ok().is_ok());
        assert!(Value::SimpleString("QUEUED".to_string()).into_ok().is_err());
    }

    #[test]
    fn narrow_string() {
        assert_eq!(
            Value::from("foo").into_string().unwrap(),
            Some("foo".to_string())
        );
        assert_eq!(Value::BulkString(None).into_string().unwrap(), None);

        let invalid = Value::BulkString(Some(Bytes::from_static(b"\xff")));
        assert!(invalid.into_string().is_err());
    }

    #[test]
    fn narrow_float() {
        assert_eq!(Value::from("10.5").into_float().unwrap(), Some(10.5));
        assert_eq!(
            Value::from("-inf").into_float().unwrap(),
            Some(f64::NEG_INFINITY)
        );
        assert!(Value::from("abc").into_float().is_err());
    }

    #[test]
    fn narrow_lists() {
        let value = Value::from(vec![Value::from("a"), Value::BulkString(None)]);
        assert_eq!(
            value.clone().into_optional_bytes_list().unwrap(),
            vec![Some(Bytes::from("a")), None]
        );
        assert!(value.into_bytes_list().is_err());

        assert!(Value::Array(None).into_vec().is_err());
        assert_eq!(Value::Array(None).into_array().unwrap(), None);
    }

    #[test]
    fn narrow_pairs() {
        let value = Value::from(vec![
            Value::from("f1"),
            Value::from("v1"),
            Value::from("f2"),
            Value::from("v2"),
        ]);

        let pairs = value.into_pairs().unwrap();

        assert_eq!(
            pairs,
            vec![
                (Value::from("f1"), Value::from("v1")),
                (Value::from("f2"), Value::from("v2"))
            ]
        );

        let odd = Value::from(vec![Value::from("f1")]);
        assert!(odd.into_pairs().is_err());
    }

    #[test]
    fn display_like_redis_cli() {
        assert_eq!(Value::Integer(5).to_string(), "(integer) 5");
        assert_eq!(Value::SimpleString("OK".to_string()).to_string(), "OK");
        assert_eq!(Value::from("bar").to_string(), "\"bar\"");
        assert_eq!(Value::BulkString(None).to_string(), "(nil)");
        assert_eq!(Value::Array(Some(vec![])).to_string(), "(empty array)");
        assert_eq!(
            Value::from(vec![Value::from("a"), Value::Integer(1)]).to_string(),
            "1) \"a\"\n2) (integer) 1"
        );
    }
}
