//! Inline command encoding.
//!
//! Commands are sent as a single line of space separated tokens terminated by CRLF. Free-form
//! values are always wrapped in double quotes, with the escapes Redis understands inside quoted
//! inline arguments, so they reach the server as exactly one argument. Keys, field names, channels,
//! range bounds and numbers are written verbatim and therefore must be bare tokens.

use bytes::{BufMut, Bytes, BytesMut};

static CRLF: &[u8; 2] = b"\r\n";

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Arg<'a> {
    /// Keys, field names, channels, patterns and range bounds.
    Key(&'a str),
    /// Free-form payload, always quoted.
    Value(&'a [u8]),
    Int(i64),
    Float(f64),
    /// A literal keyword such as `WITHSCORES` or `LIMIT`.
    Token(&'static str),
}

/// Renders `name` followed by its arguments as one inline command line.
pub fn encode(name: &str, args: &[Arg<'_>]) -> Bytes {
    let mut dst = BytesMut::with_capacity(name.len() + args.len() * 8 + CRLF.len());
    encode_into(name, args, &mut dst);
    dst.freeze()
}

pub fn encode_into(name: &str, args: &[Arg<'_>], dst: &mut BytesMut) {
    dst.extend_from_slice(name.as_bytes());
    for arg in args {
        dst.put_u8(b' ');
        write_arg(arg, dst);
    }
    dst.extend_from_slice(CRLF);
}

/// Writes a raw command line untouched, adding the terminator.
pub fn encode_raw_into(line: &str, dst: &mut BytesMut) {
    dst.extend_from_slice(line.trim_end_matches(['\r', '\n']).as_bytes());
    dst.extend_from_slice(CRLF);
}

/// Whether `token` can be sent unquoted and still arrive as a single argument.
pub fn is_bare(token: &str) -> bool {
    !token.is_empty()
        && !token
            .bytes()
            .any(|b| b.is_ascii_whitespace() || b.is_ascii_control() || b == b'"' || b == b'\'')
}

/// Renders a token typed by a user so it reaches the server as exactly one argument: bare
/// tokens as they are, anything else quoted like a free-form value.
pub fn inline_token(token: &str) -> String {
    if is_bare(token) {
        return token.to_string();
    }

    let mut dst = BytesMut::with_capacity(token.len() + 2);
    quote(token.as_bytes(), &mut dst);
    String::from_utf8_lossy(&dst).into_owned()
}

fn write_arg(arg: &Arg<'_>, dst: &mut BytesMut) {
    match *arg {
        Arg::Key(key) => dst.extend_from_slice(key.as_bytes()),
        Arg::Value(value) => quote(value, dst),
        Arg::Int(i) => dst.extend_from_slice(i.to_string().as_bytes()),
        Arg::Float(f) => dst.extend_from_slice(format_float(f).as_bytes()),
        Arg::Token(token) => dst.extend_from_slice(token.as_bytes()),
    }
}

fn format_float(f: f64) -> String {
    if f == f64::INFINITY {
        "+inf".to_string()
    } else if f == f64::NEG_INFINITY {
        "-inf".to_string()
    } else {
        f.to_string()
    }
}

fn quote(value: &[u8], dst: &mut BytesMut) {
    dst.reserve(value.len() + 2);
    dst.put_u8(b'"');
    for &byte in value {
        match byte {
            b'"' => dst.extend_from_slice(b"\\\""),
            b'\\' => dst.extend_from_slice(b"\\\\"),
            b'\n' => dst.extend_from_slice(b"\\n"),
            b'\r' => dst.extend_from_slice(b"\\r"),
            b'\t' => dst.extend_from_slice(b"\\t"),
            0x00..=0x1f | 0x7f => {
                const HEX: &[u8; 16] = b"0123456789abcdef";
                dst.extend_from_slice(b"\\x");
                dst.put_u8(HEX[usize::from(byte >> 4)]);
                dst.put_u8(HEX[usize::from(byte & 0x0f)]);
            }
            byte => dst.put_u8(byte),
        }
    }
    dst.put_u8(b'"');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_without_arguments() {
        assert_eq!(encode("PING", &[]), Bytes::from("PING\r\n"));
    }

    #[test]
    fn inline_token_uses_inline_escapes() {
        assert_eq!(inline_token("GET"), "GET");
        assert_eq!(inline_token("hello world"), "\"hello world\"");
        assert_eq!(inline_token("a\u{1}b"), "\"a\\x01b\"");
        assert_eq!(inline_token("tab\there"), "\"tab\\there\"");
        assert_eq!(inline_token("caf\u{e9}"), "caf\u{e9}");
        assert_eq!(inline_token(""), "\"\"");
    }

    #[test]
    fn encode_quotes_values_only() {
        let line = encode("SET", &[Arg::Key("key"), Arg::Value(b"a b c")]);

        assert_eq!(line, Bytes::from("SET key \"a b c\"\r\n"));
    }

    #[test]
    fn encode_numbers_and_tokens() {
        let line = encode(
            "ZRANGEBYSCORE",
            &[
                Arg::Key("zset"),
                Arg::Key("-inf"),
                Arg::Key("(5"),
                Arg::Token("LIMIT"),
                Arg::Int(0),
                Arg::Int(-1),
            ],
        );

        assert_eq!(line, Bytes::from("ZRANGEBYSCORE zset -inf (5 LIMIT 0 -1\r\n"));
    }

    #[test]
    fn encode_floats() {
        let line = encode(
            "ZADD",
            &[
                Arg::Key("z"),
                Arg::Float(1.5),
                Arg::Value(b"a"),
                Arg::Float(2.0),
                Arg::Value(b"b"),
                Arg::Float(f64::INFINITY),
                Arg::Value(b"c"),
            ],
        );

        assert_eq!(
            line,
            Bytes::from("ZADD z 1.5 \"a\" 2 \"b\" +inf \"c\"\r\n")
        );
    }

    #[test]
    fn encode_escapes_inside_quotes() {
        let line = encode("SET", &[Arg::Key("k"), Arg::Value(b"say \"hi\"\r\n\\\x00")]);

        assert_eq!(
            line,
            Bytes::from("SET k \"say \\\"hi\\\"\\r\\n\\\\\\x00\"\r\n")
        );
    }

    #[test]
    fn encode_empty_value() {
        assert_eq!(
            encode("SET", &[Arg::Key("k"), Arg::Value(b"")]),
            Bytes::from("SET k \"\"\r\n")
        );
    }

    #[test]
    fn encode_raw_line() {
        let mut dst = BytesMut::new();
        encode_raw_into("CLIENT SETNAME me\r\n", &mut dst);

        assert_eq!(dst, BytesMut::from("CLIENT SETNAME me\r\n"));
    }

    #[test]
    fn bare_tokens() {
        assert!(is_bare("user:1"));
        assert!(is_bare("(1.5"));
        assert!(!is_bare(""));
        assert!(!is_bare("a b"));
        assert!(!is_bare("a\"b"));
        assert!(!is_bare("a\nb"));
    }
}
