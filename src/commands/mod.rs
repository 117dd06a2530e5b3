mod options;

use bytes::{Bytes, BytesMut};

use crate::encoder::{self, Arg};
use crate::Error;

pub use options::{Aggregate, BitOperation, InsertPosition, Limit, SortOptions};

/// Every command this client knows how to send, with its typed arguments.
///
/// Boolean `millis` flags select the millisecond variant of a verb (`EXPIRE` / `PEXPIRE`).
/// `Raw` bypasses all typing and validation.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    // Strings
    Append { key: String, value: Bytes },
    BitCount {
        key: String,
        range: Option<(i64, i64)>,
    },
    BitOp {
        operation: BitOperation,
        destination: String,
        keys: Vec<String>,
    },
    BitPos {
        key: String,
        bit: u8,
        start: Option<i64>,
        end: Option<i64>,
    },
    Decr { key: String },
    DecrBy { key: String, decrement: i64 },
    Get { key: String },
    GetBit { key: String, offset: u64 },
    GetRange { key: String, start: i64, end: i64 },
    GetSet { key: String, value: Bytes },
    Incr { key: String },
    IncrBy { key: String, increment: i64 },
    IncrByFloat { key: String, increment: f64 },
    MGet { keys: Vec<String> },
    MSet { pairs: Vec<(String, Bytes)> },
    MSetNx { pairs: Vec<(String, Bytes)> },
    Set { key: String, value: Bytes },
    SetBit { key: String, offset: u64, value: u8 },
    SetEx {
        key: String,
        ttl: i64,
        value: Bytes,
        millis: bool,
    },
    SetNx { key: String, value: Bytes },
    SetRange {
        key: String,
        offset: u64,
        value: Bytes,
    },
    StrLen { key: String },

    // Keys
    Del { keys: Vec<String> },
    Dump { key: String },
    Exists { keys: Vec<String> },
    Expire { key: String, ttl: i64, millis: bool },
    ExpireAt {
        key: String,
        timestamp: i64,
        millis: bool,
    },
    Keys { pattern: String },
    Move { key: String, db: i64 },
    Persist { key: String },
    RandomKey,
    Rename { key: String, new_key: String },
    RenameNx { key: String, new_key: String },
    Restore {
        key: String,
        ttl: i64,
        serialized: Bytes,
        replace: bool,
    },
    Sort {
        key: String,
        options: SortOptions,
        store: Option<String>,
    },
    Ttl { key: String, millis: bool },
    Type { key: String },

    // Lists
    BLPop { keys: Vec<String>, timeout: i64 },
    BRPop { keys: Vec<String>, timeout: i64 },
    BRPopLPush {
        source: String,
        destination: String,
        timeout: i64,
    },
    LIndex { key: String, index: i64 },
    LInsert {
        key: String,
        position: InsertPosition,
        pivot: Bytes,
        value: Bytes,
    },
    LLen { key: String },
    LPop { key: String },
    LPush { key: String, values: Vec<Bytes> },
    LPushX { key: String, value: Bytes },
    LRange { key: String, start: i64, stop: i64 },
    LRem {
        key: String,
        count: i64,
        value: Bytes,
    },
    LSet {
        key: String,
        index: i64,
        value: Bytes,
    },
    LTrim { key: String, start: i64, stop: i64 },
    RPop { key: String },
    RPopLPush { source: String, destination: String },
    RPush { key: String, values: Vec<Bytes> },
    RPushX { key: String, value: Bytes },

    // Sets
    SAdd { key: String, members: Vec<Bytes> },
    SCard { key: String },
    SDiff { keys: Vec<String> },
    SDiffStore {
        destination: String,
        keys: Vec<String>,
    },
    SInter { keys: Vec<String> },
    SInterStore {
        destination: String,
        keys: Vec<String>,
    },
    SIsMember { key: String, member: Bytes },
    SMembers { key: String },
    SMove {
        source: String,
        destination: String,
        member: Bytes,
    },
    SPop { key: String },
    SRandMember { key: String, count: Option<i64> },
    SRem { key: String, members: Vec<Bytes> },
    SUnion { keys: Vec<String> },
    SUnionStore {
        destination: String,
        keys: Vec<String>,
    },

    // Sorted sets. Score and lex bounds (`-inf`, `(1.5`, `[a`, `+`) are passed through verbatim.
    ZAdd {
        key: String,
        members: Vec<(f64, Bytes)>,
    },
    ZCard { key: String },
    ZCount {
        key: String,
        min: String,
        max: String,
    },
    ZIncrBy {
        key: String,
        increment: f64,
        member: Bytes,
    },
    ZInterStore {
        destination: String,
        keys: Vec<String>,
        weights: Option<Vec<f64>>,
        aggregate: Option<Aggregate>,
    },
    ZLexCount {
        key: String,
        min: String,
        max: String,
    },
    ZRange {
        key: String,
        start: i64,
        stop: i64,
        with_scores: bool,
    },
    ZRangeByLex {
        key: String,
        min: String,
        max: String,
        limit: Option<Limit>,
    },
    ZRangeByScore {
        key: String,
        min: String,
        max: String,
        with_scores: bool,
        limit: Option<Limit>,
    },
    ZRank { key: String, member: Bytes },
    ZRem { key: String, members: Vec<Bytes> },
    ZRemRangeByLex {
        key: String,
        min: String,
        max: String,
    },
    ZRemRangeByRank { key: String, start: i64, stop: i64 },
    ZRemRangeByScore {
        key: String,
        min: String,
        max: String,
    },
    ZRevRange {
        key: String,
        start: i64,
        stop: i64,
        with_scores: bool,
    },
    ZRevRangeByLex {
        key: String,
        max: String,
        min: String,
        limit: Option<Limit>,
    },
    ZRevRangeByScore {
        key: String,
        max: String,
        min: String,
        with_scores: bool,
        limit: Option<Limit>,
    },
    ZRevRank { key: String, member: Bytes },
    ZScore { key: String, member: Bytes },
    ZUnionStore {
        destination: String,
        keys: Vec<String>,
        weights: Option<Vec<f64>>,
        aggregate: Option<Aggregate>,
    },

    // Hashes
    HDel { key: String, fields: Vec<String> },
    HExists { key: String, field: String },
    HGet { key: String, field: String },
    HGetAll { key: String },
    HIncrBy {
        key: String,
        field: String,
        increment: i64,
    },
    HIncrByFloat {
        key: String,
        field: String,
        increment: f64,
    },
    HKeys { key: String },
    HLen { key: String },
    HMGet { key: String, fields: Vec<String> },
    HMSet {
        key: String,
        pairs: Vec<(String, Bytes)>,
    },
    HSet {
        key: String,
        field: String,
        value: Bytes,
    },
    HSetNx {
        key: String,
        field: String,
        value: Bytes,
    },
    HStrLen { key: String, field: String },
    HVals { key: String },

    // Connection
    Auth { password: Bytes },
    Echo { message: Bytes },
    Ping,
    Select { index: i64 },

    // Pub/sub
    Publish { channel: String, message: Bytes },
    Subscribe { channels: Vec<String> },
    /// An empty channel list unsubscribes from every channel.
    Unsubscribe { channels: Vec<String> },

    // Transactions
    Discard,
    Exec,
    Multi,
    Unwatch,
    Watch { keys: Vec<String> },

    /// A complete command line sent as is.
    Raw(String),
}

impl Command {
    /// The verb sent on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Append { .. } => "APPEND",
            Command::BitCount { .. } => "BITCOUNT",
            Command::BitOp { .. } => "BITOP",
            Command::BitPos { .. } => "BITPOS",
            Command::Decr { .. } => "DECR",
            Command::DecrBy { .. } => "DECRBY",
            Command::Get { .. } => "GET",
            Command::GetBit { .. } => "GETBIT",
            Command::GetRange { .. } => "GETRANGE",
            Command::GetSet { .. } => "GETSET",
            Command::Incr { .. } => "INCR",
            Command::IncrBy { .. } => "INCRBY",
            Command::IncrByFloat { .. } => "INCRBYFLOAT",
            Command::MGet { .. } => "MGET",
            Command::MSet { .. } => "MSET",
            Command::MSetNx { .. } => "MSETNX",
            Command::Set { .. } => "SET",
            Command::SetBit { .. } => "SETBIT",
            Command::SetEx { millis: false, .. } => "SETEX",
            Command::SetEx { millis: true, .. } => "PSETEX",
            Command::SetNx { .. } => "SETNX",
            Command::SetRange { .. } => "SETRANGE",
            Command::StrLen { .. } => "STRLEN",

            Command::Del { .. } => "DEL",
            Command::Dump { .. } => "DUMP",
            Command::Exists { .. } => "EXISTS",
            Command::Expire { millis: false, .. } => "EXPIRE",
            Command::Expire { millis: true, .. } => "PEXPIRE",
            Command::ExpireAt { millis: false, .. } => "EXPIREAT",
            Command::ExpireAt { millis: true, .. } => "PEXPIREAT",
            Command::Keys { .. } => "KEYS",
            Command::Move { .. } => "MOVE",
            Command::Persist { .. } => "PERSIST",
            Command::RandomKey => "RANDOMKEY",
            Command::Rename { .. } => "RENAME",
            Command::RenameNx { .. } => "RENAMENX",
            Command::Restore { .. } => "RESTORE",
            Command::Sort { .. } => "SORT",
            Command::Ttl { millis: false, .. } => "TTL",
            Command::Ttl { millis: true, .. } => "PTTL",
            Command::Type { .. } => "TYPE",

            Command::BLPop { .. } => "BLPOP",
            Command::BRPop { .. } => "BRPOP",
            Command::BRPopLPush { .. } => "BRPOPLPUSH",
            Command::LIndex { .. } => "LINDEX",
            Command::LInsert { .. } => "LINSERT",
            Command::LLen { .. } => "LLEN",
            Command::LPop { .. } => "LPOP",
            Command::LPush { .. } => "LPUSH",
            Command::LPushX { .. } => "LPUSHX",
            Command::LRange { .. } => "LRANGE",
            Command::LRem { .. } => "LREM",
            Command::LSet { .. } => "LSET",
            Command::LTrim { .. } => "LTRIM",
            Command::RPop { .. } => "RPOP",
            Command::RPopLPush { .. } => "RPOPLPUSH",
            Command::RPush { .. } => "RPUSH",
            Command::RPushX { .. } => "RPUSHX",

            Command::SAdd { .. } => "SADD",
            Command::SCard { .. } => "SCARD",
            Command::SDiff { .. } => "SDIFF",
            Command::SDiffStore { .. } => "SDIFFSTORE",
            Command::SInter { .. } => "SINTER",
            Command::SInterStore { .. } => "SINTERSTORE",
            Command::SIsMember { .. } => "SISMEMBER",
            Command::SMembers { .. } => "SMEMBERS",
            Command::SMove { .. } => "SMOVE",
            Command::SPop { .. } => "SPOP",
            Command::SRandMember { .. } => "SRANDMEMBER",
            Command::SRem { .. } => "SREM",
            Command::SUnion { .. } => "SUNION",
            Command::SUnionStore { .. } => "SUNIONSTORE",

            Command::ZAdd { .. } => "ZADD",
            Command::ZCard { .. } => "ZCARD",
            Command::ZCount { .. } => "ZCOUNT",
            Command::ZIncrBy { .. } => "ZINCRBY",
            Command::ZInterStore { .. } => "ZINTERSTORE",
            Command::ZLexCount { .. } => "ZLEXCOUNT",
            Command::ZRange { .. } => "ZRANGE",
            Command::ZRangeByLex { .. } => "ZRANGEBYLEX",
            Command::ZRangeByScore { .. } => "ZRANGEBYSCORE",
            Command::ZRank { .. } => "ZRANK",
            Command::ZRem { .. } => "ZREM",
            Command::ZRemRangeByLex { .. } => "ZREMRANGEBYLEX",
            Command::ZRemRangeByRank { .. } => "ZREMRANGEBYRANK",
            Command::ZRemRangeByScore { .. } => "ZREMRANGEBYSCORE",
            Command::ZRevRange { .. } => "ZREVRANGE",
            Command::ZRevRangeByLex { .. } => "ZREVRANGEBYLEX",
            Command::ZRevRangeByScore { .. } => "ZREVRANGEBYSCORE",
            Command::ZRevRank { .. } => "ZREVRANK",
            Command::ZScore { .. } => "ZSCORE",
            Command::ZUnionStore { .. } => "ZUNIONSTORE",

            Command::HDel { .. } => "HDEL",
            Command::HExists { .. } => "HEXISTS",
            Command::HGet { .. } => "HGET",
            Command::HGetAll { .. } => "HGETALL",
            Command::HIncrBy { .. } => "HINCRBY",
            Command::HIncrByFloat { .. } => "HINCRBYFLOAT",
            Command::HKeys { .. } => "HKEYS",
            Command::HLen { .. } => "HLEN",
            Command::HMGet { .. } => "HMGET",
            Command::HMSet { .. } => "HMSET",
            Command::HSet { .. } => "HSET",
            Command::HSetNx { .. } => "HSETNX",
            Command::HStrLen { .. } => "HSTRLEN",
            Command::HVals { .. } => "HVALS",

            Command::Auth { .. } => "AUTH",
            Command::Echo { .. } => "ECHO",
            Command::Ping => "PING",
            Command::Select { .. } => "SELECT",

            Command::Publish { .. } => "PUBLISH",
            Command::Subscribe { .. } => "SUBSCRIBE",
            Command::Unsubscribe { .. } => "UNSUBSCRIBE",

            Command::Discard => "DISCARD",
            Command::Exec => "EXEC",
            Command::Multi => "MULTI",
            Command::Unwatch => "UNWATCH",
            Command::Watch { .. } => "WATCH",

            Command::Raw(_) => "RAW",
        }
    }

    /// The arguments following the verb, in wire order.
    pub fn args(&self) -> Vec<Arg<'_>> {
        use Arg::{Float, Int, Key, Token, Value};

        match self {
            Command::Get { key }
            | Command::Decr { key }
            | Command::Incr { key }
            | Command::StrLen { key }
            | Command::Dump { key }
            | Command::Persist { key }
            | Command::Type { key }
            | Command::Ttl { key, .. }
            | Command::LLen { key }
            | Command::LPop { key }
            | Command::RPop { key }
            | Command::SCard { key }
            | Command::SMembers { key }
            | Command::SPop { key }
            | Command::ZCard { key }
            | Command::HGetAll { key }
            | Command::HKeys { key }
            | Command::HLen { key }
            | Command::HVals { key } => vec![Key(key)],

            Command::Set { key, value }
            | Command::Append { key, value }
            | Command::GetSet { key, value }
            | Command::SetNx { key, value }
            | Command::LPushX { key, value }
            | Command::RPushX { key, value }
            | Command::SIsMember { key, member: value }
            | Command::ZRank { key, member: value }
            | Command::ZRevRank { key, member: value }
            | Command::ZScore { key, member: value } => vec![Key(key), Value(value)],

            Command::MGet { keys }
            | Command::Del { keys }
            | Command::Exists { keys }
            | Command::SDiff { keys }
            | Command::SInter { keys }
            | Command::SUnion { keys }
            | Command::Watch { keys }
            | Command::Subscribe { channels: keys }
            | Command::Unsubscribe { channels: keys } => keys.iter().map(|key| Key(key)).collect(),

            Command::SDiffStore { destination, keys }
            | Command::SInterStore { destination, keys }
            | Command::SUnionStore { destination, keys } => std::iter::once(Key(destination))
                .chain(keys.iter().map(|key| Key(key)))
                .collect(),

            Command::MSet { pairs } | Command::MSetNx { pairs } => pairs
                .iter()
                .flat_map(|(key, value)| [Key(key), Value(value)])
                .collect(),

            Command::BitCount { key, range } => {
                let mut args = vec![Key(key)];
                if let Some((start, end)) = range {
                    args.extend([Int(*start), Int(*end)]);
                }
                args
            }
            Command::BitOp {
                operation,
                destination,
                keys,
            } => [Token((*operation).into()), Key(destination)]
                .into_iter()
                .chain(keys.iter().map(|key| Key(key)))
                .collect(),
            Command::BitPos {
                key,
                bit,
                start,
                end,
            } => {
                let mut args = vec![Key(key), Int(i64::from(*bit))];
                args.extend(start.map(Int));
                args.extend(end.map(Int));
                args
            }
            Command::DecrBy {
                key,
                decrement: amount,
            }
            | Command::IncrBy {
                key,
                increment: amount,
            }
            | Command::Move { key, db: amount }
            | Command::LIndex { key, index: amount }
            | Command::Expire { key, ttl: amount, .. }
            | Command::ExpireAt {
                key,
                timestamp: amount,
                ..
            } => vec![Key(key), Int(*amount)],
            Command::IncrByFloat { key, increment } => vec![Key(key), Float(*increment)],
            Command::GetBit { key, offset } => vec![Key(key), offset_arg(*offset)],
            Command::SetBit { key, offset, value } => {
                vec![Key(key), offset_arg(*offset), Int(i64::from(*value))]
            }
            Command::GetRange { key, start, end: stop }
            | Command::LRange { key, start, stop }
            | Command::LTrim { key, start, stop }
            | Command::ZRemRangeByRank { key, start, stop } => {
                vec![Key(key), Int(*start), Int(*stop)]
            }
            Command::SetEx {
                key, ttl, value, ..
            } => vec![Key(key), Int(*ttl), Value(value)],
            Command::SetRange { key, offset, value } => {
                vec![Key(key), offset_arg(*offset), Value(value)]
            }

            Command::Keys { pattern } => vec![Key(pattern)],
            Command::RandomKey
            | Command::Ping
            | Command::Discard
            | Command::Exec
            | Command::Multi
            | Command::Unwatch
            | Command::Raw(_) => vec![],
            Command::Rename { key, new_key } | Command::RenameNx { key, new_key } => {
                vec![Key(key), Key(new_key)]
            }
            Command::RPopLPush {
                source,
                destination,
            } => vec![Key(source), Key(destination)],
            Command::Restore {
                key,
                ttl,
                serialized,
                replace,
            } => {
                let mut args = vec![Key(key), Int(*ttl), Value(serialized)];
                if *replace {
                    args.push(Token("REPLACE"));
                }
                args
            }
            Command::Sort {
                key,
                options,
                store,
            } => {
                let mut args = vec![Key(key)];
                args.extend(limit_args(&options.limit));
                if options.descending {
                    args.push(Token("DESC"));
                }
                if options.alpha {
                    args.push(Token("ALPHA"));
                }
                if let Some(destination) = store {
                    args.extend([Token("STORE"), Key(destination)]);
                }
                args
            }

            Command::BLPop { keys, timeout } | Command::BRPop { keys, timeout } => keys
                .iter()
                .map(|key| Key(key))
                .chain(std::iter::once(Int(*timeout)))
                .collect(),
            Command::BRPopLPush {
                source,
                destination,
                timeout,
            } => vec![Key(source), Key(destination), Int(*timeout)],
            Command::LInsert {
                key,
                position,
                pivot,
                value,
            } => vec![Key(key), Token((*position).into()), Value(pivot), Value(value)],
            Command::LPush { key, values: items }
            | Command::RPush { key, values: items }
            | Command::SAdd {
                key,
                members: items,
            }
            | Command::SRem {
                key,
                members: items,
            }
            | Command::ZRem {
                key,
                members: items,
            } => std::iter::once(Key(key))
                .chain(items.iter().map(|item| Value(item)))
                .collect(),
            Command::LRem { key, count, value } => vec![Key(key), Int(*count), Value(value)],
            Command::LSet { key, index, value } => vec![Key(key), Int(*index), Value(value)],

            Command::SMove {
                source,
                destination,
                member,
            } => vec![Key(source), Key(destination), Value(member)],
            Command::SRandMember { key, count } => {
                let mut args = vec![Key(key)];
                args.extend(count.map(Int));
                args
            }

            Command::ZAdd { key, members } => std::iter::once(Key(key))
                .chain(
                    members
                        .iter()
                        .flat_map(|(score, member)| [Float(*score), Value(member)]),
                )
                .collect(),
            Command::ZCount { key, min, max }
            | Command::ZLexCount { key, min, max }
            | Command::ZRemRangeByLex { key, min, max }
            | Command::ZRemRangeByScore { key, min, max } => vec![Key(key), Key(min), Key(max)],
            Command::ZIncrBy {
                key,
                increment,
                member,
            } => vec![Key(key), Float(*increment), Value(member)],
            Command::ZInterStore {
                destination,
                keys,
                weights,
                aggregate,
            }
            | Command::ZUnionStore {
                destination,
                keys,
                weights,
                aggregate,
            } => {
                let numkeys = i64::try_from(keys.len()).unwrap_or(i64::MAX);
                let mut args = vec![Key(destination), Int(numkeys)];
                args.extend(keys.iter().map(|key| Key(key)));
                if let Some(weights) = weights {
                    args.push(Token("WEIGHTS"));
                    args.extend(weights.iter().map(|weight| Float(*weight)));
                }
                if let Some(aggregate) = aggregate {
                    args.extend([Token("AGGREGATE"), Token((*aggregate).into())]);
                }
                args
            }
            Command::ZRange {
                key,
                start,
                stop,
                with_scores,
            }
            | Command::ZRevRange {
                key,
                start,
                stop,
                with_scores,
            } => {
                let mut args = vec![Key(key), Int(*start), Int(*stop)];
                if *with_scores {
                    args.push(Token("WITHSCORES"));
                }
                args
            }
            Command::ZRangeByLex {
                key,
                min: from,
                max: to,
                limit,
            }
            | Command::ZRevRangeByLex {
                key,
                max: from,
                min: to,
                limit,
            } => {
                let mut args = vec![Key(key), Key(from), Key(to)];
                args.extend(limit_args(limit));
                args
            }
            Command::ZRangeByScore {
                key,
                min: from,
                max: to,
                with_scores,
                limit,
            }
            | Command::ZRevRangeByScore {
                key,
                max: from,
                min: to,
                with_scores,
                limit,
            } => {
                let mut args = vec![Key(key), Key(from), Key(to)];
                if *with_scores {
                    args.push(Token("WITHSCORES"));
                }
                args.extend(limit_args(limit));
                args
            }

            Command::HDel { key, fields } | Command::HMGet { key, fields } => {
                std::iter::once(Key(key))
                    .chain(fields.iter().map(|field| Key(field)))
                    .collect()
            }
            Command::HExists { key, field }
            | Command::HGet { key, field }
            | Command::HStrLen { key, field } => vec![Key(key), Key(field)],
            Command::HIncrBy {
                key,
                field,
                increment,
            } => vec![Key(key), Key(field), Int(*increment)],
            Command::HIncrByFloat {
                key,
                field,
                increment,
            } => vec![Key(key), Key(field), Float(*increment)],
            Command::HMSet { key, pairs } => std::iter::once(Key(key))
                .chain(
                    pairs
                        .iter()
                        .flat_map(|(field, value)| [Key(field), Value(value)]),
                )
                .collect(),
            Command::HSet { key, field, value } | Command::HSetNx { key, field, value } => {
                vec![Key(key), Key(field), Value(value)]
            }

            Command::Auth { password } => vec![Value(password)],
            Command::Echo { message } => vec![Value(message)],
            Command::Select { index } => vec![Int(*index)],

            Command::Publish { channel, message } => vec![Key(channel), Value(message)],
        }
    }

    /// Checks the invocation against the shape the command accepts.
    pub fn validate(&self) -> Result<(), Error> {
        let invalid = |reason: &str| {
            Err(Error::Arity {
                command: self.name(),
                reason: reason.to_string(),
            })
        };

        match self {
            Command::Raw(line) if line.trim().is_empty() => return invalid("empty command line"),
            Command::Raw(_) => return Ok(()),

            Command::MGet { keys }
            | Command::Del { keys }
            | Command::Exists { keys }
            | Command::SDiff { keys }
            | Command::SDiffStore { keys, .. }
            | Command::SInter { keys }
            | Command::SInterStore { keys, .. }
            | Command::SUnion { keys }
            | Command::SUnionStore { keys, .. }
            | Command::BLPop { keys, .. }
            | Command::BRPop { keys, .. }
            | Command::Watch { keys }
                if keys.is_empty() =>
            {
                return invalid("at least one key is required")
            }
            Command::Subscribe { channels } if channels.is_empty() => {
                return invalid("at least one channel is required")
            }
            Command::MSet { pairs } | Command::MSetNx { pairs } if pairs.is_empty() => {
                return invalid("at least one key/value pair is required")
            }
            Command::HMSet { pairs, .. } if pairs.is_empty() => {
                return invalid("at least one field/value pair is required")
            }
            Command::HDel { fields, .. } | Command::HMGet { fields, .. } if fields.is_empty() => {
                return invalid("at least one field is required")
            }
            Command::LPush { values, .. } | Command::RPush { values, .. } if values.is_empty() => {
                return invalid("at least one value is required")
            }
            Command::SAdd { members, .. }
            | Command::SRem { members, .. }
            | Command::ZRem { members, .. }
                if members.is_empty() =>
            {
                return invalid("at least one member is required")
            }
            Command::ZAdd { members, .. } if members.is_empty() => {
                return invalid("at least one score/member pair is required")
            }
            Command::ZAdd { members, .. } if members.iter().any(|(score, _)| score.is_nan()) => {
                return invalid("score must be a number")
            }
            Command::BitOp {
                operation, keys, ..
            } => match (operation, keys.len()) {
                (_, 0) => return invalid("at least one source key is required"),
                (BitOperation::Not, n) if n != 1 => {
                    return invalid("NOT takes exactly one source key")
                }
                _ => {}
            },
            Command::BitPos { bit, .. } | Command::SetBit { value: bit, .. } if *bit > 1 => {
                return invalid("bit must be 0 or 1")
            }
            Command::BitPos {
                start: None,
                end: Some(_),
                ..
            } => return invalid("an end offset requires a start offset"),
            Command::ZInterStore { keys, weights, .. }
            | Command::ZUnionStore { keys, weights, .. } => {
                if keys.is_empty() {
                    return invalid("at least one key is required");
                }
                if let Some(weights) = weights {
                    if weights.len() != keys.len() {
                        return invalid("there must be exactly one weight per key");
                    }
                }
            }
            Command::IncrByFloat { increment, .. }
            | Command::HIncrByFloat { increment, .. }
            | Command::ZIncrBy { increment, .. }
                if !increment.is_finite() =>
            {
                return invalid("increment must be a finite number")
            }
            _ => {}
        }

        // Everything written unquoted must arrive as a single token.
        for arg in self.args() {
            if let Arg::Key(token) = arg {
                if !encoder::is_bare(token) {
                    return invalid(&format!(
                        "{:?} must be non-empty and contain no whitespace or quotes",
                        token
                    ));
                }
            }
        }

        Ok(())
    }

    /// Validates and renders the command as an inline command line.
    pub fn encode(&self) -> Result<Bytes, Error> {
        let mut dst = BytesMut::new();
        self.encode_into(&mut dst)?;
        Ok(dst.freeze())
    }

    pub fn encode_into(&self, dst: &mut BytesMut) -> Result<(), Error> {
        self.validate()?;

        match self {
            Command::Raw(line) => encoder::encode_raw_into(line, dst),
            command => encoder::encode_into(command.name(), &command.args(), dst),
        }

        Ok(())
    }
}

fn limit_args(limit: &Option<Limit>) -> Vec<Arg<'static>> {
    match limit {
        Some(Limit { offset, count }) => {
            vec![Arg::Token("LIMIT"), Arg::Int(*offset), Arg::Int(*count)]
        }
        None => vec![],
    }
}

fn offset_arg(offset: u64) -> Arg<'static> {
    Arg::Int(i64::try_from(offset).unwrap_or(i64::MAX))
}
