use strum_macros::{AsRefStr, Display, EnumString, IntoStaticStr};

/// `LIMIT offset count` modifier of the range commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Limit {
    pub offset: i64,
    pub count: i64,
}

impl Limit {
    pub fn new(offset: i64, count: i64) -> Self {
        Self { offset, count }
    }
}

/// How ZINTERSTORE and ZUNIONSTORE combine scores.
#[derive(Clone, Copy, Debug, PartialEq, Eq, AsRefStr, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Aggregate {
    Sum,
    Min,
    Max,
}

/// Ref: <https://redis.io/docs/latest/commands/bitop/>
#[derive(Clone, Copy, Debug, PartialEq, Eq, AsRefStr, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum BitOperation {
    And,
    Or,
    Xor,
    Not,
}

/// Where LINSERT places the new element relative to the pivot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, AsRefStr, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum InsertPosition {
    Before,
    After,
}

/// Modifiers of the SORT command.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SortOptions {
    pub limit: Option<Limit>,
    pub descending: bool,
    /// Sort lexicographically instead of numerically.
    pub alpha: bool,
}
