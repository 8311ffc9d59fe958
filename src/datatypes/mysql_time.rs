use super::sql_value::SqlValue;
use chrono::TimeDelta;
use derive_more::Error as ErrorFactory;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, Value, ValueRef};
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    ops::Range,
    str::{self, FromStr},
};

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 60 * SECONDS_PER_MINUTE;

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Reason {
    PartCount(usize),
    CompactLength(usize),
    InvalidNumber(String),
    InvalidUtf8,
    Overflow,
}
impl fmt::Display for Reason {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::PartCount(count) => {
                write!(f, "expected 2 or 3 colon separated parts, got {count}")
            }
            Self::CompactLength(length) => {
                write!(f, "compact form must be 2, 4 or 6 digits long, got {length}")
            }
            Self::InvalidNumber(part) => write!(f, "'{part}' is not a number"),
            Self::InvalidUtf8 => write!(f, "not valid UTF-8"),
            Self::Overflow => write!(f, "value out of range"),
        }
    }
}

#[derive(ErrorFactory, Debug)]
pub enum Error {
    MalformedLiteral { literal: String, reason: Reason },
    UnsupportedSourceType { type_name: &'static str },
}
impl fmt::Display for Error {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::MalformedLiteral { literal, reason } => {
                write!(f, "invalid TIME format '{literal}': {reason}")
            }
            Self::UnsupportedSourceType { type_name } => {
                write!(f, "unsupported source type for TIME: {type_name}")
            }
        }
    }
}

/// MySQL `TIME` column value.
///
/// This is a signed duration (`-838:59:59` up to `838:59:59` on the server side), not a time of
/// day. `None` stands for SQL `NULL` and is kept apart from the zero duration: an unset value
/// formats as an empty string and is stored as `NULL`.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(try_from = "MySqlTimeSerde")]
#[serde(into = "MySqlTimeSerde")]
pub struct MySqlTime {
    value: Option<TimeDelta>,
}
impl MySqlTime {
    pub const fn null() -> Self {
        Self { value: None }
    }
    pub const fn from_duration(value: TimeDelta) -> Self {
        Self { value: Some(value) }
    }

    pub fn set_duration(
        &mut self,
        value: TimeDelta,
    ) {
        self.value = Some(value);
    }
    pub fn clear(&mut self) {
        self.value = None;
    }

    pub fn duration(&self) -> Option<TimeDelta> {
        self.value
    }
    pub fn is_set(&self) -> bool {
        self.value.is_some()
    }

    /// Parses `[-]H:M[:S]` (any width per part) or the compact `HHMMSS`, `MMSS`, `SS` forms.
    ///
    /// Fields are not range checked, `"99:99:99"` is accepted. The empty string is rejected
    /// here. Use [`Self::from_text`] to map it to `NULL`.
    pub fn parse_duration(literal: &str) -> Result<TimeDelta, Error> {
        let result = if literal.contains(':') {
            parse_delimited(literal)
        } else {
            parse_compact(literal)
        };
        result.map_err(|reason| Error::MalformedLiteral {
            literal: literal.to_owned(),
            reason,
        })
    }

    // text marshaling
    pub fn to_text(&self) -> String {
        self.to_string()
    }
    pub fn from_text(text: &str) -> Result<Self, Error> {
        if text.is_empty() {
            return Ok(Self::null());
        }
        text.parse()
    }
    pub fn set_text(
        &mut self,
        text: &str,
    ) -> Result<(), Error> {
        *self = Self::from_text(text)?;
        Ok(())
    }

    // driver values
    pub fn to_sql_value(&self) -> Option<String> {
        self.value.map(|_| self.to_string())
    }
    pub fn from_sql_value(value: SqlValue<'_>) -> Result<Self, Error> {
        let literal = match value {
            SqlValue::Null => return Ok(Self::null()),
            SqlValue::Text(text) => text,
            SqlValue::Bytes(bytes) => match str::from_utf8(bytes) {
                Ok(text) => text,
                Err(_) => {
                    return Err(Error::MalformedLiteral {
                        literal: bytes.escape_ascii().to_string(),
                        reason: Reason::InvalidUtf8,
                    });
                }
            },
            SqlValue::Other { type_name } => {
                return Err(Error::UnsupportedSourceType { type_name });
            }
        };
        literal.parse()
    }
    pub fn scan(
        &mut self,
        value: SqlValue<'_>,
    ) -> Result<(), Error> {
        *self = Self::from_sql_value(value)?;
        Ok(())
    }
}
impl From<TimeDelta> for MySqlTime {
    fn from(value: TimeDelta) -> Self {
        Self::from_duration(value)
    }
}
impl FromStr for MySqlTime {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_duration(s).map(Self::from_duration)
    }
}
impl fmt::Display for MySqlTime {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let value = match self.value {
            Some(value) => value,
            None => return Ok(()),
        };

        // fields truncate towards zero and keep the sign, the prefix carries it instead
        let sign = if value < TimeDelta::zero() { "-" } else { "" };
        let hours = value.num_hours().unsigned_abs();
        let minutes = (value.num_minutes() % 60).unsigned_abs();
        let seconds = (value.num_seconds() % 60).unsigned_abs();

        write!(f, "{sign}{hours:03}:{minutes:02}:{seconds:02}")
    }
}

fn parse_delimited(literal: &str) -> Result<TimeDelta, Reason> {
    let (negative, literal) = match literal.strip_prefix('-') {
        Some(literal) => (true, literal),
        None => (false, literal),
    };

    let parts = literal.split(':').collect::<Vec<_>>();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [hours, minutes] => (parse_number(hours)?, parse_number(minutes)?, 0),
        [hours, minutes, seconds] => (
            parse_number(hours)?,
            parse_number(minutes)?,
            parse_number(seconds)?,
        ),
        parts => return Err(Reason::PartCount(parts.len())),
    };

    combine(negative, hours, minutes, seconds)
}
fn parse_compact(literal: &str) -> Result<TimeDelta, Reason> {
    let field = |range: Range<usize>| -> Result<u64, Reason> {
        match literal.get(range.clone()) {
            Some(part) => parse_number(part),
            // boundary inside a multi-byte character, report the raw bytes of the field
            None => Err(Reason::InvalidNumber(
                literal.as_bytes()[range].escape_ascii().to_string(),
            )),
        }
    };

    let (hours, minutes, seconds) = match literal.len() {
        6 => (field(0..2)?, field(2..4)?, field(4..6)?),
        4 => (0, field(0..2)?, field(2..4)?),
        2 => (0, 0, field(0..2)?),
        length => return Err(Reason::CompactLength(length)),
    };

    combine(false, hours, minutes, seconds)
}
fn parse_number(part: &str) -> Result<u64, Reason> {
    if part.is_empty() || !part.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(Reason::InvalidNumber(part.to_owned()));
    }
    // only digits left, so the only possible failure is overflow
    part.parse::<u64>().map_err(|_| Reason::Overflow)
}
fn combine(
    negative: bool,
    hours: u64,
    minutes: u64,
    seconds: u64,
) -> Result<TimeDelta, Reason> {
    let total = total_seconds(hours, minutes, seconds).ok_or(Reason::Overflow)?;
    let total = if negative { -total } else { total };
    TimeDelta::try_seconds(total).ok_or(Reason::Overflow)
}
fn total_seconds(
    hours: u64,
    minutes: u64,
    seconds: u64,
) -> Option<i64> {
    let hours = i64::try_from(hours).ok()?.checked_mul(SECONDS_PER_HOUR)?;
    let minutes = i64::try_from(minutes)
        .ok()?
        .checked_mul(SECONDS_PER_MINUTE)?;
    let seconds = i64::try_from(seconds).ok()?;
    hours.checked_add(minutes)?.checked_add(seconds)
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(transparent)]
struct MySqlTimeSerde(String);
impl TryFrom<MySqlTimeSerde> for MySqlTime {
    type Error = Error;

    fn try_from(value: MySqlTimeSerde) -> Result<Self, Self::Error> {
        Self::from_text(&value.0)
    }
}
impl From<MySqlTime> for MySqlTimeSerde {
    fn from(value: MySqlTime) -> Self {
        MySqlTimeSerde(value.to_text())
    }
}

impl ToSql for MySqlTime {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let value = match self.to_sql_value() {
            Some(text) => Value::Text(text),
            None => Value::Null,
        };
        Ok(ToSqlOutput::Owned(value))
    }
}
impl FromSql for MySqlTime {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        Self::from_sql_value(value.into()).map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}
