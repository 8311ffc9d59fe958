use rusqlite::types::ValueRef;
use std::{any, str};

/// Driver-level value handed to a scanner.
///
/// Only text and byte sequences carry data a column type may decode. Anything else is kept
/// as [`SqlValue::Other`] with a name for diagnostics.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum SqlValue<'a> {
    Null,
    Text(&'a str),
    Bytes(&'a [u8]),
    Other { type_name: &'static str },
}
impl<'a> SqlValue<'a> {
    pub fn other<T: ?Sized>(_value: &T) -> Self {
        Self::Other {
            type_name: any::type_name::<T>(),
        }
    }
}

impl<'a> From<&'a str> for SqlValue<'a> {
    fn from(value: &'a str) -> Self {
        Self::Text(value)
    }
}
impl<'a> From<&'a [u8]> for SqlValue<'a> {
    fn from(value: &'a [u8]) -> Self {
        Self::Bytes(value)
    }
}
impl<'a, T> From<Option<T>> for SqlValue<'a>
where
    T: Into<SqlValue<'a>>,
{
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => value.into(),
            None => Self::Null,
        }
    }
}

// sqlite storage classes
impl<'a> From<ValueRef<'a>> for SqlValue<'a> {
    fn from(value: ValueRef<'a>) -> Self {
        match value {
            ValueRef::Null => Self::Null,
            ValueRef::Text(text) => match str::from_utf8(text) {
                Ok(text) => Self::Text(text),
                Err(_) => Self::Bytes(text),
            },
            ValueRef::Blob(blob) => Self::Bytes(blob),
            ValueRef::Integer(_) => Self::Other {
                type_name: "INTEGER",
            },
            ValueRef::Real(_) => Self::Other { type_name: "REAL" },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SqlValue;
    use rusqlite::types::ValueRef;

    #[test]
    fn from_option_1() {
        assert_eq!(SqlValue::from(None::<&str>), SqlValue::Null);
        assert_eq!(SqlValue::from(Some("12")), SqlValue::Text("12"));
    }

    #[test]
    fn other_1() {
        assert_eq!(
            SqlValue::other(&123i64),
            SqlValue::Other { type_name: "i64" }
        );
    }

    #[test]
    fn from_value_ref_1() {
        assert_eq!(SqlValue::from(ValueRef::Null), SqlValue::Null);
        assert_eq!(
            SqlValue::from(ValueRef::Text(b"005:30:15")),
            SqlValue::Text("005:30:15")
        );
        assert_eq!(
            SqlValue::from(ValueRef::Text(&[0xFF, 0xFE])),
            SqlValue::Bytes(&[0xFF, 0xFE])
        );
        assert_eq!(
            SqlValue::from(ValueRef::Blob(b"1234")),
            SqlValue::Bytes(b"1234")
        );
        assert_eq!(
            SqlValue::from(ValueRef::Integer(123)),
            SqlValue::Other {
                type_name: "INTEGER"
            }
        );
        assert_eq!(
            SqlValue::from(ValueRef::Real(1.5)),
            SqlValue::Other { type_name: "REAL" }
        );
    }
}
