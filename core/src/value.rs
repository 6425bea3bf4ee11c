//! Column values and the conversions scalar fields are read through.
//!
//! A cursor hands every column to the binder as a borrowed [`ColumnValue`].
//! Scalar fields implement [`FromColumn`], which both converts a column into
//! the field's type and renders the field's textual form for fingerprinting.

use core::fmt::Write;

use crate::error::ColumnError;

/// A single column as produced by a row cursor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnValue<'a> {
    Null,
    Integer(i64),
    Real(f64),
    Bool(bool),
    Text(&'a str),
    Blob(&'a [u8]),
}

impl ColumnValue<'_> {
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// SQL-ish name of the value's storage class, used in error messages.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "NULL",
            Self::Integer(_) => "INTEGER",
            Self::Real(_) => "REAL",
            Self::Bool(_) => "BOOLEAN",
            Self::Text(_) => "TEXT",
            Self::Blob(_) => "BLOB",
        }
    }
}

/// Owned column value, used by in-memory cursors.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Integer(i64),
    Real(f64),
    Bool(bool),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    pub fn as_column(&self) -> ColumnValue<'_> {
        match self {
            Self::Null => ColumnValue::Null,
            Self::Integer(v) => ColumnValue::Integer(*v),
            Self::Real(v) => ColumnValue::Real(*v),
            Self::Bool(v) => ColumnValue::Bool(*v),
            Self::Text(v) => ColumnValue::Text(v),
            Self::Blob(v) => ColumnValue::Blob(v),
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident $(as $cast:ty)?),+ $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::$variant(v $(as $cast)?)
                }
            }
        )+
    };
}

value_from! {
    i8 => Integer as i64,
    i16 => Integer as i64,
    i32 => Integer as i64,
    i64 => Integer,
    u8 => Integer as i64,
    u16 => Integer as i64,
    u32 => Integer as i64,
    f32 => Real as f64,
    f64 => Real,
    bool => Bool,
    String => Text,
    Vec<u8> => Blob,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Self::Blob(v.to_vec())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

// =============================================================================
// FromColumn
// =============================================================================

/// Conversion from a column into a scalar field.
///
/// `print` writes the value's textual form into the fingerprint buffer. It
/// must be injective over the values of the type: two different values may
/// never print the same text.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be read from a single column",
    label = "this type does not implement FromColumn",
    note = "nested structs need #[derive(Entity)]; custom column formats can implement Codec and use #[scan(\"name\", codec)]"
)]
pub trait FromColumn: Sized {
    fn from_column(value: ColumnValue<'_>) -> Result<Self, ColumnError>;

    fn print(&self, out: &mut String);
}

fn mismatch(expected: &'static str, value: ColumnValue<'_>) -> ColumnError {
    ColumnError::TypeMismatch {
        expected,
        found: value.type_name(),
    }
}

macro_rules! impl_from_column_int {
    ($($ty:ty),+) => { $(
        impl FromColumn for $ty {
            fn from_column(value: ColumnValue<'_>) -> Result<Self, ColumnError> {
                match value {
                    ColumnValue::Integer(v) => {
                        <$ty>::try_from(v).map_err(|_| ColumnError::OutOfRange(stringify!($ty)))
                    }
                    ColumnValue::Bool(v) => Ok(<$ty>::from(v)),
                    ColumnValue::Text(v) => v
                        .trim()
                        .parse()
                        .map_err(|e: core::num::ParseIntError| ColumnError::Invalid(e.to_string())),
                    other => Err(mismatch(stringify!($ty), other)),
                }
            }

            fn print(&self, out: &mut String) {
                let _ = write!(out, "{self}");
            }
        }
    )+ };
}

impl_from_column_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

macro_rules! impl_from_column_float {
    ($($ty:ty),+) => { $(
        impl FromColumn for $ty {
            fn from_column(value: ColumnValue<'_>) -> Result<Self, ColumnError> {
                match value {
                    ColumnValue::Real(v) => Ok(v as $ty),
                    ColumnValue::Integer(v) => Ok(v as $ty),
                    ColumnValue::Text(v) => v
                        .trim()
                        .parse()
                        .map_err(|e: core::num::ParseFloatError| ColumnError::Invalid(e.to_string())),
                    other => Err(mismatch(stringify!($ty), other)),
                }
            }

            fn print(&self, out: &mut String) {
                // Debug keeps the fractional part, so 1.0 and 1 never collide with text
                let _ = write!(out, "{self:?}");
            }
        }
    )+ };
}

impl_from_column_float!(f32, f64);

impl FromColumn for bool {
    fn from_column(value: ColumnValue<'_>) -> Result<Self, ColumnError> {
        match value {
            ColumnValue::Bool(v) => Ok(v),
            ColumnValue::Integer(v) => Ok(v != 0),
            ColumnValue::Text("true" | "t" | "1") => Ok(true),
            ColumnValue::Text("false" | "f" | "0") => Ok(false),
            other => Err(mismatch("bool", other)),
        }
    }

    fn print(&self, out: &mut String) {
        let _ = write!(out, "{self}");
    }
}

impl FromColumn for String {
    fn from_column(value: ColumnValue<'_>) -> Result<Self, ColumnError> {
        match value {
            ColumnValue::Text(v) => Ok(v.to_owned()),
            ColumnValue::Integer(v) => Ok(v.to_string()),
            ColumnValue::Real(v) => Ok(v.to_string()),
            ColumnValue::Bool(v) => Ok(v.to_string()),
            ColumnValue::Blob(v) => core::str::from_utf8(v)
                .map(str::to_owned)
                .map_err(ColumnError::other),
            ColumnValue::Null => Err(mismatch("String", value)),
        }
    }

    fn print(&self, out: &mut String) {
        let _ = write!(out, "{self:?}");
    }
}

impl FromColumn for char {
    fn from_column(value: ColumnValue<'_>) -> Result<Self, ColumnError> {
        let ColumnValue::Text(text) = value else {
            return Err(mismatch("char", value));
        };
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(ColumnError::Invalid(format!(
                "expected a single character, got {text:?}"
            ))),
        }
    }

    fn print(&self, out: &mut String) {
        let _ = write!(out, "{self:?}");
    }
}

impl FromColumn for Vec<u8> {
    fn from_column(value: ColumnValue<'_>) -> Result<Self, ColumnError> {
        match value {
            ColumnValue::Blob(v) => Ok(v.to_vec()),
            ColumnValue::Text(v) => Ok(v.as_bytes().to_vec()),
            other => Err(mismatch("Vec<u8>", other)),
        }
    }

    fn print(&self, out: &mut String) {
        let _ = write!(out, "{self:?}");
    }
}

impl<T: FromColumn> FromColumn for Option<T> {
    fn from_column(value: ColumnValue<'_>) -> Result<Self, ColumnError> {
        if value.is_null() {
            return Ok(None);
        }
        T::from_column(value).map(Some)
    }

    fn print(&self, out: &mut String) {
        match self {
            None => out.push_str("None"),
            Some(inner) => {
                out.push_str("Some(");
                inner.print(out);
                out.push(')');
            }
        }
    }
}

// -- Feature-gated types --

#[cfg(feature = "chrono")]
mod chrono_impls {
    use super::*;

    macro_rules! impl_from_column_parsed {
        ($($ty:ty),+) => { $(
            impl FromColumn for $ty {
                fn from_column(value: ColumnValue<'_>) -> Result<Self, ColumnError> {
                    match value {
                        ColumnValue::Text(v) => v
                            .parse()
                            .map_err(|e: chrono::ParseError| ColumnError::Invalid(e.to_string())),
                        other => Err(mismatch(stringify!($ty), other)),
                    }
                }

                fn print(&self, out: &mut String) {
                    let _ = write!(out, "{self:?}");
                }
            }
        )+ };
    }

    impl_from_column_parsed!(chrono::NaiveDate, chrono::NaiveTime, chrono::NaiveDateTime);

    impl FromColumn for chrono::DateTime<chrono::Utc> {
        fn from_column(value: ColumnValue<'_>) -> Result<Self, ColumnError> {
            match value {
                ColumnValue::Text(v) => chrono::DateTime::parse_from_rfc3339(v)
                    .map(|dt| dt.with_timezone(&chrono::Utc))
                    .map_err(|e| ColumnError::Invalid(e.to_string())),
                ColumnValue::Integer(secs) => chrono::DateTime::from_timestamp(secs, 0)
                    .ok_or(ColumnError::OutOfRange("DateTime<Utc>")),
                other => Err(mismatch("DateTime<Utc>", other)),
            }
        }

        fn print(&self, out: &mut String) {
            let _ = write!(out, "{}", self.to_rfc3339());
        }
    }
}

#[cfg(feature = "uuid")]
impl FromColumn for uuid::Uuid {
    fn from_column(value: ColumnValue<'_>) -> Result<Self, ColumnError> {
        match value {
            ColumnValue::Text(v) => uuid::Uuid::parse_str(v).map_err(ColumnError::other),
            ColumnValue::Blob(v) => uuid::Uuid::from_slice(v).map_err(ColumnError::other),
            other => Err(mismatch("Uuid", other)),
        }
    }

    fn print(&self, out: &mut String) {
        let _ = write!(out, "{self}");
    }
}
