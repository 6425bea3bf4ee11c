//! The codec contract: fields that read a column their own way.
//!
//! A field marked `#[scan("name", codec)]` bypasses structural binding. The
//! binder hands it the raw column (NULL included) and the fingerprint asks
//! it for identity bytes instead of printing it.

use crate::error::ColumnError;
use crate::value::ColumnValue;

pub trait Codec {
    /// Read the raw column into `self`.
    fn scan(&mut self, value: ColumnValue<'_>) -> Result<(), ColumnError>;

    /// Bytes identifying the current value, or `None` when the value is unset.
    fn identity(&self) -> Option<Vec<u8>>;
}

/// Optional codecs: NULL leaves the field `None`, anything else is scanned
/// into a default-constructed inner codec.
impl<C: Codec + Default> Codec for Option<C> {
    fn scan(&mut self, value: ColumnValue<'_>) -> Result<(), ColumnError> {
        if value.is_null() {
            *self = None;
            return Ok(());
        }
        self.get_or_insert_with(C::default).scan(value)
    }

    fn identity(&self) -> Option<Vec<u8>> {
        self.as_ref().and_then(Codec::identity)
    }
}

/// A TEXT or BLOB column holding JSON, deserialized into `T`.
#[cfg(feature = "serde")]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Json<T>(pub T);

#[cfg(feature = "serde")]
impl<T> Codec for Json<T>
where
    T: serde::de::DeserializeOwned + serde::Serialize,
{
    fn scan(&mut self, value: ColumnValue<'_>) -> Result<(), ColumnError> {
        self.0 = match value {
            ColumnValue::Text(text) => serde_json::from_str(text).map_err(ColumnError::other)?,
            ColumnValue::Blob(bytes) => serde_json::from_slice(bytes).map_err(ColumnError::other)?,
            other => {
                return Err(ColumnError::TypeMismatch {
                    expected: "JSON",
                    found: other.type_name(),
                });
            }
        };
        Ok(())
    }

    /// Objects are rendered with sorted keys, so `T`'s map iteration order
    /// does not leak into the identity.
    fn identity(&self) -> Option<Vec<u8>> {
        serde_json::to_value(&self.0)
            .and_then(|value| serde_json::to_vec(&value))
            .ok()
    }
}
