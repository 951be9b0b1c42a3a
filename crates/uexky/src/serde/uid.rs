use ::serde::{Deserializer, Serializer, de};
use core::fmt;

use crate::Uid;

/// Accepts a display string, a decimal string, or a non-negative integer.
///
/// Strings are read as display form first, so every string written by
/// [`as_display`] reads back as the same identifier even when it is made
/// only of digits.
struct UidVisitor {
    expecting: &'static str,
}

impl de::Visitor<'_> for UidVisitor {
    type Value = Uid;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.expecting)
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Uid::from_display(v)
            .or_else(|_| Uid::parse(v))
            .map_err(E::custom)
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Uid::from_raw(v).map_err(E::custom)
    }

    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Uid::from_i64(v).map_err(E::custom)
    }
}

pub mod as_display {
    use super::{Deserializer, Serializer, UidVisitor};
    use crate::Uid;

    /// Serialize an identifier as its display string.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying serializer fails.
    pub fn serialize<S>(id: &Uid, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(&id.to_display())
    }

    /// Deserialize an identifier from its display string.
    ///
    /// Integers are accepted as well, so that rows written in storage form
    /// can be read back through API types. Decimal strings are accepted when
    /// they are not also a valid display string.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying deserializer fails or the value is
    /// not a valid identifier.
    pub fn deserialize<'de, D>(d: D) -> Result<Uid, D::Error>
    where
        D: Deserializer<'de>,
    {
        d.deserialize_any(UidVisitor {
            expecting: "a uid display string",
        })
    }
}

pub mod as_storage {
    use super::{Deserializer, Serializer, UidVisitor};
    use crate::Uid;

    /// Serialize an identifier as its storage integer.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying serializer fails.
    pub fn serialize<S>(id: &Uid, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_u64(id.to_raw())
    }

    /// Deserialize an identifier from its storage integer.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying deserializer fails or the integer
    /// is outside the identifier range.
    pub fn deserialize<'de, D>(d: D) -> Result<Uid, D::Error>
    where
        D: Deserializer<'de>,
    {
        d.deserialize_u64(UidVisitor {
            expecting: "a uid storage integer",
        })
    }
}
