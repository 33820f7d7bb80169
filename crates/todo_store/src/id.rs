//! Entity identifier.

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Number of raw bytes in an identifier.
pub const ID_BYTES: usize = 12;

/// Length of the canonical hexadecimal form.
pub const ID_LEN: usize = ID_BYTES * 2;

/// Unique identifier for a page or an item.
///
/// Identifiers are 96-bit random values that are:
/// - Unique within a store
/// - Immutable once assigned
/// - Rendered as 24 lowercase hexadecimal characters
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId([u8; ID_BYTES]);

impl EntityId {
    /// Creates an entity ID from raw bytes.
    #[inline]
    #[must_use]
    pub const fn from_bytes(bytes: [u8; ID_BYTES]) -> Self {
        Self(bytes)
    }

    /// Creates a new random entity ID.
    #[must_use]
    pub fn new() -> Self {
        let entropy = Uuid::new_v4().into_bytes();
        let mut bytes = [0u8; ID_BYTES];
        bytes.copy_from_slice(&entropy[..ID_BYTES]);
        Self(bytes)
    }

    /// Returns the raw bytes.
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; ID_BYTES] {
        &self.0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({self})")
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Error returned when a string is not a canonical identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseIdError {
    /// The input was empty.
    #[error("identifier is empty")]
    Empty,

    /// The input had the wrong length.
    #[error("identifier must be {ID_LEN} characters, got {0}")]
    InvalidLength(usize),

    /// The input contained a non-hexadecimal character.
    #[error("identifier contains non-hexadecimal character {0:?}")]
    InvalidCharacter(char),
}

impl FromStr for EntityId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ParseIdError::Empty);
        }
        if s.len() != ID_LEN {
            return Err(ParseIdError::InvalidLength(s.chars().count()));
        }

        let mut bytes = [0u8; ID_BYTES];
        let mut chars = s.chars();
        for byte in &mut bytes {
            let hi = hex_value(chars.next())?;
            let lo = hex_value(chars.next())?;
            *byte = (hi << 4) | lo;
        }
        Ok(Self(bytes))
    }
}

fn hex_value(c: Option<char>) -> Result<u8, ParseIdError> {
    // Length was checked by the caller, so `None` cannot occur for ASCII input.
    let c = c.ok_or(ParseIdError::InvalidLength(0))?;
    c.to_digit(16)
        .map(|d| d as u8)
        .ok_or(ParseIdError::InvalidCharacter(c))
}

impl From<[u8; ID_BYTES]> for EntityId {
    fn from(bytes: [u8; ID_BYTES]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<EntityId> for [u8; ID_BYTES] {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

impl Serialize for EntityId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IdVisitor;

        impl Visitor<'_> for IdVisitor {
            type Value = EntityId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "a {ID_LEN}-character hexadecimal identifier")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(IdVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn new_is_unique() {
        let id1 = EntityId::new();
        let id2 = EntityId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn display_is_canonical() {
        let id = EntityId::from_bytes([0xab; ID_BYTES]);
        let s = id.to_string();
        assert_eq!(s.len(), ID_LEN);
        assert_eq!(s, "abababababababababababab");
    }

    #[test]
    fn parse_accepts_either_case() {
        let lower: EntityId = "0123456789abcdef01234567".parse().unwrap();
        let upper: EntityId = "0123456789ABCDEF01234567".parse().unwrap();
        assert_eq!(lower, upper);
        assert_eq!(lower.to_string(), "0123456789abcdef01234567");
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert_eq!("".parse::<EntityId>(), Err(ParseIdError::Empty));
        assert_eq!(
            "abc".parse::<EntityId>(),
            Err(ParseIdError::InvalidLength(3))
        );
        assert_eq!(
            "0123456789abcdef0123456z".parse::<EntityId>(),
            Err(ParseIdError::InvalidCharacter('z'))
        );
        // 24 bytes but multi-byte characters
        assert!("ééééééééééää".parse::<EntityId>().is_err());
    }

    #[test]
    fn serde_uses_string_form() {
        let id: EntityId = "00112233445566778899aabb".parse().unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"00112233445566778899aabb\"");
        let back: EntityId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_str::<EntityId>("\"nope\"").is_err());
    }

    proptest! {
        #[test]
        fn display_parses_back(bytes in prop::array::uniform12(any::<u8>())) {
            let id = EntityId::from_bytes(bytes);
            prop_assert_eq!(id.to_string().parse::<EntityId>(), Ok(id));
        }
    }
}
