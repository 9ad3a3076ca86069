//! The envelope identifier type.
//!
//! All envelope identifiers are random (version 4) UUIDs rendered in the
//! canonical 8-4-4-4-12 hyphenated form.

use uuid::{Uuid, Variant};

use crate::IdError;

/// Length of the canonical hyphenated form.
const CANONICAL_LEN: usize = 36;

/// Returns true if `value` is a canonical version-4 UUID string.
///
/// The accepted form is `8-4-4-4-12` hex digits separated by hyphens, where the
/// first digit of the third group is `4` and the first digit of the fourth
/// group is one of `8`, `9`, `a`, `b`. Hex digits are case-insensitive.
/// Braced, URN and unhyphenated forms are rejected.
#[must_use]
pub fn is_valid_uuid(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() != CANONICAL_LEN {
        return false;
    }

    bytes.iter().enumerate().all(|(i, &b)| match i {
        8 | 13 | 18 | 23 => b == b'-',
        14 => b == b'4',
        19 => matches!(b, b'8' | b'9' | b'a' | b'b' | b'A' | b'B'),
        _ => b.is_ascii_hexdigit(),
    })
}

/// A version-4 UUID.
///
/// Can only be constructed from a random v4 UUID, so any `Uuid4` renders to a
/// string that [`is_valid_uuid`] accepts. A parsed ID renders exactly as it
/// was received, letter case included; comparison and hashing ignore case.
#[derive(Clone, Copy)]
pub struct Uuid4 {
    uuid: Uuid,
    text: [u8; CANONICAL_LEN],
}

impl Uuid4 {
    /// Generates a fresh random ID.
    #[must_use]
    pub fn new() -> Self {
        Self::canonical(Uuid::new_v4())
    }

    /// Parses an ID from its canonical string form.
    pub fn parse(s: &str) -> Result<Self, IdError> {
        if s.is_empty() {
            return Err(IdError::Empty);
        }

        let invalid = || IdError::InvalidFormat {
            value: s.to_string(),
        };

        if !is_valid_uuid(s) {
            return Err(invalid());
        }

        let uuid = Uuid::parse_str(s).map_err(|_| invalid())?;
        let text = s.as_bytes().try_into().map_err(|_| invalid())?;
        Ok(Self { uuid, text })
    }

    /// Wraps a raw UUID, rejecting anything that is not version 4 with the
    /// RFC 4122 variant.
    pub fn from_uuid(uuid: Uuid) -> Result<Self, IdError> {
        if uuid.get_version_num() == 4 && uuid.get_variant() == Variant::RFC4122 {
            Ok(Self::canonical(uuid))
        } else {
            Err(IdError::InvalidFormat {
                value: uuid.to_string(),
            })
        }
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// Returns the lowercase hyphenated form, regardless of how it was received.
    #[must_use]
    pub fn to_canonical(&self) -> String {
        self.uuid.hyphenated().to_string()
    }

    fn canonical(uuid: Uuid) -> Self {
        let mut text = [0u8; CANONICAL_LEN];
        uuid.hyphenated().encode_lower(&mut text);
        Self { uuid, text }
    }
}

impl Default for Uuid4 {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Uuid4 {
    fn eq(&self, other: &Self) -> bool {
        self.uuid == other.uuid
    }
}

impl Eq for Uuid4 {}

impl PartialOrd for Uuid4 {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Uuid4 {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.uuid.cmp(&other.uuid)
    }
}

impl std::hash::Hash for Uuid4 {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.uuid.hash(state);
    }
}

impl std::fmt::Debug for Uuid4 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Uuid4({self})")
    }
}

impl std::fmt::Display for Uuid4 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use std::fmt::Write;

        // Only ASCII hex digits and hyphens are ever stored.
        self.text.iter().try_for_each(|&b| f.write_char(char::from(b)))
    }
}

impl std::str::FromStr for Uuid4 {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<Uuid> for Uuid4 {
    type Error = IdError;

    fn try_from(uuid: Uuid) -> Result<Self, Self::Error> {
        Self::from_uuid(uuid)
    }
}

impl From<Uuid4> for Uuid {
    fn from(id: Uuid4) -> Self {
        id.uuid
    }
}

impl AsRef<Uuid> for Uuid4 {
    fn as_ref(&self) -> &Uuid {
        &self.uuid
    }
}

impl serde::Serialize for Uuid4 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for Uuid4 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Tests
// =============================================================================
