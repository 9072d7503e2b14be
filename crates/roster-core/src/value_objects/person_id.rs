//! Person identifier - platform account ID or generated manual-entry ID
//!
//! Platform IDs are Discord snowflakes (all digits). Manual entries get a
//! `m_`-prefixed UUID so the two ID spaces can never collide, and so a glance
//! at a stored key tells which kind of record it belongs to.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::snowflake::Snowflake;

/// Manual-entry ID prefix. Platform IDs are purely numeric, so any prefixed
/// string is unambiguous.
const MANUAL_PREFIX: &str = "m_";

/// Identifier of a person within a guild
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PersonId {
    /// A real platform account
    Platform(Snowflake),
    /// A manually-entered sponsor with no platform account backing it
    Manual(String),
}

impl PersonId {
    /// Generate a fresh manual-entry ID. UUIDv4 gives 122 random bits, so
    /// collision within a guild is not a practical concern.
    pub fn new_manual() -> Self {
        Self::Manual(format!("{MANUAL_PREFIX}{}", uuid::Uuid::new_v4().simple()))
    }

    /// Parse from the stored string form
    pub fn parse(s: &str) -> Result<Self, PersonIdParseError> {
        if let Some(rest) = s.strip_prefix(MANUAL_PREFIX) {
            if rest.is_empty() || !rest.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(PersonIdParseError::InvalidFormat);
            }
            return Ok(Self::Manual(s.to_string()));
        }
        Snowflake::parse(s)
            .map(Self::Platform)
            .map_err(|_| PersonIdParseError::InvalidFormat)
    }

    /// Is this a platform-backed identifier?
    #[inline]
    pub fn is_platform(&self) -> bool {
        matches!(self, Self::Platform(_))
    }

    /// The platform snowflake, if this is a platform identifier
    pub fn as_platform(&self) -> Option<Snowflake> {
        match self {
            Self::Platform(id) => Some(*id),
            Self::Manual(_) => None,
        }
    }
}

/// Error when parsing a PersonId from string
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PersonIdParseError {
    #[error("invalid person id format")]
    InvalidFormat,
}

impl From<Snowflake> for PersonId {
    fn from(id: Snowflake) -> Self {
        Self::Platform(id)
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Platform(id) => write!(f, "{id}"),
            Self::Manual(id) => f.write_str(id),
        }
    }
}

impl std::str::FromStr for PersonId {
    type Err = PersonIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PersonId::parse(s)
    }
}

impl Serialize for PersonId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for PersonId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PersonId::parse(&s).map_err(serde::de::Error::custom)
    }
}
