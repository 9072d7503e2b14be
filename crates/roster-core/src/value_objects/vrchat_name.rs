//! VRChat display name validation
//!
//! VRChat accepts arbitrary Unicode display names, so the only rules are
//! whitespace normalization and a length cap counted in code points.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

/// Maximum name length in Unicode code points
pub const MAX_NAME_LEN: usize = 64;

/// Normalize raw input: trim, collapse internal whitespace runs to a single
/// space. Idempotent: `sanitize_name(sanitize_name(s)) == sanitize_name(s)`.
pub fn sanitize_name(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A validated VRChat display name (1-64 code points after normalization)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VrchatName(String);

impl VrchatName {
    /// Sanitize and validate raw input
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let name = sanitize_name(raw);
        if name.is_empty() {
            return Err(DomainError::EmptyName);
        }
        let len = name.chars().count();
        if len > MAX_NAME_LEN {
            return Err(DomainError::NameTooLong { len });
        }
        Ok(Self(name))
    }

    /// Borrow the validated name
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Take ownership of the validated name
    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for VrchatName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VrchatName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
