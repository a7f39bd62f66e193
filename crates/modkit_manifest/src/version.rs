//! Engine version numbers and compatibility ranges declared by packages.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A `major.minor` engine version.
///
/// Ordering is lexicographic on `(major, minor)`, so `0.19 < 0.20 < 1.0`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EngineVersion {
    pub major: u32,
    pub minor: u32,
}

impl EngineVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for EngineVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for EngineVersion {
    type Err = Error;

    /// Parses `"major.minor"`. A bare `"major"` is accepted and means `major.0`.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let invalid = || Error::InvalidVersion(s.to_string());

        let (major, minor) = match trimmed.split_once('.') {
            Some((major, minor)) => (major, minor),
            None => (trimmed, "0"),
        };

        let major = major.parse::<u32>().map_err(|_| invalid())?;
        let minor = minor.parse::<u32>().map_err(|_| invalid())?;
        Ok(Self { major, minor })
    }
}

/// The bound of a [`VersionRange`] that a version falls outside of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundViolation {
    /// The version is older than the declared minimum.
    Below(EngineVersion),
    /// The version is newer than the declared maximum.
    Above(EngineVersion),
}

impl fmt::Display for BoundViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundViolation::Below(min) => write!(f, "requires at least {}", min),
            BoundViolation::Above(max) => write!(f, "requires at most {}", max),
        }
    }
}

/// Inclusive engine compatibility range. A missing bound is open on that side.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VersionRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<EngineVersion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<EngineVersion>,
}

impl VersionRange {
    pub fn contains(&self, version: EngineVersion) -> bool {
        self.violation(version).is_none()
    }

    /// Returns the bound `version` violates, checking the minimum first.
    pub fn violation(&self, version: EngineVersion) -> Option<BoundViolation> {
        if let Some(min) = self.min {
            if version < min {
                return Some(BoundViolation::Below(min));
            }
        }
        if let Some(max) = self.max {
            if version > max {
                return Some(BoundViolation::Above(max));
            }
        }
        None
    }

    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = |bound: Option<EngineVersion>| match bound {
            Some(v) => v.to_string(),
            None => "*".to_string(),
        };
        write!(f, "[{}, {}]", side(self.min), side(self.max))
    }
}
