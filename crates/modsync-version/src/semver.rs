//! Semantic Versioning wrapper.

use std::ops::Deref;

use semver::Version;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VersionError {
    #[error("invalid semver '{input}': {source}")]
    SemVer {
        input:  String,
        source: semver::Error,
    },
}

/// Semantic Versioning wrapper.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SemVer(Version);

impl SemVer {
    /// Create new SemVer.
    pub fn new(major: u64, minor: u64, patch: u64) -> Self { Self(Version::new(major, minor, patch)) }

    /// `0.0.0`, the version assumed when a manifest is missing or silent.
    pub fn zero() -> Self { Self::new(0, 0, 0) }

    /// Parse a version after normalizing common spellings.
    ///
    /// Surrounding whitespace and a leading `v`/`=` are stripped, and a
    /// missing minor or patch component is filled with `0`, so `v1.2` parses
    /// as `1.2.0`. An empty string is `0.0.0`.
    pub fn parse_lenient(input: &str) -> Result<Self, VersionError> {
        let trimmed = input.trim();
        let trimmed = trimmed
            .strip_prefix(['v', 'V', '='])
            .unwrap_or(trimmed)
            .trim_start();
        if trimmed.is_empty() {
            return Ok(Self::zero());
        }

        // Split off pre-release/build metadata before padding the core.
        let split_at = trimmed.find(['-', '+']).unwrap_or(trimmed.len());
        let (core, rest) = trimmed.split_at(split_at);
        let padded = match core.split('.').count() {
            1 => format!("{core}.0.0{rest}"),
            2 => format!("{core}.0{rest}"),
            _ => trimmed.to_string(),
        };

        Version::parse(&padded).map(Self).map_err(|source| VersionError::SemVer {
            input: input.to_string(),
            source,
        })
    }

    /// Parse an optional version, defaulting to `0.0.0` when absent.
    pub fn parse_or_zero(input: Option<&str>) -> Result<Self, VersionError> {
        input.map_or_else(|| Ok(Self::zero()), Self::parse_lenient)
    }

    /// Access underlying semver crate Version.
    pub fn inner(&self) -> &Version { &self.0 }
}

impl Default for SemVer {
    fn default() -> Self { Self::zero() }
}

impl std::str::FromStr for SemVer {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> { Self::parse_lenient(s) }
}

impl std::fmt::Display for SemVer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{}", self.0) }
}

impl Deref for SemVer {
    type Target = Version;

    fn deref(&self) -> &Self::Target { &self.0 }
}

impl From<Version> for SemVer {
    fn from(v: Version) -> Self { Self(v) }
}

impl Serialize for SemVer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SemVer {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse_lenient(&raw).map_err(serde::de::Error::custom)
    }
}
