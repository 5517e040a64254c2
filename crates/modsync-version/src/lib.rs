//! Semantic version handling for module manifests.
//!
//! Manifests written by different tools disagree on version spelling
//! (`v1.2`, ` 1.2.0 `, `1.2.0`). [`SemVer::parse_lenient`] normalizes all of
//! them through a single parser so installed and bundled versions compare
//! on equal footing.

pub use self::semver::{SemVer, VersionError};

mod semver;
