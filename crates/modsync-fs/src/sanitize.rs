use std::path::PathBuf;

use crate::{Error, Result};

/// Interpret `raw` as a path relative to some root.
///
/// Leading separators and `.` segments are dropped, so `/`, `./audio` and
/// `audio/` all stay inside the root. Both `/` and `\` separate segments.
/// Parent references, drive prefixes and NUL bytes are rejected.
pub fn relative_path(raw: &str) -> Result<PathBuf> {
    let unsafe_path = || Error::UnsafePath {
        raw: raw.to_string(),
    };

    if raw.contains('\0') {
        return Err(unsafe_path());
    }

    let mut out = PathBuf::new();
    for segment in raw.split(['/', '\\']) {
        match segment {
            "" | "." => continue,
            ".." => return Err(unsafe_path()),
            s if s.contains(':') => return Err(unsafe_path()),
            s => out.push(s),
        }
    }

    Ok(out)
}
