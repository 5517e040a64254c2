use std::io::ErrorKind;
use std::path::Path;

use tokio::io::AsyncReadExt;

use crate::{Algorithm, Hasher, Result, VerificationError};

const CHUNK_SIZE: usize = 64 * 1024;

/// Hash the file at `path` and return the lowercase hex digest.
///
/// Returns `Ok(None)` when `path` is a directory: there is no content to hash.
pub async fn hash_file(path: impl AsRef<Path>, algorithm: Algorithm) -> Result<Option<String>> {
    let path = path.as_ref();
    let read_err = |e| VerificationError::Read {
        path:   path.to_path_buf(),
        source: e,
    };

    let metadata = tokio::fs::metadata(path).await.map_err(read_err)?;
    if metadata.is_dir() {
        return Ok(None);
    }

    let mut file = match tokio::fs::File::open(path).await {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::IsADirectory => return Ok(None),
        Err(e) => return Err(read_err(e)),
    };

    let mut hasher = algorithm.hasher();
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let n = match file.read(&mut buf).await {
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::IsADirectory => return Ok(None),
            Err(e) => return Err(read_err(e)),
        };
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(Some(hex::encode(hasher.finalize())))
}

/// Compare two hex digests, ignoring ASCII case and surrounding whitespace.
pub fn digest_matches(actual: &str, expected: &str) -> bool {
    actual.trim().eq_ignore_ascii_case(expected.trim())
}
