//! Content digests for cached module files.
//!
//! Provides incremental hashing behind a minimal [`Hasher`] trait, the two
//! algorithms module descriptors use (md5 for integrity, sha256 for content
//! addressing), and [`hash_file`], which streams a file through a hasher.
//!
//! # Example
//!
//! ```
//! use modsync_verify::{Algorithm, Hasher, Md5Hasher};
//!
//! let mut hasher = Md5Hasher::new();
//! hasher.update(b"hello world");
//! assert_eq!(hex::encode(hasher.finalize()), "5eb63bbbe01eeed093cb22bb8f5acdc3");
//! assert_eq!(Algorithm::infer("5eb63bbbe01eeed093cb22bb8f5acdc3"), Algorithm::Md5);
//! ```

pub use self::error::{Result, VerificationError};
pub use self::file::{digest_matches, hash_file};
pub use self::hasher::{Algorithm, AnyHasher, Hasher, Md5Hasher, Sha256Hasher};

mod error;
mod file;
mod hasher;
