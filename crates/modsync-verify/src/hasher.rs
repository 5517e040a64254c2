use std::fmt;
use std::str::FromStr;

use sha2::Digest;

use crate::VerificationError;

pub trait Hasher: Send {
    fn update(&mut self, data: &[u8]);
    fn finalize(self) -> Vec<u8>;
}

pub struct Md5Hasher(md5::Context);

impl Hasher for Md5Hasher {
    fn update(&mut self, data: &[u8]) { self.0.consume(data); }
    fn finalize(self) -> Vec<u8> { self.0.compute().0.to_vec() }
}

impl Default for Md5Hasher {
    fn default() -> Self { Self::new() }
}

impl Md5Hasher {
    pub fn new() -> Self { Self(md5::Context::new()) }

    pub fn digest(data: &[u8]) -> Vec<u8> { md5::compute(data).0.to_vec() }
}

pub struct Sha256Hasher(sha2::Sha256);

impl Hasher for Sha256Hasher {
    fn update(&mut self, data: &[u8]) { self.0.update(data); }
    fn finalize(self) -> Vec<u8> { self.0.finalize().to_vec() }
}

impl Default for Sha256Hasher {
    fn default() -> Self { Self::new() }
}

impl Sha256Hasher {
    pub fn new() -> Self { Self(sha2::Sha256::new()) }

    pub fn digest(data: &[u8]) -> Vec<u8> { sha2::Sha256::digest(data).to_vec() }
}

/// Digest algorithms understood by the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Algorithm {
    /// 128-bit digest used for integrity checks.
    #[default]
    Md5,
    /// 256-bit digest used to content-address bundled files.
    Sha256,
}

impl Algorithm {
    /// Guess the algorithm that produced `hex_digest` from its length,
    /// falling back to md5.
    pub fn infer(hex_digest: &str) -> Self {
        match hex_digest.trim().len() {
            64 => Self::Sha256,
            _ => Self::Md5,
        }
    }

    pub fn hasher(self) -> AnyHasher {
        match self {
            Self::Md5 => AnyHasher::Md5(Md5Hasher::new()),
            Self::Sha256 => AnyHasher::Sha256(Sha256Hasher::new()),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha256 => "sha256",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for Algorithm {
    type Err = VerificationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "md5" => Ok(Self::Md5),
            "sha256" | "sha-256" => Ok(Self::Sha256),
            _ => Err(VerificationError::UnknownAlgorithm(s.to_string())),
        }
    }
}

/// A hasher picked at runtime.
pub enum AnyHasher {
    Md5(Md5Hasher),
    Sha256(Sha256Hasher),
}

impl Hasher for AnyHasher {
    fn update(&mut self, data: &[u8]) {
        match self {
            Self::Md5(h) => h.update(data),
            Self::Sha256(h) => h.update(data),
        }
    }

    fn finalize(self) -> Vec<u8> {
        match self {
            Self::Md5(h) => h.finalize(),
            Self::Sha256(h) => h.finalize(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hasher() {
        let mut hasher = Sha256Hasher::new();
        hasher.update(b"hello ");
        hasher.update(b"world");
        let hash = hasher.finalize();

        let expected =
            hex::decode("b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9")
                .unwrap();
        assert_eq!(hash, expected);
        assert_eq!(Sha256Hasher::digest(b"hello world"), expected);
    }

    #[test]
    fn test_md5_hasher_incremental() {
        let mut hasher = Md5Hasher::new();
        hasher.update(b"hello");
        hasher.update(b" world");
        assert_eq!(hasher.finalize(), Md5Hasher::digest(b"hello world"));
    }

    #[test]
    fn test_infer_algorithm() {
        assert_eq!(Algorithm::infer("c9e41a13832d7062fc8a3604d715e45a"), Algorithm::Md5);
        assert_eq!(
            Algorithm::infer("0c656b87d8f8214bfd9bb724107ab454a6cf52676f85886dd6070f9773b88dd6"),
            Algorithm::Sha256
        );
        assert_eq!(Algorithm::infer("not-a-digest"), Algorithm::Md5);
    }

    #[test]
    fn test_parse_algorithm() {
        assert_eq!("SHA256".parse::<Algorithm>().unwrap(), Algorithm::Sha256);
        assert!("crc32".parse::<Algorithm>().is_err());
    }
}
