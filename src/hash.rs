// src/hash.rs

//! Digest computation and verification for source archives
//!
//! Recipes declare archive checksums as `algorithm:hex`. Two algorithms are
//! accepted:
//! - **SHA-256**: the default, and what bare 64-character digests mean
//! - **SHA-512**: for upstreams that only publish SHA-512 sums

use sha2::{Digest, Sha256, Sha512};
use std::fmt;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;

/// Digests recipe authors leave behind before filling in the real value
const PLACEHOLDER_MARKERS: &[&str] = &["replace", "todo", "fixme", "xxx", "changeme"];

/// Hash algorithm selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HashAlgorithm {
    #[default]
    Sha256,
    Sha512,
}

impl HashAlgorithm {
    /// Get the hash output length in bytes
    #[inline]
    pub const fn output_len(&self) -> usize {
        match self {
            Self::Sha256 => 32,
            Self::Sha512 => 64,
        }
    }

    /// Get the hash output length as a hex string
    #[inline]
    pub const fn hex_len(&self) -> usize {
        self.output_len() * 2
    }

    #[inline]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sha256" | "sha-256" => Ok(Self::Sha256),
            "sha512" | "sha-512" => Ok(Self::Sha512),
            _ => Err(HashError::UnknownAlgorithm(s.to_string())),
        }
    }
}

/// Hash parsing errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HashError {
    /// Unknown hash algorithm name
    UnknownAlgorithm(String),
    /// Hash string has wrong length for algorithm
    InvalidLength { expected: usize, got: usize },
    /// Hash string contains invalid hex characters
    InvalidHex(String),
    /// Digest is empty or an obvious placeholder
    Placeholder(String),
}

impl fmt::Display for HashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownAlgorithm(name) => write!(f, "unknown hash algorithm: {}", name),
            Self::InvalidLength { expected, got } => {
                write!(f, "invalid hash length: expected {}, got {}", expected, got)
            }
            Self::InvalidHex(s) => write!(f, "invalid hex in hash: {}", s),
            Self::Placeholder(s) if s.is_empty() => write!(f, "checksum is empty"),
            Self::Placeholder(s) => write!(f, "checksum {:?} is a placeholder, not a digest", s),
        }
    }
}

impl std::error::Error for HashError {}

/// A hash value with its algorithm
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Hash {
    pub algorithm: HashAlgorithm,
    /// Lowercase hex digest
    pub value: String,
}

impl Hash {
    /// Create a new hash value, validating length and hex digits
    pub fn new(algorithm: HashAlgorithm, value: impl Into<String>) -> Result<Self, HashError> {
        let value = value.into();
        let expected_len = algorithm.hex_len();

        if value.len() != expected_len {
            return Err(HashError::InvalidLength {
                expected: expected_len,
                got: value.len(),
            });
        }

        if !value.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(HashError::InvalidHex(value));
        }

        // An all-zero digest only ever appears as a stand-in
        if value.chars().all(|c| c == '0') {
            return Err(HashError::Placeholder(value));
        }

        Ok(Self {
            algorithm,
            value: value.to_lowercase(),
        })
    }

    fn new_unchecked(algorithm: HashAlgorithm, value: String) -> Self {
        Self { algorithm, value }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Parse a prefixed hash string (`sha256:abc...`); unprefixed means SHA-256
    pub fn parse_prefixed(s: &str) -> Result<Self, HashError> {
        let trimmed = s.trim();
        if trimmed.is_empty() || is_placeholder(trimmed) {
            return Err(HashError::Placeholder(trimmed.to_string()));
        }

        if let Some((algo, hash)) = trimmed.split_once(':') {
            let algorithm = algo.parse()?;
            Self::new(algorithm, hash)
        } else {
            Self::new(HashAlgorithm::Sha256, trimmed)
        }
    }

    /// Format as a prefixed string (e.g., "sha256:abc123...")
    pub fn to_prefixed_string(&self) -> String {
        format!("{}:{}", self.algorithm.name(), self.value)
    }

    /// File name used to store content with this digest in a cache
    pub fn cache_key(&self) -> String {
        format!("{}_{}", self.algorithm.name(), self.value)
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_prefixed_string())
    }
}

fn is_placeholder(s: &str) -> bool {
    let lower = s.to_lowercase();
    PLACEHOLDER_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Incremental hasher over either supported algorithm
pub struct Hasher {
    algorithm: HashAlgorithm,
    state: HasherState,
}

enum HasherState {
    Sha256(Sha256),
    Sha512(Sha512),
}

impl Hasher {
    pub fn new(algorithm: HashAlgorithm) -> Self {
        let state = match algorithm {
            HashAlgorithm::Sha256 => HasherState::Sha256(Sha256::new()),
            HashAlgorithm::Sha512 => HasherState::Sha512(Sha512::new()),
        };
        Self { algorithm, state }
    }

    pub fn update(&mut self, data: &[u8]) {
        match &mut self.state {
            HasherState::Sha256(hasher) => hasher.update(data),
            HasherState::Sha512(hasher) => hasher.update(data),
        }
    }

    pub fn finalize(self) -> Hash {
        let value = match self.state {
            HasherState::Sha256(hasher) => hex::encode(hasher.finalize()),
            HasherState::Sha512(hasher) => hex::encode(hasher.finalize()),
        };
        Hash::new_unchecked(self.algorithm, value)
    }
}

/// Compute hash of a byte slice
pub fn hash_bytes(algorithm: HashAlgorithm, data: &[u8]) -> Hash {
    let mut hasher = Hasher::new(algorithm);
    hasher.update(data);
    hasher.finalize()
}

/// Compute hash of data from a reader
pub fn hash_reader<R: Read>(algorithm: HashAlgorithm, reader: &mut R) -> io::Result<Hash> {
    let mut hasher = Hasher::new(algorithm);
    let mut buffer = [0u8; 8192];

    loop {
        let n = reader.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(hasher.finalize())
}

/// Compute the hash of a file, streaming its content
pub fn hash_file(algorithm: HashAlgorithm, path: &Path) -> io::Result<Hash> {
    let mut file = std::fs::File::open(path)?;
    hash_reader(algorithm, &mut file)
}

/// Verification result error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyError {
    pub expected: String,
    pub actual: String,
    pub algorithm: HashAlgorithm,
}

impl fmt::Display for VerifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} mismatch: expected {}, got {}",
            self.algorithm, self.expected, self.actual
        )
    }
}

impl std::error::Error for VerifyError {}

/// Verify bytes match an expected hash
///
/// # Example
/// ```
/// use lala_recipe::hash::{verify_bytes, Hash};
///
/// let expected = Hash::parse_prefixed(
///     "sha256:b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9",
/// )
/// .unwrap();
/// assert!(verify_bytes(b"hello world", &expected).is_ok());
/// ```
pub fn verify_bytes(data: &[u8], expected: &Hash) -> Result<(), VerifyError> {
    let actual = hash_bytes(expected.algorithm, data);
    verify_hash(expected, &actual)
}

/// Compare a computed hash against the expected one
///
/// Callers hash files themselves so that a read failure stays an I/O error
/// instead of being reported as a mismatch.
pub fn verify_hash(expected: &Hash, actual: &Hash) -> Result<(), VerifyError> {
    if actual.algorithm == expected.algorithm && actual.value == expected.value {
        Ok(())
    } else {
        Err(VerifyError {
            expected: expected.to_prefixed_string(),
            actual: actual.to_prefixed_string(),
            algorithm: expected.algorithm,
        })
    }
}
