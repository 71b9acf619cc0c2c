// src/recipe/source.rs

//! Source selection: stable archive or development head

use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::recipe::format::Recipe;
use serde::Serialize;
use std::fmt;

/// Which source the installer asked for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SourceSelector {
    /// Latest stable release (the versioned archive)
    #[default]
    Stable,
    /// Development head of the declared branch
    Head,
}

/// A resolved source, carrying only what its fetch path needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SourceRef {
    /// Checksum-verifiable release snapshot
    Archive {
        url: String,
        version: String,
        #[serde(serialize_with = "serialize_hash")]
        checksum: Hash,
    },
    /// Moving branch reference; never integrity-checked
    Head { repository: String, branch: String },
}

impl SourceRef {
    pub fn is_head(&self) -> bool {
        matches!(self, SourceRef::Head { .. })
    }

    /// Checksum to verify against, if this source has one
    pub fn checksum(&self) -> Option<&Hash> {
        match self {
            SourceRef::Archive { checksum, .. } => Some(checksum),
            SourceRef::Head { .. } => None,
        }
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceRef::Archive { url, version, .. } => write!(f, "{} ({})", url, version),
            SourceRef::Head { repository, branch } => write!(f, "{} (branch {})", repository, branch),
        }
    }
}

fn serialize_hash<S: serde::Serializer>(hash: &Hash, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_str(&hash.to_prefixed_string())
}

impl Recipe {
    /// Resolve the source for the requested selector
    ///
    /// The stable path requires both an archive URL and a real checksum; a
    /// missing, malformed or placeholder checksum is an error rather than a
    /// reason to skip verification.
    pub fn resolve(&self, selector: SourceSelector) -> Result<SourceRef> {
        match selector {
            SourceSelector::Stable => {
                let url = self.archive_url().ok_or_else(|| {
                    Error::UnresolvableSource(format!(
                        "{} declares no versioned archive",
                        self.package.name
                    ))
                })?;

                let raw = self.source.checksum.as_deref().unwrap_or_default();
                let checksum = Hash::parse_prefixed(raw).map_err(|e| Error::InvalidChecksum {
                    value: raw.to_string(),
                    reason: e.to_string(),
                })?;

                Ok(SourceRef::Archive {
                    url,
                    version: self.package.version.clone(),
                    checksum,
                })
            }
            SourceSelector::Head => {
                let head = self.source.head.as_ref().ok_or_else(|| {
                    Error::UnresolvableSource(format!(
                        "{} declares no development head",
                        self.package.name
                    ))
                })?;

                if head.branch.trim().is_empty() {
                    return Err(Error::UnresolvableSource(format!(
                        "{} head has an empty branch name",
                        self.package.name
                    )));
                }

                Ok(SourceRef::Head {
                    repository: head.repository.clone(),
                    branch: head.branch.clone(),
                })
            }
        }
    }
}
