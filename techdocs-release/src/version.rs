//! Release versions and bump rules.

use std::fmt;
use std::str::FromStr;

use semver::{BuildMetadata, Version};

use crate::error::ReleaseError;

/// A `MAJOR.MINOR.PATCH[-PRERELEASE]` version, ordered by semver precedence.
///
/// Immutable; [`ReleaseVersion::bump`] returns a new value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReleaseVersion(Version);

impl ReleaseVersion {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self(Version::new(major, minor, patch))
    }

    /// Parse a version string. Build metadata is rejected because it does not
    /// take part in precedence.
    pub fn parse(input: &str) -> Result<Self, ReleaseError> {
        let version = Version::parse(input.trim()).map_err(|e| ReleaseError::InvalidVersion {
            input: input.to_string(),
            reason: e.to_string(),
        })?;
        if version.build != BuildMetadata::EMPTY {
            return Err(ReleaseError::InvalidVersion {
                input: input.to_string(),
                reason: "build metadata is not supported".to_string(),
            });
        }
        Ok(Self(version))
    }

    pub fn major(&self) -> u64 {
        self.0.major
    }

    pub fn minor(&self) -> u64 {
        self.0.minor
    }

    pub fn patch(&self) -> u64 {
        self.0.patch
    }

    pub fn prerelease(&self) -> Option<&str> {
        if self.0.pre.is_empty() {
            None
        } else {
            Some(self.0.pre.as_str())
        }
    }

    /// Next version for `kind`; always strictly greater than `self`.
    pub fn bump(&self, kind: &BumpKind) -> Result<ReleaseVersion, ReleaseError> {
        let overflow = || ReleaseError::Overflow {
            version: self.to_string(),
        };
        let v = &self.0;
        let next = match kind {
            BumpKind::Major => Version::new(v.major.checked_add(1).ok_or_else(overflow)?, 0, 0),
            BumpKind::Minor => Version::new(v.major, v.minor.checked_add(1).ok_or_else(overflow)?, 0),
            BumpKind::Patch => {
                Version::new(v.major, v.minor, v.patch.checked_add(1).ok_or_else(overflow)?)
            }
            BumpKind::Explicit(requested) => {
                let requested = ReleaseVersion::parse(requested)?;
                if requested <= *self {
                    return Err(ReleaseError::VersionOrder {
                        current: self.to_string(),
                        requested: requested.to_string(),
                    });
                }
                return Ok(requested);
            }
        };
        Ok(Self(next))
    }
}

impl fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ReleaseVersion {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// How to derive the next version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BumpKind {
    Major,
    Minor,
    Patch,
    /// A specific version, which must be greater than the current one.
    Explicit(String),
}

impl FromStr for BumpKind {
    type Err = ReleaseError;

    /// `major`, `minor`, `patch`, or anything that parses as a version.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "major" => Ok(BumpKind::Major),
            "minor" => Ok(BumpKind::Minor),
            "patch" => Ok(BumpKind::Patch),
            other => {
                ReleaseVersion::parse(other)?;
                Ok(BumpKind::Explicit(other.trim().to_string()))
            }
        }
    }
}

impl fmt::Display for BumpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BumpKind::Major => f.write_str("major"),
            BumpKind::Minor => f.write_str("minor"),
            BumpKind::Patch => f.write_str("patch"),
            BumpKind::Explicit(v) => f.write_str(v),
        }
    }
}

/// Free-function form of [`ReleaseVersion::bump`].
pub fn bump(current: &ReleaseVersion, kind: &BumpKind) -> Result<ReleaseVersion, ReleaseError> {
    current.bump(kind)
}

/// Fail unless `declared` equals `tag` with a leading `v` stripped.
pub fn assert_consistent(declared: &str, tag: &str) -> Result<(), ReleaseError> {
    assert_consistent_with_prefix(declared, tag, 'v')
}

/// [`assert_consistent`] with a configurable tag prefix.
pub fn assert_consistent_with_prefix(declared: &str, tag: &str, prefix: char) -> Result<(), ReleaseError> {
    let bare = tag.strip_prefix(prefix).unwrap_or(tag);
    if declared == bare {
        Ok(())
    } else {
        Err(ReleaseError::VersionMismatch {
            declared: declared.to_string(),
            tag: tag.to_string(),
        })
    }
}
