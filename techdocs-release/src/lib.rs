//! # techdocs-release
//!
//! Release version manager: semver bumps, manifest and changelog edits, and
//! the tag/version consistency guard.
//!
//! ```rust
//! use techdocs_release::{assert_consistent, BumpKind, ReleaseVersion};
//!
//! let current = ReleaseVersion::parse("1.2.3").unwrap();
//! let next = current.bump(&BumpKind::Minor).unwrap();
//! assert_eq!(next.to_string(), "1.3.0");
//! assert!(assert_consistent("1.3.0", "v1.3.0").is_ok());
//! ```

pub mod changelog;
pub mod error;
pub mod manifest;
pub mod prepare;
pub mod tag;
pub mod version;

pub use error::ReleaseError;
pub use prepare::{check_release_tag, prepare_release, tag_name, ReleaseOptions, ReleaseReport};
pub use tag::{GitCli, Tagger};
pub use version::{assert_consistent, assert_consistent_with_prefix, bump, BumpKind, ReleaseVersion};
