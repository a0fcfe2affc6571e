//! Declared package version in a TOML manifest.
//!
//! Reads `version` from `[package]`, `[project]` or `[workspace.package]`
//! (first string value wins) and rewrites only that line, so comments and
//! formatting elsewhere survive.

use std::path::Path;

use crate::error::{io_err, ReleaseError};
use crate::version::ReleaseVersion;

const VERSION_TABLES: &[&[&str]] = &[&["package"], &["project"], &["workspace", "package"]];

/// Version string declared in the manifest at `path`.
pub fn read_declared_version(path: &Path) -> Result<String, ReleaseError> {
    let content = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    parse_declared_version(&content, path)
}

/// Version string declared in manifest `content`; `path` is used for errors.
pub fn parse_declared_version(content: &str, path: &Path) -> Result<String, ReleaseError> {
    declared_version(content, path).map(|(_, version)| version)
}

/// Replace the declared version in the manifest at `path`.
pub fn write_declared_version(path: &Path, version: &ReleaseVersion) -> Result<(), ReleaseError> {
    let content = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    let updated = set_declared_version(&content, path, &version.to_string())?;
    std::fs::write(path, updated).map_err(|e| io_err(path, e))?;
    tracing::info!(path = %path.display(), version = %version, "updated manifest version");
    Ok(())
}

/// `content` with the declared version replaced; `path` is used for errors.
pub fn set_declared_version(content: &str, path: &Path, version: &str) -> Result<String, ReleaseError> {
    let (table, _) = declared_version(content, path)?;
    let header = format!("[{}]", table.join("."));

    let mut in_table = false;
    let mut replaced = false;
    let mut out = String::with_capacity(content.len());
    for line in content.split_inclusive('\n') {
        let trimmed = line.trim();
        if trimmed.starts_with('[') {
            in_table = trimmed == header;
        } else if in_table && !replaced {
            if let Some(edited) = replace_version_value(line, version) {
                out.push_str(&edited);
                replaced = true;
                continue;
            }
        }
        out.push_str(line);
    }

    if replaced {
        Ok(out)
    } else {
        Err(ReleaseError::MissingVersion {
            path: path.to_path_buf(),
        })
    }
}

/// Table path and version of the first table declaring a string `version`.
fn declared_version(content: &str, path: &Path) -> Result<(&'static [&'static str], String), ReleaseError> {
    let doc: toml::Table = content.parse().map_err(|source| ReleaseError::ManifestParse {
        path: path.to_path_buf(),
        source,
    })?;

    for table in VERSION_TABLES {
        let mut node = Some(&doc);
        for key in *table {
            node = node.and_then(|t| t.get(*key)).and_then(|v| v.as_table());
        }
        if let Some(version) = node.and_then(|t| t.get("version")).and_then(|v| v.as_str()) {
            return Ok((*table, version.to_string()));
        }
    }
    Err(ReleaseError::MissingVersion {
        path: path.to_path_buf(),
    })
}

/// `version = "..."` with the quoted value swapped; `None` for any other line.
fn replace_version_value(line: &str, version: &str) -> Option<String> {
    let (key, rest) = line.split_once('=')?;
    if key.trim() != "version" {
        return None;
    }
    let open = rest.find('"')?;
    let close = open + 1 + rest[open + 1..].find('"')?;
    Some(format!(
        "{key}={}\"{version}\"{}",
        &rest[..open],
        &rest[close + 1..]
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CARGO: &str = "[package]\nname = \"raglib\"\nversion = \"1.2.3\" # keep me\n\n[dependencies]\nserde = { version = \"1\" }\n";

    #[test]
    fn reads_package_version() {
        let (table, version) = declared_version(CARGO, Path::new("Cargo.toml")).unwrap();
        assert_eq!(table, &["package"]);
        assert_eq!(version, "1.2.3");
    }

    #[test]
    fn rewrites_only_the_version_line() {
        let out = set_declared_version(CARGO, Path::new("Cargo.toml"), "1.3.0").unwrap();
        assert_eq!(
            out,
            "[package]\nname = \"raglib\"\nversion = \"1.3.0\" # keep me\n\n[dependencies]\nserde = { version = \"1\" }\n"
        );
    }

    #[test]
    fn pyproject_style_project_table() {
        let content = "[build-system]\nrequires = [\"setuptools\"]\n\n[project]\nname = \"rag-techlib\"\nversion = \"0.4.0\"\n";
        let out = set_declared_version(content, Path::new("pyproject.toml"), "0.5.0").unwrap();
        assert!(out.ends_with("version = \"0.5.0\"\n"));
    }

    #[test]
    fn workspace_inherited_version_falls_through() {
        let content = "[workspace.package]\nversion = \"2.0.0\"\n\n[package]\nname = \"x\"\nversion.workspace = true\n";
        let (table, version) = declared_version(content, Path::new("Cargo.toml")).unwrap();
        assert_eq!(table, &["workspace", "package"]);
        assert_eq!(version, "2.0.0");
        let out = set_declared_version(content, Path::new("Cargo.toml"), "2.1.0").unwrap();
        assert!(out.starts_with("[workspace.package]\nversion = \"2.1.0\"\n"));
        assert!(out.contains("version.workspace = true"));
    }

    #[test]
    fn missing_version_is_reported() {
        let err = declared_version("[package]\nname = \"x\"\n", Path::new("Cargo.toml")).unwrap_err();
        assert!(matches!(err, ReleaseError::MissingVersion { .. }));
    }

    #[test]
    fn malformed_manifest_is_a_parse_error() {
        let err = declared_version("[package\n", Path::new("Cargo.toml")).unwrap_err();
        assert!(matches!(err, ReleaseError::ManifestParse { .. }));
    }
}
