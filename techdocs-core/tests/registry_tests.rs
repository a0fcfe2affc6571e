//! Manifest discovery integration tests: module import, error messages,
//! usage-example extraction and config-driven module lists.

use std::path::PathBuf;

use assert_fs::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use techdocs_core::{
    config::RegistryConfig, discover, DiscoveryError, ManifestSource, TechniqueSource,
};

const BM25: &str = r#"
module: raglib.techniques.bm25
techniques:
  - key: bm25
    display_name: BM25
    category: retrieval
    description: Okapi BM25 lexical retrieval.
    version: 1.2.0
    implementing_type: BM25
    dependencies: [numpy]
"#;

const CHUNKER: &str = r#"
techniques:
  - key: fixed_size_chunker
    display_name: Fixed Size Chunker
    category: chunking
    description: Splits text into fixed windows.
    implementing_type: FixedSizeChunker
    doc: |
      Fixed-size chunking.

      Example:
          chunker = FixedSizeChunker(chunk_size=200)
          result = chunker.apply(document)

      Returns chunks.
"#;

fn project() -> assert_fs::TempDir {
    let root = assert_fs::TempDir::new().expect("tempdir");
    root.child("techniques/bm25.yaml").write_str(BM25).expect("write bm25");
    root.child("techniques/fixed_size_chunker.yaml")
        .write_str(CHUNKER)
        .expect("write chunker");
    root
}

// ---------------------------------------------------------------------------
// 1. Happy path
// ---------------------------------------------------------------------------

#[test]
fn discovers_every_manifest_sorted_by_file_name() {
    let root = project();
    let source = ManifestSource::new(root.path().join("techniques"));
    let records = discover(&source).expect("discover");

    let keys: Vec<&str> = records.iter().map(|r| r.key.0.as_str()).collect();
    assert_eq!(keys, vec!["bm25", "fixed_size_chunker"]);

    let bm25 = &records[0];
    assert_eq!(bm25.source_module, "raglib.techniques.bm25");
    assert_eq!(bm25.version, "1.2.0");
    assert!(bm25.dependencies.contains("numpy"));
    assert!(bm25.usage_example.is_none());
}

#[test]
fn module_path_and_version_default_when_omitted() {
    let root = project();
    let source = ManifestSource::new(root.path().join("techniques"));
    let records = discover(&source).expect("discover");
    let chunker = &records[1];
    assert_eq!(chunker.source_module, "techniques.fixed_size_chunker");
    assert_eq!(chunker.version, "1.0.0");
}

#[test]
fn usage_example_extracted_from_doc() {
    let root = project();
    let source = ManifestSource::new(root.path().join("techniques"));
    let records = discover(&source).expect("discover");
    assert_eq!(
        records[1].usage_example.as_deref(),
        Some("chunker = FixedSizeChunker(chunk_size=200)\nresult = chunker.apply(document)")
    );
}

#[test]
fn explicit_module_list_limits_imports() {
    let root = project();
    let config = RegistryConfig {
        modules: vec![PathBuf::from("bm25.yaml")],
        ..RegistryConfig::default()
    };
    let source = ManifestSource::from_config(root.path(), &config);
    assert_eq!(source.modules().expect("modules"), vec!["bm25.yaml"]);
    assert_eq!(discover(&source).expect("discover").len(), 1);
}

// ---------------------------------------------------------------------------
// 2. Failures
// ---------------------------------------------------------------------------

#[test]
fn missing_manifest_dir_is_source_unavailable() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    let source = ManifestSource::new(root.path().join("techniques"));
    let err = discover(&source).unwrap_err();
    assert!(matches!(err, DiscoveryError::SourceUnavailable { .. }), "got: {err}");
    assert!(predicate::str::contains("registry.manifest_dir").eval(&err.to_string()));
}

#[rstest]
#[case::malformed_yaml("techniques:\n  - key: [unclosed\n")]
#[case::missing_required_field("techniques:\n  - key: x\n    category: chunking\n")]
#[case::unknown_field("techniques: []\nplugins: []\n")]
fn broken_module_reports_its_path(#[case] body: &str) {
    let root = project();
    root.child("techniques/broken.yaml").write_str(body).expect("write");
    let source = ManifestSource::new(root.path().join("techniques"));

    let err = discover(&source).unwrap_err();
    match &err {
        DiscoveryError::ModuleImport { module, path, .. } => {
            assert_eq!(module, "broken.yaml");
            assert_eq!(path, &root.path().join("techniques/broken.yaml"));
        }
        other => panic!("expected module import error, got {other:?}"),
    }
    let expected = root.path().join("techniques").join("broken.yaml");
    assert!(predicate::str::contains(expected.display().to_string()).eval(&err.to_string()));
}

#[test]
fn discovery_leaves_manifests_untouched() {
    let root = project();
    let source = ManifestSource::new(root.path().join("techniques"));
    discover(&source).expect("discover");

    root.child("techniques/bm25.yaml").assert(BM25);
    root.child("techniques/fixed_size_chunker.yaml")
        .assert(predicate::str::contains("FixedSizeChunker(chunk_size=200)"));
    root.child("techniques/bm25.yaml.techdocs.tmp")
        .assert(predicate::path::missing());
}

#[test]
fn empty_manifests_are_an_empty_registry() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    root.child("techniques/empty.yaml")
        .write_str("techniques: []\n")
        .expect("write");
    let source = ManifestSource::new(root.path().join("techniques"));
    let err = discover(&source).unwrap_err();
    assert!(matches!(err, DiscoveryError::EmptyRegistry { modules: 1 }), "got: {err}");
}

#[test]
fn duplicate_key_across_files_is_rejected() {
    let root = project();
    root.child("techniques/zz_copy.yaml").write_str(BM25).expect("write");
    let source = ManifestSource::new(root.path().join("techniques"));
    let err = discover(&source).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("bm25.yaml") && msg.contains("zz_copy.yaml"), "got: {msg}");
}

#[test]
fn non_yaml_files_are_ignored() {
    let root = project();
    root.child("techniques/README.md").write_str("# notes\n").expect("write");
    let source = ManifestSource::new(root.path().join("techniques"));
    assert_eq!(source.modules().expect("modules").len(), 2);
}
