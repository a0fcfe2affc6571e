//! Shared fixtures: a small project tree and recording collaborators.

#![allow(dead_code)]

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use techdocs_core::DocsConfig;
use techdocs_sync::{CollaboratorError, Pipeline, PreviewServer, SiteBuilder};
use tempfile::TempDir;

pub const README: &str = "# raglib\n\nIntro text.\n\n<!-- techdocs:begin readme-techniques-section -->\n<!-- techdocs:end readme-techniques-section -->\n\nFooter.\n";

pub const REFERENCE: &str = "# Reference\n\n<!-- techdocs:begin reference-techniques-section -->\nstale\n<!-- techdocs:end reference-techniques-section -->\n\nHand-written notes.\n";

const RETRIEVAL: &str = r#"
module: raglib.techniques.bm25
techniques:
  - key: bm25
    display_name: BM25
    category: retrieval
    description: Okapi BM25 lexical retrieval.
    implementing_type: BM25
    dependencies: [numpy]
"#;

const CHUNKING: &str = r#"
module: raglib.techniques.fixed_size_chunker
techniques:
  - key: fixed_size_chunker
    display_name: Fixed Size Chunker
    category: chunking
    description: Splits text into fixed windows.
    implementing_type: FixedSizeChunker
    usage_example: |
      chunker = FixedSizeChunker(chunk_size=200)
"#;

pub fn project() -> TempDir {
    let root = TempDir::new().expect("tempdir");
    write(root.path(), "techniques/retrieval.yaml", RETRIEVAL);
    write(root.path(), "techniques/chunking.yaml", CHUNKING);
    write(root.path(), "README.md", README);
    write(root.path(), "docs/techniques.md", REFERENCE);
    write(root.path(), "mkdocs.yml", "site_name: raglib\n");
    root
}

pub fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("mkdir");
    }
    fs::write(path, content).expect("write");
}

pub fn read(root: &Path, rel: &str) -> String {
    fs::read_to_string(root.join(rel)).unwrap_or_else(|e| panic!("read {rel}: {e}"))
}

pub fn generated_paths(root: &Path) -> Vec<PathBuf> {
    DocsConfig::default().generated_artifacts(root)
}

/// Records every call; optionally fails.
#[derive(Clone, Default)]
pub struct Recorder {
    pub calls: Rc<RefCell<Vec<String>>>,
    pub fail: bool,
}

impl Recorder {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, what: &str, config_path: &Path) -> Result<(), CollaboratorError> {
        let name = config_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.calls.borrow_mut().push(format!("{what} {name}"));
        if self.fail {
            Err(CollaboratorError::Other(format!("{what} failed")))
        } else {
            Ok(())
        }
    }
}

impl SiteBuilder for Recorder {
    fn build(&self, config_path: &Path) -> Result<(), CollaboratorError> {
        self.record("build", config_path)?;
        if !self.fail {
            let site = config_path.with_file_name("site");
            fs::create_dir_all(site.join("assets")).expect("site dir");
        }
        Ok(())
    }
}

impl PreviewServer for Recorder {
    fn serve(&self, config_path: &Path) -> Result<(), CollaboratorError> {
        self.record("serve", config_path)
    }
}

pub fn pipeline(root: &Path, builder: &Recorder, server: &Recorder) -> Pipeline {
    Pipeline::new(root, DocsConfig::default())
        .expect("pipeline")
        .with_site_builder(builder.clone())
        .with_preview_server(server.clone())
}
