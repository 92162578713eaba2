#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{TempDir, tempdir};

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Path for the test's database file (not created until first open).
    pub fn db_path(&self) -> PathBuf {
        self.temp_dir.path().join("store.db")
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }

    /// Writes one line per slice entry, joining fields with `delimiter`.
    pub fn write_rows(&self, name: &str, delimiter: char, rows: &[&[&str]]) -> PathBuf {
        let contents = rows
            .iter()
            .map(|fields| fields.join(&delimiter.to_string()))
            .collect::<Vec<_>>()
            .join("\n");
        self.write(name, &format!("{contents}\n"))
    }
}
