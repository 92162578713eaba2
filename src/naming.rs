//! Table-name resolution for input files.
//!
//! A run names its destination tables in one of two ways: a single explicit
//! table shared by every input, or a regex applied to each file's base name
//! whose first capturing group is the table name.

use std::path::Path;

use regex::Regex;

use crate::error::IngestError;

#[derive(Debug, Clone)]
pub enum TableNaming {
    /// One table name for every input file; overrides any pattern.
    Explicit(String),
    /// Capture group 1 of this pattern, applied to each file's base name.
    Pattern(Regex),
}

impl TableNaming {
    /// Resolves the table name for `path`. Deterministic: the same path and
    /// naming always yield the same name within a run.
    pub fn resolve(&self, path: &Path) -> Result<String, IngestError> {
        match self {
            TableNaming::Explicit(name) => Ok(name.clone()),
            TableNaming::Pattern(pattern) => {
                let base = match path.file_name() {
                    Some(name) => name.to_string_lossy(),
                    None => path.to_string_lossy(),
                };
                let captures =
                    pattern
                        .captures(base.as_ref())
                        .ok_or_else(|| IngestError::NoMatch {
                            path: path.to_path_buf(),
                        })?;
                let group = captures.get(1).ok_or_else(|| IngestError::NoCapturingGroup {
                    path: path.to_path_buf(),
                })?;
                Ok(group.as_str().to_string())
            }
        }
    }
}
