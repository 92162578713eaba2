//! Error taxonomy for the import engine.
//!
//! Row-level insert failures are not represented here: the loader logs them,
//! counts the row as skipped, and moves on. Everything in [`IngestError`] is
//! fatal for at least the file being processed; `Storage` raised while opening
//! the database is fatal for the whole run.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    /// The naming pattern did not match the file's base name.
    #[error("pattern did not match file name of {path:?}")]
    NoMatch { path: PathBuf },

    /// The naming pattern matched but carries no capturing group to extract
    /// a table name from.
    #[error("pattern matched {path:?} but has no capturing group for the table name")]
    NoCapturingGroup { path: PathBuf },

    /// Incoming field count is incompatible with the table's column count
    /// under the active field-count policy.
    #[error("table '{table}' has {expected} column(s) but the file supplies {found} field(s)")]
    FieldCountMismatch {
        table: String,
        expected: usize,
        found: usize,
    },

    /// A table or column name that cannot be represented as a quoted SQL
    /// identifier, or that collides with another column after quoting.
    #[error("'{0}' cannot be used as a SQL identifier")]
    Identifier(String),

    #[error("database error: {0}")]
    Storage(#[from] rusqlite::Error),
}
