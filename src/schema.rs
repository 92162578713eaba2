//! Schema reconciliation: binding an incoming file's field set to a
//! destination table.
//!
//! For each table name the reconciler decides between three outcomes: create
//! the table (one TEXT column per incoming field), reuse an existing table
//! whose column count is compatible under the active [`FieldCountPolicy`],
//! or reject the file with a field-count mismatch.
//!
//! Known limitation: when a table is reused, reconciliation compares column
//! *counts* only. Header-derived names that differ from the columns the table
//! was created with are accepted silently; names matter solely at creation
//! time.
//!
//! Schemas are cached per run. Once a table name has been resolved, every
//! later file mapping to it is reconciled against the cached schema without
//! another catalog read.

use std::collections::{HashMap, HashSet};

use log::{debug, info};

use crate::{cli::FieldCountPolicy, error::IngestError, ident, storage::Db};

/// Ordered column names taken from a header row or synthesized positionally.
#[derive(Debug, Clone)]
pub struct FieldSet {
    names: Vec<String>,
}

impl FieldSet {
    /// Column names from a header row. Tokens are kept verbatim, whitespace
    /// included; only a truly empty token gets a positional `field{N}` name
    /// so the created table stays loadable.
    pub fn from_header(tokens: &[String]) -> Self {
        let names = tokens
            .iter()
            .enumerate()
            .map(|(idx, token)| {
                if token.is_empty() {
                    synthetic_name(idx)
                } else {
                    token.clone()
                }
            })
            .collect();
        Self { names }
    }

    /// Synthetic `field1..fieldN` names for headerless files.
    pub fn positional(count: usize) -> Self {
        Self {
            names: (0..count).map(synthetic_name).collect(),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

fn synthetic_name(index: usize) -> String {
    format!("field{}", index + 1)
}

/// A destination table's shape, either freshly created this run or read back
/// from the catalog.
#[derive(Debug, Clone)]
pub struct TableSchema {
    pub table: String,
    pub columns: Vec<String>,
}

impl TableSchema {
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}

/// Run-scoped table-name → schema map, owned by the orchestrator and passed
/// into [`reconcile`] so runs and tests stay isolated.
#[derive(Debug, Default)]
pub struct SchemaCache {
    entries: HashMap<String, TableSchema>,
}

impl SchemaCache {
    pub fn get(&self, table: &str) -> Option<&TableSchema> {
        self.entries.get(table)
    }

    fn insert(&mut self, schema: TableSchema) -> &TableSchema {
        let table = schema.table.clone();
        self.entries.entry(table).insert_entry(schema).into_mut()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolves the schema for `table` and checks `incoming` against it.
///
/// Cache hits never touch the database. On a miss the catalog is consulted;
/// an absent table is created with `incoming.len()` TEXT columns.
pub fn reconcile(
    db: &Db,
    cache: &mut SchemaCache,
    table: &str,
    incoming: &FieldSet,
    policy: FieldCountPolicy,
) -> Result<TableSchema, IngestError> {
    if let Some(schema) = cache.get(table) {
        debug!("schema cache hit for table '{table}'");
        check_field_count(schema, incoming.len(), policy)?;
        return Ok(schema.clone());
    }

    let schema = match db.table_columns(table)? {
        Some(columns) => {
            debug!(
                "reusing existing table '{table}' with {} column(s)",
                columns.len()
            );
            TableSchema {
                table: table.to_string(),
                columns,
            }
        }
        None => {
            reject_quoted_collisions(table, incoming)?;
            db.create_table(table, incoming.names())?;
            info!(
                "Created table '{table}' with {} text column(s)",
                incoming.len()
            );
            TableSchema {
                table: table.to_string(),
                columns: incoming.names().to_vec(),
            }
        }
    };
    check_field_count(&schema, incoming.len(), policy)?;
    Ok(cache.insert(schema).clone())
}

fn check_field_count(
    schema: &TableSchema,
    found: usize,
    policy: FieldCountPolicy,
) -> Result<(), IngestError> {
    let expected = schema.column_count();
    let compatible = if found == expected {
        true
    } else if found > expected {
        // extra trailing fields are dropped on load
        policy != FieldCountPolicy::Strict
    } else {
        // missing trailing fields become NULL, opt-in only
        policy == FieldCountPolicy::AllowLesser
    };
    if compatible {
        Ok(())
    } else {
        Err(IngestError::FieldCountMismatch {
            table: schema.table.clone(),
            expected,
            found,
        })
    }
}

/// Two header tokens that quote to the same identifier would produce a
/// CREATE TABLE with duplicate columns; fail up front instead.
fn reject_quoted_collisions(table: &str, incoming: &FieldSet) -> Result<(), IngestError> {
    let mut seen = HashSet::with_capacity(incoming.len());
    for name in incoming.names() {
        let quoted = ident::quote(name)?;
        if !seen.insert(quoted) {
            return Err(IngestError::Identifier(format!("{table}.{name}")));
        }
    }
    Ok(())
}
