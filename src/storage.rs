//! SQLite collaborator: connection handling, catalog reads, table DDL,
//! prepared row inserts, and transaction control.
//!
//! All SQL emitted here quotes identifiers through [`crate::ident`] and binds
//! row values as parameters; values are never interpolated into statement
//! text.

use std::path::Path;

use itertools::Itertools;
use log::debug;
use rusqlite::{Connection, params_from_iter};

use crate::{error::IngestError, ident};

pub struct Db {
    conn: Connection,
}

impl Db {
    pub fn open(path: &Path) -> Result<Self, IngestError> {
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self, IngestError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn table_exists(&self, table: &str) -> Result<bool, IngestError> {
        let mut stmt = self
            .conn
            .prepare("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1")?;
        Ok(stmt.exists([table])?)
    }

    /// Ordered column names of `table`, or `None` when the table does not
    /// exist. `pragma table_info` returns no rows for unknown tables.
    pub fn table_columns(&self, table: &str) -> Result<Option<Vec<String>>, IngestError> {
        let sql = format!("pragma table_info({})", ident::quote(table)?);
        debug!("running: {sql}");
        let mut stmt = self.conn.prepare(&sql)?;
        let columns = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<Result<Vec<_>, _>>()?;
        if columns.is_empty() {
            Ok(None)
        } else {
            Ok(Some(columns))
        }
    }

    /// Creates `table` with one TEXT column per name.
    pub fn create_table(&self, table: &str, columns: &[String]) -> Result<(), IngestError> {
        let column_defs = columns
            .iter()
            .map(|name| ident::quote(name).map(|quoted| format!("{quoted} TEXT")))
            .collect::<Result<Vec<_>, _>>()?;
        let sql = format!(
            "CREATE TABLE {} ({})",
            ident::quote(table)?,
            column_defs.iter().join(", ")
        );
        debug!("running: {sql}");
        self.conn.execute(&sql, [])?;
        Ok(())
    }

    pub fn drop_table(&self, table: &str) -> Result<(), IngestError> {
        let sql = format!("DROP TABLE IF EXISTS {}", ident::quote(table)?);
        debug!("running: {sql}");
        self.conn.execute(&sql, [])?;
        Ok(())
    }

    pub fn row_count(&self, table: &str) -> Result<i64, IngestError> {
        let sql = format!("SELECT count(*) FROM {}", ident::quote(table)?);
        Ok(self.conn.query_row(&sql, [], |row| row.get(0))?)
    }

    pub fn begin(&self) -> Result<(), IngestError> {
        self.conn.execute_batch("BEGIN")?;
        Ok(())
    }

    pub fn commit(&self) -> Result<(), IngestError> {
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }

    pub fn rollback(&self) -> Result<(), IngestError> {
        self.conn.execute_batch("ROLLBACK")?;
        Ok(())
    }

    /// Prepares one parameterized INSERT covering every column of `table`.
    pub fn inserter(
        &self,
        table: &str,
        columns: &[String],
    ) -> Result<RowInserter<'_>, IngestError> {
        let column_list = columns
            .iter()
            .map(|name| ident::quote(name))
            .collect::<Result<Vec<_>, _>>()?
            .iter()
            .join(", ");
        let placeholders = (1..=columns.len()).map(|i| format!("?{i}")).join(", ");
        let sql = format!(
            "INSERT INTO {} ({column_list}) VALUES ({placeholders})",
            ident::quote(table)?
        );
        debug!("insert statement: {sql}");
        let stmt = self.conn.prepare(&sql)?;
        Ok(RowInserter { stmt })
    }
}

pub struct RowInserter<'conn> {
    stmt: rusqlite::Statement<'conn>,
}

impl RowInserter<'_> {
    /// Binds one shaped row and executes the insert. `None` values bind as
    /// NULL (missing trailing fields under the lesser-count policy).
    pub fn insert(&mut self, values: &[Option<&str>]) -> rusqlite::Result<()> {
        self.stmt.execute(params_from_iter(values.iter()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn create_and_inspect_table() {
        let db = Db::open_in_memory().expect("open");
        assert!(!db.table_exists("flights").unwrap());
        db.create_table("flights", &columns(&["origin", "dest"]))
            .unwrap();
        assert!(db.table_exists("flights").unwrap());
        assert_eq!(
            db.table_columns("flights").unwrap(),
            Some(vec!["origin".to_string(), "dest".to_string()])
        );
        assert_eq!(db.table_columns("absent").unwrap(), None);
    }

    #[test]
    fn awkward_identifiers_survive_ddl_and_inserts() {
        let db = Db::open_in_memory().expect("open");
        let cols = columns(&["first name", "total; sum", "say \"hi\""]);
        db.create_table("odd table", &cols).unwrap();
        assert_eq!(db.table_columns("odd table").unwrap(), Some(cols.clone()));

        let mut inserter = db.inserter("odd table", &cols).unwrap();
        inserter
            .insert(&[Some("a"), Some("b"), None])
            .expect("insert");
        drop(inserter);

        assert_eq!(db.row_count("odd table").unwrap(), 1);
    }

    #[test]
    fn drop_table_is_idempotent() {
        let db = Db::open_in_memory().expect("open");
        db.drop_table("missing").expect("drop if exists");
        db.create_table("t", &columns(&["a"])).unwrap();
        db.drop_table("t").unwrap();
        assert!(!db.table_exists("t").unwrap());
    }
}
