//! Lists user tables from the catalog with column and row counts.

use anyhow::{Context, Result};

use crate::{cli::TablesArgs, storage::Db};

pub fn execute(args: &TablesArgs) -> Result<()> {
    let db = Db::open(&args.database)
        .with_context(|| format!("Opening database {:?}", args.database))?;
    for table in user_tables(&db)? {
        let columns = db
            .table_columns(&table)?
            .map(|cols| cols.len())
            .unwrap_or(0);
        let rows = db
            .row_count(&table)
            .with_context(|| format!("Counting rows in '{table}'"))?;
        println!("{table}: {columns} column(s), {rows} row(s)");
    }
    Ok(())
}

fn user_tables(db: &Db) -> Result<Vec<String>> {
    let mut stmt = db.conn().prepare(
        "SELECT name FROM sqlite_master \
         WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names)
}
