//! Runs ad-hoc SQL against the database and prints results as delimited
//! text. Also backs the `--sql` post-import hook, which is the only way to
//! get anything out of an in-memory import.

use std::io::Write;

use anyhow::{Context, Result};
use log::info;
use rusqlite::types::Value;

use crate::{cli::QueryArgs, io_utils, storage::Db};

pub fn execute(args: &QueryArgs) -> Result<()> {
    let db = Db::open(&args.database)
        .with_context(|| format!("Opening database {:?}", args.database))?;
    let delimiter = args
        .output_delimiter
        .unwrap_or(io_utils::DEFAULT_CSV_DELIMITER);
    let mut writer = io_utils::open_csv_writer(args.output.as_deref(), delimiter)?;
    run_statements(&db, &args.sql, &mut writer)?;
    writer.flush().context("Flushing query output")?;
    Ok(())
}

/// Runs each statement in order, writing a header row of column names
/// followed by the data rows. NULL renders as an empty field.
pub fn run_statements(
    db: &Db,
    statements: &[String],
    writer: &mut csv::Writer<Box<dyn Write>>,
) -> Result<()> {
    for sql in statements {
        let mut stmt = db
            .conn()
            .prepare(sql)
            .with_context(|| format!("Preparing statement: {sql}"))?;
        let column_names = stmt
            .column_names()
            .iter()
            .map(|name| name.to_string())
            .collect::<Vec<_>>();
        writer.write_record(&column_names)?;

        let mut row_count = 0usize;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let mut record = Vec::with_capacity(column_names.len());
            for idx in 0..column_names.len() {
                let value: Value = row.get(idx)?;
                record.push(render_value(value));
            }
            writer.write_record(&record)?;
            row_count += 1;
        }
        info!("{row_count} row(s) from: {sql}");
    }
    Ok(())
}

fn render_value(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Integer(v) => v.to_string(),
        Value::Real(v) => v.to_string(),
        Value::Text(v) => v,
        Value::Blob(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
    }
}
