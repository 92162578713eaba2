//! Row loading: streams a file's records into its reconciled table.

use std::path::Path;

use anyhow::{Context, Result};
use encoding_rs::Encoding;
use log::{debug, warn};

use crate::{
    cli::FieldCountPolicy,
    io_utils::{self, CsvReadOptions},
    schema::TableSchema,
    storage::Db,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct LoadCounts {
    pub inserted: u64,
    pub skipped: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    pub read: CsvReadOptions,
    pub encoding: &'static Encoding,
    pub header_mode: bool,
    pub policy: FieldCountPolicy,
    pub batch_size: usize,
}

/// Streams every data record of `path` into `schema`'s table through one
/// prepared, parameterized insert, committing every `batch_size` rows.
///
/// A row that fails to insert or cannot be shaped to the table's width under
/// the policy is logged and counted as skipped; a read or decode failure
/// aborts the file and rolls back the open batch.
pub fn load_rows(
    db: &Db,
    schema: &TableSchema,
    path: &Path,
    options: &LoadOptions,
) -> Result<LoadCounts> {
    let mut reader = io_utils::open_csv_reader_from_path(path, &options.read)?;
    let width = schema.column_count();
    let batch_size = options.batch_size.max(1);

    db.begin()?;
    let result = insert_all(db, schema, path, options, &mut reader, width, batch_size);
    match result {
        Ok(counts) => {
            db.commit()?;
            Ok(counts)
        }
        Err(err) => {
            // leave the connection usable for the remaining files
            if let Err(rollback_err) = db.rollback() {
                warn!("rollback after failed load of {path:?}: {rollback_err}");
            }
            Err(err)
        }
    }
}

fn insert_all(
    db: &Db,
    schema: &TableSchema,
    path: &Path,
    options: &LoadOptions,
    reader: &mut csv::Reader<Box<dyn std::io::Read>>,
    width: usize,
    batch_size: usize,
) -> Result<LoadCounts> {
    let mut inserter = db.inserter(&schema.table, &schema.columns)?;
    let mut counts = LoadCounts::default();
    let mut record = csv::ByteRecord::new();
    let mut record_index = 0usize;
    let mut rows_in_batch = 0usize;

    while reader
        .read_byte_record(&mut record)
        .with_context(|| format!("Reading record {} in {path:?}", record_index + 1))?
    {
        record_index += 1;
        if options.header_mode && record_index == 1 {
            continue;
        }
        let decoded = io_utils::decode_record(&record, options.encoding)
            .with_context(|| format!("Decoding record {record_index} in {path:?}"))?;

        let Some(row) = shape_row(&decoded, width, options.policy) else {
            warn!(
                "skipping record {record_index} in {path:?}: {} field(s) vs {width} column(s)",
                decoded.len()
            );
            counts.skipped += 1;
            continue;
        };

        match inserter.insert(&row) {
            Ok(()) => {
                counts.inserted += 1;
                rows_in_batch += 1;
            }
            Err(err) => {
                warn!("skipping record {record_index} in {path:?}: {err}");
                counts.skipped += 1;
            }
        }

        if rows_in_batch >= batch_size {
            db.commit()?;
            db.begin()?;
            debug!("committed batch of {rows_in_batch} row(s) into '{}'", schema.table);
            rows_in_batch = 0;
        }
    }

    Ok(counts)
}

/// Shapes one decoded record to the table's width: truncates extra trailing
/// fields, pads missing ones with NULL, or refuses when the policy does not
/// permit the direction of the difference.
fn shape_row<'a>(
    decoded: &'a [String],
    width: usize,
    policy: FieldCountPolicy,
) -> Option<Vec<Option<&'a str>>> {
    if decoded.len() > width && policy == FieldCountPolicy::Strict {
        return None;
    }
    if decoded.len() < width && policy != FieldCountPolicy::AllowLesser {
        return None;
    }
    Some(
        (0..width)
            .map(|idx| decoded.get(idx).map(String::as_str))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn shape_row_passes_exact_width_under_any_policy() {
        let row = strings(&["a", "b"]);
        for policy in [
            FieldCountPolicy::Strict,
            FieldCountPolicy::AllowGreater,
            FieldCountPolicy::AllowLesser,
        ] {
            let shaped = shape_row(&row, 2, policy).expect("exact width");
            assert_eq!(shaped, vec![Some("a"), Some("b")]);
        }
    }

    #[test]
    fn shape_row_truncates_extras_unless_strict() {
        let row = strings(&["a", "b", "c"]);
        assert_eq!(
            shape_row(&row, 2, FieldCountPolicy::AllowGreater),
            Some(vec![Some("a"), Some("b")])
        );
        assert_eq!(shape_row(&row, 2, FieldCountPolicy::Strict), None);
    }

    #[test]
    fn shape_row_pads_only_under_allow_lesser() {
        let row = strings(&["a"]);
        assert_eq!(
            shape_row(&row, 3, FieldCountPolicy::AllowLesser),
            Some(vec![Some("a"), None, None])
        );
        assert_eq!(shape_row(&row, 3, FieldCountPolicy::AllowGreater), None);
        assert_eq!(shape_row(&row, 3, FieldCountPolicy::Strict), None);
    }
}
