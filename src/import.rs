//! Import orchestration: binds each input file to a table, reconciles the
//! schema once per table, and streams rows in.
//!
//! The run has two phases. Pre-flight resolves every file's table name
//! before anything is written, so a naming failure aborts the run with the
//! database untouched. The import phase then processes files independently:
//! a field-count mismatch or unreadable file fails that file only, and the
//! run summary (and exit status) reflects it at the end.

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
    time::Instant,
};

use anyhow::{Context, Result, anyhow, bail};
use log::{debug, error, info, warn};
use regex::Regex;

use crate::{
    cli::ImportArgs,
    error::IngestError,
    io_utils::{self, CsvReadOptions},
    loader::{self, LoadCounts, LoadOptions},
    naming::TableNaming,
    query,
    schema::{self, FieldSet, SchemaCache},
    storage::Db,
};

/// One input file bound to its destination table.
#[derive(Debug)]
struct ImportTarget {
    table: String,
    path: PathBuf,
}

#[derive(Debug, Default)]
struct RunSummary {
    files_ok: usize,
    rows_inserted: u64,
    rows_skipped: u64,
    failures: Vec<(PathBuf, String)>,
}

pub fn execute(args: &ImportArgs) -> Result<()> {
    let naming = build_naming(args)?;
    for path in &args.inputs {
        if !path.is_file() {
            bail!("Input does not exist or is not a file: {}", path.display());
        }
    }

    // Phase one: every table name must resolve before anything is written.
    let targets = args
        .inputs
        .iter()
        .map(|path| {
            let table = naming
                .resolve(path)
                .with_context(|| format!("Resolving table name for {}", path.display()))?;
            Ok(ImportTarget {
                table,
                path: path.clone(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let db = if args.memory {
        warn!("importing into an in-memory database; nothing persists past this run");
        Db::open_in_memory()
    } else {
        Db::open(&args.database)
    }
    .with_context(|| format!("Opening database {:?}", args.database))?;

    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let mut cache = SchemaCache::default();
    let mut dropped = HashSet::new();
    let mut summary = RunSummary::default();

    for target in &targets {
        let started = Instant::now();
        match import_file(&db, &mut cache, &mut dropped, target, args, encoding) {
            Ok(counts) => {
                info!(
                    "✓ {} -> '{}': {} row(s) inserted, {} skipped in {:.3}s",
                    target.path.display(),
                    target.table,
                    counts.inserted,
                    counts.skipped,
                    started.elapsed().as_secs_f64()
                );
                summary.files_ok += 1;
                summary.rows_inserted += counts.inserted;
                summary.rows_skipped += counts.skipped;
            }
            Err(err) => {
                error!("✗ {} -> '{}': {err:#}", target.path.display(), target.table);
                // a broken connection cannot serve the remaining files
                if matches!(
                    err.downcast_ref::<IngestError>(),
                    Some(IngestError::Storage(_))
                ) {
                    return Err(err.context("Storage failure aborts the run"));
                }
                summary.failures.push((target.path.clone(), format!("{err:#}")));
            }
        }
    }

    if !args.sql.is_empty() {
        let delimiter = args
            .output_delimiter
            .unwrap_or(io_utils::DEFAULT_CSV_DELIMITER);
        let mut writer = io_utils::open_csv_writer(None, delimiter)?;
        query::run_statements(&db, &args.sql, &mut writer)?;
        writer.flush().context("Flushing SQL output")?;
    }

    info!(
        "Imported {} row(s) ({} skipped) from {} of {} file(s) into {} table(s)",
        summary.rows_inserted,
        summary.rows_skipped,
        summary.files_ok,
        targets.len(),
        cache.len()
    );
    if summary.failures.is_empty() {
        Ok(())
    } else {
        Err(anyhow!(
            "{} of {} file(s) failed to import",
            summary.failures.len(),
            targets.len()
        ))
    }
}

fn build_naming(args: &ImportArgs) -> Result<TableNaming> {
    match (&args.table, &args.pattern) {
        (Some(table), None) => Ok(TableNaming::Explicit(table.clone())),
        (None, Some(pattern)) => {
            let regex = Regex::new(pattern)
                .with_context(|| format!("Invalid table name pattern '{pattern}'"))?;
            Ok(TableNaming::Pattern(regex))
        }
        _ => Err(anyhow!("Exactly one of --pattern or --table must be given")),
    }
}

fn import_file(
    db: &Db,
    cache: &mut SchemaCache,
    dropped: &mut HashSet<String>,
    target: &ImportTarget,
    args: &ImportArgs,
    encoding: &'static encoding_rs::Encoding,
) -> Result<LoadCounts> {
    let read = CsvReadOptions {
        delimiter: io_utils::resolve_input_delimiter(&target.path, args.delimiter),
        quote: args.quote,
        escape: args.escape,
        comment: args.comment,
    };

    debug!(
        "importing {} into '{}' (delimiter '{}')",
        target.path.display(),
        target.table,
        crate::printable_delimiter(read.delimiter)
    );

    if args.overwrite && dropped.insert(target.table.clone()) {
        warn!("overwrite: dropping table '{}'", target.table);
        db.drop_table(&target.table)?;
    }

    let fields = read_field_set(&target.path, &read, encoding, args.header)?;
    let table_schema = schema::reconcile(
        db,
        cache,
        &target.table,
        &fields,
        args.field_count_policy,
    )?;

    let options = LoadOptions {
        read,
        encoding,
        header_mode: args.header,
        policy: args.field_count_policy,
        batch_size: args.batch_size,
    };
    loader::load_rows(db, &table_schema, &target.path, &options)
}

/// Reads the first record of `path` to derive the incoming field set: header
/// tokens in header mode, a positional `field1..fieldN` set otherwise.
fn read_field_set(
    path: &Path,
    read: &CsvReadOptions,
    encoding: &'static encoding_rs::Encoding,
    header_mode: bool,
) -> Result<FieldSet> {
    let mut reader = io_utils::open_csv_reader_from_path(path, read)?;
    let mut record = csv::ByteRecord::new();
    if !reader
        .read_byte_record(&mut record)
        .with_context(|| format!("Reading first record of {path:?}"))?
    {
        bail!("{} contains no records", path.display());
    }
    if header_mode {
        let tokens = io_utils::decode_record(&record, encoding)
            .with_context(|| format!("Decoding header of {path:?}"))?;
        Ok(FieldSet::from_header(&tokens))
    } else {
        Ok(FieldSet::positional(record.len()))
    }
}
