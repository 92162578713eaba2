use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(author, version, about = "Load delimited text files into SQLite tables", long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Import one or more delimited files into database tables
    Import(ImportArgs),
    /// Run SQL against the database and print delimited results
    Query(QueryArgs),
    /// List user tables with their column and row counts
    Tables(TablesArgs),
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Database file to import into (created if absent)
    #[arg(short = 'd', long = "database")]
    pub database: PathBuf,
    /// One or more input files to import
    #[arg(short = 'i', long = "input", required = true, action = clap::ArgAction::Append)]
    pub inputs: Vec<PathBuf>,
    /// Regex applied to each file's base name; capture group 1 names the table
    #[arg(short = 'p', long = "pattern", conflicts_with = "table")]
    pub pattern: Option<String>,
    /// Explicit table name for every input (overrides --pattern)
    #[arg(short = 't', long = "table")]
    pub table: Option<String>,
    /// Take column names from each file's first row instead of field1..fieldN
    #[arg(long = "header")]
    pub header: bool,
    /// How to treat files whose field count differs from the table's
    #[arg(long = "field-count-policy", value_enum, default_value = "allow-greater")]
    pub field_count_policy: FieldCountPolicy,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Quote character used by the tokenizer
    #[arg(long, value_parser = parse_single_byte, default_value = "\"")]
    pub quote: u8,
    /// Escape character used by the tokenizer (none by default)
    #[arg(long, value_parser = parse_single_byte)]
    pub escape: Option<u8>,
    /// Lines starting with this character are skipped
    #[arg(long, value_parser = parse_single_byte)]
    pub comment: Option<u8>,
    /// Character encoding of the input files (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Rows per transaction
    #[arg(long = "batch-size", default_value_t = 5000)]
    pub batch_size: usize,
    /// Drop each destination table before importing into it
    #[arg(long)]
    pub overwrite: bool,
    /// Import into an in-memory database (pair with --sql, nothing persists)
    #[arg(long)]
    pub memory: bool,
    /// SQL to run after all files are loaded; results print as delimited text
    #[arg(long = "sql", action = clap::ArgAction::Append)]
    pub sql: Vec<String>,
    /// Delimiter for --sql result output
    #[arg(long = "output-delimiter", value_parser = parse_delimiter)]
    pub output_delimiter: Option<u8>,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
#[value(rename_all = "kebab-case")]
pub enum FieldCountPolicy {
    /// Reject any file whose field count differs from the table's
    Strict,
    /// Accept extra trailing fields and drop them on load (default)
    AllowGreater,
    /// Also accept missing trailing fields, loading them as NULL
    AllowLesser,
}

impl Default for FieldCountPolicy {
    fn default() -> Self {
        FieldCountPolicy::AllowGreater
    }
}

#[derive(Debug, Args)]
pub struct QueryArgs {
    /// Database file to query
    #[arg(short = 'd', long = "database")]
    pub database: PathBuf,
    /// SQL statement to run (repeatable)
    #[arg(short = 's', long = "sql", required = true, action = clap::ArgAction::Append)]
    pub sql: Vec<String>,
    /// Output file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Delimiter for result output
    #[arg(long = "output-delimiter", value_parser = parse_delimiter)]
    pub output_delimiter: Option<u8>,
}

#[derive(Debug, Args)]
pub struct TablesArgs {
    /// Database file to inspect
    #[arg(short = 'd', long = "database")]
    pub database: PathBuf,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => parse_single_byte(other),
    }
}

pub fn parse_single_byte(value: &str) -> Result<u8, String> {
    let mut chars = value.chars();
    let first = chars
        .next()
        .ok_or_else(|| "Character cannot be empty".to_string())?;
    if chars.next().is_some() {
        return Err("Expected a single character".to_string());
    }
    if !first.is_ascii() {
        return Err("Character must be ASCII".to_string());
    }
    Ok(first as u8)
}
