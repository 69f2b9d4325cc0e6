//! Reader for aligned query sequences in FASTA format using noodles.
//!
//! Supports both uncompressed and gzip/bgzip compressed files.
//!
//! Supported extensions:
//! - `.fa`, `.fasta`, `.fna`, `.fas` (uncompressed)
//! - any of the above with `.gz` or `.bgz` (compressed)

use std::ffi::OsStr;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::GzDecoder;
use noodles::fasta;
use tracing::debug;

use crate::parsing::ParseError;
use crate::utils::validation::check_record_limit;

/// Description token carrying the first aligned position
const FIRST_NA_TOKEN: &str = "first_na=";

/// One query sequence read from a FASTA file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRecord {
    pub name: String,
    /// First aligned position, if given in the description
    pub first_na: Option<u32>,
    /// Uppercased sequence
    pub sequence: Vec<u8>,
}

/// Check if the path has a FASTA extension
pub fn is_fasta_file(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();

    // Check for gzipped FASTA
    for ext in [".fa", ".fasta", ".fna", ".fas"] {
        if path_str.ends_with(&format!("{ext}.gz")) || path_str.ends_with(&format!("{ext}.bgz"))
        {
            return true;
        }
    }

    matches!(
        path.extension()
            .and_then(OsStr::to_str)
            .map(str::to_lowercase)
            .as_deref(),
        Some("fa" | "fasta" | "fna" | "fas")
    )
}

/// Check if the path is a gzipped file
#[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".bgz")
}

/// Read every query record of a FASTA file.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, `ParseError::Noodles` if
/// parsing fails, `ParseError::InvalidFormat` if no records are found or a
/// `first_na` token is malformed, or `ParseError::TooManyRecords` if the limit
/// is exceeded.
pub fn parse_query_file(path: &Path) -> Result<Vec<QueryRecord>, ParseError> {
    let file = std::fs::File::open(path)?;
    let records = if is_gzipped(path) {
        let mut reader = fasta::io::Reader::new(BufReader::new(GzDecoder::new(file)));
        parse_query_reader(&mut reader)?
    } else {
        let mut reader = fasta::io::Reader::new(BufReader::new(file));
        parse_query_reader(&mut reader)?
    };

    debug!(path = %path.display(), records = records.len(), "Read query FASTA");
    Ok(records)
}

/// Read every query record from in-memory FASTA text.
///
/// # Errors
///
/// Same as [`parse_query_file`], without I/O failures.
pub fn parse_query_text(text: &str) -> Result<Vec<QueryRecord>, ParseError> {
    let mut reader = fasta::io::Reader::new(text.as_bytes());
    parse_query_reader(&mut reader)
}

/// Parse from a noodles FASTA reader
fn parse_query_reader<R: BufRead>(
    reader: &mut fasta::io::Reader<R>,
) -> Result<Vec<QueryRecord>, ParseError> {
    let mut records = Vec::new();

    for result in reader.records() {
        let record = result
            .map_err(|e| ParseError::Noodles(format!("Failed to parse FASTA record: {e}")))?;

        // Check record limit for DOS protection
        if check_record_limit(records.len()).is_some() {
            return Err(ParseError::TooManyRecords(records.len()));
        }

        let name = String::from_utf8_lossy(record.name()).to_string();
        let first_na = match record.description() {
            Some(description) => parse_first_na(&String::from_utf8_lossy(description))
                .map_err(|e| ParseError::InvalidFormat(format!("Record '{name}': {e}")))?,
            None => None,
        };
        let sequence = record
            .sequence()
            .as_ref()
            .iter()
            .map(u8::to_ascii_uppercase)
            .collect();

        records.push(QueryRecord {
            name,
            first_na,
            sequence,
        });
    }

    if records.is_empty() {
        return Err(ParseError::InvalidFormat(
            "No sequences found in FASTA file".to_string(),
        ));
    }

    Ok(records)
}

/// Extract the `first_na=<n>` token from a description line
fn parse_first_na(description: &str) -> Result<Option<u32>, String> {
    let Some(value) = description
        .split_whitespace()
        .find_map(|token| token.strip_prefix(FIRST_NA_TOKEN))
    else {
        return Ok(None);
    };

    match value.parse::<u32>() {
        Ok(position) if position > 0 => Ok(Some(position)),
        _ => Err(format!("invalid {FIRST_NA_TOKEN}{value}")),
    }
}
