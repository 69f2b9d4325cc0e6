//! Parsers for genotyping inputs.
//!
//! - **FASTA queries**: Aligned query sequences, plain or gzip compressed
//! - **Resistance TSV**: Drug-resistance mutation positions whose codons are
//!   exempt from discordance
//!
//! ## Example
//!
//! ```rust,no_run
//! use genotyper::parsing::fasta::parse_query_file;
//! use std::path::Path;
//!
//! let records = parse_query_file(Path::new("queries.fasta")).unwrap();
//! for record in &records {
//!     println!("{}: {} bases at {:?}", record.name, record.sequence.len(), record.first_na);
//! }
//! ```
//!
//! ## Query coordinates
//!
//! A query's first aligned position is read from a `first_na=<n>` token in the
//! FASTA description line:
//!
//! ```text
//! >patient42 first_na=2253
//! CCTCAGATCACTCTTTGGCAACGACCCC
//! ```

pub mod fasta;
pub mod resistance;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("noodles error: {0}")]
    Noodles(String),

    #[error("Too many records: {0} exceeds maximum allowed (100000)")]
    TooManyRecords(usize),
}
