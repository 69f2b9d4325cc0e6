//! # genotyper
//!
//! A library for assigning viral genotypes to aligned nucleotide sequences.
//!
//! A query is compared position by position against a panel of references with
//! known genotypes. The distance to each reference is the fraction of compared
//! positions where the query cannot agree with it, and the closest references
//! decide the genotype.
//!
//! ## Features
//!
//! - **Ambiguity aware**: IUPAC codes are discordant only if no reading of them matches
//! - **Sparse mismatch index**: Per-position lists of references lacking each base
//! - **Drug-resistance exemption**: Resistance codons do not count against a reference
//! - **Recombinant regions**: Breakpoint maps attribute a query to one constituent genotype
//! - **Parent/child fallback**: Weak sub-form matches fall back to their parent genotype
//!
//! ## Example
//!
//! ```rust,no_run
//! use genotyper::{Dataset, GenotypingEngine};
//! use std::path::Path;
//!
//! // Load genotype definitions and the reference panel
//! let dataset = Dataset::load_from_file(Path::new("hiv1.json")).unwrap();
//! let (genotypes, references) = dataset.into_catalogs().unwrap();
//! let engine = GenotypingEngine::new(genotypes, references).unwrap();
//!
//! // Genotype an aligned query starting at position 2253
//! let result = engine.compare_all(b"CCTCAGATCACTCTTTGGCAACGACCCC", 2253).unwrap();
//! for m in result.top(5) {
//!     println!("{}: {}", m.reference().accession, m.display());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`catalog`]: Genotype and reference catalogs and the mismatch index
//! - [`core`]: Core data types for positions, genotypes, and references
//! - [`matching`]: Comparison, scoring, and genotype calling
//! - [`parsing`]: Parsers for FASTA queries and resistance mutation tables
//! - [`cli`]: Command-line interface implementation

pub mod catalog;
pub mod cli;
pub mod core;
pub mod matching;
pub mod parsing;
pub mod utils;

// Re-export commonly used types for convenience
pub use crate::catalog::genotypes::GenotypeCatalog;
pub use crate::catalog::index::MismatchIndex;
pub use crate::catalog::store::{CatalogError, Dataset, ReferenceCatalog};
pub use crate::core::genotype::{BreakpointRegion, GenotypeDefinition, RegionalMatch};
pub use crate::core::reference::ReferenceSequence;
pub use crate::core::types::*;
pub use crate::matching::bound::{BoundMatch, GenotypeCall};
pub use crate::matching::engine::{GenotypingConfig, GenotypingEngine, GenotypingError};
pub use crate::matching::resistance::ResistanceCodons;
pub use crate::matching::result::MatchResult;
