//! Query comparison, distance scoring and genotype calling.
//!
//! - [`GenotypingEngine`]: Main entry point, owns the panel and its index
//! - [`SequenceComparator`]: Scans one query against the mismatch index
//! - [`BoundMatch`]: One reference's distance and genotype call
//! - [`MatchResult`]: Ranked matches with parent/child fallback
//!
//! ## Distance
//!
//! A position is discordant with a reference when no interpretation of the
//! (possibly ambiguous) query base matches the reference base. The distance is
//! the number of discordant positions over the compared positions that are
//! not wildcards. Discordances inside a codon that reads as a known
//! drug-resistance codon are not counted.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use genotyper::GenotypingEngine;
//!
//! let engine = GenotypingEngine::from_dataset(Path::new("hiv1.json")).unwrap();
//! let result = engine.compare_all(b"CCTCAGATCACTCTTTGGCAACGACCCC", 2253).unwrap();
//!
//! if let Some(best) = result.best_match() {
//!     println!("{}", best.display());
//! }
//! ```

pub mod bound;
pub mod comparator;
pub mod engine;
pub mod resistance;
pub mod result;
pub mod scoring;

pub use bound::{BoundMatch, GenotypeCall};
pub use comparator::{Comparison, SequenceComparator};
pub use engine::{GenotypingConfig, GenotypingEngine, GenotypingError};
pub use resistance::ResistanceCodons;
pub use result::MatchResult;
