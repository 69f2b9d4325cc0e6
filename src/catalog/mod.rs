//! Genotype and reference catalogs and the mismatch index built from them.
//!
//! A dataset is a single JSON file holding the genotype definitions and the
//! reference panel. Loading it resolves every name-based cross reference into
//! catalog indices and validates the panel; any inconsistency is a load error.
//!
//! ## Dataset format
//!
//! ```json
//! {
//!   "version": "1.0.0",
//!   "genotypes": [
//!     {"name": "A", "level": "subtype", "distance_upper_limit": 0.05},
//!     {"name": "A1", "level": "sub_subtype", "distance_upper_limit": 0.03,
//!      "parent_genotypes": ["A"]}
//!   ],
//!   "references": [
//!     {"accession": "AF004885", "genotype": "A1", "first_na": 2253,
//!      "last_na": 2256, "sequence": "CCTC"}
//!   ]
//! }
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use genotyper::catalog::index::MismatchIndex;
//! use genotyper::catalog::store::Dataset;
//! use std::path::Path;
//!
//! let dataset = Dataset::load_from_file(Path::new("hiv1.json")).unwrap();
//! let (genotypes, references) = dataset.into_catalogs().unwrap();
//! let index = MismatchIndex::build(&references).unwrap();
//!
//! println!("{} genotypes, {} references", genotypes.len(), references.len());
//! println!("panel span: {:?}", index.span());
//! ```

pub mod genotypes;
pub mod index;
pub mod store;
