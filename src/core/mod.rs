//! Core data types for viral genotyping.
//!
//! This module provides the fundamental types used throughout the library:
//!
//! - [`ReferenceSequence`]: An aligned reference sequence labeled with a genotype
//! - [`GenotypeDefinition`]: A genotype with its distance limit, parents and breakpoints
//! - [`NaSpan`], [`GenotypeLevel`]: Coordinate and classification types
//! - [`nucleotide`]: IUPAC ambiguity expansion over the concrete alphabet
//!
//! ## Coordinates
//!
//! All positions are absolute, 1-based and inclusive, expressed in the coordinate
//! system the reference panel was aligned to (for HIV-1, HXB2).
//!
//! [`ReferenceSequence`]: reference::ReferenceSequence
//! [`GenotypeDefinition`]: genotype::GenotypeDefinition
//! [`NaSpan`]: types::NaSpan
//! [`GenotypeLevel`]: types::GenotypeLevel

pub mod genotype;
pub mod nucleotide;
pub mod reference;
pub mod types;
