use std::path::Path;

use thiserror::Error;
use tracing::{debug, info};

use crate::catalog::genotypes::{GenotypeCatalog, DEFAULT_REGIONAL_CONFIDENCE};
use crate::catalog::index::MismatchIndex;
use crate::catalog::store::{CatalogError, Dataset, ReferenceCatalog};
use crate::matching::bound::BoundMatch;
use crate::matching::comparator::SequenceComparator;
use crate::matching::resistance::ResistanceCodons;
use crate::matching::result::MatchResult;
use crate::utils::validation::{validate_sequence, ValidationError};

/// Default distance above which no genotype is called
pub const DEFAULT_UNKNOWN_DISTANCE_CUTOFF: f64 = 0.11;

/// Default distance margin for preferring a child genotype
pub const DEFAULT_FALLBACK_EPSILON: f64 = 0.01;

#[derive(Error, Debug)]
pub enum GenotypingError {
    #[error("Invalid query sequence: {0}")]
    InvalidQuery(#[from] ValidationError),

    #[error("Reference '{accession}' refers to unresolved genotype '{genotype}'")]
    UnresolvedGenotype { accession: String, genotype: String },
}

/// Configuration for genotype calling
#[derive(Debug, Clone, Copy)]
pub struct GenotypingConfig {
    /// Matches farther than this are reported as unknown
    pub unknown_distance_cutoff: f64,
    /// Minimum share of the query a breakpoint region must explain
    pub regional_confidence: f64,
    /// How much farther a child fallback may be than the first match
    pub fallback_epsilon: f64,
}

impl Default for GenotypingConfig {
    fn default() -> Self {
        Self {
            unknown_distance_cutoff: DEFAULT_UNKNOWN_DISTANCE_CUTOFF,
            regional_confidence: DEFAULT_REGIONAL_CONFIDENCE,
            fallback_epsilon: DEFAULT_FALLBACK_EPSILON,
        }
    }
}

/// Genotypes query sequences against a reference panel.
///
/// Everything is built once up front and read-only afterwards, so one engine
/// can be shared between threads behind an `Arc`.
#[derive(Debug, Clone)]
pub struct GenotypingEngine {
    genotypes: GenotypeCatalog,
    references: ReferenceCatalog,
    index: MismatchIndex,
    resistance: ResistanceCodons,
    config: GenotypingConfig,
}

impl GenotypingEngine {
    /// Create an engine with the default configuration and no resistance codons
    ///
    /// # Errors
    ///
    /// Returns an error if the mismatch index cannot be built.
    pub fn new(
        genotypes: GenotypeCatalog,
        references: ReferenceCatalog,
    ) -> Result<Self, CatalogError> {
        let index = MismatchIndex::build(&references)?;
        Ok(Self {
            genotypes,
            references,
            index,
            resistance: ResistanceCodons::new(),
            config: GenotypingConfig::default(),
        })
    }

    /// Load a dataset file and build an engine from it
    ///
    /// # Errors
    ///
    /// Returns an error if the dataset cannot be read or fails validation.
    pub fn from_dataset(path: &Path) -> Result<Self, CatalogError> {
        let (genotypes, references) = Dataset::load_from_file(path)?.into_catalogs()?;
        let engine = Self::new(genotypes, references)?;
        info!(
            path = %path.display(),
            genotypes = engine.genotypes.len(),
            references = engine.references.len(),
            "Loaded genotyping dataset"
        );
        Ok(engine)
    }

    /// Use a custom configuration
    #[must_use]
    pub fn with_config(mut self, config: GenotypingConfig) -> Self {
        self.config = config;
        self
    }

    /// Exempt resistance-associated codons from discordance
    #[must_use]
    pub fn with_resistance(mut self, resistance: ResistanceCodons) -> Self {
        self.resistance = resistance;
        self
    }

    #[must_use]
    pub fn genotypes(&self) -> &GenotypeCatalog {
        &self.genotypes
    }

    #[must_use]
    pub fn references(&self) -> &ReferenceCatalog {
        &self.references
    }

    #[must_use]
    pub fn index(&self) -> &MismatchIndex {
        &self.index
    }

    #[must_use]
    pub fn resistance(&self) -> &ResistanceCodons {
        &self.resistance
    }

    #[must_use]
    pub fn config(&self) -> &GenotypingConfig {
        &self.config
    }

    /// Compare an aligned query whose first base is at `first_na` against
    /// every reference, and rank the matches.
    ///
    /// # Errors
    ///
    /// Returns `GenotypingError::InvalidQuery` for an empty or malformed
    /// sequence and `GenotypingError::UnresolvedGenotype` if a reference's
    /// genotype cannot be resolved.
    pub fn compare_all(
        &self,
        sequence: &[u8],
        first_na: u32,
    ) -> Result<MatchResult<'_>, GenotypingError> {
        validate_sequence(sequence)?;

        let comparison =
            SequenceComparator::new(&self.index, &self.resistance).compare(sequence, first_na);
        debug!(
            first_na,
            length = sequence.len(),
            span = ?comparison.span,
            wildcards = comparison.wildcard_count,
            "Compared query against panel"
        );

        let matches = self
            .references
            .references
            .iter()
            .zip(comparison.discordance)
            .enumerate()
            .map(|(i, (reference, discordant))| {
                BoundMatch::new(
                    i,
                    reference,
                    comparison.span,
                    comparison.wildcard_count,
                    discordant,
                    &self.genotypes,
                    &self.config,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(MatchResult::new(matches, self.config.fallback_epsilon))
    }
}
