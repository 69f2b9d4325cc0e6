use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

use crate::catalog::genotypes::{GenotypeCatalog, DEFAULT_UNKNOWN_LABEL};
use crate::core::genotype::GenotypeDefinition;
use crate::core::nucleotide::is_valid_symbol;
use crate::core::reference::ReferenceSequence;
use crate::core::types::NaSpan;
use crate::utils::validation::normalize_md5;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read dataset: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse dataset: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Genotype '{0}' is defined more than once")]
    DuplicateGenotype(String),

    #[error("Genotype '{genotype}' has invalid distance upper limit {limit}")]
    InvalidDistanceLimit { genotype: String, limit: f64 },

    #[error("Genotype '{genotype}' lists unknown parent genotype '{parent}'")]
    UnknownParent { genotype: String, parent: String },

    #[error("Genotype '{genotype}' has a breakpoint region for unknown genotype '{constituent}'")]
    UnknownRegionGenotype {
        genotype: String,
        constituent: String,
    },

    #[error("Genotype '{genotype}' has inconsistent breakpoints: {reason}")]
    InvalidBreakpoints { genotype: String, reason: String },

    #[error("Parent genotypes of '{0}' form a cycle")]
    ParentCycle(String),

    #[error("Reference '{accession}' is labeled with unknown genotype '{genotype}'")]
    UnknownReferenceGenotype { accession: String, genotype: String },

    #[error("Reference '{accession}' spans {found}, expected {expected} like the rest of the catalog")]
    SpanMismatch {
        accession: String,
        expected: NaSpan,
        found: NaSpan,
    },

    #[error("Reference '{accession}' has {found} bases but its span {span} needs {expected}")]
    SequenceLengthMismatch {
        accession: String,
        span: NaSpan,
        expected: usize,
        found: usize,
    },

    #[error("Reference '{accession}' has invalid base '{symbol}' at position {position}")]
    InvalidBase {
        accession: String,
        position: u32,
        symbol: char,
    },

    #[error("Reference '{accession}' MD5 mismatch: expected {expected}, computed {found}")]
    ChecksumMismatch {
        accession: String,
        expected: String,
        found: String,
    },
}

/// Dataset version for compatibility checking
pub const DATASET_VERSION: &str = "1.0.0";

/// Serializable dataset format: genotype definitions plus the reference panel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub version: String,
    #[serde(default)]
    pub created_at: String,
    /// Label reported when no genotype can be assigned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unknown_genotype: Option<String>,
    pub genotypes: Vec<GenotypeDefinition>,
    pub references: Vec<ReferenceSequence>,
}

impl Dataset {
    /// Load a dataset from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains invalid JSON.
    pub fn load_from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse a dataset from a JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let data: Self = serde_json::from_str(json)?;

        // Version check (warn but don't fail)
        if data.version != DATASET_VERSION {
            warn!(
                expected = DATASET_VERSION,
                found = %data.version,
                "Dataset version mismatch"
            );
        }

        Ok(data)
    }

    /// Export the dataset to JSON, stamping the creation time
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, CatalogError> {
        let data = Self {
            version: DATASET_VERSION.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            ..self.clone()
        };
        Ok(serde_json::to_string_pretty(&data)?)
    }

    /// Build and validate both catalogs
    ///
    /// # Errors
    ///
    /// Returns the first validation failure of either catalog.
    pub fn into_catalogs(self) -> Result<(GenotypeCatalog, ReferenceCatalog), CatalogError> {
        let genotypes = GenotypeCatalog::new(self.genotypes)?.with_unknown_label(
            self.unknown_genotype
                .unwrap_or_else(|| DEFAULT_UNKNOWN_LABEL.to_string()),
        );
        let references = ReferenceCatalog::new(self.references, &genotypes)?;
        Ok((genotypes, references))
    }
}

/// The reference panel. Every reference covers the same span.
#[derive(Debug, Clone, Default)]
pub struct ReferenceCatalog {
    /// All references, in dataset order
    pub references: Vec<ReferenceSequence>,

    /// Shared span of all references (`None` when empty)
    span: Option<NaSpan>,
}

impl ReferenceCatalog {
    /// Build and validate a panel, resolving each reference's genotype.
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError` naming the offending accession if a reference
    /// has a different span from the first one, a sequence whose length does
    /// not fit its span, an invalid base, a checksum mismatch, or a genotype
    /// missing from `genotypes`.
    pub fn new(
        references: Vec<ReferenceSequence>,
        genotypes: &GenotypeCatalog,
    ) -> Result<Self, CatalogError> {
        let mut references = references;
        let mut span: Option<NaSpan> = None;

        for reference in &mut references {
            let found = reference.span();
            match span {
                None => span = Some(found),
                Some(expected) if expected != found => {
                    return Err(CatalogError::SpanMismatch {
                        accession: reference.accession.clone(),
                        expected,
                        found,
                    });
                }
                Some(_) => {}
            }

            validate_sequence(reference)?;

            reference.genotype_index = Some(genotypes.index_of(&reference.genotype).ok_or_else(
                || CatalogError::UnknownReferenceGenotype {
                    accession: reference.accession.clone(),
                    genotype: reference.genotype.clone(),
                },
            )?);
        }

        debug!(
            references = references.len(),
            span = ?span,
            "Built reference catalog"
        );

        Ok(Self { references, span })
    }

    /// Span shared by every reference
    #[must_use]
    pub fn span(&self) -> Option<NaSpan> {
        self.span
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ReferenceSequence> {
        self.references.get(index)
    }

    /// Get a reference by accession
    #[must_use]
    pub fn by_accession(&self, accession: &str) -> Option<&ReferenceSequence> {
        self.references.iter().find(|r| r.accession == accession)
    }

    /// Number of references in catalog
    #[must_use]
    pub fn len(&self) -> usize {
        self.references.len()
    }

    /// Check if catalog is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }
}

fn validate_sequence(reference: &ReferenceSequence) -> Result<(), CatalogError> {
    let span = reference.span();
    let expected = span.len() as usize;
    let found = reference.sequence.len();
    if span.is_empty() || expected != found {
        return Err(CatalogError::SequenceLengthMismatch {
            accession: reference.accession.clone(),
            span,
            expected,
            found,
        });
    }

    if let Some((offset, &symbol)) = reference
        .sequence
        .as_bytes()
        .iter()
        .enumerate()
        .find(|(_, &b)| !is_valid_symbol(b))
    {
        #[allow(clippy::cast_possible_truncation)] // offset < span length
        let position = reference.first_na + offset as u32;
        return Err(CatalogError::InvalidBase {
            accession: reference.accession.clone(),
            position,
            symbol: symbol as char,
        });
    }

    if let Some(declared) = &reference.md5 {
        let found = reference.compute_md5();
        if normalize_md5(declared).as_deref() != Some(found.as_str()) {
            return Err(CatalogError::ChecksumMismatch {
                accession: reference.accession.clone(),
                expected: declared.clone(),
                found,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::GenotypeLevel;

    fn make_genotypes() -> GenotypeCatalog {
        GenotypeCatalog::new(vec![
            GenotypeDefinition::new("B", GenotypeLevel::Subtype, 0.05),
            GenotypeDefinition::new("C", GenotypeLevel::Subtype, 0.05),
        ])
        .unwrap()
    }

    const DATASET_JSON: &str = r#"{
        "version": "1.0.0",
        "created_at": "2024-01-01T00:00:00Z",
        "genotypes": [
            {"name": "B", "distance_upper_limit": 0.05},
            {"name": "C", "distance_upper_limit": 0.05}
        ],
        "references": [
            {"accession": "K03455", "genotype": "B", "country": "US",
             "first_na": 100, "last_na": 105, "sequence": "ACGTAC"},
            {"accession": "U52953", "genotype": "C",
             "first_na": 100, "last_na": 105, "sequence": "ACGTTC"}
        ]
    }"#;

    #[test]
    fn test_dataset_into_catalogs() {
        let dataset = Dataset::from_json(DATASET_JSON).unwrap();
        let (genotypes, references) = dataset.into_catalogs().unwrap();

        assert_eq!(genotypes.len(), 2);
        assert_eq!(genotypes.unknown_label(), "Unknown");
        assert_eq!(references.len(), 2);
        assert_eq!(references.span(), Some(NaSpan::new(100, 105)));

        let k03455 = references.by_accession("K03455").unwrap();
        assert_eq!(k03455.genotype_index, genotypes.index_of("B"));
        assert_eq!(k03455.country.as_deref(), Some("US"));
    }

    #[test]
    fn test_dataset_to_json_roundtrip() {
        let dataset = Dataset::from_json(DATASET_JSON).unwrap();
        let json = dataset.to_json().unwrap();
        assert!(json.contains("\"version\""));
        assert!(json.contains("K03455"));

        let reloaded = Dataset::from_json(&json).unwrap();
        assert_eq!(reloaded.references.len(), 2);
    }

    #[test]
    fn test_span_mismatch_names_accession() {
        let references = vec![
            ReferenceSequence::new("R1", "B", 100, "ACGT"),
            ReferenceSequence::new("R2", "B", 101, "ACGT"),
        ];
        let err = ReferenceCatalog::new(references, &make_genotypes()).unwrap_err();
        match err {
            CatalogError::SpanMismatch { accession, .. } => assert_eq!(accession, "R2"),
            other => panic!("Unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_reference_genotype() {
        let references = vec![ReferenceSequence::new("R1", "Z", 100, "ACGT")];
        let err = ReferenceCatalog::new(references, &make_genotypes()).unwrap_err();
        assert!(err.to_string().contains("R1"));
        assert!(matches!(err, CatalogError::UnknownReferenceGenotype { .. }));
    }

    #[test]
    fn test_invalid_base_rejected() {
        let references = vec![ReferenceSequence::new("R1", "B", 100, "ACXT")];
        let err = ReferenceCatalog::new(references, &make_genotypes()).unwrap_err();
        match err {
            CatalogError::InvalidBase {
                position, symbol, ..
            } => {
                assert_eq!(position, 102);
                assert_eq!(symbol, 'X');
            }
            other => panic!("Unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let mut reference = ReferenceSequence::new("R1", "B", 100, "ACGT");
        reference.last_na = 110;
        let err = ReferenceCatalog::new(vec![reference], &make_genotypes()).unwrap_err();
        assert!(matches!(err, CatalogError::SequenceLengthMismatch { .. }));
    }

    #[test]
    fn test_checksum() {
        let mut good = ReferenceSequence::new("R1", "B", 1, "ACGT");
        good.md5 = Some("F1F8F4BF413B16AD135722AA4591043E".to_string());
        assert!(ReferenceCatalog::new(vec![good], &make_genotypes()).is_ok());

        let mut bad = ReferenceSequence::new("R1", "B", 1, "ACGA");
        bad.md5 = Some("f1f8f4bf413b16ad135722aa4591043e".to_string());
        let err = ReferenceCatalog::new(vec![bad], &make_genotypes()).unwrap_err();
        assert!(matches!(err, CatalogError::ChecksumMismatch { .. }));
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = ReferenceCatalog::new(Vec::new(), &make_genotypes()).unwrap();
        assert!(catalog.is_empty());
        assert_eq!(catalog.span(), None);
    }
}
