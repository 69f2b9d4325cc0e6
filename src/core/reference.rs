use serde::{Deserialize, Serialize};

use crate::core::types::NaSpan;

/// A reference sequence from the genotyping panel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceSequence {
    /// Accession of the source record (e.g. "K03455")
    pub accession: String,

    /// Name of the genotype this reference is labeled with
    pub genotype: String,

    /// Country of isolation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    /// Author and year of the publication (e.g. "Ratner1985")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_year: Option<String>,

    /// First aligned position (1-based, inclusive)
    pub first_na: u32,

    /// Last aligned position (1-based, inclusive)
    pub last_na: u32,

    /// Aligned bases covering `first_na..=last_na`
    pub sequence: String,

    /// MD5 of the uppercase sequence, checked on load when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub md5: Option<String>,

    // === Resolved on load ===
    /// Index of `genotype` in the genotype catalog
    #[serde(skip)]
    pub genotype_index: Option<usize>,
}

impl ReferenceSequence {
    pub fn new(
        accession: impl Into<String>,
        genotype: impl Into<String>,
        first_na: u32,
        sequence: impl Into<String>,
    ) -> Self {
        let sequence: String = sequence.into();
        #[allow(clippy::cast_possible_truncation)] // Reference sequences are far below u32::MAX
        let last_na = (first_na + sequence.len() as u32).saturating_sub(1);
        Self {
            accession: accession.into(),
            genotype: genotype.into(),
            country: None,
            author_year: None,
            first_na,
            last_na,
            sequence,
            md5: None,
            genotype_index: None,
        }
    }

    #[must_use]
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    #[must_use]
    pub fn with_author_year(mut self, author_year: impl Into<String>) -> Self {
        self.author_year = Some(author_year.into());
        self
    }

    #[must_use]
    pub fn span(&self) -> NaSpan {
        NaSpan::new(self.first_na, self.last_na)
    }

    /// Base at an absolute position, if covered
    #[must_use]
    pub fn base_at(&self, position: u32) -> Option<u8> {
        if !self.span().contains(position) {
            return None;
        }
        self.sequence
            .as_bytes()
            .get((position - self.first_na) as usize)
            .copied()
    }

    /// MD5 of the uppercase sequence (lowercase hex)
    #[must_use]
    pub fn compute_md5(&self) -> String {
        let uppercase: Vec<u8> = self
            .sequence
            .as_bytes()
            .iter()
            .map(u8::to_ascii_uppercase)
            .collect();
        format!("{:x}", md5::compute(&uppercase))
    }

    /// Short human-readable description, e.g. `K03455 (US, Ratner1985)`
    #[must_use]
    pub fn label(&self) -> String {
        let meta: Vec<&str> = [self.country.as_deref(), self.author_year.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        if meta.is_empty() {
            self.accession.clone()
        } else {
            format!("{} ({})", self.accession, meta.join(", "))
        }
    }
}
