use serde::{Deserialize, Serialize};

/// An inclusive, 1-based range of absolute nucleotide positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NaSpan {
    pub first_na: u32,
    pub last_na: u32,
}

impl NaSpan {
    #[must_use]
    pub fn new(first_na: u32, last_na: u32) -> Self {
        Self { first_na, last_na }
    }

    /// Number of positions covered; zero for an inverted span.
    #[must_use]
    pub fn len(&self) -> u32 {
        if self.last_na < self.first_na {
            0
        } else {
            self.last_na - self.first_na + 1
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn contains(&self, position: u32) -> bool {
        position >= self.first_na && position <= self.last_na
    }

    /// Overlap of two spans, or `None` when they are disjoint.
    #[must_use]
    pub fn intersect(&self, other: &NaSpan) -> Option<NaSpan> {
        let first_na = self.first_na.max(other.first_na);
        let last_na = self.last_na.min(other.last_na);
        if first_na > last_na {
            None
        } else {
            Some(NaSpan { first_na, last_na })
        }
    }

    /// Number of positions shared with another span.
    #[must_use]
    pub fn overlap_len(&self, other: &NaSpan) -> u32 {
        self.intersect(other).map_or(0, |s| s.len())
    }
}

impl std::fmt::Display for NaSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.first_na, self.last_na)
    }
}

/// Classification level of a genotype definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GenotypeLevel {
    Species,
    Group,
    #[default]
    Subtype,
    SubSubtype,
    /// Circulating recombinant form
    Crf,
    Genotype,
    Subgenotype,
}

impl std::fmt::Display for GenotypeLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Species => write!(f, "species"),
            Self::Group => write!(f, "group"),
            Self::Subtype => write!(f, "subtype"),
            Self::SubSubtype => write!(f, "sub-subtype"),
            Self::Crf => write!(f, "CRF"),
            Self::Genotype => write!(f, "genotype"),
            Self::Subgenotype => write!(f, "subgenotype"),
        }
    }
}
