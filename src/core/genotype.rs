use serde::{Deserialize, Serialize};

use crate::core::types::{GenotypeLevel, NaSpan};

/// A region of a recombinant genome attributed to one constituent genotype
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakpointRegion {
    /// Name of the constituent genotype
    pub genotype: String,

    /// First position of the region (1-based, inclusive)
    pub start: u32,

    /// Last position of the region (1-based, inclusive)
    pub end: u32,

    #[serde(skip)]
    pub genotype_index: Option<usize>,
}

impl BreakpointRegion {
    pub fn new(genotype: impl Into<String>, start: u32, end: u32) -> Self {
        Self {
            genotype: genotype.into(),
            start,
            end,
            genotype_index: None,
        }
    }

    #[must_use]
    pub fn span(&self) -> NaSpan {
        NaSpan::new(self.start, self.end)
    }
}

/// A genotype known to the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenotypeDefinition {
    /// Unique name (e.g. "B", "A1", "CRF01_AE")
    pub name: String,

    /// Name shown in reports; defaults to `name`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Classification level
    #[serde(default)]
    pub level: GenotypeLevel,

    /// Distances must be strictly below this to support the genotype
    pub distance_upper_limit: f64,

    /// Broader genotypes this one derives from
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parent_genotypes: Vec<String>,

    /// Breakpoint map for simple recombinant forms, in genome order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub regions: Vec<BreakpointRegion>,

    // === Resolved on load ===
    #[serde(skip)]
    pub parent_indices: Vec<usize>,

    /// Length of the longest parent chain above this genotype
    #[serde(skip)]
    pub depth: usize,
}

impl GenotypeDefinition {
    pub fn new(name: impl Into<String>, level: GenotypeLevel, distance_upper_limit: f64) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            level,
            distance_upper_limit,
            parent_genotypes: Vec::new(),
            regions: Vec::new(),
            parent_indices: Vec::new(),
            depth: 0,
        }
    }

    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    #[must_use]
    pub fn with_parents<S: Into<String>>(mut self, parents: impl IntoIterator<Item = S>) -> Self {
        self.parent_genotypes = parents.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_regions(mut self, regions: Vec<BreakpointRegion>) -> Self {
        self.regions = regions;
        self
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    /// A genotype with parents is a sub-form or recombinant of them
    #[must_use]
    pub fn has_parents(&self) -> bool {
        !self.parent_genotypes.is_empty()
    }

    #[must_use]
    pub fn is_recombinant(&self) -> bool {
        !self.regions.is_empty()
    }

    /// Strict acceptance test against this genotype's distance limit
    #[must_use]
    pub fn check_distance(&self, distance: f64) -> bool {
        distance < self.distance_upper_limit
    }
}

/// Fraction of a query span attributable to one genotype
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionalMatch {
    /// Index into the genotype catalog
    pub genotype_index: usize,
    /// Proportion of the query span in `[0, 1]`
    pub proportion: f64,
}
