//! One reference's comparison result bound to its genotype.

use crate::catalog::genotypes::GenotypeCatalog;
use crate::core::genotype::{GenotypeDefinition, RegionalMatch};
use crate::core::reference::ReferenceSequence;
use crate::core::types::NaSpan;
use crate::matching::engine::{GenotypingConfig, GenotypingError};
use crate::matching::scoring::{distance, format_percentage};

/// The genotype a match reports
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenotypeCall {
    /// Too distant from every genotype to call
    Unknown,
    /// A single genotype (catalog index)
    Genotype(usize),
    /// The broader parent genotypes of a weakly supported sub-form
    Parents(Vec<usize>),
}

/// A reference's discordances against one query, with its distance
#[derive(Debug, Clone)]
pub struct BoundMatch<'a> {
    reference_index: usize,
    reference: &'a ReferenceSequence,
    genotype_index: usize,
    genotype: &'a GenotypeDefinition,
    genotypes: &'a GenotypeCatalog,
    config: &'a GenotypingConfig,
    span: Option<NaSpan>,
    wildcard_count: u32,
    discordant_positions: Vec<u32>,
    distance: f64,
}

impl<'a> BoundMatch<'a> {
    /// Bind a comparison result to its reference and genotype.
    ///
    /// # Errors
    ///
    /// Returns `GenotypingError::UnresolvedGenotype` naming the reference
    /// accession if its genotype, or any parent or breakpoint genotype of it,
    /// cannot be found in `genotypes`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        reference_index: usize,
        reference: &'a ReferenceSequence,
        span: Option<NaSpan>,
        wildcard_count: u32,
        discordant_positions: Vec<u32>,
        genotypes: &'a GenotypeCatalog,
        config: &'a GenotypingConfig,
    ) -> Result<Self, GenotypingError> {
        let unresolved = |genotype: &str| GenotypingError::UnresolvedGenotype {
            accession: reference.accession.clone(),
            genotype: genotype.to_string(),
        };

        let (genotype_index, genotype) = reference
            .genotype_index
            .and_then(|i| genotypes.get(i).map(|g| (i, g)))
            .filter(|(_, g)| g.name == reference.genotype)
            .ok_or_else(|| unresolved(&reference.genotype))?;

        for (name, &index) in genotype.parent_genotypes.iter().zip(&genotype.parent_indices) {
            if genotypes.get(index).is_none() {
                return Err(unresolved(name));
            }
        }
        if genotype.parent_indices.len() != genotype.parent_genotypes.len() {
            return Err(unresolved(&genotype.name));
        }
        for region in &genotype.regions {
            if region.genotype_index.and_then(|i| genotypes.get(i)).is_none() {
                return Err(unresolved(&region.genotype));
            }
        }

        let span_len = span.map_or(0, |s| s.len());
        let distance = distance(discordant_positions.len(), span_len, wildcard_count);

        Ok(Self {
            reference_index,
            reference,
            genotype_index,
            genotype,
            genotypes,
            config,
            span,
            wildcard_count,
            discordant_positions,
            distance,
        })
    }

    /// Index of the reference in its catalog
    #[must_use]
    pub fn reference_index(&self) -> usize {
        self.reference_index
    }

    #[must_use]
    pub fn reference(&self) -> &'a ReferenceSequence {
        self.reference
    }

    #[must_use]
    pub fn genotype_index(&self) -> usize {
        self.genotype_index
    }

    /// Genotype the reference is labeled with
    #[must_use]
    pub fn genotype(&self) -> &'a GenotypeDefinition {
        self.genotype
    }

    /// Positions compared (`None` if the query did not overlap the panel)
    #[must_use]
    pub fn span(&self) -> Option<NaSpan> {
        self.span
    }

    #[must_use]
    pub fn wildcard_count(&self) -> u32 {
        self.wildcard_count
    }

    #[must_use]
    pub fn discordant_positions(&self) -> &[u32] {
        &self.discordant_positions
    }

    #[must_use]
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Distance as a display percentage, e.g. `"1.23%"`
    #[must_use]
    pub fn percentage(&self) -> String {
        format_percentage(self.distance)
    }

    /// Whether the distance is below the reference genotype's own limit
    #[must_use]
    pub fn check_distance(&self) -> bool {
        self.genotype.check_distance(self.distance)
    }

    /// Constituent genotype explaining most of the compared span
    #[must_use]
    pub fn regional_match(&self) -> RegionalMatch {
        match self.span {
            Some(span) => self.genotypes.primary_regional_match(
                self.genotype_index,
                span,
                self.config.regional_confidence,
            ),
            None => RegionalMatch {
                genotype_index: self.genotype_index,
                proportion: 1.0,
            },
        }
    }

    /// The genotype this match supports.
    ///
    /// Matches beyond the unknown cutoff are `Unknown`. A sub-form or
    /// recombinant whose own distance limit fails is reported as its parents.
    #[must_use]
    pub fn display_genotype(&self) -> GenotypeCall {
        if self.distance > self.config.unknown_distance_cutoff {
            return GenotypeCall::Unknown;
        }

        let regional = self.regional_match();
        if regional.genotype_index == self.genotype_index
            && !self.check_distance()
            && self.genotype.has_parents()
        {
            return GenotypeCall::Parents(self.genotype.parent_indices.clone());
        }
        GenotypeCall::Genotype(regional.genotype_index)
    }

    /// Display names of the called genotype(s)
    #[must_use]
    pub fn display_genotype_names(&self) -> Vec<&'a str> {
        let genotypes = self.genotypes;
        match self.display_genotype() {
            GenotypeCall::Unknown => vec![genotypes.unknown_label()],
            GenotypeCall::Genotype(index) => genotypes
                .get(index)
                .map(GenotypeDefinition::display_name)
                .into_iter()
                .collect(),
            GenotypeCall::Parents(indices) => indices
                .iter()
                .filter_map(|&i| genotypes.get(i))
                .map(GenotypeDefinition::display_name)
                .collect(),
        }
    }

    /// Report line such as `"B (1.23%)"`, or the unknown label alone
    #[must_use]
    pub fn display(&self) -> String {
        let names = self.display_genotype_names().join(" + ");
        if matches!(self.display_genotype(), GenotypeCall::Unknown) {
            names
        } else {
            format!("{names} ({})", self.percentage())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::genotype::BreakpointRegion;
    use crate::core::types::GenotypeLevel;

    fn make_genotypes() -> GenotypeCatalog {
        GenotypeCatalog::new(vec![
            GenotypeDefinition::new("A", GenotypeLevel::Subtype, 0.05),
            GenotypeDefinition::new("A1", GenotypeLevel::SubSubtype, 0.02).with_parents(["A"]),
            GenotypeDefinition::new("G", GenotypeLevel::Subtype, 0.05),
            GenotypeDefinition::new("CRF02_AG", GenotypeLevel::Crf, 0.04)
                .with_parents(["A", "G"])
                .with_regions(vec![
                    BreakpointRegion::new("A", 1, 100),
                    BreakpointRegion::new("G", 101, 200),
                ]),
        ])
        .unwrap()
    }

    fn make_reference(genotypes: &GenotypeCatalog, genotype: &str) -> ReferenceSequence {
        let mut reference = ReferenceSequence::new("REF1", genotype, 1, "A".repeat(200));
        reference.genotype_index = genotypes.index_of(genotype);
        reference
    }

    fn discordant(count: u32, from: u32) -> Vec<u32> {
        (from..from + count).collect()
    }

    #[test]
    fn test_exact_match() {
        let genotypes = make_genotypes();
        let config = GenotypingConfig::default();
        let reference = make_reference(&genotypes, "A");
        let bound = BoundMatch::new(
            0,
            &reference,
            Some(NaSpan::new(1, 200)),
            0,
            Vec::new(),
            &genotypes,
            &config,
        )
        .unwrap();

        assert!((bound.distance() - 0.0).abs() < f64::EPSILON);
        assert_eq!(bound.percentage(), "0.00%");
        assert_eq!(bound.display(), "A (0.00%)");
    }

    #[test]
    fn test_wildcards_excluded_from_denominator() {
        let genotypes = make_genotypes();
        let config = GenotypingConfig::default();
        let reference = make_reference(&genotypes, "A");
        let bound = BoundMatch::new(
            0,
            &reference,
            Some(NaSpan::new(1, 100)),
            50,
            discordant(1, 10),
            &genotypes,
            &config,
        )
        .unwrap();
        assert!((bound.distance() - 0.02).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_above_cutoff() {
        let genotypes = make_genotypes();
        let config = GenotypingConfig::default();
        let reference = make_reference(&genotypes, "A");
        let bound = BoundMatch::new(
            0,
            &reference,
            Some(NaSpan::new(1, 100)),
            0,
            discordant(12, 1),
            &genotypes,
            &config,
        )
        .unwrap();

        assert_eq!(bound.display_genotype(), GenotypeCall::Unknown);
        assert_eq!(bound.display(), "Unknown");
    }

    #[test]
    fn test_cutoff_is_inclusive() {
        let genotypes = make_genotypes();
        let config = GenotypingConfig::default();
        let reference = make_reference(&genotypes, "A");
        // 11 / 100 = 0.11 is not above the cutoff
        let bound = BoundMatch::new(
            0,
            &reference,
            Some(NaSpan::new(1, 100)),
            0,
            discordant(11, 1),
            &genotypes,
            &config,
        )
        .unwrap();
        assert_eq!(
            bound.display_genotype(),
            GenotypeCall::Genotype(genotypes.index_of("A").unwrap())
        );
    }

    #[test]
    fn test_weak_subform_reports_parents() {
        let genotypes = make_genotypes();
        let config = GenotypingConfig::default();
        let reference = make_reference(&genotypes, "A1");
        // 3% fails A1's 2% limit
        let bound = BoundMatch::new(
            0,
            &reference,
            Some(NaSpan::new(1, 100)),
            0,
            discordant(3, 1),
            &genotypes,
            &config,
        )
        .unwrap();

        assert!(!bound.check_distance());
        assert_eq!(
            bound.display_genotype(),
            GenotypeCall::Parents(vec![genotypes.index_of("A").unwrap()])
        );
        assert_eq!(bound.display(), "A (3.00%)");
    }

    #[test]
    fn test_strong_subform_reported() {
        let genotypes = make_genotypes();
        let config = GenotypingConfig::default();
        let reference = make_reference(&genotypes, "A1");
        let bound = BoundMatch::new(
            0,
            &reference,
            Some(NaSpan::new(1, 100)),
            0,
            discordant(1, 1),
            &genotypes,
            &config,
        )
        .unwrap();
        assert_eq!(bound.display(), "A1 (1.00%)");
    }

    #[test]
    fn test_recombinant_regional_call() {
        let genotypes = make_genotypes();
        let config = GenotypingConfig::default();
        let reference = make_reference(&genotypes, "CRF02_AG");

        // Entirely within the G region
        let inside = BoundMatch::new(
            0,
            &reference,
            Some(NaSpan::new(120, 180)),
            0,
            Vec::new(),
            &genotypes,
            &config,
        )
        .unwrap();
        assert_eq!(inside.display(), "G (0.00%)");

        // Split evenly: the recombinant stands
        let split = BoundMatch::new(
            0,
            &reference,
            Some(NaSpan::new(51, 150)),
            0,
            Vec::new(),
            &genotypes,
            &config,
        )
        .unwrap();
        assert_eq!(split.display(), "CRF02_AG (0.00%)");

        // Split and failing its own limit: falls back to both parents
        let weak = BoundMatch::new(
            0,
            &reference,
            Some(NaSpan::new(51, 150)),
            0,
            discordant(5, 60),
            &genotypes,
            &config,
        )
        .unwrap();
        assert_eq!(weak.display(), "A + G (5.00%)");
    }

    #[test]
    fn test_unresolved_genotype_names_accession() {
        let genotypes = make_genotypes();
        let config = GenotypingConfig::default();
        let mut reference = ReferenceSequence::new("K03455", "Z", 1, "ACGT");
        reference.genotype_index = Some(99);

        let err = BoundMatch::new(0, &reference, None, 0, Vec::new(), &genotypes, &config)
            .unwrap_err();
        assert!(err.to_string().contains("K03455"));
    }

    #[test]
    fn test_no_overlap() {
        let genotypes = make_genotypes();
        let config = GenotypingConfig::default();
        let reference = make_reference(&genotypes, "A");
        let bound =
            BoundMatch::new(0, &reference, None, 0, Vec::new(), &genotypes, &config).unwrap();
        assert!((bound.distance() - 1.0).abs() < f64::EPSILON);
        assert_eq!(bound.display_genotype(), GenotypeCall::Unknown);
    }
}
