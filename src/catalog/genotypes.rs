//! Genotype definitions with resolved parent links and breakpoint maps.
//!
//! Names used for cross references (parents, breakpoint constituents) are
//! resolved into catalog indices once, when the catalog is built. Any name that
//! does not resolve, an inconsistent breakpoint map or a parent cycle aborts
//! construction.

use std::collections::HashMap;

use tracing::debug;

use crate::catalog::store::CatalogError;
use crate::core::genotype::{GenotypeDefinition, RegionalMatch};
use crate::core::types::NaSpan;

/// Label reported when no genotype can be assigned
pub const DEFAULT_UNKNOWN_LABEL: &str = "Unknown";

/// Minimum share of the query span a single region must explain
pub const DEFAULT_REGIONAL_CONFIDENCE: f64 = 0.90;

/// Helper function to convert a position count to f64
#[inline]
fn count_to_f64(count: u32) -> f64 {
    f64::from(count)
}

/// Immutable set of genotype definitions
#[derive(Debug, Clone)]
pub struct GenotypeCatalog {
    genotypes: Vec<GenotypeDefinition>,

    /// Index: genotype name -> index in `genotypes`
    name_to_index: HashMap<String, usize>,

    unknown_label: String,
}

impl GenotypeCatalog {
    /// Build and validate a catalog from definitions.
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError` for duplicate names, unresolved parent or
    /// breakpoint genotypes, non-positive distance limits, inconsistent
    /// breakpoints, or cycles in the parent graph.
    pub fn new(genotypes: Vec<GenotypeDefinition>) -> Result<Self, CatalogError> {
        let mut name_to_index = HashMap::with_capacity(genotypes.len());
        for (i, genotype) in genotypes.iter().enumerate() {
            if name_to_index.insert(genotype.name.clone(), i).is_some() {
                return Err(CatalogError::DuplicateGenotype(genotype.name.clone()));
            }
        }

        let mut genotypes = genotypes;
        for genotype in &mut genotypes {
            if !(genotype.distance_upper_limit.is_finite() && genotype.distance_upper_limit > 0.0)
            {
                return Err(CatalogError::InvalidDistanceLimit {
                    genotype: genotype.name.clone(),
                    limit: genotype.distance_upper_limit,
                });
            }

            genotype.parent_indices = genotype
                .parent_genotypes
                .iter()
                .map(|parent| {
                    name_to_index
                        .get(parent)
                        .copied()
                        .ok_or_else(|| CatalogError::UnknownParent {
                            genotype: genotype.name.clone(),
                            parent: parent.clone(),
                        })
                })
                .collect::<Result<_, _>>()?;

            for region in &mut genotype.regions {
                let index = name_to_index.get(&region.genotype).copied().ok_or_else(|| {
                    CatalogError::UnknownRegionGenotype {
                        genotype: genotype.name.clone(),
                        constituent: region.genotype.clone(),
                    }
                })?;
                region.genotype_index = Some(index);
            }

            validate_breakpoints(genotype)?;
        }

        let depths = compute_depths(&genotypes)?;
        for (genotype, depth) in genotypes.iter_mut().zip(depths) {
            genotype.depth = depth;
        }

        debug!(
            genotypes = genotypes.len(),
            recombinants = genotypes.iter().filter(|g| g.is_recombinant()).count(),
            "Built genotype catalog"
        );

        Ok(Self {
            genotypes,
            name_to_index,
            unknown_label: DEFAULT_UNKNOWN_LABEL.to_string(),
        })
    }

    /// Override the label used for unassignable sequences
    #[must_use]
    pub fn with_unknown_label(mut self, label: impl Into<String>) -> Self {
        self.unknown_label = label.into();
        self
    }

    #[must_use]
    pub fn unknown_label(&self) -> &str {
        &self.unknown_label
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&GenotypeDefinition> {
        self.genotypes.get(index)
    }

    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.name_to_index.get(name).copied()
    }

    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&GenotypeDefinition> {
        self.index_of(name).and_then(|i| self.get(i))
    }

    #[must_use]
    pub fn genotypes(&self) -> &[GenotypeDefinition] {
        &self.genotypes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.genotypes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.genotypes.is_empty()
    }

    /// Whether `parent` is a declared parent of `child`
    #[must_use]
    pub fn is_parent_of(&self, parent: usize, child: usize) -> bool {
        self.get(child)
            .is_some_and(|c| c.parent_indices.contains(&parent))
    }

    /// Strict distance test against a genotype's limit; unknown indices fail
    #[must_use]
    pub fn check_distance(&self, index: usize, distance: f64) -> bool {
        self.get(index)
            .is_some_and(|genotype| genotype.check_distance(distance))
    }

    /// Share of `span` explained by each constituent genotype.
    ///
    /// A genotype without breakpoints explains the whole span itself. A
    /// constituent that appears in several regions accumulates its shares.
    #[must_use]
    pub fn regional_matches(&self, index: usize, span: NaSpan) -> Vec<RegionalMatch> {
        let whole = vec![RegionalMatch {
            genotype_index: index,
            proportion: 1.0,
        }];

        let Some(genotype) = self.get(index) else {
            return whole;
        };
        if genotype.regions.is_empty() || span.is_empty() {
            return whole;
        }

        let span_len = count_to_f64(span.len());
        let mut matches: Vec<RegionalMatch> = Vec::new();
        for region in &genotype.regions {
            let Some(constituent) = region.genotype_index else {
                continue;
            };
            let share = count_to_f64(region.span().overlap_len(&span)) / span_len;
            match matches.iter_mut().find(|m| m.genotype_index == constituent) {
                Some(existing) => existing.proportion += share,
                None => matches.push(RegionalMatch {
                    genotype_index: constituent,
                    proportion: share,
                }),
            }
        }
        matches
    }

    /// The regional match explaining most of `span`, if it explains at least
    /// `confidence` of it; otherwise the genotype itself with proportion 1.0.
    #[must_use]
    pub fn primary_regional_match(
        &self,
        index: usize,
        span: NaSpan,
        confidence: f64,
    ) -> RegionalMatch {
        let mut best: Option<RegionalMatch> = None;
        for candidate in self.regional_matches(index, span) {
            if best.map_or(true, |b| candidate.proportion > b.proportion) {
                best = Some(candidate);
            }
        }

        match best {
            Some(m) if m.proportion >= confidence => m,
            _ => RegionalMatch {
                genotype_index: index,
                proportion: 1.0,
            },
        }
    }
}

/// Regions must be well formed, in genome order and contiguous
fn validate_breakpoints(genotype: &GenotypeDefinition) -> Result<(), CatalogError> {
    let invalid = |reason: String| CatalogError::InvalidBreakpoints {
        genotype: genotype.name.clone(),
        reason,
    };

    for region in &genotype.regions {
        if region.start == 0 || region.start > region.end {
            return Err(invalid(format!(
                "region {} has invalid bounds {}-{}",
                region.genotype, region.start, region.end
            )));
        }
    }

    for pair in genotype.regions.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        if next.start <= prev.end {
            return Err(invalid(format!(
                "region {}-{} overlaps region {}-{}",
                next.start, next.end, prev.start, prev.end
            )));
        }
        if next.start != prev.end + 1 {
            return Err(invalid(format!(
                "gap between {} and {}",
                prev.end, next.start
            )));
        }
    }

    Ok(())
}

/// Longest parent chain above each genotype, rejecting cycles
fn compute_depths(genotypes: &[GenotypeDefinition]) -> Result<Vec<usize>, CatalogError> {
    #[derive(Clone, Copy, PartialEq)]
    enum State {
        Unvisited,
        InProgress,
        Done(usize),
    }

    fn visit(
        index: usize,
        genotypes: &[GenotypeDefinition],
        states: &mut [State],
    ) -> Result<usize, CatalogError> {
        match states[index] {
            State::Done(depth) => return Ok(depth),
            State::InProgress => {
                return Err(CatalogError::ParentCycle(genotypes[index].name.clone()))
            }
            State::Unvisited => {}
        }

        states[index] = State::InProgress;
        let mut depth = 0;
        for &parent in &genotypes[index].parent_indices {
            depth = depth.max(visit(parent, genotypes, states)? + 1);
        }
        states[index] = State::Done(depth);
        Ok(depth)
    }

    let mut states = vec![State::Unvisited; genotypes.len()];
    (0..genotypes.len())
        .map(|i| visit(i, genotypes, &mut states))
        .collect()
}
