use tracing::debug;

use crate::catalog::store::{CatalogError, ReferenceCatalog};
use crate::core::nucleotide::{BaseSet, NUM_CONCRETE};
use crate::core::types::NaSpan;

/// Per-position, per-symbol lookup of references that do *not* support a
/// concrete symbol.
///
/// Buckets are laid out as `relative_position * NUM_CONCRETE + symbol_index`
/// and each holds reference indices in ascending order. The index is built
/// once and only read afterwards, so it can be shared freely between threads.
#[derive(Debug, Clone, Default)]
pub struct MismatchIndex {
    span: Option<NaSpan>,
    num_references: usize,
    buckets: Vec<Vec<u32>>,
}

impl MismatchIndex {
    /// Build the index over every reference of a catalog.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::SpanMismatch` naming the first reference whose
    /// span differs from the first reference's.
    pub fn build(catalog: &ReferenceCatalog) -> Result<Self, CatalogError> {
        let Some(first) = catalog.references.first() else {
            return Ok(Self::default());
        };
        let span = first.span();
        let span_len = span.len() as usize;
        let mut buckets: Vec<Vec<u32>> = vec![Vec::new(); span_len * NUM_CONCRETE];

        for (ref_index, reference) in catalog.references.iter().enumerate() {
            if reference.span() != span {
                return Err(CatalogError::SpanMismatch {
                    accession: reference.accession.clone(),
                    expected: span,
                    found: reference.span(),
                });
            }

            #[allow(clippy::cast_possible_truncation)] // Panels hold far fewer than u32::MAX references
            let ref_index = ref_index as u32;
            for (offset, &base) in reference.sequence.as_bytes().iter().take(span_len).enumerate() {
                let supported = BaseSet::expand(base);
                for symbol in supported.complement_indices() {
                    buckets[offset * NUM_CONCRETE + symbol].push(ref_index);
                }
            }
        }

        for bucket in &mut buckets {
            bucket.shrink_to_fit();
        }

        debug!(
            references = catalog.len(),
            positions = span_len,
            entries = buckets.iter().map(Vec::len).sum::<usize>(),
            "Built mismatch index"
        );

        Ok(Self {
            span: Some(span),
            num_references: catalog.len(),
            buckets,
        })
    }

    /// Span covered by the index (`None` for an empty panel)
    #[must_use]
    pub fn span(&self) -> Option<NaSpan> {
        self.span
    }

    #[must_use]
    pub fn num_references(&self) -> usize {
        self.num_references
    }

    /// References that do not support `symbol_index` at an absolute position.
    /// Positions outside the span have no entries.
    #[must_use]
    pub fn unsupported(&self, position: u32, symbol_index: usize) -> &[u32] {
        let Some(span) = self.span else {
            return &[];
        };
        if !span.contains(position) || symbol_index >= NUM_CONCRETE {
            return &[];
        }
        let offset = (position - span.first_na) as usize;
        self.buckets
            .get(offset * NUM_CONCRETE + symbol_index)
            .map_or(&[], Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::genotypes::GenotypeCatalog;
    use crate::core::genotype::GenotypeDefinition;
    use crate::core::reference::ReferenceSequence;
    use crate::core::types::GenotypeLevel;

    fn make_catalog(references: Vec<ReferenceSequence>) -> ReferenceCatalog {
        let genotypes = GenotypeCatalog::new(vec![GenotypeDefinition::new(
            "B",
            GenotypeLevel::Subtype,
            0.05,
        )])
        .unwrap();
        ReferenceCatalog::new(references, &genotypes).unwrap()
    }

    #[test]
    fn test_unambiguous_reference() {
        let catalog = make_catalog(vec![
            ReferenceSequence::new("R0", "B", 10, "AC"),
            ReferenceSequence::new("R1", "B", 10, "GC"),
        ]);
        let index = MismatchIndex::build(&catalog).unwrap();

        // Position 10: A supported by R0 only, G by R1 only
        assert_eq!(index.unsupported(10, 0), &[1]);
        assert_eq!(index.unsupported(10, 2), &[0]);
        assert_eq!(index.unsupported(10, 1), &[0, 1]);
        assert_eq!(index.unsupported(10, 4), &[0, 1]);

        // Position 11: C supported by both
        assert!(index.unsupported(11, 1).is_empty());
    }

    #[test]
    fn test_ambiguous_reference_base() {
        let catalog = make_catalog(vec![ReferenceSequence::new("R0", "B", 1, "R")]);
        let index = MismatchIndex::build(&catalog).unwrap();

        assert!(index.unsupported(1, 0).is_empty()); // A
        assert!(index.unsupported(1, 2).is_empty()); // G
        assert_eq!(index.unsupported(1, 1), &[0]); // C
        assert_eq!(index.unsupported(1, 3), &[0]); // T
    }

    #[test]
    fn test_out_of_span() {
        let catalog = make_catalog(vec![ReferenceSequence::new("R0", "B", 10, "AC")]);
        let index = MismatchIndex::build(&catalog).unwrap();
        assert!(index.unsupported(9, 1).is_empty());
        assert!(index.unsupported(12, 1).is_empty());
        assert_eq!(index.span(), Some(NaSpan::new(10, 11)));
    }

    #[test]
    fn test_span_mismatch_detected() {
        let mut catalog = make_catalog(vec![
            ReferenceSequence::new("R0", "B", 10, "AC"),
            ReferenceSequence::new("R1", "B", 10, "AC"),
        ]);
        catalog.references[1] = ReferenceSequence::new("R1", "B", 11, "AC");

        let err = MismatchIndex::build(&catalog).unwrap_err();
        assert!(err.to_string().contains("R1"));
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = make_catalog(Vec::new());
        let index = MismatchIndex::build(&catalog).unwrap();
        assert_eq!(index.span(), None);
        assert_eq!(index.num_references(), 0);
        assert!(index.unsupported(1, 0).is_empty());
    }
}
