//! Per-reference discordance scanning.
//!
//! A query position is discordant with a reference only when *no* concrete
//! interpretation of the query base is supported by the reference base, so
//! ambiguity codes get the benefit of the doubt.
//!
//! Inside codons listed in [`ResistanceCodons`] discordances are held back
//! until the codon is complete. If the query codon is one of the
//! resistance-associated codons for that position the held-back positions are
//! dropped, otherwise they are committed. A codon the scan cannot complete
//! commits whatever it buffered.

use crate::catalog::index::MismatchIndex;
use crate::core::nucleotide::{is_wildcard, BaseSet};
use crate::core::types::NaSpan;
use crate::matching::resistance::ResistanceCodons;

/// Discordances of one query against every reference of the panel
#[derive(Debug, Clone, Default)]
pub struct Comparison {
    /// Positions actually compared (query after trimming, clipped to the panel)
    pub span: Option<NaSpan>,

    /// Wildcard bases inside `span`
    pub wildcard_count: u32,

    /// Discordant absolute positions, indexed by reference, ascending
    pub discordance: Vec<Vec<u32>>,
}

impl Comparison {
    /// Discordant positions for one reference (empty if out of range)
    #[must_use]
    pub fn discordant_positions(&self, reference: usize) -> &[u32] {
        self.discordance.get(reference).map_or(&[], Vec::as_slice)
    }
}

/// Codon whose discordances are held back until its third base is seen
struct PendingCodon {
    start: u32,
    buffered: Vec<(u32, u32)>,
}

impl PendingCodon {
    fn commit(self, discordance: &mut [Vec<u32>]) {
        for (reference, position) in self.buffered {
            discordance[reference as usize].push(position);
        }
    }
}

/// Scans query sequences against a [`MismatchIndex`]
pub struct SequenceComparator<'a> {
    index: &'a MismatchIndex,
    resistance: &'a ResistanceCodons,
}

impl<'a> SequenceComparator<'a> {
    pub fn new(index: &'a MismatchIndex, resistance: &'a ResistanceCodons) -> Self {
        Self { index, resistance }
    }

    /// Compare an aligned query starting at `first_na` against every reference.
    ///
    /// Leading and trailing wildcards are trimmed first and never compared.
    /// Positions outside the panel span are ignored.
    #[must_use]
    pub fn compare(&self, sequence: &[u8], first_na: u32) -> Comparison {
        let num_references = self.index.num_references();
        let mut comparison = Comparison {
            discordance: vec![Vec::new(); num_references],
            ..Comparison::default()
        };

        let Some((trimmed, first_na)) = trim_wildcards(sequence, first_na) else {
            return comparison;
        };
        let last_na = u32::try_from(trimmed.len() - 1)
            .ok()
            .and_then(|extent| first_na.checked_add(extent));
        let Some(last_na) = last_na else {
            return comparison;
        };
        let query_span = NaSpan::new(first_na, last_na);
        let Some(span) = self.index.span().and_then(|s| s.intersect(&query_span)) else {
            return comparison;
        };

        let start = (span.first_na - first_na) as usize;
        let excerpt = &trimmed[start..start + span.len() as usize];

        #[allow(clippy::cast_possible_truncation)]
        let wildcard_count = excerpt.iter().filter(|&&b| is_wildcard(b)).count() as u32;
        comparison.span = Some(span);
        comparison.wildcard_count = wildcard_count;

        let discordance = &mut comparison.discordance;
        let mut counts = vec![0u8; num_references];
        let mut found: Vec<u32> = Vec::new();
        let mut pending: Option<PendingCodon> = None;

        for (offset, &base) in excerpt.iter().enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            let position = span.first_na + offset as u32;

            if self.resistance.is_codon_start(position) {
                if let Some(previous) = pending.take() {
                    previous.commit(discordance);
                }
                pending = Some(PendingCodon {
                    start: position,
                    buffered: Vec::new(),
                });
            }

            // Wildcards carry no information, not even against a gap
            found.clear();
            if !is_wildcard(base) {
                self.discordant_references(position, BaseSet::expand(base), &mut counts, &mut found);
            }

            match pending.as_mut() {
                Some(codon) => codon
                    .buffered
                    .extend(found.iter().map(|&reference| (reference, position))),
                None => {
                    for &reference in &found {
                        discordance[reference as usize].push(position);
                    }
                }
            }

            let codon_complete = pending
                .as_ref()
                .is_some_and(|codon| position == codon.start + 2);
            if codon_complete {
                if let Some(codon) = pending.take() {
                    let observed = &excerpt[offset - 2..=offset];
                    if !self.resistance.contains(codon.start, observed) {
                        codon.commit(discordance);
                    }
                }
            }
        }

        if let Some(codon) = pending.take() {
            codon.commit(discordance);
        }

        comparison
    }

    /// Collect references for which every interpretation of `query` is
    /// unsupported at `position`.
    fn discordant_references(
        &self,
        position: u32,
        query: BaseSet,
        counts: &mut [u8],
        found: &mut Vec<u32>,
    ) {
        let interpretations = query.len();
        match interpretations {
            0 => {
                #[allow(clippy::cast_possible_truncation)]
                found.extend(0..counts.len() as u32);
            }
            1 => {
                for symbol in query.indices() {
                    found.extend_from_slice(self.index.unsupported(position, symbol));
                }
            }
            _ => {
                for symbol in query.indices() {
                    for &reference in self.index.unsupported(position, symbol) {
                        let count = &mut counts[reference as usize];
                        *count += 1;
                        if usize::from(*count) == interpretations {
                            found.push(reference);
                        }
                    }
                }
                for symbol in query.indices() {
                    for &reference in self.index.unsupported(position, symbol) {
                        counts[reference as usize] = 0;
                    }
                }
            }
        }
    }
}

/// Strip leading and trailing wildcards, shifting `first_na` accordingly.
/// Returns `None` if nothing but wildcards remains or the shifted start does
/// not fit in a `u32`.
#[must_use]
pub fn trim_wildcards(sequence: &[u8], first_na: u32) -> Option<(&[u8], u32)> {
    let start = sequence.iter().position(|&b| !is_wildcard(b))?;
    let end = sequence.iter().rposition(|&b| !is_wildcard(b))?;
    let first_na = first_na.checked_add(u32::try_from(start).ok()?)?;
    Some((&sequence[start..=end], first_na))
}
