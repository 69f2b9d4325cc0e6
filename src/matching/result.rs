//! Ranked matches for one query and the final genotype call.

use std::cmp::Ordering;

use crate::matching::bound::BoundMatch;

/// Ranking order: closest first, then the deeper genotype, then panel order.
///
/// The depth tie-break puts a child before its parent at equal distance. It
/// applies to unrelated genotypes as well, so a sub-subtype ties ahead of any
/// subtype.
fn rank(a: &BoundMatch<'_>, b: &BoundMatch<'_>) -> Ordering {
    a.distance()
        .total_cmp(&b.distance())
        .then_with(|| b.genotype().depth.cmp(&a.genotype().depth))
        .then_with(|| a.reference_index().cmp(&b.reference_index()))
}

/// Every reference's match against one query, ranked
#[derive(Debug, Clone)]
pub struct MatchResult<'a> {
    matches: Vec<BoundMatch<'a>>,
    fallback_epsilon: f64,
}

impl<'a> MatchResult<'a> {
    /// Rank `matches`; `fallback_epsilon` bounds how much worse a fallback
    /// may be than the first match and still replace it.
    #[must_use]
    pub fn new(mut matches: Vec<BoundMatch<'a>>, fallback_epsilon: f64) -> Self {
        matches.sort_by(rank);
        Self {
            matches,
            fallback_epsilon,
        }
    }

    /// All matches in ranking order
    #[must_use]
    pub fn matches(&self) -> &[BoundMatch<'a>] {
        &self.matches
    }

    /// The `n` best ranked matches
    #[must_use]
    pub fn top(&self, n: usize) -> &[BoundMatch<'a>] {
        &self.matches[..n.min(self.matches.len())]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Closest match
    #[must_use]
    pub fn first_match(&self) -> Option<&BoundMatch<'a>> {
        self.matches.first()
    }

    /// Closest match whose genotype is a declared parent of the first match's
    #[must_use]
    pub fn parent_fallback(&self) -> Option<&BoundMatch<'a>> {
        let first = self.first_match()?;
        self.matches.iter().skip(1).find(|m| {
            first
                .genotype()
                .parent_indices
                .contains(&m.genotype_index())
        })
    }

    /// Closest match whose genotype declares the first match's genotype as a parent
    #[must_use]
    pub fn child_fallback(&self) -> Option<&BoundMatch<'a>> {
        let first = self.first_match()?;
        self.matches.iter().skip(1).find(|m| {
            m.genotype()
                .parent_indices
                .contains(&first.genotype_index())
        })
    }

    /// The match the final call is based on.
    ///
    /// A parent fallback replaces the first match when the first match fails
    /// its genotype's distance limit or the parent is within the fallback
    /// epsilon of it. Otherwise a child fallback within the epsilon, and itself
    /// within its own limit, replaces the first match. The parent is checked
    /// first, so it wins when both qualify.
    #[must_use]
    pub fn best_match(&self) -> Option<&BoundMatch<'a>> {
        let first = self.first_match()?;

        if let Some(parent) = self.parent_fallback() {
            if !first.check_distance()
                || parent.distance() - first.distance() < self.fallback_epsilon
            {
                return Some(parent);
            }
        }

        if let Some(child) = self.child_fallback() {
            if child.distance() - first.distance() < self.fallback_epsilon
                && child.check_distance()
            {
                return Some(child);
            }
        }

        Some(first)
    }
}
