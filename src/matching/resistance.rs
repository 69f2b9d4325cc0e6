//! Codons associated with drug-resistance mutations.
//!
//! Inside these codons, differences from a reference are often the result of
//! treatment selection rather than genotype, so the comparator exempts them
//! when the query codon is one of the known resistance codons.

use std::collections::{HashMap, HashSet};

/// Amino acids of the standard genetic code, indexed by codon in `TCAG` order
const AMINO_ACIDS: &[u8; 64] =
    b"FFLLSSSSYY**CC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG";
const CODON_BASES: &[u8; 4] = b"TCAG";

/// Translate an unambiguous codon with the standard genetic code
#[must_use]
pub fn translate(codon: &[u8]) -> Option<char> {
    if codon.len() != 3 {
        return None;
    }
    let mut index = 0;
    for &base in codon {
        let base = match base.to_ascii_uppercase() {
            b'U' => b'T',
            other => other,
        };
        index = index * 4 + CODON_BASES.iter().position(|&b| b == base)?;
    }
    Some(AMINO_ACIDS[index] as char)
}

/// All codons encoding an amino acid (`*` for stop)
pub fn codons_for(amino_acid: char) -> impl Iterator<Item = String> {
    let amino_acid = if amino_acid.is_ascii() {
        amino_acid.to_ascii_uppercase() as u8
    } else {
        0
    };
    AMINO_ACIDS
        .iter()
        .enumerate()
        .filter(move |(_, &aa)| aa == amino_acid)
        .map(|(i, _)| {
            [i / 16, (i / 4) % 4, i % 4]
                .iter()
                .map(|&b| CODON_BASES[b] as char)
                .collect()
        })
}

/// A resistance-associated amino acid position from the mutation catalogue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResistanceMutation {
    /// Gene name (e.g. "RT")
    pub gene: String,
    /// Absolute position of the gene's first nucleotide
    pub gene_first_na: u32,
    /// Amino acid position within the gene (1-based)
    pub position: u32,
    /// Resistance-associated amino acids at this position (e.g. "VI")
    pub amino_acids: String,
}

impl ResistanceMutation {
    /// Absolute position of the first nucleotide of the codon
    #[must_use]
    pub fn codon_start(&self) -> u32 {
        self.gene_first_na + (self.position.saturating_sub(1)) * 3
    }
}

/// Absolute codon-start position -> resistance-associated codons
#[derive(Debug, Clone, Default)]
pub struct ResistanceCodons {
    codons: HashMap<u32, HashSet<String>>,
}

impl ResistanceCodons {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive codons by reverse translating each mutation's amino acids.
    /// Symbols outside the genetic code (insertions, deletions) are ignored.
    #[must_use]
    pub fn from_mutations(mutations: &[ResistanceMutation]) -> Self {
        let mut codons = Self::new();
        for mutation in mutations {
            let encoded: Vec<String> = mutation.amino_acids.chars().flat_map(codons_for).collect();
            if !encoded.is_empty() {
                codons.insert(mutation.codon_start(), encoded);
            }
        }
        codons
    }

    /// Register codons at a codon-start position
    pub fn insert<S: AsRef<str>>(&mut self, codon_start: u32, codons: impl IntoIterator<Item = S>) {
        self.codons
            .entry(codon_start)
            .or_default()
            .extend(codons.into_iter().map(|c| c.as_ref().to_ascii_uppercase()));
    }

    #[must_use]
    pub fn get(&self, codon_start: u32) -> Option<&HashSet<String>> {
        self.codons.get(&codon_start)
    }

    /// Whether a codon starts at this position
    #[must_use]
    pub fn is_codon_start(&self, position: u32) -> bool {
        self.codons.contains_key(&position)
    }

    /// Whether `codon` is a known resistance codon at `codon_start`
    #[must_use]
    pub fn contains(&self, codon_start: u32, codon: &[u8]) -> bool {
        let Ok(codon) = std::str::from_utf8(codon) else {
            return false;
        };
        self.codons
            .get(&codon_start)
            .is_some_and(|set| set.contains(&codon.to_ascii_uppercase()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.codons.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codons.is_empty()
    }
}
