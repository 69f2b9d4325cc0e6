//! Nucleotide alphabet and IUPAC ambiguity expansion.
//!
//! Every symbol accepted in a reference or query sequence expands to a set of
//! *concrete* symbols. The concrete alphabet is `A`, `C`, `G`, `T` plus the
//! alignment gap `-`, so a deletion in the query only agrees with a deletion
//! in the reference.

/// The wildcard symbol: no information at this position.
pub const WILDCARD: u8 = b'N';

/// Concrete symbols in index order.
pub const CONCRETE_SYMBOLS: [u8; 5] = [b'A', b'C', b'G', b'T', b'-'];

/// Number of concrete symbols tracked per position.
pub const NUM_CONCRETE: usize = CONCRETE_SYMBOLS.len();

const A: u8 = 1 << 0;
const C: u8 = 1 << 1;
const G: u8 = 1 << 2;
const T: u8 = 1 << 3;
const GAP: u8 = 1 << 4;

/// Set of concrete symbols a (possibly ambiguous) symbol may stand for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BaseSet(u8);

impl BaseSet {
    pub const EMPTY: Self = Self(0);

    /// Expand a symbol into its concrete interpretations.
    ///
    /// Unrecognised symbols expand to the empty set; callers validate input
    /// with [`is_valid_symbol`] before it reaches the matching code.
    #[must_use]
    pub fn expand(symbol: u8) -> Self {
        let bits = match symbol.to_ascii_uppercase() {
            b'A' => A,
            b'C' => C,
            b'G' => G,
            b'T' | b'U' => T,
            b'R' => A | G,
            b'Y' => C | T,
            b'M' => A | C,
            b'K' => G | T,
            b'S' => C | G,
            b'W' => A | T,
            b'H' => A | C | T,
            b'B' => C | G | T,
            b'V' => A | C | G,
            b'D' => A | G | T,
            b'N' => A | C | G | T,
            b'-' => GAP,
            _ => 0,
        };
        Self(bits)
    }

    #[must_use]
    pub fn contains(self, index: usize) -> bool {
        index < NUM_CONCRETE && self.0 & (1 << index) != 0
    }

    #[must_use]
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Indices (into [`CONCRETE_SYMBOLS`]) of the symbols in this set.
    pub fn indices(self) -> impl Iterator<Item = usize> {
        (0..NUM_CONCRETE).filter(move |&i| self.contains(i))
    }

    /// Indices of the concrete symbols *not* in this set.
    pub fn complement_indices(self) -> impl Iterator<Item = usize> {
        (0..NUM_CONCRETE).filter(move |&i| !self.contains(i))
    }
}

/// Whether a symbol is a nucleotide, IUPAC ambiguity code or gap.
#[must_use]
pub fn is_valid_symbol(symbol: u8) -> bool {
    !BaseSet::expand(symbol).is_empty()
}

#[must_use]
pub fn is_wildcard(symbol: u8) -> bool {
    symbol.to_ascii_uppercase() == WILDCARD
}
