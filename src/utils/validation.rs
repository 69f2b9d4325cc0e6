//! Centralized validation and helper functions.

use crate::core::nucleotide::is_valid_symbol;

/// Maximum number of query records read from a single file (DOS protection)
pub const MAX_QUERY_RECORDS: usize = 100_000;

/// Maximum length of a single aligned query sequence
pub const MAX_SEQUENCE_LENGTH: usize = 1_000_000;

/// Validate that a string is a valid MD5 checksum (32 hex characters).
///
/// # Examples
///
/// ```
/// use genotyper::utils::validation::is_valid_md5;
///
/// assert!(is_valid_md5("6aef897c3d6ff0c78aff06ac189178dd"));
/// assert!(!is_valid_md5("not-an-md5"));
/// assert!(!is_valid_md5("6aef897c3d6ff0c78aff06ac189178d")); // 31 chars
/// ```
#[must_use]
pub fn is_valid_md5(s: &str) -> bool {
    s.len() == 32 && s.chars().all(|c| c.is_ascii_hexdigit())
}

/// Normalize an MD5 string to lowercase.
/// Returns None if the input is not a valid MD5.
#[must_use]
pub fn normalize_md5(s: &str) -> Option<String> {
    if is_valid_md5(s) {
        Some(s.to_lowercase())
    } else {
        None
    }
}

/// Check if adding another query record would exceed the maximum allowed.
///
/// Call this with the current count BEFORE adding a new record.
/// Returns an error message if adding would exceed the limit, None if safe to add.
#[must_use]
pub fn check_record_limit(count: usize) -> Option<String> {
    if count >= MAX_QUERY_RECORDS {
        Some(format!(
            "Too many records: adding another would exceed maximum of {MAX_QUERY_RECORDS}"
        ))
    } else {
        None
    }
}

/// Sequence validation error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Empty sequence provided")]
    EmptySequence,
    #[error("Sequence too long: {0} bases exceeds {MAX_SEQUENCE_LENGTH}")]
    SequenceTooLong(usize),
    #[error("Invalid base '{symbol}' at offset {offset}")]
    InvalidBase { offset: usize, symbol: char },
}

/// Validate an aligned nucleotide sequence.
///
/// Accepts nucleotides, IUPAC ambiguity codes and the gap `-`, in either case.
///
/// # Errors
///
/// Returns `ValidationError::EmptySequence` for an empty input,
/// `ValidationError::SequenceTooLong` above [`MAX_SEQUENCE_LENGTH`], or
/// `ValidationError::InvalidBase` with the 1-based offset of the first bad symbol.
pub fn validate_sequence(sequence: &[u8]) -> Result<(), ValidationError> {
    if sequence.is_empty() {
        return Err(ValidationError::EmptySequence);
    }
    if sequence.len() > MAX_SEQUENCE_LENGTH {
        return Err(ValidationError::SequenceTooLong(sequence.len()));
    }
    match sequence.iter().position(|&b| !is_valid_symbol(b)) {
        Some(i) => Err(ValidationError::InvalidBase {
            offset: i + 1,
            symbol: sequence[i] as char,
        }),
        None => Ok(()),
    }
}
