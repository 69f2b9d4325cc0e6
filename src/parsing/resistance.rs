use std::path::Path;

use tracing::debug;

use crate::matching::resistance::{ResistanceCodons, ResistanceMutation};
use crate::parsing::ParseError;

/// Parse a resistance mutation TSV with columns:
/// gene, `gene_first_na`, position, `amino_acids`
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or other parse errors
/// if the content is invalid.
pub fn parse_resistance_file(path: &Path) -> Result<ResistanceCodons, ParseError> {
    let content = std::fs::read_to_string(path)?;
    let mutations = parse_resistance_text(&content)?;
    let codons = ResistanceCodons::from_mutations(&mutations);
    debug!(
        path = %path.display(),
        mutations = mutations.len(),
        codon_starts = codons.len(),
        "Loaded resistance mutations"
    );
    Ok(codons)
}

/// Parse resistance mutation TSV text.
///
/// Blank lines and `#` comments are skipped, as is a header line starting
/// with `gene`.
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` if a line has fewer than 4 fields,
/// a non-numeric or zero position, or amino acids that are not letters or `*`.
pub fn parse_resistance_text(text: &str) -> Result<Vec<ResistanceMutation>, ParseError> {
    let mut mutations = Vec::new();
    let mut first_data_line = true;

    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').map(str::trim).collect();

        // Check if first non-empty/non-comment line is a header
        if first_data_line {
            first_data_line = false;
            if fields.first().is_some_and(|f| f.eq_ignore_ascii_case("gene")) {
                continue;
            }
        }

        // Line numbers in errors are 1-based for user friendliness
        let line_num = i + 1;

        if fields.len() < 4 {
            return Err(ParseError::InvalidFormat(format!(
                "Line {line_num} has fewer than 4 fields"
            )));
        }

        let parse_position = |field: &str, column: &str| {
            field
                .parse::<u32>()
                .ok()
                .filter(|&n| n > 0)
                .ok_or_else(|| {
                    ParseError::InvalidFormat(format!(
                        "Invalid {column} on line {line_num}: '{field}'"
                    ))
                })
        };
        let gene_first_na = parse_position(fields[1], "gene_first_na")?;
        let position = parse_position(fields[2], "position")?;

        let amino_acids = fields[3].to_ascii_uppercase();
        if amino_acids.is_empty()
            || !amino_acids
                .chars()
                .all(|c| c.is_ascii_alphabetic() || c == '*')
        {
            return Err(ParseError::InvalidFormat(format!(
                "Invalid amino acids on line {line_num}: '{}'",
                fields[3]
            )));
        }

        mutations.push(ResistanceMutation {
            gene: fields[0].to_string(),
            gene_first_na,
            position,
            amino_acids,
        });
    }

    Ok(mutations)
}
