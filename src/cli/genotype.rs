use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use serde::Serialize;
use tracing::warn;

use crate::catalog::genotypes::DEFAULT_REGIONAL_CONFIDENCE;
use crate::cli::OutputFormat;
use crate::core::types::NaSpan;
use crate::matching::bound::BoundMatch;
use crate::matching::engine::{
    GenotypingConfig, GenotypingEngine, DEFAULT_FALLBACK_EPSILON, DEFAULT_UNKNOWN_DISTANCE_CUTOFF,
};
use crate::parsing::fasta::{is_fasta_file, parse_query_file, QueryRecord};
use crate::parsing::resistance::parse_resistance_file;

#[derive(Args)]
pub struct GenotypeArgs {
    /// FASTA file of aligned query sequences (optionally gzipped)
    #[arg(required = true)]
    pub input: PathBuf,

    /// Dataset JSON with genotype definitions and reference sequences
    #[arg(long, required = true)]
    pub dataset: PathBuf,

    /// TSV of drug-resistance mutations whose codons are exempt from discordance
    /// Columns: gene, gene_first_na, position, amino_acids
    #[arg(long)]
    pub resistance: Option<PathBuf>,

    /// First aligned position for records without a `first_na=` description token
    #[arg(long)]
    pub first_na: Option<u32>,

    /// Number of ranked matches to show per query
    #[arg(short = 'n', long, default_value = "3")]
    pub max_matches: usize,

    /// Distance above which the genotype is reported as unknown
    #[arg(long, default_value_t = DEFAULT_UNKNOWN_DISTANCE_CUTOFF)]
    pub unknown_cutoff: f64,

    /// Share of the query a recombinant region must explain to be reported
    #[arg(long, default_value_t = DEFAULT_REGIONAL_CONFIDENCE)]
    pub regional_confidence: f64,

    /// Distance margin for preferring a child genotype over the closest match
    #[arg(long, default_value_t = DEFAULT_FALLBACK_EPSILON)]
    pub fallback_epsilon: f64,
}

impl GenotypeArgs {
    fn config(&self) -> anyhow::Result<GenotypingConfig> {
        anyhow::ensure!(
            self.unknown_cutoff.is_finite() && self.unknown_cutoff >= 0.0,
            "--unknown-cutoff must be a non-negative number"
        );
        anyhow::ensure!(
            self.regional_confidence > 0.0 && self.regional_confidence <= 1.0,
            "--regional-confidence must be in (0, 1]"
        );
        anyhow::ensure!(
            self.fallback_epsilon.is_finite() && self.fallback_epsilon >= 0.0,
            "--fallback-epsilon must be a non-negative number"
        );
        Ok(GenotypingConfig {
            unknown_distance_cutoff: self.unknown_cutoff,
            regional_confidence: self.regional_confidence,
            fallback_epsilon: self.fallback_epsilon,
        })
    }
}

/// Serializable summary of one reference match
#[derive(Debug, Clone, Serialize)]
pub struct MatchSummary {
    pub accession: String,
    pub reference: String,
    pub reference_genotype: String,
    pub genotypes: Vec<String>,
    pub call: String,
    pub distance: f64,
    pub percentage: String,
    pub within_limit: bool,
    pub discordant: usize,
    pub discordant_positions: Vec<u32>,
}

impl MatchSummary {
    fn new(bound: &BoundMatch<'_>) -> Self {
        Self {
            accession: bound.reference().accession.clone(),
            reference: bound.reference().label(),
            reference_genotype: bound.genotype().display_name().to_string(),
            genotypes: bound
                .display_genotype_names()
                .into_iter()
                .map(str::to_string)
                .collect(),
            call: bound.display(),
            distance: bound.distance(),
            percentage: bound.percentage(),
            within_limit: bound.check_distance(),
            discordant: bound.discordant_positions().len(),
            discordant_positions: bound.discordant_positions().to_vec(),
        }
    }
}

/// Genotyping outcome for one query record
#[derive(Debug, Clone, Serialize)]
pub struct QueryReport {
    pub name: String,
    pub first_na: u32,
    pub length: usize,
    pub span: Option<NaSpan>,
    pub wildcards: u32,
    pub best_match: Option<MatchSummary>,
    pub first_match: Option<MatchSummary>,
    pub parent_fallback: Option<MatchSummary>,
    pub child_fallback: Option<MatchSummary>,
    pub matches: Vec<MatchSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueryReport {
    /// Genotype a single record
    fn build(
        engine: &GenotypingEngine,
        name: String,
        sequence: &[u8],
        first_na: u32,
        max_matches: usize,
    ) -> Self {
        let mut report = Self {
            name,
            first_na,
            length: sequence.len(),
            span: None,
            wildcards: 0,
            best_match: None,
            first_match: None,
            parent_fallback: None,
            child_fallback: None,
            matches: Vec::new(),
            error: None,
        };

        match engine.compare_all(sequence, first_na) {
            Ok(result) => {
                if let Some(first) = result.first_match() {
                    report.span = first.span();
                    report.wildcards = first.wildcard_count();
                }
                report.best_match = result.best_match().map(MatchSummary::new);
                report.first_match = result.first_match().map(MatchSummary::new);
                report.parent_fallback = result.parent_fallback().map(MatchSummary::new);
                report.child_fallback = result.child_fallback().map(MatchSummary::new);
                report.matches = result
                    .top(max_matches)
                    .iter()
                    .map(MatchSummary::new)
                    .collect();
            }
            Err(e) => {
                warn!(query = %report.name, error = %e, "Failed to genotype query");
                report.error = Some(e.to_string());
            }
        }

        report
    }
}

/// Execute genotype subcommand
///
/// # Errors
///
/// Returns an error if the dataset, resistance file or queries cannot be
/// loaded, or a record has no first aligned position.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: GenotypeArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let config = args.config()?;

    if !is_fasta_file(&args.input) {
        anyhow::bail!(
            "Unsupported query file '{}': expected .fa, .fasta, .fna or .fas (optionally .gz)",
            args.input.display()
        );
    }

    let mut engine = GenotypingEngine::from_dataset(&args.dataset)?.with_config(config);
    if let Some(path) = &args.resistance {
        engine = engine.with_resistance(parse_resistance_file(path)?);
    }

    if verbose {
        eprintln!(
            "Loaded {} genotypes and {} references ({} resistance codons)",
            engine.genotypes().len(),
            engine.references().len(),
            engine.resistance().len()
        );
    }

    if engine.references().is_empty() {
        eprintln!("Warning: Dataset has no references, no genotypes can be called.");
    }

    let records = parse_query_file(&args.input)?;
    if verbose {
        eprintln!("Parsed {} query records", records.len());
    }

    let jobs = records
        .into_iter()
        .map(|record| {
            let first_na = record.first_na.or(args.first_na).ok_or_else(|| {
                anyhow::anyhow!(
                    "Record '{}' has no first_na= token and --first-na was not given",
                    record.name
                )
            })?;
            Ok((record, first_na))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let rt = tokio::runtime::Runtime::new()?;
    let reports = rt.block_on(genotype_all(Arc::new(engine), jobs, args.max_matches))?;

    match format {
        OutputFormat::Text => print_text_results(&reports, verbose),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
        OutputFormat::Tsv => print_tsv_results(&reports),
    }

    Ok(())
}

/// Genotype every record on the blocking pool, sharing one engine.
/// Reports are returned in input order.
///
/// # Errors
///
/// Returns an error if a genotyping task panics.
pub async fn genotype_all(
    engine: Arc<GenotypingEngine>,
    jobs: Vec<(QueryRecord, u32)>,
    max_matches: usize,
) -> anyhow::Result<Vec<QueryReport>> {
    let handles: Vec<_> = jobs
        .into_iter()
        .map(|(record, first_na)| {
            let engine = Arc::clone(&engine);
            tokio::task::spawn_blocking(move || {
                QueryReport::build(
                    &engine,
                    record.name,
                    &record.sequence,
                    first_na,
                    max_matches,
                )
            })
        })
        .collect();

    let mut reports = Vec::with_capacity(handles.len());
    for handle in handles {
        reports.push(handle.await?);
    }
    Ok(reports)
}

fn print_text_results(reports: &[QueryReport], verbose: bool) {
    for report in reports {
        let span = report
            .span
            .map_or_else(|| "no overlap".to_string(), |s| s.to_string());
        println!(
            "{} (first_na={}, {} bases, compared {})",
            report.name, report.first_na, report.length, span
        );

        if let Some(error) = &report.error {
            println!("  Error: {error}\n");
            continue;
        }

        let describe = |m: &Option<MatchSummary>| {
            m.as_ref()
                .map_or_else(|| "-".to_string(), |m| format!("{} [{}]", m.call, m.accession))
        };
        println!("  Genotype:        {}", describe(&report.best_match));
        if verbose {
            println!("  First match:     {}", describe(&report.first_match));
            println!("  Parent fallback: {}", describe(&report.parent_fallback));
            println!("  Child fallback:  {}", describe(&report.child_fallback));
            println!("  Wildcards:       {}", report.wildcards);
        }

        if !report.matches.is_empty() {
            println!();
            println!(
                "  {:<4} {:<30} {:<12} {:>8} {:>10}",
                "Rank", "Reference", "Genotype", "Distance", "Discordant"
            );
            for (i, m) in report.matches.iter().enumerate() {
                println!(
                    "  {:<4} {:<30} {:<12} {:>8} {:>10}",
                    i + 1,
                    m.reference,
                    m.reference_genotype,
                    m.percentage,
                    m.discordant
                );
            }
        }
        println!();
    }
}

fn print_tsv_results(reports: &[QueryReport]) {
    println!("query\tfirst_na\tgenotype\tdistance\taccession\tfirst_accession\tfirst_genotype\tfirst_distance\terror");
    for report in reports {
        let best = report.best_match.as_ref();
        let first = report.first_match.as_ref();
        let genotype = best.map_or_else(|| "-".to_string(), |m| m.genotypes.join("+"));
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            report.name,
            report.first_na,
            genotype,
            best.map_or_else(|| "-".to_string(), |m| format!("{:.6}", m.distance)),
            best.map_or("-", |m| m.accession.as_str()),
            first.map_or("-", |m| m.accession.as_str()),
            first.map_or("-", |m| m.reference_genotype.as_str()),
            first.map_or_else(|| "-".to_string(), |m| format!("{:.6}", m.distance)),
            report.error.as_deref().unwrap_or("-"),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::genotypes::GenotypeCatalog;
    use crate::catalog::store::ReferenceCatalog;
    use crate::core::genotype::GenotypeDefinition;
    use crate::core::reference::ReferenceSequence;
    use crate::core::types::GenotypeLevel;

    fn make_engine() -> GenotypingEngine {
        let genotypes = GenotypeCatalog::new(vec![
            GenotypeDefinition::new("B", GenotypeLevel::Subtype, 0.2),
            GenotypeDefinition::new("C", GenotypeLevel::Subtype, 0.2),
        ])
        .unwrap();
        let references = ReferenceCatalog::new(
            vec![
                ReferenceSequence::new("RB", "B", 1, "ACGTACGTAC"),
                ReferenceSequence::new("RC", "C", 1, "TCGTTCGTTC"),
            ],
            &genotypes,
        )
        .unwrap();
        GenotypingEngine::new(genotypes, references).unwrap()
    }

    fn record(name: &str, sequence: &[u8]) -> QueryRecord {
        QueryRecord {
            name: name.to_string(),
            first_na: Some(1),
            sequence: sequence.to_vec(),
        }
    }

    #[test]
    fn test_report_for_valid_query() {
        let engine = make_engine();
        let report = QueryReport::build(&engine, "q1".to_string(), b"ACGTACGTAC", 1, 1);

        assert!(report.error.is_none());
        assert_eq!(report.span, Some(NaSpan::new(1, 10)));
        assert_eq!(report.matches.len(), 1);
        let best = report.best_match.unwrap();
        assert_eq!(best.accession, "RB");
        assert_eq!(best.call, "B (0.00%)");
    }

    #[test]
    fn test_report_for_invalid_query() {
        let engine = make_engine();
        let report = QueryReport::build(&engine, "bad".to_string(), b"ACXT", 1, 3);
        assert!(report.error.is_some());
        assert!(report.best_match.is_none());
    }

    #[test]
    fn test_config_validation() {
        let mut args = GenotypeArgs {
            input: PathBuf::from("q.fasta"),
            dataset: PathBuf::from("d.json"),
            resistance: None,
            first_na: None,
            max_matches: 3,
            unknown_cutoff: DEFAULT_UNKNOWN_DISTANCE_CUTOFF,
            regional_confidence: DEFAULT_REGIONAL_CONFIDENCE,
            fallback_epsilon: DEFAULT_FALLBACK_EPSILON,
        };
        assert!(args.config().is_ok());

        args.regional_confidence = 1.5;
        assert!(args.config().is_err());
    }

    #[tokio::test]
    async fn test_genotype_all_keeps_input_order() {
        let engine = Arc::new(make_engine());
        let jobs: Vec<_> = (0..20)
            .map(|i| {
                let sequence: &[u8] = if i % 2 == 0 { b"ACGTACGTAC" } else { b"TCGTTCGTTC" };
                (record(&format!("q{i}"), sequence), 1)
            })
            .collect();

        let reports = genotype_all(engine, jobs, 2).await.unwrap();
        assert_eq!(reports.len(), 20);
        for (i, report) in reports.iter().enumerate() {
            assert_eq!(report.name, format!("q{i}"));
            let expected = if i % 2 == 0 { "RB" } else { "RC" };
            assert_eq!(report.best_match.as_ref().unwrap().accession, expected);
        }
    }
}
