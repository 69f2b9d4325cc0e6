use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};

use crate::catalog::genotypes::GenotypeCatalog;
use crate::catalog::store::{Dataset, ReferenceCatalog};
use crate::cli::OutputFormat;
use crate::core::genotype::GenotypeDefinition;

#[derive(Args)]
pub struct CatalogArgs {
    #[command(subcommand)]
    pub command: CatalogCommands,
}

#[derive(Subcommand)]
pub enum CatalogCommands {
    /// List all genotypes in the dataset
    List {
        /// Path to the dataset file
        #[arg(long, required = true)]
        dataset: PathBuf,

        /// Filter by level (e.g., "subtype", "CRF")
        #[arg(long)]
        level: Option<String>,
    },

    /// Show details of a genotype and its references
    Show {
        /// Genotype name
        #[arg(required = true)]
        genotype: String,

        /// Path to the dataset file
        #[arg(long, required = true)]
        dataset: PathBuf,
    },

    /// Validate a dataset and export it to a file
    Export {
        /// Output file path
        #[arg(required = true)]
        output: PathBuf,

        /// Path to the dataset file
        #[arg(long, required = true)]
        dataset: PathBuf,
    },
}

/// Execute catalog subcommand
///
/// # Errors
///
/// Returns an error if the dataset cannot be loaded or the genotype is unknown.
pub fn run(args: CatalogArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    match args.command {
        CatalogCommands::List { dataset, level } => {
            run_list(&dataset, level.as_deref(), format, verbose)
        }
        CatalogCommands::Show { genotype, dataset } => run_show(&genotype, &dataset, format),
        CatalogCommands::Export { output, dataset } => run_export(&output, &dataset),
    }
}

fn load(path: &Path) -> anyhow::Result<(GenotypeCatalog, ReferenceCatalog)> {
    Ok(Dataset::load_from_file(path)?.into_catalogs()?)
}

fn reference_count(references: &ReferenceCatalog, genotype: &GenotypeDefinition) -> usize {
    references
        .references
        .iter()
        .filter(|r| r.genotype == genotype.name)
        .count()
}

fn parent_names(genotype: &GenotypeDefinition) -> String {
    if genotype.parent_genotypes.is_empty() {
        "-".to_string()
    } else {
        genotype.parent_genotypes.join(",")
    }
}

fn region_summary(genotype: &GenotypeDefinition) -> String {
    if genotype.regions.is_empty() {
        return "-".to_string();
    }
    genotype
        .regions
        .iter()
        .map(|r| format!("{}:{}", r.genotype, r.span()))
        .collect::<Vec<_>>()
        .join(",")
}

fn run_list(
    dataset: &Path,
    level_filter: Option<&str>,
    format: OutputFormat,
    verbose: bool,
) -> anyhow::Result<()> {
    let (genotypes, references) = load(dataset)?;

    if verbose {
        eprintln!(
            "Loaded dataset with {} genotypes and {} references",
            genotypes.len(),
            references.len()
        );
    }

    let filtered: Vec<&GenotypeDefinition> = genotypes
        .genotypes()
        .iter()
        .filter(|g| {
            level_filter.map_or(true, |level| {
                g.level.to_string().eq_ignore_ascii_case(level)
            })
        })
        .collect();

    match format {
        OutputFormat::Text => {
            let name_width = filtered
                .iter()
                .map(|g| g.display_name().len())
                .max()
                .unwrap_or(8)
                .max(8);

            println!("Genotype Catalog ({} genotypes)\n", filtered.len());
            println!(
                "{:<name_w$} {:<12} {:>8} {:>5} {:<15} Regions",
                "Genotype",
                "Level",
                "Limit",
                "Refs",
                "Parents",
                name_w = name_width
            );
            println!("{}", "-".repeat(name_width + 60));

            for genotype in &filtered {
                println!(
                    "{:<name_w$} {:<12} {:>8.4} {:>5} {:<15} {}",
                    genotype.display_name(),
                    genotype.level.to_string(),
                    genotype.distance_upper_limit,
                    reference_count(&references, genotype),
                    parent_names(genotype),
                    region_summary(genotype),
                    name_w = name_width
                );
            }

            if let Some(span) = references.span() {
                println!("\nReference span: {span}");
            }
        }
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = filtered
                .iter()
                .map(|g| {
                    serde_json::json!({
                        "name": g.name,
                        "display_name": g.display_name(),
                        "level": g.level,
                        "distance_upper_limit": g.distance_upper_limit,
                        "parent_genotypes": g.parent_genotypes,
                        "regions": g.regions,
                        "references": reference_count(&references, g),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("name\tlevel\tdistance_upper_limit\treferences\tparents\tregions");
            for genotype in &filtered {
                println!(
                    "{}\t{}\t{}\t{}\t{}\t{}",
                    genotype.name,
                    genotype.level,
                    genotype.distance_upper_limit,
                    reference_count(&references, genotype),
                    parent_names(genotype),
                    region_summary(genotype)
                );
            }
        }
    }

    Ok(())
}

fn run_show(name: &str, dataset: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let (genotypes, references) = load(dataset)?;

    let genotype = genotypes
        .by_name(name)
        .ok_or_else(|| anyhow::anyhow!("Genotype '{}' not found", name))?;
    let members: Vec<_> = references
        .references
        .iter()
        .filter(|r| r.genotype == genotype.name)
        .collect();

    match format {
        OutputFormat::Text => {
            println!("Genotype: {}\n", genotype.display_name());
            println!("Name:     {}", genotype.name);
            println!("Level:    {}", genotype.level);
            println!("Limit:    {}", genotype.distance_upper_limit);
            println!("Parents:  {}", parent_names(genotype));

            if !genotype.regions.is_empty() {
                println!("\nBreakpoints:");
                for region in &genotype.regions {
                    println!("  {:<12} {}", region.genotype, region.span());
                }
            }

            println!("\nReferences ({}):", members.len());
            println!("{:<30} {:<12} MD5", "Reference", "Span");
            println!("{}", "-".repeat(80));
            for reference in &members {
                println!(
                    "{:<30} {:<12} {}",
                    reference.label(),
                    reference.span().to_string(),
                    reference.compute_md5()
                );
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "genotype": genotype,
                "references": members
                    .iter()
                    .map(|r| serde_json::json!({
                        "accession": r.accession,
                        "country": r.country,
                        "author_year": r.author_year,
                        "first_na": r.first_na,
                        "last_na": r.last_na,
                        "md5": r.compute_md5(),
                    }))
                    .collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("accession\tcountry\tauthor_year\tfirst_na\tlast_na\tmd5");
            for reference in &members {
                println!(
                    "{}\t{}\t{}\t{}\t{}\t{}",
                    reference.accession,
                    reference.country.as_deref().unwrap_or("-"),
                    reference.author_year.as_deref().unwrap_or("-"),
                    reference.first_na,
                    reference.last_na,
                    reference.compute_md5()
                );
            }
        }
    }

    Ok(())
}

fn run_export(output: &Path, dataset: &Path) -> anyhow::Result<()> {
    let data = Dataset::load_from_file(dataset)?;

    // Only export datasets that load cleanly
    data.clone().into_catalogs()?;

    let json = data.to_json()?;
    std::fs::write(output, json)?;

    println!(
        "Exported {} genotypes and {} references to {}",
        data.genotypes.len(),
        data.references.len(),
        output.display()
    );

    Ok(())
}
