//! Command-line interface for genotyper.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **genotype**: Genotype aligned query sequences from a FASTA file
//! - **catalog**: List, show, or export the genotypes and references of a dataset
//!
//! ## Usage
//!
//! ```text
//! # Genotype queries against a reference panel
//! genotyper genotype queries.fasta --dataset hiv1.json
//!
//! # Exempt drug-resistance codons, JSON output for scripting
//! genotyper genotype queries.fasta --dataset hiv1.json --resistance sdrm.tsv --format json
//!
//! # Inspect the dataset
//! genotyper catalog list --dataset hiv1.json
//! genotyper catalog show CRF01_AE --dataset hiv1.json
//! ```

use clap::{Parser, Subcommand};

pub mod catalog;
pub mod genotype;

#[derive(Parser)]
#[command(name = "genotyper")]
#[command(version)]
#[command(about = "Assign viral genotypes to aligned sequences by reference distance")]
#[command(
    long_about = "genotyper compares aligned nucleotide sequences against a panel of genotyped reference sequences.\n\nFor each query it reports:\n- The closest references, ranked by distance\n- The genotype call, with recombinant regions and parent genotypes resolved\n- Fallbacks to parent or child genotypes when the closest match is ambiguous"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Genotype aligned sequences from a FASTA file
    Genotype(genotype::GenotypeArgs),

    /// Inspect a genotyping dataset
    Catalog(catalog::CatalogArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}
