//! End-to-end tests of the genotyper command-line interface.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

const PANEL: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/panel.json");
const QUERIES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/queries.fasta");
const SDRM: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/sdrm.tsv");

fn genotyper() -> Command {
    Command::cargo_bin("genotyper").unwrap()
}

#[test]
fn test_genotype_text_output() {
    genotyper()
        .args(["genotype", QUERIES, "--dataset", PANEL, "--first-na", "2253"])
        .assert()
        .success()
        .stdout(predicate::str::contains("q_b (first_na=2253"))
        .stdout(predicate::str::contains("B (0.00%) [K03455]"))
        .stdout(predicate::str::contains("G (0.00%) [AF061641]"))
        .stdout(predicate::str::contains("compared 2257-2308"));
}

#[test]
fn test_genotype_json_output() {
    let output = genotyper()
        .args([
            "genotype",
            QUERIES,
            "--dataset",
            PANEL,
            "--first-na",
            "2253",
            "--format",
            "json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let reports: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let reports = reports.as_array().unwrap();
    assert_eq!(reports.len(), 3);

    assert_eq!(reports[0]["name"], "q_b");
    assert_eq!(reports[0]["best_match"]["accession"], "K03455");
    assert_eq!(reports[0]["best_match"]["percentage"], "0.00%");

    // Recombinant tied with its parent ranks first, the tied parent is the call
    assert_eq!(reports[1]["first_match"]["accession"], "L39106");
    assert_eq!(reports[1]["first_match"]["call"], "G (0.00%)");
    assert_eq!(reports[1]["parent_fallback"]["accession"], "AF061641");
    assert_eq!(reports[1]["best_match"]["accession"], "AF061641");
    assert_eq!(reports[1]["best_match"]["genotypes"][0], "G");

    // Padding wildcards are trimmed before comparison
    assert_eq!(reports[2]["span"]["first_na"], 2257);
    assert_eq!(reports[2]["span"]["last_na"], 2308);
    assert_eq!(reports[2]["wildcards"], 0);
}

#[test]
fn test_genotype_tsv_output() {
    genotyper()
        .args([
            "genotype",
            QUERIES,
            "--dataset",
            PANEL,
            "--first-na",
            "2253",
            "--format",
            "tsv",
        ])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("query\tfirst_na\tgenotype"))
        .stdout(predicate::str::contains("q_b\t2253\tB\t0.000000\tK03455"));
}

#[test]
fn test_genotype_with_resistance() {
    genotyper()
        .args([
            "genotype",
            QUERIES,
            "--dataset",
            PANEL,
            "--first-na",
            "2253",
            "--resistance",
            SDRM,
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("B (0.00%)"));
}

#[test]
fn test_missing_first_na_fails() {
    genotyper()
        .args(["genotype", QUERIES, "--dataset", PANEL])
        .assert()
        .failure()
        .stderr(predicate::str::contains("q_padded"));
}

#[test]
fn test_unsupported_query_extension_fails() {
    genotyper()
        .args(["genotype", PANEL, "--dataset", PANEL])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported query file"));
}

#[test]
fn test_invalid_dataset_fails() {
    let mut dataset = NamedTempFile::with_suffix(".json").unwrap();
    dataset
        .write_all(
            br#"{"version": "1.0.0", "genotypes": [
                {"name": "A1", "distance_upper_limit": 0.03, "parent_genotypes": ["A"]}
            ], "references": []}"#,
        )
        .unwrap();
    dataset.flush().unwrap();

    genotyper()
        .args(["catalog", "list", "--dataset"])
        .arg(dataset.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown parent genotype 'A'"));
}

#[test]
fn test_catalog_list() {
    genotyper()
        .args(["catalog", "list", "--dataset", PANEL])
        .assert()
        .success()
        .stdout(predicate::str::contains("Genotype Catalog (5 genotypes)"))
        .stdout(predicate::str::contains("CRF02_AG"))
        .stdout(predicate::str::contains("A:2253-2282,G:2283-2312"))
        .stdout(predicate::str::contains("Reference span: 2253-2312"));
}

#[test]
fn test_catalog_list_filtered_tsv() {
    genotyper()
        .args([
            "catalog", "list", "--dataset", PANEL, "--level", "crf", "--format", "tsv",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("CRF02_AG\tCRF"))
        .stdout(predicate::str::contains("\nB\t").not());
}

#[test]
fn test_catalog_show() {
    genotyper()
        .args(["catalog", "show", "A1", "--dataset", PANEL])
        .assert()
        .success()
        .stdout(predicate::str::contains("Parents:  A"))
        .stdout(predicate::str::contains("AF004885 (UG)"));

    genotyper()
        .args(["catalog", "show", "Z", "--dataset", PANEL])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Genotype 'Z' not found"));
}

#[test]
fn test_catalog_export_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("exported.json");

    genotyper()
        .args(["catalog", "export"])
        .arg(&output)
        .args(["--dataset", PANEL])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Exported 5 genotypes and 5 references",
        ));

    genotyper()
        .args(["catalog", "list", "--dataset"])
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Genotype Catalog (5 genotypes)"));
}
