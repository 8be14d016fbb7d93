//! Specimen and fusion identity normalization.
//!
//! Sample names are hyphen-delimited (`RUN-SPECIMEN-PANEL-LANE_...`); fusion
//! names arrive spelled with `::`, `-` or `--` depending on the source and
//! are canonicalized to `GENE_A--GENE_B` before any key comparison.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;

/// Gene pair separated by `::`, `--` or `-`, tolerating surrounding
/// whitespace. Tokens start with an uppercase letter; `_` stays inside the
/// token class so transcript accessions are captured whole and can be
/// rejected by prefix.
static FUSION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([A-Z][A-Za-z0-9_.-]*?)\s*(?:::|--|-)\s*([A-Z][A-Za-z0-9_.-]*)").unwrap()
});

/// Matches any accepted fusion-name separator spelling.
static SEPARATOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"::|--|-").unwrap());

const TRANSCRIPT_PREFIXES: [&str; 3] = ["NM_", "NR_", "ENST"];

/// Extract the specimen id (second hyphen-delimited field) from a sample or
/// file name. `None` when fewer than two fields exist; callers treat that as
/// a join miss, never a success.
pub fn parse_specimen_id(sample: &str) -> Option<&str> {
    sample.split('-').nth(1)
}

/// Human-readable specimen label: the first three hyphen-delimited fields
/// re-joined. Names with fewer fields pass through unchanged.
pub fn parse_display_name(sample: &str) -> String {
    sample.split('-').take(3).collect::<Vec<_>>().join("-")
}

/// Canonicalize one fusion-name spelling: any separator becomes `--`.
pub fn normalize_fusion_name(name: &str) -> String {
    SEPARATOR_RE.replace_all(name, "--").into_owned()
}

fn is_transcript_accession(token: &str) -> bool {
    TRANSCRIPT_PREFIXES.iter().any(|p| token.starts_with(p))
}

/// Scan free text (e.g. a clinical result field) for gene-pair patterns and
/// return the deduplicated, sorted set rewritten as `GENE_A--GENE_B`.
///
/// Deliberately permissive: over-matches in informal text are discarded by
/// downstream joins, while a dropped true positive would be unrecoverable.
/// Pairs containing a transcript accession (`NM_`, `NR_`, `ENST`) are never
/// gene fusions and are rejected.
pub fn extract_fusions(text: &str) -> Vec<String> {
    let mut found = BTreeSet::new();
    for caps in FUSION_RE.captures_iter(text) {
        let left = &caps[1];
        let right = &caps[2];
        if is_transcript_accession(left) || is_transcript_accession(right) {
            continue;
        }
        found.insert(format!("{left}--{right}"));
    }
    found.into_iter().collect()
}

/// Vectorized `parse_specimen_id`: null when the name has fewer than two
/// hyphen-delimited fields.
pub fn specimen_expr(name_col: &str) -> Expr {
    col(name_col)
        .str()
        .extract(lit(r"^[^-]*-([^-]*)"), 1)
        .alias("SPECIMEN")
}

/// Vectorized `parse_display_name`: first three hyphen-delimited fields,
/// the whole name when it has fewer.
pub fn display_name_expr(name_col: &str) -> Expr {
    col(name_col)
        .str()
        .extract(lit(r"^([^-]*-[^-]*-[^-]*)"), 1)
        .fill_null(col(name_col))
        .alias("Filename")
}

/// Vectorized `normalize_fusion_name`, applied to structured fusion columns
/// before they are used as join keys.
pub fn fusion_identity_expr(e: Expr) -> Expr {
    e.str().replace_all(lit("::|--|-"), lit("--"), false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    #[test]
    fn parse_specimen_id_takes_second_field() {
        let sample = "12345678-2XXXXSXXX-25PCAN4-10011_S33_L001_R1";
        assert_eq!(parse_specimen_id(sample), Some("2XXXXSXXX"));
    }

    #[test]
    fn parse_specimen_id_is_deterministic() {
        let sample = "12345678-2XXXXSXXX-25PCAN4-10011_S33_L001_R1";
        assert_eq!(parse_specimen_id(sample), parse_specimen_id(sample));
    }

    #[test]
    fn parse_specimen_id_fails_without_two_fields() {
        assert_eq!(parse_specimen_id("nodelimiters"), None);
        assert_eq!(parse_specimen_id(""), None);
    }

    #[test]
    fn parse_display_name_takes_first_three_fields() {
        let sample = "12345678-2XXXXSXXX-25PCAN4-10011_S33_L001_R1";
        assert_eq!(parse_display_name(sample), "12345678-2XXXXSXXX-25PCAN4");
    }

    #[test]
    fn normalize_fusion_name_unifies_separators() {
        assert_eq!(normalize_fusion_name("EML4::ALK"), "EML4--ALK");
        assert_eq!(normalize_fusion_name("EML4-ALK"), "EML4--ALK");
        assert_eq!(normalize_fusion_name("EML4--ALK"), "EML4--ALK");
    }

    #[test]
    fn extract_fusions_finds_pairs_across_separators() {
        let found = extract_fusions("EML4::ALK, TPM3 - ROS1");
        assert!(found.contains(&"EML4--ALK".to_string()));
        assert!(found.contains(&"TPM3--ROS1".to_string()));
    }

    #[test]
    fn extract_fusions_rejects_transcript_accessions() {
        assert!(extract_fusions("ALK--NM_123456").is_empty());
        assert!(extract_fusions("ENST00005::ROS1").is_empty());
    }

    #[test]
    fn extract_fusions_deduplicates_and_sorts() {
        let found = extract_fusions("EML4::ALK and again EML4-ALK; also AKAP9--BRAF");
        assert_eq!(found, vec!["AKAP9--BRAF".to_string(), "EML4--ALK".to_string()]);
    }

    #[test]
    fn extract_fusions_empty_input() {
        assert!(extract_fusions("").is_empty());
        assert!(extract_fusions("no fusions reported").is_empty());
    }

    #[test]
    fn specimen_expr_matches_scalar_parse() {
        let df = df![
            "file_name" => &["12345678-2XXXXSXXX-25PCAN4-10011_S33", "broken"]
        ]
        .unwrap();
        let out = df
            .lazy()
            .with_column(specimen_expr("file_name"))
            .collect()
            .unwrap();
        let specimens = out.column("SPECIMEN").unwrap().str().unwrap();
        assert_eq!(specimens.get(0), Some("2XXXXSXXX"));
        assert_eq!(specimens.get(1), None);
    }

    #[test]
    fn fusion_identity_expr_matches_scalar_normalize() {
        let df = df!["Fusion" => &["EML4::ALK", "TPM3-NTRK1", "A--B"]].unwrap();
        let out = df
            .lazy()
            .with_column(fusion_identity_expr(col("Fusion")))
            .collect()
            .unwrap();
        let fusions = out.column("Fusion").unwrap().str().unwrap();
        assert_eq!(fusions.get(0), Some("EML4--ALK"));
        assert_eq!(fusions.get(1), Some("TPM3--NTRK1"));
        assert_eq!(fusions.get(2), Some("A--B"));
    }
}
