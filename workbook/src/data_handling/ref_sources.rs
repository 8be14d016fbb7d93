use std::path::PathBuf;

use polars::prelude::*;
use tracing::info;

use crate::helper_functions::{read_delim, require_columns};
use crate::identity::fusion_identity_expr;
use crate::models::Source;

/// Curated literature-reference index: which databases report each fusion.
/// Rows may carry a single label or an already comma-joined list; labels are
/// exploded here and re-aggregated by the join engine, so upstream
/// duplicates can never survive.
pub struct RefSourcesSource {
    pub path: Option<PathBuf>,
}

impl Source for RefSourcesSource {
    fn load(&self) -> PolarsResult<DataFrame> {
        let Some(path) = &self.path else {
            return Ok(DataFrame::empty());
        };
        info!("reading reference sources from {}", path.display());
        let df = read_delim(path, b'\t', false)?;
        require_columns(&df, &["Fusion", "ReferenceSources"], "reference sources")?;

        let split = df
            .lazy()
            .with_column(fusion_identity_expr(col("Fusion")))
            .with_column(col("ReferenceSources").str().split(lit(",")))
            .collect()?
            .explode(["ReferenceSources"])?;

        split
            .lazy()
            .with_column(col("ReferenceSources").str().strip_chars(lit(NULL)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explodes_label_lists_and_normalizes_fusions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ReferenceSources.tsv");
        std::fs::write(
            &path,
            "Fusion\tReferenceSources\nEML4-ALK\tCOSMIC, ChimerKB4\nTPM3--NTRK1\tFusionGDB2\n",
        )
        .unwrap();

        let df = RefSourcesSource { path: Some(path) }.load().unwrap();
        assert_eq!(df.height(), 3);
        let fusions = df.column("Fusion").unwrap().str().unwrap();
        let labels = df.column("ReferenceSources").unwrap().str().unwrap();
        assert_eq!(fusions.get(0), Some("EML4--ALK"));
        assert_eq!(labels.get(0), Some("COSMIC"));
        assert_eq!(labels.get(1), Some("ChimerKB4"));
    }

    #[test]
    fn absent_source_is_empty() {
        let df = RefSourcesSource { path: None }.load().unwrap();
        assert_eq!(df.height(), 0);
    }
}
