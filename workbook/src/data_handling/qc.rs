use std::path::PathBuf;

use polars::prelude::*;
use tracing::info;

use crate::helper_functions::{read_delim, require_columns};
use crate::models::Source;

pub const REQUIRED_COLUMNS: &[&str] = &["Sample", "total_deduplicated_percentage", "Total Sequences"];

/// QC summarizer output: one tab-separated table with per-sample read
/// counts and the deduplicated percentage, from which the read metrics
/// reported per specimen are derived.
pub struct QcSource {
    pub path: Option<PathBuf>,
}

impl Source for QcSource {
    fn load(&self) -> PolarsResult<DataFrame> {
        let Some(path) = &self.path else {
            return Ok(DataFrame::empty());
        };
        info!("reading QC metrics from {}", path.display());
        let df = read_delim(path, b'\t', false)?;
        require_columns(&df, REQUIRED_COLUMNS, "qc")?;
        derive_read_metrics(df)
    }
}

/// Derive unique/duplicate read counts (and their per-million forms) from
/// the deduplicated percentage. Fractional reads are truncated.
pub fn derive_read_metrics(df: DataFrame) -> PolarsResult<DataFrame> {
    df.lazy()
        .with_column(
            ((col("total_deduplicated_percentage") / lit(100.0)) * col("Total Sequences"))
                .cast(DataType::Int64)
                .alias("Unique Reads"),
        )
        .with_column(
            (col("Total Sequences").cast(DataType::Int64) - col("Unique Reads"))
                .alias("Duplicate Reads"),
        )
        .with_columns([
            (col("Unique Reads").cast(DataType::Float64) / lit(1_000_000.0))
                .alias("Unique Reads(M)"),
            (col("Duplicate Reads").cast(DataType::Float64) / lit(1_000_000.0))
                .alias("Duplicate Reads(M)"),
        ])
        .select([
            col("Sample"),
            col("Unique Reads"),
            col("Duplicate Reads"),
            col("Unique Reads(M)"),
            col("Duplicate Reads(M)"),
        ])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    #[test]
    fn computes_read_metrics() {
        let df = df![
            "Sample" => &["12345678-2SPECAAAA1-25PCAN4-10011_S33"],
            "total_deduplicated_percentage" => &[75.0],
            "Total Sequences" => &[1_000_000i64],
        ]
        .unwrap();
        let out = derive_read_metrics(df).unwrap();
        assert_eq!(out.column("Unique Reads").unwrap().i64().unwrap().get(0), Some(750_000));
        assert_eq!(out.column("Duplicate Reads").unwrap().i64().unwrap().get(0), Some(250_000));
        assert_eq!(out.column("Unique Reads(M)").unwrap().f64().unwrap().get(0), Some(0.75));
        assert_eq!(
            out.get_column_names().iter().map(|c| c.as_str()).collect::<Vec<_>>(),
            vec!["Sample", "Unique Reads", "Duplicate Reads", "Unique Reads(M)", "Duplicate Reads(M)"]
        );
    }

    #[test]
    fn missing_required_columns_fail_loudly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("multiqc.tsv");
        std::fs::write(&path, "Sample\tTotal Sequences\nS1\t100\n").unwrap();
        let err = QcSource { path: Some(path) }.load().unwrap_err();
        assert!(err.to_string().contains("total_deduplicated_percentage"));
    }

    #[test]
    fn absent_source_is_empty() {
        let df = QcSource { path: None }.load().unwrap();
        assert_eq!(df.height(), 0);
    }
}
