use std::path::PathBuf;

use polars::prelude::*;
use tracing::{debug, info};

use crate::helper_functions::{read_many, require_columns};
use crate::models::Source;

/// Suffix of the companion predictor output for the same sample. The
/// annotation tool names its files differently; rewriting the origin column
/// to the predictor convention keeps one filename vocabulary per sample.
pub const COMPANION_SUFFIX: &str = "_FusionInspector.fusions.abridged.merged.tsv";

/// Fusion-annotation tool output (frame/type classification per breakpoint
/// pair), many tab-separated files per run.
pub struct AnnotationSource {
    pub paths: Vec<PathBuf>,
}

impl Source for AnnotationSource {
    fn load(&self) -> PolarsResult<DataFrame> {
        info!("reading {} annotation file(s)", self.paths.len());
        let df = read_many(&self.paths, b'\t', true)?;
        if df.height() == 0 {
            return Ok(df);
        }
        require_columns(
            &df,
            &["file_name", "JunctionReadCount", "SpanningFragCount"],
            "annotation",
        )?;

        let out = df
            .lazy()
            .with_column(
                (col("file_name").str().extract(lit(r"^([^_]*)"), 1) + lit(COMPANION_SUFFIX))
                    .alias("file_name"),
            )
            // Highest-support row first, so dropping duplicates keeps the
            // best-evidenced call.
            .sort_by_exprs(
                [col("JunctionReadCount"), col("SpanningFragCount")],
                SortMultipleOptions::default()
                    .with_order_descending(true)
                    .with_maintain_order(true),
            )
            .unique_stable(None, UniqueKeepStrategy::First)
            .collect()?;
        debug!("{} annotation rows after dedup", out.height());

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn rewrites_origin_and_drops_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("12345678-2SPECAAAA1_FI.tsv");
        let mut f = std::fs::File::create(&path).unwrap();
        write!(
            f,
            "#FusionName\tJunctionReadCount\tSpanningFragCount\tPROT_FUSION_TYPE\n\
             A--B\t10\t5\tINFRAME\n\
             A--B\t10\t5\tINFRAME\n\
             C--D\t2\t1\tFRAMESHIFT\n"
        )
        .unwrap();

        let df = AnnotationSource { paths: vec![path] }.load().unwrap();
        assert_eq!(df.height(), 2);
        let names = df.column("file_name").unwrap().str().unwrap();
        assert_eq!(
            names.get(0),
            Some(format!("12345678-2SPECAAAA1{COMPANION_SUFFIX}").as_str())
        );
        // descending support sort puts the A--B call first
        let junction = df.column("JunctionReadCount").unwrap().i64().unwrap();
        assert_eq!(junction.get(0), Some(10));
    }

    #[test]
    fn empty_input_passes_through() {
        let df = AnnotationSource { paths: vec![] }.load().unwrap();
        assert_eq!(df.height(), 0);
    }
}
