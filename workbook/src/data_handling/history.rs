use std::path::PathBuf;

use polars::prelude::*;
use tracing::{debug, info};

use crate::helper_functions::{read_delim, require_columns};
use crate::models::Source;

/// Historical-run statistics: how often each fusion has been called across
/// previous runs. Optional; absence means "no prior observations".
pub struct HistorySource {
    pub path: Option<PathBuf>,
}

impl Source for HistorySource {
    fn load(&self) -> PolarsResult<DataFrame> {
        let Some(path) = &self.path else {
            debug!("no historical run data supplied");
            return Ok(DataFrame::empty());
        };
        info!("reading historical counts from {}", path.display());
        let df = read_delim(path, b'\t', false)?;
        require_columns(&df, &["#FusionName"], "history")?;
        let count_col = detect_count_column(&df)?;

        df.lazy()
            .select([
                col("#FusionName"),
                col(count_col.as_str()).alias("Count_predicted"),
            ])
            .unique_stable(None, UniqueKeepStrategy::First)
            .sort_by_exprs([col("#FusionName")], SortMultipleOptions::default())
            .collect()
    }
}

/// Historical exports name the count column after the run range they cover
/// (e.g. `Count_Run_1_Run_20_predicted`); accept any such spelling.
fn detect_count_column(df: &DataFrame) -> PolarsResult<String> {
    df.get_column_names()
        .iter()
        .map(|c| c.as_str())
        .find(|c| *c == "Count_predicted" || (c.starts_with("Count_") && c.ends_with("_predicted")))
        .map(str::to_string)
        .ok_or_else(|| {
            PolarsError::ColumnNotFound("history: no Count_*_predicted column found".into())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deduplicates_and_sorts_by_fusion() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("previous_runs.tsv");
        std::fs::write(
            &path,
            "#FusionName\tCount_Run_1_Run_20_predicted\nC--D\t2\nA--B\t1\nA--B\t1\n",
        )
        .unwrap();

        let df = HistorySource { path: Some(path) }.load().unwrap();
        assert_eq!(df.height(), 2);
        let fusions = df.column("#FusionName").unwrap().str().unwrap();
        assert_eq!(fusions.get(0), Some("A--B"));
        assert_eq!(fusions.get(1), Some("C--D"));
        assert!(df.column("Count_predicted").is_ok());
    }

    #[test]
    fn absent_source_is_empty() {
        let df = HistorySource { path: None }.load().unwrap();
        assert_eq!(df.height(), 0);
    }

    #[test]
    fn missing_count_column_fails_loudly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("previous_runs.tsv");
        std::fs::write(&path, "#FusionName\tother\nA--B\t1\n").unwrap();
        let err = HistorySource { path: Some(path) }.load().unwrap_err();
        assert!(err.to_string().contains("Count_"));
    }
}
