use std::error::Error;
use std::path::PathBuf;

use polars::error::PolarsError;
use polars::frame::DataFrame;
use polars::prelude::PolarsResult;
use serde::{Deserialize, Serialize};

/// A tabular input source for the workbook pipeline.
///
/// Every tool output (predictor, annotation, QC, registries) is loaded
/// through this trait so the orchestration in `main` stays uniform.
pub trait Source {
    fn load(&self) -> PolarsResult<DataFrame>;
}

/// Lift a foreign error into a `PolarsError` so it can travel through
/// `PolarsResult` pipelines.
pub fn polars_err(e: Box<dyn Error>) -> PolarsError {
    PolarsError::ComputeError(format!("{e}").into())
}

/// Name and tab colour of one output sheet.
#[derive(Debug, Clone, Copy)]
pub struct SheetConfig {
    pub sheet_name: &'static str,
    pub tab_color: u32,
}

/// A generated formula column. `formula` is an Excel formula template with a
/// `{row}` placeholder substituted per row at write time.
#[derive(Debug, Clone, Copy)]
pub struct ExtraCol {
    pub header: &'static str,
    pub formula: &'static str,
}

/// An enumerated-choice annotation column appended to the summary sheet.
#[derive(Debug, Clone, Copy)]
pub struct DropDown {
    pub header: &'static str,
    pub options: &'static [&'static str],
    pub prompt: &'static str,
    pub title: &'static str,
}

/// Grouping specification for `pivot::build_summary`: group by `index` in
/// order, take the first row per group for each column in `values`.
#[derive(Debug, Clone, Copy)]
pub struct PivotConfig {
    pub index: &'static [&'static str],
    pub values: &'static [&'static str],
}

/// Full configuration of the summary sheet.
#[derive(Debug, Clone, Copy)]
pub struct SummaryConfig {
    pub sheet: SheetConfig,
    /// Formula columns inserted after the specimen column, anchored to the
    /// first row of each merged specimen block.
    pub lookup_cols: &'static [ExtraCol],
    pub drop_downs: &'static [DropDown],
    /// Column carrying the abundance metric; gets the data bar and marks
    /// where the alternating group fill stops.
    pub ffpm_col: &'static str,
    /// Column whose consecutive runs define the specimen blocks.
    pub index_col: &'static str,
}

/// Run-level settings passed explicitly into the materializer instead of
/// being read from the process environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Project name used to derive the output file name.
    pub project_name: String,
    /// Directory the workbook is written into.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl RunConfig {
    pub fn output_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}_fusion_workbook.xlsx", self.project_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_path_uses_project_name() {
        let cfg = RunConfig {
            project_name: "250101_PCAN".to_string(),
            output_dir: PathBuf::from("/tmp/out"),
        };
        assert_eq!(
            cfg.output_path(),
            PathBuf::from("/tmp/out/250101_PCAN_fusion_workbook.xlsx")
        );
    }

    #[test]
    fn run_config_deserializes_with_default_dir() {
        let cfg: RunConfig = serde_json::from_str(r#"{"project_name": "run7"}"#).unwrap();
        assert_eq!(cfg.project_name, "run7");
        assert_eq!(cfg.output_dir, PathBuf::from("."));
    }
}
