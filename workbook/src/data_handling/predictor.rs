use std::path::PathBuf;

use polars::prelude::*;
use tracing::info;

use crate::helper_functions::read_many;
use crate::models::Source;

/// Columns the join engine depends on; validated there so a truncated
/// export fails the run loudly instead of producing a hollow report.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "file_name",
    "#FusionName",
    "LeftBreakpoint",
    "RightBreakpoint",
    "JunctionReadCount",
    "SpanningFragCount",
    "FFPM",
];

/// Fusion predictor output: one tab-separated file per specimen, prefixed
/// with the originating file name. This is the primary table of the run.
pub struct PredictorSource {
    pub paths: Vec<PathBuf>,
}

impl Source for PredictorSource {
    fn load(&self) -> PolarsResult<DataFrame> {
        info!("reading {} predictor file(s)", self.paths.len());
        read_many(&self.paths, b'\t', true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn concatenates_files_with_origin_column() {
        let dir = tempfile::tempdir().unwrap();
        let header = "#FusionName\tJunctionReadCount\n";
        for name in ["12345678-2SPECAAAA1-25PCAN4_a.tsv", "12345678-2SPECBBBB2-25PCAN4_b.tsv"] {
            let mut f = std::fs::File::create(dir.path().join(name)).unwrap();
            write!(f, "{header}A--B\t10\n").unwrap();
        }
        let paths: Vec<PathBuf> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();

        let df = PredictorSource { paths }.load().unwrap();
        assert_eq!(df.height(), 2);
        assert!(df.column("file_name").is_ok());
    }

    #[test]
    fn zero_files_is_empty_not_error() {
        let df = PredictorSource { paths: vec![] }.load().unwrap();
        assert_eq!(df.height(), 0);
    }
}
