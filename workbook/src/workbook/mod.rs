//! Materializer: assembles the multi-sheet workbook artifact from the
//! loaded tables and the summary, and writes it once per invocation.

mod sheets;
mod style;
mod summary;

use std::path::PathBuf;

use anyhow::{Context, Result};
use polars::prelude::DataFrame;
use rust_xlsxwriter::Workbook;
use tracing::info;

use crate::defaults;
use crate::models::RunConfig;
use crate::pivot;

pub use sheets::{fill_row_placeholder, write_df_to_sheet};
pub use summary::{specimen_blocks, write_summary, SpecimenBlock};

/// Everything the workbook carries: raw per-tool tables, the QC pivot, the
/// optional registries and the final summary.
pub struct WorkbookData<'a> {
    pub predictor: &'a DataFrame,
    pub annotation: &'a DataFrame,
    pub qc: &'a DataFrame,
    pub qc_pivot: &'a DataFrame,
    pub history: &'a DataFrame,
    pub epic: Option<&'a DataFrame>,
    pub summary: &'a DataFrame,
}

/// Write the artifact to `<output_dir>/<project>_fusion_workbook.xlsx`.
/// Optional sources that contributed no rows get no sheet; their lookup
/// formulas stay in place and resolve once the data is pasted in.
pub fn write_workbook(data: &WorkbookData, run: &RunConfig) -> Result<PathBuf> {
    let mut workbook = Workbook::new();

    write_df_to_sheet(
        workbook.add_worksheet(),
        data.predictor,
        &defaults::PREDICTOR_SHEET,
        defaults::PREDICTOR_EXTRA_COLS,
    )?;
    if data.annotation.height() > 0 {
        write_df_to_sheet(
            workbook.add_worksheet(),
            data.annotation,
            &defaults::ANNOTATION_SHEET,
            defaults::ANNOTATION_EXTRA_COLS,
        )?;
    }
    if data.qc.height() > 0 {
        write_df_to_sheet(
            workbook.add_worksheet(),
            data.qc,
            &defaults::QC_SHEET,
            defaults::QC_EXTRA_COLS,
        )?;
        let qc_pivot = pivot::with_total_row(data.qc_pivot)?;
        write_df_to_sheet(
            workbook.add_worksheet(),
            &qc_pivot,
            &defaults::QC_PIVOT_SHEET,
            &[],
        )?;
    }
    if data.history.height() > 0 {
        write_df_to_sheet(
            workbook.add_worksheet(),
            data.history,
            &defaults::HISTORY_SHEET,
            &[],
        )?;
    }
    if let Some(epic) = data.epic {
        write_df_to_sheet(workbook.add_worksheet(), epic, &defaults::EPIC_SHEET, &[])?;
    }
    write_summary(
        workbook.add_worksheet(),
        data.summary,
        &defaults::SUMMARY,
        &defaults::SUMMARY_PIVOT,
    )?;

    let path = run.output_path();
    workbook
        .save(&path)
        .with_context(|| format!("saving workbook to {}", path.display()))?;
    info!("workbook saved to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::join_engine::build_join;
    use crate::pivot::{build_qc_pivot, build_summary};
    use polars::df;

    #[test]
    fn writes_complete_workbook_from_joined_data() {
        let predictor = df![
            "file_name" => &[
                "123456789-2SPECAAAA1-25PCAN4-10011_S1.tsv",
                "123456789-2SPECAAAA1-25PCAN4-10011_S1.tsv",
                "123456789-2SPECBBBB2-25PCAN4-10012_S2.tsv",
            ],
            "#FusionName" => &["A--B", "E--F", "C--D"],
            "JunctionReadCount" => &[10i64, 3, 7],
            "SpanningFragCount" => &[5i64, 1, 2],
            "LeftBreakpoint" => &["chr1:100:+", "chr5:1:-", "chr3:5:+"],
            "RightBreakpoint" => &["chr2:200:+", "chr6:2:-", "chr4:6:+"],
            "FFPM" => &[0.2, 0.9, 0.5],
        ]
        .unwrap();
        let qc = df![
            "Sample" => &[
                "123456789-2SPECAAAA1-25PCAN4-10011_S1",
                "123456789-2SPECBBBB2-25PCAN4-10012_S2",
            ],
            "Unique Reads" => &[750_000i64, 900_000],
            "Duplicate Reads" => &[250_000i64, 100_000],
            "Unique Reads(M)" => &[0.75, 0.9],
            "Duplicate Reads(M)" => &[0.25, 0.1],
        ]
        .unwrap();
        let history = df![
            "#FusionName" => &["A--B"],
            "Count_predicted" => &[4i64],
        ]
        .unwrap();
        let refs = df![
            "Fusion" => &["A--B"],
            "ReferenceSources" => &["COSMIC"],
        ]
        .unwrap();

        let qc_pivot = build_qc_pivot(&qc).unwrap();
        let joined = build_join(
            predictor.clone(),
            history.clone(),
            qc_pivot.clone(),
            DataFrame::empty(),
            DataFrame::empty(),
            refs,
        )
        .unwrap();
        let summary = build_summary(&joined, &defaults::SUMMARY_PIVOT).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let run = RunConfig {
            project_name: "250101_PCAN".to_string(),
            output_dir: dir.path().to_path_buf(),
        };
        let annotation = DataFrame::empty();
        let data = WorkbookData {
            predictor: &predictor,
            annotation: &annotation,
            qc: &qc,
            qc_pivot: &qc_pivot,
            history: &history,
            epic: None,
            summary: &summary,
        };

        let path = write_workbook(&data, &run).unwrap();
        assert!(path.exists());
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    // The workbook's generated VLOOKUP re-derives Count_predicted from the
    // Previous_Runs sheet at open time. Simulating that lookup over the
    // written tables must agree with the in-memory join wherever the lookup
    // resolves; a lookup miss corresponds to the join's neutral zero.
    #[test]
    fn formula_lookup_agrees_with_in_memory_join() {
        let predictor = df![
            "file_name" => &[
                "123456789-2SPECAAAA1-25PCAN4_S1.tsv",
                "123456789-2SPECAAAA1-25PCAN4_S1.tsv",
            ],
            "#FusionName" => &["A--B", "E--F"],
            "JunctionReadCount" => &[10i64, 3],
            "SpanningFragCount" => &[5i64, 1],
            "LeftBreakpoint" => &["chr1:100", "chr5:1"],
            "RightBreakpoint" => &["chr2:200", "chr6:2"],
            "FFPM" => &[0.2, 0.9],
        ]
        .unwrap();
        let history = df![
            "#FusionName" => &["A--B"],
            "Count_predicted" => &[4i64],
        ]
        .unwrap();

        let joined = build_join(
            predictor,
            history.clone(),
            DataFrame::empty(),
            DataFrame::empty(),
            DataFrame::empty(),
            DataFrame::empty(),
        )
        .unwrap();
        let summary = build_summary(&joined, &defaults::SUMMARY_PIVOT).unwrap();

        let fusions = summary.column("#FusionName").unwrap().str().unwrap();
        let counts = summary.column("Count_predicted").unwrap().i64().unwrap();
        let hist_fusions = history.column("#FusionName").unwrap().str().unwrap();
        let hist_counts = history.column("Count_predicted").unwrap().i64().unwrap();

        for r in 0..summary.height() {
            let fusion = fusions.get(r).unwrap();
            let looked_up = (0..history.height())
                .find(|i| hist_fusions.get(*i) == Some(fusion))
                .and_then(|i| hist_counts.get(i));
            match looked_up {
                Some(count) => assert_eq!(counts.get(r), Some(count)),
                None => assert_eq!(counts.get(r), Some(0)),
            }
        }
    }
}
