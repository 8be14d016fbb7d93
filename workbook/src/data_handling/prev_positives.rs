use std::path::PathBuf;

use polars::prelude::*;
use tracing::info;

use crate::helper_functions::{read_delim, require_columns};
use crate::identity::{extract_fusions, fusion_identity_expr};
use crate::models::Source;

/// Registry of fusions previously reported positive, keyed by specimen.
///
/// Two revisions of the export exist: a structured one with a `Fusion`
/// column, and an older one where fusions must be extracted from the
/// free-text `Test Result` field. Both load into (`Fusion`, `Specimen ID`)
/// pairs with canonical `--` separators.
pub struct PrevPositivesSource {
    pub path: Option<PathBuf>,
}

impl Source for PrevPositivesSource {
    fn load(&self) -> PolarsResult<DataFrame> {
        let Some(path) = &self.path else {
            return Ok(DataFrame::empty());
        };
        info!("reading previous positives from {}", path.display());
        let df = read_delim(path, b',', false)?;
        require_columns(&df, &["Specimen ID"], "previous positives")?;

        let has = |name: &str| df.get_column_names().iter().any(|c| c.as_str() == name);
        if has("Fusion") {
            df.lazy()
                .select([fusion_identity_expr(col("Fusion")), col("Specimen ID")])
                .collect()
        } else if has("Test Result") {
            explode_results(&df)
        } else {
            Err(PolarsError::ColumnNotFound(
                "previous positives: need a 'Fusion' or 'Test Result' column".into(),
            ))
        }
    }
}

/// One output row per fusion found in each row's free-text result field.
/// Rows whose text yields no valid pattern contribute nothing.
fn explode_results(df: &DataFrame) -> PolarsResult<DataFrame> {
    let specimens = df.column("Specimen ID")?.str()?;
    let results = df.column("Test Result")?.str()?;

    let mut fusion_rows: Vec<String> = Vec::new();
    let mut specimen_rows: Vec<String> = Vec::new();
    for i in 0..df.height() {
        let (Some(specimen), Some(text)) = (specimens.get(i), results.get(i)) else {
            continue;
        };
        for fusion in extract_fusions(text) {
            fusion_rows.push(fusion);
            specimen_rows.push(specimen.to_string());
        }
    }

    DataFrame::new(vec![
        Column::new("Fusion".into(), fusion_rows),
        Column::new("Specimen ID".into(), specimen_rows),
    ])
}
