//! Collapses the joined observation table into the one-row-per-
//! (specimen, fusion) summary, and builds the per-specimen QC pivot.

use polars::df;
use polars::prelude::*;

use crate::identity::specimen_expr;
use crate::models::PivotConfig;

/// Group the joined table by the ordered key tuple and take the first row
/// per group for every value column. The joined table arrives sorted by
/// abundance ascending, so "first" is the lowest-abundance observation of
/// each group without a separate ranking pass. Groups are then re-sorted by
/// their keys so specimen blocks come out contiguous for the presentation
/// layer.
pub fn build_summary(df: &DataFrame, config: &PivotConfig) -> PolarsResult<DataFrame> {
    let index: Vec<Expr> = config.index.iter().map(|c| col(*c)).collect();
    let values: Vec<Expr> = config.values.iter().map(|c| col(*c).first()).collect();

    df.clone()
        .lazy()
        .group_by_stable(index.clone())
        .agg(values)
        .sort_by_exprs(
            index,
            SortMultipleOptions::default()
                .with_nulls_last(false)
                .with_maintain_order(true),
        )
        .collect()
}

/// Per-specimen QC pivot: specimen derived from the sample name, metric
/// columns summed. Empty input stays empty.
pub fn build_qc_pivot(qc: &DataFrame) -> PolarsResult<DataFrame> {
    if qc.height() == 0 {
        return Ok(DataFrame::empty());
    }

    qc.clone()
        .lazy()
        .with_column(specimen_expr("Sample"))
        .group_by_stable([col("SPECIMEN")])
        .agg([
            col("Duplicate Reads(M)").sum(),
            col("Unique Reads(M)").sum(),
        ])
        .sort_by_exprs([col("SPECIMEN")], SortMultipleOptions::default())
        .collect()
}

/// Append the `Total` row the QC pivot sheet carries in the workbook.
pub fn with_total_row(pivot: &DataFrame) -> PolarsResult<DataFrame> {
    if pivot.height() == 0 {
        return Ok(pivot.clone());
    }

    let duplicate: f64 = pivot
        .column("Duplicate Reads(M)")?
        .f64()?
        .sum()
        .unwrap_or(0.0);
    let unique: f64 = pivot.column("Unique Reads(M)")?.f64()?.sum().unwrap_or(0.0);
    let total = df![
        "SPECIMEN" => &["Total"],
        "Duplicate Reads(M)" => &[duplicate],
        "Unique Reads(M)" => &[unique],
    ]?;

    pivot.vstack(&total)
}
