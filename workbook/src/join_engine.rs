//! Reconciles the per-source tables into one denormalized per-observation
//! table keyed by (specimen, breakpoint pair, fusion name).
//!
//! Every optional source joins with left semantics and a documented neutral
//! fill; an absent source short-circuits its join step entirely instead of
//! nulling every row.

use polars::prelude::*;
use tracing::debug;

use crate::data_handling::predictor;
use crate::helper_functions::require_columns;
use crate::identity::{display_name_expr, specimen_expr};

/// Build the joined observation table from the six inputs. Only the
/// predictor table is required to be non-empty and well-formed; everything
/// else degrades to its neutral fill.
pub fn build_join(
    predictor: DataFrame,
    history: DataFrame,
    qc_pivot: DataFrame,
    annotation: DataFrame,
    prev_positives: DataFrame,
    ref_sources: DataFrame,
) -> PolarsResult<DataFrame> {
    require_columns(&predictor, predictor::REQUIRED_COLUMNS, "predictor")?;

    let df = derive_key_columns(predictor)?;
    let df = join_history(df, history)?;
    let df = join_qc(df, qc_pivot)?;
    let df = join_annotation(df, annotation)?;
    let df = join_registry(df, prev_positives, "Specimen ID", "PreviousPositives")?;
    let df = join_registry(df, ref_sources, "ReferenceSources", "ReferenceSources")?;
    sort_by_abundance(df)
}

/// Specimen and display-name columns from the origin filename, the
/// synthetic row id, and the breakpoint-pair key. A filename the specimen
/// parser cannot handle yields a null specimen, which then misses every
/// specimen-keyed join.
fn derive_key_columns(df: DataFrame) -> PolarsResult<DataFrame> {
    df.lazy()
        .with_columns([specimen_expr("file_name"), display_name_expr("file_name")])
        .with_columns([
            concat_str([col("SPECIMEN"), col("#FusionName")], "_", false).alias("ID"),
            concat_str([col("LeftBreakpoint"), col("RightBreakpoint")], "_", false)
                .alias("LEFTRIGHT"),
        ])
        .collect()
}

/// Left-join historical counts on fusion identity. Absence of history means
/// zero prior observations, never a null.
fn join_history(df: DataFrame, history: DataFrame) -> PolarsResult<DataFrame> {
    if history.height() == 0 {
        debug!("no historical counts; filling Count_predicted with 0");
        return df
            .lazy()
            .with_column(lit(0i64).cast(DataType::Int64).alias("Count_predicted"))
            .collect();
    }

    let counts = history
        .lazy()
        .select([col("#FusionName"), col("Count_predicted")]);
    df.lazy()
        .join(
            counts,
            [col("#FusionName")],
            [col("#FusionName")],
            JoinArgs::new(JoinType::Left),
        )
        .with_column(
            col("Count_predicted")
                .fill_null(lit(0))
                .cast(DataType::Int64),
        )
        .collect()
}

/// Left-join the per-specimen QC metrics. When no QC data was supplied the
/// metric columns are installed as nulls so the summary grouping keys still
/// exist.
fn join_qc(df: DataFrame, qc_pivot: DataFrame) -> PolarsResult<DataFrame> {
    if qc_pivot.height() == 0 {
        debug!("no QC pivot; metric columns stay empty");
        return df
            .lazy()
            .with_columns([
                lit(NULL).cast(DataType::Float64).alias("Duplicate Reads(M)"),
                lit(NULL).cast(DataType::Float64).alias("Unique Reads(M)"),
            ])
            .collect();
    }

    df.lazy()
        .join(
            qc_pivot.lazy(),
            [col("SPECIMEN")],
            [col("SPECIMEN")],
            JoinArgs::new(JoinType::Left),
        )
        .collect()
}

/// Left-join the annotation classification on the breakpoint-pair key (one
/// fusion name can recur at different coordinates; the breakpoint pair
/// disambiguates). The annotation side is deduplicated on the key first so
/// the join can never multiply predictor rows; its reader sorted
/// descending by read support, so "first" is the best-evidenced call.
fn join_annotation(df: DataFrame, annotation: DataFrame) -> PolarsResult<DataFrame> {
    if annotation.height() == 0 {
        debug!("no annotation data; FRAME stays empty");
        return df
            .lazy()
            .with_column(lit(NULL).cast(DataType::String).alias("FRAME"))
            .collect();
    }
    require_columns(
        &annotation,
        &["LeftBreakpoint", "RightBreakpoint", "PROT_FUSION_TYPE"],
        "annotation",
    )?;

    let frames = annotation
        .lazy()
        .with_column(
            concat_str([col("LeftBreakpoint"), col("RightBreakpoint")], "_", false)
                .alias("LEFTRIGHT"),
        )
        .select([col("LEFTRIGHT"), col("PROT_FUSION_TYPE").alias("FRAME")])
        .unique_stable(
            Some(vec!["LEFTRIGHT".to_string().into()]),
            UniqueKeepStrategy::First,
        );

    df.lazy()
        .join(
            frames,
            [col("LEFTRIGHT")],
            [col("LEFTRIGHT")],
            JoinArgs::new(JoinType::Left),
        )
        .collect()
}

/// Aggregate a registry to one row per fusion, then left-join on fusion
/// identity. Unmatched rows get an empty string, not a null.
fn join_registry(
    df: DataFrame,
    registry: DataFrame,
    value_col: &str,
    out_col: &str,
) -> PolarsResult<DataFrame> {
    if registry.height() == 0 {
        debug!("registry for {out_col} empty; filling with \"\"");
        return df.lazy().with_column(lit("").alias(out_col)).collect();
    }

    let agg = aggregate_registry(registry, "Fusion", value_col, out_col)?;
    df.lazy()
        .join(
            agg.lazy()
                .select([col("Fusion").alias("#FusionName"), col(out_col)]),
            [col("#FusionName")],
            [col("#FusionName")],
            JoinArgs::new(JoinType::Left),
        )
        .with_column(col(out_col).fill_null(lit("")))
        .collect()
}

/// Collapse a registry to one row per key: the values become a
/// deduplicated, alphabetically sorted, comma-joined string.
pub fn aggregate_registry(
    df: DataFrame,
    key: &str,
    value: &str,
    out: &str,
) -> PolarsResult<DataFrame> {
    df.lazy()
        .group_by_stable([col(key)])
        .agg([col(value)
            .unique()
            .sort(SortOptions::default())
            .str()
            .join(",", true)
            .alias(out)])
        .collect()
}

/// Stable ascending sort on the abundance metric, nulls first: the
/// documented tie-break for every downstream "pick first" aggregation.
fn sort_by_abundance(df: DataFrame) -> PolarsResult<DataFrame> {
    df.lazy()
        .sort_by_exprs(
            [col("FFPM")],
            SortMultipleOptions::default()
                .with_nulls_last(false)
                .with_maintain_order(true),
        )
        .collect()
}
