#![allow(unused)]

//! Aggregates gene-fusion calls from a fusion predictor, a fusion-annotation
//! tool, a QC summarizer, historical-run statistics and two curated
//! registries into one reconciled, per-specimen workbook.

use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use polars::prelude::DataFrame;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod data_handling;
mod defaults;
mod helper_functions;
mod identity;
mod join_engine;
mod models;
mod pivot;
mod workbook;

use crate::data_handling::annotation::AnnotationSource;
use crate::data_handling::history::HistorySource;
use crate::data_handling::predictor::PredictorSource;
use crate::data_handling::prev_positives::PrevPositivesSource;
use crate::data_handling::qc::QcSource;
use crate::data_handling::ref_sources::RefSourcesSource;
use crate::helper_functions::read_delim;
use crate::models::{RunConfig, Source};
use crate::workbook::{write_workbook, WorkbookData};

#[derive(Parser, Debug)]
#[command(name = "fusion-workbook", about = "Generate the per-run fusion workbook")]
struct Args {
    /// Fusion predictor outputs, one per specimen (tab-separated)
    #[arg(long = "predictions", required = true, num_args = 1..)]
    predictions: Vec<PathBuf>,

    /// Fusion-annotation tool outputs (tab-separated)
    #[arg(long = "annotations", num_args = 1..)]
    annotations: Vec<PathBuf>,

    /// QC summarizer table (tab-separated)
    #[arg(long)]
    qc: Option<PathBuf>,

    /// Historical fusion counts from previous runs (tab-separated)
    #[arg(long)]
    history: Option<PathBuf>,

    /// Registry of previously reported positives (comma-separated)
    #[arg(long = "previous-positives")]
    previous_positives: Option<PathBuf>,

    /// Literature reference-source index (tab-separated)
    #[arg(long = "reference-sources")]
    reference_sources: Option<PathBuf>,

    /// Clinical metadata export, passed through as a lookup sheet
    #[arg(long)]
    epic: Option<PathBuf>,

    /// JSON run configuration ({"project_name": ..., "output_dir": ...})
    #[arg(long)]
    config: Option<PathBuf>,

    /// Project name for the output file; overrides the config file
    #[arg(long = "project-name")]
    project_name: Option<String>,

    /// Output directory when no config file is given
    #[arg(long = "output-dir", default_value = ".")]
    output_dir: PathBuf,
}

fn run_config(args: &Args) -> Result<RunConfig> {
    let mut cfg = match &args.config {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("opening run config {}", path.display()))?;
            serde_json::from_reader(file)
                .with_context(|| format!("parsing run config {}", path.display()))?
        }
        None => RunConfig {
            project_name: "output".to_string(),
            output_dir: args.output_dir.clone(),
        },
    };
    if let Some(name) = &args.project_name {
        cfg.project_name = name.clone();
    }
    Ok(cfg)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let run = run_config(&args)?;
    info!("generating fusion workbook for {}", run.project_name);

    let predictor = PredictorSource {
        paths: args.predictions.clone(),
    }
    .load()
    .context("loading predictor output")?;
    let annotation = AnnotationSource {
        paths: args.annotations.clone(),
    }
    .load()
    .context("loading annotation output")?;
    let qc = QcSource {
        path: args.qc.clone(),
    }
    .load()
    .context("loading QC metrics")?;
    let history = HistorySource {
        path: args.history.clone(),
    }
    .load()
    .context("loading historical counts")?;
    let prev_positives = PrevPositivesSource {
        path: args.previous_positives.clone(),
    }
    .load()
    .context("loading previous positives")?;
    let ref_sources = RefSourcesSource {
        path: args.reference_sources.clone(),
    }
    .load()
    .context("loading reference sources")?;
    let epic: Option<DataFrame> = match &args.epic {
        Some(path) => Some(read_delim(path, b',', false).context("loading clinical metadata")?),
        None => None,
    };

    let qc_pivot = pivot::build_qc_pivot(&qc)?;
    let joined = join_engine::build_join(
        predictor.clone(),
        history.clone(),
        qc_pivot.clone(),
        annotation.clone(),
        prev_positives,
        ref_sources,
    )
    .context("joining source tables")?;
    info!("joined table has {} observation rows", joined.height());

    let summary = pivot::build_summary(&joined, &defaults::SUMMARY_PIVOT)?;
    info!("summary has {} rows", summary.height());

    let data = WorkbookData {
        predictor: &predictor,
        annotation: &annotation,
        qc: &qc,
        qc_pivot: &qc_pivot,
        history: &history,
        epic: epic.as_ref(),
        summary: &summary,
    };
    let path = write_workbook(&data, &run)?;
    info!("fusion workbook written to {}", path.display());

    Ok(())
}
