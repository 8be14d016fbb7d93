use std::path::{Path, PathBuf};

use polars::frame::DataFrame;
use polars::prelude::*;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::models::polars_err;

/// Upper bound on concurrent file reads in [`read_many`].
pub const MAX_PARALLEL_READS: usize = 16;

/// Read one delimited file into a DataFrame.
///
/// `separator` is configurable per source (tab or comma). When
/// `include_fname` is set, the file's name (not its path) is inserted as the
/// first column so downstream steps can recover the originating sample.
pub fn read_delim(path: &Path, separator: u8, include_fname: bool) -> PolarsResult<DataFrame> {
    let mut df = CsvReadOptions::default()
        .with_has_header(true)
        .map_parse_options(|mut o| {
            o.separator = separator;
            o
        })
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    if include_fname {
        let fname = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        let names = Column::new("file_name".into(), vec![fname; df.height()]);
        df.insert_column(0, names)?;
    }

    Ok(df)
}

/// Read a list of delimited files concurrently and concatenate the results.
///
/// Reads run on a worker pool bounded at [`MAX_PARALLEL_READS`]; a failure
/// on one file is logged and that file excluded, never aborting the batch.
/// Zero input files yield an empty DataFrame, not an error. Row order is
/// preserved within each file; order across files is not guaranteed.
pub fn read_many(paths: &[PathBuf], separator: u8, include_fname: bool) -> PolarsResult<DataFrame> {
    if paths.is_empty() {
        return Ok(DataFrame::empty());
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(paths.len().min(MAX_PARALLEL_READS))
        .build()
        .map_err(|e| polars_err(Box::new(e)))?;

    let frames: Vec<DataFrame> = pool.install(|| {
        paths
            .par_iter()
            .filter_map(|path| match read_delim(path, separator, include_fname) {
                Ok(df) => {
                    debug!("read {} rows from {}", df.height(), path.display());
                    Some(df)
                }
                Err(e) => {
                    warn!("skipping {}: {}", path.display(), e);
                    None
                }
            })
            .collect()
    });

    let mut frames = frames.into_iter();
    let Some(mut df) = frames.next() else {
        return Ok(DataFrame::empty());
    };
    for other in frames {
        df.vstack_mut(&other)?;
    }

    Ok(df)
}

/// Fail loudly when a source table lacks a column the aggregation depends
/// on. The error names both the source and the column so the run is
/// identifiably broken rather than silently incomplete.
pub fn require_columns(df: &DataFrame, required: &[&str], source: &str) -> PolarsResult<()> {
    for want in required {
        if !df.get_column_names().iter().any(|c| c.as_str() == *want) {
            return Err(PolarsError::ColumnNotFound(
                format!("{source}: required column '{want}' is missing").into(),
            ));
        }
    }
    Ok(())
}

/// 0-based column index to an Excel column letter (0 → A, 26 → AA).
pub fn col_letter(mut idx: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (idx % 26) as u8);
        if idx < 26 {
            break;
        }
        idx = idx / 26 - 1;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap()
}
