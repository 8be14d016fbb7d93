//! Summary sheet writer: merged per-specimen blocks, block-anchored lookup
//! formulas, dropdown annotation columns and the per-block abundance bars.
//!
//! Groups are re-derived from the written summary table itself, so block
//! boundaries exactly match the grouping `pivot::build_summary` used.

use anyhow::{anyhow, Result};
use polars::prelude::*;
use rust_xlsxwriter::{
    Color, ConditionalFormatDataBar, ConditionalFormatType, DataValidation, Worksheet,
};

use super::style::{self, CellStyle, ColumnWidths};
use crate::models::{PivotConfig, SummaryConfig};

/// Consecutive summary rows sharing one specimen value (inclusive bounds).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecimenBlock {
    pub start: usize,
    pub end: usize,
}

impl SpecimenBlock {
    fn is_merged(&self) -> bool {
        self.end > self.start
    }
}

/// Derive the specimen blocks from the summary table. The table arrives
/// sorted by its group keys, so equal specimens are contiguous.
pub fn specimen_blocks(df: &DataFrame, index_col: &str) -> PolarsResult<Vec<SpecimenBlock>> {
    let specimens = df.column(index_col)?.str()?;
    let mut blocks: Vec<SpecimenBlock> = Vec::new();
    for i in 0..df.height() {
        match blocks.last_mut() {
            Some(block) if specimens.get(block.start) == specimens.get(i) => block.end = i,
            _ => blocks.push(SpecimenBlock { start: i, end: i }),
        }
    }
    Ok(blocks)
}

/// Width reserved for the abundance column so its data bars render sensibly.
const FFPM_COL_WIDTH: f64 = 10.0;

pub fn write_summary(
    ws: &mut Worksheet,
    summary: &DataFrame,
    config: &SummaryConfig,
    pivot: &PivotConfig,
) -> Result<()> {
    // the breakpoint-pair key drove the grouping but is not reported
    let df = summary.drop("LEFTRIGHT")?;

    ws.set_name(config.sheet.sheet_name)?;
    ws.set_tab_color(Color::RGB(config.sheet.tab_color));

    let blocks = specimen_blocks(&df, config.index_col)?;
    let names: Vec<String> = df
        .get_columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect();

    let index_pos = names
        .iter()
        .position(|n| n == config.index_col)
        .ok_or_else(|| anyhow!("summary lacks index column {}", config.index_col))?;
    let ffpm_pos = names
        .iter()
        .position(|n| n == config.ffpm_col)
        .ok_or_else(|| anyhow!("summary lacks abundance column {}", config.ffpm_col))?;

    // lookup columns are inserted directly after the specimen column
    let insert_at = index_pos + 1;
    let n_lookup = config.lookup_cols.len();
    let sheet_col = |df_col: usize| {
        if df_col < insert_at {
            df_col
        } else {
            df_col + n_lookup
        }
    };
    let ffpm_sheet_col = sheet_col(ffpm_pos);
    let n_data_cols = df.width() + n_lookup;

    // group-key columns are constant within a block and get merged cells
    let merge_cols: Vec<usize> = pivot
        .index
        .iter()
        .filter_map(|key| names.iter().position(|n| n == key))
        .collect();

    let mut widths = ColumnWidths::new(n_data_cols + config.drop_downs.len());
    let header_fmt = style::header_format();

    for (i, name) in names.iter().enumerate() {
        let sc = sheet_col(i);
        ws.write_string_with_format(0, sc as u16, name.as_str(), &header_fmt)?;
        widths.observe(sc, name.len());
    }
    for (j, lookup) in config.lookup_cols.iter().enumerate() {
        let sc = insert_at + j;
        ws.write_string_with_format(0, sc as u16, lookup.header, &header_fmt)?;
        widths.observe(sc, lookup.header.len());
    }

    for (b, block) in blocks.iter().enumerate() {
        let fill = style::GROUP_FILLS[b % style::GROUP_FILLS.len()];
        write_block(
            ws,
            &df,
            block,
            fill,
            &merge_cols,
            &sheet_col,
            ffpm_pos,
            ffpm_sheet_col,
            &mut widths,
        )?;

        for (j, lookup) in config.lookup_cols.iter().enumerate() {
            let sc = (insert_at + j) as u16;
            let anchor = block.start + 2;
            let formula = super::sheets::fill_row_placeholder(lookup.formula, anchor);
            let fmt = CellStyle {
                fill: Some(fill),
                thick_bottom: true,
                top_align: true,
                ..Default::default()
            }
            .format();
            if block.is_merged() {
                ws.merge_range(
                    (block.start + 1) as u32,
                    sc,
                    (block.end + 1) as u32,
                    sc,
                    "",
                    &fmt,
                )?;
            }
            ws.write_formula_with_format((block.start + 1) as u32, sc, formula.as_str(), &fmt)?;
        }
    }

    write_drop_downs(ws, &df, config, &blocks, n_data_cols, &mut widths)?;
    add_abundance_bars(ws, &df, config, &blocks, ffpm_sheet_col)?;

    widths.fix(ffpm_sheet_col, FFPM_COL_WIDTH);
    widths.apply(ws)?;
    Ok(())
}

/// Write one specimen block's data cells: merged ranges for the group-key
/// columns, per-row cells elsewhere, alternating fill up to the abundance
/// column and a thick border on the block's last row.
#[allow(clippy::too_many_arguments)]
fn write_block(
    ws: &mut Worksheet,
    df: &DataFrame,
    block: &SpecimenBlock,
    fill: Color,
    merge_cols: &[usize],
    sheet_col: &dyn Fn(usize) -> usize,
    ffpm_pos: usize,
    ffpm_sheet_col: usize,
    widths: &mut ColumnWidths,
) -> Result<()> {
    let columns = df.get_columns();

    for (i, column) in columns.iter().enumerate() {
        let sc = sheet_col(i);
        let filled = if sc < ffpm_sheet_col { Some(fill) } else { None };

        if merge_cols.contains(&i) && block.is_merged() {
            let fmt = CellStyle {
                fill: filled,
                thick_bottom: true,
                top_align: true,
                ..Default::default()
            }
            .format();
            ws.merge_range(
                (block.start + 1) as u32,
                sc as u16,
                (block.end + 1) as u32,
                sc as u16,
                "",
                &fmt,
            )?;
            let value = column.get(block.start)?;
            widths.observe(sc, style::text_len(&value));
            style::write_value(ws, (block.start + 1) as u32, sc as u16, &value, Some(&fmt))?;
            continue;
        }

        let is_breakpoint = style::is_breakpoint_header(column.name().as_str());
        for r in block.start..=block.end {
            let value = column.get(r)?;
            let cell = CellStyle {
                fill: filled,
                thick_bottom: r == block.end,
                left_align: i == ffpm_pos,
                hyperlink: false,
                top_align: false,
            };
            if is_breakpoint {
                if let Some(text) = style::anyvalue_str(&value) {
                    let url = style::breakpoint_url(text);
                    let fmt = CellStyle {
                        hyperlink: true,
                        ..cell
                    }
                    .format();
                    ws.write_formula_with_format(
                        (r + 1) as u32,
                        sc as u16,
                        format!("=HYPERLINK(\"{url}\", \"{text}\")").as_str(),
                        &fmt,
                    )?;
                    widths.observe(sc, text.len());
                    continue;
                }
            }
            widths.observe(sc, style::text_len(&value));
            style::write_value(ws, (r + 1) as u32, sc as u16, &value, Some(&cell.format()))?;
        }
    }

    Ok(())
}

/// Append the enumerated-choice columns with list validation. Cells stay
/// blank but keep the block borders.
fn write_drop_downs(
    ws: &mut Worksheet,
    df: &DataFrame,
    config: &SummaryConfig,
    blocks: &[SpecimenBlock],
    n_data_cols: usize,
    widths: &mut ColumnWidths,
) -> Result<()> {
    let header_fmt = style::header_format();

    for (j, dd) in config.drop_downs.iter().enumerate() {
        let sc = (n_data_cols + j) as u16;
        ws.write_string_with_format(0, sc, dd.header, &header_fmt)?;

        for block in blocks {
            for r in block.start..=block.end {
                let fmt = CellStyle {
                    thick_bottom: r == block.end,
                    ..Default::default()
                }
                .format();
                ws.write_blank((r + 1) as u32, sc, &fmt)?;
            }
        }

        if df.height() > 0 {
            let validation = DataValidation::new()
                .allow_list_strings(dd.options)?
                .set_input_title(dd.title)?
                .set_input_message(dd.prompt)?;
            ws.add_data_validation(1, sc, df.height() as u32, sc, &validation)?;
        }

        let longest = dd
            .options
            .iter()
            .map(|o| o.len())
            .chain([dd.header.len()])
            .max()
            .unwrap_or(0);
        widths.fix(sc as usize, longest as f64 + 2.0);
    }

    Ok(())
}

/// One data bar per specimen block, scaled 0 → the block's own maximum so
/// magnitudes are comparable within a specimen, not across the run.
fn add_abundance_bars(
    ws: &mut Worksheet,
    df: &DataFrame,
    config: &SummaryConfig,
    blocks: &[SpecimenBlock],
    ffpm_sheet_col: usize,
) -> Result<()> {
    let ffpm = df.column(config.ffpm_col)?.cast(&DataType::Float64)?;
    let ffpm = ffpm.f64()?;

    for block in blocks {
        let max = (block.start..=block.end)
            .filter_map(|r| ffpm.get(r))
            .fold(None::<f64>, |acc, v| Some(acc.map_or(v, |m| m.max(v))));
        let Some(max) = max else { continue };

        let bar = ConditionalFormatDataBar::new()
            .set_minimum(ConditionalFormatType::Number, 0.0)
            .set_maximum(ConditionalFormatType::Number, max)
            .set_fill_color(style::DATABAR_GREEN);
        ws.add_conditional_format(
            (block.start + 1) as u32,
            ffpm_sheet_col as u16,
            (block.end + 1) as u32,
            ffpm_sheet_col as u16,
            &bar,
        )?;
    }

    Ok(())
}
