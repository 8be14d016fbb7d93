//! Raw sheet writing: one table per sheet, optionally prefixed with
//! generated formula columns that re-derive the in-memory joins inside the
//! artifact.

use anyhow::Result;
use polars::prelude::*;
use rust_xlsxwriter::{Color, Worksheet};

use super::style::{self, ColumnWidths};
use crate::models::{ExtraCol, SheetConfig};

/// Substitute the 1-based Excel row into a formula template.
pub fn fill_row_placeholder(template: &str, excel_row: usize) -> String {
    template.replace("{row}", &excel_row.to_string())
}

/// Write a DataFrame to a sheet: bold headers, formula columns prefixed at
/// the left (one formula per data row), breakpoint columns hyperlinked,
/// widths sized from cell text.
pub fn write_df_to_sheet(
    ws: &mut Worksheet,
    df: &DataFrame,
    config: &SheetConfig,
    extra_cols: &[ExtraCol],
) -> Result<()> {
    ws.set_name(config.sheet_name)?;
    ws.set_tab_color(Color::RGB(config.tab_color));

    let n_extra = extra_cols.len();
    let header_fmt = style::header_format();
    let link_fmt = style::hyperlink_format();
    let mut widths = ColumnWidths::new(n_extra + df.width());

    for (i, extra) in extra_cols.iter().enumerate() {
        ws.write_string_with_format(0, i as u16, extra.header, &header_fmt)?;
        widths.observe(i, extra.header.len());
    }
    for (i, column) in df.get_columns().iter().enumerate() {
        let sc = n_extra + i;
        ws.write_string_with_format(0, sc as u16, column.name().as_str(), &header_fmt)?;
        widths.observe(sc, column.name().len());
    }

    for r in 0..df.height() {
        let sheet_row = (r + 1) as u32;
        let excel_row = r + 2;

        for (i, extra) in extra_cols.iter().enumerate() {
            let formula = fill_row_placeholder(extra.formula, excel_row);
            ws.write_formula(sheet_row, i as u16, formula.as_str())?;
        }

        for (i, column) in df.get_columns().iter().enumerate() {
            let sc = n_extra + i;
            let value = column.get(r)?;
            if style::is_breakpoint_header(column.name().as_str()) {
                if let Some(text) = style::anyvalue_str(&value) {
                    let url = style::breakpoint_url(text);
                    ws.write_formula_with_format(
                        sheet_row,
                        sc as u16,
                        format!("=HYPERLINK(\"{url}\", \"{text}\")").as_str(),
                        &link_fmt,
                    )?;
                    widths.observe(sc, text.len());
                    continue;
                }
            }
            widths.observe(sc, style::text_len(&value));
            style::write_value(ws, sheet_row, sc as u16, &value, None)?;
        }
    }

    widths.apply(ws)?;
    Ok(())
}
