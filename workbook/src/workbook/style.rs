//! Cell formatting primitives shared by the sheet writers.
//!
//! The spreadsheet library formats cells at write time, so styling is
//! computed per cell from group metadata rather than patched onto the sheet
//! afterwards.

use polars::prelude::AnyValue;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Worksheet, XlsxError};

pub const FILL_BLUE: Color = Color::RGB(0xB4C6E7);
pub const FILL_GREEN: Color = Color::RGB(0xC6E0B4);
/// Alternating fills for consecutive specimen blocks.
pub const GROUP_FILLS: [Color; 2] = [FILL_BLUE, FILL_GREEN];
pub const HYPERLINK_BLUE: Color = Color::RGB(0x00007F);
pub const DATABAR_GREEN: Color = Color::RGB(0x00FF00);

pub const MIN_COL_WIDTH: f64 = 14.0;
pub const MAX_COL_WIDTH: f64 = 40.0;

pub fn header_format() -> Format {
    Format::new().set_bold()
}

pub fn hyperlink_format() -> Format {
    Format::new().set_font_color(HYPERLINK_BLUE)
}

/// Per-cell style of the summary sheet, resolved to a `Format`.
#[derive(Debug, Default, Clone, Copy)]
pub struct CellStyle {
    pub fill: Option<Color>,
    /// Set on the last row of a specimen block.
    pub thick_bottom: bool,
    pub hyperlink: bool,
    pub left_align: bool,
    pub top_align: bool,
}

impl CellStyle {
    pub fn format(&self) -> Format {
        let mut format = Format::new().set_border(FormatBorder::Thin);
        if self.thick_bottom {
            format = format.set_border_bottom(FormatBorder::Thick);
        }
        if let Some(fill) = self.fill {
            format = format.set_background_color(fill);
        }
        if self.hyperlink {
            format = format.set_font_color(HYPERLINK_BLUE);
        }
        if self.left_align {
            format = format.set_align(FormatAlign::Left);
        }
        if self.top_align {
            format = format.set_align(FormatAlign::Top);
        }
        format
    }
}

/// Tracks the longest cell text per column so widths can be sized once the
/// sheet is written. Formula cells are not observed; their display text is
/// unknown until the artifact is opened.
pub struct ColumnWidths {
    maxes: Vec<usize>,
    fixed: Vec<Option<f64>>,
}

impl ColumnWidths {
    pub fn new(n_cols: usize) -> Self {
        Self {
            maxes: vec![0; n_cols],
            fixed: vec![None; n_cols],
        }
    }

    pub fn observe(&mut self, col: usize, len: usize) {
        if col >= self.maxes.len() {
            self.maxes.resize(col + 1, 0);
            self.fixed.resize(col + 1, None);
        }
        if len > self.maxes[col] {
            self.maxes[col] = len;
        }
    }

    /// Pin a column to an exact width, overriding the observed text length.
    pub fn fix(&mut self, col: usize, width: f64) {
        self.observe(col, 0);
        self.fixed[col] = Some(width);
    }

    pub fn apply(&self, ws: &mut Worksheet) -> Result<(), XlsxError> {
        for (col, max) in self.maxes.iter().enumerate() {
            let width = match self.fixed[col] {
                Some(w) => w,
                None => (*max as f64 + 2.0).clamp(MIN_COL_WIDTH, MAX_COL_WIDTH),
            };
            ws.set_column_width(col as u16, width)?;
        }
        Ok(())
    }
}

pub fn anyvalue_str<'a>(value: &'a AnyValue) -> Option<&'a str> {
    match value {
        AnyValue::String(s) => Some(s),
        AnyValue::StringOwned(s) => Some(s.as_str()),
        _ => None,
    }
}

pub fn text_len(value: &AnyValue) -> usize {
    match value {
        AnyValue::Null => 0,
        other => match anyvalue_str(other) {
            Some(s) => s.len(),
            None => other.to_string().len(),
        },
    }
}

fn numeric_value(value: &AnyValue) -> Option<f64> {
    match value {
        AnyValue::Float64(x) => Some(*x),
        AnyValue::Float32(x) => Some(*x as f64),
        AnyValue::Int64(x) => Some(*x as f64),
        AnyValue::Int32(x) => Some(*x as f64),
        AnyValue::Int16(x) => Some(*x as f64),
        AnyValue::Int8(x) => Some(*x as f64),
        AnyValue::UInt64(x) => Some(*x as f64),
        AnyValue::UInt32(x) => Some(*x as f64),
        AnyValue::UInt16(x) => Some(*x as f64),
        AnyValue::UInt8(x) => Some(*x as f64),
        _ => None,
    }
}

/// Write one table value into a cell, with or without a format. Nulls
/// become blank (formatted) cells.
pub fn write_value(
    ws: &mut Worksheet,
    row: u32,
    col: u16,
    value: &AnyValue,
    format: Option<&Format>,
) -> Result<(), XlsxError> {
    match value {
        AnyValue::Null => {
            if let Some(f) = format {
                ws.write_blank(row, col, f)?;
            }
        }
        AnyValue::Boolean(b) => match format {
            Some(f) => {
                ws.write_boolean_with_format(row, col, *b, f)?;
            }
            None => {
                ws.write_boolean(row, col, *b)?;
            }
        },
        other => {
            if let Some(s) = anyvalue_str(other) {
                match format {
                    Some(f) => {
                        ws.write_string_with_format(row, col, s, f)?;
                    }
                    None => {
                        ws.write_string(row, col, s)?;
                    }
                }
            } else if let Some(n) = numeric_value(other) {
                match format {
                    Some(f) => {
                        ws.write_number_with_format(row, col, n, f)?;
                    }
                    None => {
                        ws.write_number(row, col, n)?;
                    }
                }
            } else {
                let s = other.to_string();
                match format {
                    Some(f) => {
                        ws.write_string_with_format(row, col, s.as_str(), f)?;
                    }
                    None => {
                        ws.write_string(row, col, s.as_str())?;
                    }
                }
            }
        }
    }
    Ok(())
}

pub fn is_breakpoint_header(name: &str) -> bool {
    matches!(
        name.to_ascii_lowercase().as_str(),
        "leftbreakpoint" | "rightbreakpoint"
    )
}

/// Genome-browser position URL for a breakpoint coordinate; a trailing
/// strand field (`chr7:55087058:+`) is dropped.
pub fn breakpoint_url(breakpoint: &str) -> String {
    let coord: Vec<&str> = breakpoint.split(':').take(2).collect();
    format!("https://varsome.com/position/hg38/{}", coord.join(":"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breakpoint_url_drops_strand() {
        assert_eq!(
            breakpoint_url("chr7:55087058:+"),
            "https://varsome.com/position/hg38/chr7:55087058"
        );
        assert_eq!(
            breakpoint_url("chr7:55087058"),
            "https://varsome.com/position/hg38/chr7:55087058"
        );
    }

    #[test]
    fn breakpoint_headers_match_case_insensitively() {
        assert!(is_breakpoint_header("LeftBreakpoint"));
        assert!(is_breakpoint_header("rightbreakpoint"));
        assert!(!is_breakpoint_header("LeftGene"));
    }

    #[test]
    fn text_len_ignores_nulls() {
        assert_eq!(text_len(&AnyValue::Null), 0);
        assert_eq!(text_len(&AnyValue::String("chr1:100")), 8);
    }

    #[test]
    fn widths_clamp_and_fix() {
        let mut widths = ColumnWidths::new(2);
        widths.observe(0, 100);
        widths.fix(1, 10.0);
        let mut ws = Worksheet::new();
        widths.apply(&mut ws).unwrap();
    }
}
