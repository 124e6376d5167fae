//! `.xlsx` reports and catalog transfer files.
//!
//! Sheets are built as rows of [`Cell`]s first and only then written with
//! `rust_xlsxwriter`, so the row layout can be checked without a workbook.
//! Uploaded files are read back with `calamine`.

pub mod item_sheet;
pub mod order_sheet;

use std::io::Cursor;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use calamine::{Data, Reader, Xlsx};
use rust_xlsxwriter::{Format, Workbook, XlsxError};

use crate::domain::errors::DomainError;

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }
}

/// A finished workbook ready to be downloaded.
#[derive(Debug, Clone)]
pub struct SpreadsheetFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl From<XlsxError> for DomainError {
    fn from(e: XlsxError) -> Self {
        DomainError::Internal(format!("spreadsheet write failed: {e}"))
    }
}

/// Writes a single-sheet workbook: a bold header row followed by `rows`.
pub fn write_sheet(
    sheet_name: &str,
    header: &[String],
    rows: &[Vec<Cell>],
) -> Result<Vec<u8>, DomainError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;

    for (col, title) in header.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, title, &bold)?;
    }
    for (idx, row) in rows.iter().enumerate() {
        let row_num = (idx + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            let col = col as u16;
            match cell {
                Cell::Text(text) => {
                    worksheet.write_string(row_num, col, text)?;
                }
                Cell::Number(value) => {
                    worksheet.write_number(row_num, col, *value)?;
                }
                Cell::Empty => {}
            }
        }
    }
    worksheet.autofit();

    Ok(workbook.save_to_buffer()?)
}

/// All rows of the first worksheet, header included.
pub fn read_first_sheet(bytes: &[u8]) -> Result<Vec<Vec<Data>>, DomainError> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))
        .map_err(|e| DomainError::InvalidInput(format!("not a readable .xlsx file: {e}")))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| DomainError::InvalidInput("the spreadsheet has no sheets".to_string()))?
        .map_err(|e| DomainError::InvalidInput(format!("unreadable worksheet: {e}")))?;
    Ok(range.rows().map(|row| row.to_vec()).collect())
}

pub(crate) fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Empty => String::new(),
        other => other.to_string().trim().to_string(),
    }
}

/// Numeric value of a cell. Text cells may carry an `NT$` prefix and
/// thousands separators.
pub(crate) fn cell_decimal(cell: &Data) -> Option<BigDecimal> {
    match cell {
        Data::Int(value) => Some(BigDecimal::from(*value)),
        Data::Float(value) if value.is_finite() => BigDecimal::from_str(&value.to_string()).ok(),
        Data::String(text) => {
            let cleaned = text.trim().trim_start_matches("NT$").trim().replace(',', "");
            BigDecimal::from_str(&cleaned).ok()
        }
        _ => None,
    }
}
