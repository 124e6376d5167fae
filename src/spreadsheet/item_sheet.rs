use bigdecimal::ToPrimitive;
use calamine::Data;

use super::{cell_decimal, cell_text, read_first_sheet, write_sheet, Cell};
use crate::domain::errors::DomainError;
use crate::domain::item::{Item, NewItem};

pub const SHEET_NAME: &str = "品項主檔";
pub const NAME_HEADER: &str = "品項名稱";
pub const PRICE_HEADER: &str = "價格 (NT$)";
pub const ACTIVE_HEADER: &str = "啟用";
pub const ID_HEADER: &str = "ID";

pub fn export_filename() -> String {
    "品項主檔.xlsx".to_string()
}

pub fn export_items(items: &[Item]) -> Result<Vec<u8>, DomainError> {
    let header: Vec<String> = [NAME_HEADER, PRICE_HEADER, ACTIVE_HEADER, ID_HEADER]
        .iter()
        .map(|h| h.to_string())
        .collect();
    let rows: Vec<Vec<Cell>> = items
        .iter()
        .map(|item| {
            vec![
                Cell::text(item.name.as_str()),
                Cell::Number(item.price.to_f64().unwrap_or_default()),
                Cell::text(if item.is_active { "是" } else { "否" }),
                Cell::text(item.id.to_string()),
            ]
        })
        .collect();
    write_sheet(SHEET_NAME, &header, &rows)
}

/// Rows accepted from an uploaded catalog file.
#[derive(Debug, Default)]
pub struct ParsedItems {
    pub rows: Vec<NewItem>,
    /// Rows with an empty name or an unusable price.
    pub invalid: usize,
}

/// Reads a catalog file. The header row must name at least the item name and
/// price columns; anything else rejects the whole file. Bad rows are counted
/// and skipped, blank rows are ignored.
pub fn parse_items(bytes: &[u8]) -> Result<ParsedItems, DomainError> {
    let rows = read_first_sheet(bytes)?;
    let mut rows = rows.into_iter();
    let header: Vec<String> = rows
        .next()
        .map(|r| r.iter().map(cell_text).collect())
        .unwrap_or_default();
    let column = |title: &str| header.iter().position(|h| h == title);

    let (Some(name_col), Some(price_col)) = (column(NAME_HEADER), column(PRICE_HEADER)) else {
        return Err(DomainError::InvalidInput(format!(
            "the first row must contain the columns '{NAME_HEADER}' and '{PRICE_HEADER}'"
        )));
    };
    let active_col = column(ACTIVE_HEADER);

    let mut parsed = ParsedItems::default();
    for row in rows {
        if row.iter().all(|c| matches!(c, Data::Empty)) {
            continue;
        }
        let name = row.get(name_col).map(cell_text).unwrap_or_default();
        let Some(price) = row.get(price_col).and_then(cell_decimal) else {
            parsed.invalid += 1;
            continue;
        };
        match NewItem::new(&name, price) {
            Ok(mut item) => {
                if let Some(active) = active_col.and_then(|c| row.get(c)).and_then(parse_active) {
                    item.is_active = active;
                }
                parsed.rows.push(item);
            }
            Err(_) => parsed.invalid += 1,
        }
    }
    Ok(parsed)
}

fn parse_active(cell: &Data) -> Option<bool> {
    if let Data::Bool(value) = cell {
        return Some(*value);
    }
    match cell_text(cell).to_lowercase().as_str() {
        "是" | "啟用" | "true" | "yes" | "y" | "1" => Some(true),
        "否" | "停用" | "false" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}
