//! XLSX encoding of a [`Workbook`] through umya-spreadsheet.

use std::path::Path;

use tracing::debug;
use umya_spreadsheet::{CellRawValue, CellValue, Spreadsheet, XlsxError};

use super::{Cell, Sheet, Workbook};
use crate::error::column_letters;

/// Load every worksheet of an xlsx file
pub fn load(path: &Path) -> Result<Workbook, XlsxError> {
    let book = umya_spreadsheet::reader::xlsx::read(path)?;
    Ok(from_spreadsheet(&book))
}

/// Save a workbook as an xlsx file, replacing whatever is at `path`
pub fn save(workbook: &Workbook, path: &Path) -> Result<(), XlsxError> {
    let book = to_spreadsheet(workbook)?;
    umya_spreadsheet::writer::xlsx::write(&book, path)?;
    Ok(())
}

fn convert_cell_value(cv: &CellValue) -> Cell {
    match cv.get_raw_value() {
        CellRawValue::Empty => Cell::Blank,
        CellRawValue::Numeric(n) => Cell::Number(*n),
        CellRawValue::String(s) => Cell::Text(s.to_string()),
        CellRawValue::RichText(rt) => Cell::Text(rt.get_text().to_string()),
        CellRawValue::Lazy(s) => {
            let txt: &str = s.as_ref();
            match txt.parse::<f64>() {
                Ok(n) => Cell::Number(n),
                Err(_) => Cell::Text(txt.to_string()),
            }
        }
        CellRawValue::Bool(b) => Cell::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        CellRawValue::Error(_) => Cell::Text(cv.get_value().to_string()),
    }
}

fn from_spreadsheet(book: &Spreadsheet) -> Workbook {
    let count = book.get_sheet_count();
    let mut sheets = Vec::with_capacity(count);

    for i in 0..count {
        let Some(ws) = book.get_sheet(&i) else {
            continue;
        };
        let mut sheet = Sheet::new(ws.get_name());

        for cell in ws.get_cell_collection() {
            let coord = cell.get_coordinate();
            let col = *coord.get_col_num() as usize;
            let row = *coord.get_row_num() as usize;
            if col == 0 || row == 0 {
                continue;
            }
            let value = convert_cell_value(cell.get_cell_value());
            if value.is_blank() {
                continue;
            }
            sheet.set_cell(row - 1, col - 1, value);
        }

        debug!(sheet = %sheet.name, rows = sheet.rows.len(), "Loaded worksheet");
        sheets.push(sheet);
    }

    Workbook { sheets }
}

fn to_spreadsheet(workbook: &Workbook) -> Result<Spreadsheet, XlsxError> {
    let mut book = umya_spreadsheet::new_file();

    for (i, sheet) in workbook.sheets.iter().enumerate() {
        // A new file starts with one default worksheet: reuse it for the first sheet
        let ws = if i == 0 {
            let ws = book
                .get_sheet_mut(&0)
                .ok_or_else(|| XlsxError::CellError("default worksheet missing".into()))?;
            ws.set_name(sheet.name.as_str());
            ws
        } else {
            book.new_sheet(sheet.name.as_str())
                .map_err(|e| XlsxError::CellError(format!("{} ({})", e, sheet.name)))?
        };

        for (r, cells) in sheet.rows.iter().enumerate() {
            for (c, value) in cells.iter().enumerate() {
                let coordinate = ((c + 1) as u32, (r + 1) as u32);
                match value {
                    Cell::Blank => {}
                    Cell::Text(s) => {
                        ws.get_cell_mut(coordinate).set_value_string(s.as_str());
                    }
                    Cell::Number(n) => {
                        ws.get_cell_mut(coordinate).set_value_number(*n);
                    }
                }
            }
        }

        for (c, width) in sheet.column_widths.iter().enumerate() {
            ws.get_column_dimension_by_number_mut(&((c + 1) as u32))
                .set_width(*width);
        }

        for range in &sheet.merged {
            ws.add_merge_cells(format!(
                "{}{}:{}{}",
                column_letters(range.first_column + 1),
                range.first_row + 1,
                column_letters(range.last_column + 1),
                range.last_row + 1
            ));
        }
    }

    Ok(book)
}
