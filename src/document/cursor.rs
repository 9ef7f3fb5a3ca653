//! Forward-only navigation over the sheets, rows and cells of a [`Workbook`].

use super::{Cell, Sheet, Workbook};
use crate::error::{Position, SheetError};

static BLANK: Cell = Cell::Blank;

/// Sequential reader over one workbook.
///
/// The cursor sits on one sheet and one row at a time; every typed accessor
/// consumes the next cell of the current row. [`Cursor::position`] always
/// points at the last consumed cell so errors can name it.
pub struct Cursor<'a> {
    workbook: &'a Workbook,
    sheet: Option<&'a Sheet>,
    /// 0-based index of the current row, `None` before the first advance
    row: Option<usize>,
    /// 0-based index of the next cell to consume
    column: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(workbook: &'a Workbook) -> Self {
        Self {
            workbook,
            sheet: None,
            row: None,
            column: 0,
        }
    }

    /// Position on the named sheet, before its first row
    pub fn open_sheet(&mut self, name: &str) -> Result<(), SheetError> {
        let sheet = self
            .workbook
            .sheet(name)
            .ok_or_else(|| SheetError::SchemaViolation {
                position: Position::new(name, 1, 1),
                expected: format!("a sheet named {}", name),
                found: format!("sheets {:?}", self.workbook.sheet_names()),
            })?;
        self.sheet = Some(sheet);
        self.row = None;
        self.column = 0;
        Ok(())
    }

    pub fn sheet_name(&self) -> &'a str {
        self.sheet.map(|s| s.name.as_str()).unwrap_or_default()
    }

    /// Move to the next row. Returns false once the sheet is exhausted.
    pub fn advance_row(&mut self) -> bool {
        let Some(sheet) = self.sheet else {
            return false;
        };
        let next = self.row.map_or(0, |r| r + 1);
        if next >= sheet.rows.len() {
            self.row = Some(sheet.rows.len());
            return false;
        }
        self.row = Some(next);
        self.column = 0;
        true
    }

    /// Move to the next row that has at least one non-empty cell
    pub fn advance_to_data_row(&mut self) -> bool {
        while self.advance_row() {
            if !self.current_row_is_empty() {
                return true;
            }
        }
        false
    }

    /// Move to the next row, failing if the sheet ends first
    pub fn expect_row(&mut self) -> Result<(), SheetError> {
        if self.advance_row() {
            Ok(())
        } else {
            Err(SheetError::SchemaViolation {
                position: self.next_position(),
                expected: "another header row".to_string(),
                found: "the end of the sheet".to_string(),
            })
        }
    }

    /// Consume the next cell, failing unless its text equals `expected` exactly.
    /// A blank cell counts as empty text.
    pub fn read_header_cell(&mut self, expected: &str) -> Result<(), SheetError> {
        let cell = self.next_cell();
        let found = cell.display_text();
        if found != expected {
            return Err(SheetError::SchemaViolation {
                position: self.position(),
                expected: expected.to_string(),
                found,
            });
        }
        Ok(())
    }

    /// Consume the next cell as non-empty text
    pub fn read_string_cell(&mut self) -> Result<&'a str, SheetError> {
        match self.read_optional_string_cell()? {
            Some(text) => Ok(text),
            None => Err(self.format_error("", "must not be blank")),
        }
    }

    /// Consume the next cell as text, `None` if it is blank or empty
    pub fn read_optional_string_cell(&mut self) -> Result<Option<&'a str>, SheetError> {
        match self.next_cell() {
            Cell::Blank => Ok(None),
            Cell::Text(s) if s.is_empty() => Ok(None),
            Cell::Text(s) => Ok(Some(s.as_str())),
            other @ Cell::Number(_) => Err(self.format_error(
                &other.display_text(),
                format!("must be a text cell, not a {} cell", other.type_name()),
            )),
        }
    }

    /// Consume the next cell as a number
    pub fn read_numeric_cell(&mut self) -> Result<f64, SheetError> {
        match self.read_optional_numeric_cell()? {
            Some(n) => Ok(n),
            None => Err(self.format_error("", "must not be blank")),
        }
    }

    /// Consume the next cell as a number, `None` if it is blank
    pub fn read_optional_numeric_cell(&mut self) -> Result<Option<f64>, SheetError> {
        match self.next_cell() {
            Cell::Blank => Ok(None),
            Cell::Number(n) => Ok(Some(*n)),
            Cell::Text(s) if s.is_empty() => Ok(None),
            Cell::Text(s) => Err(self.format_error(s, "must be a numeric cell")),
        }
    }

    /// Consume the next cell without interpreting it
    pub fn next_cell(&mut self) -> &'a Cell {
        let cell = match (self.sheet, self.row) {
            (Some(sheet), Some(row)) => sheet.cell(row, self.column),
            _ => &BLANK,
        };
        self.column += 1;
        cell
    }

    /// Position of the last consumed cell
    pub fn position(&self) -> Position {
        Position::new(
            self.sheet_name(),
            self.row.map_or(1, |r| r + 1),
            self.column.max(1),
        )
    }

    /// Build a format error pointing at the last consumed cell
    pub fn format_error(&self, value: &str, message: impl Into<String>) -> SheetError {
        SheetError::Format {
            position: self.position(),
            value: value.to_string(),
            message: message.into(),
        }
    }

    fn next_position(&self) -> Position {
        Position::new(self.sheet_name(), self.row.map_or(1, |r| r + 2), 1)
    }

    fn current_row_is_empty(&self) -> bool {
        match (self.sheet, self.row) {
            (Some(sheet), Some(row)) => sheet
                .rows
                .get(row)
                .map_or(true, |cells| cells.iter().all(Cell::is_empty)),
            _ => true,
        }
    }
}
