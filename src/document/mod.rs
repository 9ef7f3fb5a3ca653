//! In-memory workbook: ordered named sheets of ordered rows of typed cells.
//!
//! The schema reader and writer only ever see this model; the xlsx encoding
//! lives in [`xlsx`].

pub mod cursor;
pub mod xlsx;

pub use cursor::Cursor;

use serde::{Deserialize, Serialize};

/// A single cell value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    /// No value at all, distinct from `Number(0.0)` and `Text("")`
    #[default]
    Blank,
    Text(String),
    Number(f64),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Cell::Blank)
    }

    /// Blank or empty text
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Blank => true,
            Cell::Text(s) => s.is_empty(),
            Cell::Number(_) => false,
        }
    }

    /// Rendering used in error messages and for column sizing
    pub fn display_text(&self) -> String {
        match self {
            Cell::Blank => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => n.to_string(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Cell::Blank => "blank",
            Cell::Text(_) => "text",
            Cell::Number(_) => "numeric",
        }
    }
}

/// Rectangular range of merged cells, 0-based inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedRange {
    pub first_row: usize,
    pub last_row: usize,
    pub first_column: usize,
    pub last_column: usize,
}

impl MergedRange {
    pub fn contains(&self, row: usize, column: usize) -> bool {
        (self.first_row..=self.last_row).contains(&row)
            && (self.first_column..=self.last_column).contains(&column)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
    /// Column widths in characters, indexed by 0-based column. Presentation only.
    pub column_widths: Vec<f64>,
    pub merged: Vec<MergedRange>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Cell at a 0-based position; anything outside the written area is blank
    pub fn cell(&self, row: usize, column: usize) -> &Cell {
        static BLANK: Cell = Cell::Blank;
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&BLANK)
    }

    /// Put a value at a 0-based position, growing the grid with blanks
    pub fn set_cell(&mut self, row: usize, column: usize, cell: Cell) {
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Vec::new);
        }
        let cells = &mut self.rows[row];
        if cells.len() <= column {
            cells.resize_with(column + 1, Cell::default);
        }
        cells[column] = cell;
    }

    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn sheet_mut(&mut self, name: &str) -> Option<&mut Sheet> {
        self.sheets.iter_mut().find(|s| s.name == name)
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }
}
