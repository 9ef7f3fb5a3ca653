use crate::document::{Cell, MergedRange, Sheet};
use crate::error::Position;
use crate::schema::SheetSchema;

const MIN_COLUMN_WIDTH: f64 = 8.0;
const MAX_COLUMN_WIDTH: f64 = 80.0;
const COLUMN_PADDING: f64 = 2.0;

/// Appends rows and cells to a sheet, left to right and top to bottom
pub struct SheetBuilder {
    sheet: Sheet,
    /// 0-based index of the current row, `None` before the first row
    row: Option<usize>,
    /// 0-based index of the next cell in the current row
    column: usize,
}

impl SheetBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            sheet: Sheet::new(name),
            row: None,
            column: 0,
        }
    }

    /// Start a new row. An empty row stays in the sheet as a spacer.
    pub fn next_row(&mut self) -> &mut Self {
        let row = self.row.map_or(0, |r| r + 1);
        if self.sheet.rows.len() <= row {
            self.sheet.rows.resize_with(row + 1, Vec::new);
        }
        self.row = Some(row);
        self.column = 0;
        self
    }

    pub fn cell(&mut self, cell: Cell) -> &mut Self {
        if self.row.is_none() {
            self.next_row();
        }
        let row = self.row.unwrap_or_default();
        self.sheet.set_cell(row, self.column, cell);
        self.column += 1;
        self
    }

    pub fn text_cell(&mut self, text: impl Into<String>) -> &mut Self {
        self.cell(Cell::Text(text.into()))
    }

    pub fn number_cell(&mut self, value: f64) -> &mut Self {
        self.cell(Cell::Number(value))
    }

    /// Skip a cell, leaving it blank
    pub fn blank_cell(&mut self) -> &mut Self {
        self.cell(Cell::Blank)
    }

    /// Write the preamble row of a layout, if it has one
    pub fn preamble_row(&mut self, schema: &SheetSchema) -> &mut Self {
        if !schema.preamble.is_empty() {
            self.next_row();
            for label in schema.preamble {
                self.text_cell(*label);
            }
        }
        self
    }

    /// Write the column header row of a layout
    pub fn header_row(&mut self, schema: &SheetSchema) -> &mut Self {
        self.next_row();
        for header in schema.headers() {
            self.text_cell(header);
        }
        self
    }

    /// Merge the last written cell with the cells to its right, `span` columns in total
    pub fn merge_last_cell(&mut self, span: usize) -> &mut Self {
        if let (Some(row), Some(first_column)) = (self.row, self.column.checked_sub(1)) {
            self.sheet.merged.push(MergedRange {
                first_row: row,
                last_row: row,
                first_column,
                last_column: first_column + span.saturating_sub(1),
            });
        }
        self
    }

    /// Position of the next cell, for errors raised while producing its value
    pub fn next_position(&self) -> Position {
        Position::new(
            self.sheet.name.as_str(),
            self.row.map_or(1, |r| r + 1),
            self.column + 1,
        )
    }

    /// Size the columns to their content and hand out the sheet
    pub fn finish(mut self) -> Sheet {
        autosize_columns(&mut self.sheet);
        self.sheet
    }
}

/// Set each column wide enough for its longest value. Cells inside a merged
/// range spill over several columns and do not count.
pub fn autosize_columns(sheet: &mut Sheet) {
    let count = sheet.column_count();
    let mut widths = vec![MIN_COLUMN_WIDTH; count];

    for (r, cells) in sheet.rows.iter().enumerate() {
        for (c, cell) in cells.iter().enumerate() {
            if sheet.merged.iter().any(|m| m.contains(r, c)) {
                continue;
            }
            let length = cell.display_text().chars().count() as f64 + COLUMN_PADDING;
            widths[c] = widths[c].max(length.min(MAX_COLUMN_WIDTH));
        }
    }

    sheet.column_widths = widths;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{EMPLOYEES, SKILLS};

    #[test]
    fn test_rows_and_cells_are_appended_in_order() {
        let mut builder = SheetBuilder::new("Skills");
        builder.header_row(&SKILLS);
        builder.next_row().text_cell("Pilot");
        builder.next_row();
        builder.next_row().blank_cell().number_cell(3.0);
        let sheet = builder.finish();

        assert_eq!(sheet.rows.len(), 4);
        assert_eq!(sheet.cell(0, 0), &Cell::text("Name"));
        assert_eq!(sheet.cell(1, 0), &Cell::text("Pilot"));
        assert!(sheet.rows[2].is_empty());
        assert_eq!(sheet.cell(3, 0), &Cell::Blank);
        assert_eq!(sheet.cell(3, 1), &Cell::Number(3.0));
    }

    #[test]
    fn test_preamble_row_of_empty_labels() {
        let mut builder = SheetBuilder::new("Employees");
        builder.preamble_row(&EMPLOYEES).header_row(&EMPLOYEES);
        let sheet = builder.finish();
        assert_eq!(sheet.rows[0], vec![Cell::text(""), Cell::text(""), Cell::text("")]);
        assert_eq!(sheet.cell(1, 2), &Cell::text("Skills"));
    }

    #[test]
    fn test_autosize_ignores_merged_cells() {
        let mut builder = SheetBuilder::new("Taxi time");
        builder
            .next_row()
            .text_cell("a very long title that spans several columns")
            .merge_last_cell(3);
        builder.next_row().text_cell("Airport code").text_cell("LHR");
        let sheet = builder.finish();

        assert_eq!(sheet.merged.len(), 1);
        assert_eq!(sheet.merged[0].last_column, 2);
        assert_eq!(sheet.column_widths, vec![14.0, MIN_COLUMN_WIDTH]);
    }

    #[test]
    fn test_next_position_points_at_next_cell() {
        let mut builder = SheetBuilder::new("Flights");
        builder.next_row().next_row().text_cell("FL1");
        assert_eq!(builder.next_position().cell_reference(), "B2");
    }
}
