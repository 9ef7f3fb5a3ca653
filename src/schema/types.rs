/// Cell content expected in a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    /// Numeric cell, integral where the model stores an integer
    Number,
    /// Text in the fixed `yyyy-MM-ddTHH:mm` pattern
    DateTime,
    /// Text holding several natural keys joined by the list separator
    List,
    /// Numeric cell or the literal `n/a`
    Weight,
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnType::Text => write!(f, "text"),
            ColumnType::Number => write!(f, "number"),
            ColumnType::DateTime => write!(f, "date time"),
            ColumnType::List => write!(f, "list"),
            ColumnType::Weight => write!(f, "weight"),
        }
    }
}

/// Column definition
#[derive(Debug, Clone)]
pub struct Column {
    /// Exact header label, verified on read
    pub header: &'static str,
    pub col_type: ColumnType,
}

impl Column {
    pub const fn new(header: &'static str, col_type: ColumnType) -> Self {
        Self { header, col_type }
    }
}

/// Layout of one sheet
#[derive(Debug, Clone)]
pub struct SheetSchema {
    pub name: &'static str,
    /// Label row written above the column headers, if any
    pub preamble: &'static [&'static str],
    pub columns: &'static [Column],
    /// Header labels that follow the fixed columns are taken from the data
    /// (the taxi time matrix uses one column per airport code)
    pub dynamic_columns: bool,
    /// Written but never read back
    pub write_only: bool,
}

impl SheetSchema {
    pub fn headers(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(|c| c.header)
    }

    /// Header labels with the cell content each column takes, e.g. `Latitude (number)`
    pub fn describe_columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = self
            .columns
            .iter()
            .map(|c| format!("{} ({})", c.header, c.col_type))
            .collect();
        if self.dynamic_columns {
            columns.push(format!("<one per airport code> ({})", ColumnType::Number));
        }
        columns
    }
}
