use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Location of a cell in a workbook, 1-based like a spreadsheet UI shows it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub sheet: String,
    pub row: usize,
    pub column: usize,
}

impl Position {
    pub fn new(sheet: impl Into<String>, row: usize, column: usize) -> Self {
        Self {
            sheet: sheet.into(),
            row,
            column,
        }
    }

    /// A1 style reference of the cell, e.g. `C12`
    pub fn cell_reference(&self) -> String {
        format!("{}{}", column_letters(self.column), self.row)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sheet ({}) cell {}", self.sheet, self.cell_reference())
    }
}

/// Convert a 1-based column number to spreadsheet letters (1 -> A, 27 -> AA)
pub fn column_letters(column: usize) -> String {
    let mut letters = Vec::new();
    let mut n = column;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Everything that can go wrong while mapping between a workbook and a solution
#[derive(Debug, Error)]
pub enum SheetError {
    /// The workbook does not follow the expected template
    #[error("{position}: expected ({expected}) but found ({found})")]
    SchemaViolation {
        position: Position,
        expected: String,
        found: String,
    },

    /// A natural key or id does not resolve
    #[error(
        "{position}: the {owner}'s {field} ({key}) does not exist in the {registry} {known:?} of the other sheet ({sheet})"
    )]
    Reference {
        position: Position,
        owner: String,
        field: &'static str,
        key: String,
        registry: &'static str,
        sheet: &'static str,
        known: Vec<String>,
    },

    /// A cell has the wrong type or a value breaks a domain rule
    #[error("{position}: the value ({value}) {message}")]
    Format {
        position: Position,
        value: String,
        message: String,
    },

    /// Opening, decoding, encoding or saving the document failed
    #[error("workbook transport failure: {0}")]
    Transport(#[from] umya_spreadsheet::XlsxError),
}

impl SheetError {
    pub fn position(&self) -> Option<&Position> {
        match self {
            SheetError::SchemaViolation { position, .. }
            | SheetError::Reference { position, .. }
            | SheetError::Format { position, .. } => Some(position),
            SheetError::Transport(_) => None,
        }
    }
}

/// Terminal error of a `read` or `write`, naming the file that failed
#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed reading input file ({path})")]
    Read {
        path: PathBuf,
        #[source]
        source: SheetError,
    },

    #[error("Failed writing output file ({path})")]
    Write {
        path: PathBuf,
        #[source]
        source: SheetError,
    },
}

impl Error {
    /// The underlying cause
    pub fn cause(&self) -> &SheetError {
        match self {
            Error::Read { source, .. } | Error::Write { source, .. } => source,
        }
    }
}

/// Structural problems of an in-memory solution
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IntegrityError {
    #[error("The {kind} at position {position} has id ({id})")]
    IdMismatch {
        kind: &'static str,
        position: usize,
        id: usize,
    },

    #[error("The {owner}'s {field} (#{id}) does not exist in the {kind}")]
    Dangling {
        owner: String,
        field: &'static str,
        id: usize,
        kind: &'static str,
    },

    /// A value that could be written but would not read back
    #[error("The {owner}'s {field} ({value}) {message}")]
    InvalidValue {
        owner: String,
        field: &'static str,
        value: String,
        message: String,
    },

    #[error("The {kind} ({key}) appears twice, first as #{first}")]
    DuplicateKey {
        kind: &'static str,
        key: String,
        first: usize,
    },

    #[error("The flight assignment (#{id}) is out of order: assignments must be grouped by flight in flight order with indices counting up from 0")]
    AssignmentOrder { id: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letters() {
        assert_eq!(column_letters(1), "A");
        assert_eq!(column_letters(26), "Z");
        assert_eq!(column_letters(27), "AA");
        assert_eq!(column_letters(52), "AZ");
        assert_eq!(column_letters(703), "AAA");
    }

    #[test]
    fn test_position_display() {
        let position = Position::new("Employees", 3, 2);
        assert_eq!(position.to_string(), "Sheet (Employees) cell B3");
    }

    #[test]
    fn test_reference_error_lists_known_keys() {
        let err = SheetError::Reference {
            position: Position::new("Employees", 3, 2),
            owner: "employee (Ann)".to_string(),
            field: "homeAirport",
            key: "CDG".to_string(),
            registry: "airports",
            sheet: "Airports",
            known: vec!["LHR".to_string(), "JFK".to_string()],
        };
        let message = err.to_string();
        assert!(message.contains("Sheet (Employees) cell B3"));
        assert!(message.contains("(CDG)"));
        assert!(message.contains("[\"LHR\", \"JFK\"]"));
    }
}
