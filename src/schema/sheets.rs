//! Sheet layouts of a flight crew scheduling workbook, in read order

use super::types::*;

/// Separator of multi-value cells. There is no escaping.
pub const LIST_SEPARATOR: &str = ", ";

/// chrono pattern of every date time cell
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Weight cell text of a constraint that has no tunable weight
pub const NOT_APPLICABLE: &str = "n/a";

/// Score cell text of a solution the solver has not seen yet
pub const NOT_YET_SOLVED: &str = "Not yet solved";

pub const TAXI_TIME_TITLE: &str = "Driving time in minutes by taxi between two nearby airports to allow employees to start from a different airport.";

/// Columns the taxi time title spans on write
pub const TAXI_TIME_TITLE_SPAN: usize = 11;

/// Indent of constraint match rows in the score view
pub const MATCH_INDENT: &str = "    ";

// =============================================================================
// Constraints listed on the configuration sheet
// =============================================================================

pub const NIGHTS_AWAY_FROM_BASE_FAIRNESS: &str = "Nights away from base fairness";
pub const NIGHTS_AWAY_FROM_BASE_FAIRNESS_DESCRIPTION: &str =
    "Soft penalty to load balance the nights away from base";

pub const REQUIRED_SKILL: &str = "Required skill";
pub const REQUIRED_SKILL_DESCRIPTION: &str = "Hard penalty per missing required skill";

// =============================================================================
// Sheets
// =============================================================================

pub static CONFIGURATION: SheetSchema = SheetSchema {
    name: "Configuration",
    preamble: &[],
    columns: &[
        Column::new("Constraint", ColumnType::Text),
        Column::new("Weight", ColumnType::Weight),
        Column::new("Description", ColumnType::Text),
    ],
    dynamic_columns: false,
    write_only: false,
};

pub static SKILLS: SheetSchema = SheetSchema {
    name: "Skills",
    preamble: &[],
    columns: &[Column::new("Name", ColumnType::Text)],
    dynamic_columns: false,
    write_only: false,
};

pub static AIRPORTS: SheetSchema = SheetSchema {
    name: "Airports",
    preamble: &[],
    columns: &[
        Column::new("Code", ColumnType::Text),
        Column::new("Name", ColumnType::Text),
        Column::new("Latitude", ColumnType::Number),
        Column::new("Longitude", ColumnType::Number),
    ],
    dynamic_columns: false,
    write_only: false,
};

pub static TAXI_TIME: SheetSchema = SheetSchema {
    name: "Taxi time",
    preamble: &[TAXI_TIME_TITLE],
    columns: &[Column::new("Airport code", ColumnType::Text)],
    dynamic_columns: true,
    write_only: false,
};

pub static EMPLOYEES: SheetSchema = SheetSchema {
    name: "Employees",
    preamble: &["", "", ""],
    columns: &[
        Column::new("Name", ColumnType::Text),
        Column::new("Home airport", ColumnType::Text),
        Column::new("Skills", ColumnType::List),
    ],
    dynamic_columns: false,
    write_only: false,
};

pub static FLIGHTS: SheetSchema = SheetSchema {
    name: "Flights",
    preamble: &[],
    columns: &[
        Column::new("Flight number", ColumnType::Text),
        Column::new("Departure airport code", ColumnType::Text),
        Column::new("Departure UTC date time", ColumnType::DateTime),
        Column::new("Arrival airport code", ColumnType::Text),
        Column::new("Arrival UTC date time", ColumnType::DateTime),
        Column::new("Employee skill requirements", ColumnType::List),
    ],
    dynamic_columns: false,
    write_only: false,
};

pub static SCORE_VIEW: SheetSchema = SheetSchema {
    name: "Score view",
    preamble: &["Score"],
    columns: &[
        Column::new("Constraint match", ColumnType::Text),
        Column::new("Match score", ColumnType::Text),
        Column::new("Total score", ColumnType::Text),
    ],
    dynamic_columns: false,
    write_only: true,
};

/// All sheets in workbook order. Later sheets refer to earlier ones by natural key.
pub static ALL_SHEETS: &[&SheetSchema] = &[
    &CONFIGURATION,
    &SKILLS,
    &AIRPORTS,
    &TAXI_TIME,
    &EMPLOYEES,
    &FLIGHTS,
    &SCORE_VIEW,
];

/// Get a sheet layout by name
pub fn get_sheet(name: &str) -> Option<&'static SheetSchema> {
    ALL_SHEETS.iter().copied().find(|s| s.name == name)
}

/// Names of the sheets the reader consumes
pub fn readable_sheet_names() -> impl Iterator<Item = &'static str> {
    ALL_SHEETS.iter().filter(|s| !s.write_only).map(|s| s.name)
}
