//! Workbook to [`Solution`] mapping

pub mod expand;
pub mod reader;
pub mod registry;

pub use expand::{split_list, AssignmentExpander};
pub use reader::{format_date_time, parse_date_time, SolutionReader};
pub use registry::Registry;

use std::path::Path;
use tracing::info;

use crate::document::{xlsx, Workbook};
use crate::error::{Error, SheetError};
use crate::model::Solution;
use crate::ui::{Phase, SilentUi, Ui};

/// Read a solution from an xlsx file
pub fn read(path: &Path) -> Result<Solution, Error> {
    read_with_ui(path, &mut SilentUi::new())
}

/// Read a solution from an xlsx file, reporting progress to `ui`
pub fn read_with_ui<U: Ui>(path: &Path, ui: &mut U) -> Result<Solution, Error> {
    let wrap = |source: SheetError| Error::Read {
        path: path.to_path_buf(),
        source,
    };

    ui.set_phase(Phase::Loading);
    let workbook = xlsx::load(path).map_err(|e| wrap(e.into()))?;

    ui.set_phase(Phase::Reading);
    let solution = read_workbook_with_ui(&workbook, ui).map_err(wrap)?;

    info!(
        path = %path.display(),
        skills = solution.skills.len(),
        airports = solution.airports.len(),
        employees = solution.employees.len(),
        flights = solution.flights.len(),
        flight_assignments = solution.flight_assignments.len(),
        "Read solution"
    );
    ui.set_phase(Phase::Complete);
    Ok(solution)
}

/// Read a solution from an in-memory workbook
pub fn read_workbook(workbook: &Workbook) -> Result<Solution, SheetError> {
    read_workbook_with_ui(workbook, &mut SilentUi::new())
}

pub fn read_workbook_with_ui<U: Ui>(workbook: &Workbook, ui: &mut U) -> Result<Solution, SheetError> {
    SolutionReader::new(workbook, ui).read()
}
