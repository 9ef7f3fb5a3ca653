//! [`Solution`] to workbook mapping

pub mod builder;
pub mod report;
pub mod sheets;

pub use builder::{autosize_columns, SheetBuilder};
pub use report::write_score_view;
pub use sheets::SolutionWriter;

use std::path::Path;
use tracing::info;

use crate::document::{xlsx, Workbook};
use crate::error::{Error, SheetError};
use crate::model::Solution;
use crate::ui::{Phase, SilentUi, Ui};

/// Write a solution to an xlsx file, replacing it if it exists
pub fn write(solution: &Solution, path: &Path) -> Result<(), Error> {
    write_with_ui(solution, path, &mut SilentUi::new())
}

/// Write a solution to an xlsx file, reporting progress to `ui`
pub fn write_with_ui<U: Ui>(solution: &Solution, path: &Path, ui: &mut U) -> Result<(), Error> {
    let wrap = |source: SheetError| Error::Write {
        path: path.to_path_buf(),
        source,
    };

    ui.set_phase(Phase::Writing);
    let workbook = write_workbook_with_ui(solution, ui).map_err(wrap)?;

    ui.set_phase(Phase::Saving);
    xlsx::save(&workbook, path).map_err(|e| wrap(e.into()))?;

    info!(
        path = %path.display(),
        sheets = workbook.sheets.len(),
        flights = solution.flights.len(),
        "Wrote solution"
    );
    ui.set_phase(Phase::Complete);
    Ok(())
}

/// Build the in-memory workbook for a solution without touching the filesystem
pub fn write_workbook(solution: &Solution) -> Result<Workbook, SheetError> {
    write_workbook_with_ui(solution, &mut SilentUi::new())
}

pub fn write_workbook_with_ui<U: Ui>(solution: &Solution, ui: &mut U) -> Result<Workbook, SheetError> {
    SolutionWriter::new(solution, ui).write()
}
