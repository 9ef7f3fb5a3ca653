//! Score view: the solver's score and its breakdown per constraint.
//!
//! Write only. Nothing on this sheet is read back.

use super::builder::SheetBuilder;
use crate::document::Sheet;
use crate::error::SheetError;
use crate::model::{ConstraintMatch, Justification, Solution};
use crate::schema::{
    FLIGHTS, LIST_SEPARATOR, MATCH_INDENT, NOT_YET_SOLVED, SCORE_VIEW,
};

/// Render the score view sheet.
///
/// Without a score only the placeholder is written. With a score, every
/// constraint total follows with its matches, least severe penalty last.
pub fn write_score_view(solution: &Solution) -> Result<Sheet, SheetError> {
    let mut builder = SheetBuilder::new(SCORE_VIEW.name);
    builder.preamble_row(&SCORE_VIEW);
    match &solution.score {
        Some(score) => builder.text_cell(score.to_short_string()),
        None => builder.text_cell(NOT_YET_SOLVED),
    };
    builder.next_row();
    builder.header_row(&SCORE_VIEW);

    if solution.score.is_none() {
        return Ok(builder.finish());
    }

    for total in &solution.constraint_match_totals {
        builder
            .next_row()
            .text_cell(total.constraint_name.as_str())
            .blank_cell()
            .text_cell(total.score.to_short_string());

        let mut matches: Vec<&ConstraintMatch> = total.matches.iter().collect();
        matches.sort_by_key(|m| m.score);
        for constraint_match in matches {
            builder.next_row();
            let flights = justified_flights(solution, constraint_match, &builder)?;
            builder
                .text_cell(format!("{}{}", MATCH_INDENT, flights.join(LIST_SEPARATOR)))
                .text_cell(constraint_match.score.to_short_string());
        }
    }

    Ok(builder.finish())
}

/// Flights of the flight assignments a match is justified by, in justification order
fn justified_flights(
    solution: &Solution,
    constraint_match: &ConstraintMatch,
    builder: &SheetBuilder,
) -> Result<Vec<String>, SheetError> {
    let mut flights = Vec::new();
    for justification in &constraint_match.justifications {
        let Justification::FlightAssignment(id) = justification else {
            continue;
        };
        let flight = solution
            .flight_assignment(*id)
            .and_then(|assignment| solution.flight(assignment.flight))
            .ok_or_else(|| SheetError::Reference {
                position: builder.next_position(),
                owner: "constraint match".to_string(),
                field: "justification",
                key: id.to_string(),
                registry: "flight assignments",
                sheet: FLIGHTS.name,
                known: solution
                    .flight_assignments
                    .iter()
                    .map(|a| a.id.to_string())
                    .collect(),
            })?;
        flights.push(flight.to_string());
    }
    Ok(flights)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Cell;
    use crate::model::tests::sample_solution;
    use crate::model::{
        ConstraintMatchTotal, EmployeeId, FlightAssignmentId, HardSoftScore,
    };

    fn column(sheet: &Sheet, column: usize) -> Vec<String> {
        sheet
            .rows
            .iter()
            .map(|r| r.get(column).map(Cell::display_text).unwrap_or_default())
            .collect()
    }

    #[test]
    fn test_unsolved_solution_gets_placeholder() {
        let sheet = write_score_view(&sample_solution()).unwrap();
        assert_eq!(sheet.rows[0], vec![Cell::text("Score"), Cell::text(NOT_YET_SOLVED)]);
        assert!(sheet.rows[1].is_empty());
        assert_eq!(
            sheet.rows[2],
            vec![
                Cell::text("Constraint match"),
                Cell::text("Match score"),
                Cell::text("Total score")
            ]
        );
        assert_eq!(sheet.rows.len(), 3);
    }

    #[test]
    fn test_matches_sorted_ascending_by_score() {
        let mut solution = sample_solution();
        solution.score = Some(HardSoftScore::of(-1, -3));
        solution.constraint_match_totals = vec![ConstraintMatchTotal::from_matches(
            "Required skill",
            vec![
                ConstraintMatch {
                    score: HardSoftScore::of_soft(-3),
                    justifications: vec![
                        Justification::Employee(EmployeeId(0)),
                        Justification::FlightAssignment(FlightAssignmentId(1)),
                    ],
                },
                ConstraintMatch {
                    score: HardSoftScore::of_hard(-1),
                    justifications: vec![
                        Justification::FlightAssignment(FlightAssignmentId(0)),
                        Justification::Other("note".to_string()),
                        Justification::FlightAssignment(FlightAssignmentId(1)),
                    ],
                },
            ],
        )];

        let sheet = write_score_view(&solution).unwrap();
        assert_eq!(
            column(&sheet, 0),
            vec![
                "Score",
                "",
                "Constraint match",
                "Required skill",
                "    FL1@2024-01-01, FL1@2024-01-01",
                "    FL1@2024-01-01",
            ]
        );
        assert_eq!(
            column(&sheet, 1),
            vec!["-1hard/-3soft", "", "Match score", "", "-1hard", "-3soft"]
        );
        assert_eq!(sheet.cell(3, 2), &Cell::text("-1hard/-3soft"));
    }

    #[test]
    fn test_dangling_justification_fails() {
        let mut solution = sample_solution();
        solution.score = Some(HardSoftScore::ZERO);
        solution.constraint_match_totals = vec![ConstraintMatchTotal::from_matches(
            "Flight conflict",
            vec![ConstraintMatch {
                score: HardSoftScore::of_hard(-1),
                justifications: vec![Justification::FlightAssignment(FlightAssignmentId(42))],
            }],
        )];
        let err = write_score_view(&solution).unwrap_err();
        assert!(matches!(err, SheetError::Reference { ref key, .. } if key == "#42"));
    }
}
