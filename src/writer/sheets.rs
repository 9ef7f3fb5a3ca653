use std::collections::BTreeMap;
use tracing::debug;

use super::builder::SheetBuilder;
use super::report::write_score_view;
use crate::document::{Sheet, Workbook};
use crate::error::SheetError;
use crate::model::*;
use crate::parser::{format_date_time, Registry};
use crate::schema::*;
use crate::ui::Ui;

const SHEET_COUNT: u64 = 7;

/// Projects a [`Solution`] onto the sheets the reader expects.
///
/// References are followed by id; natural keys are only ever written,
/// never looked up.
pub struct SolutionWriter<'s, 'u, U: Ui> {
    solution: &'s Solution,
    ui: &'u mut U,
}

impl<'s, 'u, U: Ui> SolutionWriter<'s, 'u, U> {
    pub fn new(solution: &'s Solution, ui: &'u mut U) -> Self {
        Self { solution, ui }
    }

    pub fn write(mut self) -> Result<Workbook, SheetError> {
        let steps: [(&SheetSchema, fn(&Self) -> Result<Sheet, SheetError>); 7] = [
            (&CONFIGURATION, Self::write_configuration),
            (&SKILLS, Self::write_skills),
            (&AIRPORTS, Self::write_airports),
            (&TAXI_TIME, Self::write_taxi_times),
            (&EMPLOYEES, Self::write_employees),
            (&FLIGHTS, Self::write_flights),
            (&SCORE_VIEW, Self::write_report),
        ];

        let mut workbook = Workbook::new();
        for (i, (schema, write_sheet)) in steps.into_iter().enumerate() {
            self.ui.set_progress(i as u64 + 1, SHEET_COUNT, schema.name);
            let sheet = write_sheet(&self)?;
            debug!(sheet = schema.name, rows = sheet.rows.len(), "Wrote sheet");
            workbook.sheets.push(sheet);
        }
        Ok(workbook)
    }

    fn write_configuration(&self) -> Result<Sheet, SheetError> {
        let mut builder = SheetBuilder::new(CONFIGURATION.name);
        builder.header_row(&CONFIGURATION);
        builder
            .next_row()
            .text_cell(NIGHTS_AWAY_FROM_BASE_FAIRNESS)
            .number_cell(self.solution.parametrization.nights_away_from_base_fairness as f64)
            .text_cell(NIGHTS_AWAY_FROM_BASE_FAIRNESS_DESCRIPTION);
        builder
            .next_row()
            .text_cell(REQUIRED_SKILL)
            .text_cell(NOT_APPLICABLE)
            .text_cell(REQUIRED_SKILL_DESCRIPTION);
        Ok(builder.finish())
    }

    fn write_skills(&self) -> Result<Sheet, SheetError> {
        let mut builder = SheetBuilder::new(SKILLS.name);
        builder.header_row(&SKILLS);
        let mut names = Registry::new("skills", SKILLS.name);
        for skill in &self.solution.skills {
            builder.next_row();
            unique_key(&builder, &mut names, &skill.name, skill.id, "skill")?;
            checked_text_cell(&mut builder, &skill.name, TextRule::ListItem)?;
        }
        Ok(builder.finish())
    }

    fn write_airports(&self) -> Result<Sheet, SheetError> {
        let mut builder = SheetBuilder::new(AIRPORTS.name);
        builder.header_row(&AIRPORTS);
        let mut codes = Registry::new("airports", AIRPORTS.name);
        for airport in &self.solution.airports {
            builder.next_row();
            unique_key(&builder, &mut codes, &airport.code, airport.id, "airport code")?;
            checked_text_cell(&mut builder, &airport.code, TextRule::Required)?;
            checked_text_cell(&mut builder, &airport.name, TextRule::Required)?;
            checked_number_cell(&mut builder, airport.latitude)?;
            checked_number_cell(&mut builder, airport.longitude)?;
        }
        Ok(builder.finish())
    }

    fn write_taxi_times(&self) -> Result<Sheet, SheetError> {
        let airports = &self.solution.airports;
        let mut builder = SheetBuilder::new(TAXI_TIME.name);
        builder
            .preamble_row(&TAXI_TIME)
            .merge_last_cell(TAXI_TIME_TITLE_SPAN);
        builder.header_row(&TAXI_TIME);
        for airport in airports {
            builder.text_cell(airport.code.as_str());
        }
        for from in airports {
            builder.next_row().text_cell(from.code.as_str());
            for to in airports {
                match from.taxi_time_to(to.id) {
                    Some(minutes) => builder.number_cell(minutes as f64),
                    None => builder.blank_cell(),
                };
            }
        }
        Ok(builder.finish())
    }

    fn write_employees(&self) -> Result<Sheet, SheetError> {
        let mut builder = SheetBuilder::new(EMPLOYEES.name);
        builder.preamble_row(&EMPLOYEES).header_row(&EMPLOYEES);
        for employee in &self.solution.employees {
            let owner = format!("employee ({})", employee.name);
            builder.next_row();
            checked_text_cell(&mut builder, &employee.name, TextRule::EmployeeName)?;

            let home_airport = self.airport(&builder, employee.home_airport, &owner, "homeAirport")?;
            builder.text_cell(home_airport.code.as_str());

            let mut skill_names = Vec::with_capacity(employee.skill_set.len());
            for skill in &employee.skill_set {
                skill_names.push(self.skill(&builder, *skill, &owner, "skill")?.name.as_str());
            }
            list_cell(&mut builder, &skill_names);
        }
        Ok(builder.finish())
    }

    fn write_flights(&self) -> Result<Sheet, SheetError> {
        let mut assignments_by_flight: BTreeMap<FlightId, Vec<&FlightAssignment>> = BTreeMap::new();
        for assignment in &self.solution.flight_assignments {
            assignments_by_flight
                .entry(assignment.flight)
                .or_default()
                .push(assignment);
        }

        let mut builder = SheetBuilder::new(FLIGHTS.name);
        builder.header_row(&FLIGHTS);
        for flight in &self.solution.flights {
            let owner = format!("flight ({})", flight.flight_number);
            builder.next_row();
            checked_text_cell(&mut builder, &flight.flight_number, TextRule::Required)?;

            let departure = self.airport(&builder, flight.departure_airport, &owner, "departureAirport")?;
            builder
                .text_cell(departure.code.as_str())
                .text_cell(format_date_time(&flight.departure_utc_date_time));

            let arrival = self.airport(&builder, flight.arrival_airport, &owner, "arrivalAirport")?;
            builder
                .text_cell(arrival.code.as_str())
                .text_cell(format_date_time(&flight.arrival_utc_date_time));

            let mut assignments = assignments_by_flight.remove(&flight.id).unwrap_or_default();
            assignments.sort_by_key(|a| a.index_in_flight);
            let mut skill_names = Vec::with_capacity(assignments.len());
            for (expected, assignment) in assignments.into_iter().enumerate() {
                if assignment.index_in_flight != expected {
                    return Err(SheetError::Format {
                        position: builder.next_position(),
                        value: assignment.index_in_flight.to_string(),
                        message: format!(
                            "is the index in flight of the flight assignment ({}), expected {}",
                            assignment.id, expected
                        ),
                    });
                }
                skill_names.push(
                    self.skill(&builder, assignment.required_skill, &owner, "requiredSkill")?
                        .name
                        .as_str(),
                );
            }
            list_cell(&mut builder, &skill_names);
        }

        // Whatever is left points at a flight that is not in the solution
        if let Some(assignment) = assignments_by_flight.into_values().flatten().next() {
            return Err(SheetError::Reference {
                position: builder.next_position(),
                owner: format!("flight assignment ({})", assignment.id),
                field: "flight",
                key: assignment.flight.to_string(),
                registry: "flights",
                sheet: FLIGHTS.name,
                known: self
                    .solution
                    .flights
                    .iter()
                    .map(|f| f.flight_number.clone())
                    .collect(),
            });
        }
        Ok(builder.finish())
    }

    fn write_report(&self) -> Result<Sheet, SheetError> {
        write_score_view(self.solution)
    }

    fn airport(
        &self,
        builder: &SheetBuilder,
        id: AirportId,
        owner: &str,
        field: &'static str,
    ) -> Result<&'s Airport, SheetError> {
        self.solution.airport(id).ok_or_else(|| SheetError::Reference {
            position: builder.next_position(),
            owner: owner.to_string(),
            field,
            key: id.to_string(),
            registry: "airports",
            sheet: AIRPORTS.name,
            known: self.solution.airports.iter().map(|a| a.code.clone()).collect(),
        })
    }

    fn skill(
        &self,
        builder: &SheetBuilder,
        id: SkillId,
        owner: &str,
        field: &'static str,
    ) -> Result<&'s Skill, SheetError> {
        self.solution.skill(id).ok_or_else(|| SheetError::Reference {
            position: builder.next_position(),
            owner: owner.to_string(),
            field,
            key: id.to_string(),
            registry: "skills",
            sheet: SKILLS.name,
            known: self.solution.skills.iter().map(|s| s.name.clone()).collect(),
        })
    }
}

/// Write text that must read back as the same value
fn checked_text_cell(builder: &mut SheetBuilder, value: &str, rule: TextRule) -> Result<(), SheetError> {
    if let Some(message) = rule.violation(value) {
        return Err(SheetError::Format {
            position: builder.next_position(),
            value: value.to_string(),
            message,
        });
    }
    builder.text_cell(value);
    Ok(())
}

fn checked_number_cell(builder: &mut SheetBuilder, value: f64) -> Result<(), SheetError> {
    if !value.is_finite() {
        return Err(SheetError::Format {
            position: builder.next_position(),
            value: value.to_string(),
            message: "must be a finite number".to_string(),
        });
    }
    builder.number_cell(value);
    Ok(())
}

/// A natural key written twice would resolve to the first entity on read
fn unique_key<I: Copy + std::fmt::Display>(
    builder: &SheetBuilder,
    registry: &mut Registry<I>,
    key: &str,
    id: I,
    what: &str,
) -> Result<(), SheetError> {
    registry.register(key, id).map_err(|first| SheetError::Format {
        position: builder.next_position(),
        value: key.to_string(),
        message: format!("is a duplicate of the {} {}", what, first),
    })
}

/// Join natural keys into one cell; an empty list leaves the cell blank
fn list_cell(builder: &mut SheetBuilder, names: &[&str]) {
    if names.is_empty() {
        builder.blank_cell();
    } else {
        builder.text_cell(names.join(LIST_SEPARATOR));
    }
}
