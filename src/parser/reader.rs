use chrono::NaiveDateTime;
use indexmap::IndexSet;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use super::expand::{split_list, AssignmentExpander};
use super::registry::Registry;
use crate::document::{Cell, Cursor, Workbook};
use crate::error::SheetError;
use crate::model::*;
use crate::schema::*;
use crate::ui::Ui;

const SHEET_COUNT: u64 = 6;

/// Reads the sheets of one workbook, in dependency order, into a [`Solution`].
///
/// The registries live exactly as long as this reader.
pub struct SolutionReader<'a, 'u, U: Ui> {
    cursor: Cursor<'a>,
    ui: &'u mut U,
    skills: Registry<SkillId>,
    airports: Registry<AirportId>,
    solution: Solution,
}

impl<'a, 'u, U: Ui> SolutionReader<'a, 'u, U> {
    pub fn new(workbook: &'a Workbook, ui: &'u mut U) -> Self {
        Self {
            cursor: Cursor::new(workbook),
            ui,
            skills: Registry::new("skills", SKILLS.name),
            airports: Registry::new("airports", AIRPORTS.name),
            solution: Solution::default(),
        }
    }

    pub fn read(mut self) -> Result<Solution, SheetError> {
        self.progress(1, &CONFIGURATION);
        self.read_configuration()?;
        self.progress(2, &SKILLS);
        self.read_skills()?;
        self.progress(3, &AIRPORTS);
        self.read_airports()?;
        self.progress(4, &TAXI_TIME);
        self.read_taxi_times()?;
        self.progress(5, &EMPLOYEES);
        self.read_employees()?;
        self.progress(6, &FLIGHTS);
        self.read_flights_and_assignments()?;
        Ok(self.solution)
    }

    fn progress(&mut self, current: u64, schema: &SheetSchema) {
        self.ui.set_progress(current, SHEET_COUNT, schema.name);
    }

    /// Open a sheet and check its preamble and column header rows
    fn open_sheet(&mut self, schema: &SheetSchema) -> Result<(), SheetError> {
        self.cursor.open_sheet(schema.name)?;
        if !schema.preamble.is_empty() {
            self.cursor.expect_row()?;
            for label in schema.preamble {
                self.cursor.read_header_cell(label)?;
            }
        }
        self.cursor.expect_row()?;
        for header in schema.headers() {
            self.cursor.read_header_cell(header)?;
        }
        Ok(())
    }

    fn expect_data_row(&mut self, what: &str) -> Result<(), SheetError> {
        if self.cursor.advance_to_data_row() {
            return Ok(());
        }
        Err(SheetError::SchemaViolation {
            position: self.cursor.position(),
            expected: what.to_string(),
            found: "the end of the sheet".to_string(),
        })
    }

    fn read_configuration(&mut self) -> Result<(), SheetError> {
        self.open_sheet(&CONFIGURATION)?;
        let nights_away_from_base_fairness = self.read_int_constraint_line(
            NIGHTS_AWAY_FROM_BASE_FAIRNESS,
            NIGHTS_AWAY_FROM_BASE_FAIRNESS_DESCRIPTION,
        )?;
        self.read_fixed_constraint_line(REQUIRED_SKILL, REQUIRED_SKILL_DESCRIPTION)?;

        self.solution.parametrization = Parametrization {
            id: 0,
            nights_away_from_base_fairness,
        };
        debug!(nights_away_from_base_fairness, "Read configuration");
        Ok(())
    }

    fn read_int_constraint_line(
        &mut self,
        constraint: &str,
        description: &str,
    ) -> Result<i64, SheetError> {
        self.expect_data_row(constraint)?;
        self.cursor.read_header_cell(constraint)?;
        let weight = self.cursor.read_numeric_cell()?;
        let weight = integral(&self.cursor, weight)?;
        self.cursor.read_header_cell(description)?;
        Ok(weight)
    }

    fn read_fixed_constraint_line(
        &mut self,
        constraint: &str,
        description: &str,
    ) -> Result<(), SheetError> {
        self.expect_data_row(constraint)?;
        self.cursor.read_header_cell(constraint)?;
        let cell = self.cursor.next_cell();
        if !matches!(cell, Cell::Text(text) if text == NOT_APPLICABLE) {
            return Err(self.cursor.format_error(
                &cell.display_text(),
                format!("must be {} for the constraint ({})", NOT_APPLICABLE, constraint),
            ));
        }
        self.cursor.read_header_cell(description)?;
        Ok(())
    }

    fn read_skills(&mut self) -> Result<(), SheetError> {
        self.open_sheet(&SKILLS)?;
        let mut skills = Vec::new();
        while self.cursor.advance_to_data_row() {
            let id = SkillId(skills.len());
            let name = self.cursor.read_string_cell()?;
            if let Some(message) = TextRule::ListItem.violation(name) {
                return Err(self.cursor.format_error(name, message));
            }
            if let Err(existing) = self.skills.register(name, id) {
                return Err(self.cursor.format_error(
                    name,
                    format!("is a duplicate of the skill {}", existing),
                ));
            }
            skills.push(Skill {
                id,
                name: name.to_string(),
            });
        }
        debug!(count = skills.len(), "Read skills");
        self.solution.skills = skills;
        Ok(())
    }

    fn read_airports(&mut self) -> Result<(), SheetError> {
        self.open_sheet(&AIRPORTS)?;
        let mut airports = Vec::new();
        while self.cursor.advance_to_data_row() {
            let id = AirportId(airports.len());
            let code = self.cursor.read_string_cell()?;
            if let Err(existing) = self.airports.register(code, id) {
                return Err(self.cursor.format_error(
                    code,
                    format!("is a duplicate of the airport code {}", existing),
                ));
            }
            let name = self.cursor.read_string_cell()?;
            let latitude = self.cursor.read_numeric_cell()?;
            let longitude = self.cursor.read_numeric_cell()?;
            airports.push(Airport {
                id,
                code: code.to_string(),
                name: name.to_string(),
                latitude,
                longitude,
                taxi_time_in_minutes: BTreeMap::new(),
            });
        }
        debug!(count = airports.len(), "Read airports");
        self.solution.airports = airports;
        Ok(())
    }

    /// Square matrix keyed by airport codes in Airports sheet order.
    /// A blank cell leaves the pair out of the map.
    fn read_taxi_times(&mut self) -> Result<(), SheetError> {
        self.cursor.open_sheet(TAXI_TIME.name)?;
        self.expect_data_row(TAXI_TIME_TITLE)?;
        for label in TAXI_TIME.preamble {
            self.cursor.read_header_cell(label)?;
        }

        let codes: Vec<(AirportId, String)> = self
            .solution
            .airports
            .iter()
            .map(|a| (a.id, a.code.clone()))
            .collect();

        self.expect_data_row("the airport code header row")?;
        for header in TAXI_TIME.headers() {
            self.cursor.read_header_cell(header)?;
        }
        for (_, code) in &codes {
            self.cursor.read_header_cell(code)?;
        }

        let mut entries = 0usize;
        for (from, code) in &codes {
            self.expect_data_row(code)?;
            self.cursor.read_header_cell(code)?;
            let mut taxi_times = BTreeMap::new();
            for (to, _) in &codes {
                if let Some(minutes) = self.cursor.read_optional_numeric_cell()? {
                    taxi_times.insert(*to, integral(&self.cursor, minutes)?);
                }
            }
            entries += taxi_times.len();
            self.solution.airports[from.index()].taxi_time_in_minutes = taxi_times;
        }
        debug!(entries, "Read taxi times");
        Ok(())
    }

    fn read_employees(&mut self) -> Result<(), SheetError> {
        self.open_sheet(&EMPLOYEES)?;
        let mut employees = Vec::new();
        while self.cursor.advance_to_data_row() {
            let id = EmployeeId(employees.len());
            let name = self.cursor.read_string_cell()?;
            if let Some(message) = TextRule::EmployeeName.violation(name) {
                return Err(self.cursor.format_error(name, message));
            }
            let owner = format!("employee ({})", name);

            let home_airport_code = self.cursor.read_string_cell()?;
            let home_airport = self.airports.get(home_airport_code).ok_or_else(|| {
                self.airports.reference_error(
                    self.cursor.position(),
                    owner.clone(),
                    "homeAirport",
                    home_airport_code,
                )
            })?;

            let skill_names = split_list(self.cursor.read_optional_string_cell()?);
            let mut skill_set = IndexSet::with_capacity(skill_names.len());
            for skill_name in skill_names {
                let skill = self.skills.get(skill_name).ok_or_else(|| {
                    self.skills.reference_error(
                        self.cursor.position(),
                        owner.clone(),
                        "skill",
                        skill_name,
                    )
                })?;
                if !skill_set.insert(skill) {
                    warn!(
                        employee = name,
                        skill = skill_name,
                        position = %self.cursor.position(),
                        "Duplicate skill collapsed"
                    );
                }
            }

            employees.push(Employee {
                id,
                name: name.to_string(),
                home_airport,
                skill_set,
            });
        }
        debug!(count = employees.len(), "Read employees");
        self.solution.employees = employees;
        Ok(())
    }

    fn read_flights_and_assignments(&mut self) -> Result<(), SheetError> {
        self.open_sheet(&FLIGHTS)?;
        let mut flights = Vec::new();
        let mut flight_assignments = Vec::new();
        let mut expander = AssignmentExpander::new();

        while self.cursor.advance_to_data_row() {
            let id = FlightId(flights.len());
            let flight_number = self.cursor.read_string_cell()?;
            let owner = format!("flight ({})", flight_number);

            let departure_airport = self.read_airport_reference(&owner, "departureAirport")?;
            let departure_utc_date_time = self.read_date_time_cell()?;
            let arrival_airport = self.read_airport_reference(&owner, "arrivalAirport")?;
            let arrival_utc_date_time = self.read_date_time_cell()?;

            let skill_names = split_list(self.cursor.read_optional_string_cell()?);
            let mut required_skills = Vec::with_capacity(skill_names.len());
            for skill_name in skill_names {
                let skill = self.skills.get(skill_name).ok_or_else(|| {
                    self.skills.reference_error(
                        self.cursor.position(),
                        owner.clone(),
                        "requiredSkill",
                        skill_name,
                    )
                })?;
                required_skills.push(skill);
            }

            flight_assignments.extend(expander.expand(id, &required_skills));
            flights.push(Flight {
                id,
                flight_number: flight_number.to_string(),
                departure_airport,
                departure_utc_date_time,
                arrival_airport,
                arrival_utc_date_time,
            });
        }

        debug!(
            flights = flights.len(),
            flight_assignments = flight_assignments.len(),
            "Read flights"
        );
        self.solution.flights = flights;
        self.solution.flight_assignments = flight_assignments;
        Ok(())
    }

    fn read_airport_reference(
        &mut self,
        owner: &str,
        field: &'static str,
    ) -> Result<AirportId, SheetError> {
        let code = self.cursor.read_string_cell()?;
        self.airports.get(code).ok_or_else(|| {
            self.airports
                .reference_error(self.cursor.position(), owner.to_string(), field, code)
        })
    }

    fn read_date_time_cell(&mut self) -> Result<NaiveDateTime, SheetError> {
        let text = self.cursor.read_string_cell()?;
        parse_date_time(text).ok_or_else(|| {
            self.cursor.format_error(
                text,
                "is not a date time in the pattern yyyy-MM-ddTHH:mm",
            )
        })
    }
}

/// Parse text in [`DATE_TIME_FORMAT`]. Text that parses but would format
/// differently (missing zero padding, seconds) is rejected.
pub fn parse_date_time(text: &str) -> Option<NaiveDateTime> {
    let parsed = NaiveDateTime::parse_from_str(text, DATE_TIME_FORMAT).ok()?;
    (format_date_time(&parsed) == text).then_some(parsed)
}

pub fn format_date_time(date_time: &NaiveDateTime) -> String {
    date_time.format(DATE_TIME_FORMAT).to_string()
}

fn integral(cursor: &Cursor<'_>, value: f64) -> Result<i64, SheetError> {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Ok(value as i64)
    } else {
        Err(cursor.format_error(&value.to_string(), "must be an integer"))
    }
}
