//! Integration tests that map workbooks to solutions and back.
//!
//! These tests:
//! 1. Build small workbooks in memory and check what the reader makes of them
//! 2. Write solutions to xlsx files in a temporary directory and read them back
//! 3. Generate random solutions from a fixed seed for the round-trip property

use chrono::{Duration, NaiveDate, NaiveDateTime};
use indexmap::IndexSet;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;

use flight_crew_xlsx::document::{xlsx, Cell, Sheet, Workbook};
use flight_crew_xlsx::model::*;
use flight_crew_xlsx::parser::{read_workbook, read_with_ui, AssignmentExpander};
use flight_crew_xlsx::schema::*;
use flight_crew_xlsx::ui::{Phase, RecordingUi};
use flight_crew_xlsx::writer::write_workbook;
use flight_crew_xlsx::{read, write, Error, SheetError};

// =============================================================================
// Test Configuration
// =============================================================================

/// Number of random solutions per round-trip test
const SAMPLE_SIZE: usize = 5;

/// Random seed for reproducible generation
const RANDOM_SEED: u64 = 42;

// =============================================================================
// Workbook Fixtures
// =============================================================================

fn t(text: &str) -> Cell {
    Cell::text(text)
}

fn n(value: f64) -> Cell {
    Cell::Number(value)
}

fn header(schema: &SheetSchema) -> Vec<Cell> {
    schema.headers().map(Cell::text).collect()
}

fn sheet(name: &str, rows: Vec<Vec<Cell>>) -> Sheet {
    let mut sheet = Sheet::new(name);
    sheet.rows = rows;
    sheet
}

/// The six readable sheets, filled in with the given data rows
struct Fixture {
    skills: Vec<Vec<Cell>>,
    airports: Vec<Vec<Cell>>,
    taxi_times: Vec<Vec<Cell>>,
    employees: Vec<Vec<Cell>>,
    flights: Vec<Vec<Cell>>,
}

impl Fixture {
    /// Skills = [Pilot, FlightAttendant], Airports = [LHR, JFK], one employee, one flight
    fn scenario() -> Self {
        Self {
            skills: vec![vec![t("Pilot")], vec![t("FlightAttendant")]],
            airports: vec![
                vec![t("LHR"), t("London Heathrow"), n(51.4775), n(-0.461389)],
                vec![t("JFK"), t("New York John F. Kennedy"), n(40.639722), n(-73.778889)],
            ],
            taxi_times: vec![
                vec![t("LHR"), n(0.0), Cell::Blank],
                vec![t("JFK"), Cell::Blank, Cell::Blank],
            ],
            employees: vec![vec![t("Ann"), t("LHR"), t("Pilot, FlightAttendant")]],
            flights: vec![vec![
                t("FL1"),
                t("LHR"),
                t("2024-01-01T08:00"),
                t("JFK"),
                t("2024-01-01T16:00"),
                t("Pilot, FlightAttendant"),
            ]],
        }
    }

    fn workbook(self) -> Workbook {
        let codes: Vec<Cell> = self.airports.iter().map(|row| row[0].clone()).collect();

        let mut configuration = vec![header(&CONFIGURATION)];
        configuration.push(vec![
            t(NIGHTS_AWAY_FROM_BASE_FAIRNESS),
            n(3.0),
            t(NIGHTS_AWAY_FROM_BASE_FAIRNESS_DESCRIPTION),
        ]);
        configuration.push(vec![
            t(REQUIRED_SKILL),
            t(NOT_APPLICABLE),
            t(REQUIRED_SKILL_DESCRIPTION),
        ]);

        let mut taxi_header = header(&TAXI_TIME);
        taxi_header.extend(codes);

        let with_header = |schema: &SheetSchema, rows: Vec<Vec<Cell>>| {
            let mut all = vec![header(schema)];
            all.extend(rows);
            all
        };

        let mut taxi_time = vec![vec![t(TAXI_TIME_TITLE)], taxi_header];
        taxi_time.extend(self.taxi_times);

        let mut employees = vec![vec![t(""), t(""), t("")], header(&EMPLOYEES)];
        employees.extend(self.employees);

        Workbook {
            sheets: vec![
                sheet(CONFIGURATION.name, configuration),
                sheet(SKILLS.name, with_header(&SKILLS, self.skills)),
                sheet(AIRPORTS.name, with_header(&AIRPORTS, self.airports)),
                sheet(TAXI_TIME.name, taxi_time),
                sheet(EMPLOYEES.name, employees),
                sheet(FLIGHTS.name, with_header(&FLIGHTS, self.flights)),
            ],
        }
    }
}

fn read_fixture(fixture: Fixture) -> Result<Solution, SheetError> {
    read_workbook(&fixture.workbook())
}

// =============================================================================
// Concrete Scenario
// =============================================================================

#[test]
fn test_concrete_scenario() {
    let solution = read_fixture(Fixture::scenario()).unwrap();

    assert_eq!(solution.parametrization.nights_away_from_base_fairness, 3);
    assert_eq!(solution.skills.len(), 2);
    assert_eq!(solution.flights.len(), 1);

    let pilot = SkillId(0);
    let flight_attendant = SkillId(1);
    assert_eq!(solution.skills[0].name, "Pilot");
    assert_eq!(solution.skills[1].name, "FlightAttendant");

    let assignments = &solution.flight_assignments;
    assert_eq!(assignments.len(), 2);
    assert_eq!(
        (assignments[0].index_in_flight, assignments[0].required_skill),
        (0, pilot)
    );
    assert_eq!(
        (assignments[1].index_in_flight, assignments[1].required_skill),
        (1, flight_attendant)
    );
    assert!(assignments.iter().all(|a| a.flight == FlightId(0)));
    assert!(assignments.iter().all(|a| a.employee.is_none()));

    let ann = &solution.employees[0];
    assert_eq!(ann.name, "Ann");
    assert_eq!(ann.home_airport, AirportId(0));
    assert_eq!(
        ann.skill_set.iter().copied().collect::<Vec<_>>(),
        vec![pilot, flight_attendant]
    );

    assert!(ann.has_skill(pilot) && ann.has_skill(flight_attendant));

    let lhr = &solution.airports[0];
    let jfk = &solution.airports[1];
    assert_eq!(lhr.taxi_time_to(jfk.id), None);
    assert_eq!(lhr.taxi_time_to(lhr.id), Some(0));
    assert!(jfk.taxi_time_in_minutes.is_empty());

    let flight = &solution.flights[0];
    assert_eq!(flight.departure_airport, lhr.id);
    assert_eq!(flight.arrival_airport, jfk.id);
    assert_eq!(
        flight.departure_utc_date_time,
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    );

    assert_eq!(solution.validate(), Ok(()));
}

#[test]
fn test_assignment_count_matches_skill_tokens() {
    let mut fixture = Fixture::scenario();
    fixture.flights.push(vec![
        t("FL2"),
        t("JFK"),
        t("2024-01-02T08:00"),
        t("LHR"),
        t("2024-01-02T16:00"),
        Cell::Blank,
    ]);
    fixture.flights.push(vec![
        t("FL3"),
        t("LHR"),
        t("2024-01-03T08:00"),
        t("JFK"),
        t("2024-01-03T16:00"),
        t("Pilot, Pilot, FlightAttendant"),
    ]);
    let solution = read_fixture(fixture).unwrap();

    assert_eq!(solution.flight_assignments.len(), 5);
    assert!(solution.assignments_of(FlightId(1)).is_empty());
    let third: Vec<_> = solution
        .assignments_of(FlightId(2))
        .iter()
        .map(|a| (a.index_in_flight, a.required_skill))
        .collect();
    assert_eq!(third, vec![(0, SkillId(0)), (1, SkillId(0)), (2, SkillId(1))]);
    for (i, assignment) in solution.flight_assignments.iter().enumerate() {
        assert_eq!(assignment.id, FlightAssignmentId(i));
    }
}

#[test]
fn test_duplicate_employee_skill_collapses() {
    let mut fixture = Fixture::scenario();
    fixture.employees[0][2] = t("FlightAttendant, Pilot, FlightAttendant");
    let solution = read_fixture(fixture).unwrap();
    assert_eq!(
        solution.employees[0].skill_set.iter().copied().collect::<Vec<_>>(),
        vec![SkillId(1), SkillId(0)]
    );
}

#[test]
fn test_empty_rows_between_data_are_skipped() {
    let mut fixture = Fixture::scenario();
    fixture.skills.insert(1, vec![]);
    fixture.skills.insert(1, vec![Cell::Blank, t("")]);
    let solution = read_fixture(fixture).unwrap();
    assert_eq!(solution.skills.len(), 2);
}

// =============================================================================
// Error Cases
// =============================================================================

#[test]
fn test_missing_home_airport_names_the_code() {
    let mut fixture = Fixture::scenario();
    fixture.employees[0][1] = t("CDG");
    let err = read_fixture(fixture).unwrap_err();

    assert!(err.to_string().contains("(CDG)"), "{err}");
    match err {
        SheetError::Reference {
            position,
            key,
            known,
            ..
        } => {
            assert_eq!(key, "CDG");
            assert_eq!(known, vec!["LHR", "JFK"]);
            assert_eq!(position.sheet, "Employees");
            assert_eq!(position.cell_reference(), "B3");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_invalid_name_is_rejected_before_the_rest_of_the_row() {
    let mut fixture = Fixture::scenario();
    fixture.employees[0] = vec![t("Ann; DROP"), t("CDG"), t("Astronaut")];
    let err = read_fixture(fixture).unwrap_err();
    match err {
        SheetError::Format {
            position, value, ..
        } => {
            assert_eq!(value, "Ann; DROP");
            assert_eq!(position.cell_reference(), "A3");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_unknown_required_skill() {
    let mut fixture = Fixture::scenario();
    fixture.flights[0][5] = t("Pilot, Navigator");
    let err = read_fixture(fixture).unwrap_err();
    assert!(
        matches!(err, SheetError::Reference { ref key, field: "requiredSkill", .. } if key == "Navigator"),
        "{err}"
    );
}

#[test]
fn test_unknown_employee_skill() {
    let mut fixture = Fixture::scenario();
    fixture.employees[0][2] = t("Pilot, Navigator");
    match read_fixture(fixture).unwrap_err() {
        SheetError::Reference {
            position,
            field,
            key,
            known,
            ..
        } => {
            assert_eq!(field, "skill");
            assert_eq!(key, "Navigator");
            assert_eq!(known, vec!["Pilot", "FlightAttendant"]);
            assert_eq!(position.to_string(), "Sheet (Employees) cell C3");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_unknown_departure_airport() {
    let mut fixture = Fixture::scenario();
    fixture.flights[0][1] = t("CDG");
    match read_fixture(fixture).unwrap_err() {
        SheetError::Reference {
            position,
            field,
            key,
            ..
        } => {
            assert_eq!(field, "departureAirport");
            assert_eq!(key, "CDG");
            assert_eq!(position.to_string(), "Sheet (Flights) cell B2");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_unknown_arrival_airport() {
    let mut fixture = Fixture::scenario();
    fixture.flights[0][3] = t("CDG");
    match read_fixture(fixture).unwrap_err() {
        SheetError::Reference {
            position,
            field,
            key,
            ..
        } => {
            assert_eq!(field, "arrivalAirport");
            assert_eq!(key, "CDG");
            assert_eq!(position.to_string(), "Sheet (Flights) cell D2");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_skill_name_with_list_separator() {
    let mut fixture = Fixture::scenario();
    fixture.skills[1] = vec![t("Flight, Attendant")];
    let err = read_fixture(fixture).unwrap_err();
    assert!(
        matches!(err, SheetError::Format { ref position, .. } if position.cell_reference() == "A3"),
        "{err}"
    );
}

#[test]
fn test_header_mismatch() {
    let mut workbook = Fixture::scenario().workbook();
    workbook.sheet_mut("Skills").unwrap().rows[0] = vec![t("Skill")];
    let err = read_workbook(&workbook).unwrap_err();
    match err {
        SheetError::SchemaViolation {
            position,
            expected,
            found,
        } => {
            assert_eq!(expected, "Name");
            assert_eq!(found, "Skill");
            assert_eq!(position.to_string(), "Sheet (Skills) cell A1");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_missing_sheet() {
    let mut workbook = Fixture::scenario().workbook();
    workbook.sheets.retain(|s| s.name != "Flights");
    let err = read_workbook(&workbook).unwrap_err();
    assert!(matches!(err, SheetError::SchemaViolation { .. }), "{err}");
}

#[test]
fn test_bad_date_time() {
    let mut fixture = Fixture::scenario();
    fixture.flights[0][2] = t("2024-01-01 08:00");
    let err = read_fixture(fixture).unwrap_err();
    match err {
        SheetError::Format {
            position, value, ..
        } => {
            assert_eq!(value, "2024-01-01 08:00");
            assert_eq!(position.to_string(), "Sheet (Flights) cell C2");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_fractional_taxi_time() {
    let mut fixture = Fixture::scenario();
    fixture.taxi_times[0][2] = n(12.5);
    let err = read_fixture(fixture).unwrap_err();
    assert!(matches!(err, SheetError::Format { .. }), "{err}");
}

#[test]
fn test_taxi_time_row_out_of_order() {
    let mut fixture = Fixture::scenario();
    fixture.taxi_times.swap(0, 1);
    let err = read_fixture(fixture).unwrap_err();
    assert!(matches!(err, SheetError::SchemaViolation { .. }), "{err}");
}

#[test]
fn test_duplicate_airport_code() {
    let mut fixture = Fixture::scenario();
    fixture.airports[1][0] = t("LHR");
    let err = read_fixture(fixture).unwrap_err();
    assert!(matches!(err, SheetError::Format { .. }), "{err}");
}

#[test]
fn test_required_skill_weight_must_be_not_applicable() {
    let mut workbook = Fixture::scenario().workbook();
    workbook.sheet_mut("Configuration").unwrap().rows[2][1] = n(1.0);
    let err = read_workbook(&workbook).unwrap_err();
    assert!(matches!(err, SheetError::Format { .. }), "{err}");
}

#[test]
fn test_missing_file_is_a_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.xlsx");
    let err = read(&path).unwrap_err();
    assert!(matches!(err, Error::Read { .. }));
    assert!(matches!(err.cause(), SheetError::Transport(_)));
    assert!(err.to_string().contains("missing.xlsx"));
}

// =============================================================================
// XLSX Round Trip
// =============================================================================

#[test]
fn test_scenario_round_trips_through_xlsx() {
    let solution = read_fixture(Fixture::scenario()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scenario.xlsx");

    write(&solution, &path).unwrap();
    let reread = read(&path).unwrap();
    assert_eq!(reread, solution);

    let workbook = xlsx::load(&path).unwrap();
    assert_eq!(
        workbook.sheet_names(),
        vec![
            "Configuration",
            "Skills",
            "Airports",
            "Taxi time",
            "Employees",
            "Flights",
            "Score view"
        ]
    );
    let score_view = workbook.sheet("Score view").unwrap();
    assert_eq!(score_view.cell(0, 1), &t(NOT_YET_SOLVED));
    let taxi_time = workbook.sheet("Taxi time").unwrap();
    assert_eq!(taxi_time.cell(2, 1), &n(0.0));
    assert_eq!(taxi_time.cell(2, 2), &Cell::Blank);
}

#[test]
fn test_solved_solution_keeps_read_fields() {
    let mut solution = read_fixture(Fixture::scenario()).unwrap();
    let unsolved = solution.clone();
    solution.flight_assignments[0].employee = Some(EmployeeId(0));
    solution.score = Some(HardSoftScore::of(-1, -2));
    solution.constraint_match_totals = vec![ConstraintMatchTotal::from_matches(
        REQUIRED_SKILL,
        vec![ConstraintMatch {
            score: HardSoftScore::of_hard(-1),
            justifications: vec![Justification::FlightAssignment(FlightAssignmentId(1))],
        }],
    )];

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("solved.xlsx");
    write(&solution, &path).unwrap();

    // Assignments and score are written, never read back
    assert_eq!(read(&path).unwrap(), unsolved);

    let workbook = xlsx::load(&path).unwrap();
    let score_view = workbook.sheet("Score view").unwrap();
    assert_eq!(score_view.cell(0, 1), &t("-1hard/-2soft"));
    assert_eq!(score_view.cell(3, 0), &t(REQUIRED_SKILL));
    assert_eq!(score_view.cell(4, 0), &t("    FL1@2024-01-01"));
    assert_eq!(score_view.cell(4, 1), &t("-1hard"));
}

#[test]
fn test_read_reports_progress() {
    let solution = read_fixture(Fixture::scenario()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("progress.xlsx");
    write(&solution, &path).unwrap();

    let mut ui = RecordingUi::default();
    read_with_ui(&path, &mut ui).unwrap();
    assert_eq!(ui.phases, vec![Phase::Loading, Phase::Reading, Phase::Complete]);
    assert_eq!(ui.progress.len(), 6);
    assert_eq!(ui.progress[5].label, "Flights");
    assert_eq!(ui.progress[5].ratio(), 1.0);
}

// =============================================================================
// Random Solutions
// =============================================================================

fn random_solution(rng: &mut StdRng) -> Solution {
    let skills: Vec<Skill> = (0..rng.gen_range(1..6))
        .map(|i| Skill {
            id: SkillId(i),
            name: format!("Skill {}", i),
        })
        .collect();

    let airport_count = rng.gen_range(1..8);
    let airports: Vec<Airport> = (0..airport_count)
        .map(|i| {
            let mut taxi_time_in_minutes = BTreeMap::new();
            for to in 0..airport_count {
                if rng.gen_bool(0.3) {
                    taxi_time_in_minutes.insert(AirportId(to), rng.gen_range(0..120));
                }
            }
            Airport {
                id: AirportId(i),
                code: format!("A{:02}", i),
                name: format!("Airport number {}", i),
                latitude: rng.gen_range(-9000..9000) as f64 / 100.0,
                longitude: rng.gen_range(-18000..18000) as f64 / 100.0,
                taxi_time_in_minutes,
            }
        })
        .collect();

    let skill_ids: Vec<SkillId> = skills.iter().map(|s| s.id).collect();
    let employees: Vec<Employee> = (0..rng.gen_range(0..10))
        .map(|i| {
            let count = rng.gen_range(0..=skill_ids.len());
            let skill_set: IndexSet<SkillId> =
                skill_ids.choose_multiple(rng, count).copied().collect();
            Employee {
                id: EmployeeId(i),
                name: format!("Employee O'Brien-{}", i),
                home_airport: AirportId(rng.gen_range(0..airport_count)),
                skill_set,
            }
        })
        .collect();

    let base: NaiveDateTime = NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let mut expander = AssignmentExpander::new();
    let mut flights = Vec::new();
    let mut flight_assignments = Vec::new();
    for i in 0..rng.gen_range(0..12) {
        let id = FlightId(i);
        let departure = base + Duration::minutes(rng.gen_range(0..60 * 24 * 30));
        let arrival = departure + Duration::minutes(rng.gen_range(30..60 * 14));
        let required: Vec<SkillId> = (0..rng.gen_range(0..4))
            .map(|_| skill_ids[rng.gen_range(0..skill_ids.len())])
            .collect();
        flight_assignments.extend(expander.expand(id, &required));
        flights.push(Flight {
            id,
            flight_number: format!("FL{}", 100 + i),
            departure_airport: AirportId(rng.gen_range(0..airport_count)),
            departure_utc_date_time: departure,
            arrival_airport: AirportId(rng.gen_range(0..airport_count)),
            arrival_utc_date_time: arrival,
        });
    }

    Solution {
        parametrization: Parametrization {
            id: 0,
            nights_away_from_base_fairness: rng.gen_range(0..10),
        },
        skills,
        airports,
        employees,
        flights,
        flight_assignments,
        score: None,
        constraint_match_totals: Vec::new(),
    }
}

#[test]
fn test_solution_rejected_by_validate_is_not_written() {
    let mut solution = read_fixture(Fixture::scenario()).unwrap();
    solution.airports[0].name.clear();
    assert!(solution.validate().is_err());

    let dir = tempfile::tempdir().unwrap();
    let err = write(&solution, &dir.path().join("blank.xlsx")).unwrap_err();
    assert!(matches!(err, Error::Write { .. }));
    match err.cause() {
        SheetError::Format { position, .. } => {
            assert_eq!(position.to_string(), "Sheet (Airports) cell B2")
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_random_solutions_round_trip_in_memory() {
    let mut rng = StdRng::seed_from_u64(RANDOM_SEED);
    for _ in 0..SAMPLE_SIZE * 4 {
        let solution = random_solution(&mut rng);
        assert_eq!(solution.validate(), Ok(()));

        let workbook = write_workbook(&solution).unwrap();
        let reread = read_workbook(&workbook).unwrap();
        assert_eq!(reread, solution);
    }
}

#[test]
fn test_random_solutions_round_trip_through_xlsx() {
    let mut rng = StdRng::seed_from_u64(RANDOM_SEED + 1);
    let dir = tempfile::tempdir().unwrap();
    for i in 0..SAMPLE_SIZE {
        let solution = random_solution(&mut rng);
        let path = dir.path().join(format!("random-{}.xlsx", i));

        write(&solution, &path).unwrap();
        let reread = read(&path).unwrap();
        assert_eq!(reread, solution, "solution {} differs after round trip", i);
    }
}
