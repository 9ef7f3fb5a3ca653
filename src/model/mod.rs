//! Planning problem object graph for flight crew scheduling.
//!
//! Entities reference each other through typed index ids. An id is always the
//! position of the entity in its list on the [`Solution`], so following a
//! reference is a bounds-checked slice lookup rather than a key search.

mod score;

pub use score::*;

use chrono::NaiveDateTime;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::error::IntegrityError;
use crate::schema::TextRule;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub usize);

        impl $name {
            pub fn index(self) -> usize {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "#{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Position of a [`Skill`] in [`Solution::skills`]
    SkillId
);
entity_id!(
    /// Position of an [`Airport`] in [`Solution::airports`]
    AirportId
);
entity_id!(
    /// Position of an [`Employee`] in [`Solution::employees`]
    EmployeeId
);
entity_id!(
    /// Position of a [`Flight`] in [`Solution::flights`]
    FlightId
);
entity_id!(
    /// Position of a [`FlightAssignment`] in [`Solution::flight_assignments`]
    FlightAssignmentId
);

/// Tunable constraint weights. There is exactly one per solution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parametrization {
    pub id: u64,
    pub nights_away_from_base_fairness: i64,
}

impl Default for Parametrization {
    fn default() -> Self {
        Self {
            id: 0,
            nights_away_from_base_fairness: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub id: SkillId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Airport {
    pub id: AirportId,
    pub code: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Sparse: a missing destination means no known taxi route,
    /// which is not the same as a taxi time of 0.
    #[serde(default)]
    pub taxi_time_in_minutes: BTreeMap<AirportId, i64>,
}

impl Airport {
    pub fn taxi_time_to(&self, other: AirportId) -> Option<i64> {
        self.taxi_time_in_minutes.get(&other).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub home_airport: AirportId,
    /// Insertion ordered, duplicates collapse
    pub skill_set: IndexSet<SkillId>,
}

impl Employee {
    pub fn has_skill(&self, skill: SkillId) -> bool {
        self.skill_set.contains(&skill)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flight {
    pub id: FlightId,
    pub flight_number: String,
    pub departure_airport: AirportId,
    #[serde(rename = "departureUTCDateTime")]
    pub departure_utc_date_time: NaiveDateTime,
    pub arrival_airport: AirportId,
    #[serde(rename = "arrivalUTCDateTime")]
    pub arrival_utc_date_time: NaiveDateTime,
}

impl fmt::Display for Flight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{}",
            self.flight_number,
            self.departure_utc_date_time.date()
        )
    }
}

/// One seat on a flight that needs an employee with `required_skill`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightAssignment {
    pub id: FlightAssignmentId,
    pub flight: FlightId,
    pub index_in_flight: usize,
    pub required_skill: SkillId,
    /// Planning variable, filled in by the solver
    #[serde(default)]
    pub employee: Option<EmployeeId>,
}

/// Aggregate root of a flight crew scheduling problem
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Solution {
    pub parametrization: Parametrization,
    pub skills: Vec<Skill>,
    pub airports: Vec<Airport>,
    pub employees: Vec<Employee>,
    pub flights: Vec<Flight>,
    pub flight_assignments: Vec<FlightAssignment>,
    #[serde(default)]
    pub score: Option<HardSoftScore>,
    #[serde(default)]
    pub constraint_match_totals: Vec<ConstraintMatchTotal>,
}

impl Solution {
    pub fn skill(&self, id: SkillId) -> Option<&Skill> {
        self.skills.get(id.0)
    }

    pub fn airport(&self, id: AirportId) -> Option<&Airport> {
        self.airports.get(id.0)
    }

    pub fn employee(&self, id: EmployeeId) -> Option<&Employee> {
        self.employees.get(id.0)
    }

    pub fn flight(&self, id: FlightId) -> Option<&Flight> {
        self.flights.get(id.0)
    }

    pub fn flight_assignment(&self, id: FlightAssignmentId) -> Option<&FlightAssignment> {
        self.flight_assignments.get(id.0)
    }

    /// Assignments of one flight, ordered by their index in the flight
    pub fn assignments_of(&self, flight: FlightId) -> Vec<&FlightAssignment> {
        let mut assignments: Vec<&FlightAssignment> = self
            .flight_assignments
            .iter()
            .filter(|a| a.flight == flight)
            .collect();
        assignments.sort_by_key(|a| a.index_in_flight);
        assignments
    }

    /// Check that ids match list positions, that every reference resolves and
    /// that assignments are laid out the way a flight row expands into them.
    pub fn validate(&self) -> Result<(), IntegrityError> {
        check_ids("skill", self.skills.iter().map(|s| s.id.0))?;
        check_ids("airport", self.airports.iter().map(|a| a.id.0))?;
        check_ids("employee", self.employees.iter().map(|e| e.id.0))?;
        check_ids("flight", self.flights.iter().map(|f| f.id.0))?;
        check_ids(
            "flight assignment",
            self.flight_assignments.iter().map(|a| a.id.0),
        )?;

        let mut skill_names = HashMap::new();
        for skill in &self.skills {
            let owner = format!("skill ({})", skill.id);
            check_text(&owner, "name", &skill.name, TextRule::ListItem)?;
            check_unique(&mut skill_names, "skill name", &skill.name, skill.id.0)?;
        }

        let mut airport_codes = HashMap::new();
        for airport in &self.airports {
            let owner = format!("airport ({})", airport.id);
            check_text(&owner, "code", &airport.code, TextRule::Required)?;
            check_text(&owner, "name", &airport.name, TextRule::Required)?;
            check_finite(&owner, "latitude", airport.latitude)?;
            check_finite(&owner, "longitude", airport.longitude)?;
            check_unique(&mut airport_codes, "airport code", &airport.code, airport.id.0)?;
        }

        for airport in &self.airports {
            for destination in airport.taxi_time_in_minutes.keys() {
                expect_resolved(
                    self.airport(*destination).is_some(),
                    format!("airport ({})", airport.code),
                    "taxiTimeInMinutes",
                    destination.0,
                    "airports",
                )?;
            }
        }

        for employee in &self.employees {
            check_text(
                &format!("employee ({})", employee.id),
                "name",
                &employee.name,
                TextRule::EmployeeName,
            )?;
            let owner = format!("employee ({})", employee.name);
            expect_resolved(
                self.airport(employee.home_airport).is_some(),
                owner.clone(),
                "homeAirport",
                employee.home_airport.0,
                "airports",
            )?;
            for skill in &employee.skill_set {
                expect_resolved(
                    self.skill(*skill).is_some(),
                    owner.clone(),
                    "skillSet",
                    skill.0,
                    "skills",
                )?;
            }
        }

        for flight in &self.flights {
            check_text(
                &format!("flight ({})", flight.id),
                "flightNumber",
                &flight.flight_number,
                TextRule::Required,
            )?;
            let owner = format!("flight ({})", flight.flight_number);
            expect_resolved(
                self.airport(flight.departure_airport).is_some(),
                owner.clone(),
                "departureAirport",
                flight.departure_airport.0,
                "airports",
            )?;
            expect_resolved(
                self.airport(flight.arrival_airport).is_some(),
                owner,
                "arrivalAirport",
                flight.arrival_airport.0,
                "airports",
            )?;
        }

        let mut previous: Option<&FlightAssignment> = None;
        for assignment in &self.flight_assignments {
            let owner = format!("flight assignment ({})", assignment.id);
            expect_resolved(
                self.flight(assignment.flight).is_some(),
                owner.clone(),
                "flight",
                assignment.flight.0,
                "flights",
            )?;
            expect_resolved(
                self.skill(assignment.required_skill).is_some(),
                owner.clone(),
                "requiredSkill",
                assignment.required_skill.0,
                "skills",
            )?;
            if let Some(employee) = assignment.employee {
                expect_resolved(
                    self.employee(employee).is_some(),
                    owner,
                    "employee",
                    employee.0,
                    "employees",
                )?;
            }

            let expected_index = match previous {
                Some(p) if p.flight == assignment.flight => p.index_in_flight + 1,
                Some(p) if p.flight > assignment.flight => {
                    return Err(IntegrityError::AssignmentOrder {
                        id: assignment.id.0,
                    })
                }
                _ => 0,
            };
            if assignment.index_in_flight != expected_index {
                return Err(IntegrityError::AssignmentOrder {
                    id: assignment.id.0,
                });
            }
            previous = Some(assignment);
        }

        Ok(())
    }
}

fn expect_resolved(
    resolved: bool,
    owner: String,
    field: &'static str,
    id: usize,
    kind: &'static str,
) -> Result<(), IntegrityError> {
    if resolved {
        Ok(())
    } else {
        Err(IntegrityError::Dangling {
            owner,
            field,
            id,
            kind,
        })
    }
}

fn check_text(
    owner: &str,
    field: &'static str,
    value: &str,
    rule: TextRule,
) -> Result<(), IntegrityError> {
    match rule.violation(value) {
        Some(message) => Err(IntegrityError::InvalidValue {
            owner: owner.to_string(),
            field,
            value: value.to_string(),
            message,
        }),
        None => Ok(()),
    }
}

fn check_finite(owner: &str, field: &'static str, value: f64) -> Result<(), IntegrityError> {
    if value.is_finite() {
        return Ok(());
    }
    Err(IntegrityError::InvalidValue {
        owner: owner.to_string(),
        field,
        value: value.to_string(),
        message: "must be a finite number".to_string(),
    })
}

fn check_unique<'s>(
    seen: &mut HashMap<&'s str, usize>,
    kind: &'static str,
    key: &'s str,
    id: usize,
) -> Result<(), IntegrityError> {
    if let Some(first) = seen.insert(key, id) {
        return Err(IntegrityError::DuplicateKey {
            kind,
            key: key.to_string(),
            first,
        });
    }
    Ok(())
}

fn check_ids(kind: &'static str, ids: impl Iterator<Item = usize>) -> Result<(), IntegrityError> {
    for (position, id) in ids.enumerate() {
        if position != id {
            return Err(IntegrityError::IdMismatch { kind, position, id });
        }
    }
    Ok(())
}
