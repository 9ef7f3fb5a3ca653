use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;

use super::{EmployeeId, FlightAssignmentId};

/// Two level score: any hard penalty outweighs every soft penalty.
///
/// Ordering compares the hard level first, so a more negative (worse) score
/// sorts before a better one.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct HardSoftScore {
    pub hard: i64,
    pub soft: i64,
}

impl HardSoftScore {
    pub const ZERO: HardSoftScore = HardSoftScore { hard: 0, soft: 0 };

    pub const fn of(hard: i64, soft: i64) -> Self {
        Self { hard, soft }
    }

    pub const fn of_hard(hard: i64) -> Self {
        Self { hard, soft: 0 }
    }

    pub const fn of_soft(soft: i64) -> Self {
        Self { hard: 0, soft }
    }

    pub fn is_feasible(&self) -> bool {
        self.hard >= 0
    }

    /// Compact form that leaves out zero levels, e.g. `-20soft` or `0`
    pub fn to_short_string(&self) -> String {
        let mut parts = Vec::with_capacity(2);
        if self.hard != 0 {
            parts.push(format!("{}hard", self.hard));
        }
        if self.soft != 0 {
            parts.push(format!("{}soft", self.soft));
        }
        if parts.is_empty() {
            "0".to_string()
        } else {
            parts.join("/")
        }
    }
}

impl fmt::Display for HardSoftScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}hard/{}soft", self.hard, self.soft)
    }
}

impl Add for HardSoftScore {
    type Output = HardSoftScore;

    fn add(self, rhs: Self) -> Self::Output {
        HardSoftScore::of(self.hard + rhs.hard, self.soft + rhs.soft)
    }
}

impl Sum for HardSoftScore {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(HardSoftScore::ZERO, Add::add)
    }
}

/// What a constraint match was raised about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum Justification {
    FlightAssignment(FlightAssignmentId),
    Employee(EmployeeId),
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintMatch {
    pub score: HardSoftScore,
    pub justifications: Vec<Justification>,
}

/// All matches of one constraint together with their summed score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintMatchTotal {
    pub constraint_name: String,
    pub score: HardSoftScore,
    pub matches: Vec<ConstraintMatch>,
}

impl ConstraintMatchTotal {
    pub fn from_matches(constraint_name: impl Into<String>, matches: Vec<ConstraintMatch>) -> Self {
        Self {
            constraint_name: constraint_name.into(),
            score: matches.iter().map(|m| m.score).sum(),
            matches,
        }
    }
}
