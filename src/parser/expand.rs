use crate::model::{FlightAssignment, FlightAssignmentId, FlightId, SkillId};
use crate::schema::LIST_SEPARATOR;

/// Split a multi-value cell into its tokens. A blank cell has no tokens.
pub fn split_list(cell: Option<&str>) -> Vec<&str> {
    match cell {
        Some(text) => text.split(LIST_SEPARATOR).collect(),
        None => Vec::new(),
    }
}

/// Turns the required skills of a flight into one assignment per seat.
///
/// Assignment ids keep counting across flights; indices restart at 0 for
/// every flight.
#[derive(Debug, Default)]
pub struct AssignmentExpander {
    next_id: usize,
}

impl AssignmentExpander {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id the next expanded assignment will get
    pub fn next_id(&self) -> usize {
        self.next_id
    }

    pub fn expand(&mut self, flight: FlightId, required_skills: &[SkillId]) -> Vec<FlightAssignment> {
        required_skills
            .iter()
            .enumerate()
            .map(|(index_in_flight, skill)| {
                let id = FlightAssignmentId(self.next_id);
                self.next_id += 1;
                FlightAssignment {
                    id,
                    flight,
                    index_in_flight,
                    required_skill: *skill,
                    employee: None,
                }
            })
            .collect()
    }
}
