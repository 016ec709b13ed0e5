//! The raceplan document: the complete schedule of races for one event.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One plan per event. Races are referenced by id, ordered by `Race::order`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Raceplan {
    pub id: Uuid,
    pub event_id: Uuid,
    /// sum of the first-round start entries; 0 until a startlist exists
    pub no_of_contestants: u32,
    pub races: Vec<Uuid>,
}

impl Raceplan {
    pub fn new(id: Uuid, event_id: Uuid) -> Self {
        Raceplan {
            id,
            event_id,
            no_of_contestants: 0,
            races: Vec::new(),
        }
    }
}
