//! The startlist document: the first-round roster of an event.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One startlist per event, containing exactly the first-round entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Startlist {
    pub id: Uuid,
    pub event_id: Uuid,
    pub no_of_contestants: u32,
    pub start_entries: Vec<Uuid>,
}

impl Startlist {
    pub fn new(id: Uuid, event_id: Uuid) -> Self {
        Startlist {
            id,
            event_id,
            no_of_contestants: 0,
            start_entries: Vec::new(),
        }
    }
}
