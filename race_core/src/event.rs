//! Records served by the external events service.
//!
//! These are fetched on demand by the generation commands and never stored
//! locally. The events service owns bib assignment and the seeded roster
//! order; this service only consumes them.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A configured event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    pub date_of_event: NaiveDate,
    pub time_of_event: NaiveTime,
    /// name of the competition format, resolved against the format service
    pub competition_format: String,
}

impl Event {
    /// Start of the first race block of the event.
    pub fn first_start(&self) -> NaiveDateTime {
        self.date_of_event.and_time(self.time_of_event)
    }
}

/// A race class groups one or more age classes into a common start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Raceclass {
    pub name: String,
    pub ageclasses: Vec<String>,
    pub event_id: Uuid,
    /// classes of the same group share one block of the schedule
    pub group: u32,
    /// position of the class within its group
    pub order: u32,
    pub no_of_contestants: u32,
    /// ranked classes run the progression bracket, non-ranked a single race
    pub ranking: bool,
}

/// A contestant as registered with the events service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contestant {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub club: String,
    pub ageclass: String,
    /// assigned by the events service before startlists can be generated
    pub bib: Option<u32>,
    #[serde(default)]
    pub seeding_points: Option<u32>,
}

impl Contestant {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
