//! Race results: the authoritative ranking at one timing point of one race.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One result document per `(race_id, timing_point)` pair.
/// `ranking_sequence` holds the accepted time-event ids in rank order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceResult {
    pub id: Uuid,
    pub race_id: Uuid,
    pub timing_point: String,
    pub no_of_contestants: u32,
    pub ranking_sequence: Vec<Uuid>,
}

impl RaceResult {
    pub fn new(id: Uuid, race_id: Uuid, timing_point: impl Into<String>) -> Self {
        RaceResult {
            id,
            race_id,
            timing_point: timing_point.into(),
            no_of_contestants: 0,
            ranking_sequence: Vec::new(),
        }
    }
}
