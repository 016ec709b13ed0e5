//! Time events: single timing observations reported from timing points.

use crate::changelog::ChangelogEntry;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Whether the event was accepted into a ranking. Events that fail
/// validation or downstream propagation are kept with `Error` so they can
/// be corrected or deleted later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeEventStatus {
    #[default]
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "Error")]
    Error,
}

/// One timing observation. Append-only; corrections go through deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeEvent {
    pub id: Uuid,
    pub event_id: Uuid,
    #[serde(default)]
    pub race_id: Option<Uuid>,
    /// display name of the race, e.g. `G16-SA2`
    #[serde(default)]
    pub race: Option<String>,
    #[serde(default)]
    pub bib: Option<u32>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub club: Option<String>,
    pub timing_point: String,
    pub registration_time: NaiveDateTime,
    /// 1-based rank at the timing point, maintained by the processor
    #[serde(default)]
    pub rank: Option<u32>,
    #[serde(default)]
    pub next_race: Option<String>,
    #[serde(default)]
    pub next_race_id: Option<Uuid>,
    #[serde(default)]
    pub next_race_position: Option<u32>,
    #[serde(default)]
    pub status: TimeEventStatus,
    #[serde(default)]
    pub changelog: Vec<ChangelogEntry>,
}
