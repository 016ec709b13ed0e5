//! Start entries: one contestant's participation in one race.

use crate::changelog::ChangelogEntry;
use chrono::NaiveDateTime;
use displaydoc::Display;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status of a contestant in a race. DNS, DNF and DSQ entries keep their
/// place in the race total but are never propagated to later rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
pub enum ContestantStatus {
    /// no status recorded yet
    #[default]
    #[serde(rename = "")]
    Unset,
    /// OK
    #[serde(rename = "OK")]
    Ok,
    /// did not start
    #[serde(rename = "DNS")]
    Dns,
    /// did not finish
    #[serde(rename = "DNF")]
    Dnf,
    /// disqualified
    #[serde(rename = "DSQ")]
    Dsq,
}

impl ContestantStatus {
    /// Out of the competition: counted in the race total, excluded from
    /// ranking and progression.
    pub fn is_out(&self) -> bool {
        matches!(
            self,
            ContestantStatus::Dns | ContestantStatus::Dnf | ContestantStatus::Dsq
        )
    }
}

/// A start entry. `(race_id, bib)` is unique within a race, and starting
/// positions are dense 1..n.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartEntry {
    pub id: Uuid,
    pub race_id: Uuid,
    /// set on first-round entries created with the startlist; entries
    /// materialized by progression carry the same startlist id
    pub startlist_id: Uuid,
    pub bib: u32,
    pub name: String,
    pub club: String,
    pub starting_position: u32,
    pub scheduled_start_time: NaiveDateTime,
    #[serde(default)]
    pub actual_start_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub status: ContestantStatus,
    #[serde(default)]
    pub changelog: Vec<ChangelogEntry>,
}
