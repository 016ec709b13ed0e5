// database port

use crate::{Race, RaceResult, Raceplan, StartEntry, Startlist, TimeEvent};
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

/// database port trait
#[async_trait]
pub trait DatabasePort:
    DbpRaceplan + DbpRace + DbpStartlist + DbpStartEntry + DbpTimeEvent + DbpRaceResult
{
    async fn ping_db(&self) -> DbResult<()>;
}

/// database port trait for raceplans
#[async_trait]
pub trait DbpRaceplan: Send + Sync {
    async fn create_raceplan(&self, plan: &Raceplan) -> DbResult<()>;
    async fn get_raceplan(&self, id: Uuid) -> DbResult<Option<Raceplan>>;
    async fn get_raceplan_by_event(&self, event_id: Uuid) -> DbResult<Option<Raceplan>>;
    async fn list_raceplans(&self) -> DbResult<Vec<Raceplan>>;
    async fn update_raceplan(&self, plan: &Raceplan) -> DbResult<()>;
    async fn delete_raceplan(&self, id: Uuid) -> DbResult<()>;
}

/// database port trait for races
#[async_trait]
pub trait DbpRace: Send + Sync {
    async fn create_race(&self, race: &Race) -> DbResult<()>;
    async fn get_race(&self, id: Uuid) -> DbResult<Option<Race>>;
    /// all races, ordered by event and `Race::order`
    async fn list_races(&self) -> DbResult<Vec<Race>>;
    /// all races of an event, ordered by `Race::order`
    async fn list_races_by_event(&self, event_id: Uuid) -> DbResult<Vec<Race>>;
    /// all races of a raceplan, ordered by `Race::order`
    async fn list_races_by_raceplan(&self, raceplan_id: Uuid) -> DbResult<Vec<Race>>;
    async fn update_race(&self, race: &Race) -> DbResult<()>;
    async fn delete_race(&self, id: Uuid) -> DbResult<()>;
}

/// database port trait for startlists
#[async_trait]
pub trait DbpStartlist: Send + Sync {
    async fn create_startlist(&self, startlist: &Startlist) -> DbResult<()>;
    async fn get_startlist(&self, id: Uuid) -> DbResult<Option<Startlist>>;
    async fn get_startlist_by_event(&self, event_id: Uuid) -> DbResult<Option<Startlist>>;
    async fn list_startlists(&self) -> DbResult<Vec<Startlist>>;
    async fn update_startlist(&self, startlist: &Startlist) -> DbResult<()>;
    async fn delete_startlist(&self, id: Uuid) -> DbResult<()>;
}

/// database port trait for start entries
#[async_trait]
pub trait DbpStartEntry: Send + Sync {
    async fn create_start_entry(&self, entry: &StartEntry) -> DbResult<()>;
    async fn get_start_entry(&self, id: Uuid) -> DbResult<Option<StartEntry>>;
    async fn get_start_entry_by_race_and_bib(
        &self,
        race_id: Uuid,
        bib: u32,
    ) -> DbResult<Option<StartEntry>>;
    /// entries of a race, ordered by starting position
    async fn list_start_entries_by_race(&self, race_id: Uuid) -> DbResult<Vec<StartEntry>>;
    async fn list_start_entries_by_startlist(
        &self,
        startlist_id: Uuid,
    ) -> DbResult<Vec<StartEntry>>;
    async fn update_start_entry(&self, entry: &StartEntry) -> DbResult<()>;
    async fn delete_start_entry(&self, id: Uuid) -> DbResult<()>;
}

/// database port trait for time events
#[async_trait]
pub trait DbpTimeEvent: Send + Sync {
    async fn create_time_event(&self, event: &TimeEvent) -> DbResult<()>;
    async fn get_time_event(&self, id: Uuid) -> DbResult<Option<TimeEvent>>;
    async fn list_time_events(&self) -> DbResult<Vec<TimeEvent>>;
    async fn list_time_events_by_event(&self, event_id: Uuid) -> DbResult<Vec<TimeEvent>>;
    async fn list_time_events_by_race(&self, race_id: Uuid) -> DbResult<Vec<TimeEvent>>;
    async fn list_time_events_by_race_and_timing_point(
        &self,
        race_id: Uuid,
        timing_point: &str,
    ) -> DbResult<Vec<TimeEvent>>;
    async fn update_time_event(&self, event: &TimeEvent) -> DbResult<()>;
    async fn delete_time_event(&self, id: Uuid) -> DbResult<()>;
}

/// database port trait for race results
#[async_trait]
pub trait DbpRaceResult: Send + Sync {
    async fn create_race_result(&self, result: &RaceResult) -> DbResult<()>;
    async fn get_race_result(&self, id: Uuid) -> DbResult<Option<RaceResult>>;
    async fn get_race_result_by_race_and_timing_point(
        &self,
        race_id: Uuid,
        timing_point: &str,
    ) -> DbResult<Option<RaceResult>>;
    async fn list_race_results_by_race(&self, race_id: Uuid) -> DbResult<Vec<RaceResult>>;
    async fn update_race_result(&self, result: &RaceResult) -> DbResult<()>;
    async fn delete_race_result(&self, id: Uuid) -> DbResult<()>;
}

#[derive(Debug, Error)]
pub enum DbError {
    /// ID does not exist
    #[error("entity not found")]
    NotFound,

    /// constraint name if it is returned from db
    #[error("unique violation{0:?}")]
    UniqueViolation(Option<String>),

    /// constraint name if it is returned from db
    #[error("foreign key violation{0:?}")]
    ForeignKeyViolation(Option<String>),

    // connection, pool, or other DB errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type DbResult<T> = Result<T, DbError>;
