//! In-memory implementation of the database port.
//!
//! Whole documents live in per-entity maps behind plain mutexes; every
//! operation locks, works, and releases without awaiting, so the adapter is
//! safe to call from concurrent tasks. List operations return deterministic
//! orderings so callers can rely on stable output.

use async_trait::async_trait;
use race_core::{
    DatabasePort, DbError, DbResult, DbpRace, DbpRaceResult, DbpRaceplan, DbpStartEntry,
    DbpStartlist, DbpTimeEvent, Race, RaceResult, Raceplan, StartEntry, Startlist, TimeEvent,
};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct MemoryDb {
    raceplans: Arc<Mutex<HashMap<Uuid, Raceplan>>>,
    races: Arc<Mutex<HashMap<Uuid, Race>>>,
    startlists: Arc<Mutex<HashMap<Uuid, Startlist>>>,
    start_entries: Arc<Mutex<HashMap<Uuid, StartEntry>>>,
    time_events: Arc<Mutex<HashMap<Uuid, TimeEvent>>>,
    race_results: Arc<Mutex<HashMap<Uuid, RaceResult>>>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DbpRaceplan for MemoryDb {
    async fn create_raceplan(&self, plan: &Raceplan) -> DbResult<()> {
        let mut guard = self.raceplans.lock().unwrap();
        if guard.contains_key(&plan.id) {
            return Err(DbError::UniqueViolation(Some("pk_raceplan".into())));
        }
        guard.insert(plan.id, plan.clone());
        Ok(())
    }

    async fn get_raceplan(&self, id: Uuid) -> DbResult<Option<Raceplan>> {
        Ok(self.raceplans.lock().unwrap().get(&id).cloned())
    }

    async fn get_raceplan_by_event(&self, event_id: Uuid) -> DbResult<Option<Raceplan>> {
        Ok(self
            .raceplans
            .lock()
            .unwrap()
            .values()
            .find(|plan| plan.event_id == event_id)
            .cloned())
    }

    async fn list_raceplans(&self) -> DbResult<Vec<Raceplan>> {
        let mut rows: Vec<_> = self.raceplans.lock().unwrap().values().cloned().collect();
        rows.sort_by_key(|plan| (plan.event_id, plan.id));
        Ok(rows)
    }

    async fn update_raceplan(&self, plan: &Raceplan) -> DbResult<()> {
        let mut guard = self.raceplans.lock().unwrap();
        if !guard.contains_key(&plan.id) {
            return Err(DbError::NotFound);
        }
        guard.insert(plan.id, plan.clone());
        Ok(())
    }

    async fn delete_raceplan(&self, id: Uuid) -> DbResult<()> {
        self.raceplans
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(DbError::NotFound)
    }
}

#[async_trait]
impl DbpRace for MemoryDb {
    async fn create_race(&self, race: &Race) -> DbResult<()> {
        let mut guard = self.races.lock().unwrap();
        if guard.contains_key(&race.id()) {
            return Err(DbError::UniqueViolation(Some("pk_race".into())));
        }
        guard.insert(race.id(), race.clone());
        Ok(())
    }

    async fn get_race(&self, id: Uuid) -> DbResult<Option<Race>> {
        Ok(self.races.lock().unwrap().get(&id).cloned())
    }

    async fn list_races(&self) -> DbResult<Vec<Race>> {
        let mut rows: Vec<_> = self.races.lock().unwrap().values().cloned().collect();
        rows.sort_by_key(|race| (race.event_id(), race.order()));
        Ok(rows)
    }

    async fn list_races_by_event(&self, event_id: Uuid) -> DbResult<Vec<Race>> {
        let mut rows: Vec<_> = self
            .races
            .lock()
            .unwrap()
            .values()
            .filter(|race| race.event_id() == event_id)
            .cloned()
            .collect();
        rows.sort_by_key(|race| race.order());
        Ok(rows)
    }

    async fn list_races_by_raceplan(&self, raceplan_id: Uuid) -> DbResult<Vec<Race>> {
        let mut rows: Vec<_> = self
            .races
            .lock()
            .unwrap()
            .values()
            .filter(|race| race.raceplan_id() == raceplan_id)
            .cloned()
            .collect();
        rows.sort_by_key(|race| race.order());
        Ok(rows)
    }

    async fn update_race(&self, race: &Race) -> DbResult<()> {
        let mut guard = self.races.lock().unwrap();
        if !guard.contains_key(&race.id()) {
            return Err(DbError::NotFound);
        }
        guard.insert(race.id(), race.clone());
        Ok(())
    }

    async fn delete_race(&self, id: Uuid) -> DbResult<()> {
        self.races
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(DbError::NotFound)
    }
}

#[async_trait]
impl DbpStartlist for MemoryDb {
    async fn create_startlist(&self, startlist: &Startlist) -> DbResult<()> {
        let mut guard = self.startlists.lock().unwrap();
        if guard.contains_key(&startlist.id) {
            return Err(DbError::UniqueViolation(Some("pk_startlist".into())));
        }
        guard.insert(startlist.id, startlist.clone());
        Ok(())
    }

    async fn get_startlist(&self, id: Uuid) -> DbResult<Option<Startlist>> {
        Ok(self.startlists.lock().unwrap().get(&id).cloned())
    }

    async fn get_startlist_by_event(&self, event_id: Uuid) -> DbResult<Option<Startlist>> {
        Ok(self
            .startlists
            .lock()
            .unwrap()
            .values()
            .find(|startlist| startlist.event_id == event_id)
            .cloned())
    }

    async fn list_startlists(&self) -> DbResult<Vec<Startlist>> {
        let mut rows: Vec<_> = self.startlists.lock().unwrap().values().cloned().collect();
        rows.sort_by_key(|startlist| (startlist.event_id, startlist.id));
        Ok(rows)
    }

    async fn update_startlist(&self, startlist: &Startlist) -> DbResult<()> {
        let mut guard = self.startlists.lock().unwrap();
        if !guard.contains_key(&startlist.id) {
            return Err(DbError::NotFound);
        }
        guard.insert(startlist.id, startlist.clone());
        Ok(())
    }

    async fn delete_startlist(&self, id: Uuid) -> DbResult<()> {
        self.startlists
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(DbError::NotFound)
    }
}

#[async_trait]
impl DbpStartEntry for MemoryDb {
    async fn create_start_entry(&self, entry: &StartEntry) -> DbResult<()> {
        let mut guard = self.start_entries.lock().unwrap();
        if guard.contains_key(&entry.id) {
            return Err(DbError::UniqueViolation(Some("pk_start_entry".into())));
        }
        if guard
            .values()
            .any(|peer| peer.race_id == entry.race_id && peer.bib == entry.bib)
        {
            return Err(DbError::UniqueViolation(Some(
                "uq_start_entry_race_bib".into(),
            )));
        }
        guard.insert(entry.id, entry.clone());
        Ok(())
    }

    async fn get_start_entry(&self, id: Uuid) -> DbResult<Option<StartEntry>> {
        Ok(self.start_entries.lock().unwrap().get(&id).cloned())
    }

    async fn get_start_entry_by_race_and_bib(
        &self,
        race_id: Uuid,
        bib: u32,
    ) -> DbResult<Option<StartEntry>> {
        Ok(self
            .start_entries
            .lock()
            .unwrap()
            .values()
            .find(|entry| entry.race_id == race_id && entry.bib == bib)
            .cloned())
    }

    async fn list_start_entries_by_race(&self, race_id: Uuid) -> DbResult<Vec<StartEntry>> {
        let mut rows: Vec<_> = self
            .start_entries
            .lock()
            .unwrap()
            .values()
            .filter(|entry| entry.race_id == race_id)
            .cloned()
            .collect();
        rows.sort_by_key(|entry| entry.starting_position);
        Ok(rows)
    }

    async fn list_start_entries_by_startlist(
        &self,
        startlist_id: Uuid,
    ) -> DbResult<Vec<StartEntry>> {
        let mut rows: Vec<_> = self
            .start_entries
            .lock()
            .unwrap()
            .values()
            .filter(|entry| entry.startlist_id == startlist_id)
            .cloned()
            .collect();
        rows.sort_by_key(|entry| (entry.race_id, entry.starting_position));
        Ok(rows)
    }

    async fn update_start_entry(&self, entry: &StartEntry) -> DbResult<()> {
        let mut guard = self.start_entries.lock().unwrap();
        if !guard.contains_key(&entry.id) {
            return Err(DbError::NotFound);
        }
        if guard.values().any(|peer| {
            peer.id != entry.id && peer.race_id == entry.race_id && peer.bib == entry.bib
        }) {
            return Err(DbError::UniqueViolation(Some(
                "uq_start_entry_race_bib".into(),
            )));
        }
        guard.insert(entry.id, entry.clone());
        Ok(())
    }

    async fn delete_start_entry(&self, id: Uuid) -> DbResult<()> {
        self.start_entries
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(DbError::NotFound)
    }
}

#[async_trait]
impl DbpTimeEvent for MemoryDb {
    async fn create_time_event(&self, event: &TimeEvent) -> DbResult<()> {
        let mut guard = self.time_events.lock().unwrap();
        if guard.contains_key(&event.id) {
            return Err(DbError::UniqueViolation(Some("pk_time_event".into())));
        }
        guard.insert(event.id, event.clone());
        Ok(())
    }

    async fn get_time_event(&self, id: Uuid) -> DbResult<Option<TimeEvent>> {
        Ok(self.time_events.lock().unwrap().get(&id).cloned())
    }

    async fn list_time_events(&self) -> DbResult<Vec<TimeEvent>> {
        let mut rows: Vec<_> = self.time_events.lock().unwrap().values().cloned().collect();
        rows.sort_by_key(|event| (event.registration_time, event.id));
        Ok(rows)
    }

    async fn list_time_events_by_event(&self, event_id: Uuid) -> DbResult<Vec<TimeEvent>> {
        let mut rows: Vec<_> = self
            .time_events
            .lock()
            .unwrap()
            .values()
            .filter(|event| event.event_id == event_id)
            .cloned()
            .collect();
        rows.sort_by_key(|event| (event.registration_time, event.id));
        Ok(rows)
    }

    async fn list_time_events_by_race(&self, race_id: Uuid) -> DbResult<Vec<TimeEvent>> {
        let mut rows: Vec<_> = self
            .time_events
            .lock()
            .unwrap()
            .values()
            .filter(|event| event.race_id == Some(race_id))
            .cloned()
            .collect();
        rows.sort_by_key(|event| (event.registration_time, event.id));
        Ok(rows)
    }

    async fn list_time_events_by_race_and_timing_point(
        &self,
        race_id: Uuid,
        timing_point: &str,
    ) -> DbResult<Vec<TimeEvent>> {
        let mut rows: Vec<_> = self
            .time_events
            .lock()
            .unwrap()
            .values()
            .filter(|event| {
                event.race_id == Some(race_id) && event.timing_point == timing_point
            })
            .cloned()
            .collect();
        rows.sort_by_key(|event| (event.registration_time, event.id));
        Ok(rows)
    }

    async fn update_time_event(&self, event: &TimeEvent) -> DbResult<()> {
        let mut guard = self.time_events.lock().unwrap();
        if !guard.contains_key(&event.id) {
            return Err(DbError::NotFound);
        }
        guard.insert(event.id, event.clone());
        Ok(())
    }

    async fn delete_time_event(&self, id: Uuid) -> DbResult<()> {
        self.time_events
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(DbError::NotFound)
    }
}

#[async_trait]
impl DbpRaceResult for MemoryDb {
    async fn create_race_result(&self, result: &RaceResult) -> DbResult<()> {
        let mut guard = self.race_results.lock().unwrap();
        if guard.contains_key(&result.id) {
            return Err(DbError::UniqueViolation(Some("pk_race_result".into())));
        }
        if guard.values().any(|peer| {
            peer.race_id == result.race_id && peer.timing_point == result.timing_point
        }) {
            return Err(DbError::UniqueViolation(Some(
                "uq_race_result_race_timing_point".into(),
            )));
        }
        guard.insert(result.id, result.clone());
        Ok(())
    }

    async fn get_race_result(&self, id: Uuid) -> DbResult<Option<RaceResult>> {
        Ok(self.race_results.lock().unwrap().get(&id).cloned())
    }

    async fn get_race_result_by_race_and_timing_point(
        &self,
        race_id: Uuid,
        timing_point: &str,
    ) -> DbResult<Option<RaceResult>> {
        Ok(self
            .race_results
            .lock()
            .unwrap()
            .values()
            .find(|result| result.race_id == race_id && result.timing_point == timing_point)
            .cloned())
    }

    async fn list_race_results_by_race(&self, race_id: Uuid) -> DbResult<Vec<RaceResult>> {
        let mut rows: Vec<_> = self
            .race_results
            .lock()
            .unwrap()
            .values()
            .filter(|result| result.race_id == race_id)
            .cloned()
            .collect();
        rows.sort_by_key(|result| result.timing_point.clone());
        Ok(rows)
    }

    async fn update_race_result(&self, result: &RaceResult) -> DbResult<()> {
        let mut guard = self.race_results.lock().unwrap();
        if !guard.contains_key(&result.id) {
            return Err(DbError::NotFound);
        }
        guard.insert(result.id, result.clone());
        Ok(())
    }

    async fn delete_race_result(&self, id: Uuid) -> DbResult<()> {
        self.race_results
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(DbError::NotFound)
    }
}

#[async_trait]
impl DatabasePort for MemoryDb {
    async fn ping_db(&self) -> DbResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn entry(race_id: Uuid, bib: u32, position: u32) -> StartEntry {
        StartEntry {
            id: Uuid::new_v4(),
            race_id,
            startlist_id: Uuid::new_v4(),
            bib,
            name: format!("Runner {bib}"),
            club: "Lyn Ski".into(),
            starting_position: position,
            scheduled_start_time: NaiveDate::from_ymd_opt(2023, 8, 17)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            actual_start_time: None,
            status: Default::default(),
            changelog: Vec::new(),
        }
    }

    #[tokio::test]
    async fn duplicate_raceplan_id_is_a_unique_violation() {
        let db = MemoryDb::new();
        let plan = Raceplan::new(Uuid::new_v4(), Uuid::new_v4());
        db.create_raceplan(&plan).await.unwrap();
        let err = db.create_raceplan(&plan).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation(_)));
    }

    #[tokio::test]
    async fn duplicate_bib_in_race_is_a_unique_violation() {
        let db = MemoryDb::new();
        let race_id = Uuid::new_v4();
        db.create_start_entry(&entry(race_id, 7, 1)).await.unwrap();
        let err = db.create_start_entry(&entry(race_id, 7, 2)).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation(_)));
        // the same bib in a different race is fine
        db.create_start_entry(&entry(Uuid::new_v4(), 7, 1))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn start_entries_list_in_position_order() {
        let db = MemoryDb::new();
        let race_id = Uuid::new_v4();
        db.create_start_entry(&entry(race_id, 2, 2)).await.unwrap();
        db.create_start_entry(&entry(race_id, 3, 3)).await.unwrap();
        db.create_start_entry(&entry(race_id, 1, 1)).await.unwrap();
        let rows = db.list_start_entries_by_race(race_id).await.unwrap();
        let positions: Vec<u32> = rows.iter().map(|e| e.starting_position).collect();
        assert_eq!(positions, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn one_result_per_race_and_timing_point() {
        let db = MemoryDb::new();
        let race_id = Uuid::new_v4();
        let first = RaceResult::new(Uuid::new_v4(), race_id, "Finish");
        db.create_race_result(&first).await.unwrap();
        let second = RaceResult::new(Uuid::new_v4(), race_id, "Finish");
        let err = db.create_race_result(&second).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation(_)));

        let found = db
            .get_race_result_by_race_and_timing_point(race_id, "Finish")
            .await
            .unwrap();
        assert_eq!(found.map(|result| result.id), Some(first.id));
    }

    #[tokio::test]
    async fn update_of_unknown_document_reports_not_found() {
        let db = MemoryDb::new();
        let plan = Raceplan::new(Uuid::new_v4(), Uuid::new_v4());
        let err = db.update_raceplan(&plan).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound));
    }
}
