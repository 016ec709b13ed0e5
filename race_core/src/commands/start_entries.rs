//! Start entry CRUD, scoped by race.
//!
//! Boundary checks keep the per-race invariants: capacity, bib uniqueness
//! and dense unique starting positions.

use crate::{ChangelogEntry, Core, CoreError, CoreResult, StartEntry};
use chrono::Utc;
use tracing::instrument;
use uuid::Uuid;

impl Core {
    #[instrument(skip(self, entry), fields(bib = entry.bib))]
    pub async fn create_start_entry(
        &self,
        race_id: Uuid,
        mut entry: StartEntry,
        user_id: &str,
    ) -> CoreResult<Uuid> {
        let _race_guard = self.race_locks.lock(race_id).await;
        let mut race = self.get_race(race_id).await?;
        entry.race_id = race_id;

        if self.database.get_start_entry(entry.id).await?.is_some() {
            return Err(CoreError::Conflict(format!(
                "start entry {} already exists",
                entry.id
            )));
        }
        if race.no_of_contestants() >= race.max_no_of_contestants() {
            return Err(CoreError::Conflict(format!(
                "race {race_id} cannot take more than {} contestants",
                race.max_no_of_contestants()
            )));
        }
        if self
            .database
            .get_start_entry_by_race_and_bib(race_id, entry.bib)
            .await?
            .is_some()
        {
            return Err(CoreError::Conflict(format!(
                "bib {} already starts in race {race_id}",
                entry.bib
            )));
        }
        let peers = self.database.list_start_entries_by_race(race_id).await?;
        if peers
            .iter()
            .any(|peer| peer.starting_position == entry.starting_position)
        {
            return Err(CoreError::Conflict(format!(
                "starting position {} is already taken in race {race_id}",
                entry.starting_position
            )));
        }

        entry.changelog.push(ChangelogEntry::new(
            Utc::now().naive_utc(),
            user_id,
            "created",
        ));
        self.database.create_start_entry(&entry).await?;

        race.start_entries_mut().push(entry.id);
        race.set_no_of_contestants(race.start_entries().len() as u32);
        self.database.update_race(&race).await?;

        if let Some(mut startlist) = self.database.get_startlist(entry.startlist_id).await? {
            startlist.start_entries.push(entry.id);
            startlist.no_of_contestants = startlist.start_entries.len() as u32;
            self.database.update_startlist(&startlist).await?;
        }
        Ok(entry.id)
    }

    pub async fn get_start_entry(&self, race_id: Uuid, id: Uuid) -> CoreResult<StartEntry> {
        match self.database.get_start_entry(id).await? {
            Some(entry) if entry.race_id == race_id => Ok(entry),
            _ => Err(CoreError::NotFound(format!(
                "start entry {id} in race {race_id}"
            ))),
        }
    }

    pub async fn list_start_entries(&self, race_id: Uuid) -> CoreResult<Vec<StartEntry>> {
        // surfacing an empty list for an unknown race would hide typos
        self.get_race(race_id).await?;
        Ok(self.database.list_start_entries_by_race(race_id).await?)
    }

    #[instrument(skip(self, entry))]
    pub async fn update_start_entry(
        &self,
        race_id: Uuid,
        id: Uuid,
        entry: StartEntry,
    ) -> CoreResult<()> {
        let _race_guard = self.race_locks.lock(race_id).await;
        let existing = self.get_start_entry(race_id, id).await?;
        if entry.id != id || entry.race_id != race_id {
            return Err(CoreError::Conflict(
                "start entries cannot move between races".into(),
            ));
        }
        let peers = self.database.list_start_entries_by_race(race_id).await?;
        if entry.bib != existing.bib && peers.iter().any(|p| p.id != id && p.bib == entry.bib) {
            return Err(CoreError::Conflict(format!(
                "bib {} already starts in race {race_id}",
                entry.bib
            )));
        }
        if entry.starting_position != existing.starting_position
            && peers
                .iter()
                .any(|p| p.id != id && p.starting_position == entry.starting_position)
        {
            return Err(CoreError::Conflict(format!(
                "starting position {} is already taken in race {race_id}",
                entry.starting_position
            )));
        }
        self.database.update_start_entry(&entry).await?;
        Ok(())
    }

    /// Delete a start entry, unless time events already reference its bib.
    #[instrument(skip(self))]
    pub async fn delete_start_entry(&self, race_id: Uuid, id: Uuid) -> CoreResult<()> {
        let _race_guard = self.race_locks.lock(race_id).await;
        let entry = self.get_start_entry(race_id, id).await?;

        let events = self.database.list_time_events_by_race(race_id).await?;
        if events.iter().any(|event| event.bib == Some(entry.bib)) {
            return Err(CoreError::Conflict(format!(
                "time events reference bib {} in race {race_id}",
                entry.bib
            )));
        }

        self.database.delete_start_entry(id).await?;

        let mut race = self.get_race(race_id).await?;
        race.start_entries_mut().retain(|&e| e != id);
        race.set_no_of_contestants(race.start_entries().len() as u32);
        self.database.update_race(&race).await?;

        if let Some(mut startlist) = self.database.get_startlist(entry.startlist_id).await? {
            startlist.start_entries.retain(|&e| e != id);
            startlist.no_of_contestants = startlist.start_entries.len() as u32;
            self.database.update_startlist(&startlist).await?;
        }
        Ok(())
    }
}
