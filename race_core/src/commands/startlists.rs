//! Startlist commands: generation and CRUD.

use crate::{
    Core, CoreError, CoreResult, Startlist, build_startlist,
    journal::{Journal, UndoOp},
};
use tracing::{info, instrument};
use uuid::Uuid;

impl Core {
    /// Seed the first round of every raceclass and persist the startlist.
    /// Requires an existing raceplan and bibs assigned by the events
    /// service; fails with a conflict when a startlist already exists.
    #[instrument(skip(self))]
    pub async fn generate_startlist_for_event(&self, event_id: Uuid) -> CoreResult<Startlist> {
        let _guard = self.event_locks.lock(event_id).await;

        let event = self
            .event_service
            .get_event(event_id)
            .await
            .map_err(CoreError::from_adapter)?;
        let format = self
            .format_service
            .get_competition_format(&event.competition_format)
            .await
            .map_err(CoreError::from_adapter)?;
        let raceclasses = self
            .event_service
            .get_raceclasses(event_id)
            .await
            .map_err(CoreError::from_adapter)?;
        let contestants = self
            .event_service
            .get_contestants(event_id)
            .await
            .map_err(CoreError::from_adapter)?;

        let Some(mut raceplan) = self.database.get_raceplan_by_event(event_id).await? else {
            return Err(CoreError::NotFound(format!(
                "event {event_id} has no raceplan to start from"
            )));
        };
        if self
            .database
            .get_startlist_by_event(event_id)
            .await?
            .is_some()
        {
            return Err(CoreError::Conflict(format!(
                "event {event_id} already has a startlist"
            )));
        }

        let originals = self.database.list_races_by_raceplan(raceplan.id).await?;
        let mut races = originals.clone();
        let generated =
            build_startlist(&event, &format, &raceclasses, &contestants, &mut races)?;

        let mut journal = Journal::new();
        let staged: CoreResult<()> = async {
            self.database.create_startlist(&generated.startlist).await?;
            journal.record(UndoOp::DeleteStartlist(generated.startlist.id));
            for entry in &generated.start_entries {
                self.database.create_start_entry(entry).await?;
                journal.record(UndoOp::DeleteStartEntry(entry.id));
            }
            for (race, original) in races.iter().zip(&originals) {
                if race != original {
                    journal.record(UndoOp::RestoreRace(original.clone()));
                    self.database.update_race(race).await?;
                }
            }
            journal.record(UndoOp::RestoreRaceplan(raceplan.clone()));
            raceplan.no_of_contestants = generated.startlist.no_of_contestants;
            self.database.update_raceplan(&raceplan).await?;
            Ok(())
        }
        .await;

        if let Err(err) = staged {
            journal.rollback(self.database.as_ref()).await;
            return Err(err);
        }
        info!(
            startlist_id = %generated.startlist.id,
            entries = generated.start_entries.len(),
            "startlist generated"
        );
        Ok(generated.startlist)
    }

    pub async fn create_startlist(&self, startlist: Startlist) -> CoreResult<Uuid> {
        if self.database.get_startlist(startlist.id).await?.is_some() {
            return Err(CoreError::Conflict(format!(
                "startlist {} already exists",
                startlist.id
            )));
        }
        if self
            .database
            .get_startlist_by_event(startlist.event_id)
            .await?
            .is_some()
        {
            return Err(CoreError::Conflict(format!(
                "event {} already has a startlist",
                startlist.event_id
            )));
        }
        self.database.create_startlist(&startlist).await?;
        Ok(startlist.id)
    }

    pub async fn get_startlist(&self, id: Uuid) -> CoreResult<Startlist> {
        self.database
            .get_startlist(id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("startlist {id}")))
    }

    pub async fn list_startlists(&self, event_id: Option<Uuid>) -> CoreResult<Vec<Startlist>> {
        match event_id {
            Some(event_id) => Ok(self
                .database
                .get_startlist_by_event(event_id)
                .await?
                .into_iter()
                .collect()),
            None => Ok(self.database.list_startlists().await?),
        }
    }

    pub async fn update_startlist(&self, id: Uuid, startlist: Startlist) -> CoreResult<()> {
        if startlist.id != id {
            return Err(CoreError::Validation(
                crate::utils::validation::FieldError::builder()
                    .set_field("id")
                    .add_invalid_format()
                    .add_message("startlist id must match the addressed resource")
                    .build()
                    .into(),
            ));
        }
        if self.database.get_startlist(id).await?.is_none() {
            return Err(CoreError::NotFound(format!("startlist {id}")));
        }
        self.database.update_startlist(&startlist).await?;
        Ok(())
    }

    /// Delete a startlist and its start entries.
    pub async fn delete_startlist(&self, id: Uuid) -> CoreResult<()> {
        let startlist = self.get_startlist(id).await?;
        let _guard = self.event_locks.lock(startlist.event_id).await;
        for entry in self
            .database
            .list_start_entries_by_startlist(id)
            .await?
        {
            self.database.delete_start_entry(entry.id).await?;
            if let Some(mut race) = self.database.get_race(entry.race_id).await? {
                race.start_entries_mut().retain(|&e| e != entry.id);
                race.set_no_of_contestants(race.start_entries().len() as u32);
                self.database.update_race(&race).await?;
            }
        }
        self.database.delete_startlist(id).await?;
        Ok(())
    }
}
