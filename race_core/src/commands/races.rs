//! Race CRUD with schedule cascades.

use crate::{Core, CoreError, CoreResult, Race, utils::validation::FieldError};
use tracing::instrument;
use uuid::Uuid;

impl Core {
    pub async fn create_race(&self, race: Race) -> CoreResult<Uuid> {
        if self.database.get_race(race.id()).await?.is_some() {
            return Err(CoreError::Conflict(format!(
                "race {} already exists",
                race.id()
            )));
        }
        let Some(mut raceplan) = self.database.get_raceplan(race.raceplan_id()).await? else {
            return Err(CoreError::Field(
                FieldError::builder()
                    .set_field("raceplan_id")
                    .add_invalid_format()
                    .add_message(format!("raceplan {} does not exist", race.raceplan_id()))
                    .build(),
            ));
        };
        self.database.create_race(&race).await?;
        raceplan.races.push(race.id());
        self.database.update_raceplan(&raceplan).await?;
        Ok(race.id())
    }

    pub async fn get_race(&self, id: Uuid) -> CoreResult<Race> {
        self.database
            .get_race(id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("race {id}")))
    }

    pub async fn list_races(&self, event_id: Option<Uuid>) -> CoreResult<Vec<Race>> {
        match event_id {
            Some(event_id) => Ok(self.database.list_races_by_event(event_id).await?),
            None => Ok(self.database.list_races().await?),
        }
    }

    /// Replace a race document. A changed start time shifts the scheduled
    /// start of every entry by the same delta, which for interval races
    /// equals recomputing `start + (position - 1) * interval`.
    #[instrument(skip(self, race))]
    pub async fn update_race(&self, id: Uuid, race: Race) -> CoreResult<()> {
        if race.id() != id {
            return Err(CoreError::Field(
                FieldError::builder()
                    .set_field("id")
                    .add_invalid_format()
                    .add_message("race id must match the addressed resource")
                    .build(),
            ));
        }
        let _race_guard = self.race_locks.lock(id).await;
        let existing = self.get_race(id).await?;
        if race.raceplan_id() != existing.raceplan_id() || race.event_id() != existing.event_id()
        {
            return Err(CoreError::Field(
                FieldError::builder()
                    .set_field("raceplan_id")
                    .add_invalid_format()
                    .add_message("a race cannot move between raceplans or events")
                    .build(),
            ));
        }
        if race.no_of_contestants() > race.max_no_of_contestants() {
            return Err(CoreError::Conflict(format!(
                "race {id} holds more contestants than its maximum"
            )));
        }

        let delta = race.start_time() - existing.start_time();
        self.database.update_race(&race).await?;

        if !delta.is_zero() {
            for mut entry in self.database.list_start_entries_by_race(id).await? {
                entry.scheduled_start_time += delta;
                self.database.update_start_entry(&entry).await?;
            }
        }
        Ok(())
    }

    /// Delete a race with its start entries and race results, and unlink it
    /// from its raceplan.
    #[instrument(skip(self))]
    pub async fn delete_race(&self, id: Uuid) -> CoreResult<()> {
        let _race_guard = self.race_locks.lock(id).await;
        let race = self.get_race(id).await?;
        for entry in self.database.list_start_entries_by_race(id).await? {
            self.database.delete_start_entry(entry.id).await?;
        }
        for result in self.database.list_race_results_by_race(id).await? {
            self.database.delete_race_result(result.id).await?;
        }
        if let Some(mut raceplan) = self.database.get_raceplan(race.raceplan_id()).await? {
            raceplan.races.retain(|&race_id| race_id != id);
            self.database.update_raceplan(&raceplan).await?;
        }
        self.database.delete_race(id).await?;
        Ok(())
    }
}
