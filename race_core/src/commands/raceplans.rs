//! Raceplan commands: generation and CRUD.

use crate::{
    Core, CoreError, CoreResult, GeneratedPlan, Raceplan, build_raceplan,
    journal::{Journal, UndoOp},
    utils::validation::{FieldError, ValidationErrors},
};
use tracing::{info, instrument};
use uuid::Uuid;

impl Core {
    /// Build and persist the complete raceplan of an event from its
    /// competition format and raceclasses. Fails with a conflict when the
    /// event already has a plan.
    #[instrument(skip(self))]
    pub async fn generate_raceplan_for_event(&self, event_id: Uuid) -> CoreResult<Raceplan> {
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

        if self.database.get_raceplan_by_event(event_id).await?.is_some() {
            return Err(CoreError::Conflict(format!(
                "event {event_id} already has a raceplan"
            )));
        }

        let mut errors = ValidationErrors::new();
        for contestant in &contestants {
            if !raceclasses
                .iter()
                .any(|class| class.ageclasses.contains(&contestant.ageclass))
            {
                errors.add(
                    FieldError::builder()
                        .set_field("ageclass")
                        .add_invalid_format()
                        .add_message(format!(
                            "no raceclass covers ageclass {} of {}",
                            contestant.ageclass,
                            contestant.full_name()
                        ))
                        .build(),
                );
            }
        }
        if !errors.is_empty() {
            return Err(errors.into());
        }

        let generated = build_raceplan(&event, &format, &raceclasses)?;

        let mut journal = Journal::new();
        if let Err(err) = self.persist_plan(&generated, &mut journal).await {
            journal.rollback(self.database.as_ref()).await;
            return Err(err);
        }
        info!(
            raceplan_id = %generated.raceplan.id,
            races = generated.races.len(),
            "raceplan generated"
        );
        Ok(generated.raceplan)
    }

    async fn persist_plan(
        &self,
        generated: &GeneratedPlan,
        journal: &mut Journal,
    ) -> CoreResult<()> {
        self.database.create_raceplan(&generated.raceplan).await?;
        journal.record(UndoOp::DeleteRaceplan(generated.raceplan.id));
        for race in &generated.races {
            self.database.create_race(race).await?;
            journal.record(UndoOp::DeleteRace(race.id()));
        }
        Ok(())
    }

    pub async fn create_raceplan(&self, plan: Raceplan) -> CoreResult<Uuid> {
        if self.database.get_raceplan(plan.id).await?.is_some() {
            return Err(CoreError::Conflict(format!(
                "raceplan {} already exists",
                plan.id
            )));
        }
        if self
            .database
            .get_raceplan_by_event(plan.event_id)
            .await?
            .is_some()
        {
            return Err(CoreError::Conflict(format!(
                "event {} already has a raceplan",
                plan.event_id
            )));
        }
        self.database.create_raceplan(&plan).await?;
        Ok(plan.id)
    }

    pub async fn get_raceplan(&self, id: Uuid) -> CoreResult<Raceplan> {
        self.database
            .get_raceplan(id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("raceplan {id}")))
    }

    pub async fn list_raceplans(&self, event_id: Option<Uuid>) -> CoreResult<Vec<Raceplan>> {
        match event_id {
            Some(event_id) => Ok(self
                .database
                .get_raceplan_by_event(event_id)
                .await?
                .into_iter()
                .collect()),
            None => Ok(self.database.list_raceplans().await?),
        }
    }

    pub async fn update_raceplan(&self, id: Uuid, plan: Raceplan) -> CoreResult<()> {
        if plan.id != id {
            return Err(CoreError::Field(
                FieldError::builder()
                    .set_field("id")
                    .add_invalid_format()
                    .add_message("raceplan id must match the addressed resource")
                    .build(),
            ));
        }
        if self.database.get_raceplan(id).await?.is_none() {
            return Err(CoreError::NotFound(format!("raceplan {id}")));
        }
        self.database.update_raceplan(&plan).await?;
        Ok(())
    }

    /// Delete a raceplan with its races, their start entries and race
    /// results, and the event's startlist.
    #[instrument(skip(self))]
    pub async fn delete_raceplan(&self, id: Uuid) -> CoreResult<()> {
        let plan = self.get_raceplan(id).await?;
        let _guard = self.event_locks.lock(plan.event_id).await;

        for race in self.database.list_races_by_raceplan(id).await? {
            for entry in self.database.list_start_entries_by_race(race.id()).await? {
                self.database.delete_start_entry(entry.id).await?;
            }
            for result in self.database.list_race_results_by_race(race.id()).await? {
                self.database.delete_race_result(result.id).await?;
            }
            self.database.delete_race(race.id()).await?;
        }
        if let Some(startlist) = self
            .database
            .get_startlist_by_event(plan.event_id)
            .await?
        {
            self.database.delete_startlist(startlist.id).await?;
        }
        self.database.delete_raceplan(id).await?;
        info!(raceplan_id = %id, "raceplan deleted");
        Ok(())
    }
}
