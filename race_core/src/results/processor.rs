//! The time-event processor.
//!
//! Every accepted event lands in the ranking of its `(race, timing point)`
//! pair. Finish rankings are ordered by registration time with `(time, bib)`
//! tie-break; all other timing points rank by arrival. When the last finish
//! of a bracket heat arrives, the heat's progression rule is applied and the
//! qualifiers are written into the next round's races. A propagation that
//! would overflow a target race is rolled back completely; the offending
//! event is kept with status `Error` so it can be corrected or deleted.

use crate::{
    ChangelogEntry, Core, CoreError, CoreResult, DbError, IndividualSprintRace, Qualifier, Race,
    RaceResult, SprintRound, StartEntry, TimeEvent, TimeEventStatus,
    journal::{Journal, UndoOp},
    partition_qualifiers,
    utils::validation::FieldError,
};
use chrono::{NaiveDateTime, Utc};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{info, instrument, warn};
use uuid::Uuid;

const FINISH: &str = "Finish";

/// Sort key of a finish event: registration time, then bib. Events without
/// a bib rank last among equals.
fn finish_key(event: &TimeEvent) -> (NaiveDateTime, u32) {
    (event.registration_time, event.bib.unwrap_or(u32::MAX))
}

impl Core {
    /// Ingest one time event (§ time-event processor). Returns the stored
    /// event with its rank and, after propagation, its next-race fields.
    #[instrument(skip(self, event), fields(time_event_id = %event.id))]
    pub async fn process_time_event(
        &self,
        mut event: TimeEvent,
        user_id: &str,
    ) -> CoreResult<TimeEvent> {
        let now = Utc::now().naive_utc();

        if self.database.get_time_event(event.id).await?.is_some() {
            return Err(CoreError::Conflict(format!(
                "time event {} already exists",
                event.id
            )));
        }

        let Some(race_id) = event.race_id else {
            return self
                .reject_time_event(
                    event,
                    now,
                    user_id,
                    "time event carries no race reference",
                    CoreError::Field(
                        FieldError::builder()
                            .set_field("race_id")
                            .add_required()
                            .add_message("time event carries no race reference")
                            .build(),
                    ),
                )
                .await;
        };
        let Some(mut race) = self.database.get_race(race_id).await? else {
            return self
                .reject_time_event(
                    event,
                    now,
                    user_id,
                    "race does not exist",
                    CoreError::NotFound(format!("race {race_id}")),
                )
                .await;
        };
        if !race
            .accepted_timing_points()
            .contains(&event.timing_point.as_str())
        {
            let reason = format!(
                "timing point '{}' is not valid for a {} race",
                event.timing_point,
                race.datatype()
            );
            return self
                .reject_time_event(
                    event,
                    now,
                    user_id,
                    reason.clone(),
                    CoreError::Field(
                        FieldError::builder()
                            .set_field("timing_point")
                            .add_invalid_format()
                            .add_message(reason)
                            .build(),
                    ),
                )
                .await;
        }

        event.race = Some(match &race {
            Race::IndividualSprint(sprint) => sprint.heat_name(),
            Race::IntervalStart(_) => race.raceclass().to_string(),
        });
        if let Some(bib) = event.bib
            && let Some(entry) = self
                .database
                .get_start_entry_by_race_and_bib(race_id, bib)
                .await?
        {
            event.name.get_or_insert(entry.name);
            event.club.get_or_insert(entry.club);
        }

        let timing_point = event.timing_point.clone();
        let _guard = self
            .result_locks
            .lock((race_id, timing_point.clone()))
            .await;

        let mut journal = Journal::new();
        let rejected_template = event.clone();

        let existing_result = self
            .database
            .get_race_result_by_race_and_timing_point(race_id, &timing_point)
            .await?;
        let created_result = existing_result.is_none();
        let mut result = existing_result
            .clone()
            .unwrap_or_else(|| RaceResult::new(Uuid::new_v4(), race_id, &timing_point));

        let mut sequence: Vec<TimeEvent> = Vec::with_capacity(result.ranking_sequence.len() + 1);
        for id in &result.ranking_sequence {
            let stored = self.database.get_time_event(*id).await?.ok_or_else(|| {
                CoreError::Internal(format!("ranking references missing time event {id}"))
            })?;
            sequence.push(stored);
        }

        event.status = TimeEventStatus::Ok;
        let insert_at = if timing_point == FINISH {
            sequence
                .iter()
                .position(|stored| finish_key(stored) > finish_key(&event))
                .unwrap_or(sequence.len())
        } else {
            sequence.len()
        };

        if let Err(err) = self.database.create_time_event(&event).await {
            return Err(map_duplicate(err, &event.id));
        }
        journal.record(UndoOp::DeleteTimeEvent(event.id));
        sequence.insert(insert_at, event.clone());

        result.ranking_sequence = sequence.iter().map(|stored| stored.id).collect();
        result.no_of_contestants = sequence.len() as u32;
        if created_result {
            self.database.create_race_result(&result).await?;
            journal.record(UndoOp::DeleteRaceResult(result.id));
            journal.record(UndoOp::RestoreRace(race.clone()));
            race.results_mut().insert(timing_point.clone(), result.id);
            self.database.update_race(&race).await?;
        } else if let Some(original) = existing_result {
            journal.record(UndoOp::RestoreRaceResult(original));
            self.database.update_race_result(&result).await?;
        }

        // recompute ranks over the whole sequence
        for (i, stored) in sequence.iter_mut().enumerate() {
            let rank = (i + 1) as u32;
            if stored.rank != Some(rank) {
                if stored.id != event.id {
                    journal.record(UndoOp::RestoreTimeEvent(stored.clone()));
                }
                stored.rank = Some(rank);
                self.database.update_time_event(stored).await?;
            }
        }

        if let Race::IndividualSprint(sprint) = &race
            && timing_point == FINISH
            && !sprint.rule.is_empty()
        {
            let entries = self.database.list_start_entries_by_race(race_id).await?;
            let finished: HashSet<u32> = sequence.iter().filter_map(|e| e.bib).collect();
            let outs = entries
                .iter()
                .filter(|e| e.status.is_out() && !finished.contains(&e.bib))
                .count() as u32;
            let heat_complete = sprint.no_of_contestants > 0
                && sequence.len() as u32 + outs >= sprint.no_of_contestants;

            if heat_complete {
                info!(race = %sprint.heat_name(), "heat complete, propagating qualifiers");
                match self
                    .propagate_heat(sprint, &sequence, &entries, now, user_id)
                    .await
                {
                    Ok(propagation_journal) => journal.merge(propagation_journal),
                    Err(err) => {
                        warn!(%err, race = %sprint.heat_name(), "propagation failed, rolling back");
                        journal.rollback(self.database.as_ref()).await;
                        return self
                            .reject_time_event(
                                rejected_template,
                                now,
                                user_id,
                                format!("propagation failed: {err}"),
                                match err {
                                    CoreError::Conflict(msg) => CoreError::Rejected(msg),
                                    other => other,
                                },
                            )
                            .await;
                    }
                }
            }
        }

        self.database
            .get_time_event(event.id)
            .await?
            .ok_or_else(|| CoreError::Internal(format!("time event {} vanished", event.id)))
    }

    /// Delete a time event: drop it from the ranking, re-rank, and remove a
    /// start entry it propagated, provided nothing downstream depends on it.
    #[instrument(skip(self))]
    pub async fn withdraw_time_event(&self, id: Uuid) -> CoreResult<()> {
        let Some(event) = self.database.get_time_event(id).await? else {
            return Err(CoreError::NotFound(format!("time event {id}")));
        };
        let Some(race_id) = event.race_id else {
            self.database.delete_time_event(id).await?;
            return Ok(());
        };

        let _guard = self
            .result_locks
            .lock((race_id, event.timing_point.clone()))
            .await;

        if let (Some(next_race_id), Some(bib)) = (event.next_race_id, event.bib) {
            let downstream = self.database.list_time_events_by_race(next_race_id).await?;
            if downstream.iter().any(|e| e.bib == Some(bib)) {
                return Err(CoreError::Conflict(format!(
                    "time events in race {next_race_id} depend on the entry of bib {bib}"
                )));
            }
            self.remove_derived_entry(next_race_id, bib).await?;
        }

        if let Some(mut result) = self
            .database
            .get_race_result_by_race_and_timing_point(race_id, &event.timing_point)
            .await?
            && result.ranking_sequence.contains(&id)
        {
            result.ranking_sequence.retain(|&seq_id| seq_id != id);
            result.no_of_contestants = result.ranking_sequence.len() as u32;
            self.database.update_race_result(&result).await?;

            for (i, seq_id) in result.ranking_sequence.iter().enumerate() {
                if let Some(mut stored) = self.database.get_time_event(*seq_id).await? {
                    let rank = (i + 1) as u32;
                    if stored.rank != Some(rank) {
                        stored.rank = Some(rank);
                        self.database.update_time_event(&stored).await?;
                    }
                }
            }
        }

        self.database.delete_time_event(id).await?;
        Ok(())
    }

    /// Write the qualifiers of a completed heat into the next round's races.
    /// Returns the staged writes so the caller can merge or roll them back.
    async fn propagate_heat(
        &self,
        source: &IndividualSprintRace,
        ranked: &[TimeEvent],
        source_entries: &[StartEntry],
        now: NaiveDateTime,
        user_id: &str,
    ) -> CoreResult<Journal> {
        let mut journal = Journal::new();

        let mut targets: HashMap<(SprintRound, u32), Uuid> = HashMap::new();
        let mut heat_counts: BTreeMap<SprintRound, u32> = BTreeMap::new();
        for race in self.database.list_races_by_event(source.event_id).await? {
            if race.raceclass() != source.raceclass {
                continue;
            }
            if let Some(sprint) = race.as_sprint() {
                *heat_counts.entry(sprint.round).or_insert(0) += 1;
                targets.insert((sprint.round, sprint.heat), race.id());
            }
        }

        let entry_by_bib: HashMap<u32, &StartEntry> =
            source_entries.iter().map(|e| (e.bib, e)).collect();
        let mut qualifiers = Vec::new();
        for event in ranked {
            let Some(bib) = event.bib else {
                continue;
            };
            let entry = entry_by_bib.get(&bib);
            if entry.is_some_and(|e| e.status.is_out()) {
                continue;
            }
            qualifiers.push(Qualifier {
                time_event_id: event.id,
                bib,
                name: entry
                    .map(|e| e.name.clone())
                    .or_else(|| event.name.clone())
                    .unwrap_or_else(|| format!("bib {bib}")),
                club: entry
                    .map(|e| e.club.clone())
                    .or_else(|| event.club.clone())
                    .unwrap_or_default(),
                rank: event.rank.unwrap_or((qualifiers.len() + 1) as u32),
            });
        }

        let placements =
            partition_qualifiers(&source.rule, source.heat, &heat_counts, qualifiers);

        for placement in placements {
            let key = (placement.target_round, placement.target_heat);
            let Some(&target_id) = targets.get(&key) else {
                return Err(CoreError::Internal(format!(
                    "progression targets missing race {}{} of raceclass {}",
                    placement.target_round, placement.target_heat, source.raceclass
                )));
            };
            let bib = placement.qualifier.bib;

            // parallel heats may feed the same race; re-read it under its lock
            let race_guard = self.race_locks.lock(target_id).await;
            let Some(mut target) = self.database.get_race(target_id).await? else {
                return Err(CoreError::Internal(format!(
                    "progression target race {target_id} vanished"
                )));
            };

            let position = match self
                .database
                .get_start_entry_by_race_and_bib(target_id, bib)
                .await?
            {
                Some(existing) => existing.starting_position,
                None => {
                    if target.no_of_contestants() >= target.max_no_of_contestants() {
                        return Err(CoreError::Conflict(format!(
                            "race {} cannot take more than {} contestants",
                            target
                                .as_sprint()
                                .map(|s| s.heat_name())
                                .unwrap_or_else(|| target_id.to_string()),
                            target.max_no_of_contestants()
                        )));
                    }
                    let position = target.no_of_contestants() + 1;
                    let entry = StartEntry {
                        id: Uuid::new_v4(),
                        race_id: target_id,
                        startlist_id: entry_by_bib
                            .get(&bib)
                            .map(|e| e.startlist_id)
                            .unwrap_or_else(Uuid::nil),
                        bib,
                        name: placement.qualifier.name.clone(),
                        club: placement.qualifier.club.clone(),
                        starting_position: position,
                        scheduled_start_time: target.start_time(),
                        actual_start_time: None,
                        status: Default::default(),
                        changelog: vec![ChangelogEntry::new(
                            now,
                            user_id,
                            format!("PROPAGATED_FROM:{}", source.id),
                        )],
                    };
                    self.database.create_start_entry(&entry).await?;
                    journal.record(UndoOp::DeleteStartEntry(entry.id));

                    journal.record(UndoOp::RestoreRace(target.clone()));
                    target.start_entries_mut().push(entry.id);
                    target.set_no_of_contestants(position);
                    self.database.update_race(&target).await?;
                    position
                }
            };

            if let Some(mut stored) = self
                .database
                .get_time_event(placement.qualifier.time_event_id)
                .await?
            {
                journal.record(UndoOp::RestoreTimeEvent(stored.clone()));
                stored.next_race = target.as_sprint().map(|s| s.heat_name());
                stored.next_race_id = Some(target_id);
                stored.next_race_position = Some(position);
                self.database.update_time_event(&stored).await?;
            }
            drop(race_guard);
        }
        Ok(journal)
    }

    /// Remove a start entry that only exists because of a propagation, and
    /// keep the target race's positions dense.
    async fn remove_derived_entry(&self, race_id: Uuid, bib: u32) -> CoreResult<()> {
        let _race_guard = self.race_locks.lock(race_id).await;
        let Some(entry) = self
            .database
            .get_start_entry_by_race_and_bib(race_id, bib)
            .await?
        else {
            return Ok(());
        };
        self.database.delete_start_entry(entry.id).await?;

        if let Some(mut race) = self.database.get_race(race_id).await? {
            race.start_entries_mut().retain(|&id| id != entry.id);
            race.set_no_of_contestants(race.start_entries().len() as u32);
            self.database.update_race(&race).await?;
        }

        let mut remaining = self.database.list_start_entries_by_race(race_id).await?;
        remaining.sort_by_key(|e| e.starting_position);
        for (i, mut remaining_entry) in remaining.into_iter().enumerate() {
            let position = (i + 1) as u32;
            if remaining_entry.starting_position != position {
                remaining_entry.starting_position = position;
                self.database.update_start_entry(&remaining_entry).await?;
            }
        }
        Ok(())
    }

    /// Persist an event that failed validation or propagation with status
    /// `Error` and a changelog entry recording why, then surface `err`.
    async fn reject_time_event(
        &self,
        mut event: TimeEvent,
        now: NaiveDateTime,
        user_id: &str,
        reason: impl Into<String>,
        err: CoreError,
    ) -> CoreResult<TimeEvent> {
        event.status = TimeEventStatus::Error;
        event.rank = None;
        event
            .changelog
            .push(ChangelogEntry::new(now, user_id, reason));
        match self.database.create_time_event(&event).await {
            Ok(()) => Err(err),
            Err(db_err) => Err(map_duplicate(db_err, &event.id)),
        }
    }
}

fn map_duplicate(err: DbError, id: &Uuid) -> CoreError {
    match err {
        DbError::UniqueViolation(_) => {
            CoreError::Conflict(format!("time event {id} already exists"))
        }
        other => other.into(),
    }
}
