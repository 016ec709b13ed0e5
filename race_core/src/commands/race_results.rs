//! Race result queries and maintenance, scoped by race.

use crate::{Core, CoreError, CoreResult, RaceResult};
use tracing::instrument;
use uuid::Uuid;

impl Core {
    pub async fn list_race_results(
        &self,
        race_id: Uuid,
        timing_point: Option<&str>,
    ) -> CoreResult<Vec<RaceResult>> {
        self.get_race(race_id).await?;
        let mut results = self.database.list_race_results_by_race(race_id).await?;
        if let Some(timing_point) = timing_point {
            results.retain(|result| result.timing_point == timing_point);
        }
        Ok(results)
    }

    pub async fn get_race_result(&self, race_id: Uuid, id: Uuid) -> CoreResult<RaceResult> {
        match self.database.get_race_result(id).await? {
            Some(result) if result.race_id == race_id => Ok(result),
            _ => Err(CoreError::NotFound(format!(
                "race result {id} in race {race_id}"
            ))),
        }
    }

    pub async fn update_race_result(
        &self,
        race_id: Uuid,
        id: Uuid,
        result: RaceResult,
    ) -> CoreResult<()> {
        let existing = self.get_race_result(race_id, id).await?;
        if result.id != id || result.race_id != race_id {
            return Err(CoreError::Conflict(
                "race results cannot move between races".into(),
            ));
        }
        if result.timing_point != existing.timing_point {
            return Err(CoreError::Conflict(
                "the timing point of a race result is immutable".into(),
            ));
        }
        self.database.update_race_result(&result).await?;
        Ok(())
    }

    /// Delete an empty race result and unlink it from its race. Results
    /// still holding ranked time events must be corrected first.
    #[instrument(skip(self))]
    pub async fn delete_race_result(&self, race_id: Uuid, id: Uuid) -> CoreResult<()> {
        let result = self.get_race_result(race_id, id).await?;
        if !result.ranking_sequence.is_empty() {
            return Err(CoreError::Conflict(format!(
                "race result {id} still ranks {} time events",
                result.ranking_sequence.len()
            )));
        }
        self.database.delete_race_result(id).await?;

        let mut race = self.get_race(race_id).await?;
        race.results_mut().remove(&result.timing_point);
        self.database.update_race(&race).await?;
        Ok(())
    }
}
