//! Time event queries. Ingestion and deletion live in the processor.

use crate::{Core, CoreError, CoreResult, TimeEvent};
use uuid::Uuid;

impl Core {
    pub async fn get_time_event(&self, id: Uuid) -> CoreResult<TimeEvent> {
        self.database
            .get_time_event(id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("time event {id}")))
    }

    pub async fn list_time_events(
        &self,
        event_id: Option<Uuid>,
        race_id: Option<Uuid>,
    ) -> CoreResult<Vec<TimeEvent>> {
        let events = match (race_id, event_id) {
            (Some(race_id), _) => self.database.list_time_events_by_race(race_id).await?,
            (None, Some(event_id)) => {
                self.database.list_time_events_by_event(event_id).await?
            }
            (None, None) => self.database.list_time_events().await?,
        };
        Ok(events)
    }
}
