//! Fake implementation of EventServicePort for testing

use async_trait::async_trait;
use race_core::{AdapterError, AdapterResult, Contestant, Event, EventServicePort, Raceclass};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct FakeEventService {
    event: Arc<Mutex<Option<Event>>>,
    raceclasses: Arc<Mutex<Vec<Raceclass>>>,
    contestants: Arc<Mutex<Vec<Contestant>>>,
    fail_next: Arc<Mutex<bool>>,
}

impl FakeEventService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_event(&self, event: Event) {
        *self.event.lock().unwrap() = Some(event);
    }

    pub fn set_raceclasses(&self, raceclasses: Vec<Raceclass>) {
        *self.raceclasses.lock().unwrap() = raceclasses;
    }

    pub fn set_contestants(&self, contestants: Vec<Contestant>) {
        *self.contestants.lock().unwrap() = contestants;
    }

    pub fn fail_next(&self) {
        *self.fail_next.lock().unwrap() = true;
    }

    fn take_failure(&self) -> AdapterResult<()> {
        let mut guard = self.fail_next.lock().unwrap();
        if *guard {
            *guard = false;
            return Err(AdapterError::Unavailable("injected failure".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl EventServicePort for FakeEventService {
    async fn get_event(&self, event_id: Uuid) -> AdapterResult<Event> {
        self.take_failure()?;
        self.event
            .lock()
            .unwrap()
            .clone()
            .filter(|event| event.id == event_id)
            .ok_or_else(|| AdapterError::NotFound(format!("event {event_id}")))
    }

    async fn get_raceclasses(&self, event_id: Uuid) -> AdapterResult<Vec<Raceclass>> {
        self.take_failure()?;
        Ok(self
            .raceclasses
            .lock()
            .unwrap()
            .iter()
            .filter(|class| class.event_id == event_id)
            .cloned()
            .collect())
    }

    async fn get_contestants(&self, _event_id: Uuid) -> AdapterResult<Vec<Contestant>> {
        self.take_failure()?;
        Ok(self.contestants.lock().unwrap().clone())
    }
}
