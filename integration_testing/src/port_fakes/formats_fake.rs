//! Fake implementation of CompetitionFormatPort for testing

use async_trait::async_trait;
use race_core::{AdapterError, AdapterResult, CompetitionFormat, CompetitionFormatPort};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

#[derive(Clone, Default)]
pub struct FakeFormatService {
    formats: Arc<Mutex<HashMap<String, CompetitionFormat>>>,
}

impl FakeFormatService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_format(&self, format: CompetitionFormat) {
        self.formats
            .lock()
            .unwrap()
            .insert(format.name.clone(), format);
    }
}

#[async_trait]
impl CompetitionFormatPort for FakeFormatService {
    async fn get_competition_format(&self, name: &str) -> AdapterResult<CompetitionFormat> {
        self.formats
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| AdapterError::NotFound(format!("competition format '{name}'")))
    }
}
