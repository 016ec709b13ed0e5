// events service port types

use crate::{Contestant, Event, Raceclass};
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

/// Errors reported by the external service adapters.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// credentials or token rejected by the upstream service
    #[error("upstream authentication failed")]
    Auth,

    /// requested resource does not exist upstream
    #[error("not found upstream: {0}")]
    NotFound(String),

    /// upstream unreachable or responded with a server error
    #[error("upstream unavailable: {0}")]
    Unavailable(String),

    /// payload could not be decoded
    #[error("invalid upstream payload: {0}")]
    Decode(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type AdapterResult<T> = Result<T, AdapterError>;

/// events service port trait
#[async_trait]
pub trait EventServicePort: Send + Sync {
    async fn get_event(&self, event_id: Uuid) -> AdapterResult<Event>;
    /// raceclasses of the event, in catalog order
    async fn get_raceclasses(&self, event_id: Uuid) -> AdapterResult<Vec<Raceclass>>;
    /// contestants of the event, in seeded roster order
    async fn get_contestants(&self, event_id: Uuid) -> AdapterResult<Vec<Contestant>>;
}
