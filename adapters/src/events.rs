//! Client for the events service.

use crate::{TokenProvider, status_error, transport_error};
use async_trait::async_trait;
use race_core::{AdapterError, AdapterResult, Contestant, Event, EventServicePort, Raceclass};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use uuid::Uuid;

#[derive(Clone)]
pub struct EventsClient {
    base_url: String,
    http: reqwest::Client,
    tokens: TokenProvider,
}

impl EventsClient {
    pub fn new(base_url: impl Into<String>, http: reqwest::Client, tokens: TokenProvider) -> Self {
        EventsClient {
            base_url: base_url.into(),
            http,
            tokens,
        }
    }

    /// GET a path under the service, retrying once with a fresh token when
    /// the cached one has expired.
    async fn get_json<T: DeserializeOwned>(&self, path: &str, what: &str) -> AdapterResult<T> {
        for attempt in 0..2 {
            let token = self.tokens.token().await?;
            let response = self
                .http
                .get(format!("{}{path}", self.base_url))
                .bearer_auth(token)
                .send()
                .await
                .map_err(transport_error)?;
            match response.status() {
                StatusCode::OK => return response.json().await.map_err(transport_error),
                StatusCode::UNAUTHORIZED if attempt == 0 => {
                    self.tokens.invalidate().await;
                    continue;
                }
                other => return Err(status_error(other, what)),
            }
        }
        Err(AdapterError::Auth)
    }
}

#[async_trait]
impl EventServicePort for EventsClient {
    async fn get_event(&self, event_id: Uuid) -> AdapterResult<Event> {
        self.get_json(&format!("/events/{event_id}"), &format!("event {event_id}"))
            .await
    }

    async fn get_raceclasses(&self, event_id: Uuid) -> AdapterResult<Vec<Raceclass>> {
        self.get_json(
            &format!("/events/{event_id}/raceclasses"),
            &format!("raceclasses of event {event_id}"),
        )
        .await
    }

    async fn get_contestants(&self, event_id: Uuid) -> AdapterResult<Vec<Contestant>> {
        self.get_json(
            &format!("/events/{event_id}/contestants"),
            &format!("contestants of event {event_id}"),
        )
        .await
    }
}
