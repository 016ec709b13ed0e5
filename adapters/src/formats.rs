//! Client for the competition-format catalog.

use crate::{TokenProvider, status_error, transport_error};
use async_trait::async_trait;
use race_core::{AdapterError, AdapterResult, CompetitionFormat, CompetitionFormatPort};
use reqwest::StatusCode;

#[derive(Clone)]
pub struct CompetitionFormatsClient {
    base_url: String,
    http: reqwest::Client,
    tokens: TokenProvider,
}

impl CompetitionFormatsClient {
    pub fn new(base_url: impl Into<String>, http: reqwest::Client, tokens: TokenProvider) -> Self {
        CompetitionFormatsClient {
            base_url: base_url.into(),
            http,
            tokens,
        }
    }
}

#[async_trait]
impl CompetitionFormatPort for CompetitionFormatsClient {
    async fn get_competition_format(&self, name: &str) -> AdapterResult<CompetitionFormat> {
        for attempt in 0..2 {
            let token = self.tokens.token().await?;
            let response = self
                .http
                .get(format!("{}/competition-formats", self.base_url))
                .query(&[("name", name)])
                .bearer_auth(token)
                .send()
                .await
                .map_err(transport_error)?;
            match response.status() {
                StatusCode::OK => {
                    // the catalog answers name queries with a list
                    let formats: Vec<CompetitionFormat> =
                        response.json().await.map_err(transport_error)?;
                    return formats.into_iter().next().ok_or_else(|| {
                        AdapterError::NotFound(format!("competition format '{name}'"))
                    });
                }
                StatusCode::UNAUTHORIZED if attempt == 0 => {
                    self.tokens.invalidate().await;
                    continue;
                }
                other => {
                    return Err(status_error(other, &format!("competition format '{name}'")));
                }
            }
        }
        Err(AdapterError::Auth)
    }
}
