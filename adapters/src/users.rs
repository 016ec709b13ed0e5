//! Client for the users service: token validation and login.

use crate::{status_error, transport_error};
use async_trait::async_trait;
use race_core::{AdapterError, AdapterResult, UsersPort};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

#[derive(Clone)]
pub struct UsersClient {
    base_url: String,
    http: reqwest::Client,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
}

#[derive(Deserialize, Default)]
struct AuthorizeResponse {
    #[serde(default)]
    subject: Option<String>,
}

impl UsersClient {
    pub fn new(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        UsersClient {
            base_url: base_url.into(),
            http,
        }
    }
}

#[async_trait]
impl UsersPort for UsersClient {
    async fn authorize(&self, token: &str) -> AdapterResult<Option<String>> {
        let response = self
            .http
            .post(format!("{}/authorize", self.base_url))
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport_error)?;
        match response.status() {
            StatusCode::NO_CONTENT => Ok(None),
            StatusCode::OK => {
                // some deployments return the token subject
                let body: AuthorizeResponse = response.json().await.unwrap_or_default();
                Ok(body.subject)
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(AdapterError::Auth),
            other => Err(status_error(other, "authorize")),
        }
    }

    async fn login(&self, username: &str, password: &str) -> AdapterResult<String> {
        let response = self
            .http
            .post(format!("{}/login", self.base_url))
            .json(&LoginRequest { username, password })
            .send()
            .await
            .map_err(transport_error)?;
        match response.status() {
            StatusCode::OK => {
                let body: LoginResponse =
                    response.json().await.map_err(transport_error)?;
                Ok(body.token)
            }
            StatusCode::UNAUTHORIZED => Err(AdapterError::Auth),
            other => Err(status_error(other, "login")),
        }
    }
}
