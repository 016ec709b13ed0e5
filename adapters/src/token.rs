//! Admin token acquisition with caching.
//!
//! Adapter calls against the events and format services run under the
//! service's own admin account. The token is fetched lazily, reused until
//! an upstream 401 invalidates it, and refreshed at most once per call.

use race_core::{AdapterResult, UsersPort};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Clone)]
pub struct TokenProvider {
    users: Arc<dyn UsersPort>,
    username: String,
    password: String,
    cached: Arc<RwLock<Option<String>>>,
}

impl TokenProvider {
    pub fn new(
        users: Arc<dyn UsersPort>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        TokenProvider {
            users,
            username: username.into(),
            password: password.into(),
            cached: Arc::new(RwLock::new(None)),
        }
    }

    pub async fn token(&self) -> AdapterResult<String> {
        if let Some(token) = self.cached.read().await.clone() {
            return Ok(token);
        }
        let mut slot = self.cached.write().await;
        // another task may have logged in while we waited for the write lock
        if let Some(token) = slot.clone() {
            return Ok(token);
        }
        debug!("logging in for a fresh adapter token");
        let token = self.users.login(&self.username, &self.password).await?;
        *slot = Some(token.clone());
        Ok(token)
    }

    pub async fn invalidate(&self) {
        self.cached.write().await.take();
    }
}
