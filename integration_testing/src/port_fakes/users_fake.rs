//! Fake implementation of UsersPort for testing

use async_trait::async_trait;
use race_core::{AdapterError, AdapterResult, UsersPort};
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct FakeUsers {
    accept: Arc<Mutex<bool>>,
}

impl FakeUsers {
    pub fn new() -> Self {
        FakeUsers {
            accept: Arc::new(Mutex::new(true)),
        }
    }

    pub fn reject_tokens(&self) {
        *self.accept.lock().unwrap() = false;
    }
}

impl Default for FakeUsers {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UsersPort for FakeUsers {
    async fn authorize(&self, _token: &str) -> AdapterResult<Option<String>> {
        if *self.accept.lock().unwrap() {
            Ok(Some("test-admin".to_string()))
        } else {
            Err(AdapterError::Auth)
        }
    }

    async fn login(&self, _username: &str, _password: &str) -> AdapterResult<String> {
        Ok("test-token".to_string())
    }
}
