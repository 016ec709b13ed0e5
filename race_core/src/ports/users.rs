// users service port

use crate::ports::events::AdapterResult;
use async_trait::async_trait;

/// users service port trait. The core never sees user records; it only
/// delegates token validation and obtains tokens for its own adapter calls.
#[async_trait]
pub trait UsersPort: Send + Sync {
    /// Validate a bearer token. Returns the token subject when the users
    /// service exposes one, `None` for anonymous service tokens.
    async fn authorize(&self, token: &str) -> AdapterResult<Option<String>>;

    /// Obtain a bearer token for the given credentials.
    async fn login(&self, username: &str, password: &str) -> AdapterResult<String>;
}
