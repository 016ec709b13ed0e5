//! HTTP adapters for the external collaborators: the events service, the
//! competition-format catalog and the users service.
//!
//! The clients share one connection-pooling `reqwest::Client`. Calls to the
//! events and format services authenticate with an admin token obtained
//! from the users service and cached until an upstream 401 invalidates it.

mod config;
mod events;
mod formats;
mod token;
mod users;

pub use config::*;
pub use events::*;
pub use formats::*;
pub use token::*;
pub use users::*;

use race_core::AdapterError;

/// Translate a transport-level failure into an adapter error.
pub(crate) fn transport_error(err: reqwest::Error) -> AdapterError {
    if err.is_decode() {
        AdapterError::Decode(err.to_string())
    } else {
        AdapterError::Unavailable(err.to_string())
    }
}

/// Translate an unexpected upstream status into an adapter error.
pub(crate) fn status_error(status: reqwest::StatusCode, what: &str) -> AdapterError {
    match status {
        reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => AdapterError::Auth,
        reqwest::StatusCode::NOT_FOUND => AdapterError::NotFound(what.to_string()),
        other => AdapterError::Unavailable(format!("{what}: upstream status {other}")),
    }
}
