// adapter endpoints and credentials from the environment

use anyhow::{Context, Result};
use std::env;

/// Where the external services live and which credentials the service uses
/// for its own adapter calls.
#[derive(Debug, Clone)]
pub struct AdapterConfig {
    pub events_base_url: String,
    pub formats_base_url: String,
    pub users_base_url: String,
    pub admin_username: String,
    pub admin_password: String,
}

fn base_url(host_var: &str, port_var: &str) -> Result<String> {
    let host = env::var(host_var)
        .with_context(|| format!("{host_var} must be set. Hint: did you run dotenv()?"))?;
    let port = env::var(port_var)
        .with_context(|| format!("{port_var} must be set. Hint: did you run dotenv()?"))?;
    Ok(format!("http://{host}:{port}"))
}

impl AdapterConfig {
    pub fn from_env() -> Result<Self> {
        Ok(AdapterConfig {
            events_base_url: base_url("EVENTS_HOST_SERVER", "EVENTS_HOST_PORT")?,
            formats_base_url: base_url(
                "COMPETITION_FORMAT_HOST_SERVER",
                "COMPETITION_FORMAT_HOST_PORT",
            )?,
            users_base_url: base_url("USERS_HOST_SERVER", "USERS_HOST_PORT")?,
            admin_username: env::var("ADMIN_USERNAME")
                .context("ADMIN_USERNAME must be set. Hint: did you run dotenv()?")?,
            admin_password: env::var("ADMIN_PASSWORD")
                .context("ADMIN_PASSWORD must be set. Hint: did you run dotenv()?")?,
        })
    }
}
