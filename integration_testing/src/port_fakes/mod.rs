//! Fake implementations of the external service ports.

mod events_fake;
mod formats_fake;
mod users_fake;

pub use events_fake::*;
pub use formats_fake::*;
pub use users_fake::*;
