// trait definitions for ports

mod database;
mod events;
mod formats;
mod users;

pub use database::*;
pub use events::*;
pub use formats::*;
pub use users::*;
