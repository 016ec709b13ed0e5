//! Time-event ingestion: per-timing-point rankings and qualifier
//! propagation into later bracket rounds.

mod processor;
mod propagation;

pub use propagation::*;
