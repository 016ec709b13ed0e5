//! Command orchestration: generation commands and entity CRUD with
//! cross-document invariants.
//!
//! Multi-document writes stage through the rollback journal; a failed step
//! undoes every staged write before the command returns.

mod race_results;
mod raceplans;
mod races;
mod start_entries;
mod startlists;
mod time_events;
