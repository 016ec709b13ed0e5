// contains core functionality

mod changelog;
mod commands;
mod errors;
mod event;
mod format;
mod journal;
mod locks;
mod planner;
mod ports;
mod race;
mod race_result;
mod raceplan;
mod results;
mod start_entry;
mod startlist;
mod startlist_gen;
mod time_event;
pub mod utils;

pub use changelog::*;
pub use commands::*;
pub use errors::*;
pub use event::*;
pub use format::*;
pub use locks::*;
pub use planner::*;
pub use ports::*;
pub use race::*;
pub use race_result::*;
pub use raceplan::*;
pub use results::*;
pub use start_entry::*;
pub use startlist::*;
pub use startlist_gen::*;
pub use time_event::*;

use std::sync::Arc;

/// Core does provide:
/// - commands to generate the raceplan and startlist of an event
/// - CRUD commands for raceplans, races, startlists, start entries,
///   race results and time events, preserving cross-document invariants
/// - the time-event processor maintaining race results and feeding
///   qualifiers into later bracket rounds
///
/// Core holds connections to all required ports (database, events service,
/// competition format catalog, users service).
pub struct Core {
    pub database: Arc<dyn DatabasePort>,
    pub event_service: Arc<dyn EventServicePort>,
    pub format_service: Arc<dyn CompetitionFormatPort>,
    pub users: Arc<dyn UsersPort>,
    /// serializes generation commands per event
    pub(crate) event_locks: KeyedLocks<uuid::Uuid>,
    /// serializes time-event processing per (race_id, timing_point)
    pub(crate) result_locks: KeyedLocks<(uuid::Uuid, String)>,
    /// serializes invariant-preserving writes per race
    pub(crate) race_locks: KeyedLocks<uuid::Uuid>,
}

pub type CoreHandle = Arc<Core>;

pub struct NoDB {}
pub struct NoES {}
pub struct NoCF {}
pub struct NoUS {}

pub struct DynDB(Arc<dyn DatabasePort>);
pub struct DynES(Arc<dyn EventServicePort>);
pub struct DynCF(Arc<dyn CompetitionFormatPort>);
pub struct DynUS(Arc<dyn UsersPort>);

pub struct CoreBuilder<DB, ES, CF, US> {
    state_db: DB,
    state_es: ES,
    state_cf: CF,
    state_us: US,
}

impl CoreBuilder<NoDB, NoES, NoCF, NoUS> {
    pub fn new() -> Self {
        CoreBuilder {
            state_db: NoDB {},
            state_es: NoES {},
            state_cf: NoCF {},
            state_us: NoUS {},
        }
    }
}

impl Default for CoreBuilder<NoDB, NoES, NoCF, NoUS> {
    fn default() -> Self {
        Self::new()
    }
}

impl<DB, ES, CF, US> CoreBuilder<DB, ES, CF, US> {
    pub fn set_db(self, database: Arc<dyn DatabasePort>) -> CoreBuilder<DynDB, ES, CF, US> {
        CoreBuilder {
            state_db: DynDB(database),
            state_es: self.state_es,
            state_cf: self.state_cf,
            state_us: self.state_us,
        }
    }

    pub fn set_events(
        self,
        event_service: Arc<dyn EventServicePort>,
    ) -> CoreBuilder<DB, DynES, CF, US> {
        CoreBuilder {
            state_db: self.state_db,
            state_es: DynES(event_service),
            state_cf: self.state_cf,
            state_us: self.state_us,
        }
    }

    pub fn set_formats(
        self,
        format_service: Arc<dyn CompetitionFormatPort>,
    ) -> CoreBuilder<DB, ES, DynCF, US> {
        CoreBuilder {
            state_db: self.state_db,
            state_es: self.state_es,
            state_cf: DynCF(format_service),
            state_us: self.state_us,
        }
    }

    pub fn set_users(self, users: Arc<dyn UsersPort>) -> CoreBuilder<DB, ES, CF, DynUS> {
        CoreBuilder {
            state_db: self.state_db,
            state_es: self.state_es,
            state_cf: self.state_cf,
            state_us: DynUS(users),
        }
    }
}

impl CoreBuilder<DynDB, DynES, DynCF, DynUS> {
    pub fn build(self) -> Core {
        Core {
            database: self.state_db.0,
            event_service: self.state_es.0,
            format_service: self.state_cf.0,
            users: self.state_us.0,
            event_locks: KeyedLocks::new(),
            result_locks: KeyedLocks::new(),
            race_locks: KeyedLocks::new(),
        }
    }
}
