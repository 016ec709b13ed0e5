// in-memory rollback journal for multi-document writes

use crate::{DatabasePort, Race, RaceResult, Raceplan, StartEntry, Startlist, TimeEvent};
use tracing::warn;
use uuid::Uuid;

/// Undo operation for one staged write: creations are undone by deletion,
/// updates by restoring the pre-write document.
pub(crate) enum UndoOp {
    DeleteRaceplan(Uuid),
    DeleteRace(Uuid),
    DeleteStartlist(Uuid),
    DeleteStartEntry(Uuid),
    DeleteRaceResult(Uuid),
    DeleteTimeEvent(Uuid),
    RestoreRaceplan(Raceplan),
    RestoreRace(Race),
    RestoreStartlist(Startlist),
    RestoreStartEntry(StartEntry),
    RestoreRaceResult(RaceResult),
    RestoreTimeEvent(TimeEvent),
}

/// Journal of staged writes of one logical unit. On failure the orchestrator
/// rolls the unit back in reverse order; rollback itself is best effort and
/// logs what it could not undo.
#[derive(Default)]
pub(crate) struct Journal {
    ops: Vec<UndoOp>,
}

impl Journal {
    pub(crate) fn new() -> Self {
        Journal { ops: Vec::new() }
    }

    pub(crate) fn record(&mut self, op: UndoOp) {
        self.ops.push(op);
    }

    pub(crate) fn merge(&mut self, other: Journal) {
        self.ops.extend(other.ops);
    }

    pub(crate) async fn rollback(self, db: &dyn DatabasePort) {
        for op in self.ops.into_iter().rev() {
            let outcome = match op {
                UndoOp::DeleteRaceplan(id) => db.delete_raceplan(id).await,
                UndoOp::DeleteRace(id) => db.delete_race(id).await,
                UndoOp::DeleteStartlist(id) => db.delete_startlist(id).await,
                UndoOp::DeleteStartEntry(id) => db.delete_start_entry(id).await,
                UndoOp::DeleteRaceResult(id) => db.delete_race_result(id).await,
                UndoOp::DeleteTimeEvent(id) => db.delete_time_event(id).await,
                UndoOp::RestoreRaceplan(doc) => db.update_raceplan(&doc).await,
                UndoOp::RestoreRace(doc) => db.update_race(&doc).await,
                UndoOp::RestoreStartlist(doc) => db.update_startlist(&doc).await,
                UndoOp::RestoreStartEntry(doc) => db.update_start_entry(&doc).await,
                UndoOp::RestoreRaceResult(doc) => db.update_race_result(&doc).await,
                UndoOp::RestoreTimeEvent(doc) => db.update_time_event(&doc).await,
            };
            if let Err(err) = outcome {
                warn!(%err, "rollback step failed, continuing");
            }
        }
    }
}
