// append-only change history attached to start entries and time events

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One recorded change. Entries are only ever appended, never rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangelogEntry {
    pub timestamp: NaiveDateTime,
    /// subject of the bearer token, or "system" when no user is known
    pub user_id: String,
    pub comment: String,
}

impl ChangelogEntry {
    pub fn new(timestamp: NaiveDateTime, user_id: impl Into<String>, comment: impl Into<String>) -> Self {
        ChangelogEntry {
            timestamp,
            user_id: user_id.into(),
            comment: comment.into(),
        }
    }
}
