//! Partitioning the ranked finishers of a heat into the races of later
//! rounds.
//!
//! Pure: resolves target round and heat only. Starting positions and
//! capacity checks belong to the persistence step, which may still fail and
//! roll the whole propagation back.

use crate::{ProgressionRule, Qualifying, RuleTarget, SprintRound};
use std::collections::BTreeMap;
use uuid::Uuid;

/// One ranked finisher of a completed heat.
#[derive(Debug, Clone)]
pub struct Qualifier {
    pub time_event_id: Uuid,
    pub bib: u32,
    pub name: String,
    pub club: String,
    /// 1-based rank within the source heat
    pub rank: u32,
}

/// Where one qualifier goes.
#[derive(Debug, Clone)]
pub struct Placement {
    pub qualifier: Qualifier,
    pub target_round: SprintRound,
    /// 1-based heat within the target round
    pub target_heat: u32,
}

/// Apply a progression rule to the ranked finishers of heat `source_heat`.
/// Branches consume ranks from the front; `Rest` takes what is left, `Out`
/// discards. Qualifiers of one branch are spread round-robin over the
/// target round's heats, offset by the source heat so parallel source heats
/// fill the targets evenly.
pub fn partition_qualifiers(
    rule: &ProgressionRule,
    source_heat: u32,
    target_heat_counts: &BTreeMap<SprintRound, u32>,
    ranked: Vec<Qualifier>,
) -> Vec<Placement> {
    let mut placements = Vec::new();
    let mut pool = ranked.into_iter();

    for branch in &rule.branches {
        let take: Vec<Qualifier> = match branch.qualifying {
            Qualifying::Top(k) => pool.by_ref().take(k as usize).collect(),
            Qualifying::Rest => pool.by_ref().collect(),
        };
        let RuleTarget::Round(round) = branch.target else {
            continue;
        };
        let heats = target_heat_counts.get(&round).copied().unwrap_or(1).max(1);
        for (i, qualifier) in take.into_iter().enumerate() {
            let target_heat = (source_heat - 1 + i as u32) % heats + 1;
            placements.push(Placement {
                qualifier,
                target_round: round,
                target_heat,
            });
        }
    }
    placements
}
