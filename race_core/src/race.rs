//! Race documents and the sprint bracket vocabulary.
//!
//! A race is one starting group; for the individual sprint format one heat.
//! The two shapes share their scheduling fields and differ only in the
//! bracket extras, so they are modeled as a tagged sum type and referenced
//! everywhere else by id only.

use crate::utils::validation::{FieldError, FieldResult};
use chrono::NaiveDateTime;
use displaydoc::Display;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// A round of the individual sprint bracket. Encodes both the round letter
/// and the heat-group index (`SA` = semifinal A, `FC` = final C, ...).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display,
)]
pub enum SprintRound {
    /// Q
    Q,
    /// SA
    SA,
    /// SC
    SC,
    /// FA
    FA,
    /// FB
    FB,
    /// FC
    FC,
}

impl SprintRound {
    /// Order in which the races of a bracket are emitted into the schedule:
    /// all quarterfinals, then semifinal C, semifinal A, then the finals
    /// from C up to A.
    pub const EMISSION_ORDER: [SprintRound; 6] = [
        SprintRound::Q,
        SprintRound::SC,
        SprintRound::SA,
        SprintRound::FC,
        SprintRound::FB,
        SprintRound::FA,
    ];

    /// Round letter: Q, S or F.
    pub fn letter(&self) -> char {
        match self {
            SprintRound::Q => 'Q',
            SprintRound::SA | SprintRound::SC => 'S',
            SprintRound::FA | SprintRound::FB | SprintRound::FC => 'F',
        }
    }

    /// Heat-group index within the round letter ("" for quarterfinals).
    pub fn index(&self) -> &'static str {
        match self {
            SprintRound::Q => "",
            SprintRound::SA | SprintRound::FA => "A",
            SprintRound::FB => "B",
            SprintRound::SC | SprintRound::FC => "C",
        }
    }

    pub fn parse(s: &str) -> FieldResult<Self> {
        match s {
            "Q" => Ok(SprintRound::Q),
            "SA" => Ok(SprintRound::SA),
            "SC" => Ok(SprintRound::SC),
            "FA" => Ok(SprintRound::FA),
            "FB" => Ok(SprintRound::FB),
            "FC" => Ok(SprintRound::FC),
            other => Err(FieldError::builder()
                .set_field("round")
                .add_invalid_format()
                .add_message(format!("unknown sprint round '{other}'"))
                .build()),
        }
    }
}

/// Where the contestants matched by a rule branch go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleTarget {
    /// a later round of the same bracket
    Round(SprintRound),
    /// eliminated
    Out,
}

/// How many ranked finishers a rule branch consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Qualifying {
    /// the next `k` ranked finishers
    Top(u32),
    /// all remaining finishers of the heat
    Rest,
}

/// One branch of a progression rule. Branches are applied in order, each
/// consuming ranked finishers from the front of what is left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleBranch {
    pub target: RuleTarget,
    pub qualifying: Qualifying,
}

impl RuleBranch {
    pub fn top(k: u32, round: SprintRound) -> Self {
        RuleBranch {
            target: RuleTarget::Round(round),
            qualifying: Qualifying::Top(k),
        }
    }
    pub fn rest(round: SprintRound) -> Self {
        RuleBranch {
            target: RuleTarget::Round(round),
            qualifying: Qualifying::Rest,
        }
    }
    pub fn rest_out() -> Self {
        RuleBranch {
            target: RuleTarget::Out,
            qualifying: Qualifying::Rest,
        }
    }
}

/// Progression rule of a race: how its ranked finishers are partitioned
/// into the races of later rounds. Empty for finals.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProgressionRule {
    pub branches: Vec<RuleBranch>,
}

impl ProgressionRule {
    pub fn new(branches: Vec<RuleBranch>) -> Self {
        ProgressionRule { branches }
    }
    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }
}

/// A single-stream race: one contestant starting per interval, or the whole
/// field at once for mass-start style formats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalStartRace {
    pub id: Uuid,
    pub raceclass: String,
    /// position in the event schedule, 1-based and unique across the event
    pub order: u32,
    pub start_time: NaiveDateTime,
    pub no_of_contestants: u32,
    pub max_no_of_contestants: u32,
    pub event_id: Uuid,
    pub raceplan_id: Uuid,
    pub start_entries: Vec<Uuid>,
    /// timing point -> race result id
    pub results: HashMap<String, Uuid>,
}

/// One heat of an individual sprint bracket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndividualSprintRace {
    pub id: Uuid,
    pub raceclass: String,
    pub order: u32,
    pub start_time: NaiveDateTime,
    pub no_of_contestants: u32,
    pub max_no_of_contestants: u32,
    pub event_id: Uuid,
    pub raceplan_id: Uuid,
    pub start_entries: Vec<Uuid>,
    pub results: HashMap<String, Uuid>,
    pub round: SprintRound,
    /// heat number within the round, 1-based
    pub heat: u32,
    pub rule: ProgressionRule,
}

impl IndividualSprintRace {
    /// Display name of the heat, e.g. `G16-SA2`.
    pub fn heat_name(&self) -> String {
        format!("{}-{}{}", self.raceclass, self.round, self.heat)
    }
}

/// A race document. The `datatype` tag selects the shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "datatype")]
pub enum Race {
    #[serde(rename = "interval_start")]
    IntervalStart(IntervalStartRace),
    #[serde(rename = "individual_sprint")]
    IndividualSprint(IndividualSprintRace),
}

impl Race {
    pub fn id(&self) -> Uuid {
        match self {
            Race::IntervalStart(r) => r.id,
            Race::IndividualSprint(r) => r.id,
        }
    }
    pub fn event_id(&self) -> Uuid {
        match self {
            Race::IntervalStart(r) => r.event_id,
            Race::IndividualSprint(r) => r.event_id,
        }
    }
    pub fn raceplan_id(&self) -> Uuid {
        match self {
            Race::IntervalStart(r) => r.raceplan_id,
            Race::IndividualSprint(r) => r.raceplan_id,
        }
    }
    pub fn raceclass(&self) -> &str {
        match self {
            Race::IntervalStart(r) => &r.raceclass,
            Race::IndividualSprint(r) => &r.raceclass,
        }
    }
    pub fn order(&self) -> u32 {
        match self {
            Race::IntervalStart(r) => r.order,
            Race::IndividualSprint(r) => r.order,
        }
    }
    pub fn start_time(&self) -> NaiveDateTime {
        match self {
            Race::IntervalStart(r) => r.start_time,
            Race::IndividualSprint(r) => r.start_time,
        }
    }
    pub fn set_start_time(&mut self, start_time: NaiveDateTime) {
        match self {
            Race::IntervalStart(r) => r.start_time = start_time,
            Race::IndividualSprint(r) => r.start_time = start_time,
        }
    }
    pub fn no_of_contestants(&self) -> u32 {
        match self {
            Race::IntervalStart(r) => r.no_of_contestants,
            Race::IndividualSprint(r) => r.no_of_contestants,
        }
    }
    pub fn set_no_of_contestants(&mut self, n: u32) {
        match self {
            Race::IntervalStart(r) => r.no_of_contestants = n,
            Race::IndividualSprint(r) => r.no_of_contestants = n,
        }
    }
    pub fn max_no_of_contestants(&self) -> u32 {
        match self {
            Race::IntervalStart(r) => r.max_no_of_contestants,
            Race::IndividualSprint(r) => r.max_no_of_contestants,
        }
    }
    pub fn start_entries(&self) -> &Vec<Uuid> {
        match self {
            Race::IntervalStart(r) => &r.start_entries,
            Race::IndividualSprint(r) => &r.start_entries,
        }
    }
    pub fn start_entries_mut(&mut self) -> &mut Vec<Uuid> {
        match self {
            Race::IntervalStart(r) => &mut r.start_entries,
            Race::IndividualSprint(r) => &mut r.start_entries,
        }
    }
    pub fn results(&self) -> &HashMap<String, Uuid> {
        match self {
            Race::IntervalStart(r) => &r.results,
            Race::IndividualSprint(r) => &r.results,
        }
    }
    pub fn results_mut(&mut self) -> &mut HashMap<String, Uuid> {
        match self {
            Race::IntervalStart(r) => &mut r.results,
            Race::IndividualSprint(r) => &mut r.results,
        }
    }
    pub fn as_sprint(&self) -> Option<&IndividualSprintRace> {
        match self {
            Race::IndividualSprint(r) => Some(r),
            _ => None,
        }
    }
    pub fn as_sprint_mut(&mut self) -> Option<&mut IndividualSprintRace> {
        match self {
            Race::IndividualSprint(r) => Some(r),
            _ => None,
        }
    }
    pub fn datatype(&self) -> &'static str {
        match self {
            Race::IntervalStart(_) => "interval_start",
            Race::IndividualSprint(_) => "individual_sprint",
        }
    }
    /// Timing points that may report into this race.
    pub fn accepted_timing_points(&self) -> &'static [&'static str] {
        match self {
            Race::IntervalStart(_) => &["Start", "Finish"],
            Race::IndividualSprint(_) => &["Start", "Finish", "Template"],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sprint_round_letter_and_index() {
        assert_eq!(SprintRound::Q.letter(), 'Q');
        assert_eq!(SprintRound::Q.index(), "");
        assert_eq!(SprintRound::SA.letter(), 'S');
        assert_eq!(SprintRound::SA.index(), "A");
        assert_eq!(SprintRound::FC.letter(), 'F');
        assert_eq!(SprintRound::FC.index(), "C");
    }

    #[test]
    fn race_serde_roundtrip_keeps_datatype_tag() {
        let race = Race::IntervalStart(IntervalStartRace {
            id: Uuid::new_v4(),
            raceclass: "G16".into(),
            order: 1,
            start_time: chrono::NaiveDate::from_ymd_opt(2023, 8, 17)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            no_of_contestants: 0,
            max_no_of_contestants: 10,
            event_id: Uuid::new_v4(),
            raceplan_id: Uuid::new_v4(),
            start_entries: vec![],
            results: HashMap::new(),
        });
        let json = serde_json::to_value(&race).unwrap();
        assert_eq!(json["datatype"], "interval_start");
        let back: Race = serde_json::from_value(json).unwrap();
        assert_eq!(back, race);
    }
}
