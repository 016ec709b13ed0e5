//! Competition formats as served by the format catalog, plus the built-in
//! progression matrix for the individual sprint bracket.

use crate::race::{ProgressionRule, RuleBranch, SprintRound};
use crate::utils::duration;
use crate::utils::validation::{FieldError, FieldResult};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How the first round of an event is ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StartingOrder {
    #[serde(rename = "interval_start")]
    IntervalStart,
    #[serde(rename = "draw")]
    Draw,
}

/// Which generator a competition format maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatKind {
    IntervalStart,
    IndividualSprint,
    MassStart,
    Skiathlon,
    Pursuit,
    TeamSprint,
    Relay,
}

impl FormatKind {
    pub fn from_name(name: &str) -> FieldResult<Self> {
        match name {
            "Interval Start" => Ok(FormatKind::IntervalStart),
            "Individual Sprint" => Ok(FormatKind::IndividualSprint),
            "Mass Start" => Ok(FormatKind::MassStart),
            "Skiathlon" => Ok(FormatKind::Skiathlon),
            "Pursuit" => Ok(FormatKind::Pursuit),
            "Team Sprint" => Ok(FormatKind::TeamSprint),
            "Relay" => Ok(FormatKind::Relay),
            other => Err(FieldError::builder()
                .set_field("competition_format")
                .add_invalid_format()
                .add_message(format!("unsupported competition format '{other}'"))
                .build()),
        }
    }

    /// Skiathlon and pursuit races run in multiple stages on course, but
    /// their plan surface is a single race per class.
    pub fn is_multi_stage(&self) -> bool {
        matches!(self, FormatKind::Skiathlon | FormatKind::Pursuit)
    }
}

/// One row of the progression matrix: the bracket shape used for a ranked
/// raceclass of up to `max_no_of_contestants` contestants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceConfig {
    pub max_no_of_contestants: u32,
    /// heats per round; rounds absent from the map are not run
    pub no_of_heats: BTreeMap<SprintRound, u32>,
    /// progression rule per round; finals carry none
    pub rules: BTreeMap<SprintRound, ProgressionRule>,
}

impl RaceConfig {
    pub fn heats(&self, round: SprintRound) -> u32 {
        self.no_of_heats.get(&round).copied().unwrap_or(0)
    }

    pub fn rule(&self, round: SprintRound) -> ProgressionRule {
        self.rules.get(&round).cloned().unwrap_or_default()
    }

    /// The round contestants are seeded into: the quarterfinals when the
    /// row has any, otherwise straight into semifinal A.
    pub fn first_round(&self) -> SprintRound {
        if self.heats(SprintRound::Q) > 0 {
            SprintRound::Q
        } else {
            SprintRound::SA
        }
    }
}

/// A competition format document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitionFormat {
    pub name: String,
    pub starting_order: StartingOrder,
    pub start_procedure: String,
    #[serde(with = "duration")]
    pub time_between_groups: Duration,
    #[serde(with = "duration")]
    pub time_between_rounds: Duration,
    #[serde(with = "duration")]
    pub time_between_races: Duration,
    /// gap between heats of the same round; falls back to
    /// `time_between_races` when the catalog does not configure it
    #[serde(default, with = "duration::option")]
    pub time_between_heats: Option<Duration>,
    /// start interval between contestants of an interval-start race
    #[serde(default, with = "duration::option")]
    pub intervals: Option<Duration>,
    pub max_no_of_contestants_in_raceclass: u32,
    pub max_no_of_contestants_in_race: u32,
    #[serde(default)]
    pub race_config_ranked: Option<Vec<RaceConfig>>,
    #[serde(default)]
    pub race_config_non_ranked: Option<Vec<RaceConfig>>,
}

impl CompetitionFormat {
    pub fn kind(&self) -> FieldResult<FormatKind> {
        FormatKind::from_name(&self.name)
    }

    pub fn heat_gap(&self) -> Duration {
        self.time_between_heats.unwrap_or(self.time_between_races)
    }

    /// Progression matrix for ranked raceclasses: the catalog's rows when
    /// present, the built-in normative matrix otherwise.
    pub fn sprint_matrix(&self) -> Vec<RaceConfig> {
        match &self.race_config_ranked {
            Some(rows) if !rows.is_empty() => rows.clone(),
            _ => default_sprint_matrix(),
        }
    }
}

fn row(
    max: u32,
    heats: &[(SprintRound, u32)],
    rules: &[(SprintRound, ProgressionRule)],
) -> RaceConfig {
    RaceConfig {
        max_no_of_contestants: max,
        no_of_heats: heats.iter().copied().collect(),
        rules: rules.iter().cloned().collect(),
    }
}

/// The normative progression matrix for the individual sprint format.
///
/// Row selection picks the smallest `max_no_of_contestants` that still fits
/// the raceclass. Fields of more than 80 contestants are not supported.
pub fn default_sprint_matrix() -> Vec<RaceConfig> {
    use SprintRound::*;
    vec![
        row(
            7,
            &[(SA, 1), (FA, 1)],
            &[(SA, ProgressionRule::new(vec![RuleBranch::rest(FA)]))],
        ),
        row(
            16,
            &[(SA, 2), (FA, 1), (FB, 1)],
            &[(
                SA,
                ProgressionRule::new(vec![RuleBranch::top(4, FA), RuleBranch::rest(FB)]),
            )],
        ),
        row(
            24,
            &[(Q, 3), (SA, 2), (FA, 1), (FB, 1), (FC, 1)],
            &[
                (
                    Q,
                    ProgressionRule::new(vec![RuleBranch::top(5, SA), RuleBranch::rest(FC)]),
                ),
                (
                    SA,
                    ProgressionRule::new(vec![RuleBranch::top(4, FA), RuleBranch::rest(FB)]),
                ),
            ],
        ),
        row(
            32,
            &[(Q, 4), (SA, 2), (SC, 2), (FA, 1), (FB, 1), (FC, 1)],
            &[
                (
                    Q,
                    ProgressionRule::new(vec![RuleBranch::top(4, SA), RuleBranch::rest(SC)]),
                ),
                (
                    SA,
                    ProgressionRule::new(vec![RuleBranch::top(4, FA), RuleBranch::rest(FB)]),
                ),
                (
                    SC,
                    ProgressionRule::new(vec![RuleBranch::top(4, FC), RuleBranch::rest_out()]),
                ),
            ],
        ),
        row(
            40,
            &[(Q, 5), (SA, 3), (SC, 2), (FA, 1), (FB, 1), (FC, 1)],
            &[
                (
                    Q,
                    ProgressionRule::new(vec![RuleBranch::top(5, SA), RuleBranch::rest(SC)]),
                ),
                (
                    SA,
                    ProgressionRule::new(vec![
                        RuleBranch::top(3, FA),
                        RuleBranch::top(3, FB),
                        RuleBranch::rest_out(),
                    ]),
                ),
                (
                    SC,
                    ProgressionRule::new(vec![RuleBranch::top(4, FC), RuleBranch::rest_out()]),
                ),
            ],
        ),
        row(
            48,
            &[(Q, 6), (SA, 3), (SC, 3), (FA, 1), (FB, 1), (FC, 1)],
            &[
                (
                    Q,
                    ProgressionRule::new(vec![RuleBranch::top(4, SA), RuleBranch::rest(SC)]),
                ),
                (
                    SA,
                    ProgressionRule::new(vec![
                        RuleBranch::top(3, FA),
                        RuleBranch::top(3, FB),
                        RuleBranch::rest_out(),
                    ]),
                ),
                (
                    SC,
                    ProgressionRule::new(vec![RuleBranch::top(3, FC), RuleBranch::rest_out()]),
                ),
            ],
        ),
        row(
            56,
            &[(Q, 7), (SA, 4), (SC, 3), (FA, 1), (FB, 1), (FC, 1)],
            &[
                (
                    Q,
                    ProgressionRule::new(vec![RuleBranch::top(5, SA), RuleBranch::rest(SC)]),
                ),
                (
                    SA,
                    ProgressionRule::new(vec![
                        RuleBranch::top(2, FA),
                        RuleBranch::top(2, FB),
                        RuleBranch::rest_out(),
                    ]),
                ),
                (
                    SC,
                    ProgressionRule::new(vec![RuleBranch::top(3, FC), RuleBranch::rest_out()]),
                ),
            ],
        ),
        row(
            80,
            &[(Q, 8), (SA, 4), (SC, 4), (FA, 1), (FB, 1), (FC, 1)],
            &[
                (
                    Q,
                    ProgressionRule::new(vec![RuleBranch::top(4, SA), RuleBranch::rest(SC)]),
                ),
                (
                    SA,
                    ProgressionRule::new(vec![
                        RuleBranch::top(2, FA),
                        RuleBranch::top(2, FB),
                        RuleBranch::rest_out(),
                    ]),
                ),
                (
                    SC,
                    ProgressionRule::new(vec![RuleBranch::top(2, FC), RuleBranch::rest_out()]),
                ),
            ],
        ),
    ]
}

/// Select the matrix row for a field of `n` contestants: the smallest row
/// that still fits.
pub fn select_sprint_row(matrix: &[RaceConfig], n: u32) -> Option<RaceConfig> {
    matrix
        .iter()
        .filter(|row| row.max_no_of_contestants >= n)
        .min_by_key(|row| row.max_no_of_contestants)
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use SprintRound::*;

    #[test]
    fn row_selection_picks_smallest_fitting_row() {
        let matrix = default_sprint_matrix();
        assert_eq!(select_sprint_row(&matrix, 7).unwrap().max_no_of_contestants, 7);
        assert_eq!(select_sprint_row(&matrix, 8).unwrap().max_no_of_contestants, 16);
        assert_eq!(select_sprint_row(&matrix, 16).unwrap().max_no_of_contestants, 16);
        assert_eq!(select_sprint_row(&matrix, 25).unwrap().max_no_of_contestants, 32);
        assert_eq!(select_sprint_row(&matrix, 80).unwrap().max_no_of_contestants, 80);
        assert!(select_sprint_row(&matrix, 81).is_none());
    }

    #[test]
    fn small_fields_skip_the_quarterfinals() {
        let matrix = default_sprint_matrix();
        let row16 = select_sprint_row(&matrix, 16).unwrap();
        assert_eq!(row16.heats(Q), 0);
        assert_eq!(row16.heats(SA), 2);
        assert_eq!(row16.first_round(), SA);

        let row32 = select_sprint_row(&matrix, 32).unwrap();
        assert_eq!(row32.heats(Q), 4);
        assert_eq!(row32.first_round(), Q);
    }

    #[test]
    fn format_falls_back_to_builtin_matrix() {
        let format = CompetitionFormat {
            name: "Individual Sprint".into(),
            starting_order: StartingOrder::Draw,
            start_procedure: "heat_start".into(),
            time_between_groups: Duration::minutes(10),
            time_between_rounds: Duration::minutes(10),
            time_between_races: Duration::minutes(5),
            time_between_heats: None,
            intervals: None,
            max_no_of_contestants_in_raceclass: 80,
            max_no_of_contestants_in_race: 10,
            race_config_ranked: None,
            race_config_non_ranked: None,
        };
        assert_eq!(format.sprint_matrix().len(), 8);
        assert_eq!(format.heat_gap(), Duration::minutes(5));
    }
}
