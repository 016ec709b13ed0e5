//! Individual sprint: a round-by-round bracket per ranked raceclass, shaped
//! by the progression matrix.

use super::PlanClock;
use crate::{
    CompetitionFormat, CoreError, CoreResult, Event, IndividualSprintRace, Qualifying, Race,
    RaceConfig, Raceclass, RuleTarget, SprintRound, select_sprint_row,
    utils::validation::FieldError,
};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

/// Emit the bracket races of one raceclass. Races appear in emission order
/// (Q, SC, SA, FC, FB, FA); heats of a round are separated by the heat gap,
/// rounds by `time_between_rounds`.
pub(super) fn build_bracket(
    clock: &mut PlanClock,
    event: &Event,
    format: &CompetitionFormat,
    raceclass: &Raceclass,
    raceplan_id: Uuid,
) -> CoreResult<Vec<Race>> {
    let n = raceclass.no_of_contestants;
    let matrix = format.sprint_matrix();
    let row = select_sprint_row(&matrix, n).ok_or_else(|| {
        CoreError::Field(
            FieldError::builder()
                .set_field("no_of_contestants")
                .add_out_of_range()
                .add_message(format!(
                    "no progression row fits {} contestants in raceclass {}",
                    n, raceclass.name
                ))
                .add_params("max".into(), largest_row(&matrix).to_string())
                .build(),
        )
    })?;

    let entrants = round_entrants(n, &row);
    let mut races = Vec::new();
    let mut first_round = true;

    for round in SprintRound::EMISSION_ORDER {
        let heats = row.heats(round);
        if heats == 0 {
            continue;
        }
        if !first_round {
            clock.advance(format.time_between_rounds);
        }
        let max_in_heat = entrants.get(&round).copied().unwrap_or(0).div_ceil(heats);
        for heat in 1..=heats {
            if heat > 1 {
                clock.advance(format.heat_gap());
            }
            races.push(Race::IndividualSprint(IndividualSprintRace {
                id: Uuid::new_v4(),
                raceclass: raceclass.name.clone(),
                order: clock.take_order(),
                start_time: clock.now(),
                no_of_contestants: 0,
                max_no_of_contestants: max_in_heat,
                event_id: event.id,
                raceplan_id,
                start_entries: Vec::new(),
                results: HashMap::new(),
                round,
                heat,
                rule: row.rule(round),
            }));
        }
        first_round = false;
    }
    Ok(races)
}

fn largest_row(matrix: &[RaceConfig]) -> u32 {
    matrix
        .iter()
        .map(|row| row.max_no_of_contestants)
        .max()
        .unwrap_or(0)
}

/// Statically derive how many contestants enter each round: the first round
/// takes the whole field, later rounds what the rules feed forward. Heat
/// capacity is the round's entrant count split over its heats.
fn round_entrants(n: u32, row: &RaceConfig) -> BTreeMap<SprintRound, u32> {
    let mut entrants: BTreeMap<SprintRound, u32> = BTreeMap::new();
    entrants.insert(row.first_round(), n);

    // feed-forward order: quarterfinals fill the semis, semis the finals
    for round in [SprintRound::Q, SprintRound::SA, SprintRound::SC] {
        let heats = row.heats(round);
        let Some(&pool) = entrants.get(&round) else {
            continue;
        };
        if heats == 0 || pool == 0 {
            continue;
        }
        let mut remaining = pool;
        for branch in &row.rule(round).branches {
            let take = match branch.qualifying {
                Qualifying::Top(k) => (k * heats).min(remaining),
                Qualifying::Rest => remaining,
            };
            remaining -= take;
            if let RuleTarget::Round(target) = branch.target {
                *entrants.entry(target).or_insert(0) += take;
            }
        }
    }
    entrants
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::default_sprint_matrix;
    use SprintRound::*;

    fn entrants_for(n: u32) -> BTreeMap<SprintRound, u32> {
        let row = select_sprint_row(&default_sprint_matrix(), n).unwrap();
        round_entrants(n, &row)
    }

    #[test]
    fn entrants_flow_for_32() {
        let entrants = entrants_for(32);
        assert_eq!(entrants[&Q], 32);
        assert_eq!(entrants[&SA], 16);
        assert_eq!(entrants[&SC], 16);
        assert_eq!(entrants[&FA], 8);
        assert_eq!(entrants[&FB], 8);
        assert_eq!(entrants[&FC], 8);
    }

    #[test]
    fn entrants_flow_for_24_routes_quarterfinal_rest_to_final_c() {
        let entrants = entrants_for(24);
        assert_eq!(entrants[&Q], 24);
        assert_eq!(entrants[&SA], 15);
        assert_eq!(entrants[&FC], 9);
        assert_eq!(entrants[&FA], 8);
        assert_eq!(entrants[&FB], 7);
        assert!(!entrants.contains_key(&SC));
    }

    #[test]
    fn entrants_flow_for_seven_goes_straight_to_semi() {
        let entrants = entrants_for(7);
        assert_eq!(entrants[&SA], 7);
        assert_eq!(entrants[&FA], 7);
        assert!(!entrants.contains_key(&Q));
    }
}
