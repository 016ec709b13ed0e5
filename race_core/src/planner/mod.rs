//! Raceplan generation: per-format algorithms producing the races of an
//! event and their start times.
//!
//! The framework walks the raceclasses in `(group, order)` sequence with a
//! single global clock and a global order counter; each format builder emits
//! its races at the clock and advances it past its own block. Gaps between
//! classes and groups are applied here, gaps inside a bracket by the sprint
//! builder.

mod interval_start;
mod single_race;
mod sprint;

use crate::{
    CompetitionFormat, CoreError, CoreResult, Event, FormatKind, Race, Raceclass, Raceplan,
    utils::validation::FieldError,
};
use chrono::{Duration, NaiveDateTime};
use uuid::Uuid;

/// The outcome of plan generation, ready to be persisted atomically.
#[derive(Debug, Clone)]
pub struct GeneratedPlan {
    pub raceplan: Raceplan,
    pub races: Vec<Race>,
}

/// Global schedule clock and race order counter.
struct PlanClock {
    now: NaiveDateTime,
    next_order: u32,
}

impl PlanClock {
    fn new(start: NaiveDateTime) -> Self {
        PlanClock {
            now: start,
            next_order: 1,
        }
    }
    fn now(&self) -> NaiveDateTime {
        self.now
    }
    fn advance(&mut self, gap: Duration) {
        self.now += gap;
    }
    fn take_order(&mut self) -> u32 {
        let order = self.next_order;
        self.next_order += 1;
        order
    }
}

/// Build the complete raceplan for an event. Pure: no I/O, ids freshly
/// generated, deterministic in everything but the ids.
pub fn build_raceplan(
    event: &Event,
    format: &CompetitionFormat,
    raceclasses: &[Raceclass],
) -> CoreResult<GeneratedPlan> {
    let kind = format.kind()?;

    let mut classes: Vec<&Raceclass> = raceclasses.iter().collect();
    classes.sort_by_key(|c| (c.group, c.order));

    for class in &classes {
        if class.no_of_contestants > format.max_no_of_contestants_in_raceclass {
            return Err(CoreError::Field(
                FieldError::builder()
                    .set_field("no_of_contestants")
                    .add_out_of_range()
                    .add_message(format!(
                        "raceclass {} has {} contestants, format allows {}",
                        class.name, class.no_of_contestants,
                        format.max_no_of_contestants_in_raceclass
                    ))
                    .build(),
            ));
        }
    }

    let mut raceplan = Raceplan::new(Uuid::new_v4(), event.id);
    let mut clock = PlanClock::new(event.first_start());
    let mut races: Vec<Race> = Vec::new();

    let mut previous_group: Option<u32> = None;
    for class in classes {
        if let Some(group) = previous_group {
            if group != class.group {
                clock.advance(format.time_between_groups);
            } else {
                clock.advance(format.time_between_races);
            }
        }
        previous_group = Some(class.group);

        match kind {
            FormatKind::IntervalStart => {
                races.push(interval_start::build_race(
                    &mut clock, event, format, class, raceplan.id,
                )?);
            }
            FormatKind::IndividualSprint if class.ranking => {
                races.extend(sprint::build_bracket(
                    &mut clock, event, format, class, raceplan.id,
                )?);
            }
            _ => {
                races.push(single_race::build_race(
                    &mut clock, event, class, raceplan.id,
                ));
            }
        }
    }

    raceplan.races = races.iter().map(|r| r.id()).collect();
    Ok(GeneratedPlan { raceplan, races })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SprintRound, StartingOrder};
    use chrono::{NaiveDate, NaiveTime};

    fn event(format_name: &str) -> Event {
        Event {
            id: Uuid::new_v4(),
            name: "Test race day".into(),
            date_of_event: NaiveDate::from_ymd_opt(2023, 8, 17).unwrap(),
            time_of_event: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            competition_format: format_name.into(),
        }
    }

    fn raceclass(event_id: Uuid, name: &str, group: u32, order: u32, n: u32) -> Raceclass {
        Raceclass {
            name: name.into(),
            ageclasses: vec![name.into()],
            event_id,
            group,
            order,
            no_of_contestants: n,
            ranking: true,
        }
    }

    fn interval_format() -> CompetitionFormat {
        CompetitionFormat {
            name: "Interval Start".into(),
            starting_order: StartingOrder::IntervalStart,
            start_procedure: "interval_start".into(),
            time_between_groups: Duration::minutes(10),
            time_between_rounds: Duration::minutes(5),
            time_between_races: Duration::minutes(5),
            time_between_heats: None,
            intervals: Some(Duration::seconds(30)),
            max_no_of_contestants_in_raceclass: 9999,
            max_no_of_contestants_in_race: 9999,
            race_config_ranked: None,
            race_config_non_ranked: None,
        }
    }

    fn sprint_format() -> CompetitionFormat {
        CompetitionFormat {
            name: "Individual Sprint".into(),
            starting_order: StartingOrder::Draw,
            start_procedure: "heat_start".into(),
            time_between_groups: Duration::minutes(10),
            time_between_rounds: Duration::minutes(10),
            time_between_races: Duration::minutes(5),
            time_between_heats: Some(Duration::minutes(2)),
            intervals: None,
            max_no_of_contestants_in_raceclass: 80,
            max_no_of_contestants_in_race: 10,
            race_config_ranked: None,
            race_config_non_ranked: None,
        }
    }

    #[test]
    fn interval_plan_has_one_race_per_class_at_event_start() {
        let event = event("Interval Start");
        let classes = vec![raceclass(event.id, "G16", 1, 1, 10)];
        let plan = build_raceplan(&event, &interval_format(), &classes).unwrap();

        assert_eq!(plan.races.len(), 1);
        let race = &plan.races[0];
        assert_eq!(race.order(), 1);
        assert_eq!(race.max_no_of_contestants(), 10);
        assert_eq!(
            race.start_time(),
            NaiveDate::from_ymd_opt(2023, 8, 17)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap()
        );
        assert_eq!(plan.raceplan.races, vec![race.id()]);
    }

    #[test]
    fn interval_plan_spaces_classes_by_field_duration_and_gap() {
        let event = event("Interval Start");
        let classes = vec![
            raceclass(event.id, "G16", 1, 1, 10),
            raceclass(event.id, "G17", 1, 2, 4),
        ];
        let plan = build_raceplan(&event, &interval_format(), &classes).unwrap();

        // 09:00 + 10 * 30s field + 5 min between races
        assert_eq!(
            plan.races[1].start_time(),
            NaiveDate::from_ymd_opt(2023, 8, 17)
                .unwrap()
                .and_hms_opt(9, 10, 0)
                .unwrap()
        );
    }

    #[test]
    fn sprint_plan_for_32_emits_full_bracket_in_emission_order() {
        let event = event("Individual Sprint");
        let classes = vec![raceclass(event.id, "G16", 1, 1, 32)];
        let plan = build_raceplan(&event, &sprint_format(), &classes).unwrap();

        let rounds: Vec<(SprintRound, u32, u32)> = plan
            .races
            .iter()
            .map(|r| {
                let s = r.as_sprint().unwrap();
                (s.round, s.heat, s.max_no_of_contestants)
            })
            .collect();
        use SprintRound::*;
        assert_eq!(
            rounds,
            vec![
                (Q, 1, 8),
                (Q, 2, 8),
                (Q, 3, 8),
                (Q, 4, 8),
                (SC, 1, 8),
                (SC, 2, 8),
                (SA, 1, 8),
                (SA, 2, 8),
                (FC, 1, 8),
                (FB, 1, 8),
                (FA, 1, 8),
            ]
        );
        // order is a bijection with 1..=11
        let orders: Vec<u32> = plan.races.iter().map(|r| r.order()).collect();
        assert_eq!(orders, (1..=11).collect::<Vec<_>>());
    }

    #[test]
    fn sprint_plan_for_16_has_two_semis_and_two_finals() {
        let event = event("Individual Sprint");
        let classes = vec![raceclass(event.id, "G16", 1, 1, 16)];
        let plan = build_raceplan(&event, &sprint_format(), &classes).unwrap();

        use SprintRound::*;
        let rounds: Vec<SprintRound> =
            plan.races.iter().map(|r| r.as_sprint().unwrap().round).collect();
        assert_eq!(rounds, vec![SA, SA, FB, FA]);
        assert!(plan.races.iter().all(|r| r.max_no_of_contestants() == 8));
    }

    #[test]
    fn sprint_heat_and_round_gaps_are_respected() {
        let event = event("Individual Sprint");
        let classes = vec![raceclass(event.id, "G16", 1, 1, 16)];
        let plan = build_raceplan(&event, &sprint_format(), &classes).unwrap();

        let t0 = event.first_start();
        assert_eq!(plan.races[0].start_time(), t0);
        // second semi two minutes later (time_between_heats)
        assert_eq!(plan.races[1].start_time(), t0 + Duration::minutes(2));
        // final B one round gap after the last semi
        assert_eq!(
            plan.races[2].start_time(),
            t0 + Duration::minutes(2) + Duration::minutes(10)
        );
    }

    #[test]
    fn oversized_field_is_rejected() {
        let event = event("Individual Sprint");
        let classes = vec![raceclass(event.id, "G16", 1, 1, 81)];
        let err = build_raceplan(&event, &sprint_format(), &classes).unwrap_err();
        assert!(matches!(err, CoreError::Field(_) | CoreError::Validation(_)));
    }

    #[test]
    fn group_change_uses_group_gap() {
        let event = event("Interval Start");
        let classes = vec![
            raceclass(event.id, "G16", 1, 1, 2),
            raceclass(event.id, "M senior", 2, 1, 2),
        ];
        let plan = build_raceplan(&event, &interval_format(), &classes).unwrap();
        // 09:00 + 2 * 30s + 10 min group gap
        assert_eq!(
            plan.races[1].start_time(),
            event.first_start() + Duration::seconds(60) + Duration::minutes(10)
        );
    }

    #[test]
    fn non_ranked_sprint_class_gets_a_single_race() {
        let event = event("Individual Sprint");
        let mut class = raceclass(event.id, "G11", 1, 1, 20);
        class.ranking = false;
        let plan = build_raceplan(&event, &sprint_format(), &[class]).unwrap();
        assert_eq!(plan.races.len(), 1);
        assert!(plan.races[0].as_sprint().is_none());
    }
}
