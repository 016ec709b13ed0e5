//! Startlist generation: seeding the first round of every raceclass.
//!
//! Contestants arrive from the events service in seeded roster order and are
//! dealt over the first-round heats in serpentine order (1..H, H..1, ...).
//! Positions inside a heat are dense in deal order.

use crate::{
    CompetitionFormat, Contestant, CoreError, CoreResult, Event, FormatKind, Race, Raceclass,
    StartEntry, Startlist,
    utils::validation::{FieldError, ValidationErrors},
};
use uuid::Uuid;

/// The outcome of startlist generation. `races` passed in are updated with
/// their entries and contestant counts.
#[derive(Debug, Clone)]
pub struct GeneratedStartlist {
    pub startlist: Startlist,
    pub start_entries: Vec<StartEntry>,
}

pub fn build_startlist(
    event: &Event,
    format: &CompetitionFormat,
    raceclasses: &[Raceclass],
    contestants: &[Contestant],
    races: &mut [Race],
) -> CoreResult<GeneratedStartlist> {
    let kind = format.kind()?;

    let mut errors = ValidationErrors::new();
    for contestant in contestants {
        if contestant.bib.is_none() {
            errors.add(
                FieldError::builder()
                    .set_field("bib")
                    .add_required()
                    .add_message(format!(
                        "contestant {} has no bib assigned",
                        contestant.full_name()
                    ))
                    .build(),
            );
        }
    }
    if !errors.is_empty() {
        return Err(CoreError::Validation(errors));
    }

    let mut startlist = Startlist::new(Uuid::new_v4(), event.id);
    let mut entries: Vec<StartEntry> = Vec::new();

    let mut classes: Vec<&Raceclass> = raceclasses.iter().collect();
    classes.sort_by_key(|c| (c.group, c.order));

    for class in classes {
        let roster: Vec<&Contestant> = contestants
            .iter()
            .filter(|c| class.ageclasses.contains(&c.ageclass))
            .collect();
        if roster.is_empty() {
            continue;
        }

        let heat_indices = first_round_races(races, &class.name);
        if heat_indices.is_empty() {
            return Err(CoreError::Internal(format!(
                "no first-round race for raceclass {}",
                class.name
            )));
        }

        for (deal_no, contestant) in roster.iter().enumerate() {
            let slot = serpentine_slot(deal_no, heat_indices.len());
            let race = &mut races[heat_indices[slot]];

            if race.no_of_contestants() >= race.max_no_of_contestants() {
                return Err(CoreError::Conflict(format!(
                    "race {} of raceclass {} is full",
                    race.order(),
                    class.name
                )));
            }

            let position = race.no_of_contestants() + 1;
            let scheduled_start_time = match kind {
                FormatKind::IntervalStart => {
                    let interval = format.intervals.ok_or_else(|| {
                        CoreError::Field(
                            FieldError::builder()
                                .set_field("intervals")
                                .add_required()
                                .add_message("interval start format without start interval")
                                .build(),
                        )
                    })?;
                    race.start_time() + interval * (position as i32 - 1)
                }
                _ => race.start_time(),
            };

            let entry = StartEntry {
                id: Uuid::new_v4(),
                race_id: race.id(),
                startlist_id: startlist.id,
                // checked above
                bib: contestant.bib.unwrap_or_default(),
                name: contestant.full_name(),
                club: contestant.club.clone(),
                starting_position: position,
                scheduled_start_time,
                actual_start_time: None,
                status: Default::default(),
                changelog: Vec::new(),
            };
            race.start_entries_mut().push(entry.id);
            race.set_no_of_contestants(position);
            startlist.start_entries.push(entry.id);
            entries.push(entry);
        }
    }

    startlist.no_of_contestants = entries.len() as u32;
    Ok(GeneratedStartlist {
        startlist,
        start_entries: entries,
    })
}

/// Indices into `races` of the first-round races of a raceclass: the sole
/// race of single-race classes, or the heats of the bracket's earliest
/// emitted round, ordered by heat.
fn first_round_races(races: &[Race], raceclass: &str) -> Vec<usize> {
    let mut class_races: Vec<usize> = races
        .iter()
        .enumerate()
        .filter(|(_, r)| r.raceclass() == raceclass)
        .map(|(i, _)| i)
        .collect();
    class_races.sort_by_key(|&i| races[i].order());

    let Some(&first) = class_races.first() else {
        return Vec::new();
    };
    let Some(first_round) = races[first].as_sprint().map(|sprint| sprint.round) else {
        return vec![first];
    };
    let mut heats: Vec<usize> = class_races
        .into_iter()
        .filter(|&i| {
            races[i]
                .as_sprint()
                .is_some_and(|sprint| sprint.round == first_round)
        })
        .collect();
    heats.sort_by_key(|&i| races[i].as_sprint().map(|sprint| sprint.heat));
    heats
}

/// Serpentine deal: 1..H, then H..1, repeating. Returns the 0-based heat
/// slot for the `deal_no`-th contestant.
fn serpentine_slot(deal_no: usize, heats: usize) -> usize {
    let block = deal_no / heats;
    let offset = deal_no % heats;
    if block % 2 == 0 {
        offset
    } else {
        heats - 1 - offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{StartingOrder, build_raceplan};
    use chrono::{Duration, NaiveDate, NaiveTime};

    fn event(format_name: &str) -> Event {
        Event {
            id: Uuid::new_v4(),
            name: "Test race day".into(),
            date_of_event: NaiveDate::from_ymd_opt(2023, 8, 17).unwrap(),
            time_of_event: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            competition_format: format_name.into(),
        }
    }

    fn raceclass(event_id: Uuid, name: &str, n: u32) -> Raceclass {
        Raceclass {
            name: name.into(),
            ageclasses: vec![name.into()],
            event_id,
            group: 1,
            order: 1,
            no_of_contestants: n,
            ranking: true,
        }
    }

    fn contestants(event_count: u32, ageclass: &str) -> Vec<Contestant> {
        (1..=event_count)
            .map(|i| Contestant {
                id: Uuid::new_v4(),
                first_name: format!("First{i}"),
                last_name: format!("Last{i}"),
                club: "Lyn Ski".into(),
                ageclass: ageclass.into(),
                bib: Some(i),
                seeding_points: None,
            })
            .collect()
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
    fn interval_entries_are_spaced_by_the_start_interval() {
        let event = event("Interval Start");
        let format = interval_format();
        let classes = vec![raceclass(event.id, "G16", 10)];
        let roster = contestants(10, "G16");
        let mut plan = build_raceplan(&event, &format, &classes).unwrap();

        let generated =
            build_startlist(&event, &format, &classes, &roster, &mut plan.races).unwrap();

        assert_eq!(generated.start_entries.len(), 10);
        let t0 = event.first_start();
        for (i, entry) in generated.start_entries.iter().enumerate() {
            assert_eq!(entry.starting_position as usize, i + 1);
            assert_eq!(
                entry.scheduled_start_time,
                t0 + Duration::seconds(30) * i as i32
            );
        }
        assert_eq!(plan.races[0].no_of_contestants(), 10);
        assert_eq!(generated.startlist.no_of_contestants, 10);
    }

    #[test]
    fn sprint_16_deals_serpentine_over_the_two_semis() {
        let event = event("Individual Sprint");
        let format = sprint_format();
        let classes = vec![raceclass(event.id, "G16", 16)];
        let roster = contestants(16, "G16");
        let mut plan = build_raceplan(&event, &format, &classes).unwrap();

        let generated =
            build_startlist(&event, &format, &classes, &roster, &mut plan.races).unwrap();

        assert_eq!(generated.start_entries.len(), 16);
        assert_eq!(plan.races[0].no_of_contestants(), 8);
        assert_eq!(plan.races[1].no_of_contestants(), 8);

        // serpentine: bib 1 -> SA1, bib 2 -> SA2, bib 3 -> SA2, bib 4 -> SA1
        let sa1 = plan.races[0].id();
        let sa2 = plan.races[1].id();
        let race_of = |bib: u32| {
            generated
                .start_entries
                .iter()
                .find(|e| e.bib == bib)
                .unwrap()
                .race_id
        };
        assert_eq!(race_of(1), sa1);
        assert_eq!(race_of(2), sa2);
        assert_eq!(race_of(3), sa2);
        assert_eq!(race_of(4), sa1);

        // bracket entries all start with their heat
        for entry in &generated.start_entries {
            let race = plan
                .races
                .iter()
                .find(|r| r.id() == entry.race_id)
                .unwrap();
            assert_eq!(entry.scheduled_start_time, race.start_time());
        }
    }

    #[test]
    fn missing_bib_fails_validation() {
        let event = event("Interval Start");
        let format = interval_format();
        let classes = vec![raceclass(event.id, "G16", 2)];
        let mut roster = contestants(2, "G16");
        roster[1].bib = None;
        let mut plan = build_raceplan(&event, &format, &classes).unwrap();

        let err =
            build_startlist(&event, &format, &classes, &roster, &mut plan.races).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn serpentine_slots_alternate_direction() {
        let slots: Vec<usize> = (0..8).map(|i| serpentine_slot(i, 3)).collect();
        assert_eq!(slots, vec![0, 1, 2, 2, 1, 0, 0, 1]);
    }
}
