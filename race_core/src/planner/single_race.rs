//! Formats that start a raceclass as one field: mass start, skiathlon,
//! pursuit, team sprint, relay, and non-ranked classes of bracket formats.

use super::PlanClock;
use crate::{Event, IntervalStartRace, Race, Raceclass};
use std::collections::HashMap;
use uuid::Uuid;

pub(super) fn build_race(
    clock: &mut PlanClock,
    event: &Event,
    raceclass: &Raceclass,
    raceplan_id: Uuid,
) -> Race {
    Race::IntervalStart(IntervalStartRace {
        id: Uuid::new_v4(),
        raceclass: raceclass.name.clone(),
        order: clock.take_order(),
        start_time: clock.now(),
        no_of_contestants: 0,
        max_no_of_contestants: raceclass.no_of_contestants,
        event_id: event.id,
        raceplan_id,
        start_entries: Vec::new(),
        results: HashMap::new(),
    })
}
