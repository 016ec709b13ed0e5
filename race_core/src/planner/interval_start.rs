//! Interval start: one race per raceclass, one contestant starting per
//! interval.

use super::PlanClock;
use crate::{
    CompetitionFormat, CoreError, CoreResult, Event, IntervalStartRace, Race, Raceclass,
    utils::validation::FieldError,
};
use std::collections::HashMap;
use uuid::Uuid;

pub(super) fn build_race(
    clock: &mut PlanClock,
    event: &Event,
    format: &CompetitionFormat,
    raceclass: &Raceclass,
    raceplan_id: Uuid,
) -> CoreResult<Race> {
    let interval = format.intervals.ok_or_else(|| {
        CoreError::Field(
            FieldError::builder()
                .set_field("intervals")
                .add_required()
                .add_message("interval start format without start interval")
                .build(),
        )
    })?;

    let race = Race::IntervalStart(IntervalStartRace {
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
    });

    // the start stream occupies the clock until the last contestant is away
    clock.advance(interval * raceclass.no_of_contestants as i32);
    Ok(race)
}
