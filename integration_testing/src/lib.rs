//! Shared fakes and fixtures for end-to-end tests of the race service core.

mod port_fakes;

pub use port_fakes::*;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use db_memory::MemoryDb;
use race_core::{
    CompetitionFormat, Contestant, Core, CoreBuilder, CoreHandle, Event, Raceclass, StartingOrder,
    TimeEvent,
};
use std::sync::Arc;
use uuid::Uuid;

/// A core wired to the in-memory database and fake external services, with
/// handles to drive the fakes from the tests.
pub struct TestHarness {
    pub core: CoreHandle,
    pub db: MemoryDb,
    pub events: Arc<FakeEventService>,
    pub formats: Arc<FakeFormatService>,
    pub users: Arc<FakeUsers>,
}

pub fn make_core_with_fakes() -> TestHarness {
    let db = MemoryDb::new();
    let events = Arc::new(FakeEventService::new());
    let formats = Arc::new(FakeFormatService::new());
    let users = Arc::new(FakeUsers::new());
    let core: Core = CoreBuilder::new()
        .set_db(Arc::new(db.clone()))
        .set_events(events.clone())
        .set_formats(formats.clone())
        .set_users(users.clone())
        .build();
    TestHarness {
        core: Arc::new(core),
        db,
        events,
        formats,
        users,
    }
}

pub fn test_event(format_name: &str) -> Event {
    Event {
        id: Uuid::new_v4(),
        name: "Summer rollerski sprint".into(),
        date_of_event: NaiveDate::from_ymd_opt(2023, 8, 17).unwrap(),
        time_of_event: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        competition_format: format_name.into(),
    }
}

pub fn test_raceclass(event_id: Uuid, name: &str, group: u32, order: u32, n: u32) -> Raceclass {
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

pub fn test_contestants(n: u32, ageclass: &str) -> Vec<Contestant> {
    (1..=n)
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

pub fn interval_format() -> CompetitionFormat {
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

pub fn sprint_format() -> CompetitionFormat {
    CompetitionFormat {
        name: "Individual Sprint".into(),
        starting_order: StartingOrder::Draw,
        start_procedure: "heat_start".into(),
        time_between_groups: Duration::minutes(10),
        time_between_rounds: Duration::minutes(10),
        time_between_heats: Some(Duration::minutes(2)),
        time_between_races: Duration::minutes(5),
        intervals: None,
        max_no_of_contestants_in_raceclass: 80,
        max_no_of_contestants_in_race: 10,
        race_config_ranked: None,
        race_config_non_ranked: None,
    }
}

pub fn mass_start_format() -> CompetitionFormat {
    CompetitionFormat {
        name: "Mass Start".into(),
        starting_order: StartingOrder::Draw,
        start_procedure: "mass_start".into(),
        time_between_groups: Duration::minutes(10),
        time_between_rounds: Duration::minutes(5),
        time_between_heats: None,
        time_between_races: Duration::minutes(5),
        intervals: None,
        max_no_of_contestants_in_raceclass: 9999,
        max_no_of_contestants_in_race: 9999,
        race_config_ranked: None,
        race_config_non_ranked: None,
    }
}

/// A finish observation for `bib`, registered `offset_secs` after 09:05:00.
pub fn finish_event(
    event_id: Uuid,
    race_id: Uuid,
    bib: u32,
    offset_secs: i64,
) -> TimeEvent {
    TimeEvent {
        id: Uuid::new_v4(),
        event_id,
        race_id: Some(race_id),
        race: None,
        bib: Some(bib),
        name: None,
        club: None,
        timing_point: "Finish".into(),
        registration_time: registration_base() + Duration::seconds(offset_secs),
        rank: None,
        next_race: None,
        next_race_id: None,
        next_race_position: None,
        status: Default::default(),
        changelog: Vec::new(),
    }
}

pub fn registration_base() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2023, 8, 17)
        .unwrap()
        .and_hms_opt(9, 5, 0)
        .unwrap()
}

/// Configure the fakes with one event, its format, classes and contestants.
pub fn seed_event(
    harness: &TestHarness,
    event: &Event,
    format: CompetitionFormat,
    raceclasses: Vec<Raceclass>,
    contestants: Vec<Contestant>,
) {
    harness.events.set_event(event.clone());
    harness.formats.set_format(format);
    harness.events.set_raceclasses(raceclasses);
    harness.events.set_contestants(contestants);
}
