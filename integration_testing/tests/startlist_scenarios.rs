//! End-to-end startlist generation scenarios.

use chrono::Duration;
use integration_testing::*;
use race_core::CoreError;

#[tokio::test]
async fn given_interval_event_when_generating_startlist_then_entries_step_by_interval() {
    let harness = make_core_with_fakes();
    let event = test_event("Interval Start");
    seed_event(
        &harness,
        &event,
        interval_format(),
        vec![test_raceclass(event.id, "G16", 1, 1, 10)],
        test_contestants(10, "G16"),
    );

    harness
        .core
        .generate_raceplan_for_event(event.id)
        .await
        .unwrap();
    let startlist = harness
        .core
        .generate_startlist_for_event(event.id)
        .await
        .unwrap();

    assert_eq!(startlist.no_of_contestants, 10);
    let races = harness.core.list_races(Some(event.id)).await.unwrap();
    let entries = harness
        .core
        .list_start_entries(races[0].id())
        .await
        .unwrap();
    assert_eq!(entries.len(), 10);
    let t0 = event.first_start();
    for (i, entry) in entries.iter().enumerate() {
        assert_eq!(entry.starting_position as usize, i + 1);
        assert_eq!(
            entry.scheduled_start_time,
            t0 + Duration::seconds(30) * i as i32
        );
    }
    // last start 09:04:30
    assert_eq!(
        entries.last().unwrap().scheduled_start_time,
        t0 + Duration::seconds(270)
    );

    // the raceplan total follows the startlist
    let plans = harness.core.list_raceplans(Some(event.id)).await.unwrap();
    assert_eq!(plans[0].no_of_contestants, 10);
}

#[tokio::test]
async fn given_mass_start_event_when_generating_startlist_then_all_share_the_gun_time() {
    let harness = make_core_with_fakes();
    let event = test_event("Mass Start");
    seed_event(
        &harness,
        &event,
        mass_start_format(),
        vec![test_raceclass(event.id, "M senior", 1, 1, 40)],
        test_contestants(40, "M senior"),
    );

    harness
        .core
        .generate_raceplan_for_event(event.id)
        .await
        .unwrap();
    harness
        .core
        .generate_startlist_for_event(event.id)
        .await
        .unwrap();

    let races = harness.core.list_races(Some(event.id)).await.unwrap();
    assert_eq!(races.len(), 1);
    assert_eq!(races[0].max_no_of_contestants(), 40);
    let entries = harness
        .core
        .list_start_entries(races[0].id())
        .await
        .unwrap();
    assert_eq!(entries.len(), 40);
    for (i, entry) in entries.iter().enumerate() {
        assert_eq!(entry.starting_position as usize, i + 1);
        // seed order is bib order here
        assert_eq!(entry.bib as usize, i + 1);
        assert_eq!(entry.scheduled_start_time, races[0].start_time());
    }
}

#[tokio::test]
async fn given_sprint_event_when_generating_startlist_then_semis_are_dealt_serpentine() {
    let harness = make_core_with_fakes();
    let event = test_event("Individual Sprint");
    seed_event(
        &harness,
        &event,
        sprint_format(),
        vec![test_raceclass(event.id, "G16", 1, 1, 16)],
        test_contestants(16, "G16"),
    );

    harness
        .core
        .generate_raceplan_for_event(event.id)
        .await
        .unwrap();
    let startlist = harness
        .core
        .generate_startlist_for_event(event.id)
        .await
        .unwrap();
    assert_eq!(startlist.no_of_contestants, 16);

    let races = harness.core.list_races(Some(event.id)).await.unwrap();
    let sa1 = harness.core.list_start_entries(races[0].id()).await.unwrap();
    let sa2 = harness.core.list_start_entries(races[1].id()).await.unwrap();
    assert_eq!(sa1.len(), 8);
    assert_eq!(sa2.len(), 8);

    let sa1_bibs: Vec<u32> = sa1.iter().map(|entry| entry.bib).collect();
    let sa2_bibs: Vec<u32> = sa2.iter().map(|entry| entry.bib).collect();
    assert_eq!(sa1_bibs, vec![1, 4, 5, 8, 9, 12, 13, 16]);
    assert_eq!(sa2_bibs, vec![2, 3, 6, 7, 10, 11, 14, 15]);

    // finals hold no entries until the semis finish
    assert!(harness.core.list_start_entries(races[2].id()).await.unwrap().is_empty());
    assert!(harness.core.list_start_entries(races[3].id()).await.unwrap().is_empty());
}

#[tokio::test]
async fn given_contestant_without_bib_when_generating_startlist_then_validation_fails() {
    let harness = make_core_with_fakes();
    let event = test_event("Interval Start");
    let mut contestants = test_contestants(4, "G16");
    contestants[2].bib = None;
    seed_event(
        &harness,
        &event,
        interval_format(),
        vec![test_raceclass(event.id, "G16", 1, 1, 4)],
        contestants,
    );

    harness
        .core
        .generate_raceplan_for_event(event.id)
        .await
        .unwrap();
    let err = harness
        .core
        .generate_startlist_for_event(event.id)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));
    // nothing was persisted
    assert!(harness.core.list_startlists(Some(event.id)).await.unwrap().is_empty());
}

#[tokio::test]
async fn given_existing_startlist_when_generating_again_then_conflict() {
    let harness = make_core_with_fakes();
    let event = test_event("Interval Start");
    seed_event(
        &harness,
        &event,
        interval_format(),
        vec![test_raceclass(event.id, "G16", 1, 1, 4)],
        test_contestants(4, "G16"),
    );

    harness
        .core
        .generate_raceplan_for_event(event.id)
        .await
        .unwrap();
    harness
        .core
        .generate_startlist_for_event(event.id)
        .await
        .unwrap();
    let err = harness
        .core
        .generate_startlist_for_event(event.id)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Conflict(_)));
}

#[tokio::test]
async fn given_no_raceplan_when_generating_startlist_then_not_found() {
    let harness = make_core_with_fakes();
    let event = test_event("Interval Start");
    seed_event(
        &harness,
        &event,
        interval_format(),
        vec![test_raceclass(event.id, "G16", 1, 1, 4)],
        test_contestants(4, "G16"),
    );

    let err = harness
        .core
        .generate_startlist_for_event(event.id)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound(_)));
}
