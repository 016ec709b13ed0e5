//! End-to-end time-event ingestion, ranking and propagation scenarios.

use integration_testing::*;
use race_core::{
    ContestantStatus, CoreError, DbpRaceResult, IndividualSprintRace, ProgressionRule, Race,
    Raceplan, RuleBranch, SprintRound, StartEntry, TimeEvent, TimeEventStatus,
};
use std::collections::HashMap;
use uuid::Uuid;

/// Plan and seed a sprint event, returning the harness and its races in
/// schedule order.
async fn sprint_event_with_startlist(n: u32) -> (TestHarness, race_core::Event, Vec<Race>) {
    let harness = make_core_with_fakes();
    let event = test_event("Individual Sprint");
    seed_event(
        &harness,
        &event,
        sprint_format(),
        vec![test_raceclass(event.id, "G16", 1, 1, n)],
        test_contestants(n, "G16"),
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
    (harness, event, races)
}

async fn finish_heat(
    harness: &TestHarness,
    event_id: Uuid,
    race: &Race,
    bibs: &[u32],
    offset_base: i64,
) -> Vec<TimeEvent> {
    let mut stored = Vec::new();
    for (i, &bib) in bibs.iter().enumerate() {
        let event = finish_event(event_id, race.id(), bib, offset_base + i as i64);
        stored.push(
            harness
                .core
                .process_time_event(event, "test-admin")
                .await
                .expect("finish should be accepted"),
        );
    }
    stored
}

#[tokio::test]
async fn given_sprint_16_when_semis_finish_then_finals_are_populated_by_rank() {
    let (harness, event, races) = sprint_event_with_startlist(16).await;
    // schedule order: SA1, SA2, FB, FA
    let (sa1, sa2, fb, fa) = (&races[0], &races[1], &races[2], &races[3]);

    let sa1_bibs: Vec<u32> = harness
        .core
        .list_start_entries(sa1.id())
        .await
        .unwrap()
        .iter()
        .map(|entry| entry.bib)
        .collect();
    let first = finish_heat(&harness, event.id, sa1, &sa1_bibs, 0).await;

    // ranks follow registration time
    let ranks: Vec<u32> = first.iter().map(|event| event.rank.unwrap()).collect();
    assert_eq!(ranks, vec![1, 2, 3, 4, 5, 6, 7, 8]);

    // top 4 of the heat moved to final A, the rest to final B
    let fa_entries = harness.core.list_start_entries(fa.id()).await.unwrap();
    let fb_entries = harness.core.list_start_entries(fb.id()).await.unwrap();
    assert_eq!(
        fa_entries.iter().map(|e| e.bib).collect::<Vec<_>>(),
        sa1_bibs[..4].to_vec()
    );
    assert_eq!(
        fb_entries.iter().map(|e| e.bib).collect::<Vec<_>>(),
        sa1_bibs[4..].to_vec()
    );
    // progression is stamped on the stored events once the heat completes
    let winner = harness.core.get_time_event(first[0].id).await.unwrap();
    assert_eq!(winner.next_race.as_deref(), Some("G16-FA1"));
    assert_eq!(winner.next_race_id, Some(fa.id()));
    assert_eq!(winner.next_race_position, Some(1));

    // propagated entries carry their origin in the changelog
    assert!(
        fa_entries[0]
            .changelog
            .iter()
            .any(|entry| entry.comment == format!("PROPAGATED_FROM:{}", sa1.id()))
    );

    // the second semi fills the finals up
    let sa2_bibs: Vec<u32> = harness
        .core
        .list_start_entries(sa2.id())
        .await
        .unwrap()
        .iter()
        .map(|entry| entry.bib)
        .collect();
    finish_heat(&harness, event.id, sa2, &sa2_bibs, 100).await;

    let fa_entries = harness.core.list_start_entries(fa.id()).await.unwrap();
    let fb_entries = harness.core.list_start_entries(fb.id()).await.unwrap();
    assert_eq!(fa_entries.len(), 8);
    assert_eq!(fb_entries.len(), 8);
    let positions: Vec<u32> = fa_entries.iter().map(|e| e.starting_position).collect();
    assert_eq!(positions, (1..=8).collect::<Vec<_>>());

    // propagation conserves the field: finals hold exactly the semifinalists
    let sum: usize = fa_entries.len() + fb_entries.len();
    assert_eq!(sum, 16);
}

#[tokio::test]
async fn given_sprint_24_with_dns_when_quarterfinal_finishes_then_dns_is_not_propagated() {
    let (harness, event, races) = sprint_event_with_startlist(24).await;
    // schedule order: Q1..Q3, SA1, SA2, FC, FB, FA
    let q1 = &races[0];
    let (sa1, sa2, fc) = (&races[3], &races[4], &races[5]);
    assert_eq!(q1.as_sprint().unwrap().round, SprintRound::Q);
    assert_eq!(fc.as_sprint().unwrap().round, SprintRound::FC);

    let mut q1_entries = harness.core.list_start_entries(q1.id()).await.unwrap();
    assert_eq!(q1_entries.len(), 8);

    // the last starter does not start
    let mut dns_entry = q1_entries.pop().unwrap();
    let dns_bib = dns_entry.bib;
    dns_entry.status = ContestantStatus::Dns;
    harness
        .core
        .update_start_entry(q1.id(), dns_entry.id, dns_entry.clone())
        .await
        .unwrap();

    let finisher_bibs: Vec<u32> = q1_entries.iter().map(|entry| entry.bib).collect();
    finish_heat(&harness, event.id, q1, &finisher_bibs, 0).await;

    // top 5 to the semis, the remaining two finishers to final C
    let sa1_entries = harness.core.list_start_entries(sa1.id()).await.unwrap();
    let sa2_entries = harness.core.list_start_entries(sa2.id()).await.unwrap();
    let fc_entries = harness.core.list_start_entries(fc.id()).await.unwrap();
    assert_eq!(sa1_entries.len() + sa2_entries.len(), 5);
    assert_eq!(
        fc_entries.iter().map(|e| e.bib).collect::<Vec<_>>(),
        finisher_bibs[5..].to_vec()
    );

    // the DNS contestant stays behind
    for entries in [&sa1_entries, &sa2_entries, &fc_entries] {
        assert!(entries.iter().all(|entry| entry.bib != dns_bib));
    }
}

#[tokio::test]
async fn given_finish_events_out_of_order_then_ranking_follows_registration_time() {
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
    let race = &harness.core.list_races(Some(event.id)).await.unwrap()[0];

    // the later finisher reports first
    let late = harness
        .core
        .process_time_event(finish_event(event.id, race.id(), 2, 30), "test-admin")
        .await
        .unwrap();
    assert_eq!(late.rank, Some(1));
    let early = harness
        .core
        .process_time_event(finish_event(event.id, race.id(), 1, 0), "test-admin")
        .await
        .unwrap();
    assert_eq!(early.rank, Some(1));

    let late = harness.core.get_time_event(late.id).await.unwrap();
    assert_eq!(late.rank, Some(2));

    // equal registration times break the tie on bib
    let tied_high = harness
        .core
        .process_time_event(finish_event(event.id, race.id(), 4, 60), "test-admin")
        .await
        .unwrap();
    let tied_low = harness
        .core
        .process_time_event(finish_event(event.id, race.id(), 3, 60), "test-admin")
        .await
        .unwrap();
    assert_eq!(tied_low.rank, Some(3));
    let tied_high = harness.core.get_time_event(tied_high.id).await.unwrap();
    assert_eq!(tied_high.rank, Some(4));
}

#[tokio::test]
async fn given_deleted_finish_event_then_ranking_and_derived_entries_are_corrected() {
    let (harness, event, races) = sprint_event_with_startlist(16).await;
    let (sa1, fa) = (&races[0], &races[3]);

    let sa1_bibs: Vec<u32> = harness
        .core
        .list_start_entries(sa1.id())
        .await
        .unwrap()
        .iter()
        .map(|entry| entry.bib)
        .collect();
    let stored = finish_heat(&harness, event.id, sa1, &sa1_bibs, 0).await;

    // rank 4 qualified into final A; no finals have run yet
    let fourth = harness.core.get_time_event(stored[3].id).await.unwrap();
    assert_eq!(fourth.next_race_id, Some(fa.id()));
    harness.core.withdraw_time_event(fourth.id).await.unwrap();

    // the derived entry is gone and positions closed up
    let fa_entries = harness.core.list_start_entries(fa.id()).await.unwrap();
    assert_eq!(fa_entries.len(), 3);
    assert_eq!(
        fa_entries.iter().map(|e| e.starting_position).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    assert!(fa_entries.iter().all(|entry| entry.bib != sa1_bibs[3]));

    // remaining finishers moved up one rank each
    let fifth = harness.core.get_time_event(stored[4].id).await.unwrap();
    assert_eq!(fifth.rank, Some(4));
}

#[tokio::test]
async fn given_full_target_race_when_propagating_then_event_is_rejected_and_kept_as_error() {
    let harness = make_core_with_fakes();
    let event_id = Uuid::new_v4();
    let start_time = registration_base();

    let plan = Raceplan::new(Uuid::new_v4(), event_id);
    harness.core.create_raceplan(plan.clone()).await.unwrap();

    let semi = Race::IndividualSprint(IndividualSprintRace {
        id: Uuid::new_v4(),
        raceclass: "G16".into(),
        order: 1,
        start_time,
        no_of_contestants: 0,
        max_no_of_contestants: 2,
        event_id,
        raceplan_id: plan.id,
        start_entries: Vec::new(),
        results: HashMap::new(),
        round: SprintRound::SA,
        heat: 1,
        rule: ProgressionRule::new(vec![RuleBranch::top(1, SprintRound::FA)]),
    });
    let final_a = Race::IndividualSprint(IndividualSprintRace {
        id: Uuid::new_v4(),
        raceclass: "G16".into(),
        order: 2,
        start_time,
        no_of_contestants: 0,
        max_no_of_contestants: 1,
        event_id,
        raceplan_id: plan.id,
        start_entries: Vec::new(),
        results: HashMap::new(),
        round: SprintRound::FA,
        heat: 1,
        rule: ProgressionRule::default(),
    });
    harness.core.create_race(semi.clone()).await.unwrap();
    harness.core.create_race(final_a.clone()).await.unwrap();

    let make_entry = |race_id: Uuid, bib: u32| StartEntry {
        id: Uuid::new_v4(),
        race_id,
        startlist_id: Uuid::nil(),
        bib,
        name: format!("Runner {bib}"),
        club: "Lyn Ski".into(),
        starting_position: 1,
        scheduled_start_time: start_time,
        actual_start_time: None,
        status: Default::default(),
        changelog: Vec::new(),
    };
    // final A is already full before the semi finishes
    harness
        .core
        .create_start_entry(final_a.id(), make_entry(final_a.id(), 99), "test-admin")
        .await
        .unwrap();
    harness
        .core
        .create_start_entry(semi.id(), make_entry(semi.id(), 5), "test-admin")
        .await
        .unwrap();

    let err = harness
        .core
        .process_time_event(finish_event(event_id, semi.id(), 5, 0), "test-admin")
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Rejected(_)));

    // the offending event is kept, marked Error, with the reason on record
    let stored = harness
        .core
        .list_time_events(None, Some(semi.id()))
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].status, TimeEventStatus::Error);
    assert!(!stored[0].changelog.is_empty());

    // ranking and target race were rolled back
    let result = harness
        .db
        .get_race_result_by_race_and_timing_point(semi.id(), "Finish")
        .await
        .unwrap();
    assert!(result.is_none());
    let fa_entries = harness.core.list_start_entries(final_a.id()).await.unwrap();
    assert_eq!(fa_entries.len(), 1);
    assert_eq!(fa_entries[0].bib, 99);
}

#[tokio::test]
async fn given_duplicate_time_event_id_then_second_post_conflicts() {
    let harness = make_core_with_fakes();
    let event = test_event("Interval Start");
    seed_event(
        &harness,
        &event,
        interval_format(),
        vec![test_raceclass(event.id, "G16", 1, 1, 2)],
        test_contestants(2, "G16"),
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
    let race = &harness.core.list_races(Some(event.id)).await.unwrap()[0];

    let event_doc = finish_event(event.id, race.id(), 1, 0);
    harness
        .core
        .process_time_event(event_doc.clone(), "test-admin")
        .await
        .unwrap();
    let err = harness
        .core
        .process_time_event(event_doc, "test-admin")
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Conflict(_)));
}

#[tokio::test]
async fn given_invalid_timing_point_then_event_is_persisted_as_error() {
    let harness = make_core_with_fakes();
    let event = test_event("Interval Start");
    seed_event(
        &harness,
        &event,
        interval_format(),
        vec![test_raceclass(event.id, "G16", 1, 1, 2)],
        test_contestants(2, "G16"),
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
    let race = &harness.core.list_races(Some(event.id)).await.unwrap()[0];

    // Template reports only exist for sprint races
    let mut bad = finish_event(event.id, race.id(), 1, 0);
    bad.timing_point = "Template".into();
    let err = harness
        .core
        .process_time_event(bad.clone(), "test-admin")
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Field(_)));

    let stored = harness.core.get_time_event(bad.id).await.unwrap();
    assert_eq!(stored.status, TimeEventStatus::Error);
    assert!(
        stored
            .changelog
            .iter()
            .any(|entry| entry.comment.contains("timing point"))
    );

    // no ranking was created for the bad timing point
    let results = harness.core.list_race_results(race.id(), None).await.unwrap();
    assert!(results.is_empty());
}
