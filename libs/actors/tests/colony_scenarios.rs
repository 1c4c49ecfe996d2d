//! End-to-end colony scenarios
//!
//! Full colonies with live receive loops, driven through the public API.

use colony_actors::{run, AntId, Colony, ColonyError, Quiescence};
use colony_config::{ColonyConfig, QuiescenceKind, QuiescenceMode};
use std::time::Duration;

const DRAIN: QuiescenceMode = QuiescenceMode::Drain {
    timeout: Duration::from_secs(10),
};

fn config(population: usize) -> ColonyConfig {
    ColonyConfig {
        population,
        seed_batch: 8,
        duration_secs: 0.02,
        inbox_capacity: 128,
        seed: Some(7),
        ..Default::default()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn single_schedule_round_trips_back_to_origin() {
    let colony = Colony::spawn(&config(4)).unwrap();

    colony.inject(AntId::new(0)).await.unwrap();

    // Wait for the first ack to come home
    let mut origin = colony.snapshots().await.unwrap().remove(0);
    for _ in 0..1000 {
        if !origin.round_trips.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
        origin = colony.snapshots().await.unwrap().remove(0);
    }

    assert!(origin.is_started());
    assert_eq!(origin.schedules_received, 1);
    assert!(!origin.round_trips.is_empty());

    assert!(colony.quiesce(DRAIN).await.is_exact());
    let snapshots = colony.snapshots().await.unwrap();
    let origin = &snapshots[0];

    // Only ant 0 was ever scheduled
    assert!(snapshots[1..].iter().all(|ant| !ant.is_started()));
    assert!(origin.greetings_sent >= 1);
    assert_eq!(origin.round_trips.len() as u64, origin.greetings_sent);
    assert!(origin.round_trips.iter().all(|rtt| *rtt >= Duration::ZERO));

    let sent: u64 = snapshots.iter().map(|ant| ant.greetings_sent).sum();
    let received: u64 = snapshots.iter().map(|ant| ant.greetings_received).sum();
    let acked: u64 = snapshots.iter().map(|ant| ant.acks_received).sum();
    assert_eq!(sent, received);
    assert_eq!(acked, received);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn collector_passes_are_stable_after_drain() {
    let mut colony = Colony::spawn(&config(64)).unwrap();
    let window = colony.run_window(Duration::from_millis(20)).await.unwrap();

    assert!(colony.quiesce(DRAIN).await.is_exact());

    let first = colony.collect(window.elapsed).await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    let second = colony.collect(window.elapsed).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.schedules_received_total, window.driver.schedules);
    assert!(first.message_rate.is_some());
    assert!(first.rtt_min <= first.rtt_avg && first.rtt_avg <= first.rtt_max);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn greetings_sent_never_decreases() {
    let mut colony = Colony::spawn(&config(16)).unwrap();
    colony.run_window(Duration::from_millis(5)).await.unwrap();

    let mut previous = colony.snapshots().await.unwrap();
    for _ in 0..5 {
        tokio::time::sleep(Duration::from_millis(2)).await;
        let current = colony.snapshots().await.unwrap();
        for (before, after) in previous.iter().zip(&current) {
            assert!(after.greetings_sent >= before.greetings_sent);
            assert!(after.round_trips.len() >= before.round_trips.len());
        }
        previous = current;
    }
}

#[tokio::test]
async fn lone_ant_is_rejected() {
    let result = run(&config(1)).await;
    assert!(matches!(result, Err(ColonyError::Config(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn sleep_policy_samples_live_traffic() {
    let config = ColonyConfig {
        quiescence: QuiescenceKind::Sleep,
        settle_secs: 0.01,
        ..config(32)
    };

    let outcome = run(&config).await.unwrap();

    assert_eq!(
        outcome.quiescence,
        Quiescence::Settled {
            waited: Duration::from_millis(10)
        }
    );
    assert_eq!(outcome.report.population, 32);
    assert!(outcome.report.started_ants > 0);
}
