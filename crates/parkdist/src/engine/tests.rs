use super::*;
use crate::{
    Error, GeometryError, Placemark, PlanarDistance, Point, Region, nearest_pair_sequential,
};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::sync::Mutex;

fn square(cx: f64, cy: f64, half: f64) -> Region {
    Region::from_xy(&[
        (cx - half, cy - half),
        (cx + half, cy - half),
        (cx + half, cy + half),
        (cx - half, cy + half),
        (cx - half, cy - half),
    ])
    .unwrap()
}

fn source(name: &str, x: f64, y: f64) -> PointEntity {
    PointEntity::new(Placemark::named(name), Point::new(x, y).unwrap())
}

fn target(name: &str, cx: f64, cy: f64) -> RegionEntity {
    RegionEntity::new(Placemark::named(name), square(cx, cy, 0.5))
}

fn engine<G: GeometryProvider>(workers: usize, provider: G) -> NearestPairEngine<G> {
    NearestPairEngine::new(EngineConfig::default().with_workers(workers), provider)
}

/// Looks a distance up by source position and the centre of the target's
/// square, so results do not depend on the planar geometry.
fn stubbed_distances(
    table: &'static [((f64, f64), (f64, f64), f64)],
) -> impl Fn(&Point, &Region) -> core::result::Result<f64, GeometryError> + Send + Sync + 'static
{
    move |point: &Point, region: &Region| {
        let ring = &region.parts()[0].exterior().0;
        let centre = ((ring[0].x + ring[2].x) / 2.0, (ring[0].y + ring[2].y) / 2.0);
        table
            .iter()
            .find(|(p, c, _)| *p == (point.x(), point.y()) && *c == centre)
            .map(|(_, _, d)| *d)
            .ok_or_else(|| GeometryError::Provider {
                reason: "pair not stubbed".to_string(),
            })
    }
}

const SCENARIO: &[((f64, f64), (f64, f64), f64)] = &[
    ((0.0, 0.0), (0.0, 1.0), 1.0),
    ((0.0, 0.0), (20.0, 20.0), 28.3),
    ((10.0, 10.0), (0.0, 1.0), 15.6),
    ((10.0, 10.0), (20.0, 20.0), 14.1),
    ((5.0, 5.0), (0.0, 1.0), 7.1),
    ((5.0, 5.0), (20.0, 20.0), 21.2),
];

fn scenario_sources() -> Vec<PointEntity> {
    vec![
        source("source1", 0.0, 0.0),
        source("source2", 10.0, 10.0),
        source("source3", 5.0, 5.0),
    ]
}

fn scenario_targets() -> Vec<RegionEntity> {
    vec![target("target1", 0.0, 1.0), target("target2", 20.0, 20.0)]
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn end_to_end_scenario_picks_source1_target1() {
    for workers in [1, 5, 30] {
        let outcome = engine(workers, stubbed_distances(SCENARIO))
            .run(scenario_sources(), scenario_targets())
            .await
            .unwrap();

        let answer = outcome.answer().expect("scenario has an answer");
        assert_eq!(answer.source().name(), "source1");
        assert_eq!(answer.target().name(), "target1");
        assert_eq!(answer.distance(), 1.0);

        let stats = outcome.stats();
        assert_eq!(stats.sources, 3);
        assert_eq!(stats.targets, 2);
        assert_eq!(stats.workers, workers);
        assert_eq!(stats.candidates, 3);
        assert_eq!(stats.comparisons, 6);
        assert_eq!(stats.failed_comparisons, 0);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn matches_sequential_scan_for_any_worker_count() {
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for _round in 0..8 {
        let sources: Vec<_> = (0..rng.random_range(1..60))
            .map(|i| {
                source(
                    &format!("s{i}"),
                    rng.random_range(-100.0..100.0),
                    rng.random_range(-100.0..100.0),
                )
            })
            .collect();
        let targets: Vec<_> = (0..rng.random_range(1..25))
            .map(|i| {
                target(
                    &format!("t{i}"),
                    rng.random_range(-100.0..100.0),
                    rng.random_range(-100.0..100.0),
                )
            })
            .collect();

        let expected = nearest_pair_sequential(&PlanarDistance, &sources, &targets)
            .expect("non-empty inputs have an answer");

        for workers in [1, 5, 30] {
            let outcome = engine(workers, PlanarDistance)
                .run(sources.clone(), targets.clone())
                .await
                .unwrap();
            let answer = outcome.answer().unwrap();
            assert_eq!(answer.distance(), expected.distance);
            assert!(answer.distance() >= 0.0);
            assert_eq!(outcome.stats().candidates, sources.len() as u64);
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn empty_targets_yield_no_result() {
    let outcome = engine(5, PlanarDistance)
        .run(scenario_sources(), Vec::new())
        .await
        .unwrap();

    assert!(outcome.answer().is_none());
    assert_eq!(outcome.stats().candidates, 0);
    assert_eq!(outcome.stats().workers, 5);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn empty_sources_start_no_workers() {
    let phases = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&phases);

    let outcome = engine(30, PlanarDistance)
        .with_observer(move |phase| recorded.lock().unwrap().push(phase))
        .run(Vec::new(), scenario_targets())
        .await
        .unwrap();

    assert!(outcome.answer().is_none());
    assert_eq!(outcome.stats().workers, 0);
    assert_eq!(outcome.stats().candidates, 0);
    assert!(phases.lock().unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn failing_target_is_excluded_not_fatal() {
    // The nearest region for every source is broken; the answer must be the
    // nearest of the remaining ones.
    let broken = square(0.0, 0.0, 0.5);
    let provider = move |point: &Point, region: &Region| {
        if *region == broken {
            Err(GeometryError::Provider {
                reason: "self-intersecting ring".to_string(),
            })
        } else {
            PlanarDistance.distance(point, region)
        }
    };

    let sources = vec![source("a", 0.0, 3.0), source("b", 9.0, 0.0)];
    let targets = vec![
        target("broken", 0.0, 0.0),
        target("mid", 0.0, 10.0),
        target("right", 12.0, 0.0),
    ];

    let outcome = engine(4, provider).run(sources, targets).await.unwrap();
    let answer = outcome.answer().unwrap();
    assert_eq!(answer.source().name(), "b");
    assert_eq!(answer.target().name(), "right");
    assert!((answer.distance() - 2.5).abs() < 1e-12);
    assert_eq!(outcome.stats().failed_comparisons, 2);
    assert_eq!(outcome.stats().candidates, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn all_comparisons_failing_yields_no_result() {
    let provider = |_: &Point, _: &Region| -> core::result::Result<f64, GeometryError> {
        Err(GeometryError::Provider {
            reason: "offline".to_string(),
        })
    };

    let outcome = engine(3, provider)
        .run(scenario_sources(), scenario_targets())
        .await
        .unwrap();
    assert!(outcome.answer().is_none());
    assert_eq!(outcome.stats().failed_comparisons, 6);
}

#[test]
fn stub_distances_are_symmetric_and_non_negative() {
    let provider = stubbed_distances(SCENARIO);
    for ((px, py), (cx, cy), expected) in SCENARIO {
        let point = Point::new(*px, *py).unwrap();
        let region = square(*cx, *cy, 0.5);
        let d = provider.distance(&point, &region).unwrap();
        assert!(d >= 0.0);
        assert_eq!(d, *expected);

        // Swapping roles: the centre of the region as a point against a
        // region centred on the original point.
        let planar_ab = PlanarDistance.distance(&point, &square(*cx, *cy, 0.0001)).unwrap();
        let planar_ba = PlanarDistance
            .distance(&Point::new(*cx, *cy).unwrap(), &square(*px, *py, 0.0001))
            .unwrap();
        assert!((planar_ab - planar_ba).abs() < 1e-3);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn phases_run_in_strict_order() {
    let phases = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&phases);

    engine(5, stubbed_distances(SCENARIO))
        .with_observer(move |phase| recorded.lock().unwrap().push(phase))
        .run(scenario_sources(), scenario_targets())
        .await
        .unwrap();

    assert_eq!(
        *phases.lock().unwrap(),
        vec![
            Phase::Launched,
            Phase::SourcesEnqueued,
            Phase::JobsClosed,
            Phase::WorkersFinished,
            Phase::ResultsClosed,
            Phase::Answered,
        ]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn small_result_buffer_does_not_stall_workers() {
    let sources: Vec<_> = (0..200)
        .map(|i| source(&format!("s{i}"), f64::from(i), 0.0))
        .collect();
    let targets = vec![target("t", 1000.0, 0.0)];

    let engine = NearestPairEngine::new(
        EngineConfig::default()
            .with_workers(8)
            .with_result_buffer_size(1),
        PlanarDistance,
    );
    let outcome = engine.run(sources, targets).await.unwrap();

    assert_eq!(outcome.stats().candidates, 200);
    assert_eq!(outcome.answer().unwrap().source().name(), "s199");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn comparison_delay_still_completes() {
    let engine = NearestPairEngine::new(
        EngineConfig::default()
            .with_workers(3)
            .with_comparison_delay(Duration::from_micros(100)),
        stubbed_distances(SCENARIO),
    );
    let outcome = engine
        .run(scenario_sources(), scenario_targets())
        .await
        .unwrap();
    assert_eq!(outcome.answer().unwrap().distance(), 1.0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn invalid_config_starts_nothing() {
    let err = engine(0, PlanarDistance)
        .run(scenario_sources(), scenario_targets())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidConfig { .. }));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn panicking_provider_surfaces_worker_failure() {
    let provider = |point: &Point, _: &Region| -> core::result::Result<f64, GeometryError> {
        if point.x() == 10.0 {
            panic!("provider bug");
        }
        Ok(1.0)
    };

    let err = engine(2, provider)
        .run(scenario_sources(), scenario_targets())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::WorkerFailed { .. }));
}

/// Polls the runtime until every spawned task has been released. A joined
/// task can be observed as finished a moment before the runtime drops it.
async fn assert_no_tasks_left() {
    let metrics = tokio::runtime::Handle::current().metrics();
    for _ in 0..100 {
        if metrics.num_alive_tasks() == 0 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("{} tasks still alive", metrics.num_alive_tasks());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn finished_run_leaves_no_tasks_behind() {
    engine(30, stubbed_distances(SCENARIO))
        .run(scenario_sources(), scenario_targets())
        .await
        .unwrap();
    assert_no_tasks_left().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn failed_run_leaves_no_tasks_behind() {
    let provider = |point: &Point, _: &Region| -> core::result::Result<f64, GeometryError> {
        if point.x() == 10.0 {
            panic!("provider bug");
        }
        Ok(1.0)
    };

    let err = engine(4, provider)
        .run(scenario_sources(), scenario_targets())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::WorkerFailed { .. }));
    assert_no_tasks_left().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn abort_prefers_worker_failure_and_joins_everything() {
    let mut barrier = CompletionBarrier::<WorkerReport>::new();
    barrier.spawn(async { panic!("worker died mid-scan") });
    barrier.spawn(async { WorkerReport::default() });

    let (results_tx, results_rx) = result_channel(1);
    let aggregator = spawn_aggregator(results_rx);
    results_tx.close();

    let cause = Error::ChannelError {
        context: "no consumers".to_string(),
    };
    let err = abort_run(barrier, aggregator, cause).await;
    assert!(matches!(err, Error::WorkerFailed { .. }));
    assert_no_tasks_left().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn abort_keeps_cause_when_workers_exited_cleanly() {
    let mut barrier = CompletionBarrier::<WorkerReport>::new();
    barrier.spawn(async { WorkerReport::default() });

    let (results_tx, results_rx) = result_channel(1);
    let aggregator = spawn_aggregator(results_rx);
    results_tx.close();

    let cause = Error::ChannelError {
        context: "no consumers".to_string(),
    };
    let err = abort_run(barrier, aggregator, cause).await;
    assert!(matches!(err, Error::ChannelError { .. }));
    assert_no_tasks_left().await;
}

#[test]
fn elapsed_ms_keeps_sub_millisecond_precision() {
    let stats = RunStats {
        elapsed: Duration::from_micros(1_500),
        ..RunStats::default()
    };
    assert_eq!(stats.elapsed_ms(), 1.5);

    let long = RunStats {
        elapsed: Duration::from_secs(u64::MAX / 1_000),
        ..RunStats::default()
    };
    assert!(long.elapsed_ms() > 1.8e19);
}
