#![doc = include_str!("../README.md")]

mod cli;

use anyhow::{Context, bail};
use clap::Parser;
use cli::config::{CliArgs, RunConfig};
use cli::report::{JsonReport, render_text};
use cli::telemetry::{self, init_telemetry};
use parkdist::{NearestPairEngine, PlanarDistance, RunOutcome, nearest_pair_sequential};

// Using mimalloc for better performance under contention, especially in musl
// environments.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = RunConfig::try_from(args)?;

    let providers = init_telemetry()?;
    let res = run(config).await;
    providers.shutdown();
    res
}

async fn run(config: RunConfig) -> anyhow::Result<()> {
    if cfg!(debug_assertions) {
        tracing::info!("Starting search with full config: {:#?}", config);
    } else {
        tracing::info!(
            "Starting search with {} workers",
            config.engine.num_workers
        );
    }

    let sources = parkdist_kml::load_points(&config.sources)
        .with_context(|| format!("loading sources from {}", config.sources.display()))?;
    let targets = parkdist_kml::load_regions(&config.targets)
        .with_context(|| format!("loading targets from {}", config.targets.display()))?;
    tracing::info!(
        sources = sources.len(),
        sources_skipped = sources.skipped.len(),
        targets = targets.len(),
        targets_skipped = targets.skipped.len(),
        "Loaded placemarks"
    );

    let (sources, targets) = (sources.entities, targets.entities);
    // Only kept around for the sequential cross-check.
    let copies = config
        .verify
        .then(|| (sources.clone(), targets.clone()));

    let engine = NearestPairEngine::new(config.engine.clone(), PlanarDistance);
    let outcome = engine.run(sources, targets).await?;
    record_metrics(&outcome);

    if let Some((sources, targets)) = copies {
        verify(&outcome, &sources, &targets)?;
    }

    if config.json {
        println!("{}", JsonReport::new(outcome.answer(), outcome.stats()).render()?);
    } else {
        print!("{}", render_text(outcome.answer()));
    }
    Ok(())
}

fn verify(
    outcome: &RunOutcome,
    sources: &[parkdist::PointEntity],
    targets: &[parkdist::RegionEntity],
) -> anyhow::Result<()> {
    let expected = nearest_pair_sequential(&PlanarDistance, sources, targets);
    let actual = outcome.answer().map(|pair| pair.distance());
    let expected_distance = expected.as_ref().map(|answer| answer.distance);

    if actual != expected_distance {
        bail!(
            "Concurrent answer {:?} disagrees with sequential scan {:?}",
            actual,
            expected_distance
        );
    }
    tracing::info!("Sequential scan agrees");
    Ok(())
}

fn record_metrics(outcome: &RunOutcome) {
    let stats = outcome.stats();
    telemetry::increment_runs();
    telemetry::increment_sources_scanned(stats.sources as u64);
    telemetry::increment_comparisons(stats.comparisons);
    telemetry::increment_failed_comparisons(stats.failed_comparisons);
    telemetry::record_run_duration(stats.elapsed_ms());
}
