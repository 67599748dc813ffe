use anyhow::bail;
use clap::Parser;
use parkdist::EngineConfig;
use std::{path::PathBuf, time::Duration};

/// Runtime configuration for the `parkdist` binary.
///
/// Every option can also be supplied through the environment (or a `.env`
/// file), which is convenient when the same inputs are scanned repeatedly.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "parkdist",
    version,
    about = "Reports the source placemark closest to any target region"
)]
pub struct CliArgs {
    /// KML file whose `Point` placemarks are the sources.
    ///
    /// Environment variable: `SOURCES_KML`
    #[arg(long, env = "SOURCES_KML", default_value = "assets/dispensaries.kml")]
    pub sources: PathBuf,

    /// KML file whose `Polygon` placemarks are the targets.
    ///
    /// Environment variable: `TARGETS_KML`
    #[arg(long, env = "TARGETS_KML", default_value = "assets/parks.kml")]
    pub targets: PathBuf,

    /// Number of worker tasks scanning sources concurrently.
    ///
    /// Environment variable: `NUM_WORKERS`
    #[arg(long, env = "NUM_WORKERS", default_value_t = parkdist::DEFAULT_NUM_WORKERS)]
    pub num_workers: usize,

    /// Capacity of the candidate channel between workers and the
    /// aggregator. `0` sizes it to the number of sources.
    ///
    /// Environment variable: `RESULT_BUFFER_SIZE`
    #[arg(long, env = "RESULT_BUFFER_SIZE", default_value_t = 0)]
    pub result_buffer_size: usize,

    /// Artificial pause before each distance comparison, in microseconds.
    ///
    /// Environment variable: `COMPARISON_DELAY_US`
    #[arg(long, env = "COMPARISON_DELAY_US", default_value_t = 0)]
    pub comparison_delay_us: u64,

    /// Re-run the search sequentially and fail if the answers disagree.
    #[arg(long, default_value_t = false)]
    pub verify: bool,

    /// Print the answer as JSON instead of the text report.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub sources: PathBuf,
    pub targets: PathBuf,
    pub engine: EngineConfig,
    pub verify: bool,
    pub json: bool,
}

impl TryFrom<CliArgs> for RunConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.num_workers == 0 {
            bail!("NUM_WORKERS must be greater than 0");
        }

        let mut engine = EngineConfig::default()
            .with_workers(args.num_workers)
            .with_comparison_delay(Duration::from_micros(args.comparison_delay_us));
        if args.result_buffer_size > 0 {
            engine = engine.with_result_buffer_size(args.result_buffer_size);
        }
        engine.validate()?;

        Ok(Self {
            sources: args.sources,
            targets: args.targets,
            engine,
            verify: args.verify,
            json: args.json,
        })
    }
}
