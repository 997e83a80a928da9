//! stockpeak CLI: run the pipeline and inspect configuration.
//!
//! Commands:
//! - `run`: fetch one object, find the highest high, write it to Redis
//! - `config`: print the resolved configuration (secret redacted)
//!
//! Logging goes to stderr and honours `RUST_LOG` (default `info`).

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use stockpeak_runner::{
    run_pipeline, FsObjectStore, KeyValueStore, MemoryKeyValueStore, ObjectStore,
    PipelineConfig, RedisStore, RunReport, S3ObjectStore,
};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "stockpeak",
    about = "stockpeak: highest daily high from an S3 stock file into Redis"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run Loader → Aggregator → Publisher once.
    Run {
        #[command(flatten)]
        source: ConfigSource,

        /// Object key to fetch (overrides `run.s3_key`).
        #[arg(long)]
        s3_key: Option<String>,

        /// Read objects from this directory instead of S3.
        #[arg(long)]
        local_root: Option<PathBuf>,

        /// Skip the Redis write and print the pair instead.
        #[arg(long, default_value_t = false)]
        dry_run: bool,

        /// Print the run report as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print the resolved configuration as TOML (secret key redacted).
    Config {
        #[command(flatten)]
        source: ConfigSource,

        /// Object key to show (overrides `run.s3_key`).
        #[arg(long)]
        s3_key: Option<String>,
    },
}

#[derive(Args)]
struct ConfigSource {
    /// Path to a TOML config file.
    #[arg(long, conflicts_with = "docker")]
    config: Option<PathBuf>,

    /// Use the docker-compose profile (LocalStack + redis service).
    #[arg(long, default_value_t = false)]
    docker: bool,
}

impl ConfigSource {
    fn resolve(&self, s3_key: Option<String>) -> Result<PipelineConfig> {
        let config = match (&self.config, self.docker) {
            (Some(path), _) => PipelineConfig::from_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            (None, true) => PipelineConfig::docker(""),
            (None, false) => bail!("pass --config <PATH> or --docker"),
        };
        Ok(match s3_key {
            Some(key) => config.with_s3_key(key),
            None => config,
        })
    }
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            source,
            s3_key,
            local_root,
            dry_run,
            json,
        } => run_cmd(source.resolve(s3_key)?, local_root, dry_run, json),
        Commands::Config { source, s3_key } => config_cmd(source.resolve(s3_key)?),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_cmd(
    config: PipelineConfig,
    local_root: Option<PathBuf>,
    dry_run: bool,
    json: bool,
) -> Result<()> {
    config.validate()?;

    let objects: Box<dyn ObjectStore> = match local_root {
        Some(root) => Box::new(FsObjectStore::new(root)),
        None => Box::new(S3ObjectStore::new(config.s3.clone()).context("building S3 client")?),
    };

    let report = if dry_run {
        warn!("dry run: nothing will be written to redis");
        let kv = MemoryKeyValueStore::new();
        run_pipeline(&config.run, objects.as_ref(), &kv)?
    } else {
        let kv: Box<dyn KeyValueStore> =
            Box::new(RedisStore::new(&config.redis).context("binding redis")?);
        run_pipeline(&config.run, objects.as_ref(), kv.as_ref())?
    };

    print_report(&report, json)
}

fn print_report(report: &RunReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("Object:   {}", report.s3_key);
        println!("Records:  {}", report.record_count);
        println!("Dataset:  {}", report.dataset_hash);
        println!(
            "Written:  {} = {}",
            report.published.key, report.published.value
        );
    }
    Ok(())
}

fn config_cmd(config: PipelineConfig) -> Result<()> {
    print!("{}", config.to_redacted_toml()?);
    Ok(())
}
