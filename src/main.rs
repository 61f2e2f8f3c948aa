//! freqpairs - time A-Priori and PCY over shrinking dataset sizes

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use freqpairs::{run_study, Algorithm, StudyConfig};

#[derive(Parser)]
#[command(name = "freqpairs")]
#[command(version)]
#[command(about = "Benchmark A-Priori and PCY frequent pair mining", long_about = None)]
struct Cli {
    /// Path to a TOML study configuration
    #[arg(short, long, env = "FREQPAIRS_CONFIG")]
    config: Option<PathBuf>,

    /// Dataset file, one basket of whitespace separated item ids per line
    #[arg(env = "FREQPAIRS_DATASET")]
    dataset: Option<PathBuf>,

    /// Support threshold as a fraction of the baskets scanned
    #[arg(short, long, env = "FREQPAIRS_SUPPORT")]
    support: Option<f64>,

    /// Dataset sizes in percent, starting at 100 (e.g. 100,50,10,1)
    #[arg(long, value_delimiter = ',')]
    schedule: Option<Vec<u32>>,

    /// Algorithms to run: apriori, pcy
    #[arg(short, long = "algorithm", value_delimiter = ',')]
    algorithms: Option<Vec<Algorithm>>,

    /// Load the dataset into memory and shard passes across threads
    #[arg(long)]
    parallel: bool,

    /// Print the N most frequent pairs of each round
    #[arg(long)]
    top: Option<usize>,
}

impl Cli {
    fn into_config(self) -> Result<StudyConfig> {
        let mut config = match &self.config {
            Some(path) => StudyConfig::load(path)?,
            None => StudyConfig::default(),
        };

        if let Some(dataset) = self.dataset {
            config.dataset = dataset;
        }
        if let Some(support) = self.support {
            config.support = support;
        }
        if let Some(schedule) = self.schedule {
            config.schedule = schedule;
        }
        if let Some(algorithms) = self.algorithms {
            config.algorithms = algorithms;
        }
        if let Some(top) = self.top {
            config.top = top;
        }
        config.parallel |= self.parallel;

        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    // stdout carries the report
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "freqpairs=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Cli::parse().into_config()?;
    tracing::info!(
        dataset = %config.dataset.display(),
        support = config.support,
        parallel = config.parallel,
        "starting study"
    );

    let reports = run_study(&config)
        .with_context(|| format!("study over {} failed", config.dataset.display()))?;
    for report in &reports {
        println!("{}", report);
    }

    Ok(())
}
