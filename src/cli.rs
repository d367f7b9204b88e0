use std::path::PathBuf;

use clap::Parser;

use crate::config::{load_config, validate_config, Config, FailurePolicy};
use crate::error::Result;

#[derive(Debug, Parser)]
#[command(name = "stockx-scraper")]
#[command(about = "Fetch StockX listings and sales history into one CSV")]
#[command(version)]
pub struct Cli {
    /// JSON config file merged over the built-in defaults
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Product tag to browse (e.g. "air jordan")
    #[arg(short, long)]
    pub tag: Option<String>,

    /// Product category to browse (e.g. "sneakers")
    #[arg(long)]
    pub category: Option<String>,

    /// Number of concurrent requests; defaults to available parallelism
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Output CSV path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Keep going when single requests fail and report them at the end
    #[arg(long)]
    pub isolate_failures: bool,
}

impl Cli {
    /// Built-in or file config with command line overrides applied.
    pub fn resolve_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => Config::builtin(),
        };

        if let Some(tag) = &self.tag {
            config.tag = tag.clone();
        }
        if let Some(category) = &self.category {
            config.category = category.clone();
        }
        if let Some(workers) = self.workers {
            config.workers = Some(workers);
        }
        if let Some(output) = &self.output {
            config.output_path = output.clone();
        }
        if self.isolate_failures {
            config.failure_policy = FailurePolicy::Isolate;
        }

        validate_config(&config)?;
        Ok(config)
    }
}
