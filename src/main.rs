use std::process::ExitCode;

use clap::Parser;
use env_logger::Env;

use stockx_scraper::cli::Cli;
use stockx_scraper::utils::current_human_timestamp;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = match cli.resolve_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    match stockx_scraper::app::run(config).await {
        Ok(summary) => {
            println!("Finished on {}.", current_human_timestamp());
            println!("{summary}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("scrape failed: {err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
