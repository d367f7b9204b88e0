use std::time::Duration;

use crate::app::pipeline::{run_pipeline, PipelineSummary};
use crate::app::session::ScrapeSession;
use crate::config::{validate_config, Config};
use crate::error::Result;
use crate::fetch::ReqwestClient;

/// Entry point used by `main`: build the HTTP client and session, then run the pipeline.
pub async fn run(config: Config) -> Result<PipelineSummary> {
    validate_config(&config)?;

    log::info!(
        "scraping `{}` in `{}` with {} worker(s)",
        config.tag,
        config.category,
        config.worker_count()
    );

    let client = ReqwestClient::new(Duration::from_secs(config.request_timeout_secs))?;
    let session = ScrapeSession::new(client, config)?;
    run_pipeline(&session).await
}
