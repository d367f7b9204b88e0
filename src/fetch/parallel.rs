use std::future::Future;

use futures::stream::{self, StreamExt, TryStreamExt};

use crate::config::FailurePolicy;
use crate::error::AppError;

use super::{ensure_concurrency_limit, FetchResult};

/// A URL whose unit of work failed under [`FailurePolicy::Isolate`].
#[derive(Debug)]
pub struct FetchFailure {
    pub url: String,
    pub error: AppError,
}

/// Outcome of one `fetch_all` pass.
#[derive(Debug, Default)]
pub struct FetchReport {
    pub attempted: usize,
    pub succeeded: usize,
    pub failures: Vec<FetchFailure>,
}

impl FetchReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Run `handler(url)` for every URL with at most `workers` units of work in flight.
///
/// The handler owns the whole unit of work (request, parse, append); its only observable
/// effect should be on an accumulator. Under `Abort` the first failure cancels the remaining
/// work and is returned; under `Isolate` every URL is attempted and failures land in the report.
pub async fn fetch_all<F, Fut>(
    urls: &[String],
    workers: usize,
    policy: FailurePolicy,
    handler: F,
) -> FetchResult<FetchReport>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = FetchResult<()>>,
{
    let workers = ensure_concurrency_limit(workers);
    let attempted = urls.len();
    log::debug!("fetching {attempted} url(s) with {workers} worker(s), policy {policy:?}");

    match policy {
        FailurePolicy::Abort => {
            stream::iter(urls.iter().cloned().map(Ok::<_, AppError>))
                .try_for_each_concurrent(workers, &handler)
                .await?;

            Ok(FetchReport {
                attempted,
                succeeded: attempted,
                failures: Vec::new(),
            })
        }
        FailurePolicy::Isolate => {
            let outcomes: Vec<(String, FetchResult<()>)> = stream::iter(urls.iter().cloned())
                .map(|url| {
                    let work = handler(url.clone());
                    async move { (url, work.await) }
                })
                .buffer_unordered(workers)
                .collect()
                .await;

            let mut report = FetchReport {
                attempted,
                ..FetchReport::default()
            };
            for (url, outcome) in outcomes {
                match outcome {
                    Ok(()) => report.succeeded += 1,
                    Err(error) => {
                        log::warn!("skipping {url}: {error}");
                        report.failures.push(FetchFailure { url, error });
                    }
                }
            }
            Ok(report)
        }
    }
}
