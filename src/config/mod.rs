use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub mod loader;
pub mod validator;

pub use loader::load_config;
pub use validator::validate_config;

pub const DEFAULT_OUTPUT_FILE: &str = "full_data_latest_with_all_info.csv";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// What the fetch stages do when a single URL fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// First failure aborts the whole run.
    #[default]
    Abort,
    /// Every URL is attempted; failures are reported and skipped.
    Isolate,
}

/// Query parameters appended to every sales-activity request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityQuery {
    pub state: u32,
    pub currency: String,
    pub limit: u32,
    pub page: u32,
}

impl Default for ActivityQuery {
    fn default() -> Self {
        Self {
            state: 480,
            currency: "USD".to_string(),
            limit: 10_000,
            page: 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub browse_endpoint: String,
    pub products_endpoint: String,
    pub tag: String,
    pub category: String,
    pub headers: HashMap<String, String>,
    pub activity: ActivityQuery,
    pub workers: Option<usize>,
    pub request_timeout_secs: u64,
    pub failure_policy: FailurePolicy,
    pub output_path: PathBuf,
}

impl Config {
    pub fn builtin() -> Self {
        let headers = HashMap::from([
            (
                "User-Agent".to_string(),
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string(),
            ),
            ("Accept".to_string(), "application/json".to_string()),
            (
                "Accept-Language".to_string(),
                "en-US,en;q=0.9".to_string(),
            ),
        ]);

        Config {
            browse_endpoint: "https://stockx.com/api/browse".to_string(),
            products_endpoint: "https://stockx.com/api/products".to_string(),
            tag: "air jordan".to_string(),
            category: "sneakers".to_string(),
            headers,
            activity: ActivityQuery::default(),
            workers: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            failure_policy: FailurePolicy::Abort,
            output_path: PathBuf::from(DEFAULT_OUTPUT_FILE),
        }
    }

    /// Configured worker count, falling back to the machine's available parallelism.
    pub fn worker_count(&self) -> usize {
        self.workers
            .unwrap_or_else(|| {
                std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(1)
            })
            .max(1)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_count_defaults_to_available_parallelism() {
        let config = Config::builtin();
        assert!(config.worker_count() >= 1);
    }

    #[test]
    fn explicit_worker_count_wins() {
        let mut config = Config::builtin();
        config.workers = Some(3);
        assert_eq!(config.worker_count(), 3);
    }
}
