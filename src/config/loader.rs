use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::error::{Context, Result};

use super::{validator, ActivityQuery, Config, FailurePolicy};

/// On-disk shape of the config file. Every field is optional and falls back to the built-ins.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    browse_endpoint: Option<String>,
    products_endpoint: Option<String>,
    tag: Option<String>,
    category: Option<String>,
    headers: HashMap<String, String>,
    activity: Option<RawActivityQuery>,
    workers: Option<usize>,
    request_timeout_secs: Option<u64>,
    failure_policy: Option<FailurePolicy>,
    output_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawActivityQuery {
    state: Option<u32>,
    currency: Option<String>,
    limit: Option<u32>,
    page: Option<u32>,
}

impl RawActivityQuery {
    fn merge_into(self, base: ActivityQuery) -> ActivityQuery {
        ActivityQuery {
            state: self.state.unwrap_or(base.state),
            currency: self.currency.unwrap_or(base.currency),
            limit: self.limit.unwrap_or(base.limit),
            page: self.page.unwrap_or(base.page),
        }
    }
}

impl RawConfig {
    fn merge_into(self, base: Config) -> Config {
        // Header entries from the file override built-in entries of the same name.
        let mut headers = base.headers;
        headers.extend(self.headers);

        Config {
            browse_endpoint: self.browse_endpoint.unwrap_or(base.browse_endpoint),
            products_endpoint: self.products_endpoint.unwrap_or(base.products_endpoint),
            tag: self.tag.unwrap_or(base.tag),
            category: self.category.unwrap_or(base.category),
            headers,
            activity: match self.activity {
                Some(raw) => raw.merge_into(base.activity),
                None => base.activity,
            },
            workers: self.workers.or(base.workers),
            request_timeout_secs: self
                .request_timeout_secs
                .unwrap_or(base.request_timeout_secs),
            failure_policy: self.failure_policy.unwrap_or(base.failure_policy),
            output_path: self.output_path.unwrap_or(base.output_path),
        }
    }
}

/// Parse a JSON config document on top of the built-in defaults and validate the result.
pub fn parse_config(json: &str) -> Result<Config> {
    let raw: RawConfig = serde_json::from_str(json).context("failed to parse config JSON")?;
    let config = raw.merge_into(Config::builtin());
    validator::validate_config(&config)?;
    Ok(config)
}

/// Load the JSON config at `path`, merged over the built-in defaults.
pub fn load_config(path: &Path) -> Result<Config> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read config JSON at {}", path.display()))?;

    log::debug!("loaded config file {}", path.display());
    parse_config(&json)
}
