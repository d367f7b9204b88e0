use reqwest::header::HeaderName;
use reqwest::Url;

use crate::error::{AppError, Result};

use super::Config;

/// Validate a config and surface every issue at once.
pub fn validate_config(config: &Config) -> Result<()> {
    let mut issues = Vec::new();

    validate_endpoint("browse_endpoint", &config.browse_endpoint, &mut issues);
    validate_endpoint("products_endpoint", &config.products_endpoint, &mut issues);
    validate_query(config, &mut issues);
    validate_headers(config, &mut issues);
    validate_runtime(config, &mut issues);

    if issues.is_empty() {
        Ok(())
    } else {
        Err(AppError::Config(format!("\n  - {}", issues.join("\n  - "))))
    }
}

fn validate_endpoint(name: &str, value: &str, issues: &mut Vec<String>) {
    if value.trim().is_empty() {
        issues.push(format!("{name} must not be empty"));
        return;
    }
    match Url::parse(value) {
        Ok(url) if url.cannot_be_a_base() => {
            issues.push(format!("{name} `{value}` cannot carry path segments"));
        }
        Ok(_) => {}
        Err(err) => issues.push(format!("{name} `{value}` is not a valid URL: {err}")),
    }
}

fn validate_query(config: &Config, issues: &mut Vec<String>) {
    if config.tag.trim().is_empty() {
        issues.push("tag must not be empty".to_string());
    }
    if config.category.trim().is_empty() {
        issues.push("category must not be empty".to_string());
    }
    if config.activity.currency.trim().is_empty() {
        issues.push("activity.currency must not be empty".to_string());
    }
}

fn validate_headers(config: &Config, issues: &mut Vec<String>) {
    // Values may hold `${VAR}` placeholders, so only names are checked up front.
    for name in config.headers.keys() {
        if HeaderName::from_bytes(name.as_bytes()).is_err() {
            issues.push(format!("header name `{name}` is invalid"));
        }
    }
}

fn validate_runtime(config: &Config, issues: &mut Vec<String>) {
    if config.workers == Some(0) {
        issues.push("workers must be at least 1".to_string());
    }
    if config.request_timeout_secs == 0 {
        issues.push("request_timeout_secs must be greater than zero".to_string());
    }
    if config.output_path.as_os_str().is_empty() {
        issues.push("output_path must not be empty".to_string());
    }
}
