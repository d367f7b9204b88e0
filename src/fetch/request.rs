use std::collections::HashMap;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Url;

use crate::config::ActivityQuery;
use crate::error::AppError;

use super::FetchResult;

/// Listing URL for one page of a tag/category query.
pub fn browse_page_url(
    endpoint: &str,
    tag: &str,
    category: &str,
    page: u32,
) -> FetchResult<String> {
    let mut url = parse_endpoint(endpoint)?;
    url.query_pairs_mut()
        .append_pair("_tags", tag)
        .append_pair("productCategory", category)
        .append_pair("page", &page.to_string());
    Ok(url.into())
}

/// Sales-activity URL for a product: `{endpoint}/{product_id}/activity?...`.
pub fn activity_url(
    endpoint: &str,
    product_id: &str,
    query: &ActivityQuery,
) -> FetchResult<String> {
    let mut url = parse_endpoint(endpoint)?;
    url.path_segments_mut()
        .map_err(|_| AppError::Config(format!("endpoint `{endpoint}` cannot carry a path")))?
        .pop_if_empty()
        .push(product_id)
        .push("activity");
    url.query_pairs_mut()
        .append_pair("state", &query.state.to_string())
        .append_pair("currency", &query.currency)
        .append_pair("limit", &query.limit.to_string())
        .append_pair("page", &query.page.to_string());
    Ok(url.into())
}

fn parse_endpoint(endpoint: &str) -> FetchResult<Url> {
    Url::parse(endpoint)
        .map_err(|err| AppError::Config(format!("endpoint `{endpoint}` is not a valid URL: {err}")))
}

/// Substitute `${VAR}` placeholders in a header value from the environment.
pub fn expand_env_vars(value: &str) -> FetchResult<String> {
    let mut expanded = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        expanded.push_str(&rest[..start]);
        let placeholder = &rest[start + 2..];
        let end = placeholder.find('}').ok_or_else(|| {
            AppError::message(format!("unterminated `${{` placeholder in `{value}`"))
        })?;

        let name = &placeholder[..end];
        if name.is_empty() {
            return Err(AppError::message(format!("empty `${{}}` placeholder in `{value}`")));
        }
        let resolved = std::env::var(name).map_err(|_| {
            AppError::message(format!("environment variable {name} used in a header is not set"))
        })?;
        expanded.push_str(&resolved);
        rest = &placeholder[end + 1..];
    }

    expanded.push_str(rest);
    Ok(expanded)
}

/// Build the header map shared by every request of a session.
pub fn build_headers(headers: &HashMap<String, String>) -> FetchResult<HeaderMap> {
    headers
        .iter()
        .map(|(key, value)| -> FetchResult<(HeaderName, HeaderValue)> {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|err| AppError::Config(format!("header name `{key}`: {err}")))?;
            let value = HeaderValue::from_str(&expand_env_vars(value)?)
                .map_err(|err| AppError::Config(format!("header `{key}` has an invalid value: {err}")))?;
            Ok((name, value))
        })
        .collect()
}
