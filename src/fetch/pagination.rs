use reqwest::header::HeaderMap;
use serde_json::Value;

use crate::error::AppError;

use super::request::browse_page_url;
use super::transport::HttpClient;
use super::FetchResult;

/// Discover how many listing pages a tag/category query has and return one URL per page.
///
/// Issues a single request for page 1. Either every page URL is produced or none.
pub async fn resolve_pages<C: HttpClient>(
    client: &C,
    headers: &HeaderMap,
    endpoint: &str,
    tag: &str,
    category: &str,
) -> FetchResult<Vec<String>> {
    let first_page = browse_page_url(endpoint, tag, category, 1)?;
    let body = client.get(&first_page, headers).await?;
    let last_page = parse_last_page(&first_page, &body)?;

    log::info!("{tag}/{category}: {last_page} listing page(s)");

    (1..=last_page)
        .map(|page| browse_page_url(endpoint, tag, category, page))
        .collect()
}

/// Read `Pagination.lastPage` from a listing response and pull the page number out of it.
pub fn parse_last_page(url: &str, body: &str) -> FetchResult<u32> {
    let json: Value = serde_json::from_str(body)
        .map_err(|err| AppError::parse(url, format!("invalid JSON: {err}")))?;

    let last_page_url = json
        .get("Pagination")
        .and_then(|pagination| pagination.get("lastPage"))
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::parse(url, "missing Pagination.lastPage"))?;

    match page_param(last_page_url) {
        Some(page) if page >= 1 => Ok(page),
        _ => Err(AppError::parse(
            url,
            format!("no usable page parameter in Pagination.lastPage `{last_page_url}`"),
        )),
    }
}

/// Value of the `page` query parameter in a (possibly relative) URL: digits after `page=`
/// up to the next `&` or the end of the string.
fn page_param(url: &str) -> Option<u32> {
    let mut search_from = 0;
    while let Some(offset) = url[search_from..].find("page=") {
        let start = search_from + offset;
        let at_param_boundary = start == 0 || matches!(url.as_bytes()[start - 1], b'?' | b'&');
        let value_start = start + "page=".len();

        if at_param_boundary {
            let rest = &url[value_start..];
            let value = rest.split('&').next().unwrap_or_default();
            return value.parse().ok();
        }
        search_from = value_start;
    }
    None
}
