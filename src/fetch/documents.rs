use reqwest::header::HeaderMap;
use serde_json::Value;

use crate::error::AppError;

use super::accumulator::FetchedDocument;
use super::transport::HttpClient;
use super::FetchResult;

pub const PRODUCTS_KEY: &str = "Products";
pub const ACTIVITY_KEY: &str = "ProductActivity";
pub const PRODUCT_ID_FIELD: &str = "productId";

/// GET a URL and parse the body as JSON.
pub async fn fetch_document<C: HttpClient>(
    client: &C,
    headers: &HeaderMap,
    url: &str,
) -> FetchResult<FetchedDocument> {
    let body = client.get(url, headers).await?;
    let json: Value = serde_json::from_str(&body)
        .map_err(|err| AppError::parse(url, format!("invalid JSON: {err}")))?;
    Ok(FetchedDocument::new(url, json))
}

/// Stamp the id of the product the history was requested for onto every activity entry.
///
/// The payload does not carry the id reliably, so the requested id always wins.
pub fn annotate_sales_history(
    mut document: FetchedDocument,
    product_id: &str,
) -> FetchResult<FetchedDocument> {
    if product_id.is_empty() {
        return Err(AppError::JoinKey {
            url: document.url.clone(),
        });
    }

    let entries = document
        .body
        .get_mut(ACTIVITY_KEY)
        .and_then(Value::as_array_mut)
        .ok_or_else(|| AppError::schema(document.url.clone(), ACTIVITY_KEY))?;

    for entry in entries.iter_mut() {
        if let Some(fields) = entry.as_object_mut() {
            fields.insert(
                PRODUCT_ID_FIELD.to_string(),
                Value::String(product_id.to_string()),
            );
        }
    }

    Ok(document)
}
