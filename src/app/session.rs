use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Local};
use reqwest::header::HeaderMap;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::fetch::documents::{ACTIVITY_KEY, PRODUCTS_KEY};
use crate::fetch::request::{activity_url, build_headers};
use crate::fetch::{
    annotate_sales_history, fetch_all, fetch_document, resolve_pages, Accumulator, FetchReport,
    HttpClient,
};
use crate::records::join::PRODUCT_KEY_COLUMN;
use crate::records::{project, Table};

/// Run-scoped scraper state: the transport, the request headers fixed at construction,
/// and one accumulator each for product pages and sales histories.
pub struct ScrapeSession<C> {
    client: C,
    headers: HeaderMap,
    config: Config,
    products: Accumulator,
    sales: Accumulator,
    started_at: DateTime<Local>,
}

impl<C: HttpClient> ScrapeSession<C> {
    pub fn new(client: C, config: Config) -> Result<Self> {
        let headers = build_headers(&config.headers)?;
        Ok(Self {
            client,
            headers,
            config,
            products: Accumulator::new(),
            sales: Accumulator::new(),
            started_at: Local::now(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    /// Listing page URLs for a tag/category query.
    pub async fn category_urls(&self, tag: &str, category: &str) -> Result<Vec<String>> {
        resolve_pages(
            &self.client,
            &self.headers,
            &self.config.browse_endpoint,
            tag,
            category,
        )
        .await
    }

    /// Fetch every listing page into the product accumulator.
    pub async fn scrape_products(&self, urls: &[String]) -> Result<FetchReport> {
        fetch_all(
            urls,
            self.config.worker_count(),
            self.config.failure_policy,
            |url| async move {
                let document = fetch_document(&self.client, &self.headers, &url).await?;
                self.products.append(document);
                Ok::<_, AppError>(())
            },
        )
        .await
    }

    /// Fetch the sales activity of every product into the sales accumulator, stamping each
    /// activity entry with the product id its URL was built from.
    pub async fn scrape_sales_history(&self, product_ids: &[String]) -> Result<FetchReport> {
        let mut urls = Vec::with_capacity(product_ids.len());
        let mut ids_by_url = HashMap::with_capacity(product_ids.len());
        for id in product_ids {
            let url = activity_url(&self.config.products_endpoint, id, &self.config.activity)?;
            ids_by_url.insert(url.clone(), id.as_str());
            urls.push(url);
        }
        let ids_by_url = &ids_by_url;

        fetch_all(
            &urls,
            self.config.worker_count(),
            self.config.failure_policy,
            |url| async move {
                let product_id = ids_by_url
                    .get(&url)
                    .copied()
                    .ok_or_else(|| AppError::JoinKey { url: url.clone() })?;
                let document = fetch_document(&self.client, &self.headers, &url).await?;
                self.sales.append(annotate_sales_history(document, product_id)?);
                Ok::<_, AppError>(())
            },
        )
        .await
    }

    /// Project the fetched product pages into one table, consuming them.
    pub fn product_table(&self) -> Result<Table> {
        project(
            &self.products.drain(),
            PRODUCTS_KEY,
            self.config.failure_policy,
        )
    }

    /// Project the fetched sales histories into one table, consuming them.
    pub fn sales_table(&self) -> Result<Table> {
        project(&self.sales.drain(), ACTIVITY_KEY, self.config.failure_policy)
    }

    pub fn pending_documents(&self) -> (usize, usize) {
        (self.products.len(), self.sales.len())
    }

    /// Forget everything fetched so far so the session can run again.
    pub fn reset(&self) {
        self.products.clear();
        self.sales.clear();
    }
}

/// Distinct product ids from the product table's key column, in table order.
pub fn product_ids(products: &Table) -> Result<Vec<String>> {
    if !products.is_empty() && !products.has_column(PRODUCT_KEY_COLUMN) {
        return Err(AppError::schema("product table", PRODUCT_KEY_COLUMN));
    }

    let mut seen = HashSet::new();
    Ok(products
        .column_values(PRODUCT_KEY_COLUMN)
        .filter_map(|value| match value {
            serde_json::Value::String(id) => Some(id.clone()),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        })
        .filter(|id| !id.is_empty() && seen.insert(id.clone()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FailurePolicy;
    use crate::fetch::transport::testing::StaticClient;
    use serde_json::json;

    fn test_config() -> Config {
        let mut config = Config::builtin();
        config.browse_endpoint = "https://stockx.test/api/browse".to_string();
        config.products_endpoint = "https://stockx.test/api/products".to_string();
        config.workers = Some(2);
        config
            .headers
            .insert("X-Requested-With".to_string(), "XMLHttpRequest".to_string());
        config
    }

    #[tokio::test]
    async fn headers_are_sent_with_every_request() {
        let config = test_config();
        let urls = vec![
            "https://stockx.test/page/1".to_string(),
            "https://stockx.test/page/2".to_string(),
        ];
        let client = StaticClient::new()
            .with_body(urls[0].clone(), r#"{"Products": []}"#)
            .with_body(urls[1].clone(), r#"{"Products": []}"#);
        let session = ScrapeSession::new(client, config).expect("session builds");

        session.scrape_products(&urls).await.expect("pages fetch");

        let seen = session.client.seen_headers();
        assert_eq!(seen.len(), 2);
        assert!(seen
            .iter()
            .all(|headers| headers["x-requested-with"] == "XMLHttpRequest"));
    }

    #[tokio::test]
    async fn sales_history_rows_carry_their_product_id() {
        let config = test_config();
        let ids = vec!["jordan-1".to_string(), "jordan-4".to_string()];
        let client = ids.iter().fold(StaticClient::new(), |client, id| {
            let url = activity_url(&config.products_endpoint, id, &config.activity).unwrap();
            client.with_body(
                url,
                json!({ "ProductActivity": [{ "amount": 1 }, { "amount": 2 }] }).to_string(),
            )
        });
        let session = ScrapeSession::new(client, config).expect("session builds");

        let report = session.scrape_sales_history(&ids).await.expect("sales fetch");
        assert_eq!(report.succeeded, 2);

        let sales = session.sales_table().expect("sales project");
        assert_eq!(sales.len(), 4);
        let mut ids: Vec<&str> = sales
            .column_values("productId")
            .filter_map(serde_json::Value::as_str)
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, ["jordan-1", "jordan-1", "jordan-4", "jordan-4"]);
    }

    #[tokio::test]
    async fn reset_clears_both_accumulators() {
        let mut config = test_config();
        config.failure_policy = FailurePolicy::Isolate;
        let url = "https://stockx.test/page/1".to_string();
        let client = StaticClient::new().with_body(url.clone(), r#"{"Products": [{"id": "a"}]}"#);
        let session = ScrapeSession::new(client, config).expect("session builds");

        session.scrape_products(&[url]).await.expect("page fetch");
        assert_eq!(session.pending_documents(), (1, 0));

        session.reset();
        assert_eq!(session.pending_documents(), (0, 0));
        assert!(session.product_table().expect("empty table").is_empty());
    }

    #[test]
    fn product_ids_are_distinct_and_ordered() {
        let mut table = Table::new();
        for id in [json!("b"), json!("a"), json!(null), json!("b"), json!(42)] {
            table.push_row(vec![("id".to_string(), id)]);
        }

        assert_eq!(product_ids(&table).expect("ids"), ["b", "a", "42"]);
    }

    #[test]
    fn product_table_without_id_column_is_a_schema_error() {
        let mut table = Table::new();
        table.push_row(vec![("title".to_string(), json!("Jordan 1"))]);

        let err = product_ids(&table).expect_err("no id column");
        assert!(matches!(err, AppError::Schema { .. }));
    }
}
