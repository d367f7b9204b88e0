use crate::error::Result;

pub mod accumulator;
pub mod documents;
pub mod pagination;
pub mod parallel;
pub mod request;
pub mod transport;

pub use accumulator::{Accumulator, FetchedDocument};
pub use documents::{annotate_sales_history, fetch_document};
pub use pagination::resolve_pages;
pub use parallel::{fetch_all, FetchFailure, FetchReport};
pub use transport::{HttpClient, ReqwestClient};

pub type FetchResult<T> = Result<T>;

#[inline]
pub fn ensure_concurrency_limit(limit: usize) -> usize {
    limit.max(1)
}
