pub mod bootstrap;
pub mod pipeline;
pub mod session;

pub use bootstrap::run;
pub use pipeline::{collect_dataset, run_pipeline, Dataset, PipelineSummary};
pub use session::{product_ids, ScrapeSession};
