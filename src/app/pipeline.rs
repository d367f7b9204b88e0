use std::fmt;
use std::path::PathBuf;

use crate::error::{Result, Stage, StageExt};
use crate::fetch::{FetchReport, HttpClient};
use crate::records::{join, save_csv, Table};
use crate::utils::elapsed_secs;

use super::session::{product_ids, ScrapeSession};

/// Counts gathered along one pipeline run.
#[derive(Debug)]
pub struct PipelineSummary {
    pub pages: usize,
    pub product_pages: FetchReport,
    pub product_rows: usize,
    pub sales_histories: FetchReport,
    pub sales_rows: usize,
    pub joined_rows: usize,
    pub columns: usize,
    pub output: Option<PathBuf>,
    pub elapsed_secs: f64,
}

impl fmt::Display for PipelineSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "listing pages:   {} ({} failed)",
            self.pages,
            self.product_pages.failures.len()
        )?;
        writeln!(f, "products:        {}", self.product_rows)?;
        writeln!(
            f,
            "sales histories: {} ({} failed)",
            self.sales_histories.succeeded,
            self.sales_histories.failures.len()
        )?;
        writeln!(
            f,
            "joined rows:     {} x {} columns",
            self.joined_rows, self.columns
        )?;
        if let Some(output) = &self.output {
            writeln!(f, "written to:      {}", output.display())?;
        }
        write!(f, "elapsed:         {:.2}s", self.elapsed_secs)
    }
}

/// Merged sales/product table plus the counts that produced it.
#[derive(Debug)]
pub struct Dataset {
    pub table: Table,
    pub summary: PipelineSummary,
}

/// Resolve pages, fetch products, fetch their sales histories and join the two tables.
///
/// Errors carry the stage they happened in.
pub async fn collect_dataset<C: HttpClient>(session: &ScrapeSession<C>) -> Result<Dataset> {
    let config = session.config();

    let pages = session
        .category_urls(&config.tag, &config.category)
        .await
        .stage(Stage::Resolve)?;

    let product_pages = session
        .scrape_products(&pages)
        .await
        .stage(Stage::FetchProducts)?;
    log::info!(
        "fetched {}/{} listing page(s)",
        product_pages.succeeded,
        product_pages.attempted
    );

    let products = session.product_table().stage(Stage::Project)?;
    let ids = product_ids(&products).stage(Stage::Project)?;
    log::info!(
        "{} product row(s), {} distinct product id(s)",
        products.len(),
        ids.len()
    );

    let sales_histories = session
        .scrape_sales_history(&ids)
        .await
        .stage(Stage::FetchSales)?;
    log::info!(
        "fetched {}/{} sales histories",
        sales_histories.succeeded,
        sales_histories.attempted
    );

    let sales = session.sales_table().stage(Stage::Project)?;
    let sales_rows = sales.len();

    let table = join(sales, &products).stage(Stage::Join)?;
    log::info!(
        "joined {} sales row(s) against {} product row(s)",
        table.len(),
        products.len()
    );

    let summary = PipelineSummary {
        pages: pages.len(),
        product_pages,
        product_rows: products.len(),
        sales_histories,
        sales_rows,
        joined_rows: table.len(),
        columns: table.columns().len(),
        output: None,
        elapsed_secs: elapsed_secs(session.started_at()),
    };

    Ok(Dataset { table, summary })
}

/// Full run: collect the dataset and write it to the configured output path.
///
/// Nothing is written when any stage fails.
pub async fn run_pipeline<C: HttpClient>(session: &ScrapeSession<C>) -> Result<PipelineSummary> {
    let Dataset { table, mut summary } = collect_dataset(session).await?;

    let path = save_csv(&table, &session.config().output_path).stage(Stage::Write)?;
    log::info!("wrote {} row(s) to {}", table.len(), path.display());

    summary.output = Some(path);
    summary.elapsed_secs = elapsed_secs(session.started_at());
    Ok(summary)
}
