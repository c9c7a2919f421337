use std::path::Path;

use page_notebook::config::{DEFAULT_OUTPUT_DIR, DEFAULT_URL};
use page_notebook::{scrape_page, FetchConfig, ScrapeError};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), ScrapeError> {
    page_notebook::init_tracing();

    match scrape_page(DEFAULT_URL, Path::new(DEFAULT_OUTPUT_DIR), &FetchConfig::default()).await {
        Ok(_) => Ok(()),
        // Already logged; a failed fetch is not a process failure.
        Err(ScrapeError::Fetch(_)) => Ok(()),
        Err(e) => Err(e),
    }
}
