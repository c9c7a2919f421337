//! Fetch a web page into text artifacts, and turn saved HTML into a
//! single-cell markdown notebook.

pub mod config;
pub mod dom;
pub mod fetch;
pub mod markdown;
pub mod models;
pub mod notebook;
pub mod report;
pub mod scrape;

pub use config::{ConvertConfig, FetchConfig};
pub use notebook::{create_notebook_from_html, ConvertError};
pub use scrape::{scrape_page, ScrapeError, ScrapedPage};

/// Install the stdout `tracing` subscriber. `RUST_LOG` overrides the default
/// `info` filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();
}
