use std::fs;
use std::path::{Path, PathBuf};

use scraper::Html;

use crate::config::{FetchConfig, HTML_FILE, REPORT_FILE, TEXT_FILE};
use crate::fetch::{fetch_page, FetchError};
use crate::report::{visible_text, StructuredReport};

#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("error fetching page: {0}")]
    Fetch(#[from] FetchError),
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Paths of the three artifacts written for one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapedPage {
    pub html: PathBuf,
    pub text: PathBuf,
    pub report: PathBuf,
}

/// Fetch `url` once and write `page.html`, `page.txt` and
/// `structured_data.txt` into `output_dir`. A failed fetch is logged and
/// leaves the filesystem untouched.
pub async fn scrape_page(
    url: &str,
    output_dir: &Path,
    config: &FetchConfig,
) -> Result<ScrapedPage, ScrapeError> {
    tracing::info!("fetching content from {}", url);
    let page = match fetch_page(url, config).await {
        Ok(page) => page,
        Err(e) => {
            tracing::error!("error fetching page: {}", e);
            return Err(e.into());
        }
    };

    tracing::info!(
        url = %page.url,
        status = %page.status,
        bytes = page.body.len(),
        "page fetched"
    );

    write_artifacts(&page.body, output_dir)
}

/// Write the raw body and its derived text views.
pub fn write_artifacts(body: &[u8], output_dir: &Path) -> Result<ScrapedPage, ScrapeError> {
    create_dir(output_dir)?;

    tracing::info!("parsing HTML content");
    let document = Html::parse_document(&String::from_utf8_lossy(body));

    let html = output_dir.join(HTML_FILE);
    write_file(&html, body)?;
    tracing::info!("saved raw HTML to {}", html.display());

    let text = output_dir.join(TEXT_FILE);
    write_file(&text, visible_text(&document).as_bytes())?;
    tracing::info!("saved text content to {}", text.display());

    let report = output_dir.join(REPORT_FILE);
    let structured = StructuredReport::from_document(&document);
    tracing::debug!(
        links = structured.links.len(),
        tables = structured.tables.len(),
        headings = structured.headings.len(),
        "structured data extracted"
    );
    write_file(&report, structured.render().as_bytes())?;
    tracing::info!("saved structured data to {}", report.display());

    tracing::info!("scraping completed successfully");
    Ok(ScrapedPage { html, text, report })
}

fn create_dir(dir: &Path) -> Result<(), ScrapeError> {
    fs::create_dir_all(dir).map_err(|source| ScrapeError::Io {
        path: dir.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, contents: &[u8]) -> Result<(), ScrapeError> {
    fs::write(path, contents).map_err(|source| ScrapeError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_three_artifacts() {
        let tmp = tempfile::TempDir::new().unwrap();
        let out = tmp.path().join("nested").join("out");
        let body = "<html><body><h1>T</h1><a href=\"/x\">X</a></body></html>".as_bytes();

        let written = write_artifacts(body, &out).unwrap();

        assert_eq!(fs::read(&written.html).unwrap(), body);
        assert_eq!(fs::read_to_string(&written.text).unwrap(), "T\nX");
        let report = fs::read_to_string(&written.report).unwrap();
        assert!(report.starts_with("=== LINKS ===\nX: /x\n"));
        assert!(report.ends_with("=== HEADINGS ===\n# T\n"));
    }

    #[test]
    fn existing_directory_is_reused() {
        let tmp = tempfile::TempDir::new().unwrap();
        write_artifacts(b"<p>one</p>", tmp.path()).unwrap();
        let written = write_artifacts(b"<p>two</p>", tmp.path()).unwrap();
        assert_eq!(fs::read_to_string(written.text).unwrap(), "two");
    }
}
