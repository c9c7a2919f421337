use std::fs;
use std::path::{Path, PathBuf};

use scraper::{Html, Selector};

use crate::config::ConvertConfig;
use crate::dom::{document_find_first, has_body_tag, select_first};
use crate::markdown::{element_to_markdown, MarkdownOptions};
use crate::models::Notebook;

// ── Error type ───────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("no body tag found in HTML")]
    MissingBody,
    #[error("invalid container selector `{0}`")]
    InvalidSelector(String),
    #[error("failed to serialize notebook: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

// ── Public API ───────────────────────────────────────────────────────────────

/// Convert a saved HTML file into a single-cell markdown notebook at
/// `output_file`. A document without `<body>` is logged and nothing is
/// written.
pub fn create_notebook_from_html(
    html_file: &Path,
    output_file: &Path,
    config: &ConvertConfig,
) -> Result<Notebook, ConvertError> {
    tracing::info!("reading HTML file: {}", html_file.display());
    let html = fs::read_to_string(html_file).map_err(|source| ConvertError::Read {
        path: html_file.to_path_buf(),
        source,
    })?;

    let notebook = match build_notebook(&html, config) {
        Ok(notebook) => notebook,
        Err(ConvertError::MissingBody) => {
            tracing::error!("no body tag found in {}", html_file.display());
            return Err(ConvertError::MissingBody);
        }
        Err(e) => return Err(e),
    };

    tracing::info!("saving notebook to: {}", output_file.display());
    let json = render_notebook(&notebook)?;
    fs::write(output_file, json).map_err(|source| ConvertError::Write {
        path: output_file.to_path_buf(),
        source,
    })?;

    tracing::info!("notebook created successfully");
    Ok(notebook)
}

/// Parse `html`, scope it to the content container and wrap the Markdown in a
/// notebook.
pub fn build_notebook(html: &str, config: &ConvertConfig) -> Result<Notebook, ConvertError> {
    let container_sel = Selector::parse(&config.container_selector)
        .map_err(|_| ConvertError::InvalidSelector(config.container_selector.clone()))?;

    if !has_body_tag(html) {
        return Err(ConvertError::MissingBody);
    }
    let document = Html::parse_document(html);
    let body = document_find_first(&document, "body").ok_or(ConvertError::MissingBody)?;

    let scope = match select_first(body, &container_sel) {
        Some(container) => {
            tracing::debug!(selector = %config.container_selector, "using content container");
            container
        }
        None => body,
    };

    tracing::info!("converting HTML to markdown");
    let markdown = element_to_markdown(scope, &MarkdownOptions::default());

    Ok(Notebook::from_markdown(markdown.trim()))
}

/// Pretty JSON, two-space indent, non-ASCII kept literal.
pub fn render_notebook(notebook: &Notebook) -> Result<String, ConvertError> {
    Ok(serde_json::to_string_pretty(notebook)?)
}
