use std::time::Duration;

// ── Defaults used by the binaries ────────────────────────────────────────────

pub const DEFAULT_URL: &str = "https://diophontine.github.io/csc490/";
pub const DEFAULT_OUTPUT_DIR: &str = "scraped_content";
pub const DEFAULT_NOTEBOOK_INPUT: &str = "scraped_content/page.html";
pub const DEFAULT_NOTEBOOK_OUTPUT: &str = "scraped_content/page.ipynb";

// ── Artifact file names ──────────────────────────────────────────────────────

pub const HTML_FILE: &str = "page.html";
pub const TEXT_FILE: &str = "page.txt";
pub const REPORT_FILE: &str = "structured_data.txt";

const USER_AGENT: &str = "page-notebook/0.1";

/// HTTP settings for the single page fetch.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: USER_AGENT.to_string(),
            max_redirects: 10,
        }
    }
}

/// Settings for the HTML → notebook conversion.
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    /// CSS selector for the primary content container. The first match inside
    /// `<body>` is converted; without a match the whole body is.
    pub container_selector: String,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            container_selector: "div.container-lg".to_string(),
        }
    }
}

impl ConvertConfig {
    pub fn with_container_selector(mut self, selector: impl Into<String>) -> Self {
        self.container_selector = selector.into();
        self
    }
}
