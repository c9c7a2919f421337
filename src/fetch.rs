use reqwest::StatusCode;
use url::Url;

use crate::config::FetchConfig;

// ── Error type ───────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: StatusCode },
    #[error("{0}")]
    Request(String),
}

// ── Public result type ───────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL after redirects.
    pub url: String,
    pub status: StatusCode,
    /// Response body exactly as received.
    pub body: Vec<u8>,
}

// ── URL validation ───────────────────────────────────────────────────────────

fn validate_url(url: &str) -> Result<Url, FetchError> {
    let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{url}: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(FetchError::InvalidUrl(format!(
            "unsupported scheme `{other}` in {url}"
        ))),
    }
}

// ── HTTP fetch ───────────────────────────────────────────────────────────────

/// Issue one GET for `url`. Non-2xx responses are errors; nothing is retried.
pub async fn fetch_page(url: &str, config: &FetchConfig) -> Result<FetchedPage, FetchError> {
    let url = validate_url(url)?;

    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        reqwest::header::ACCEPT,
        reqwest::header::HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        ),
    );

    let client = reqwest::ClientBuilder::new()
        .connect_timeout(config.connect_timeout)
        .timeout(config.timeout)
        .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .build()
        .map_err(|e| FetchError::Request(e.to_string()))?;

    let response = client.get(url.clone()).send().await.map_err(classify)?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status,
        });
    }

    let final_url = response.url().to_string();
    let body = response.bytes().await.map_err(classify)?;

    Ok(FetchedPage {
        url: final_url,
        status,
        body: body.to_vec(),
    })
}

fn classify(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Request(format!("TimeoutError: {}", e))
    } else if e.is_connect() {
        FetchError::Request(format!("ConnectError: {}", e))
    } else {
        FetchError::Request(format!("RequestError: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_http_and_https() {
        assert!(validate_url("https://example.com/").is_ok());
        assert!(validate_url("http://127.0.0.1:8080/page").is_ok());
    }

    #[test]
    fn rejects_other_schemes_and_garbage() {
        assert!(matches!(
            validate_url("ftp://example.com/file"),
            Err(FetchError::InvalidUrl(_))
        ));
        assert!(matches!(
            validate_url("not a url"),
            Err(FetchError::InvalidUrl(_))
        ));
    }
}
