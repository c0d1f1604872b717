//! HTTP page fetcher with charset-aware decoding
//!
//! Every request carries the configured `User-Agent` and `Referer`. Bodies
//! are decoded with the charset announced in `Content-Type`, or in a
//! `<meta charset>` near the top of the document, so that legacy Cyrillic
//! encodings such as windows-1251 and koi8-r are indexed as text.

use crate::config::CrawlerConfig;
use crate::error::FetchError;
use encoding_rs::{Encoding, UTF_8};
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, REFERER},
    Client,
};
use std::time::Duration;

/// Bytes inspected for a `<meta charset>` declaration
const META_SNIFF_LEN: usize = 1024;

/// A successfully fetched page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// HTTP status code (always 2xx)
    pub status: u16,

    /// Decoded response body
    pub body: String,
}

/// Site page fetcher
pub struct PageFetcher {
    /// HTTP client with configured timeout, user agent and compression
    client: Client,

    /// Referer sent with every request
    referrer: String,
}

impl PageFetcher {
    /// Create a fetcher from crawler settings
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn new(config: &CrawlerConfig) -> Result<Self, FetchError> {
        Self::with_timeout(&config.user_agent, &config.referrer, config.request_timeout())
    }

    /// Create a fetcher with explicit settings
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn with_timeout(
        user_agent: &str,
        referrer: &str,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .gzip(true)
            .build()?;

        Ok(Self {
            client,
            referrer: referrer.to_string(),
        })
    }

    /// Fetch one page
    ///
    /// # Errors
    ///
    /// - `FetchError::InvalidUrl` if `url` cannot be parsed
    /// - `FetchError::Timeout` if the request exceeds the configured timeout
    /// - `FetchError::Status` for any non-2xx response
    /// - `FetchError::Http` for other transport failures
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let parsed = url::Url::parse(url).map_err(|_| FetchError::InvalidUrl(url.to_string()))?;

        tracing::debug!(url = %url, "Fetching page");

        let response = self
            .client
            .get(parsed)
            .headers(self.build_headers())
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
            .unwrap_or_default();

        let bytes = response.bytes().await.map_err(classify)?;

        Ok(FetchedPage {
            status: status.as_u16(),
            body: decode_bytes(&bytes, &content_type),
        })
    }

    /// Headers sent with every request besides `User-Agent`
    fn build_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("ru-RU,ru;q=0.9,en-US;q=0.8,en;q=0.7"),
        );

        if let Ok(referer_value) = HeaderValue::from_str(&self.referrer) {
            headers.insert(REFERER, referer_value);
        }

        headers
    }
}

fn classify(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Http(err)
    }
}

/// Decode a response body
///
/// The charset is taken from `content_type`, then from a `<meta>` declaration
/// in the first kilobyte, and defaults to UTF-8. Invalid sequences are
/// replaced rather than rejected.
pub fn decode_bytes(bytes: &[u8], content_type: &str) -> String {
    let encoding = charset_label(content_type)
        .or_else(|| sniff_meta_charset(bytes))
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8);

    let (text, _encoding, _had_errors) = encoding.decode(bytes);
    text.into_owned()
}

/// Extract the `charset=` parameter of a header-like string
fn charset_label(value: &str) -> Option<String> {
    let lower = value.to_ascii_lowercase();
    let start = lower.find("charset=")? + "charset=".len();
    let label: String = lower[start..]
        .trim_start_matches(['"', '\''])
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
        .collect();

    (!label.is_empty()).then_some(label)
}

fn sniff_meta_charset(bytes: &[u8]) -> Option<String> {
    let head = &bytes[..bytes.len().min(META_SNIFF_LEN)];
    charset_label(&String::from_utf8_lossy(head))
}
