//! Retrieval of XML documents over HTTP.

use super::{Element, parse_document};
use crate::{Result, TmdbError};

/// Trait for anything that can turn a URL into a parsed XML document.
///
/// The client talks to themoviedb.org through this seam, which lets callers
/// swap the transport (a proxying client, recorded fixtures in tests, ...).
pub trait XmlSource {
    /// Retrieves the document at `url` and parses it.
    ///
    /// # Errors
    ///
    /// Returns `TmdbError::Network` when the document cannot be retrieved and
    /// `TmdbError::Parse` when it is not well-formed XML.
    fn fetch(&self, url: &str) -> Result<Element>;
}

/// XML source backed by a blocking HTTP client.
///
/// Each fetch issues exactly one GET request. No timeout and no retry are
/// applied. A body that is not UTF-8 is a parse error.
#[derive(Debug, Clone)]
pub struct HttpXmlFetcher {
    client: reqwest::blocking::Client,
}

impl HttpXmlFetcher {
    /// Creates a fetcher with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns `TmdbError::Network` if the HTTP client cannot be initialized.
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(None)
            .build()
            .map_err(|e| TmdbError::Network(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Creates a fetcher that uses an existing HTTP client.
    pub fn with_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }
}

impl XmlSource for HttpXmlFetcher {
    fn fetch(&self, url: &str) -> Result<Element> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| TmdbError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(TmdbError::Network(format!(
                "HTTP {} {}",
                response.status().as_u16(),
                response.status().canonical_reason().unwrap_or("Unknown")
            )));
        }

        let body = response
            .bytes()
            .map_err(|e| TmdbError::Network(format!("Failed to read response body: {e}")))?;

        let text = std::str::from_utf8(&body)
            .map_err(|_| TmdbError::Parse("response body is not valid UTF-8".to_string()))?;

        parse_document(text)
    }
}
