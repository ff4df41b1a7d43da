//! Blocking HTTP transport used for every request the client makes.

use std::fmt;
use std::io::Read;

use reqwest::blocking::Client;
use reqwest::header;
use tracing::{debug, instrument};

use wcs_common::{WcsError, WcsResult};

use crate::config::HttpConfig;

/// A response whose body has not been read yet.
pub struct HttpResponse {
    /// Final URL after redirects.
    pub url: String,
    /// Value of the Content-Type header, verbatim.
    pub content_type: Option<String>,
    pub body: Box<dyn Read + Send>,
}

impl HttpResponse {
    pub fn new(
        url: impl Into<String>,
        content_type: Option<String>,
        body: Box<dyn Read + Send>,
    ) -> Self {
        Self {
            url: url.into(),
            content_type,
            body,
        }
    }

    /// Read the whole body.
    pub fn into_bytes(mut self) -> WcsResult<Vec<u8>> {
        let mut bytes = Vec::new();
        self.body.read_to_end(&mut bytes)?;
        Ok(bytes)
    }
}

impl fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("url", &self.url)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// The two request shapes the WCS client issues.
///
/// Implementations report connection failures and HTTP error statuses as
/// [`WcsError::Http`].
pub trait HttpTransport: Send + Sync {
    /// GET a fully built URL.
    fn get(&self, url: &str) -> WcsResult<HttpResponse>;

    /// POST a form-encoded body to a bare endpoint URL.
    fn post(&self, url: &str, body: String) -> WcsResult<HttpResponse>;
}

/// [`HttpTransport`] backed by `reqwest::blocking`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(config: &HttpConfig) -> WcsResult<Self> {
        config.validate().map_err(WcsError::Http)?;
        let client = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| WcsError::Http(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    fn finish(response: reqwest::blocking::Response) -> WcsResult<HttpResponse> {
        let response = response
            .error_for_status()
            .map_err(|e| WcsError::Http(e.to_string()))?;
        let url = response.url().to_string();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        debug!(url = %url, content_type = ?content_type, "HTTP response received");
        Ok(HttpResponse::new(url, content_type, Box::new(response)))
    }
}

impl HttpTransport for ReqwestTransport {
    #[instrument(skip(self))]
    fn get(&self, url: &str) -> WcsResult<HttpResponse> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| WcsError::Http(e.to_string()))?;
        Self::finish(response)
    }

    #[instrument(skip(self, body))]
    fn post(&self, url: &str, body: String) -> WcsResult<HttpResponse> {
        let response = self
            .client
            .post(url)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .map_err(|e| WcsError::Http(e.to_string()))?;
        Self::finish(response)
    }
}
