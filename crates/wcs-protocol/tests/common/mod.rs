//! Scripted HTTP transport shared by the integration tests.

#![allow(dead_code)]

use std::io::Cursor;
use std::sync::{Arc, Mutex};

use test_utils::fixtures;
use wcs_protocol::{HttpConfig, HttpMethod, HttpResponse, HttpTransport, WcsError, WcsResult, WebCoverageService};

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: HttpMethod,
    pub url: String,
    pub body: Option<String>,
}

#[derive(Clone)]
enum Reply {
    Body {
        content_type: Option<String>,
        body: Vec<u8>,
    },
    Fail(String),
}

struct Route {
    method: HttpMethod,
    prefix: String,
    reply: Reply,
}

/// Answers requests from a list of (method, URL prefix) routes and records
/// every call. Unrouted requests fail with an HTTP error.
#[derive(Default)]
pub struct MockTransport {
    routes: Vec<Route>,
    calls: Mutex<Vec<Call>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_get(self, prefix: &str, content_type: &str, body: impl AsRef<[u8]>) -> Self {
        self.route(HttpMethod::Get, prefix, Some(content_type), body)
    }

    pub fn on_post(self, prefix: &str, content_type: &str, body: impl AsRef<[u8]>) -> Self {
        self.route(HttpMethod::Post, prefix, Some(content_type), body)
    }

    pub fn fail_get(mut self, prefix: &str, message: &str) -> Self {
        self.routes.push(Route {
            method: HttpMethod::Get,
            prefix: prefix.to_string(),
            reply: Reply::Fail(message.to_string()),
        });
        self
    }

    fn route(
        mut self,
        method: HttpMethod,
        prefix: &str,
        content_type: Option<&str>,
        body: impl AsRef<[u8]>,
    ) -> Self {
        self.routes.push(Route {
            method,
            prefix: prefix.to_string(),
            reply: Reply::Body {
                content_type: content_type.map(str::to_string),
                body: body.as_ref().to_vec(),
            },
        });
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Number of calls whose URL starts with `prefix`.
    pub fn calls_to(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.url.starts_with(prefix))
            .count()
    }

    fn respond(&self, method: HttpMethod, url: &str, body: Option<String>) -> WcsResult<HttpResponse> {
        self.calls.lock().unwrap().push(Call {
            method,
            url: url.to_string(),
            body,
        });

        let route = self
            .routes
            .iter()
            .find(|r| r.method == method && url.starts_with(&r.prefix))
            .ok_or_else(|| WcsError::Http(format!("404 Not Found: {} {}", method, url)))?;

        match &route.reply {
            Reply::Body { content_type, body } => Ok(HttpResponse::new(
                url,
                content_type.clone(),
                Box::new(Cursor::new(body.clone())),
            )),
            Reply::Fail(message) => Err(WcsError::Http(message.clone())),
        }
    }
}

impl HttpTransport for MockTransport {
    fn get(&self, url: &str) -> WcsResult<HttpResponse> {
        self.respond(HttpMethod::Get, url, None)
    }

    fn post(&self, url: &str, body: String) -> WcsResult<HttpResponse> {
        self.respond(HttpMethod::Post, url, Some(body))
    }
}

/// Service built from the fixture capabilities document.
pub fn fixture_service(transport: Arc<MockTransport>) -> WebCoverageService {
    fixture_service_with(transport, HttpConfig::default())
}

pub fn fixture_service_with(transport: Arc<MockTransport>, config: HttpConfig) -> WebCoverageService {
    WebCoverageService::from_xml(
        fixtures::SERVICE_URL,
        fixtures::CAPABILITIES.as_bytes(),
        transport,
        config,
    )
    .expect("fixture capabilities parse")
}

/// Transport that serves both DescribeCoverage fixtures.
pub fn describing_transport() -> MockTransport {
    MockTransport::new()
        .on_get(
            &format!("{}service=WCS&request=DescribeCoverage&version=1.0.0&coverage=sst", fixtures::endpoints::DESCRIBE_COVERAGE),
            "text/xml",
            fixtures::DESCRIBE_RECTIFIED,
        )
        .on_get(
            &format!("{}service=WCS&request=DescribeCoverage&version=1.0.0&coverage=bathymetry", fixtures::endpoints::DESCRIBE_COVERAGE),
            "text/xml",
            fixtures::DESCRIBE_GRID,
        )
}
