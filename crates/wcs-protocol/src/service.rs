//! WCS 1.0.0 service handle.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use wcs_common::{WcsError, WcsResult};

use crate::config::HttpConfig;
use crate::contents::CoverageContents;
use crate::coverage::{ContentMetadata, CoverageDescriber};
use crate::metadata::{texts, HttpMethod, OperationMetadata, ServiceIdentification, ServiceProvider};
use crate::namespaces::wcs;
use crate::request::{capabilities_url, describe_coverage_url, join_query, GetCoverageRequest};
use crate::response::{service_exception_message, CoverageResponse};
use crate::transport::{HttpResponse, HttpTransport, ReqwestTransport};
use crate::xml::XmlElement;
use crate::WCS_VERSION;

/// Endpoint state shared between the service and its coverage descriptors.
struct ServiceClient {
    describe_url: String,
    transport: Arc<dyn HttpTransport>,
}

impl CoverageDescriber for ServiceClient {
    #[instrument(skip(self))]
    fn describe_coverage(&self, identifier: &str) -> WcsResult<XmlElement> {
        let url = describe_coverage_url(&self.describe_url, WCS_VERSION, identifier)?;
        debug!(url = %url, "DescribeCoverage request");

        let bytes = self.transport.get(&url)?.into_bytes()?;
        let doc = XmlElement::parse(&bytes)?;
        if let Some(message) = service_exception_message(&doc) {
            return Err(WcsError::ServiceException(message));
        }
        Ok(doc)
    }
}

/// A WCS 1.0.0 server described by its capabilities document.
pub struct WebCoverageService {
    url: String,
    capabilities: XmlElement,
    identification: ServiceIdentification,
    provider: Option<ServiceProvider>,
    operations: Vec<OperationMetadata>,
    contents: CoverageContents,
    exceptions: Vec<String>,
    client: Arc<ServiceClient>,
    config: HttpConfig,
}

impl WebCoverageService {
    /// Fetch capabilities from `url` with a reqwest transport configured from
    /// the environment.
    pub fn open(url: &str) -> WcsResult<Self> {
        let config = HttpConfig::from_env();
        let transport = ReqwestTransport::new(&config)?;
        Self::connect(url, Arc::new(transport), config)
    }

    /// Fetch capabilities from `url` through `transport`.
    #[instrument(skip(transport, config))]
    pub fn connect(url: &str, transport: Arc<dyn HttpTransport>, config: HttpConfig) -> WcsResult<Self> {
        let request_url = capabilities_url(url, WCS_VERSION)?;
        info!(url = %request_url, "Fetching WCS capabilities");
        let bytes = transport.get(&request_url)?.into_bytes()?;
        Self::from_xml(url, &bytes, transport, config)
    }

    /// Build from an already fetched capabilities document.
    pub fn from_xml(
        url: &str,
        xml: &[u8],
        transport: Arc<dyn HttpTransport>,
        config: HttpConfig,
    ) -> WcsResult<Self> {
        let capabilities = XmlElement::parse(xml)?;
        Self::from_capabilities(url, capabilities, transport, config)
    }

    /// Build from an already parsed capabilities document.
    pub fn from_capabilities(
        url: &str,
        capabilities: XmlElement,
        transport: Arc<dyn HttpTransport>,
        config: HttpConfig,
    ) -> WcsResult<Self> {
        let service = capabilities
            .find(&wcs("Service"))
            .ok_or_else(|| WcsError::MissingElement("Service".to_string()))?;
        let identification = ServiceIdentification::from_element(service)?;
        let provider = service
            .find(&wcs("responsibleParty"))
            .map(ServiceProvider::from_element);

        let operations: Vec<OperationMetadata> = capabilities
            .find(&wcs("Capability/Request"))
            .ok_or_else(|| WcsError::MissingElement("Capability/Request".to_string()))?
            .children()
            .iter()
            .map(OperationMetadata::from_element)
            .collect();

        let describe_url = operations
            .iter()
            .find(|op| op.name == "DescribeCoverage")
            .and_then(|op| op.url(HttpMethod::Get))
            .unwrap_or(url)
            .to_string();
        let client = Arc::new(ServiceClient {
            describe_url,
            transport,
        });

        let mut contents = CoverageContents::new();
        for elem in capabilities.findall(&wcs("ContentMetadata/CoverageOfferingBrief")) {
            let describer: Arc<dyn CoverageDescriber> = client.clone();
            if let Some(replaced) = contents.insert(ContentMetadata::from_element(elem, describer)?) {
                debug!(coverage = %replaced.id, "Duplicate coverage identifier replaced");
            }
        }

        let exceptions = texts(&capabilities, &wcs("Capability/Exception/Format"));

        info!(
            title = %identification.title,
            operations = operations.len(),
            coverages = contents.len(),
            "Parsed WCS capabilities"
        );

        Ok(Self {
            url: url.to_string(),
            capabilities,
            identification,
            provider,
            operations,
            contents,
            exceptions,
            client,
            config,
        })
    }

    pub fn version(&self) -> &'static str {
        WCS_VERSION
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// The parsed capabilities document.
    pub fn capabilities(&self) -> &XmlElement {
        &self.capabilities
    }

    pub fn identification(&self) -> &ServiceIdentification {
        &self.identification
    }

    pub fn provider(&self) -> Option<&ServiceProvider> {
        self.provider.as_ref()
    }

    pub fn operations(&self) -> &[OperationMetadata] {
        &self.operations
    }

    pub fn contents(&self) -> &CoverageContents {
        &self.contents
    }

    /// Exception report formats the server supports.
    pub fn exceptions(&self) -> &[String] {
        &self.exceptions
    }

    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// Look up a coverage by identifier.
    pub fn coverage(&self, id: &str) -> WcsResult<&ContentMetadata> {
        self.contents
            .get(id)
            .ok_or_else(|| WcsError::CoverageNotFound(id.to_string()))
    }

    /// (identifier, descriptor) pairs in document order.
    pub fn items(&self) -> Vec<(&str, &ContentMetadata)> {
        self.contents.iter().collect()
    }

    /// Return a named operation.
    pub fn operation_by_name(&self, name: &str) -> WcsResult<&OperationMetadata> {
        self.operations
            .iter()
            .find(|op| op.name == name)
            .ok_or_else(|| WcsError::OperationNotFound(name.to_string()))
    }

    /// Fetch a DescribeCoverage document without caching it.
    pub fn describe_coverage(&self, identifier: &str) -> WcsResult<XmlElement> {
        self.client.describe_coverage(identifier)
    }

    /// Request a coverage.
    ///
    /// XML responses are checked for an exception report and returned
    /// buffered and rewound; anything else is returned as the live stream.
    pub fn get_coverage(&self, request: &GetCoverageRequest) -> WcsResult<CoverageResponse> {
        debug!(?request, "Parameters passed to GetCoverage");

        let query = request.encode(WCS_VERSION)?;
        let base_url = self
            .operation_by_name("GetCoverage")?
            .require_url(request.method)?;
        debug!(base_url = %base_url, query = %query, "GetCoverage request");

        let response = self.dispatch(base_url, &query, request.method)?;
        debug!(
            url = %response.url,
            content_type = ?response.content_type,
            "GetCoverage response received"
        );
        CoverageResponse::from_http(response)
    }

    fn dispatch(&self, base_url: &str, query: &str, method: HttpMethod) -> WcsResult<HttpResponse> {
        let transport = &self.client.transport;

        if !self.config.post_fallback {
            return match method {
                HttpMethod::Get => transport.get(&join_query(base_url, query)),
                HttpMethod::Post => transport.post(base_url, query.to_string()),
            };
        }

        match transport.get(&join_query(base_url, query)) {
            Err(err @ (WcsError::Http(_) | WcsError::Io(_))) => {
                warn!(error = %err, "GET failed, retrying GetCoverage as POST");
                transport.post(base_url, query.to_string())
            }
            result => result,
        }
    }
}

impl fmt::Debug for WebCoverageService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebCoverageService")
            .field("url", &self.url)
            .field("identification", &self.identification)
            .field("operations", &self.operations.len())
            .field("contents", &self.contents.len())
            .finish()
    }
}
