//! GetCoverage responses and exception report detection.

use std::fmt;
use std::io::{self, Cursor, Read};

use tracing::debug;

use wcs_common::{WcsError, WcsResult};

use crate::namespaces::{OGC_NS, OWS_NS};
use crate::transport::HttpResponse;
use crate::xml::XmlElement;

/// Content type whose body is inspected for an exception report.
pub const XML_CONTENT_TYPE: &str = "text/xml";

enum Body {
    Buffered(Cursor<Vec<u8>>),
    Stream(Box<dyn Read + Send>),
}

/// Body of a GetCoverage response.
///
/// A response that went through the exception check is fully buffered and
/// can be rewound; any other response is handed over as the live stream.
pub struct CoverageResponse {
    url: String,
    content_type: Option<String>,
    body: Body,
}

impl CoverageResponse {
    /// Check an XML response for an exception report, otherwise pass the
    /// stream through untouched.
    pub fn from_http(response: HttpResponse) -> WcsResult<Self> {
        let HttpResponse {
            url,
            content_type,
            mut body,
        } = response;

        if content_type.as_deref() != Some(XML_CONTENT_TYPE) {
            return Ok(Self {
                url,
                content_type,
                body: Body::Stream(body),
            });
        }

        let mut bytes = Vec::new();
        body.read_to_end(&mut bytes)?;
        let doc = XmlElement::parse(&bytes)?;
        if let Some(message) = service_exception_message(&doc) {
            debug!(url = %url, message = %message, "Service exception in response");
            return Err(WcsError::ServiceException(message));
        }

        Ok(Self {
            url,
            content_type,
            body: Body::Buffered(Cursor::new(bytes)),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Whether the body is held in memory and can be rewound.
    pub fn is_buffered(&self) -> bool {
        matches!(self.body, Body::Buffered(_))
    }

    /// Read any remaining stream into memory so the response can be rewound.
    ///
    /// Bytes already consumed from a stream are not recovered.
    pub fn buffer(self) -> io::Result<Self> {
        let body = match self.body {
            Body::Buffered(cursor) => Body::Buffered(cursor),
            Body::Stream(mut stream) => {
                let mut bytes = Vec::new();
                stream.read_to_end(&mut bytes)?;
                Body::Buffered(Cursor::new(bytes))
            }
        };
        Ok(Self { body, ..self })
    }

    /// Seek a buffered body back to offset zero.
    pub fn rewind(&mut self) -> WcsResult<()> {
        match &mut self.body {
            Body::Buffered(cursor) => {
                cursor.set_position(0);
                Ok(())
            }
            Body::Stream(_) => Err(WcsError::PreconditionViolation(
                "streamed response cannot be rewound; call buffer() first".to_string(),
            )),
        }
    }

    /// Read the rest of the body.
    pub fn into_bytes(mut self) -> io::Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.read_to_end(&mut bytes)?;
        Ok(bytes)
    }
}

impl Read for CoverageResponse {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.body {
            Body::Buffered(cursor) => cursor.read(buf),
            Body::Stream(stream) => stream.read(buf),
        }
    }
}

impl fmt::Debug for CoverageResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoverageResponse")
            .field("url", &self.url)
            .field("content_type", &self.content_type)
            .field("buffered", &self.is_buffered())
            .finish()
    }
}

/// Trimmed text of the first OWS `Exception` or OGC `ServiceException`
/// element anywhere in `doc`.
pub fn service_exception_message(doc: &XmlElement) -> Option<String> {
    let ows = format!("{{{}}}Exception", OWS_NS);
    let ogc = format!("{{{}}}ServiceException", OGC_NS);

    doc.descendants()
        .find(|e| e.tag() == ows || e.tag() == ogc)
        .map(|e| exception_text(e).trim().to_string())
}

/// OWS exceptions carry their message in `ExceptionText` children; OGC
/// service exceptions carry it directly.
fn exception_text(elem: &XmlElement) -> String {
    if let Some(text) = elem.text() {
        return text.to_string();
    }
    elem.children()
        .iter()
        .filter(|c| c.local_name() == "ExceptionText")
        .filter_map(XmlElement::text)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http(content_type: &str, body: &[u8]) -> HttpResponse {
        HttpResponse::new(
            "http://example.com/wcs?request=GetCoverage",
            Some(content_type.to_string()),
            Box::new(Cursor::new(body.to_vec())),
        )
    }

    #[test]
    fn test_ows_exception_raised() {
        let body = br#"<ExceptionReport xmlns="http://www.opengis.net/ows">
            <Exception exceptionCode="InvalidParameterValue">
                Bad BBOX
            </Exception>
        </ExceptionReport>"#;
        let err = CoverageResponse::from_http(http("text/xml", body)).unwrap_err();
        assert!(matches!(err, WcsError::ServiceException(ref m) if m == "Bad BBOX"));
    }

    #[test]
    fn test_ogc_service_exception_raised() {
        let body = br#"<ServiceExceptionReport xmlns="http://www.opengis.net/ogc" version="1.2.0">
            <ServiceException code="CoverageNotDefined">No such coverage</ServiceException>
        </ServiceExceptionReport>"#;
        let err = CoverageResponse::from_http(http("text/xml", body)).unwrap_err();
        assert!(matches!(err, WcsError::ServiceException(ref m) if m == "No such coverage"));
    }

    #[test]
    fn test_exception_text_child() {
        let doc = XmlElement::parse(
            br#"<ows:ExceptionReport xmlns:ows="http://www.opengis.net/ows">
                <ows:Exception><ows:ExceptionText> out of range </ows:ExceptionText></ows:Exception>
            </ows:ExceptionReport>"#,
        )
        .unwrap();
        assert_eq!(service_exception_message(&doc).as_deref(), Some("out of range"));
    }

    #[test]
    fn test_plain_xml_is_rewound() {
        let body = b"<CoverageData><value>1</value></CoverageData>";
        let mut response = CoverageResponse::from_http(http("text/xml", body)).unwrap();
        assert!(response.is_buffered());

        let mut first = Vec::new();
        response.read_to_end(&mut first).unwrap();
        assert_eq!(first, body);

        response.rewind().unwrap();
        assert_eq!(response.into_bytes().unwrap(), body);
    }

    #[test]
    fn test_binary_passes_through_as_stream() {
        let body = b"II*\0binary";
        let mut response = CoverageResponse::from_http(http("image/tiff", body)).unwrap();
        assert!(!response.is_buffered());
        assert!(response.rewind().is_err());

        let mut response = response.buffer().unwrap();
        response.rewind().unwrap();
        assert_eq!(response.into_bytes().unwrap(), body);
    }

    #[test]
    fn test_content_type_must_match_exactly() {
        let body = br#"<ExceptionReport xmlns="http://www.opengis.net/ows"><Exception>x</Exception></ExceptionReport>"#;
        let response = CoverageResponse::from_http(http("text/xml; charset=UTF-8", body)).unwrap();
        assert!(!response.is_buffered());
    }
}
