//! Client for the OGC Web Coverage Service, version 1.0.0.
//!
//! Parses a server's capabilities document into typed metadata, fetches
//! per-coverage DescribeCoverage detail on demand and issues GetCoverage
//! requests.
//!
//! ```no_run
//! use wcs_protocol::{GetCoverageRequest, WebCoverageService};
//!
//! # fn main() -> wcs_protocol::WcsResult<()> {
//! let wcs = WebCoverageService::open("http://example.com/wcs")?;
//! let sst = wcs.coverage("sst")?;
//! println!("{:?} {:?}", sst.bounding_box_wgs84, sst.supported_formats()?);
//!
//! let request = GetCoverageRequest::new(["sst"])
//!     .bbox((-10.0, 30.0, -5.0, 35.0))
//!     .format("GeoTIFF")
//!     .crs("EPSG:4326")
//!     .size(256, 256);
//! let bytes = wcs.get_coverage(&request)?.into_bytes()?;
//! # let _ = bytes;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod contents;
pub mod coverage;
pub mod grid;
pub mod metadata;
pub mod namespaces;
pub mod request;
pub mod response;
pub mod service;
pub mod transport;
pub mod xml;

/// Protocol version implemented by this crate.
pub const WCS_VERSION: &str = "1.0.0";

pub use config::HttpConfig;
pub use contents::CoverageContents;
pub use coverage::{ContentMetadata, CoverageDescriber};
pub use grid::{CoverageGrid, Grid, RectifiedGrid};
pub use metadata::{
    ContactMetadata, HttpMethod, OperationMetadata, ServiceIdentification, ServiceProvider,
};
pub use request::GetCoverageRequest;
pub use response::CoverageResponse;
pub use service::WebCoverageService;
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};
pub use xml::XmlElement;

pub use wcs_common::{BoundingBox, TimeLimits, TimeRange, WcsError, WcsResult};
