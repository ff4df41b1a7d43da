//! Coverage offerings and their lazily fetched DescribeCoverage detail.
//!
//! A [`ContentMetadata`] is built from a `CoverageOfferingBrief` and answers
//! id, title, keywords and the WGS84 box straight away. Everything else
//! (grid, temporal domain, CRSs, formats) lives in the DescribeCoverage
//! document, which is requested through the owning service on first use and
//! cached on the descriptor for every later call.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::debug;

use wcs_common::{BoundingBox, TimeLimits, TimeRange, WcsError, WcsResult};

use crate::grid::{CoverageGrid, Grid, RectifiedGrid};
use crate::metadata::texts;
use crate::namespaces::{gml, join, wcs};
use crate::xml::XmlElement;

/// Source of DescribeCoverage documents, implemented by the service.
pub trait CoverageDescriber: Send + Sync {
    /// Fetch and parse the DescribeCoverage response for one coverage.
    fn describe_coverage(&self, identifier: &str) -> WcsResult<XmlElement>;
}

/// One coverage offered by the service.
#[derive(Clone)]
pub struct ContentMetadata {
    pub id: String,
    pub title: String,
    pub keywords: Vec<String>,
    /// (min lon, min lat, max lon, max lat) from `lonLatEnvelope`.
    pub bounding_box_wgs84: Option<BoundingBox>,
    brief: XmlElement,
    describer: Arc<dyn CoverageDescriber>,
    description: OnceCell<XmlElement>,
}

impl ContentMetadata {
    /// Parse a `CoverageOfferingBrief` element.
    pub fn from_element(elem: &XmlElement, describer: Arc<dyn CoverageDescriber>) -> WcsResult<Self> {
        let id = elem
            .find_text(&wcs("name"))
            .ok_or_else(|| WcsError::MissingElement("CoverageOfferingBrief/name".to_string()))?
            .to_string();
        let title = elem
            .find(&wcs("label"))
            .ok_or_else(|| WcsError::MissingElement(format!("CoverageOfferingBrief[{}]/label", id)))?
            .text()
            .unwrap_or_default()
            .to_string();

        let bounding_box_wgs84 = match elem.find(&wcs("lonLatEnvelope")) {
            Some(envelope) => Some(parse_lon_lat_envelope(envelope)?),
            None => None,
        };

        Ok(Self {
            keywords: texts(elem, &wcs("keywords/keyword")),
            id,
            title,
            bounding_box_wgs84,
            brief: elem.clone(),
            describer,
            description: OnceCell::new(),
        })
    }

    /// The DescribeCoverage document, fetched on first call.
    pub fn description(&self) -> WcsResult<&XmlElement> {
        self.description.get_or_try_init(|| {
            debug!(coverage = %self.id, "Fetching DescribeCoverage document");
            self.describer.describe_coverage(&self.id)
        })
    }

    /// Whether the DescribeCoverage document has already been fetched.
    pub fn is_described(&self) -> bool {
        self.description.get().is_some()
    }

    /// Spatial grid, rectified when the server declares a `gml:RectifiedGrid`.
    pub fn grid(&self) -> WcsResult<CoverageGrid> {
        let doc = self.description()?;
        let spatial = wcs("CoverageOffering/domainSet/spatialDomain");

        if let Some(elem) = doc.find(&join(&[&spatial, &gml("RectifiedGrid")])) {
            return Ok(CoverageGrid::Rectified(RectifiedGrid::from_element(elem)?));
        }
        let elem = doc.find(&join(&[&spatial, &gml("Grid")]));
        Ok(CoverageGrid::Grid(Grid::from_element(elem)?))
    }

    /// First and last declared time positions.
    ///
    /// Positions inside the brief's `lonLatEnvelope` are used when present,
    /// avoiding the DescribeCoverage round trip.
    pub fn time_limits(&self) -> WcsResult<Option<TimeLimits>> {
        let inline = texts(
            &self.brief,
            &join(&[&wcs("lonLatEnvelope"), &gml("timePosition")]),
        );
        if !inline.is_empty() {
            return Ok(TimeLimits::from_positions(&inline));
        }
        Ok(TimeLimits::from_positions(&self.time_positions()?))
    }

    /// Time limits parsed as instants.
    pub fn time_range(&self) -> WcsResult<Option<TimeRange>> {
        match self.time_limits()? {
            Some(limits) => Ok(Some(limits.to_range()?)),
            None => Ok(None),
        }
    }

    /// Every `timePosition` of the temporal domain, in document order.
    pub fn time_positions(&self) -> WcsResult<Vec<String>> {
        let doc = self.description()?;
        Ok(texts(
            doc,
            &join(&[
                &wcs("CoverageOffering/domainSet/temporalDomain"),
                &gml("timePosition"),
            ]),
        ))
    }

    /// Bounding boxes in CRSs other than WGS84. Always empty for now.
    pub fn bounding_boxes(&self) -> WcsResult<Vec<BoundingBox>> {
        // TODO: read gml:Envelope and gml:EnvelopeWithTimePeriod under spatialDomain.
        self.description()?;
        Ok(Vec::new())
    }

    /// Response, request-response and native CRSs, in that order.
    pub fn supported_crs(&self) -> WcsResult<Vec<String>> {
        let doc = self.description()?;
        let mut crs = Vec::new();
        for list in ["responseCRSs", "requestResponseCRSs", "nativeCRSs"] {
            let path = wcs(&format!("CoverageOffering/supportedCRSs/{}", list));
            for elem in doc.findall(&path) {
                crs.extend(
                    elem.text()
                        .unwrap_or_default()
                        .split_whitespace()
                        .map(str::to_string),
                );
            }
        }
        Ok(crs)
    }

    pub fn supported_formats(&self) -> WcsResult<Vec<String>> {
        let doc = self.description()?;
        Ok(texts(doc, &wcs("CoverageOffering/supportedFormats/formats")))
    }
}

impl fmt::Debug for ContentMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentMetadata")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("keywords", &self.keywords)
            .field("bounding_box_wgs84", &self.bounding_box_wgs84)
            .field("described", &self.is_described())
            .finish()
    }
}

fn parse_lon_lat_envelope(envelope: &XmlElement) -> WcsResult<BoundingBox> {
    let positions = envelope.findall(&gml("pos"));
    match positions.as_slice() {
        [lower, upper, ..] => Ok(BoundingBox::from_positions(
            lower.text().unwrap_or_default(),
            upper.text().unwrap_or_default(),
        )?),
        _ => Err(WcsError::InvalidValue {
            element: "lonLatEnvelope".to_string(),
            message: format!("expected two gml:pos, found {}", positions.len()),
        }),
    }
}
