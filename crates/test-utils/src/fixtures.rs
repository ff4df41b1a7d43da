//! Canned WCS 1.0.0 server documents.
//!
//! The documents describe a small marine data server offering three
//! coverages, in capabilities order:
//! - `sst`: WGS84 box (-10, 30, -5, 35), no inline time positions
//! - `precip`: global box with two inline time positions
//! - `bathymetry`: no `lonLatEnvelope`

/// Full capabilities document.
pub const CAPABILITIES: &str = include_str!("../testdata/capabilities.xml");

/// DescribeCoverage for `sst`: rectified grid, three time positions.
pub const DESCRIBE_RECTIFIED: &str = include_str!("../testdata/describe_rectified.xml");

/// DescribeCoverage for `bathymetry`: plain 3-D grid, no temporal domain.
pub const DESCRIBE_GRID: &str = include_str!("../testdata/describe_grid.xml");

/// OWS exception report.
pub const EXCEPTION_OWS: &str = include_str!("../testdata/exception_ows.xml");

/// WCS 1.0.0 (OGC namespace) service exception report.
pub const EXCEPTION_OGC: &str = include_str!("../testdata/exception_ogc.xml");

/// Service URL the fixtures pretend to come from.
pub const SERVICE_URL: &str = "http://wcs.coastal.example/wcs";

/// Endpoints declared in [`CAPABILITIES`].
pub mod endpoints {
    pub const DESCRIBE_COVERAGE: &str = "http://wcs.coastal.example/describe?";
    pub const GET_COVERAGE_GET: &str = "http://wcs.coastal.example/coverage?";
    pub const GET_COVERAGE_POST: &str = "http://wcs.coastal.example/coverage-post";
}

/// Coverage identifiers in document order.
pub const COVERAGE_IDS: [&str; 3] = ["sst", "precip", "bathymetry"];

/// Build a capabilities document with `n` coverage offerings named
/// `cov-0` .. `cov-{n-1}`.
pub fn capabilities_with_coverages(n: usize) -> String {
    let briefs: String = (0..n)
        .map(|i| {
            format!(
                "<CoverageOfferingBrief><name>cov-{i}</name><label>Coverage {i}</label></CoverageOfferingBrief>"
            )
        })
        .collect();
    minimal_capabilities(&briefs)
}

/// Smallest valid capabilities document, with `content` placed inside
/// `ContentMetadata`.
pub fn minimal_capabilities(content: &str) -> String {
    format!(
        r#"<WCS_Capabilities xmlns="http://www.opengis.net/wcs"
    xmlns:gml="http://www.opengis.net/gml"
    xmlns:xlink="http://www.w3.org/1999/xlink" version="1.0.0">
  <Service><name>minimal</name><fees>NONE</fees><accessConstraints>NONE</accessConstraints></Service>
  <Capability><Request>
    <GetCoverage><DCPType><HTTP><Get><OnlineResource xlink:href="http://h/wcs?"/></Get></HTTP></DCPType></GetCoverage>
  </Request></Capability>
  <ContentMetadata>{content}</ContentMetadata>
</WCS_Capabilities>"#
    )
}
