//! KVP request construction for GetCapabilities, DescribeCoverage and GetCoverage.

use serde::{Deserialize, Serialize};

use wcs_common::{BoundingBox, WcsError, WcsResult};

use crate::metadata::HttpMethod;

/// GetCoverage request parameters.
///
/// Optional numeric parameters set to zero are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetCoverageRequest {
    /// Coverage identifiers; at least one is required and none may be empty.
    pub identifiers: Vec<String>,
    pub bbox: Option<BoundingBox>,
    /// Time positions, sent comma-joined.
    pub time: Vec<String>,
    /// Output format (e.g. "GeoTIFF", "NetCDF")
    pub format: Option<String>,
    pub crs: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub resx: Option<f64>,
    pub resy: Option<f64>,
    pub resz: Option<f64>,
    /// Which declared endpoint of the GetCoverage operation to use.
    pub method: HttpMethod,
    /// Vendor parameters, applied last and overriding same-named keys.
    pub extra: Vec<(String, String)>,
}

impl GetCoverageRequest {
    pub fn new<I, S>(identifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            identifiers: identifiers.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn bbox(mut self, bbox: impl Into<BoundingBox>) -> Self {
        self.bbox = Some(bbox.into());
        self
    }

    pub fn time<I, S>(mut self, positions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.time = positions.into_iter().map(Into::into).collect();
        self
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn crs(mut self, crs: impl Into<String>) -> Self {
        self.crs = Some(crs.into());
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn resolution(mut self, resx: f64, resy: f64) -> Self {
        self.resx = Some(resx);
        self.resy = Some(resy);
        self
    }

    pub fn resz(mut self, resz: f64) -> Self {
        self.resz = Some(resz);
        self
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    /// Add a vendor-specific parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.push((key.into(), value.into()));
        self
    }

    /// Flatten into ordered key/value pairs.
    pub fn to_query_pairs(&self, version: &str) -> WcsResult<Vec<(String, String)>> {
        if self.identifiers.is_empty() || self.identifiers.iter().any(|id| id.is_empty()) {
            return Err(WcsError::PreconditionViolation(
                "GetCoverage needs at least one non-empty coverage identifier".to_string(),
            ));
        }

        let mut pairs = Vec::new();
        set(&mut pairs, "version", version.to_string());
        set(&mut pairs, "request", "GetCoverage".to_string());
        set(&mut pairs, "service", "WCS".to_string());
        set(&mut pairs, "Coverage", self.identifiers.join(","));

        if let Some(bbox) = &self.bbox {
            set(&mut pairs, "BBox", bbox.to_kvp_string());
        }
        if !self.time.is_empty() {
            set(&mut pairs, "time", self.time.join(","));
        }
        if let Some(crs) = self.crs.as_deref().filter(|c| !c.is_empty()) {
            set(&mut pairs, "crs", crs.to_string());
        }
        if let Some(format) = self.format.as_deref().filter(|f| !f.is_empty()) {
            set(&mut pairs, "format", format.to_string());
        }
        for (key, value) in [("width", self.width), ("height", self.height)] {
            if let Some(v) = value.filter(|v| *v != 0) {
                set(&mut pairs, key, v.to_string());
            }
        }
        for (key, value) in [("resx", self.resx), ("resy", self.resy), ("resz", self.resz)] {
            if let Some(v) = value.filter(|v| *v != 0.0) {
                set(&mut pairs, key, v.to_string());
            }
        }

        for (key, value) in &self.extra {
            set(&mut pairs, key, value.clone());
        }

        Ok(pairs)
    }

    /// Percent-encoded query string.
    pub fn encode(&self, version: &str) -> WcsResult<String> {
        encode_query(&self.to_query_pairs(version)?)
    }
}

/// Form-encode key/value pairs.
pub fn encode_query(pairs: &[(String, String)]) -> WcsResult<String> {
    serde_urlencoded::to_string(pairs).map_err(|e| WcsError::InvalidValue {
        element: "query".to_string(),
        message: e.to_string(),
    })
}

/// Append an encoded query to an endpoint URL.
///
/// Endpoints advertised in capabilities documents usually end in `?` or `&`
/// and are concatenated directly.
pub fn join_query(base_url: &str, query: &str) -> String {
    if base_url.ends_with('?') || base_url.ends_with('&') {
        format!("{}{}", base_url, query)
    } else if base_url.contains('?') {
        format!("{}&{}", base_url, query)
    } else {
        format!("{}?{}", base_url, query)
    }
}

/// Build a KVP request URL, keeping the base URL's own parameters and adding
/// each default whose key is not already present (case-insensitive).
pub fn build_request_url(base_url: &str, defaults: &[(&str, &str)]) -> WcsResult<String> {
    let (endpoint, existing) = match base_url.split_once('?') {
        Some((endpoint, query)) => (endpoint, query),
        None => (base_url, ""),
    };

    let mut pairs: Vec<(String, String)> =
        serde_urlencoded::from_str(existing).map_err(|e| WcsError::InvalidValue {
            element: "url".to_string(),
            message: e.to_string(),
        })?;

    for (key, value) in defaults {
        if !pairs.iter().any(|(k, _)| k.eq_ignore_ascii_case(key)) {
            pairs.push((key.to_string(), value.to_string()));
        }
    }

    Ok(format!("{}?{}", endpoint, encode_query(&pairs)?))
}

/// GetCapabilities URL for a service endpoint.
pub fn capabilities_url(service_url: &str, version: &str) -> WcsResult<String> {
    build_request_url(
        service_url,
        &[
            ("service", "WCS"),
            ("request", "GetCapabilities"),
            ("version", version),
        ],
    )
}

/// DescribeCoverage URL for one coverage.
pub fn describe_coverage_url(base_url: &str, version: &str, identifier: &str) -> WcsResult<String> {
    build_request_url(
        base_url,
        &[
            ("service", "WCS"),
            ("request", "DescribeCoverage"),
            ("version", version),
            ("coverage", identifier),
        ],
    )
}

fn set(pairs: &mut Vec<(String, String)>, key: &str, value: String) {
    match pairs.iter_mut().find(|(k, _)| k == key) {
        Some(existing) => existing.1 = value,
        None => pairs.push((key.to_string(), value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
        pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_minimal_request() {
        let pairs = GetCoverageRequest::new(["sst"]).to_query_pairs("1.0.0").unwrap();
        assert_eq!(lookup(&pairs, "service"), Some("WCS"));
        assert_eq!(lookup(&pairs, "version"), Some("1.0.0"));
        assert_eq!(lookup(&pairs, "request"), Some("GetCoverage"));
        assert_eq!(lookup(&pairs, "Coverage"), Some("sst"));
        assert_eq!(lookup(&pairs, "BBox"), None);
        assert_eq!(lookup(&pairs, "format"), None);
        assert_eq!(lookup(&pairs, "width"), None);
    }

    #[test]
    fn test_empty_identifiers_rejected() {
        let result = GetCoverageRequest::new(Vec::<String>::new()).to_query_pairs("1.0.0");
        assert!(matches!(result, Err(WcsError::PreconditionViolation(_))));

        let result = GetCoverageRequest::new([""]).to_query_pairs("1.0.0");
        assert!(matches!(result, Err(WcsError::PreconditionViolation(_))));

        let result = GetCoverageRequest::new(["a", ""]).to_query_pairs("1.0.0");
        assert!(matches!(result, Err(WcsError::PreconditionViolation(_))));
    }

    #[test]
    fn test_full_request() {
        let request = GetCoverageRequest::new(["a", "b"])
            .bbox((-112.0, 36.0, -106.0, 41.0))
            .time(["2792-06-01T00:00:00.0", "2792-07-01T00:00:00.0"])
            .format("cf-netcdf")
            .crs("EPSG:4326")
            .size(200, 100)
            .resolution(0.5, 0.25);
        let pairs = request.to_query_pairs("1.0.0").unwrap();
        assert_eq!(lookup(&pairs, "Coverage"), Some("a,b"));
        assert_eq!(lookup(&pairs, "BBox"), Some("-112,36,-106,41"));
        assert_eq!(
            lookup(&pairs, "time"),
            Some("2792-06-01T00:00:00.0,2792-07-01T00:00:00.0")
        );
        assert_eq!(lookup(&pairs, "format"), Some("cf-netcdf"));
        assert_eq!(lookup(&pairs, "crs"), Some("EPSG:4326"));
        assert_eq!(lookup(&pairs, "width"), Some("200"));
        assert_eq!(lookup(&pairs, "height"), Some("100"));
        assert_eq!(lookup(&pairs, "resx"), Some("0.5"));
        assert_eq!(lookup(&pairs, "resy"), Some("0.25"));
        assert_eq!(lookup(&pairs, "resz"), None);
    }

    #[test]
    fn test_zero_values_are_omitted() {
        let request = GetCoverageRequest::new(["a"]).size(0, 0).resz(0.0).format("");
        let pairs = request.to_query_pairs("1.0.0").unwrap();
        assert_eq!(lookup(&pairs, "width"), None);
        assert_eq!(lookup(&pairs, "resz"), None);
        assert_eq!(lookup(&pairs, "format"), None);
    }

    #[test]
    fn test_extra_params_override() {
        let request = GetCoverageRequest::new(["a"])
            .format("GeoTIFF")
            .param("format", "NetCDF")
            .param("vendor_key", "x");
        let pairs = request.to_query_pairs("1.0.0").unwrap();
        assert_eq!(lookup(&pairs, "format"), Some("NetCDF"));
        assert_eq!(lookup(&pairs, "vendor_key"), Some("x"));
        assert_eq!(pairs.iter().filter(|(k, _)| k == "format").count(), 1);
    }

    #[test]
    fn test_encode_percent_escapes() {
        let query = GetCoverageRequest::new(["a b"])
            .bbox((0.0, 0.0, 1.0, 1.0))
            .encode("1.0.0")
            .unwrap();
        assert_eq!(
            query,
            "version=1.0.0&request=GetCoverage&service=WCS&Coverage=a+b&BBox=0%2C0%2C1%2C1"
        );
    }

    #[test]
    fn test_join_query() {
        assert_eq!(join_query("http://h/wcs?", "a=1"), "http://h/wcs?a=1");
        assert_eq!(join_query("http://h/wcs?map=x&", "a=1"), "http://h/wcs?map=x&a=1");
        assert_eq!(join_query("http://h/wcs?map=x", "a=1"), "http://h/wcs?map=x&a=1");
        assert_eq!(join_query("http://h/wcs", "a=1"), "http://h/wcs?a=1");
    }

    #[test]
    fn test_capabilities_url_keeps_existing_params() {
        let url = capabilities_url("http://h/cgi?map=/data/x.map&SERVICE=WCS", "1.0.0").unwrap();
        assert_eq!(
            url,
            "http://h/cgi?map=%2Fdata%2Fx.map&SERVICE=WCS&request=GetCapabilities&version=1.0.0"
        );
    }

    #[test]
    fn test_describe_coverage_url() {
        let url = describe_coverage_url("http://h/wcs?", "1.0.0", "sst").unwrap();
        assert_eq!(
            url,
            "http://h/wcs?service=WCS&request=DescribeCoverage&version=1.0.0&coverage=sst"
        );
    }
}
