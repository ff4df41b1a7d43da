//! XML namespace URIs and Clark-notation helpers.
//!
//! Element paths used throughout the crate are written as
//! `{uri}local/{uri}local`, the same form [`crate::xml::XmlElement`] stores
//! in its tags.

pub const WCS_NS: &str = "http://www.opengis.net/wcs";
pub const GML_NS: &str = "http://www.opengis.net/gml";
pub const OWS_NS: &str = "http://www.opengis.net/ows";
pub const OGC_NS: &str = "http://www.opengis.net/ogc";
pub const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

/// Qualify every segment of a slash-separated path with `namespace`.
///
/// Empty segments (a leading, trailing or doubled slash) are dropped.
pub fn qualify(namespace: &str, path: &str) -> String {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| format!("{{{}}}{}", namespace, segment))
        .collect::<Vec<_>>()
        .join("/")
}

/// Qualify a path with the WCS namespace.
pub fn wcs(path: &str) -> String {
    qualify(WCS_NS, path)
}

/// Qualify a path with the GML namespace.
pub fn gml(path: &str) -> String {
    qualify(GML_NS, path)
}

/// Join already-qualified path fragments.
pub fn join(parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("/")
}
