//! GML grid descriptions from DescribeCoverage responses.
//!
//! Limits, origin and offset vectors are kept as the raw tokens the server
//! sent. Turning offset vectors into real-world coordinates needs CRS
//! knowledge and is left to the caller.

use serde::{Deserialize, Serialize};

use wcs_common::{WcsError, WcsResult};

use crate::namespaces::gml;
use crate::xml::XmlElement;

/// Fields shared by `gml:Grid` and `gml:RectifiedGrid`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    pub dimension: Option<u32>,
    pub axis_labels: Vec<String>,
    pub low_limits: Vec<String>,
    pub high_limits: Vec<String>,
}

impl Grid {
    /// Parse a grid element. An absent element gives an empty grid.
    pub fn from_element(elem: Option<&XmlElement>) -> WcsResult<Self> {
        let Some(elem) = elem else {
            return Ok(Self::default());
        };

        let dimension = elem
            .attribute("dimension")
            .ok_or_else(|| WcsError::MissingElement(format!("{}@dimension", elem.local_name())))?;
        let dimension = dimension
            .trim()
            .parse::<u32>()
            .map_err(|e| WcsError::InvalidValue {
                element: "dimension".to_string(),
                message: format!("'{}': {}", dimension, e),
            })?;

        Ok(Self {
            dimension: Some(dimension),
            axis_labels: elem
                .findall(&gml("axisName"))
                .into_iter()
                .filter_map(XmlElement::text)
                .map(str::to_string)
                .collect(),
            low_limits: tokens(required(elem, &gml("limits/GridEnvelope/low"))?),
            high_limits: tokens(required(elem, &gml("limits/GridEnvelope/high"))?),
        })
    }
}

/// A grid georeferenced by an origin and one offset vector per axis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RectifiedGrid {
    pub grid: Grid,
    pub origin: Vec<String>,
    pub offset_vectors: Vec<Vec<String>>,
}

impl RectifiedGrid {
    pub fn from_element(elem: &XmlElement) -> WcsResult<Self> {
        let grid = Grid::from_element(Some(elem))?;

        let origin = elem
            .find(&gml("origin/pos"))
            .or_else(|| elem.find(&gml("origin/Point/pos")))
            .ok_or_else(|| WcsError::MissingElement("RectifiedGrid/origin/pos".to_string()))?;

        Ok(Self {
            grid,
            origin: tokens(origin),
            offset_vectors: elem
                .findall(&gml("offsetVector"))
                .into_iter()
                .map(tokens)
                .collect(),
        })
    }
}

/// The spatial grid of a coverage: plain or rectified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CoverageGrid {
    Grid(Grid),
    Rectified(RectifiedGrid),
}

impl CoverageGrid {
    /// The fields common to both variants.
    pub fn base(&self) -> &Grid {
        match self {
            CoverageGrid::Grid(grid) => grid,
            CoverageGrid::Rectified(rectified) => &rectified.grid,
        }
    }

    pub fn as_rectified(&self) -> Option<&RectifiedGrid> {
        match self {
            CoverageGrid::Rectified(rectified) => Some(rectified),
            CoverageGrid::Grid(_) => None,
        }
    }

    pub fn is_rectified(&self) -> bool {
        matches!(self, CoverageGrid::Rectified(_))
    }
}

fn required<'a>(elem: &'a XmlElement, path: &str) -> WcsResult<&'a XmlElement> {
    elem.find(path).ok_or_else(|| {
        WcsError::MissingElement(format!(
            "{}/{}",
            elem.local_name(),
            strip_namespaces(path)
        ))
    })
}

fn tokens(elem: &XmlElement) -> Vec<String> {
    elem.text()
        .unwrap_or_default()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

fn strip_namespaces(path: &str) -> String {
    path.split('}')
        .map(|part| part.split('{').next().unwrap_or_default())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECTIFIED: &str = r#"<gml:RectifiedGrid xmlns:gml="http://www.opengis.net/gml" dimension="2">
        <gml:limits><gml:GridEnvelope>
            <gml:low>0 0</gml:low><gml:high>99 99</gml:high>
        </gml:GridEnvelope></gml:limits>
        <gml:axisName>x</gml:axisName>
        <gml:axisName>y</gml:axisName>
        <gml:origin><gml:pos>10.0 20.0</gml:pos></gml:origin>
        <gml:offsetVector>1.0 0.0</gml:offsetVector>
    </gml:RectifiedGrid>"#;

    #[test]
    fn test_plain_grid_fields() {
        let elem = XmlElement::parse(RECTIFIED.as_bytes()).unwrap();
        let grid = Grid::from_element(Some(&elem)).unwrap();
        assert_eq!(grid.dimension, Some(2));
        assert_eq!(grid.low_limits, vec!["0", "0"]);
        assert_eq!(grid.high_limits, vec!["99", "99"]);
        assert_eq!(grid.axis_labels, vec!["x", "y"]);
    }

    #[test]
    fn test_rectified_grid_fields() {
        let elem = XmlElement::parse(RECTIFIED.as_bytes()).unwrap();
        let rectified = RectifiedGrid::from_element(&elem).unwrap();
        assert_eq!(rectified.grid.dimension, Some(2));
        assert_eq!(rectified.origin, vec!["10.0", "20.0"]);
        assert_eq!(rectified.offset_vectors, vec![vec!["1.0", "0.0"]]);
    }

    #[test]
    fn test_absent_grid_is_empty() {
        let grid = Grid::from_element(None).unwrap();
        assert_eq!(grid, Grid::default());
        assert!(grid.dimension.is_none());
    }

    #[test]
    fn test_bad_dimension() {
        let elem = XmlElement::parse(
            br#"<gml:Grid xmlns:gml="http://www.opengis.net/gml" dimension="two"/>"#,
        )
        .unwrap();
        assert!(matches!(
            Grid::from_element(Some(&elem)),
            Err(WcsError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_missing_limits() {
        let elem = XmlElement::parse(
            br#"<gml:Grid xmlns:gml="http://www.opengis.net/gml" dimension="2"/>"#,
        )
        .unwrap();
        let err = Grid::from_element(Some(&elem)).unwrap_err();
        assert!(matches!(err, WcsError::MissingElement(ref p) if p == "Grid/limits/GridEnvelope/low"));
    }

    #[test]
    fn test_origin_inside_point() {
        let elem = XmlElement::parse(
            br#"<gml:RectifiedGrid xmlns:gml="http://www.opengis.net/gml" dimension="1">
                <gml:limits><gml:GridEnvelope><gml:low>0</gml:low><gml:high>9</gml:high></gml:GridEnvelope></gml:limits>
                <gml:origin><gml:Point><gml:pos>5</gml:pos></gml:Point></gml:origin>
            </gml:RectifiedGrid>"#,
        )
        .unwrap();
        let rectified = RectifiedGrid::from_element(&elem).unwrap();
        assert_eq!(rectified.origin, vec!["5"]);
        assert!(rectified.offset_vectors.is_empty());
    }
}
