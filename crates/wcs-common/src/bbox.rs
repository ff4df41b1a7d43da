//! Bounding box types and operations.

use serde::{Deserialize, Serialize};

/// A geographic or projected bounding box.
///
/// A WGS84 box read from a `lonLatEnvelope` carries longitudes in `x` and
/// latitudes in `y`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Build a box from two GML `pos` strings: lower corner then upper corner.
    ///
    /// Each position is whitespace-separated; only the first two ordinates
    /// are used.
    pub fn from_positions(lower: &str, upper: &str) -> Result<Self, BboxParseError> {
        let (min_x, min_y) = parse_position(lower)?;
        let (max_x, max_y) = parse_position(upper)?;
        Ok(Self::new(min_x, min_y, max_x, max_y))
    }

    /// Render as a KVP BBOX value, comma-joined in min/min/max/max order.
    pub fn to_kvp_string(&self) -> String {
        format!("{},{},{},{}", self.min_x, self.min_y, self.max_x, self.max_y)
    }

    /// Corners as (min_x, min_y, max_x, max_y).
    pub fn as_tuple(&self) -> (f64, f64, f64, f64) {
        (self.min_x, self.min_y, self.max_x, self.max_y)
    }
}

impl From<(f64, f64, f64, f64)> for BoundingBox {
    fn from((min_x, min_y, max_x, max_y): (f64, f64, f64, f64)) -> Self {
        Self::new(min_x, min_y, max_x, max_y)
    }
}

fn parse_number(s: &str) -> Result<f64, BboxParseError> {
    s.trim()
        .parse()
        .map_err(|_| BboxParseError::InvalidNumber(s.to_string()))
}

fn parse_position(pos: &str) -> Result<(f64, f64), BboxParseError> {
    let mut ordinates = pos.split_whitespace();
    match (ordinates.next(), ordinates.next()) {
        (Some(x), Some(y)) => Ok((parse_number(x)?, parse_number(y)?)),
        _ => Err(BboxParseError::InvalidPosition(pos.to_string())),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BboxParseError {
    #[error("Invalid ordinate: {0}")]
    InvalidNumber(String),

    #[error("Position needs two ordinates: '{0}'")]
    InvalidPosition(String),
}
