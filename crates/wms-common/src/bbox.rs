//! Bounding box types and the KVP half of the bounding box codec.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An ordered coordinate pair, the unit a bounding box corner is written as.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Parse a corner from whitespace separated text such as `"-180.0 -90.0"`.
    ///
    /// Only the first two numbers are used, any further ordinates are ignored.
    /// Returns `None` when fewer than two numbers can be read.
    pub fn from_text(text: &str) -> Option<Self> {
        let mut parts = text.split_whitespace();
        let x = parts.next()?.parse().ok()?;
        let y = parts.next()?.parse().ok()?;
        Some(Self { x, y })
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6} {:.6}", self.x, self.y)
    }
}

/// A 2-D extent with an optional coordinate reference identifier.
///
/// Parsing never checks corner ordering; call [`BoundingBox::is_ordered`]
/// during validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// CRS identifier as carried by the XML `crs` attribute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crs: Option<String>,
    /// Dimensionality tag as carried by the XML `dimensions` attribute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<String>,
    pub lower_corner: Position,
    pub upper_corner: Position,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            crs: None,
            dimensions: None,
            lower_corner: Position::new(min_x, min_y),
            upper_corner: Position::new(max_x, max_y),
        }
    }

    /// Attach a CRS identifier.
    pub fn with_crs(mut self, crs: impl Into<String>) -> Self {
        self.crs = Some(crs.into());
        self
    }

    /// Parse a KVP BBOX value: "minx,miny,maxx,maxy"
    pub fn from_kvp(s: &str) -> Result<Self, BboxParseError> {
        let parts: Vec<&str> = s.split(',').collect();
        if parts.len() != 4 {
            return Err(BboxParseError::InvalidFormat(s.to_string()));
        }

        let mut coords = [0.0f64; 4];
        for (slot, part) in coords.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| BboxParseError::InvalidNumber(part.to_string()))?;
        }

        Ok(Self::new(coords[0], coords[1], coords[2], coords[3]))
    }

    /// Format as a KVP BBOX value, corner-major at six decimals.
    pub fn to_kvp(&self) -> String {
        format!(
            "{:.6},{:.6},{:.6},{:.6}",
            self.lower_corner.x, self.lower_corner.y, self.upper_corner.x, self.upper_corner.y
        )
    }

    pub fn min_x(&self) -> f64 {
        self.lower_corner.x
    }

    pub fn min_y(&self) -> f64 {
        self.lower_corner.y
    }

    pub fn max_x(&self) -> f64 {
        self.upper_corner.x
    }

    pub fn max_y(&self) -> f64 {
        self.upper_corner.y
    }

    /// True when the lower corner is strictly below the upper corner on both axes.
    pub fn is_ordered(&self) -> bool {
        self.lower_corner.x < self.upper_corner.x && self.lower_corner.y < self.upper_corner.y
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum BboxParseError {
    #[error("Invalid BBOX format: {0}. Expected 'minx,miny,maxx,maxy'")]
    InvalidFormat(String),

    #[error("Invalid number in BBOX: {0}")]
    InvalidNumber(String),
}
