use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::TilingError;

/// Default cap on grid-sizing attempts.
pub const DEFAULT_MAX_ATTEMPTS: usize = 15;

/// Shape of the generated tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileShape {
    #[serde(rename = "Rechteck")]
    Rectangle,
    #[serde(rename = "Hexagon")]
    Hexagon,
}

impl TileShape {
    /// The exact token used to select this shape.
    pub fn token(&self) -> &'static str {
        match self {
            TileShape::Rectangle => "Rechteck",
            TileShape::Hexagon => "Hexagon",
        }
    }
}

impl FromStr for TileShape {
    type Err = TilingError;

    /// Tokens are case-sensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Rechteck" => Ok(TileShape::Rectangle),
            "Hexagon" => Ok(TileShape::Hexagon),
            other => Err(TilingError::InvalidShape(other.to_string())),
        }
    }
}

impl fmt::Display for TileShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.token()) }
}

/// Strategy used to find the nearest available tile for each polygon.
/// Both produce the same assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Matching {
    /// Linear scan over every available tile.
    Scan,
    /// R-tree over tile centroids.
    #[default]
    Indexed,
}

/// Planar CRS the tiling is computed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkingCrs {
    /// EPSG:3857.
    #[default]
    WebMercator,
    /// UTM zone containing the region centre.
    Utm,
}

/// All tiling parameters in one struct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TilingConfig {
    pub shape: TileShape,
    /// Multiplier applied to the tile dimensions on every sizing attempt.
    pub scale: f64,
    pub max_attempts: usize,
    pub matching: Matching,
    pub working_crs: WorkingCrs,
    /// Attribute copied from each input feature onto its output feature and tile.
    pub label: Option<String>,
}

impl Default for TilingConfig {
    fn default() -> Self {
        Self {
            shape: TileShape::Rectangle,
            scale: 1.0,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            matching: Matching::default(),
            working_crs: WorkingCrs::default(),
            label: None,
        }
    }
}

impl TilingConfig {
    pub fn new(shape: TileShape, scale: f64) -> Self {
        Self { shape, scale, ..Default::default() }
    }

    /// Check the numeric parameters before any geometry work starts.
    pub fn validate(&self) -> Result<(), TilingError> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(TilingError::InvalidScale(self.scale))
        }
        Ok(())
    }
}
