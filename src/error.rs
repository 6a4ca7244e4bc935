use thiserror::Error;

/// Errors that can occur while building a tiling for a region.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum TilingError {
    #[error("invalid tile shape {0:?} (expected \"Rechteck\" or \"Hexagon\")")]
    InvalidShape(String),

    #[error("region contains no polygons")]
    EmptyRegion,

    #[error("polygon {0} has no area to take a centroid from")]
    EmptyShape(usize),

    #[error("degenerate extent: width={width}, height={height}")]
    DegenerateExtent { width: f64, height: f64 },

    #[error("scale factor must be positive and finite, got {0}")]
    InvalidScale(f64),

    #[error("unsupported coordinate reference system: EPSG:{0}")]
    UnsupportedCrs(u32),

    #[error("projection failed: {0}")]
    Projection(String),
}
