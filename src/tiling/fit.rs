use std::iter::successors;

use tracing::{debug, warn};

use crate::{config::TileShape, error::TilingError, geom::Geometries, tiling::grid::{generate_grid, Grid}};

/// Tile width and height for one sizing attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Dimensions {
    pub(crate) width: f64,
    pub(crate) height: f64,
}

impl Dimensions {
    #[inline]
    fn square(side: f64) -> Self { Self { width: side, height: side } }

    #[inline]
    fn scaled(self, factor: f64) -> Self {
        Self { width: self.width * factor, height: self.height * factor }
    }
}

/// Outcome of the sizing search.
#[derive(Debug, Clone)]
pub(crate) struct Fit {
    pub(crate) grid: Grid,
    pub(crate) dims: Dimensions,
    pub(crate) attempts: usize,
    /// True once the clipped grid has at least one cell per polygon.
    pub(crate) converged: bool,
}

/// Search for tile dimensions whose region-clipped grid has at least one cell per polygon.
///
/// Starts from the square tile of area `bbox_area / polygon_count` and multiplies both
/// sides by `scale` before every attempt, cumulatively. Stops at the first grid that
/// is large enough; after `max_attempts` the last grid is returned as-is.
pub(crate) fn fit_grid(region: &Geometries, shape: TileShape, scale: f64, max_attempts: usize) -> Result<Fit, TilingError> {
    if region.is_empty() { return Err(TilingError::EmptyRegion) }

    let bounds = region.bounds().ok_or(TilingError::EmptyRegion)?;
    let (width, height) = (bounds.width(), bounds.height());
    if !(width > 0.0 && height > 0.0) {
        return Err(TilingError::DegenerateExtent { width, height })
    }

    let target = region.len();
    let initial = Dimensions::square((width * height / target as f64).sqrt());
    debug!(polygons = target, side = initial.width, "starting grid size search");

    let mut last = None;
    for (attempt, dims) in successors(Some(initial.scaled(scale)), |dims| Some(dims.scaled(scale)))
        .take(max_attempts.max(1))
        .enumerate()
    {
        let cells = generate_grid(&bounds, shape, dims.width, dims.height)?;
        let generated = cells.len();
        let grid = Grid::clipped(cells, region);
        debug!(attempt = attempt + 1, width = dims.width, height = dims.height, generated, clipped = grid.len(), "grid attempt");

        let converged = grid.len() >= target;
        let fit = Fit { grid, dims, attempts: attempt + 1, converged };
        if converged { return Ok(fit) }
        last = Some(fit);
    }

    let fit = last.ok_or(TilingError::EmptyRegion)?;
    warn!(attempts = fit.attempts, tiles = fit.grid.len(), polygons = target, "grid size search exhausted; continuing with last grid");
    Ok(fit)
}
