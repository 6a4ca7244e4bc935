use geo::{Area, BooleanOps, MultiPolygon, Point, Polygon};
use serde::{Deserialize, Serialize};

use crate::{geom::Geometries, tiling::{assign::Assignment, fit::Dimensions}};

/// Quality of a tiling, in working-CRS units (meters).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    pub total_polygons: usize,
    pub generated_tiles: usize,
    pub coverage_pct: f64,
    pub rms_offset: f64,
    pub tile_width: f64,
    pub tile_height: f64,
    pub covered_area: f64,
    pub uncovered_area: f64,
    pub total_area: f64,
    /// `(rms_offset / tile_width) * (1 - coverage_pct / 100)`; 0 is a perfect fit.
    pub combined_metric: f64,
}

/// Root-mean-square centroid distance over the matched pairs (0 if none).
fn rms_offset(polygons: &[Point<f64>], tiles: &[Point<f64>], assignment: &Assignment) -> f64 {
    if assignment.is_empty() { return 0.0 }

    let sum = assignment.pairs().iter()
        .map(|&(p, t)| {
            let (dx, dy) = (polygons[p].x() - tiles[t].x(), polygons[p].y() - tiles[t].y());
            dx * dx + dy * dy
        })
        .sum::<f64>();

    (sum / assignment.len() as f64).sqrt()
}

/// Area of the region union covered by the union of the assigned tiles.
fn covered_area(region_union: &MultiPolygon<f64>, tiles: &[&Polygon<f64>]) -> f64 {
    tiles.iter()
        .map(|&tile| MultiPolygon(vec![tile.clone()]))
        .reduce(|a, b| a.union(&b))
        .map_or(0.0, |tiles_union| region_union.intersection(&tiles_union).unsigned_area())
}

/// Score an assignment of `region` polygons to grid `cells`.
pub(crate) fn score(
    region: &Geometries,
    polygon_centroids: &[Point<f64>],
    cells: &[Polygon<f64>],
    cell_centroids: &[Point<f64>],
    assignment: &Assignment,
    dims: Dimensions,
) -> Metrics {
    let rms_offset = rms_offset(polygon_centroids, cell_centroids, assignment);

    let (total_area, covered_area) = match region.union() {
        Some(union) => {
            let assigned = assignment.pairs().iter().map(|&(_, t)| &cells[t]).collect::<Vec<_>>();
            let total = union.unsigned_area();
            (total, covered_area(&union, &assigned).min(total))
        }
        None => (0.0, 0.0),
    };

    let coverage_pct = if total_area > 0.0 {
        (covered_area / total_area * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    };

    Metrics {
        total_polygons: region.len(),
        generated_tiles: assignment.len(),
        coverage_pct,
        rms_offset,
        tile_width: dims.width,
        tile_height: dims.height,
        covered_area,
        uncovered_area: total_area - covered_area,
        total_area,
        combined_metric: (rms_offset / dims.width) * (1.0 - coverage_pct / 100.0),
    }
}

/// Round half away from zero to `places` decimals.
#[inline]
fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Presentation record of [`Metrics`] with rounded values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub total_polygons: usize,
    pub generated_tiles: usize,
    pub coverage_pct: f64,
    pub rms_offset_m: f64,
    pub tile_width_m: f64,
    pub tile_height_m: f64,
    pub covered_area_m2: f64,
    pub uncovered_area_m2: f64,
    pub combined_metric: f64,
}

impl From<&Metrics> for Stats {
    fn from(m: &Metrics) -> Self {
        Self {
            total_polygons: m.total_polygons,
            generated_tiles: m.generated_tiles,
            coverage_pct: round_to(m.coverage_pct, 2),
            rms_offset_m: round_to(m.rms_offset, 2),
            tile_width_m: round_to(m.tile_width, 2),
            tile_height_m: round_to(m.tile_height, 2),
            covered_area_m2: round_to(m.covered_area, 2),
            uncovered_area_m2: round_to(m.uncovered_area, 2),
            combined_metric: round_to(m.combined_metric, 4),
        }
    }
}
