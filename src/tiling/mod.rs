mod assign;
mod fit;
mod grid;
mod metrics;

pub use assign::{assign, Assignment};
pub use grid::generate_grid;
pub use metrics::{Metrics, Stats};

use geo::MultiPolygon;
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use crate::{
    config::{TilingConfig, WorkingCrs},
    error::TilingError,
    geom::{reproject_shapes, Crs},
    io::feature_collection,
    region::Region,
};

/// A tile matched to an input polygon, in lon/lat.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignedTile {
    pub polygon: usize,
    pub geometry: MultiPolygon<f64>,
}

/// Everything one tiling run produces. Geometries are EPSG:4326 lon/lat.
#[derive(Debug, Clone)]
pub struct TilingResult {
    original: Vec<MultiPolygon<f64>>,
    labels: Vec<Value>,
    tiles: Vec<AssignedTile>,
    assignment: Assignment,
    metrics: Metrics,
    attempts: usize,
    converged: bool,
}

impl TilingResult {
    #[inline] pub fn original(&self) -> &[MultiPolygon<f64>] { &self.original }

    #[inline] pub fn tiles(&self) -> &[AssignedTile] { &self.tiles }

    #[inline] pub fn assignment(&self) -> &Assignment { &self.assignment }

    #[inline] pub fn metrics(&self) -> &Metrics { &self.metrics }

    /// Number of grid sizes tried.
    #[inline] pub fn attempts(&self) -> usize { self.attempts }

    /// Whether the grid reached one tile per polygon.
    #[inline] pub fn converged(&self) -> bool { self.converged }

    /// Rounded metrics for presentation.
    pub fn stats(&self) -> Stats { Stats::from(&self.metrics) }

    fn label_property(&self, polygon: usize, properties: &mut Map<String, Value>) {
        if let Some(label) = self.labels.get(polygon) {
            properties.insert("label".to_string(), label.clone());
        }
    }

    /// Input polygons as a GeoJSON FeatureCollection.
    pub fn original_geojson(&self) -> Value {
        let properties = (0..self.original.len())
            .map(|i| {
                let mut properties = Map::new();
                properties.insert("index".to_string(), json!(i));
                self.label_property(i, &mut properties);
                properties
            })
            .collect::<Vec<_>>();
        feature_collection(&self.original, properties)
    }

    /// Assigned tiles as a GeoJSON FeatureCollection.
    pub fn tiles_geojson(&self) -> Value {
        let shapes = self.tiles.iter().map(|tile| tile.geometry.clone()).collect::<Vec<_>>();
        let properties = self.tiles.iter()
            .map(|tile| {
                let mut properties = Map::new();
                properties.insert("polygon".to_string(), json!(tile.polygon));
                self.label_property(tile.polygon, &mut properties);
                properties
            })
            .collect::<Vec<_>>();
        feature_collection(&shapes, properties)
    }

    /// `{ "viz_original", "viz_tiles", "stats" }` document.
    pub fn to_json(&self) -> Value {
        json!({
            "viz_original": self.original_geojson(),
            "viz_tiles": self.tiles_geojson(),
            "stats": self.stats(),
        })
    }
}

/// Resolve the planar CRS to compute in.
fn working_crs(region: &Region, choice: WorkingCrs) -> Result<Crs, TilingError> {
    match choice {
        WorkingCrs::WebMercator => Ok(Crs::WebMercator),
        WorkingCrs::Utm => {
            let center = region.geoms().geographic_center()?.ok_or(TilingError::EmptyRegion)?;
            Ok(Crs::utm_containing(center.x, center.y))
        }
    }
}

/// Replace `region` with a regular tiling and score the substitution.
///
/// Polygons are projected into a planar CRS, a grid is sized until it has at least
/// one region-touching tile per polygon, polygons are greedily matched to their
/// nearest free tile, and the match is scored. The call keeps no state.
pub fn generate_tiles(region: &Region, config: &TilingConfig) -> Result<TilingResult, TilingError> {
    config.validate()?;
    if region.is_empty() { return Err(TilingError::EmptyRegion) }

    let working = working_crs(region, config.working_crs)?;
    info!(polygons = region.len(), shape = %config.shape, scale = config.scale, crs = %working, "generating tiles");

    let planar = region.geoms().reproject(working)?;
    let centroids = planar.centroids()?;
    let fit = fit::fit_grid(&planar, config.shape, config.scale, config.max_attempts)?;
    info!(attempts = fit.attempts, tiles = fit.grid.len(), width = fit.dims.width, height = fit.dims.height, "grid fitted");

    let assignment = assign(&centroids, fit.grid.centroids(), config.matching);
    if !assignment.unmatched().is_empty() {
        warn!(unmatched = assignment.unmatched().len(), tiles = fit.grid.len(), "ran out of tiles before every polygon was matched");
    }

    let metrics = metrics::score(&planar, &centroids, fit.grid.cells(), fit.grid.centroids(), &assignment, fit.dims);
    info!(coverage_pct = metrics.coverage_pct, rms_offset = metrics.rms_offset, combined = metrics.combined_metric, "tiling scored");

    let assigned = assignment.pairs().iter()
        .map(|&(_, t)| MultiPolygon(vec![fit.grid.cells()[t].clone()]))
        .collect::<Vec<_>>();
    let tiles = reproject_shapes(&assigned, working, Crs::Wgs84)?
        .into_iter()
        .zip(assignment.pairs())
        .map(|(geometry, &(polygon, _))| AssignedTile { polygon, geometry })
        .collect();

    Ok(TilingResult {
        original: reproject_shapes(region.shapes(), region.crs(), Crs::Wgs84)?,
        labels: (0..region.len()).filter_map(|i| region.label(i).cloned()).collect(),
        tiles,
        assignment,
        metrics,
        attempts: fit.attempts,
        converged: fit.converged,
    })
}

#[cfg(test)]
mod tests {
    use geo::{Coord, Rect};
    use serde_json::json;

    use super::*;
    use crate::config::{Matching, TileShape};

    fn square(x: f64, y: f64, size: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![Rect::new(Coord { x, y }, Coord { x: x + size, y: y + size }).to_polygon()])
    }

    /// Three 10 m squares in an L, already in Web Mercator meters.
    fn l_shape() -> Region {
        Region::new(
            vec![square(0.0, 0.0, 10.0), square(10.0, 0.0, 10.0), square(0.0, 10.0, 10.0)],
            Crs::WebMercator,
        )
    }

    #[test]
    fn l_shape_end_to_end() {
        let result = generate_tiles(&l_shape(), &TilingConfig::new(TileShape::Rectangle, 1.0)).unwrap();
        let stats = result.stats();

        assert_eq!(stats.total_polygons, 3);
        assert!(stats.generated_tiles >= 3);
        assert!(stats.coverage_pct > 0.0);
        assert!(stats.combined_metric >= 0.0);
        assert!(result.converged());
    }

    #[test]
    fn metrics_hold_area_identity() {
        for shape in [TileShape::Rectangle, TileShape::Hexagon] {
            for scale in [0.8, 1.0, 1.3] {
                let result = generate_tiles(&l_shape(), &TilingConfig::new(shape, scale)).unwrap();
                let m = result.metrics();
                assert!((0.0..=100.0).contains(&m.coverage_pct));
                assert!((m.covered_area + m.uncovered_area - m.total_area).abs() < 1e-6 * m.total_area.max(1.0));
                assert!(m.rms_offset >= 0.0);
            }
        }
    }

    #[test]
    fn runs_are_deterministic() {
        let config = TilingConfig { shape: TileShape::Hexagon, scale: 0.9, ..Default::default() };
        let a = generate_tiles(&l_shape(), &config).unwrap();
        let b = generate_tiles(&l_shape(), &config).unwrap();
        assert_eq!(a.metrics(), b.metrics());
        assert_eq!(a.assignment(), b.assignment());
    }

    #[test]
    fn matching_strategies_agree_end_to_end() {
        let scan = TilingConfig { matching: Matching::Scan, ..TilingConfig::new(TileShape::Hexagon, 0.7) };
        let indexed = TilingConfig { matching: Matching::Indexed, ..scan.clone() };
        assert_eq!(
            generate_tiles(&l_shape(), &scan).unwrap().metrics(),
            generate_tiles(&l_shape(), &indexed).unwrap().metrics(),
        );
    }

    #[test]
    fn tiles_carry_polygon_and_label() {
        let region = l_shape().with_labels(vec![json!("a"), json!("b"), json!("c")]);
        let config = TilingConfig { label: Some("name".into()), ..Default::default() };
        let result = generate_tiles(&region, &config).unwrap();

        let tiles = result.tiles_geojson();
        for feature in tiles["features"].as_array().unwrap() {
            let polygon = feature["properties"]["polygon"].as_u64().unwrap() as usize;
            assert_eq!(feature["properties"]["label"], json!(["a", "b", "c"][polygon]));
            assert!(feature["properties"].get("centroid").is_none());
        }
    }

    #[test]
    fn output_json_has_expected_stats_keys() {
        let result = generate_tiles(&l_shape(), &TilingConfig::default()).unwrap();
        let doc = result.to_json();
        let stats = doc["stats"].as_object().unwrap();
        for key in [
            "total_polygons", "generated_tiles", "coverage_pct", "rms_offset_m", "tile_width_m",
            "tile_height_m", "covered_area_m2", "uncovered_area_m2", "combined_metric",
        ] {
            assert!(stats.contains_key(key), "missing {key}");
        }
        assert_eq!(doc["viz_original"]["features"].as_array().unwrap().len(), 3);
        assert_eq!(doc["viz_tiles"]["type"], "FeatureCollection");
    }

    #[test]
    fn empty_region_fails() {
        let region = Region::new(vec![], Crs::WebMercator);
        assert_eq!(generate_tiles(&region, &TilingConfig::default()).unwrap_err(), TilingError::EmptyRegion);
    }

    #[test]
    fn shape_without_coordinates_fails() {
        let mut shapes = l_shape().shapes().to_vec();
        shapes.insert(1, MultiPolygon(vec![]));
        let region = Region::new(shapes, Crs::WebMercator);
        for matching in [Matching::Scan, Matching::Indexed] {
            let config = TilingConfig { matching, ..Default::default() };
            assert_eq!(generate_tiles(&region, &config).unwrap_err(), TilingError::EmptyShape(1));
        }
    }

    #[test]
    fn invalid_scale_fails_before_geometry_work() {
        let config = TilingConfig::new(TileShape::Rectangle, -1.0);
        assert_eq!(generate_tiles(&l_shape(), &config).unwrap_err(), TilingError::InvalidScale(-1.0));
    }
}
