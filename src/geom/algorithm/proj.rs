use geo::{Coord, MapCoords, MultiPolygon};
use proj4rs::{proj::Proj as Proj4, transform::transform};

use crate::{error::TilingError, geom::{Crs, Geometries}};

/// Build a PROJ.4 projection for `crs`.
fn build_proj(crs: Crs) -> Result<Proj4, TilingError> {
    let proj_string = crs.proj4();
    Proj4::from_proj_string(&proj_string)
        .map_err(|e| TilingError::Projection(format!("failed to build {crs} from {proj_string}: {e}")))
}

/// Transform a single coordinate. Geographic coordinates are degrees on the way
/// in and out; proj4rs works in radians.
fn transform_coord(from: (&Proj4, Crs), to: (&Proj4, Crs), coord: Coord<f64>) -> Result<Coord<f64>, TilingError> {
    let mut point = if from.1.is_geographic() {
        (coord.x.to_radians(), coord.y.to_radians(), 0.0)
    } else {
        (coord.x, coord.y, 0.0)
    };

    transform(from.0, to.0, &mut point)
        .map_err(|e| TilingError::Projection(format!("{} -> {} at ({}, {}): {e}", from.1, to.1, coord.x, coord.y)))?;

    Ok(if to.1.is_geographic() {
        Coord { x: point.0.to_degrees(), y: point.1.to_degrees() }
    } else {
        Coord { x: point.0, y: point.1 }
    })
}

/// Reproject shapes from one CRS to another.
pub(crate) fn reproject_shapes(shapes: &[MultiPolygon<f64>], from: Crs, to: Crs) -> Result<Vec<MultiPolygon<f64>>, TilingError> {
    if from == to { return Ok(shapes.to_vec()) }

    let (src, dst) = (build_proj(from)?, build_proj(to)?);
    shapes.iter()
        .map(|shape| shape.try_map_coords(|coord| transform_coord((&src, from), (&dst, to), coord)))
        .collect()
}

impl Geometries {
    /// Reproject all shapes into `to`, rebuilding the spatial index.
    pub(crate) fn reproject(&self, to: Crs) -> Result<Geometries, TilingError> {
        Ok(Geometries::new(reproject_shapes(self.shapes(), self.crs(), to)?, to))
    }

    /// Lon/lat of the bounding-box center, if there are any shapes.
    pub(crate) fn geographic_center(&self) -> Result<Option<Coord<f64>>, TilingError> {
        let Some(center) = self.bounds().map(|bounds| bounds.center()) else { return Ok(None) };
        if self.crs().is_geographic() { return Ok(Some(center)) }

        let (src, dst) = (build_proj(self.crs())?, build_proj(Crs::Wgs84)?);
        transform_coord((&src, self.crs()), (&dst, Crs::Wgs84), center).map(Some)
    }
}
