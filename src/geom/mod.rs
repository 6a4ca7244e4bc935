mod algorithm;
mod bbox;
mod crs;
mod geom;

use bbox::BoundingBox;
pub use crs::Crs;
pub(crate) use algorithm::reproject_shapes;
pub(crate) use geom::Geometries;
