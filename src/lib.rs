#![doc = "Replace an irregular polygon region with a regular rectangle or hexagon tiling"]
mod config;
mod error;
mod geom;
mod io;
mod region;
mod tiling;

#[doc(inline)]
pub use config::{Matching, TileShape, TilingConfig, WorkingCrs, DEFAULT_MAX_ATTEMPTS};

#[doc(inline)]
pub use error::TilingError;

#[doc(inline)]
pub use geom::Crs;

#[doc(inline)]
pub use io::{read_region, read_region_from_geojson, svg_preview, write_json, write_svg_preview, DEFAULT_EPSG};

#[doc(inline)]
pub use region::Region;

#[doc(inline)]
pub use tiling::{assign, generate_grid, generate_tiles, AssignedTile, Assignment, Metrics, Stats, TilingResult};
