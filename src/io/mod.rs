mod geojson;
mod shp;
mod svg;

pub(crate) use geojson::feature_collection;
pub use svg::{svg_preview, write_svg_preview};

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use serde_json::Value;
use tracing::info;

use crate::{geom::Crs, region::Region};

/// EPSG code assumed when neither the caller nor the file names one.
pub const DEFAULT_EPSG: u32 = 4326;

/// Read a region from a GeoJSON (`.geojson`/`.json`) or shapefile (`.shp`) path.
///
/// `label` names an attribute to carry through to the output. `epsg` overrides
/// the CRS declared by the file; without either, lon/lat WGS84 is assumed.
pub fn read_region(path: &Path, label: Option<&str>, epsg: Option<u32>) -> Result<Region> {
    let extension = path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    let (shapes, labels, declared) = match extension.as_deref() {
        Some("geojson" | "json") => {
            let bytes = fs::read(path)
                .with_context(|| format!("Failed to read GeoJSON file: {}", path.display()))?;
            let features = geojson::read_from_geojson_bytes(&bytes, label)
                .with_context(|| format!("Failed to parse GeoJSON file: {}", path.display()))?;
            (features.shapes, features.labels, features.epsg)
        }
        Some("shp") => {
            let (shapes, labels) = shp::read_from_shapefile(path, label)?;
            (shapes, labels, None)
        }
        _ => bail!("Unsupported input format (expected .geojson, .json or .shp): {}", path.display()),
    };

    let crs = Crs::from_epsg(epsg.or(declared).unwrap_or(DEFAULT_EPSG))?;
    info!(path = %path.display(), polygons = shapes.len(), crs = %crs, "loaded region");

    let region = Region::new(shapes, crs);
    Ok(if label.is_some() { region.with_labels(labels) } else { region })
}

/// Read a region from in-memory GeoJSON bytes.
pub fn read_region_from_geojson(bytes: &[u8], label: Option<&str>, epsg: Option<u32>) -> Result<Region> {
    let features = geojson::read_from_geojson_bytes(bytes, label)?;
    let crs = Crs::from_epsg(epsg.or(features.epsg).unwrap_or(DEFAULT_EPSG))?;
    let region = Region::new(features.shapes, crs);
    Ok(if label.is_some() { region.with_labels(features.labels) } else { region })
}

/// Write a JSON value to `path`, pretty-printed.
pub fn write_json(path: &Path, value: &Value) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value).context("Failed to serialize JSON")?;
    fs::write(path, bytes)
        .with_context(|| format!("Failed to write {}", path.display()))
}
