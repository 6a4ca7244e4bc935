use std::path::Path;

use anyhow::{Context, Result};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde_json::{json, Value};
use shapefile::{dbase::{FieldValue, Record}, PolygonRing, Reader, Shape};
use tracing::warn;

/// Convert shapefile rings into a MultiPolygon. Each outer ring starts a new
/// polygon and the inner rings that follow it become its holes.
fn rings_to_geo<P>(rings: &[PolygonRing<P>], xy: impl Fn(&P) -> Coord<f64>) -> MultiPolygon<f64> {
    let mut polys: Vec<Polygon<f64>> = Vec::new();
    let mut current_exterior: Option<LineString<f64>> = None;
    let mut current_holes: Vec<LineString<f64>> = Vec::new();

    for ring in rings {
        match ring {
            PolygonRing::Outer(points) if points.is_empty() => {}
            PolygonRing::Outer(points) => {
                // flush previous polygon
                if let Some(ext) = current_exterior.take() {
                    polys.push(Polygon::new(ext, std::mem::take(&mut current_holes)));
                }
                current_exterior = Some(LineString(points.iter().map(&xy).collect()));
            }
            PolygonRing::Inner(points) => current_holes.push(LineString(points.iter().map(&xy).collect())),
        }
    }
    if let Some(ext) = current_exterior {
        polys.push(Polygon::new(ext, current_holes));
    }

    MultiPolygon(polys)
}

/// Convert a shape to a MultiPolygon, or `None` for non-polygon or empty shapes.
fn shape_to_geo(shape: &Shape) -> Option<MultiPolygon<f64>> {
    let shape = match shape {
        Shape::Polygon(p) => Some(rings_to_geo(p.rings(), |pt| Coord { x: pt.x, y: pt.y })),
        Shape::PolygonM(p) => Some(rings_to_geo(p.rings(), |pt| Coord { x: pt.x, y: pt.y })),
        Shape::PolygonZ(p) => Some(rings_to_geo(p.rings(), |pt| Coord { x: pt.x, y: pt.y })),
        _ => None,
    }?;
    (!shape.0.is_empty()).then_some(shape)
}

/// Convert a dBase field to JSON, trimming padded character fields.
fn field_to_json(value: &FieldValue) -> Value {
    match value {
        FieldValue::Character(Some(s)) => json!(s.trim()),
        FieldValue::Memo(s) => json!(s),
        FieldValue::Numeric(Some(n)) => json!(n),
        FieldValue::Float(Some(f)) => json!(*f as f64),
        FieldValue::Integer(i) => json!(i),
        FieldValue::Double(d) | FieldValue::Currency(d) => json!(d),
        FieldValue::Logical(Some(b)) => json!(b),
        _ => Value::Null,
    }
}

/// Read polygon shapes (and optionally one attribute per shape) from a `.shp` file
/// and its sibling `.dbf`.
pub(crate) fn read_from_shapefile(path: &Path, label: Option<&str>) -> Result<(Vec<MultiPolygon<f64>>, Vec<Value>)> {
    let mut reader = Reader::from_path(path)
        .with_context(|| format!("Failed to open shapefile: {}", path.display()))?;

    let mut shapes = Vec::with_capacity(reader.shape_count()?);
    let mut labels = Vec::new();

    for (idx, result) in reader.iter_shapes_and_records().enumerate() {
        let (shape, record): (Shape, Record) = result.context("Error reading shape+record")?;
        let Some(shape) = shape_to_geo(&shape) else {
            warn!(record = idx, shape = ?shape.shapetype(), "skipping non-polygon or empty shape");
            continue
        };

        shapes.push(shape);
        if let Some(label) = label {
            labels.push(record.get(label).map_or(Value::Null, field_to_json));
        }
    }

    Ok((shapes, labels))
}
