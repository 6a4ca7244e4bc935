use anyhow::{anyhow, bail, Context, Result};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde_json::{json, Map, Value};
use tracing::warn;

/// Features read from a GeoJSON document.
#[derive(Debug, Default)]
pub(crate) struct GeoJsonFeatures {
    pub(crate) shapes: Vec<MultiPolygon<f64>>,
    /// One entry per shape when a label property was requested, else empty.
    pub(crate) labels: Vec<Value>,
    /// EPSG code from a legacy `crs` member, if present.
    pub(crate) epsg: Option<u32>,
}

/// Build a GeoJSON FeatureCollection from shapes and per-feature properties.
pub(crate) fn feature_collection(shapes: &[MultiPolygon<f64>], properties: Vec<Map<String, Value>>) -> Value {
    let features = shapes.iter().zip(properties)
        .map(|(shape, properties)| json!({
            "type": "Feature",
            "geometry": multipolygon_to_geojson(shape),
            "properties": properties,
        }))
        .collect::<Vec<_>>();

    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

/// Convert a MultiPolygon to a GeoJSON geometry object.
fn multipolygon_to_geojson(shape: &MultiPolygon<f64>) -> Value {
    fn ring(line: &LineString<f64>) -> Vec<[f64; 2]> {
        line.coords().map(|c| [c.x, c.y]).collect()
    }

    let polygons = shape.0.iter()
        .map(|polygon| std::iter::once(polygon.exterior())
            .chain(polygon.interiors())
            .map(ring)
            .collect::<Vec<_>>())
        .collect::<Vec<_>>();

    json!({
        "type": "MultiPolygon",
        "coordinates": polygons,
    })
}

/// Map a CRS name such as `urn:ogc:def:crs:EPSG::3857` or `EPSG:4326` to its code.
fn parse_crs_name(name: &str) -> Option<u32> {
    if name.ends_with("CRS84") { return Some(4326) }
    name.rsplit(':').next()?.parse().ok()
}

/// Read Polygon and MultiPolygon features from GeoJSON bytes.
/// Other geometry types are skipped. If `label` is given, that property is
/// collected for every kept feature (`null` when missing).
pub(crate) fn read_from_geojson_bytes(bytes: &[u8], label: Option<&str>) -> Result<GeoJsonFeatures> {
    let value: Value = serde_json::from_slice(bytes).context("Failed to parse GeoJSON bytes")?;

    let features = match value["type"].as_str() {
        Some("FeatureCollection") => value["features"].as_array()
            .ok_or_else(|| anyhow!("FeatureCollection has no features array"))?
            .iter().collect::<Vec<_>>(),
        Some("Feature") => vec![&value],
        other => bail!("Expected a GeoJSON Feature or FeatureCollection, found {other:?}"),
    };

    let mut out = GeoJsonFeatures {
        epsg: value["crs"]["properties"]["name"].as_str().and_then(parse_crs_name),
        ..Default::default()
    };

    for (idx, feature) in features.into_iter().enumerate() {
        let geometry = &feature["geometry"];
        let mut shape = match geometry["type"].as_str() {
            Some("Polygon") => MultiPolygon(vec![parse_polygon_coords(&geometry["coordinates"])
                .with_context(|| format!("feature {idx}: invalid Polygon"))?]),
            Some("MultiPolygon") => parse_multipolygon_coords(&geometry["coordinates"])
                .with_context(|| format!("feature {idx}: invalid MultiPolygon"))?,
            other => {
                warn!(feature = idx, geometry = ?other, "skipping non-polygon feature");
                continue
            }
        };

        // Parts with an empty exterior ring have no area or centroid.
        shape.0.retain(|polygon| !polygon.exterior().0.is_empty());
        if shape.0.is_empty() {
            warn!(feature = idx, "skipping feature without coordinates");
            continue
        }

        out.shapes.push(shape);
        if let Some(label) = label {
            out.labels.push(feature["properties"].get(label).cloned().unwrap_or(Value::Null));
        }
    }

    Ok(out)
}

/// Parse MultiPolygon coordinates: `[[ring, hole, ...], ...]`.
fn parse_multipolygon_coords(coords: &Value) -> Result<MultiPolygon<f64>> {
    let polygons = coords.as_array()
        .ok_or_else(|| anyhow!("coordinates must be an array"))?
        .iter()
        .map(parse_polygon_coords)
        .collect::<Result<Vec<_>>>()?;
    Ok(MultiPolygon(polygons))
}

/// Parse Polygon coordinates: `[exterior, hole, ...]`.
fn parse_polygon_coords(coords: &Value) -> Result<Polygon<f64>> {
    let mut rings = coords.as_array()
        .ok_or_else(|| anyhow!("coordinates must be an array"))?
        .iter()
        .map(parse_ring_coords);

    let exterior = rings.next().ok_or_else(|| anyhow!("missing exterior ring"))??;
    let interiors = rings.collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(exterior, interiors))
}

/// Parse a ring `[[x, y], ...]`; extra ordinates are ignored.
fn parse_ring_coords(coords: &Value) -> Result<LineString<f64>> {
    let points = coords.as_array()
        .ok_or_else(|| anyhow!("ring must be an array"))?
        .iter()
        .map(|pair| {
            let x = pair[0].as_f64().ok_or_else(|| anyhow!("Invalid coordinate: x must be a number"))?;
            let y = pair[1].as_f64().ok_or_else(|| anyhow!("Invalid coordinate: y must be a number"))?;
            Ok(Coord { x, y })
        })
        .collect::<Result<Vec<_>>>()?;

    // Polygon::new closes the ring if needed.
    Ok(LineString(points))
}

#[cfg(test)]
mod tests {
    use geo::Area;

    use super::*;

    const SAMPLE: &str = r#"{
        "type": "FeatureCollection",
        "crs": { "type": "name", "properties": { "name": "urn:ogc:def:crs:EPSG::3857" } },
        "features": [
            { "type": "Feature", "properties": { "name": "north" },
              "geometry": { "type": "Polygon", "coordinates": [[[0,0],[10,0],[10,10],[0,10],[0,0]]] } },
            { "type": "Feature", "properties": { "name": "line" },
              "geometry": { "type": "LineString", "coordinates": [[0,0],[1,1]] } },
            { "type": "Feature", "properties": {},
              "geometry": { "type": "MultiPolygon", "coordinates": [
                  [[[20,0],[30,0],[30,10],[20,10]], [[22,2],[24,2],[24,4],[22,4]]],
                  [[[40,0],[45,0],[45,5],[40,5]]]
              ] } }
        ]
    }"#;

    #[test]
    fn reads_polygons_and_skips_others() {
        let features = read_from_geojson_bytes(SAMPLE.as_bytes(), Some("name")).unwrap();
        assert_eq!(features.shapes.len(), 2);
        assert_eq!(features.epsg, Some(3857));
        assert_eq!(features.labels, vec![json!("north"), Value::Null]);

        assert!((features.shapes[0].unsigned_area() - 100.0).abs() < 1e-9);
        // 100 - 4 (hole) + 25
        assert!((features.shapes[1].unsigned_area() - 121.0).abs() < 1e-9);
    }

    #[test]
    fn no_label_means_no_labels() {
        let features = read_from_geojson_bytes(SAMPLE.as_bytes(), None).unwrap();
        assert!(features.labels.is_empty());
    }

    #[test]
    fn written_collection_reads_back() {
        let features = read_from_geojson_bytes(SAMPLE.as_bytes(), None).unwrap();
        let properties = (0..features.shapes.len()).map(|_| Map::new()).collect();
        let written = serde_json::to_vec(&feature_collection(&features.shapes, properties)).unwrap();

        let reread = read_from_geojson_bytes(&written, None).unwrap();
        assert_eq!(reread.shapes, features.shapes);
        assert_eq!(reread.epsg, None);
    }

    #[test]
    fn crs_names() {
        assert_eq!(parse_crs_name("urn:ogc:def:crs:OGC:1.3:CRS84"), Some(4326));
        assert_eq!(parse_crs_name("EPSG:4269"), Some(4269));
        assert_eq!(parse_crs_name("nonsense"), None);
    }

    #[test]
    fn features_without_coordinates_are_skipped() {
        let bytes = br#"{ "type": "FeatureCollection", "features": [
            { "type": "Feature", "properties": { "name": "void" },
              "geometry": { "type": "Polygon", "coordinates": [[]] } },
            { "type": "Feature", "properties": { "name": "kept" },
              "geometry": { "type": "MultiPolygon", "coordinates": [
                  [[]],
                  [[[0,0],[5,0],[5,5],[0,5],[0,0]]]
              ] } }
        ] }"#;
        let features = read_from_geojson_bytes(bytes, Some("name")).unwrap();
        assert_eq!(features.shapes.len(), 1);
        assert_eq!(features.shapes[0].0.len(), 1);
        assert_eq!(features.labels, vec![json!("kept")]);
    }

    #[test]
    fn rejects_bare_geometry() {
        assert!(read_from_geojson_bytes(br#"{"type":"Point","coordinates":[0,0]}"#, None).is_err());
    }
}
