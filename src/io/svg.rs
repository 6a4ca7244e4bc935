//! SVG preview of a region and its tiles.

use std::{fs::File, io::{BufWriter, Write}, path::Path};

use anyhow::{Context, Result};
use geo::{BoundingRect, Coord, CoordsIter, LineString, MultiPolygon, Rect};

use crate::tiling::TilingResult;

/// Projection function: lon/lat -> SVG coords (x,y)
type Projection = dyn Fn(&Coord<f64>) -> (f64, f64);

const MARGIN: f64 = 10.0;

/// Write SVG header, including the XML declaration and opening <svg> tag.
fn write_svg_header<W: Write>(writer: &mut W, width: f64, height: f64, bounds: &Rect<f64>) -> Result<()> {
    writeln!(writer, r##"<?xml version="1.0" encoding="UTF-8" standalone="no"?>"##)?;
    writeln!(writer, r##"<svg xmlns="http://www.w3.org/2000/svg"
        width="{width:.0}" height="{height:.0}"
        viewBox="0 0 {width:.0} {height:.0}"
        data-lon-min="{lon_min}" data-lon-max="{lon_max}"
        data-lat-min="{lat_min}" data-lat-max="{lat_max}">"##,
        lon_min = bounds.min().x,
        lon_max = bounds.max().x,
        lat_min = bounds.min().y,
        lat_max = bounds.max().y,
    )?;
    writeln!(writer, r##"<rect width="100%" height="100%" fill="#ffffff"/>"##)?;
    writeln!(writer, r##"<defs>
<style>
    .blk {{ fill: #e5e7eb; stroke: #111827; stroke-width: 0.5; fill-opacity: 0.85; }}
    .tile {{ fill: #e74c3c; stroke: #e74c3c; stroke-width: 0.8; fill-opacity: 0.4; }}
</style>
</defs>"##)?;
    Ok(())
}

/// Build a compact SVG path string for a LineString (ring).
fn ring_to_path(ring: &LineString<f64>, project: &Projection, out: &mut String) {
    let mut coords = ring.coords_iter().map(|coord| project(&coord));
    if let Some((x, y)) = coords.next() {
        out.push_str(&format!(" M{x:.3},{y:.3}"));
        for (x, y) in coords {
            out.push_str(&format!(" L{x:.3},{y:.3}"));
        }
        out.push('Z');
    }
}

/// Build a compact SVG path string for a MultiPolygon (exteriors + holes).
fn multipolygon_to_path(shape: &MultiPolygon<f64>, project: &Projection) -> String {
    let mut out = String::new();
    for polygon in &shape.0 {
        ring_to_path(polygon.exterior(), project, &mut out);
        for interior in polygon.interiors() {
            ring_to_path(interior, project, &mut out);
        }
    }
    out
}

fn draw_polygons<'a, W: Write>(
    writer: &mut W,
    shapes: impl IntoIterator<Item = &'a MultiPolygon<f64>>,
    class: &str,
    project: &Projection,
) -> Result<()> {
    for shape in shapes {
        writeln!(writer, r#"<path class="{class}" fill-rule="evenodd" d="{}"/>"#, multipolygon_to_path(shape, project))?;
    }
    Ok(())
}

/// Render the preview to any writer. Longitudes are shrunk by cos(mid latitude)
/// so shapes keep roughly their true aspect ratio.
fn write_preview<W: Write>(writer: &mut W, result: &TilingResult, width: f64) -> Result<()> {
    let bounds = result.original().iter()
        .chain(result.tiles().iter().map(|tile| &tile.geometry))
        .filter_map(|shape| shape.bounding_rect())
        .reduce(|a, b| Rect::new(
            Coord { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
            Coord { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
        ))
        .unwrap_or(Rect::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 1.0 }));

    let kx = bounds.center().y.to_radians().cos();
    let span_x = (bounds.width() * kx).max(f64::EPSILON);
    let span_y = bounds.height().max(f64::EPSILON);
    let scale = (width - 2.0 * MARGIN) / span_x;
    let height = span_y * scale + 2.0 * MARGIN;

    let (min, max) = (bounds.min(), bounds.max());
    let project = move |c: &Coord<f64>| (
        MARGIN + (c.x - min.x) * kx * scale,
        MARGIN + (max.y - c.y) * scale,
    );

    write_svg_header(writer, width, height, &bounds)?;
    draw_polygons(writer, result.original(), "blk", &project)?;
    draw_polygons(writer, result.tiles().iter().map(|tile| &tile.geometry), "tile", &project)?;
    writeln!(writer, "</svg>")?;
    Ok(())
}

/// Render the preview to a string.
pub fn svg_preview(result: &TilingResult, width: f64) -> Result<String> {
    let mut buffer = Vec::new();
    write_preview(&mut buffer, result, width)?;
    String::from_utf8(buffer).context("[io::svg] SVG output is not valid UTF-8")
}

/// Write the preview to `path`.
pub fn write_svg_preview(path: &Path, result: &TilingResult, width: f64) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("[io::svg] Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_preview(&mut writer, result, width)?;
    writer.flush()?;
    Ok(())
}
