use geo::{Centroid, Coord, LineString, Point, Polygon, Rect};

use crate::{config::TileShape, error::TilingError, geom::Geometries};

/// Hexagon vertex angles (degrees) around the cell center.
const HEX_ANGLES: [f64; 6] = [-30.0, 30.0, 90.0, 150.0, 210.0, 270.0];

/// Horizontal distance between neighboring hexagon centers in a row.
#[inline]
pub(crate) fn hex_pitch(height: f64) -> f64 { 3f64.sqrt() / 2.0 * height }

/// Vertical distance between hexagon rows.
#[inline]
pub(crate) fn hex_row_pitch(height: f64) -> f64 { 0.75 * height }

/// A regular hexagon with the given circumradius around `center`.
pub(crate) fn hexagon(center: Coord<f64>, radius: f64) -> Polygon<f64> {
    let ring = HEX_ANGLES.iter()
        .map(|angle| angle.to_radians())
        .map(|a| Coord { x: center.x + radius * a.cos(), y: center.y + radius * a.sin() })
        .collect::<Vec<_>>();
    Polygon::new(LineString::from(ring), vec![])
}

/// Axis-aligned `width × height` cells from the minimum corner, column by column.
fn rectangle_cells(bounds: &Rect<f64>, width: f64, height: f64) -> Vec<Polygon<f64>> {
    let (min, max) = (bounds.min(), bounds.max());
    let mut cells = Vec::new();

    let mut x = min.x;
    while x < max.x {
        let mut y = min.y;
        while y < max.y {
            cells.push(Rect::new(Coord { x, y }, Coord { x: x + width, y: y + height }).to_polygon());
            y += height;
        }
        x += width;
    }

    cells
}

/// Offset-row hexagons of circumradius `height / 2`; odd rows shift left by half a pitch.
/// Rows run one full hexagon past the top and columns one pitch past the right edge.
fn hexagon_cells(bounds: &Rect<f64>, height: f64) -> Vec<Polygon<f64>> {
    let (min, max) = (bounds.min(), bounds.max());
    let (pitch, row_pitch, radius) = (hex_pitch(height), hex_row_pitch(height), height / 2.0);
    let mut cells = Vec::new();

    let mut y = min.y;
    let mut row = 0usize;
    while y < max.y + height {
        let mut x = min.x - (row % 2) as f64 * (pitch / 2.0);
        while x < max.x + pitch {
            cells.push(hexagon(Coord { x, y }, radius));
            x += pitch;
        }
        y += row_pitch;
        row += 1;
    }

    cells
}

/// Generate a regular tiling covering `bounds`.
/// Hexagons are sized by `height` alone; `width` only applies to rectangles.
pub fn generate_grid(bounds: &Rect<f64>, shape: TileShape, width: f64, height: f64) -> Result<Vec<Polygon<f64>>, TilingError> {
    let usable = |v: f64| v.is_finite() && v > 0.0;
    if !usable(height) || (shape == TileShape::Rectangle && !usable(width)) {
        return Err(TilingError::DegenerateExtent { width, height })
    }

    Ok(match shape {
        TileShape::Rectangle => rectangle_cells(bounds, width, height),
        TileShape::Hexagon => hexagon_cells(bounds, height),
    })
}

/// Generated cells that intersect the region, with their centroids.
/// Cell order follows generation order.
#[derive(Debug, Clone, Default)]
pub(crate) struct Grid {
    cells: Vec<Polygon<f64>>,
    centroids: Vec<Point<f64>>,
}

impl Grid {
    /// Keep only the cells that intersect some shape of `region`.
    pub(crate) fn clipped(cells: Vec<Polygon<f64>>, region: &Geometries) -> Self {
        let cells = cells.into_iter()
            .filter(|cell| region.intersects_any(cell))
            .collect::<Vec<_>>();
        let centroids = cells.iter()
            .map(|cell| cell.centroid().unwrap_or(Point::new(f64::NAN, f64::NAN)))
            .collect();
        Self { cells, centroids }
    }

    #[inline] pub(crate) fn len(&self) -> usize { self.cells.len() }

    #[inline] pub(crate) fn cells(&self) -> &[Polygon<f64>] { &self.cells }

    #[inline] pub(crate) fn centroids(&self) -> &[Point<f64>] { &self.centroids }
}

#[cfg(test)]
mod tests {
    use geo::{Area, BooleanOps, Intersects, MultiPolygon};

    use super::*;
    use crate::geom::Crs;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Rect<f64> {
        Rect::new(Coord { x: x0, y: y0 }, Coord { x: x1, y: y1 })
    }

    fn union_area(cells: &[Polygon<f64>]) -> f64 {
        cells.iter()
            .map(|cell| MultiPolygon(vec![cell.clone()]))
            .reduce(|a, b| a.union(&b))
            .map_or(0.0, |union| union.unsigned_area())
    }

    /// Every sample point in the box lies in (or on the edge of) some cell.
    fn assert_covers(cells: &[Polygon<f64>], bounds: &Rect<f64>) {
        let steps = 40;
        for i in 0..=steps {
            for j in 0..=steps {
                let p = Point::new(
                    bounds.min().x + bounds.width() * i as f64 / steps as f64,
                    bounds.min().y + bounds.height() * j as f64 / steps as f64,
                );
                assert!(cells.iter().any(|cell| cell.intersects(&p)), "uncovered point {p:?}");
            }
        }
    }

    #[test]
    fn rectangles_tile_box_exactly() {
        let bounds = rect(0.0, 0.0, 20.0, 20.0);
        let cells = generate_grid(&bounds, TileShape::Rectangle, 10.0, 10.0).unwrap();

        assert_eq!(cells.len(), 4);
        assert!(cells.iter().all(|cell| (cell.unsigned_area() - 100.0).abs() < 1e-9));
        assert!((union_area(&cells) - 400.0).abs() < 1e-9);
    }

    #[test]
    fn rectangles_are_column_major() {
        let cells = generate_grid(&rect(0.0, 0.0, 20.0, 20.0), TileShape::Rectangle, 10.0, 10.0).unwrap();
        let expected = [(5.0, 5.0), (5.0, 15.0), (15.0, 5.0), (15.0, 15.0)];
        for (cell, (x, y)) in cells.iter().zip(expected) {
            let center = cell.centroid().unwrap();
            assert!((center.x() - x).abs() < 1e-9 && (center.y() - y).abs() < 1e-9);
        }
    }

    #[test]
    fn rectangles_overhang_uneven_box() {
        let bounds = rect(0.0, 0.0, 25.0, 12.0);
        let cells = generate_grid(&bounds, TileShape::Rectangle, 10.0, 10.0).unwrap();
        assert_eq!(cells.len(), 3 * 2);
        assert!(union_area(&cells) >= bounds.width() * bounds.height());
        assert_covers(&cells, &bounds);
    }

    #[test]
    fn hexagon_centers_follow_offset_rows() {
        let cells = generate_grid(&rect(0.0, 0.0, 30.0, 30.0), TileShape::Hexagon, 10.0, 10.0).unwrap();
        let centers = cells.iter().map(|c| c.centroid().unwrap()).collect::<Vec<_>>();

        // First row starts at the box corner.
        assert!((centers[0].x() - 0.0).abs() < 1e-9 && (centers[0].y() - 0.0).abs() < 1e-9);
        // Same-row neighbor is one pitch to the right.
        assert!((centers[1].x() - centers[0].x() - 8.660254).abs() < 1e-6);
        assert!((centers[1].y() - centers[0].y()).abs() < 1e-9);

        // Second row is 7.5 up and shifted left by half a pitch.
        let second = centers.iter().find(|c| (c.y() - 7.5).abs() < 1e-9).unwrap();
        assert!((second.x() + 8.660254 / 2.0).abs() < 1e-6);
    }

    #[test]
    fn hexagons_are_regular() {
        let hex = hexagon(Coord { x: 3.0, y: -2.0 }, 5.0);
        assert_eq!(hex.exterior().0.len(), 7);
        // Area of a regular hexagon: 3√3/2 r².
        assert!((hex.unsigned_area() - 1.5 * 3f64.sqrt() * 25.0).abs() < 1e-9);
        for c in hex.exterior().coords() {
            assert!(((c.x - 3.0).hypot(c.y + 2.0) - 5.0).abs() < 1e-9);
        }
    }

    #[test]
    fn hexagons_cover_box() {
        let bounds = rect(-5.0, 2.0, 37.0, 23.0);
        let cells = generate_grid(&bounds, TileShape::Hexagon, 10.0, 10.0).unwrap();
        assert!(union_area(&cells) >= bounds.width() * bounds.height());
        assert_covers(&cells, &bounds);
    }

    #[test]
    fn zero_size_is_degenerate() {
        let bounds = rect(0.0, 0.0, 10.0, 10.0);
        assert!(matches!(
            generate_grid(&bounds, TileShape::Rectangle, 0.0, 5.0),
            Err(TilingError::DegenerateExtent { .. })
        ));
        assert!(generate_grid(&bounds, TileShape::Hexagon, 0.0, 5.0).is_ok());
        assert!(generate_grid(&bounds, TileShape::Hexagon, 5.0, f64::NAN).is_err());
    }

    #[test]
    fn clipping_keeps_intersecting_cells_in_order() {
        let region = Geometries::new(
            vec![MultiPolygon(vec![rect(0.0, 0.0, 10.0, 10.0).to_polygon()])],
            Crs::WebMercator,
        );
        let cells = generate_grid(&rect(0.0, 0.0, 40.0, 10.0), TileShape::Rectangle, 5.0, 5.0).unwrap();
        let grid = Grid::clipped(cells, &region);

        // Columns at x = 0, 5, and the touching column at x = 10.
        assert_eq!(grid.len(), 6);
        let (first, last) = (grid.centroids()[0], grid.centroids()[5]);
        assert!((first.x() - 2.5).abs() < 1e-9 && (first.y() - 2.5).abs() < 1e-9);
        assert!((last.x() - 12.5).abs() < 1e-9 && (last.y() - 7.5).abs() < 1e-9);
    }
}
