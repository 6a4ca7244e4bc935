use geo::{BooleanOps, BoundingRect, Centroid, Coord, Intersects, MultiPolygon, Point, Polygon, Rect};
use rstar::{RTree, AABB};

use crate::{error::TilingError, geom::{BoundingBox, Crs}};

/// An ordered collection of MultiPolygons in a known CRS, indexed by bounding box.
#[derive(Debug, Clone)]
pub(crate) struct Geometries {
    shapes: Vec<MultiPolygon<f64>>,
    rtree: RTree<BoundingBox>,
    crs: Crs,
}

impl Geometries {
    /// Construct a Geometries object from a vector of MultiPolygons.
    /// Shapes without a bounding box (empty) are kept but never indexed.
    pub(crate) fn new(shapes: Vec<MultiPolygon<f64>>, crs: Crs) -> Self {
        Self {
            rtree: RTree::bulk_load(
                shapes.iter().enumerate()
                    .filter_map(|(i, shape)| Some(BoundingBox::new(i, shape.bounding_rect()?)))
                    .collect()
            ),
            shapes,
            crs,
        }
    }

    /// Get the number of MultiPolygons.
    #[inline] pub(crate) fn len(&self) -> usize { self.shapes.len() }

    /// Check if there are no MultiPolygons.
    #[inline] pub(crate) fn is_empty(&self) -> bool { self.shapes.is_empty() }

    /// Get a reference to the list of MultiPolygons.
    #[inline] pub(crate) fn shapes(&self) -> &[MultiPolygon<f64>] { &self.shapes }

    #[inline] pub(crate) fn crs(&self) -> Crs { self.crs }

    /// Compute the bounding rectangle of all MultiPolygons.
    pub(crate) fn bounds(&self) -> Option<Rect<f64>> {
        self.shapes.iter()
            .filter_map(|shape| shape.bounding_rect())
            .reduce(|a, b| Rect::new(
                Coord {
                    x: a.min().x.min(b.min().x),
                    y: a.min().y.min(b.min().y),
                },
                Coord {
                    x: a.max().x.max(b.max().x),
                    y: a.max().y.max(b.max().y),
                }
            ))
    }

    /// Compute the centroids of all MultiPolygons. A shape without any
    /// coordinates has no centroid and fails with its index.
    pub(crate) fn centroids(&self) -> Result<Vec<Point<f64>>, TilingError> {
        self.shapes.iter()
            .enumerate()
            .map(|(idx, shape)| shape.centroid().ok_or(TilingError::EmptyShape(idx)))
            .collect()
    }

    /// Compute the union of all MultiPolygons into a single MultiPolygon.
    /// This method may be slow for large numbers of complex polygons.
    pub(crate) fn union(&self) -> Option<MultiPolygon<f64>> {
        self.shapes.iter().cloned().reduce(|a, b| a.union(&b))
    }

    /// Check whether `polygon` intersects (or touches) any of the shapes,
    /// which is the same as intersecting their union.
    pub(crate) fn intersects_any(&self, polygon: &Polygon<f64>) -> bool {
        let Some(rect) = polygon.bounding_rect() else { return false };
        let envelope = AABB::from_corners(rect.min().into(), rect.max().into());
        self.rtree.locate_in_envelope_intersecting(&envelope)
            .any(|candidate| polygon.intersects(&self.shapes[candidate.idx()]))
    }
}
