use geo::MultiPolygon;
use serde_json::Value;

use crate::geom::{Crs, Geometries};

/// The input polygons, in input order, with optional per-polygon labels.
#[derive(Debug, Clone)]
pub struct Region {
    geoms: Geometries,
    labels: Vec<Value>, // empty unless a label column was requested
}

impl Region {
    pub fn new(shapes: Vec<MultiPolygon<f64>>, crs: Crs) -> Self {
        Self { geoms: Geometries::new(shapes, crs), labels: Vec::new() }
    }

    /// Attach one label per polygon; missing entries become `null`, extras are dropped.
    pub fn with_labels(mut self, mut labels: Vec<Value>) -> Self {
        labels.resize(self.len(), Value::Null);
        self.labels = labels;
        self
    }

    #[inline] pub fn len(&self) -> usize { self.geoms.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.geoms.is_empty() }

    #[inline] pub fn shapes(&self) -> &[MultiPolygon<f64>] { self.geoms.shapes() }

    #[inline] pub fn crs(&self) -> Crs { self.geoms.crs() }

    #[inline] pub fn has_labels(&self) -> bool { !self.labels.is_empty() }

    /// Label of polygon `idx`, if labels were attached.
    #[inline] pub fn label(&self, idx: usize) -> Option<&Value> { self.labels.get(idx) }

    #[inline] pub(crate) fn geoms(&self) -> &Geometries { &self.geoms }
}
