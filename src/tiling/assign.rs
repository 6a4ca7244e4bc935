use geo::Point;
use rstar::{primitives::GeomWithData, RTree};

use crate::config::Matching;

/// Greedy polygon → tile matching. Each tile index appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignment {
    /// `(polygon, tile)` pairs in polygon processing order.
    pairs: Vec<(usize, usize)>,
    /// Polygons left over once the tiles ran out, or with a non-finite centroid.
    unmatched: Vec<usize>,
}

impl Assignment {
    #[inline] pub fn pairs(&self) -> &[(usize, usize)] { &self.pairs }

    #[inline] pub fn unmatched(&self) -> &[usize] { &self.unmatched }

    /// Number of matched polygons.
    #[inline] pub fn len(&self) -> usize { self.pairs.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.pairs.is_empty() }

    /// Tile assigned to `polygon`, if any.
    pub fn tile_of(&self, polygon: usize) -> Option<usize> {
        self.pairs.iter().find(|&&(p, _)| p == polygon).map(|&(_, t)| t)
    }
}

#[inline]
fn is_finite(p: &Point<f64>) -> bool { p.x().is_finite() && p.y().is_finite() }

#[inline]
fn distance_2(a: &Point<f64>, b: &Point<f64>) -> f64 {
    let (dx, dy) = (a.x() - b.x(), a.y() - b.y());
    dx * dx + dy * dy
}

/// Assign every polygon, in input order, to its nearest still-available tile by
/// centroid distance. Ties go to the lowest tile index. Once all tiles are taken
/// the remaining polygons stay unmatched. Points with NaN or infinite
/// coordinates never take part in the matching.
///
/// This is greedy, not a minimum-cost matching: an early polygon may take a tile
/// a later polygon needed more.
pub fn assign(polygons: &[Point<f64>], tiles: &[Point<f64>], matching: Matching) -> Assignment {
    match matching {
        Matching::Scan => assign_scan(polygons, tiles),
        Matching::Indexed => assign_indexed(polygons, tiles),
    }
}

fn assign_scan(polygons: &[Point<f64>], tiles: &[Point<f64>]) -> Assignment {
    let mut taken = tiles.iter().map(|tile| !is_finite(tile)).collect::<Vec<_>>();
    let mut available = taken.iter().filter(|&&t| !t).count();
    let mut assignment = Assignment::default();

    for (i, centroid) in polygons.iter().enumerate() {
        if available == 0 {
            assignment.unmatched.extend(i..polygons.len());
            break
        }
        if !is_finite(centroid) {
            assignment.unmatched.push(i);
            continue
        }

        let mut best: Option<(usize, f64)> = None;
        for (j, tile) in tiles.iter().enumerate() {
            if taken[j] { continue }
            let d = distance_2(centroid, tile);
            if best.is_none_or(|(_, b)| d < b) { best = Some((j, d)) }
        }

        let Some((j, _)) = best else { break };
        taken[j] = true;
        available -= 1;
        assignment.pairs.push((i, j));
    }

    assignment
}

type TilePoint = GeomWithData<[f64; 2], usize>;

fn assign_indexed(polygons: &[Point<f64>], tiles: &[Point<f64>]) -> Assignment {
    let mut rtree = RTree::bulk_load(
        tiles.iter().enumerate()
            .filter(|(_, tile)| is_finite(tile))
            .map(|(j, tile)| TilePoint::new([tile.x(), tile.y()], j))
            .collect()
    );
    let mut assignment = Assignment::default();

    for (i, centroid) in polygons.iter().enumerate() {
        if !is_finite(centroid) {
            assignment.unmatched.push(i);
            continue
        }
        let query = [centroid.x(), centroid.y()];
        let mut nearest = rtree.nearest_neighbor_iter_with_distance_2(&query);
        let Some((first, best)) = nearest.next() else {
            assignment.unmatched.extend(i..polygons.len());
            break
        };

        // Equidistant candidates come back in arbitrary order; keep the lowest index.
        let mut pick = first.clone();
        for (candidate, d) in nearest {
            if d > best { break }
            if candidate.data < pick.data { pick = candidate.clone() }
        }

        rtree.remove(&pick);
        assignment.pairs.push((i, pick.data));
    }

    assignment
}
