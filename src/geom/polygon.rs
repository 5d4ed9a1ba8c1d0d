//! Planar polygons and the surface-level operations of the geometry kernel.
//!
//! Polygons are immutable: every operation returns a new polygon. Vertex order
//! encodes the outward normal (counterclockwise when viewed from outside).

use crate::error::GeometryError;
use crate::geom::EPS;
use crate::{Point, Vector};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pts: Vec<Point>,
}

impl Polygon {
    pub fn new(pts: Vec<Point>) -> Self {
        Self { pts }
    }

    /// Creates a horizontal polygon from (x, y) pairs at height `z`.
    pub fn from_xy(coords: &[(f64, f64)], z: f64) -> Self {
        Self::new(coords.iter().map(|&(x, y)| Point::new(x, y, z)).collect())
    }

    pub fn vertices(&self) -> &[Point] {
        &self.pts
    }

    pub fn len(&self) -> usize {
        self.pts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pts.is_empty()
    }

    /// Returns the edges of the closed polygon as (start, end) pairs.
    pub fn edges(&self) -> Vec<(Point, Point)> {
        let n = self.pts.len();
        (0..n).map(|i| (self.pts[i], self.pts[(i + 1) % n])).collect()
    }

    /// Sum of the triangle-fan cross products (Newell's vector).
    ///
    /// Its length is twice the polygon area and its direction is the normal.
    /// Valid for planar polygons of any orientation.
    pub fn newell_vector(&self) -> Vector {
        if self.pts.len() < 3 {
            return Vector::zero();
        }
        let p0 = self.pts[0];
        let mut n = Vector::zero();
        for i in 1..self.pts.len() - 1 {
            n = n + (self.pts[i] - p0).cross(self.pts[i + 1] - p0);
        }
        n
    }

    /// Area in m^2.
    pub fn area(&self) -> f64 {
        0.5 * self.newell_vector().length()
    }

    /// Unit normal following the right-hand rule. None for degenerate polygons.
    pub fn normal(&self) -> Option<Vector> {
        self.newell_vector().normalize()
    }

    /// Tilt angle in degrees: 0 facing up, 90 vertical, 180 facing down.
    pub fn tilt(&self) -> Option<f64> {
        let n = self.normal()?;
        Some(n.dz.clamp(-1., 1.).acos().to_degrees())
    }

    /// Azimuth of the normal in degrees clockwise from north (+Y), in [0, 360).
    ///
    /// Horizontal polygons have no meaningful azimuth and return 0.
    pub fn azimuth(&self) -> Option<f64> {
        let n = self.normal()?;
        if n.dx.abs() < EPS && n.dy.abs() < EPS {
            return Some(0.);
        }
        Some(n.dx.atan2(n.dy).to_degrees().rem_euclid(360.))
    }

    /// Vertex average.
    pub fn centroid(&self) -> Point {
        let n = self.pts.len().max(1) as f64;
        let (sx, sy, sz) = self
            .pts
            .iter()
            .fold((0., 0., 0.), |(x, y, z), p| (x + p.x, y + p.y, z + p.z));
        Point::new(sx / n, sy / n, sz / n)
    }

    /// Reverses the winding while keeping the first vertex in place.
    pub fn reversed(&self) -> Self {
        let mut pts = Vec::with_capacity(self.pts.len());
        if let Some(&first) = self.pts.first() {
            pts.push(first);
            pts.extend(self.pts.iter().skip(1).rev());
        }
        Self::new(pts)
    }

    /// Returns a copy with every vertex moved to height `z`.
    pub fn at_z(&self, z: f64) -> Self {
        Self::new(self.pts.iter().map(|p| p.with_z(z)).collect())
    }

    /// Index of the first vertex with a NaN or infinite coordinate.
    pub fn first_non_finite(&self) -> Option<usize> {
        self.pts.iter().position(|p| !p.is_finite())
    }

    /// Merges vertices closer than `tol` to their predecessor.
    ///
    /// The polygon is treated as closed, so trailing vertices coincident with the first
    /// one are dropped as well. Idempotent: every kept vertex is at least `tol` away
    /// from the previously kept one and from the first.
    pub fn remove_coincident_vertices(&self, tol: f64) -> Self {
        let mut kept: Vec<Point> = Vec::with_capacity(self.pts.len());
        for &p in &self.pts {
            match kept.last() {
                Some(last) if last.distance(&p) < tol => {}
                _ => kept.push(p),
            }
        }
        while kept.len() > 1 && kept[kept.len() - 1].distance(&kept[0]) < tol {
            kept.pop();
        }
        Self::new(kept)
    }

    /// Drops vertices lying on the straight line between their neighbours.
    ///
    /// Stops before the polygon would have fewer than 3 vertices.
    pub fn remove_collinear_vertices(&self, tol: f64) -> Self {
        let mut pts = self.pts.clone();
        let mut i = 0;
        while pts.len() > 3 && i < pts.len() {
            let n = pts.len();
            let prev = pts[(i + n - 1) % n];
            let next = pts[(i + 1) % n];
            if distance_to_segment(pts[i], prev, next).is_some_and(|d| d < tol) {
                pts.remove(i);
                i = 0;
            } else {
                i += 1;
            }
        }
        Self::new(pts)
    }

    /// Inserts every point of `candidates` that lies strictly inside one of the edges.
    ///
    /// Used to resolve T-junctions between neighbouring zone footprints so that shared
    /// walls can be paired edge by edge.
    pub fn split_edges_at(&self, candidates: &[Point], tol: f64) -> Self {
        let mut pts = Vec::with_capacity(self.pts.len());
        for (a, b) in self.edges() {
            pts.push(a);
            let ab = b - a;
            let len2 = ab.dot(ab);
            if len2 < EPS {
                continue;
            }
            let mut inner: Vec<(f64, Point)> = candidates
                .iter()
                .filter(|p| p.distance(&a) >= tol && p.distance(&b) >= tol)
                .filter(|p| distance_to_segment(**p, a, b).is_some_and(|d| d < tol))
                .map(|p| ((*p - a).dot(ab) / len2, *p))
                .collect();
            inner.sort_by(|x, y| x.0.total_cmp(&y.0));
            for (_, p) in inner {
                if pts.last().is_none_or(|last: &Point| last.distance(&p) >= tol) {
                    pts.push(p);
                }
            }
        }
        Self::new(pts).remove_coincident_vertices(tol)
    }
}

/// Distance from `p` to segment `a-b`, or None if `p` projects outside the segment.
fn distance_to_segment(p: Point, a: Point, b: Point) -> Option<f64> {
    let ab = b - a;
    let len2 = ab.dot(ab);
    if len2 < EPS {
        return None;
    }
    let t = (p - a).dot(ab) / len2;
    if t <= 0. || t >= 1. {
        return None;
    }
    Some(p.distance(&(a + ab * t)))
}

impl fmt::Display for Polygon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prec = f.precision().unwrap_or(2);
        write!(f, "Polygon[")?;
        for (i, p) in self.pts.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:.prec$}", p, prec = prec)?;
        }
        write!(f, "]")
    }
}

/// Area computed with Newell's cross-product formula.
pub fn compute_area(poly: &Polygon) -> f64 {
    poly.area()
}

/// See [`Polygon::remove_coincident_vertices`].
pub fn remove_coincident_vertices(poly: &Polygon, tol: f64) -> Polygon {
    poly.remove_coincident_vertices(tol)
}

/// Validates a polygon before it is attached to a zone.
///
/// Rejects non-finite coordinates, merges coincident vertices, then requires at least
/// 3 vertices and an area above `min_area`. Returns the cleaned polygon.
pub fn validate_surface(poly: &Polygon, tol: f64, min_area: f64) -> Result<Polygon, GeometryError> {
    if let Some(index) = poly.first_non_finite() {
        return Err(GeometryError::NonFiniteCoordinate { index });
    }
    let cleaned = poly.remove_coincident_vertices(tol);
    if cleaned.len() < 3 {
        return Err(GeometryError::TooFewVertices {
            count: cleaned.len(),
        });
    }
    let area = cleaned.area();
    if area <= min_area {
        return Err(GeometryError::AreaTooSmall { area, min_area });
    }
    Ok(cleaned)
}

/// Orders ceiling vertices so the tilt is 0 (facing up) rather than 180.
pub fn fix_ceiling_orientation(poly: &Polygon) -> Polygon {
    match poly.tilt() {
        Some(tilt) if tilt > 90. => poly.reversed(),
        _ => poly.clone(),
    }
}
