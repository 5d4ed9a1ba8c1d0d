//! Plan footprints and their partition into zone footprints.

use crate::Point;
use crate::error::GeometryError;
use crate::geom::polygon::Polygon;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Facade orientation of a perimeter zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    South,
    East,
    North,
    West,
}

impl Orientation {
    /// Orientations in the counterclockwise edge order of a [`Rect`].
    pub const ALL: [Orientation; 4] = [Self::South, Self::East, Self::North, Self::West];

    pub fn short_name(&self) -> &'static str {
        match self {
            Self::South => "S",
            Self::East => "E",
            Self::North => "N",
            Self::West => "W",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Axis-aligned rectangle in plan (x: east, y: north).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rect {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Rectangle at the origin with the given area and `width / depth` ratio.
    pub fn from_area(area: f64, aspect_ratio: f64) -> Result<Self, GeometryError> {
        if !(area.is_finite() && area > 0.) {
            return Err(GeometryError::NoValidFootprint {
                reason: format!("footprint area must be positive, got {area}"),
            });
        }
        if !(aspect_ratio.is_finite() && aspect_ratio > 0.) {
            return Err(GeometryError::NoValidFootprint {
                reason: format!("aspect ratio must be positive, got {aspect_ratio}"),
            });
        }
        let width = (area * aspect_ratio).sqrt();
        let depth = area / width;
        Ok(Self::new(0., 0., width, depth))
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn depth(&self) -> f64 {
        self.y1 - self.y0
    }

    pub fn area(&self) -> f64 {
        self.width() * self.depth()
    }

    /// Corners in counterclockwise order starting at (x0, y0).
    pub fn corners(&self) -> [(f64, f64); 4] {
        [
            (self.x0, self.y0),
            (self.x1, self.y0),
            (self.x1, self.y1),
            (self.x0, self.y1),
        ]
    }

    pub fn to_polygon(&self, z: f64) -> Polygon {
        Polygon::from_xy(&self.corners(), z)
    }

    /// Shrinks the rectangle by `d` on every side. None if nothing would remain.
    pub fn inset(&self, d: f64) -> Option<Self> {
        let r = Self::new(self.x0 + d, self.y0 + d, self.x1 - d, self.y1 - d);
        (r.width() > 0. && r.depth() > 0.).then_some(r)
    }

    /// Splits into consecutive strips along X, with widths proportional to `fractions`.
    pub fn split_x(&self, fractions: &[f64]) -> Vec<Self> {
        let total: f64 = fractions.iter().sum();
        let mut x = self.x0;
        let mut out = Vec::with_capacity(fractions.len());
        for (i, f) in fractions.iter().enumerate() {
            // Last strip closes exactly on x1
            let next = if i + 1 == fractions.len() {
                self.x1
            } else {
                x + self.width() * f / total
            };
            out.push(Self::new(x, self.y0, next, self.y1));
            x = next;
        }
        out
    }

    /// Splits into consecutive strips along Y, with depths proportional to `fractions`.
    pub fn split_y(&self, fractions: &[f64]) -> Vec<Self> {
        let total: f64 = fractions.iter().sum();
        let mut y = self.y0;
        let mut out = Vec::with_capacity(fractions.len());
        for (i, f) in fractions.iter().enumerate() {
            let next = if i + 1 == fractions.len() {
                self.y1
            } else {
                y + self.depth() * f / total
            };
            out.push(Self::new(self.x0, y, self.x1, next));
            y = next;
        }
        out
    }

    /// Splits into `n` equal strips along X.
    pub fn split_x_equal(&self, n: usize) -> Vec<Self> {
        self.split_x(&vec![1.; n.max(1)])
    }
}

/// One perimeter zone footprint.
#[derive(Debug, Clone, PartialEq)]
pub struct PerimeterSegment {
    pub orientation: Orientation,
    pub index: usize,
    pub polygon: Polygon,
}

/// Result of a perimeter/core split of a rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct PerimeterCore {
    pub perimeter: Vec<PerimeterSegment>,
    pub core: Rect,
}

/// Splits a rectangle into a core and perimeter bands of width `depth`.
///
/// Each band is a trapezoid along one facade, further divided into segments no longer
/// than `max_segment_length` along the facade. Returns None when the rectangle is too
/// small to keep a core at least `depth` wide in both directions.
pub fn perimeter_core(rect: &Rect, depth: f64, max_segment_length: f64) -> Option<PerimeterCore> {
    if !(depth > 0. && max_segment_length > 0.) {
        return None;
    }
    let core = rect.inset(depth)?;
    if core.width() < depth || core.depth() < depth {
        return None;
    }

    let outer = rect.corners();
    let inner = core.corners();
    let mut perimeter = Vec::new();
    for (i, orientation) in Orientation::ALL.iter().enumerate() {
        let j = (i + 1) % 4;
        let (o0, o1) = (pt(outer[i]), pt(outer[j]));
        let (i0, i1) = (pt(inner[i]), pt(inner[j]));
        let length = o0.distance(&o1);
        let n = ((length / max_segment_length).ceil() as usize).max(1);
        for k in 0..n {
            let t0 = k as f64 / n as f64;
            let t1 = (k + 1) as f64 / n as f64;
            let polygon = Polygon::new(vec![
                Point::new_between_2_points(o0, o1, t0),
                Point::new_between_2_points(o0, o1, t1),
                Point::new_between_2_points(i0, i1, t1),
                Point::new_between_2_points(i0, i1, t0),
            ]);
            perimeter.push(PerimeterSegment {
                orientation: *orientation,
                index: k + 1,
                polygon,
            });
        }
    }
    Some(PerimeterCore { perimeter, core })
}

fn pt((x, y): (f64, f64)) -> Point {
    Point::new(x, y, 0.)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_area() -> Result<(), GeometryError> {
        let r = Rect::from_area(1500., 1.5)?;
        assert!((r.area() - 1500.).abs() < 1e-9);
        assert!((r.width() / r.depth() - 1.5).abs() < 1e-9);
        assert!(Rect::from_area(0., 1.).is_err());
        assert!(Rect::from_area(100., f64::NAN).is_err());
        Ok(())
    }

    #[test]
    fn test_split_strips_conserve_area() {
        let r = Rect::new(0., 0., 10., 4.);
        let strips = r.split_x(&[0.2, 0.5, 0.3]);
        assert_eq!(strips.len(), 3);
        assert!((strips[1].width() - 5.).abs() < 1e-12);
        assert_eq!(strips[2].x1, 10.);
        let total: f64 = r.split_y(&[1., 1., 2.]).iter().map(|s| s.area()).sum();
        assert!((total - 40.).abs() < 1e-12);
    }

    #[test]
    fn test_perimeter_core_tiles_rectangle() {
        let r = Rect::new(0., 0., 40., 30.);
        let pc = perimeter_core(&r, 5., 8.).unwrap();
        // 40 m facades -> 5 segments, 30 m facades -> 4 segments
        assert_eq!(pc.perimeter.len(), 18);
        let perim_area: f64 = pc.perimeter.iter().map(|s| s.polygon.area()).sum();
        assert!((perim_area + pc.core.area() - r.area()).abs() < 1e-9);
        for seg in &pc.perimeter {
            // Counterclockwise from above
            assert!(seg.polygon.normal().unwrap().dz > 0.);
        }
    }

    #[test]
    fn test_perimeter_core_too_small() {
        let r = Rect::new(0., 0., 12., 12.);
        assert!(perimeter_core(&r, 4.57, 8.).is_none());
        assert!(perimeter_core(&r, 3., 8.).is_some());
    }
}
