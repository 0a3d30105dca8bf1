//! Drivable area and line-segment predicates backing the circuit.

use std::fmt;

use geo::algorithm::bounding_rect::BoundingRect;
use geo::algorithm::contains::Contains;
use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{coord, Coord, Line, LineString, Polygon, Rect};

use super::Cell;

/// Errors raised while constructing a [`Road`] from raw border coordinates.
#[derive(Debug)]
pub enum GeometryError {
    /// A border list did not contain an even number of coordinates, or had
    /// fewer than three points.
    MalformedBorder,
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeometryError::MalformedBorder => write!(f, "border coordinate list is malformed"),
        }
    }
}

impl std::error::Error for GeometryError {}

/// The drivable area of a circuit: an outer border with a single
/// rectangular-ish hole (the infield), plus helpers for point and segment
/// containment used by move generation.
#[derive(Debug, Clone)]
pub struct Road {
    polygon: Polygon<f64>,
    bounds: Rect<f64>,
}

impl Road {
    /// Builds a `Road` from two closed rings of lattice cells: the outer
    /// border and the inner border (the hole). Both must have at least
    /// three points.
    pub fn new(outer: &[Cell], inner: &[Cell]) -> Result<Self, GeometryError> {
        let to_f64 = |pts: &[Cell]| pts.iter().map(|&(x, y)| (x as f64, y as f64)).collect::<Vec<_>>();
        Self::from_coords(&to_f64(outer), &to_f64(inner))
    }

    /// Builds a `Road` from two closed rings given in continuous
    /// coordinates, i.e. already translated/scaled into circuit-local
    /// units. This is how [`crate::circuit::Circuit`] builds its road,
    /// since a circuit's borders are divided by its grid size and need not
    /// land on integer coordinates.
    pub fn from_coords(outer: &[(f64, f64)], inner: &[(f64, f64)]) -> Result<Self, GeometryError> {
        if outer.len() < 3 || inner.len() < 3 {
            return Err(GeometryError::MalformedBorder);
        }
        let outer_ring = LineString::from(
            outer.iter().map(|&(x, y)| coord! { x: x, y: y }).collect::<Vec<Coord<f64>>>(),
        );
        let inner_ring = LineString::from(
            inner.iter().map(|&(x, y)| coord! { x: x, y: y }).collect::<Vec<Coord<f64>>>(),
        );
        let polygon = Polygon::new(outer_ring, vec![inner_ring]);
        let bounds = polygon
            .exterior()
            .bounding_rect()
            .ok_or(GeometryError::MalformedBorder)?;
        Ok(Road { polygon, bounds })
    }

    /// Returns true if the continuous point `(x, y)` lies strictly inside
    /// the drivable area (outer border, excluding the infield hole).
    pub fn contains_point(&self, p: (f64, f64)) -> bool {
        self.polygon.contains(&coord! { x: p.0, y: p.1 })
    }

    /// Returns true if the lattice cell lies inside the drivable area.
    pub fn contains_cell(&self, c: Cell) -> bool {
        self.contains_point((c.0 as f64, c.1 as f64))
    }

    /// Returns true if the whole segment `a -> b` stays within the drivable
    /// area.
    pub fn contains_segment(&self, a: (f64, f64), b: (f64, f64)) -> bool {
        let line = Line::new(
            coord! { x: a.0, y: a.1 },
            coord! { x: b.0, y: b.1 },
        );
        self.polygon.contains(&line)
    }

    /// Bounding box of the outer border, as `(minx, miny, maxx, maxy)`.
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        (self.bounds.min().x, self.bounds.min().y, self.bounds.max().x, self.bounds.max().y)
    }

    pub fn exterior(&self) -> &LineString<f64> {
        self.polygon.exterior()
    }

    /// The single hole describing the infield. Circuits always have
    /// exactly one, enforced at construction time.
    pub fn interior(&self) -> &LineString<f64> {
        &self.polygon.interiors()[0]
    }
}

/// Returns the single intersection point of two segments, or `None` if they
/// don't cross in exactly one point (parallel, collinear, or disjoint all
/// count as "no crossing" for our purposes).
pub fn segment_intersection(a1: (f64, f64), a2: (f64, f64), b1: (f64, f64), b2: (f64, f64)) -> Option<(f64, f64)> {
    let l1 = Line::new(coord! { x: a1.0, y: a1.1 }, coord! { x: a2.0, y: a2.1 });
    let l2 = Line::new(coord! { x: b1.0, y: b1.1 }, coord! { x: b2.0, y: b2.1 });
    match line_intersection(l1, l2) {
        Some(LineIntersection::SinglePoint { intersection, .. }) => Some((intersection.x, intersection.y)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_with_hole() -> Road {
        let outer = vec![(0, 0), (10, 0), (10, 10), (0, 10)];
        let inner = vec![(3, 3), (7, 3), (7, 7), (3, 7)];
        Road::new(&outer, &inner).unwrap()
    }

    #[test]
    fn rejects_malformed_border() {
        assert!(Road::new(&[(0, 0), (1, 1)], &[(0, 0), (1, 1), (2, 2)]).is_err());
    }

    #[test]
    fn contains_point_excludes_hole() {
        let road = square_with_hole();
        assert!(road.contains_cell((1, 1)));
        assert!(!road.contains_cell((5, 5)));
        assert!(!road.contains_cell((20, 20)));
    }

    #[test]
    fn segment_crossing_the_border_is_a_single_point() {
        let p = segment_intersection((-5.0, 5.0), (5.0, 5.0), (0.0, 0.0), (0.0, 10.0));
        assert_eq!(p, Some((0.0, 5.0)));
    }

    #[test]
    fn parallel_segments_do_not_cross() {
        assert_eq!(segment_intersection((0.0, 0.0), (10.0, 0.0), (0.0, 1.0), (10.0, 1.0)), None);
    }

    #[test]
    fn contains_segment_false_when_leaving_through_hole() {
        let road = square_with_hole();
        assert!(!road.contains_segment((1.0, 5.0), (9.0, 5.0)));
        assert!(road.contains_segment((1.0, 1.0), (1.0, 9.0)));
    }
}
