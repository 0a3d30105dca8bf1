//! Builds the distance-to-finish map by cutting the road's annulus open at
//! the starting line, triangulating the resulting simple polygon, and
//! walking a shortest-path tree of triangles rooted at the finish.

use std::collections::{HashMap, HashSet};
use std::fmt;

use geo::algorithm::contains::Contains;
use geo::{coord, LineString, Polygon};

use crate::circuit::{Circuit, State, Status};
use crate::config;
use crate::geom::Cell;
use crate::{log_additional, log_main};

use super::funnel::{Edge, Funnel, Gate, Vertex};

/// Errors raised while building or querying an [`Analyzer`].
#[derive(Debug)]
pub enum AnalyzerError {
    /// The starting line does not cross a road border exactly once.
    MalformedStartingLine,
    /// No triangle of the cut polygon contains the finish point; the
    /// circuit's geometry is too degenerate to analyze.
    NoFinishTriangle,
    /// A point was queried for distance-to-finish but is not part of the
    /// analyzer's reachability map.
    Unreachable(Cell),
}

impl fmt::Display for AnalyzerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalyzerError::MalformedStartingLine => write!(f, "starting line does not cross the road border exactly once"),
            AnalyzerError::NoFinishTriangle => write!(f, "no triangle of the cut road contains the finish point"),
            AnalyzerError::Unreachable(p) => write!(f, "point {:?} is not reachable from the finish line", p),
        }
    }
}

impl std::error::Error for AnalyzerError {}

/// Owns a [`Circuit`] and the triangulated distance-to-finish map built
/// from its geometry. This is the type the race engine and AI players
/// query move generation through.
pub struct Analyzer {
    circuit: Circuit,
    distances: HashMap<Cell, f64>,
    max_distance: f64,
}

impl Analyzer {
    /// Builds the distance map for `circuit`. This is the expensive part
    /// of loading a circuit - triangulation and tree construction happen
    /// once here, not per query.
    pub fn build(circuit: Circuit) -> Result<Self, AnalyzerError> {
        log_main!(crate::verbose::EVENT_ANALYZER_BUILD, "building distance map", circuit = circuit.name());

        let start_direction = (circuit.starting_direction().0 as f64, circuit.starting_direction().1 as f64);
        let starting_line = circuit.starting_line();

        let interior_ring = ring_coords(circuit.road().interior());
        let exterior_ring = ring_coords(circuit.road().exterior());
        let cut_interior = cut_line_ring(&interior_ring, starting_line, start_direction)?;
        let cut_exterior = cut_line_ring(&exterior_ring, starting_line, start_direction)?;

        let mut polygon_points = cut_interior.clone();
        polygon_points.extend(cut_exterior.iter().rev().copied());

        let middle_start = (
            (cut_interior[0].0 + cut_exterior[0].0 + cut_interior[cut_interior.len() - 1].0 + cut_exterior[cut_exterior.len() - 1].0) / 4.0,
            (cut_interior[0].1 + cut_exterior[0].1 + cut_interior[cut_interior.len() - 1].1 + cut_exterior[cut_exterior.len() - 1].1) / 4.0,
        );
        let finish_point = (
            middle_start.0 - start_direction.0 * config::CUT_OFFSET_FACTOR * 1.5,
            middle_start.1 - start_direction.1 * config::CUT_OFFSET_FACTOR * 1.5,
        );

        let cut_polygon = Polygon::new(
            LineString::from(polygon_points.iter().map(|&(x, y)| coord! { x: x, y: y }).collect::<Vec<_>>()),
            vec![],
        );

        let delaunay_points: Vec<delaunator::Point> = polygon_points.iter().map(|&(x, y)| delaunator::Point { x, y }).collect();
        let triangulation = delaunator::triangulate(&delaunay_points);
        let num_triangles = triangulation.triangles.len() / 3;

        let tri_ids = |t: usize| -> [usize; 3] {
            [triangulation.triangles[3 * t], triangulation.triangles[3 * t + 1], triangulation.triangles[3 * t + 2]]
        };
        let tri_verts = |t: usize| -> [(f64, f64); 3] {
            let ids = tri_ids(t);
            [polygon_points[ids[0]], polygon_points[ids[1]], polygon_points[ids[2]]]
        };
        let tri_center = |t: usize| -> (f64, f64) {
            let v = tri_verts(t);
            ((v[0].0 + v[1].0 + v[2].0) / 3.0, (v[0].1 + v[1].1 + v[2].1) / 3.0)
        };

        let mut valid = vec![false; num_triangles];
        let mut finish_triangle_index = None;
        for t in 0..num_triangles {
            if finish_triangle_index.is_none() && point_in_triangle(finish_point, tri_verts(t)) {
                finish_triangle_index = Some(t);
            }
            let center = tri_center(t);
            valid[t] = cut_polygon.contains(&coord! { x: center.0, y: center.1 });
        }
        let finish_triangle_index = finish_triangle_index.ok_or(AnalyzerError::NoFinishTriangle)?;

        let mut adjacency: HashMap<usize, Vec<Edge>> = HashMap::new();
        for t in 0..num_triangles {
            if !valid[t] {
                continue;
            }
            for k in 0..3 {
                let e = 3 * t + k;
                let opp = triangulation.halfedges[e];
                if opp == delaunator::EMPTY {
                    continue;
                }
                let neighbor = opp / 3;
                if valid[neighbor] {
                    adjacency.entry(t).or_default().push(build_edge(neighbor, t, &tri_ids, &tri_center, &polygon_points));
                }
            }
        }

        let mut triangle_tree: HashMap<usize, Option<Edge>> = HashMap::new();
        triangle_tree.insert(finish_triangle_index, None);
        let mut visited = vec![false; num_triangles];
        let mut stack = vec![finish_triangle_index];
        while let Some(u) = stack.pop() {
            visited[u] = true;
            let Some(edges) = adjacency.get(&u) else { continue };
            for edge in edges {
                if visited[edge.start_triangle] {
                    continue;
                }
                triangle_tree.insert(edge.start_triangle, Some(*edge));
                stack.push(edge.start_triangle);
            }
        }

        let (minx, miny, maxx, maxy) = circuit.road().bounds();
        let mut point_to_triangle: HashMap<Cell, usize> = HashMap::new();
        for x in (minx.floor() as i64)..=(maxx.ceil() as i64) {
            for y in (miny.floor() as i64)..=(maxy.ceil() as i64) {
                let p = (x as f64, y as f64);
                for t in 0..num_triangles {
                    if valid[t] && point_in_triangle(p, tri_verts(t)) {
                        point_to_triangle.insert((x, y), t);
                        break;
                    }
                }
            }
        }

        let mut distances = HashMap::new();
        let mut max_distance = 0.0f64;
        for (point, &start_triangle) in &point_to_triangle {
            let start_f = (point.0 as f64, point.1 as f64);
            let d = find_distance(start_f, start_triangle, finish_point, &triangle_tree) + config::CUT_EXTRA_LENGTH;
            distances.insert(*point, d);
            max_distance = max_distance.max(d);
        }

        log_additional!(crate::verbose::EVENT_ANALYZER_BUILD, "distance map complete", reachable = distances.len(), max_distance = max_distance);

        Ok(Analyzer { circuit, distances, max_distance })
    }

    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    pub fn contains(&self, p: Cell) -> bool {
        self.distances.contains_key(&p)
    }

    pub fn distance(&self, p: Cell) -> Result<f64, AnalyzerError> {
        self.distances.get(&p).copied().ok_or(AnalyzerError::Unreachable(p))
    }

    pub fn max_distance(&self) -> f64 {
        self.max_distance
    }

    pub fn lap_length(&self) -> f64 {
        self.max_distance
    }

    /// Whether moving from `a` to `b` ends on the road and within the
    /// reachable area.
    pub fn on_road(&self, a: Cell, b: Cell) -> bool {
        self.contains(b) && self.circuit.segment_on_road(a, b)
    }

    /// The full `GetNextStates` logic: generates every state reachable from
    /// `current` (or race-start states when `current` is `None`), applying
    /// lap/round/status bookkeeping, with `remove` excluding destinations
    /// occupied by another player next round.
    pub fn next_states(&self, current: Option<State>, remove: &HashSet<Cell>) -> Result<Vec<State>, AnalyzerError> {
        let Some(current) = current else {
            let direction = self.circuit.starting_direction();
            let yaw = (direction.1 as f64).atan2(direction.0 as f64);
            let mut states = Vec::new();
            for &p in self.circuit.starting_points() {
                if remove.contains(&p) || !self.contains(p) {
                    continue;
                }
                states.push(State::new(p, yaw, 0.0, 1.0, 0, self.distance(p)?, Status::Running));
            }
            return Ok(states);
        };

        if current.status != Status::Running {
            return Ok(Vec::new());
        }

        // Second turn: the car is forced straight off the starting line.
        if (current.round - 1.0).abs() < f64::EPSILON {
            let direction = self.circuit.starting_direction();
            let p = (current.xy.0 + direction.0, current.xy.1 + direction.1);
            return Ok(vec![State::new(p, current.yaw, 1.0, 2.0, 0, self.distance(p)?, Status::Running)]);
        }

        let mut states = Vec::new();
        if current.speed == 0.0 {
            for &d in crate::circuit::directions_when_stopped() {
                let xy = (current.xy.0 + d.0, current.xy.1 + d.1);
                if remove.contains(&xy) {
                    continue;
                }
                let (dx, dy) = ((xy.0 - current.xy.0) as f64, (xy.1 - current.xy.1) as f64);
                let new_speed = (dx * dx + dy * dy).sqrt();
                let new_yaw = dy.atan2(dx);
                let mut new_status = if self.on_road(current.xy, xy) { Status::Running } else { Status::Crashed };
                let (dlap, dround) = self.circuit.crossing_line(current.xy, xy);
                let new_lap = current.lap + dlap;
                let (new_round, new_distance) = self.finalize(current, new_lap, dround, &mut new_status, xy)?;
                states.push(State::new(xy, new_yaw, new_speed, new_round, new_lap, new_distance, new_status));
            }
        } else {
            for candidate in self.circuit.candidate_points(current.xy, current.yaw, current.speed) {
                if remove.contains(&candidate.xy) {
                    continue;
                }
                let mut new_status = if self.on_road(current.xy, candidate.xy) { Status::Running } else { Status::Crashed };
                let new_lap = current.lap + candidate.dlap;
                let (new_round, new_distance) = self.finalize(current, new_lap, candidate.dround, &mut new_status, candidate.xy)?;
                states.push(State::new(candidate.xy, candidate.yaw, candidate.speed, new_round, new_lap, new_distance, new_status));
            }
        }
        Ok(states)
    }

    fn finalize(&self, current: State, new_lap: i64, dround: f64, new_status: &mut Status, xy: Cell) -> Result<(f64, f64), AnalyzerError> {
        if new_lap == self.circuit.laps() as i64 {
            let new_round = current.round + dround;
            if *new_status == Status::Running {
                *new_status = Status::Finished;
            }
            let new_distance = if *new_status == Status::Finished { 0.0 } else { current.distance_left };
            Ok((new_round, new_distance))
        } else {
            let new_round = current.round + 1.0;
            let new_distance = if *new_status == Status::Running { self.distance(xy)? } else { current.distance_left };
            Ok((new_round, new_distance))
        }
    }
}

fn ring_coords(ls: &LineString<f64>) -> Vec<(f64, f64)> {
    let mut v: Vec<(f64, f64)> = ls.coords().map(|c| (c.x, c.y)).collect();
    if v.len() > 1 && v.first() == v.last() {
        v.pop();
    }
    v
}

fn signed_area(coords: &[(f64, f64)]) -> f64 {
    let n = coords.len();
    let mut area = 0.0;
    for i in 0..n {
        let (x0, y0) = coords[i];
        let (x1, y1) = coords[(i + 1) % n];
        area += x0 * y1 - x1 * y0;
    }
    area / 2.0
}

/// Cuts a closed ring open at the point where `segment` crosses it,
/// offsetting the two new endpoints slightly apart (by `offset`, scaled by
/// [`config::CUT_OFFSET_FACTOR`]) so the resulting path has no duplicate
/// vertex, and reverses the path if the source ring was not
/// counter-clockwise.
fn cut_line_ring(coords: &[(f64, f64)], segment: ((f64, f64), (f64, f64)), offset: (f64, f64)) -> Result<Vec<(f64, f64)>, AnalyzerError> {
    let n = coords.len();
    let (start_xy, start_index) = find_ring_crossing(coords, segment).ok_or(AnalyzerError::MalformedStartingLine)?;

    let mut points = vec![start_xy];
    let mut factor: Option<f64> = None;
    for i in 0..n {
        let point = coords[(start_index + i) % n];
        if point == start_xy {
            continue;
        }
        if factor.is_none() {
            let dp = (point.0 - start_xy.0, point.1 - start_xy.1);
            factor = Some(if dp.0 * offset.0 + dp.1 * offset.1 > 0.0 { config::CUT_OFFSET_FACTOR } else { -config::CUT_OFFSET_FACTOR });
        }
        points.push(point);
    }
    let factor = factor.unwrap_or(config::CUT_OFFSET_FACTOR);
    points.push((start_xy.0 - 2.0 * factor * offset.0, start_xy.1 - 2.0 * factor * offset.1));
    points[0] = (start_xy.0 - factor * offset.0, start_xy.1 - factor * offset.1);

    if signed_area(coords) <= 0.0 {
        points.reverse();
    }
    Ok(points)
}

fn find_ring_crossing(coords: &[(f64, f64)], segment: ((f64, f64), (f64, f64))) -> Option<((f64, f64), usize)> {
    let n = coords.len();
    for i in 0..n {
        let pa = coords[i];
        let pb = coords[(i + 1) % n];
        if let Some(p) = crate::geom::segment_intersection(pa, pb, segment.0, segment.1) {
            return Some((p, (i + 1) % n));
        }
    }
    None
}

fn point_in_triangle(p: (f64, f64), tri: [(f64, f64); 3]) -> bool {
    let sign = |p1: (f64, f64), p2: (f64, f64), p3: (f64, f64)| (p1.0 - p3.0) * (p2.1 - p3.1) - (p2.0 - p3.0) * (p1.1 - p3.1);
    let d1 = sign(p, tri[0], tri[1]);
    let d2 = sign(p, tri[1], tri[2]);
    let d3 = sign(p, tri[2], tri[0]);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos) && d1 != 0.0 && d2 != 0.0 && d3 != 0.0
}

fn build_edge(
    start: usize,
    end: usize,
    tri_ids: &dyn Fn(usize) -> [usize; 3],
    tri_center: &dyn Fn(usize) -> (f64, f64),
    points: &[(f64, f64)],
) -> Edge {
    let start_ids: HashSet<usize> = tri_ids(start).into_iter().collect();
    let end_ids: HashSet<usize> = tri_ids(end).into_iter().collect();
    let mut common: Vec<usize> = start_ids.intersection(&end_ids).copied().collect();
    common.sort_unstable();
    let start_center = tri_center(start);
    let end_center = tri_center(end);
    let center_to_center = (end_center.0 - start_center.0, end_center.1 - start_center.1);
    let center_to_common = (points[common[0]].0 - start_center.0, points[common[0]].1 - start_center.1);
    let cross = center_to_center.0 * center_to_common.1 - center_to_center.1 * center_to_common.0;
    let gate = if cross > 0.0 {
        Gate { left: Vertex::with_id(common[0], points[common[0]]), right: Vertex::with_id(common[1], points[common[1]]) }
    } else {
        Gate { left: Vertex::with_id(common[1], points[common[1]]), right: Vertex::with_id(common[0], points[common[0]]) }
    };
    Edge { start_triangle: start, end_triangle: end, gate }
}

fn find_distance(start_point: (f64, f64), start_triangle: usize, finish_point: (f64, f64), tree: &HashMap<usize, Option<Edge>>) -> f64 {
    let funnel = Funnel::new(Vertex::free(start_point));
    let path = funnel.shortest_path(tree, start_triangle, Vertex::free(finish_point));
    let mut distance = 0.0;
    for w in path.windows(2) {
        let (a, b) = (w[0].xy, w[1].xy);
        distance += ((b.0 - a.0).powi(2) + (b.1 - a.1).powi(2)).sqrt();
    }
    distance
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::patatoid;

    fn build_patatoid_analyzer() -> Analyzer {
        let circuit = Circuit::build(&patatoid()).unwrap();
        Analyzer::build(circuit).unwrap()
    }

    #[test]
    fn starting_points_are_reachable() {
        let analyzer = build_patatoid_analyzer();
        for &p in analyzer.circuit().starting_points() {
            assert!(analyzer.contains(p), "starting point {:?} should be reachable", p);
        }
    }

    #[test]
    fn max_distance_is_positive() {
        let analyzer = build_patatoid_analyzer();
        assert!(analyzer.max_distance() > 0.0);
    }

    #[test]
    fn distance_decreases_towards_finish_along_a_lap() {
        let analyzer = build_patatoid_analyzer();
        // Points right after the start should be farther from the finish
        // than points already deep into the lap, for a simple loop circuit.
        let far = analyzer.distance(*analyzer.circuit().starting_points().iter().next().unwrap()).unwrap();
        assert!(far <= analyzer.max_distance() + 1e-6);
    }
}
