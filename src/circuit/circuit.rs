//! The circuit's road geometry and turn-to-turn move generation.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::config;
use crate::geom::{self, Cell, Road};
use crate::{log_detailed, log_main};

use super::{CircuitData, CircuitError};

/// A candidate next position reachable from the current state, before the
/// lap/round/distance bookkeeping that requires the circuit analyzer.
#[derive(Debug, Clone, Copy)]
pub struct CandidatePoint {
    pub xy: Cell,
    pub yaw: f64,
    pub speed: f64,
    /// +1 if this move crosses the finish line forward, -1 backward, 0
    /// otherwise.
    pub dlap: i64,
    /// Fractional round increment contributed by a forward finish-line
    /// crossing (0 otherwise).
    pub dround: f64,
}

/// The four directions a stopped car may move in. Standing still is not an
/// option: a player always has to move.
const DIRECTIONS_WHEN_STOPPED: [Cell; 4] = [(-1, 0), (0, -1), (1, 0), (0, 1)];

/// Drivable road, starting line and the pure geometry of move generation.
///
/// A `Circuit` knows nothing about distance-to-finish: that requires the
/// triangulated shortest-path map built by [`crate::analyzer::Analyzer`],
/// which owns a `Circuit` rather than the other way around, so the two
/// types never form a reference cycle.
pub struct Circuit {
    name: String,
    maximum_speed: f64,
    grid_size: f64,
    num_laps: u32,
    origin: (f64, f64),
    starting_line: ((f64, f64), (f64, f64)),
    road: Road,
    starting_direction: Cell,
    starting_points: HashSet<Cell>,
    crossing_cache: Mutex<HashMap<(Cell, Cell), (i64, f64)>>,
    on_road_cache: Mutex<HashMap<(Cell, Cell), bool>>,
    next_points_cache: Mutex<HashMap<(Cell, u64, u64), Vec<CandidatePoint>>>,
}

impl Circuit {
    /// Builds a `Circuit` from parsed `.ckt` data.
    pub fn build(data: &CircuitData) -> Result<Self, CircuitError> {
        if data.num_laps > config::MAX_NUM_LAPS {
            return Err(CircuitError::TooManyLaps { requested: data.num_laps });
        }
        let origin = (data.starting_line[0] as f64, data.starting_line[1] as f64);
        let resize = 1.0 / data.grid_size;
        let scale = |x: i64, y: i64| ((x as f64 - origin.0) * resize, (y as f64 - origin.1) * resize);

        let sl_p0 = (0.0, 0.0);
        let sl_p1 = scale(data.starting_line[2], data.starting_line[3]);

        let outer = to_ring(&data.outer_border, origin, resize)?;
        let inner = to_ring(&data.inner_border, origin, resize)?;
        let road = Road::from_coords(&outer, &inner)?;

        let starting_direction = starting_direction_of(sl_p0, sl_p1);
        let starting_line_len = ((sl_p1.0 - sl_p0.0).powi(2) + (sl_p1.1 - sl_p0.1).powi(2)).sqrt();
        let perpendicular = (starting_direction.1, -starting_direction.0);
        let mut starting_points = HashSet::new();
        for i in 0..(starting_line_len as i64) {
            let p = (perpendicular.0 * i, perpendicular.1 * i);
            if road.contains_point((p.0 as f64, p.1 as f64)) {
                starting_points.insert(p);
            }
        }

        log_main!(crate::verbose::EVENT_CIRCUIT_BUILD, "circuit constructed", name = data.name.as_str(), starting_points = starting_points.len());

        Ok(Circuit {
            name: data.name.clone(),
            maximum_speed: data.maximum_speed,
            grid_size: data.grid_size,
            num_laps: data.num_laps,
            origin,
            starting_line: (sl_p0, sl_p1),
            road,
            starting_direction,
            starting_points,
            crossing_cache: Mutex::new(HashMap::new()),
            on_road_cache: Mutex::new(HashMap::new()),
            next_points_cache: Mutex::new(HashMap::new()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn laps(&self) -> u32 {
        self.num_laps
    }

    pub fn grid_size(&self) -> f64 {
        self.grid_size
    }

    pub fn maximum_speed(&self) -> f64 {
        self.maximum_speed
    }

    pub fn road(&self) -> &Road {
        &self.road
    }

    pub fn starting_direction(&self) -> Cell {
        self.starting_direction
    }

    /// The starting line's two endpoints, in circuit-local units.
    pub fn starting_line(&self) -> ((f64, f64), (f64, f64)) {
        self.starting_line
    }

    pub fn starting_points(&self) -> &HashSet<Cell> {
        &self.starting_points
    }

    pub fn is_starting_point(&self, p: Cell) -> bool {
        self.starting_points.contains(&p)
    }

    pub fn contains(&self, p: Cell) -> bool {
        self.road.contains_cell(p)
    }

    /// Whether the continuous segment `a -> b` stays on the drivable road,
    /// ignoring whether `b` itself is reachable (that also requires it to
    /// be inside the analyzer's distance map - see
    /// [`crate::analyzer::Analyzer::on_road`]).
    pub fn segment_on_road(&self, a: Cell, b: Cell) -> bool {
        let key = (a, b);
        if let Some(&v) = self.on_road_cache.lock().unwrap().get(&key) {
            return v;
        }
        let v = self.road.contains_segment((a.0 as f64, a.1 as f64), (b.0 as f64, b.1 as f64));
        self.on_road_cache.lock().unwrap().insert(key, v);
        v
    }

    /// Whether moving from `a` to `b` crosses the starting line, and in
    /// which direction: `(+1, fraction)` for a forward (finishing)
    /// crossing, `(-1, 0.0)` for a backward crossing, `(0, 0.0)` for none.
    /// Crossing excludes the starting point `a` itself.
    pub fn crossing_line(&self, a: Cell, b: Cell) -> (i64, f64) {
        let key = (a, b);
        if let Some(&v) = self.crossing_cache.lock().unwrap().get(&key) {
            return v;
        }
        let (p0, p1) = self.starting_line;
        let a_f = (a.0 as f64, a.1 as f64);
        let b_f = (b.0 as f64, b.1 as f64);
        let ret = match geom::segment_intersection(p0, p1, a_f, b_f) {
            None => (0, 0.0),
            Some(i) => {
                let v = (b_f.0 - a_f.0, b_f.1 - a_f.1);
                let dot = v.0 * self.starting_direction.0 as f64 + v.1 * self.starting_direction.1 as f64;
                if dot > 0.0 {
                    let d = ((i.0 - a_f.0).powi(2) + (i.1 - a_f.1).powi(2)).sqrt();
                    if d < 0.5 {
                        (0, 0.0)
                    } else {
                        let vlen = (v.0 * v.0 + v.1 * v.1).sqrt();
                        (1, d / vlen)
                    }
                } else {
                    // This hysteresis avoids double counting a crossing that
                    // lands exactly on the segment's end point.
                    let d = ((i.0 - b_f.0).powi(2) + (i.1 - b_f.1).powi(2)).sqrt();
                    if d < 0.5 { (0, 0.0) } else { (-1, 0.0) }
                }
            }
        };
        self.crossing_cache.lock().unwrap().insert(key, ret);
        ret
    }

    /// Candidate next positions reachable from a moving car (`speed > 0`),
    /// within the turn angle and acceleration bounds, before filtering by
    /// whether the destination is actually on the road.
    pub fn candidate_points(&self, xy: Cell, yaw: f64, speed: f64) -> Vec<CandidatePoint> {
        let key = (xy, yaw.to_bits(), speed.to_bits());
        if let Some(cached) = self.next_points_cache.lock().unwrap().get(&key) {
            return cached.clone();
        }
        let max_speed = self.maximum_speed.min(speed + config::PLUS_SPEED);
        let min_speed = 0.5f64.max(speed - config::MINUS_SPEED);
        let (minx, miny, maxx, maxy) = build_search_box(xy, yaw, min_speed, max_speed);
        let mut points = Vec::new();
        for x in minx..=maxx {
            for y in miny..=maxy {
                let candidate = (x, y);
                let d = (candidate.0 - xy.0) as f64;
                let dy = (candidate.1 - xy.1) as f64;
                let new_yaw = dy.atan2(d);
                let new_speed = (d * d + dy * dy).sqrt();
                let da = geom::normalize_angle(new_yaw - yaw);
                let within_turn = new_speed == 0.0 || (da <= config::TURN_ANGLE && da >= -config::TURN_ANGLE);
                if within_turn && new_speed <= max_speed && new_speed >= min_speed {
                    let (dlap, dround) = self.crossing_line(xy, candidate);
                    points.push(CandidatePoint { xy: candidate, yaw: new_yaw, speed: new_speed, dlap, dround });
                }
            }
        }
        log_detailed!(crate::verbose::EVENT_CIRCUIT_CANDIDATES, "computed candidate points", count = points.len());
        self.next_points_cache.lock().unwrap().insert(key, points.clone());
        points
    }

    /// Rescales states from circuit-local units back to the original
    /// `.ckt` file's coordinate system, for display to callers.
    pub fn scale_state(&self, s: super::State) -> super::State {
        let p = (s.xy.0 as f64 * self.grid_size + self.origin.0, s.xy.1 as f64 * self.grid_size + self.origin.1);
        super::State { xy: (p.0.round() as i64, p.1.round() as i64), ..s }
    }

    pub fn scale_cell(&self, c: Cell) -> (f64, f64) {
        (c.0 as f64 * self.grid_size + self.origin.0, c.1 as f64 * self.grid_size + self.origin.1)
    }
}

fn to_ring(flat: &[i64], origin: (f64, f64), resize: f64) -> Result<Vec<(f64, f64)>, CircuitError> {
    if flat.len() % 2 != 0 || flat.len() < 6 {
        return Err(CircuitError::InvalidStartingLine);
    }
    Ok(flat
        .chunks(2)
        .map(|c| ((c[0] as f64 - origin.0) * resize, (c[1] as f64 - origin.1) * resize))
        .collect())
}

/// The perpendicular-to-the-line direction a car faces at the start. The
/// sign of each axis is taken independently rather than via a single
/// rotation, so that axis-aligned starting lines produce an axis-aligned
/// direction.
fn starting_direction_of(p0: (f64, f64), p1: (f64, f64)) -> Cell {
    let dp = (p0.0 - p1.0, p0.1 - p1.1);
    let sign = |v: f64| if v > 0.0 { 1 } else if v < 0.0 { -1 } else { 0 };
    (sign(dp.1), -sign(dp.0))
}

fn build_search_box(xy: Cell, yaw: f64, min_speed: f64, max_speed: f64) -> (i64, i64, i64, i64) {
    let minx = min_speed;
    let maxx = max_speed;
    let maxy = config::TURN_ANGLE.sin() * maxx;
    let miny = -maxy;
    let corners = [(minx, miny), (minx, maxy), (maxx, miny), (maxx, maxy)];
    let (cos, sin) = (yaw.cos(), yaw.sin());
    // Truncate toward zero on the un-offset rotated corners, then add the
    // integer cell offset - truncating after adding the offset would shift
    // the box for negative fractional corners.
    let rotated: Vec<(i64, i64)> = corners.iter().map(|&(x, y)| ((x * cos - y * sin) as i64 + xy.0, (x * sin + y * cos) as i64 + xy.1)).collect();
    let minx = rotated.iter().map(|p| p.0).min().unwrap();
    let maxx = rotated.iter().map(|p| p.0).max().unwrap();
    let miny = rotated.iter().map(|p| p.1).min().unwrap();
    let maxy = rotated.iter().map(|p| p.1).max().unwrap();
    (minx, miny, maxx, maxy)
}

/// The four-neighbor moves a stopped car may take. It can never choose to
/// stay put.
pub fn directions_when_stopped() -> &'static [Cell; 4] {
    &DIRECTIONS_WHEN_STOPPED
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::format::patatoid;

    fn build_patatoid() -> Circuit {
        Circuit::build(&patatoid()).unwrap()
    }

    #[test]
    fn starting_direction_matches_horizontal_line() {
        let circuit = build_patatoid();
        // Patatoid's starting line runs along x, so the car faces +/-y.
        assert_eq!(circuit.starting_direction().0, 0);
    }

    #[test]
    fn has_at_least_one_starting_point() {
        let circuit = build_patatoid();
        assert!(!circuit.starting_points().is_empty());
    }

    #[test]
    fn stopped_car_has_four_directions() {
        assert_eq!(directions_when_stopped().len(), 4);
    }

    #[test]
    fn too_many_laps_is_rejected() {
        let mut data = patatoid();
        data.num_laps = config::MAX_NUM_LAPS + 1;
        assert!(matches!(Circuit::build(&data), Err(CircuitError::TooManyLaps { .. })));
    }

    #[test]
    fn candidate_points_respect_turn_angle() {
        let circuit = build_patatoid();
        let start = *circuit.starting_points().iter().next().unwrap();
        let candidates = circuit.candidate_points(start, 0.0, 1.0);
        assert!(!candidates.is_empty());
        for c in &candidates {
            let da = geom::normalize_angle(c.yaw - 0.0);
            assert!(da.abs() <= config::TURN_ANGLE + 1e-9);
        }
    }
}
