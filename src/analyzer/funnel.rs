//! The funnel (string-pulling) algorithm: turns a corridor of triangles,
//! each pair separated by a shared "gate" edge, into the shortest path
//! that stays inside the corridor. See
//! <https://skatgame.net/mburo/ps/thesis_demyen_2006.pdf>.
//!
//! The case analysis below is already the minimal form of the algorithm;
//! re-deriving it risks subtly breaking the geometry.

use std::collections::VecDeque;

const EPSILON: f64 = 1e-5;

/// A vertex of the funnel. Gate endpoints are identified by the index of
/// the triangulation point they came from; the path's start and goal are
/// free-floating points with no such identity.
#[derive(Debug, Clone, Copy)]
pub struct Vertex {
    pub id: Option<usize>,
    pub xy: (f64, f64),
}

impl Vertex {
    pub fn with_id(id: usize, xy: (f64, f64)) -> Self {
        Vertex { id: Some(id), xy }
    }

    pub fn free(xy: (f64, f64)) -> Self {
        Vertex { id: None, xy }
    }
}

impl PartialEq for Vertex {
    fn eq(&self, other: &Self) -> bool {
        if self.id.is_none() && other.id.is_none() {
            self.xy == other.xy
        } else {
            self.id == other.id
        }
    }
}

/// The two triangulation points that separate one triangle from its
/// neighbor on the path to the finish, ordered left/right as seen from
/// the triangle closer to the start.
#[derive(Debug, Clone, Copy)]
pub struct Gate {
    pub left: Vertex,
    pub right: Vertex,
}

/// A step in the corridor from one triangle towards the finish triangle.
#[derive(Debug, Clone, Copy)]
pub struct Edge {
    pub start_triangle: usize,
    pub end_triangle: usize,
    pub gate: Gate,
}

#[derive(PartialEq, Eq, Clone, Copy)]
enum Orientation {
    Collinear,
    Clockwise,
    CounterClockwise,
}

fn orientation(segment: (Vertex, Vertex), point: Vertex) -> Orientation {
    let area = (segment.0.xy.0 - point.xy.0) * (segment.1.xy.1 - point.xy.1)
        - (segment.0.xy.1 - point.xy.1) * (segment.1.xy.0 - point.xy.0);
    if area < -EPSILON {
        Orientation::Clockwise
    } else if area > EPSILON {
        Orientation::CounterClockwise
    } else {
        Orientation::Collinear
    }
}

/// Pulls a taut path through a corridor of gates, from `start` to the
/// triangle containing the goal.
pub struct Funnel {
    left_funnel: VecDeque<Vertex>,
    right_funnel: VecDeque<Vertex>,
    shortest_path: Vec<Vertex>,
}

impl Funnel {
    pub fn new(start: Vertex) -> Self {
        Funnel {
            left_funnel: VecDeque::from([start]),
            right_funnel: VecDeque::from([start]),
            shortest_path: Vec::new(),
        }
    }

    /// Walks the corridor described by `tree` (triangle index -> the edge
    /// leading one step closer to the finish triangle, `None` at the
    /// finish triangle itself) starting from `start_triangle`, then pulls
    /// the path taut to `goal`.
    pub fn shortest_path(mut self, tree: &std::collections::HashMap<usize, Option<Edge>>, start_triangle: usize, goal: Vertex) -> Vec<Vertex> {
        let mut current = start_triangle;
        while let Some(Some(edge)) = tree.get(&current) {
            self.add_gate(edge.gate);
            current = edge.end_triangle;
        }
        self.add_point(goal);
        self.shortest_path
    }

    fn add_gate(&mut self, gate: Gate) {
        let diag_left = gate.left;
        let diag_right = gate.right;

        if self.left_funnel.len() == 1 && self.right_funnel.len() == 1 {
            self.left_funnel.push_back(diag_left);
            self.right_funnel.push_back(diag_right);
            return;
        }
        if self.left_funnel.len() + self.right_funnel.len() == 3 {
            if self.left_funnel.len() == 2 {
                if *self.left_funnel.back().unwrap() == diag_left {
                    self.check_funnel(false, diag_right);
                    return;
                }
                if *self.left_funnel.back().unwrap() == diag_right {
                    self.check_funnel(false, diag_left);
                    return;
                }
                if *self.left_funnel.front().unwrap() == diag_left {
                    self.left_funnel.pop_back();
                    self.left_funnel.push_back(diag_right);
                    return;
                }
                if *self.left_funnel.front().unwrap() == diag_right {
                    self.left_funnel.pop_back();
                    self.left_funnel.push_back(diag_left);
                    return;
                }
            } else {
                if *self.left_funnel.front().unwrap() == diag_left {
                    self.right_funnel.clear();
                    self.right_funnel.push_back(*self.left_funnel.front().unwrap());
                    self.right_funnel.push_back(diag_right);
                    return;
                }
                if *self.left_funnel.front().unwrap() == diag_right {
                    self.right_funnel.clear();
                    self.right_funnel.push_back(*self.left_funnel.front().unwrap());
                    self.right_funnel.push_back(diag_left);
                    return;
                }
            }
            if self.right_funnel.len() == 2 {
                if *self.right_funnel.back().unwrap() == diag_left {
                    self.check_funnel(true, diag_right);
                    return;
                }
                if *self.right_funnel.back().unwrap() == diag_right {
                    self.check_funnel(true, diag_left);
                    return;
                }
                if *self.right_funnel.front().unwrap() == diag_left {
                    self.right_funnel.pop_back();
                    self.right_funnel.push_back(diag_right);
                    return;
                }
                if *self.right_funnel.front().unwrap() == diag_right {
                    self.right_funnel.pop_back();
                    self.right_funnel.push_back(diag_left);
                    return;
                }
            } else {
                if *self.right_funnel.front().unwrap() == diag_left {
                    self.left_funnel.clear();
                    self.left_funnel.push_back(*self.right_funnel.front().unwrap());
                    self.left_funnel.push_back(diag_right);
                    return;
                }
                if *self.right_funnel.front().unwrap() == diag_right {
                    self.left_funnel.clear();
                    self.left_funnel.push_back(*self.right_funnel.front().unwrap());
                    self.left_funnel.push_back(diag_left);
                    return;
                }
            }
        }
        if *self.left_funnel.back().unwrap() == diag_left {
            self.check_funnel(false, diag_right);
            return;
        }
        if *self.left_funnel.back().unwrap() == diag_right {
            self.check_funnel(false, diag_left);
            return;
        }
        if *self.right_funnel.back().unwrap() == diag_left {
            self.check_funnel(true, diag_right);
            return;
        }
        self.check_funnel(true, diag_left);
    }

    fn add_point(&mut self, target: Vertex) {
        self.check_funnel(true, target);
        while let Some(v) = self.left_funnel.pop_front() {
            self.shortest_path.push(v);
        }
    }

    fn check_funnel(&mut self, left_funnel_first: bool, added_point: Vertex) {
        let (mut first_funnel, mut second_funnel) = if left_funnel_first {
            (std::mem::take(&mut self.left_funnel), std::mem::take(&mut self.right_funnel))
        } else {
            (std::mem::take(&mut self.right_funnel), std::mem::take(&mut self.left_funnel))
        };

        let restore = |s: &mut Self, first_funnel: VecDeque<Vertex>, second_funnel: VecDeque<Vertex>, left_first: bool| {
            if left_first {
                s.left_funnel = first_funnel;
                s.right_funnel = second_funnel;
            } else {
                s.right_funnel = first_funnel;
                s.left_funnel = second_funnel;
            }
        };

        if first_funnel.len() + second_funnel.len() <= 3 {
            if first_funnel.len() == 1 {
                first_funnel.push_back(added_point);
            } else {
                first_funnel.pop_back();
                first_funnel.push_back(added_point);
            }
            restore(self, first_funnel, second_funnel, left_funnel_first);
            return;
        }

        let mut sweep_line = (added_point, *first_funnel.back().unwrap());
        let mut temp_point = *first_funnel.back().unwrap();
        first_funnel.pop_back();
        let after = *first_funnel.back().unwrap();
        if left_funnel_first {
            if matches!(orientation(sweep_line, after), Orientation::Clockwise | Orientation::Collinear) {
                self.left_funnel = first_funnel;
                self.right_funnel = second_funnel;
                self.left_funnel.push_back(temp_point);
                self.left_funnel.push_back(added_point);
                return;
            }
        } else if matches!(orientation(sweep_line, after), Orientation::CounterClockwise | Orientation::Collinear) {
            self.right_funnel = first_funnel;
            self.left_funnel = second_funnel;
            self.right_funnel.push_back(temp_point);
            self.right_funnel.push_back(added_point);
            return;
        }
        first_funnel.push_back(temp_point);

        while first_funnel.len() > 1 {
            if first_funnel.len() == 2 {
                sweep_line = (added_point, *first_funnel.front().unwrap());
                temp_point = *first_funnel.front().unwrap();
                first_funnel.pop_front();
                let before = *first_funnel.front().unwrap();
                let second_temp_point = *second_funnel.front().unwrap();
                second_funnel.pop_front();
                if orientation(sweep_line, before) != orientation(sweep_line, *second_funnel.front().unwrap()) {
                    first_funnel.pop_back();
                    first_funnel.push_back(added_point);
                    first_funnel.push_front(temp_point);
                    second_funnel.push_front(second_temp_point);
                    restore(self, first_funnel, second_funnel, left_funnel_first);
                    return;
                }
                first_funnel.push_front(temp_point);
                second_funnel.push_front(second_temp_point);
                first_funnel.clear();
                break;
            }
            let before = *first_funnel.back().unwrap();
            first_funnel.pop_back();
            sweep_line = (added_point, *first_funnel.back().unwrap());
            temp_point = *first_funnel.back().unwrap();
            first_funnel.pop_back();
            let after = *first_funnel.back().unwrap();
            if orientation(sweep_line, before) == orientation(sweep_line, after) {
                first_funnel.push_back(temp_point);
                first_funnel.push_back(added_point);
                restore(self, first_funnel, second_funnel, left_funnel_first);
                return;
            }
            if orientation(sweep_line, after) == Orientation::Collinear {
                first_funnel.push_back(temp_point);
                first_funnel.push_back(added_point);
                restore(self, first_funnel, second_funnel, left_funnel_first);
                return;
            }
            first_funnel.push_back(temp_point);
        }

        while second_funnel.len() > 1 {
            let before = *second_funnel.front().unwrap();
            second_funnel.pop_front();
            sweep_line = (added_point, *second_funnel.front().unwrap());
            if second_funnel.len() == 1 {
                self.shortest_path.push(before);
                first_funnel.push_back(*second_funnel.front().unwrap());
                first_funnel.push_back(added_point);
                restore(self, first_funnel, second_funnel, left_funnel_first);
                return;
            }
            let temp_point = *second_funnel.front().unwrap();
            second_funnel.pop_front();
            let after = *second_funnel.front().unwrap();
            if orientation(sweep_line, before) == orientation(sweep_line, after) {
                self.shortest_path.push(before);
                second_funnel.push_front(temp_point);
                first_funnel.push_back(temp_point);
                first_funnel.push_back(added_point);
                restore(self, first_funnel, second_funnel, left_funnel_first);
                return;
            }
            self.shortest_path.push(before);
            second_funnel.push_front(temp_point);
        }
        restore(self, first_funnel, second_funnel, left_funnel_first);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn straight_corridor_collapses_to_two_points() {
        // Two triangles sharing one gate, start and goal collinear with it.
        let gate = Gate { left: Vertex::with_id(0, (0.0, 1.0)), right: Vertex::with_id(1, (0.0, -1.0)) };
        let mut tree = HashMap::new();
        tree.insert(1usize, None);
        tree.insert(0usize, Some(Edge { start_triangle: 0, end_triangle: 1, gate }));

        let start = Vertex::free((-5.0, 0.0));
        let goal = Vertex::free((5.0, 0.0));
        let funnel = Funnel::new(start);
        let path = funnel.shortest_path(&tree, 0, goal);
        assert_eq!(path.first().unwrap().xy, start.xy);
        assert_eq!(path.last().unwrap().xy, goal.xy);
    }
}
