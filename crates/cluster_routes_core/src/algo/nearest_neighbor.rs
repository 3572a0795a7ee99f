//! Greedy nearest-neighbor ordering of a single group.
//!
//! The walk starts at the first point in input order and always moves to the
//! closest unvisited point. Ties go to the candidate that appears first in the
//! group's input order, which keeps the result reproducible. Each step scans
//! every remaining point, so a group of `m` points costs `O(m²)`.

use crate::{
    Result,
    algo::common::validate_points,
    point::{Coord, Point},
    route::GroupRoute,
};

enum WalkState {
    Unvisited,
    Walking { current: usize },
    Done,
}

struct NearestNeighborWalk<'a> {
    points: &'a [Point],
    // Kept in input order so `Vec::remove` preserves first-occurrence tie breaks.
    remaining: Vec<usize>,
    sequence: Vec<usize>,
    state: WalkState,
}

impl<'a> NearestNeighborWalk<'a> {
    fn new(points: &'a [Point]) -> Self {
        Self {
            points,
            remaining: (0..points.len()).collect(),
            sequence: Vec::with_capacity(points.len()),
            state: WalkState::Unvisited,
        }
    }

    fn step(&mut self) {
        self.state = match self.state {
            WalkState::Unvisited => self.visit(0),
            WalkState::Walking { current } => {
                let from = self.points[current];
                let mut best = 0;
                let mut best_dist = f64::INFINITY;
                for (pos, &idx) in self.remaining.iter().enumerate() {
                    let d = from.dist(&self.points[idx]);
                    if d < best_dist {
                        best_dist = d;
                        best = pos;
                    }
                }
                self.visit(best)
            }
            WalkState::Done => WalkState::Done,
        };
    }

    fn visit(&mut self, remaining_pos: usize) -> WalkState {
        let idx = self.remaining.remove(remaining_pos);
        self.sequence.push(idx);
        if self.remaining.is_empty() {
            WalkState::Done
        } else {
            WalkState::Walking { current: idx }
        }
    }

    fn run(mut self) -> Vec<usize> {
        while !matches!(self.state, WalkState::Done) {
            self.step();
        }
        self.sequence
    }
}

/// Local indices of `group_points` in visiting order.
pub(crate) fn walk_sequence(group_points: &[Point]) -> Vec<usize> {
    NearestNeighborWalk::new(group_points).run()
}

/// Orders one group. A single point gets position 1 and no path; anything
/// larger yields an open polyline with one coordinate per point.
pub fn order(group: usize, group_points: &[Point]) -> Result<GroupRoute> {
    validate_points(group_points)?;

    if group_points.len() == 1 {
        return Ok(GroupRoute {
            group,
            point_ids: vec![group_points[0].id],
            path: None,
        });
    }

    let sequence = walk_sequence(group_points);
    let point_ids = sequence.iter().map(|&i| group_points[i].id).collect();
    let path: Vec<Coord> = sequence.iter().map(|&i| group_points[i].coord()).collect();

    log::debug!("route: ordered group={group} n={}", group_points.len());

    Ok(GroupRoute {
        group,
        point_ids,
        path: Some(path),
    })
}

#[cfg(test)]
mod tests {
    use super::{order, walk_sequence};
    use crate::{Error, point::Point};

    fn line() -> Vec<Point> {
        vec![
            Point::new(0, 0.0, 0.0),
            Point::new(1, 10.0, 0.0),
            Point::new(2, 1.0, 0.0),
            Point::new(3, 20.0, 0.0),
        ]
    }

    #[test]
    fn walks_a_then_c_then_b_then_d() {
        let route = order(0, &line()).expect("order");
        assert_eq!(route.point_ids(), &[0, 2, 1, 3]);

        let path = route.path().expect("path");
        let xs: Vec<f64> = path.iter().map(|c| c.x).collect();
        assert_eq!(xs, vec![0.0, 1.0, 10.0, 20.0]);
    }

    #[test]
    fn starts_at_first_input_point_not_an_extreme_one() {
        let points = vec![
            Point::new(7, 5.0, 0.0),
            Point::new(8, 0.0, 0.0),
            Point::new(9, 10.0, 0.0),
        ];
        let route = order(3, &points).expect("order");
        assert_eq!(route.point_ids()[0], 7);
        assert_eq!(route.group(), 3);
    }

    #[test]
    fn ties_go_to_first_occurrence() {
        let points = vec![
            Point::new(0, 0.0, 0.0),
            Point::new(1, -1.0, 0.0),
            Point::new(2, 1.0, 0.0),
            Point::new(3, 0.0, 1.0),
        ];
        assert_eq!(walk_sequence(&points), vec![0, 1, 3, 2]);
    }

    #[test]
    fn duplicate_coordinates_keep_input_order() {
        let points = vec![
            Point::new(0, 0.0, 0.0),
            Point::new(1, 2.0, 2.0),
            Point::new(2, 2.0, 2.0),
            Point::new(3, 2.0, 2.0),
        ];
        assert_eq!(walk_sequence(&points), vec![0, 1, 2, 3]);
    }

    #[test]
    fn single_point_has_position_one_and_no_path() {
        let route = order(4, &[Point::new(42, 1.0, 2.0)]).expect("order");
        assert_eq!(route.visit_order().collect::<Vec<_>>(), vec![(42, 1)]);
        assert!(route.path().is_none());
    }

    #[test]
    fn two_points_produce_a_two_vertex_path() {
        let points = vec![Point::new(0, 0.0, 0.0), Point::new(1, 3.0, 4.0)];
        let route = order(0, &points).expect("order");
        assert_eq!(route.path().map(|p| p.len()), Some(2));
    }

    #[test]
    fn ordering_is_deterministic_and_leaves_input_untouched() {
        let points: Vec<Point> = (0..50)
            .map(|i| Point::new(i, ((i * 31) % 17) as f64, ((i * 7) % 13) as f64))
            .collect();
        let before = points.clone();

        let a = order(0, &points).expect("order");
        let b = order(0, &points).expect("order");

        assert_eq!(a, b);
        assert_eq!(points, before);
    }

    #[test]
    fn each_step_picks_a_closest_remaining_point() {
        let points: Vec<Point> = (0..40)
            .map(|i| Point::new(i, ((i * 53) % 41) as f64, ((i * 29) % 37) as f64))
            .collect();
        let sequence = walk_sequence(&points);

        for step in 1..sequence.len() {
            let current = points[sequence[step - 1]];
            let chosen = current.dist(&points[sequence[step]]);
            for &other in &sequence[step..] {
                assert!(chosen <= current.dist(&points[other]) + 1e-9);
            }
        }
    }

    #[test]
    fn empty_group_is_rejected() {
        let err = order(1, &[]).expect_err("must fail");
        assert!(matches!(err, Error::EmptyInput));
    }

    #[test]
    fn non_finite_point_aborts_the_group() {
        let points = vec![Point::new(0, 0.0, 0.0), Point::new(1, 0.0, f64::NAN)];
        let err = order(0, &points).expect_err("must fail");
        assert!(matches!(err, Error::InvalidPoint { id: 1, .. }));
    }
}
