use std::collections::HashSet;

use cluster_routes_core::{AssignOptions, PlannerOptions, Point, assign, order, plan_routes};
use proptest::prelude::*;

fn points_strategy(max_len: usize) -> impl Strategy<Value = Vec<Point>> {
    prop::collection::vec((-1_000.0f64..1_000.0, -1_000.0f64..1_000.0), 1..max_len).prop_map(
        |coords| {
            coords
                .into_iter()
                .enumerate()
                .map(|(idx, (x, y))| Point::new(idx as u64 * 3 + 1, x, y))
                .collect()
        },
    )
}

fn fast_options(max_per_group: usize) -> PlannerOptions {
    PlannerOptions {
        max_per_group,
        n_init: 3,
        max_iter: 50,
        ..PlannerOptions::default()
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_group_count_is_ceiling(points in points_strategy(60), cap in 1usize..20) {
        let assignment = assign(&points, cap, &AssignOptions { n_init: 2, ..AssignOptions::default() }).unwrap();
        let expected = points.len().div_ceil(cap);

        prop_assert_eq!(assignment.group_count(), expected);
        let sizes = assignment.group_sizes();
        prop_assert!(sizes.iter().all(|&s| s > 0));
        prop_assert_eq!(sizes.iter().sum::<usize>(), points.len());
    }

    #[test]
    fn prop_cap_at_least_n_is_one_group(points in points_strategy(40), extra in 0usize..10) {
        let assignment = assign(&points, points.len() + extra, &AssignOptions::default()).unwrap();
        prop_assert_eq!(assignment.group_count(), 1);
        prop_assert!(assignment.groups().iter().all(|&g| g == 0));
    }

    #[test]
    fn prop_plan_partitions_and_orders_bijectively(points in points_strategy(80), cap in 1usize..25) {
        let plan = plan_routes(&points, &fast_options(cap)).unwrap();

        let mut seen = HashSet::new();
        for route in plan.routes() {
            let mut positions: Vec<usize> = route.visit_order().map(|(_, pos)| pos).collect();
            positions.sort_unstable();
            prop_assert_eq!(positions, (1..=route.len()).collect::<Vec<_>>());

            for &id in route.point_ids() {
                prop_assert!(seen.insert(id), "point {} routed twice", id);
            }

            match route.path() {
                None => prop_assert_eq!(route.len(), 1),
                Some(path) => {
                    prop_assert_eq!(path.len(), route.len());
                    for (coord, id) in path.iter().zip(route.point_ids()) {
                        let visit = plan.visit_of(*id).unwrap();
                        prop_assert_eq!(*coord, visit.point.coord());
                    }
                }
            }
        }
        prop_assert_eq!(seen.len(), points.len());
        prop_assert_eq!(plan.visits().len(), points.len());
    }

    #[test]
    fn prop_order_is_deterministic_and_greedy(points in points_strategy(40)) {
        let a = order(0, &points).unwrap();
        let b = order(0, &points).unwrap();
        prop_assert_eq!(&a, &b);
        prop_assert_eq!(a.point_ids()[0], points[0].id);

        let Some(path) = a.path() else {
            prop_assert_eq!(points.len(), 1);
            return Ok(());
        };
        for step in 1..path.len() {
            let chosen = path[step - 1].dist(&path[step]);
            for later in &path[step..] {
                prop_assert!(chosen <= path[step - 1].dist(later) + 1e-9);
            }
        }
    }

    #[test]
    fn prop_same_seed_same_plan(points in points_strategy(50), cap in 2usize..12, seed in any::<u64>()) {
        let options = PlannerOptions { seed, ..fast_options(cap) };
        let a = plan_routes(&points, &options).unwrap();
        let b = plan_routes(&points, &options).unwrap();
        prop_assert_eq!(a.visits(), b.visits());
    }
}

#[test]
fn line_scenario_visits_a_c_b_d() {
    let points = vec![
        Point::new(1, 0.0, 0.0),
        Point::new(2, 10.0, 0.0),
        Point::new(3, 1.0, 0.0),
        Point::new(4, 20.0, 0.0),
    ];
    let plan = plan_routes(&points, &fast_options(4)).unwrap();

    assert_eq!(plan.group_count(), 1);
    let route = plan.route(0).unwrap();
    assert_eq!(route.point_ids(), &[1, 3, 2, 4]);
    assert!((route.length() - 20.0).abs() < 1e-12);
}

#[test]
fn nine_points_cap_four_gives_three_groups() {
    let points: Vec<Point> = (0..9)
        .map(|i| Point::new(i, (i * 17 % 9) as f64, (i * 5 % 7) as f64))
        .collect();
    let plan = plan_routes(&points, &fast_options(4)).unwrap();

    assert_eq!(plan.group_count(), 3);
    let total: usize = plan.routes().iter().map(|r| r.len()).sum();
    assert_eq!(total, 9);
}
