use std::{collections::HashMap, time::Instant};

use rayon::prelude::*;

use crate::{
    Error, Result,
    algo::{
        assign::{Assignment, assign},
        common::{validate_points, validate_unique_ids},
        nearest_neighbor,
    },
    options::PlannerOptions,
    point::Point,
    route::GroupRoute,
};

/// Where a point landed: its group and 1-based position within that group.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointVisit {
    pub point: Point,
    pub group: usize,
    pub order: usize,
}

/// Aggregated output of one planning run. Only built once every group has
/// been ordered; a failure in any group yields no plan at all.
#[derive(Clone, Debug)]
pub struct RoutePlan {
    assignment: Assignment,
    routes: Vec<GroupRoute>,
    visits: Vec<PointVisit>,
    by_id: HashMap<u64, usize>,
}

impl RoutePlan {
    pub fn assignment(&self) -> &Assignment {
        &self.assignment
    }

    /// One route per group, indexed by group id.
    pub fn routes(&self) -> &[GroupRoute] {
        &self.routes
    }

    pub fn route(&self, group: usize) -> Option<&GroupRoute> {
        self.routes.get(group)
    }

    /// One entry per input point, in input order.
    pub fn visits(&self) -> &[PointVisit] {
        &self.visits
    }

    pub fn visit_of(&self, id: u64) -> Option<&PointVisit> {
        self.by_id.get(&id).map(|&idx| &self.visits[idx])
    }

    pub fn group_count(&self) -> usize {
        self.routes.len()
    }

    /// Groups that produced a path, i.e. have at least two points.
    pub fn routes_generated(&self) -> usize {
        self.routes.iter().filter(|r| r.path().is_some()).count()
    }
}

/// Assigns groups, orders each group independently, then joins the visiting
/// positions back onto the input points.
pub fn plan_routes(points: &[Point], options: &PlannerOptions) -> Result<RoutePlan> {
    let now = Instant::now();
    validate_points(points)?;
    validate_unique_ids(points)?;

    let assignment = assign(points, options.max_per_group, &options.assign_options())?;
    let members = assignment.members();

    let order_group = |(group, idxs): (usize, &Vec<usize>)| -> Result<GroupRoute> {
        let group_points: Vec<Point> = idxs.iter().map(|&i| points[i]).collect();
        let started = Instant::now();
        let route = nearest_neighbor::order(group, &group_points)?;
        log::debug!(
            "group: done id={group} n={} secs={:.3}",
            idxs.len(),
            started.elapsed().as_secs_f32()
        );
        Ok(route)
    };

    let routes: Vec<GroupRoute> = if options.parallel {
        members
            .par_iter()
            .enumerate()
            .map(order_group)
            .collect::<Result<Vec<_>>>()?
    } else {
        members
            .iter()
            .enumerate()
            .map(order_group)
            .collect::<Result<Vec<_>>>()?
    };

    let mut positions: HashMap<u64, (usize, usize)> = HashMap::with_capacity(points.len());
    for route in &routes {
        for (id, order) in route.visit_order() {
            positions.insert(id, (route.group(), order));
        }
    }

    let visits = points
        .iter()
        .map(|&point| {
            let &(group, order) = positions.get(&point.id).ok_or_else(|| {
                Error::other(format!("point id {} was not routed", point.id))
            })?;
            Ok(PointVisit {
                point,
                group,
                order,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let by_id = visits
        .iter()
        .enumerate()
        .map(|(idx, v)| (v.point.id, idx))
        .collect();

    let plan = RoutePlan {
        assignment,
        routes,
        visits,
        by_id,
    };

    for route in plan.routes() {
        route.route_metrics(options.spike_factor);
    }

    log::info!(
        "planner: complete n={} groups={} routes={} secs={:.2}",
        points.len(),
        plan.group_count(),
        plan.routes_generated(),
        now.elapsed().as_secs_f32()
    );

    Ok(plan)
}
