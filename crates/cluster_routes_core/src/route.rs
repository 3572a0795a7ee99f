use crate::{geometry::PathGeometry, point::Coord};

/// One group's visiting order and, for groups of two or more points, the open
/// polyline through them.
#[derive(Clone, Debug, PartialEq)]
pub struct GroupRoute {
    pub(crate) group: usize,
    pub(crate) point_ids: Vec<u64>,
    pub(crate) path: Option<Vec<Coord>>,
}

impl GroupRoute {
    pub fn group(&self) -> usize {
        self.group
    }

    /// Point ids in visiting order.
    pub fn point_ids(&self) -> &[u64] {
        &self.point_ids
    }

    /// `None` for a single-point group.
    pub fn path(&self) -> Option<&[Coord]> {
        self.path.as_deref()
    }

    /// `(point id, 1-based position)` in visiting order.
    pub fn visit_order(&self) -> impl Iterator<Item = (u64, usize)> + '_ {
        self.point_ids
            .iter()
            .enumerate()
            .map(|(idx, &id)| (id, idx + 1))
    }

    pub fn position_of(&self, id: u64) -> Option<usize> {
        self.point_ids.iter().position(|&p| p == id).map(|idx| idx + 1)
    }

    pub fn len(&self) -> usize {
        self.point_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.point_ids.is_empty()
    }

    /// Open path length; zero without a path.
    pub fn length(&self) -> f64 {
        self.path().map(PathGeometry::open_length).unwrap_or(0.0)
    }

    pub fn route_metrics(&self, spike_factor: f64) -> RouteMetrics {
        let Some(path) = self.path() else {
            log::debug!(
                "metrics: group={} n={} has no path so there's nothing to report",
                self.group,
                self.len()
            );
            return RouteMetrics::default();
        };

        let distances: Vec<f64> = PathGeometry::edge_lengths(path).collect();
        let total: f64 = distances.iter().sum();
        let average = total / (distances.len() as f64);
        let threshold = average * spike_factor;
        let spikes = distances.iter().filter(|d| **d > threshold).count();
        let longest = distances.iter().copied().fold(0.0_f64, f64::max);

        log::info!(
            "metrics: group={} n={} total={total:.0} longest={longest:.0} avg={average:.0} spike_threshold={threshold:.0} spikes={spikes}",
            self.group,
            self.len()
        );

        RouteMetrics {
            total,
            longest,
            average,
            threshold,
            spikes,
        }
    }
}

/// Open-path edge statistics. A spike is an edge longer than
/// `spike_factor` times the average edge.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RouteMetrics {
    pub total: f64,
    pub longest: f64,
    pub average: f64,
    pub threshold: f64,
    pub spikes: usize,
}

#[cfg(test)]
mod tests {
    use super::GroupRoute;
    use crate::point::Coord;

    fn line_route() -> GroupRoute {
        GroupRoute {
            group: 2,
            point_ids: vec![10, 30, 20, 40],
            path: Some(vec![
                Coord::new(0.0, 0.0),
                Coord::new(1.0, 0.0),
                Coord::new(2.0, 0.0),
                Coord::new(100.0, 0.0),
            ]),
        }
    }

    #[test]
    fn visit_order_is_one_based() {
        let route = line_route();
        let order: Vec<(u64, usize)> = route.visit_order().collect();
        assert_eq!(order, vec![(10, 1), (30, 2), (20, 3), (40, 4)]);
        assert_eq!(route.position_of(20), Some(3));
        assert_eq!(route.position_of(99), None);
    }

    #[test]
    fn metrics_use_open_edges_only() {
        let metrics = line_route().route_metrics(2.0);
        assert!((metrics.total - 100.0).abs() < 1e-12);
        assert!((line_route().length() - metrics.total).abs() < 1e-12);
        assert!((metrics.longest - 98.0).abs() < 1e-12);
        assert!((metrics.average - 100.0 / 3.0).abs() < 1e-12);
        assert_eq!(metrics.spikes, 1);
    }

    #[test]
    fn single_point_route_reports_zero_metrics() {
        let route = GroupRoute {
            group: 0,
            point_ids: vec![5],
            path: None,
        };
        let metrics = route.route_metrics(10.0);
        assert_eq!(metrics.total, 0.0);
        assert_eq!(metrics.spikes, 0);
        assert!(route.path().is_none());
    }
}
