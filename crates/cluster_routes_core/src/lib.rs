//! Partition planar points into capped groups with seeded k-means, then order
//! each group with a greedy nearest-neighbor walk into an open route.

mod algo;
mod error;
mod geo;
mod io;
pub mod logging;
mod point;
mod route;

pub(crate) use algo::planner;
pub(crate) use geo::geometry;
pub(crate) use io::options;

pub use algo::assign::{AssignOptions, Assignment, assign, group_count};
pub use algo::nearest_neighbor::order;
pub use algo::planner::{PointVisit, RoutePlan, plan_routes};
pub use error::{Error, Result};
pub use io::input::{PlannerInput, parse_points};
pub use io::options::{LogFormat, LogLevel, PlannerOptions};
pub use io::output::{VISITS_HEADER, linestring_wkt, open_output, write_routes, write_visits};
pub use point::{Coord, Point};
pub use route::{GroupRoute, RouteMetrics};
