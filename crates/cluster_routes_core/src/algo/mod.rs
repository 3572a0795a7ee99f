pub(crate) mod assign;
pub(crate) mod common;
pub(crate) mod kmeans;
pub(crate) mod nearest_neighbor;
pub(crate) mod planner;
