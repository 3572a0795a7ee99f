use std::collections::HashSet;

use crate::{Error, Result, point::Point};

pub(crate) const DEFAULT_SEED: u64 = 42;
pub(crate) const DEFAULT_N_INIT: usize = 10;
pub(crate) const DEFAULT_MAX_ITER: usize = 300;
pub(crate) const DEFAULT_TOLERANCE: f64 = 1e-4;

const ERR_INVALID_MAX_PER_GROUP: &str = "max_per_group must be >= 1";
const ERR_INVALID_N_INIT: &str = "n_init must be >= 1";
const ERR_INVALID_MAX_ITER: &str = "max_iter must be >= 1";
const ERR_INVALID_TOLERANCE: &str = "tolerance must be finite and >= 0";

pub(crate) fn validate_max_per_group(max_per_group: usize) -> Result<()> {
    if max_per_group == 0 {
        return Err(Error::invalid_configuration(ERR_INVALID_MAX_PER_GROUP));
    }
    Ok(())
}

pub(crate) fn validate_kmeans_tuning(n_init: usize, max_iter: usize, tolerance: f64) -> Result<()> {
    if n_init == 0 {
        return Err(Error::invalid_configuration(ERR_INVALID_N_INIT));
    }
    if max_iter == 0 {
        return Err(Error::invalid_configuration(ERR_INVALID_MAX_ITER));
    }
    if !tolerance.is_finite() || tolerance < 0.0 {
        return Err(Error::invalid_configuration(ERR_INVALID_TOLERANCE));
    }
    Ok(())
}

/// Non-empty, finite coordinates.
pub(crate) fn validate_points(points: &[Point]) -> Result<()> {
    if points.is_empty() {
        return Err(Error::EmptyInput);
    }
    if let Some(p) = points.iter().find(|p| !p.is_valid()) {
        return Err(Error::InvalidPoint {
            id: p.id,
            x: p.x,
            y: p.y,
        });
    }
    Ok(())
}

pub(crate) fn validate_unique_ids(points: &[Point]) -> Result<()> {
    let mut seen = HashSet::with_capacity(points.len());
    for p in points {
        if !seen.insert(p.id) {
            return Err(Error::invalid_input(format!("duplicate point id {}", p.id)));
        }
    }
    Ok(())
}
