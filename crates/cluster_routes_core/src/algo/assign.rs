use std::time::Instant;

use crate::{
    Result,
    algo::{
        common::{
            DEFAULT_MAX_ITER, DEFAULT_N_INIT, DEFAULT_SEED, DEFAULT_TOLERANCE,
            validate_kmeans_tuning, validate_max_per_group, validate_points,
        },
        kmeans::{Kmeans, KmeansConfig},
    },
    geometry::PathGeometry,
    point::{Coord, Point},
};

/// Tuning for the k-means partitioner. The seed is explicit so identical
/// inputs always reproduce identical groups.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AssignOptions {
    pub seed: u64,
    pub n_init: usize,
    pub max_iter: usize,
    pub tolerance: f64,
    pub parallel: bool,
}

impl Default for AssignOptions {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            n_init: DEFAULT_N_INIT,
            max_iter: DEFAULT_MAX_ITER,
            tolerance: DEFAULT_TOLERANCE,
            parallel: true,
        }
    }
}

/// Group id per input point, in input order. Ids are dense in `0..group_count`
/// and numbered by first appearance, so the first point is always in group 0.
#[derive(Clone, Debug, PartialEq)]
pub struct Assignment {
    groups: Vec<usize>,
    centroids: Vec<Coord>,
    group_count: usize,
    max_per_group: usize,
}

impl Assignment {
    pub fn groups(&self) -> &[usize] {
        &self.groups
    }

    pub fn group_of(&self, idx: usize) -> Option<usize> {
        self.groups.get(idx).copied()
    }

    pub fn group_count(&self) -> usize {
        self.group_count
    }

    /// Representative (mean) coordinate of each group, indexed by group id.
    pub fn centroids(&self) -> &[Coord] {
        &self.centroids
    }

    pub fn max_per_group(&self) -> usize {
        self.max_per_group
    }

    /// Input indices per group, each list in input order.
    pub fn members(&self) -> Vec<Vec<usize>> {
        let mut members = vec![Vec::new(); self.group_count];
        for (idx, &group) in self.groups.iter().enumerate() {
            members[group].push(idx);
        }
        members
    }

    pub fn group_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.group_count];
        for &group in &self.groups {
            sizes[group] += 1;
        }
        sizes
    }

    /// Groups whose size exceeds the cap. No rebalancing is attempted.
    pub fn oversized_groups(&self) -> Vec<usize> {
        self.group_sizes()
            .into_iter()
            .enumerate()
            .filter(|&(_, size)| size > self.max_per_group)
            .map(|(group, _)| group)
            .collect()
    }
}

/// `ceil(n / max_per_group)`, never less than one.
pub fn group_count(n: usize, max_per_group: usize) -> usize {
    n.div_ceil(max_per_group.max(1)).max(1)
}

/// Partitions `points` into `ceil(N / max_per_group)` spatially coherent groups.
///
/// The cap only determines the group count; skewed inputs may still produce a
/// group larger than `max_per_group` (see [`Assignment::oversized_groups`]).
pub fn assign(
    points: &[Point],
    max_per_group: usize,
    options: &AssignOptions,
) -> Result<Assignment> {
    validate_max_per_group(max_per_group)?;
    validate_kmeans_tuning(options.n_init, options.max_iter, options.tolerance)?;
    validate_points(points)?;

    let n = points.len();
    let k = group_count(n, max_per_group);

    if k == 1 {
        log::info!("assigner: bypass n={n} max_per_group={max_per_group} groups=1");
        let all: Vec<usize> = (0..n).collect();
        return Ok(Assignment {
            groups: vec![0; n],
            centroids: vec![PathGeometry::centroid_of_indices(points, &all)],
            group_count: 1,
            max_per_group,
        });
    }

    let now = Instant::now();
    let fit = Kmeans::new(
        points,
        KmeansConfig {
            k,
            n_init: options.n_init,
            max_iter: options.max_iter,
            tolerance: options.tolerance,
            seed: options.seed,
            parallel: options.parallel,
        },
    )
    .fit();

    log::info!(
        "assigner: partitioned n={n} groups={k} max_per_group={max_per_group} best_trial={} iterations={} inertia={:.3} secs={:.2}",
        fit.trial,
        fit.iterations,
        fit.inertia,
        now.elapsed().as_secs_f32()
    );

    let (groups, centroids) = relabel_by_first_appearance(&fit.labels, &fit.centroids);
    let assignment = Assignment {
        groups,
        centroids,
        group_count: k,
        max_per_group,
    };

    for group in assignment.oversized_groups() {
        log::warn!(
            "assigner: group={group} size={} exceeds max_per_group={max_per_group}",
            assignment.group_sizes()[group]
        );
    }

    Ok(assignment)
}

fn relabel_by_first_appearance(
    labels: &[usize],
    centroids: &[Coord],
) -> (Vec<usize>, Vec<Coord>) {
    let mut mapping = vec![usize::MAX; centroids.len()];
    let mut ordered = Vec::with_capacity(centroids.len());
    let groups = labels
        .iter()
        .map(|&label| {
            if mapping[label] == usize::MAX {
                mapping[label] = ordered.len();
                ordered.push(centroids[label]);
            }
            mapping[label]
        })
        .collect();
    (groups, ordered)
}
