//! Lloyd's k-means over planar points with k-means++ seeding.
//!
//! Every trial draws its own seed from a base `StdRng`, so a fixed base seed
//! reproduces the same labels regardless of how rayon schedules the trials.

use kiddo::{ImmutableKdTree, SquaredEuclidean};
use rand::{Rng, SeedableRng, rngs::StdRng};
use rayon::prelude::*;

use crate::{
    geometry::PathGeometry,
    point::{Coord, Point},
};

const UNASSIGNED: usize = usize::MAX;
// Below this a linear scan beats building a tree every iteration.
const KDTREE_MIN_CENTROIDS: usize = 32;

#[derive(Clone, Copy, Debug)]
pub(crate) struct KmeansConfig {
    pub(crate) k: usize,
    pub(crate) n_init: usize,
    pub(crate) max_iter: usize,
    pub(crate) tolerance: f64,
    pub(crate) seed: u64,
    pub(crate) parallel: bool,
}

#[derive(Clone, Debug)]
pub(crate) struct KmeansFit {
    pub(crate) labels: Vec<usize>,
    pub(crate) centroids: Vec<Coord>,
    pub(crate) inertia: f64,
    pub(crate) iterations: usize,
    pub(crate) trial: usize,
}

pub(crate) struct Kmeans<'a> {
    points: &'a [Point],
    config: KmeansConfig,
    shift_tolerance: f64,
}

impl<'a> Kmeans<'a> {
    /// Caller guarantees `2 <= k <= points.len()` and finite coordinates.
    pub(crate) fn new(points: &'a [Point], config: KmeansConfig) -> Self {
        let shift_tolerance = config.tolerance * PathGeometry::mean_variance(points);
        Self {
            points,
            config,
            shift_tolerance,
        }
    }

    pub(crate) fn fit(&self) -> KmeansFit {
        let seeds = generate_seeds(self.config.seed, self.config.n_init);

        let fits: Vec<KmeansFit> = if self.config.parallel {
            seeds
                .into_par_iter()
                .enumerate()
                .map(|(trial, seed)| self.run_trial(trial, seed))
                .collect()
        } else {
            seeds
                .into_iter()
                .enumerate()
                .map(|(trial, seed)| self.run_trial(trial, seed))
                .collect()
        };

        for fit in &fits {
            log::debug!(
                "kmeans.trial: id={} k={} iterations={} inertia={:.3}",
                fit.trial,
                self.config.k,
                fit.iterations,
                fit.inertia
            );
        }

        // Trials arrive in index order, so the earliest trial wins ties.
        fits.into_iter()
            .reduce(|best, next| {
                if next.inertia < best.inertia {
                    next
                } else {
                    best
                }
            })
            .unwrap_or_else(|| self.run_trial(0, self.config.seed))
    }

    fn run_trial(&self, trial: usize, seed: u64) -> KmeansFit {
        let k = self.config.k;
        let mut rng = StdRng::seed_from_u64(seed);
        let mut centroids = self.plus_plus_init(&mut rng);
        let mut labels = vec![UNASSIGNED; self.points.len()];
        let mut iterations = 0;

        for iter in 0..self.config.max_iter {
            iterations = iter + 1;
            if !self.assign_labels(&centroids, &mut labels) {
                break;
            }
            self.fill_empty_clusters(&centroids, &mut labels);

            let next = self.recompute_centroids(&labels);
            let shift: f64 = centroids
                .iter()
                .zip(next.iter())
                .map(|(a, b)| a.dist_sq(b))
                .sum();
            centroids = next;

            if shift <= self.shift_tolerance {
                self.assign_labels(&centroids, &mut labels);
                break;
            }
        }

        self.fill_empty_clusters(&centroids, &mut labels);
        let centroids = self.recompute_centroids(&labels);
        let inertia = self.inertia(&centroids, &labels);

        debug_assert_eq!(centroids.len(), k);
        KmeansFit {
            labels,
            centroids,
            inertia,
            iterations,
            trial,
        }
    }

    /// D²-weighted sampling of initial centers.
    fn plus_plus_init(&self, rng: &mut StdRng) -> Vec<Coord> {
        let n = self.points.len();
        let k = self.config.k;
        let mut centroids = Vec::with_capacity(k);
        centroids.push(self.points[rng.random_range(0..n)].coord());

        let mut closest: Vec<f64> = self
            .points
            .iter()
            .map(|p| p.coord().dist_sq(&centroids[0]))
            .collect();

        while centroids.len() < k {
            let total: f64 = closest.iter().sum();
            let pick = if total > 0.0 {
                let target = rng.random::<f64>() * total;
                let mut acc = 0.0;
                closest
                    .iter()
                    .position(|d| {
                        acc += d;
                        acc > target
                    })
                    .unwrap_or(n - 1)
            } else {
                // Every remaining point sits on a center already.
                rng.random_range(0..n)
            };

            let center = self.points[pick].coord();
            for (d, p) in closest.iter_mut().zip(self.points) {
                *d = d.min(p.coord().dist_sq(&center));
            }
            centroids.push(center);
        }

        centroids
    }

    /// Returns whether any label changed.
    fn assign_labels(&self, centroids: &[Coord], labels: &mut [usize]) -> bool {
        let nearest: Vec<usize> = if centroids.len() <= KDTREE_MIN_CENTROIDS {
            self.points
                .iter()
                .map(|p| nearest_centroid_scan(centroids, &p.coord()))
                .collect()
        } else {
            let entries: Vec<[f64; 2]> = centroids.iter().map(Coord::as_array).collect();
            let tree: ImmutableKdTree<f64, 2> = ImmutableKdTree::new_from_slice(&entries);
            self.points
                .iter()
                .map(|p| tree.nearest_one::<SquaredEuclidean>(&[p.x, p.y]).item as usize)
                .collect()
        };

        let mut changed = false;
        for (label, next) in labels.iter_mut().zip(nearest) {
            if *label != next {
                *label = next;
                changed = true;
            }
        }
        changed
    }

    /// Moves the point farthest from its own centroid into each empty cluster.
    /// Donors must keep at least one member, so `k <= n` always succeeds.
    fn fill_empty_clusters(&self, centroids: &[Coord], labels: &mut [usize]) {
        let k = self.config.k;
        let mut counts = vec![0usize; k];
        for &l in labels.iter() {
            counts[l] += 1;
        }

        for cluster in 0..k {
            if counts[cluster] > 0 {
                continue;
            }

            let donor = labels
                .iter()
                .enumerate()
                .filter(|&(_, &l)| counts[l] > 1)
                .map(|(i, &l)| (i, self.points[i].coord().dist_sq(&centroids[l])))
                .fold(None, |best: Option<(usize, f64)>, (i, d)| match best {
                    Some((_, bd)) if bd >= d => best,
                    _ => Some((i, d)),
                });

            let Some((idx, _)) = donor else {
                log::warn!("kmeans: no donor point for empty cluster={cluster}");
                continue;
            };

            log::trace!("kmeans: relocating point idx={idx} into empty cluster={cluster}");
            counts[labels[idx]] -= 1;
            labels[idx] = cluster;
            counts[cluster] += 1;
        }
    }

    fn recompute_centroids(&self, labels: &[usize]) -> Vec<Coord> {
        let k = self.config.k;
        let mut members: Vec<Vec<usize>> = vec![Vec::new(); k];
        for (i, &l) in labels.iter().enumerate() {
            members[l].push(i);
        }
        members
            .iter()
            .map(|idxs| PathGeometry::centroid_of_indices(self.points, idxs))
            .collect()
    }

    fn inertia(&self, centroids: &[Coord], labels: &[usize]) -> f64 {
        self.points
            .iter()
            .zip(labels)
            .map(|(p, &l)| p.coord().dist_sq(&centroids[l]))
            .sum()
    }
}

/// Lowest-index centroid wins ties.
fn nearest_centroid_scan(centroids: &[Coord], at: &Coord) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (idx, c) in centroids.iter().enumerate() {
        let d = c.dist_sq(at);
        if d < best_dist {
            best_dist = d;
            best = idx;
        }
    }
    best
}

pub(crate) fn generate_seeds(base_seed: u64, count: usize) -> Vec<u64> {
    let mut rng = StdRng::seed_from_u64(base_seed);
    (0..count).map(|_| rng.random::<u64>()).collect()
}
