use crate::point::{Coord, Point};

pub(crate) struct PathGeometry;

impl PathGeometry {
    /// Length of an open polyline; no closing edge back to the start.
    pub(crate) fn open_length(path: &[Coord]) -> f64 {
        Self::edge_lengths(path).sum()
    }

    pub(crate) fn edge_lengths(path: &[Coord]) -> impl Iterator<Item = f64> + '_ {
        path.windows(2).map(|w| w[0].dist(&w[1]))
    }

    pub(crate) fn centroid_of_indices(points: &[Point], idxs: &[usize]) -> Coord {
        let mut sx = 0.0;
        let mut sy = 0.0;
        for &i in idxs {
            sx += points[i].x;
            sy += points[i].y;
        }
        let n = idxs.len().max(1) as f64;
        Coord::new(sx / n, sy / n)
    }

    /// Mean squared distance to the dataset centroid, per axis.
    pub(crate) fn mean_variance(points: &[Point]) -> f64 {
        if points.is_empty() {
            return 0.0;
        }
        let all: Vec<usize> = (0..points.len()).collect();
        let c = Self::centroid_of_indices(points, &all);
        let n = points.len() as f64;
        let (vx, vy) = points.iter().fold((0.0, 0.0), |(vx, vy), p| {
            (vx + (p.x - c.x).powi(2), vy + (p.y - c.y).powi(2))
        });
        (vx / n + vy / n) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::PathGeometry;
    use crate::point::{Coord, Point};

    #[test]
    fn open_length_does_not_close_the_path() {
        let path = vec![
            Coord::new(0.0, 0.0),
            Coord::new(0.0, 1.0),
            Coord::new(1.0, 1.0),
            Coord::new(1.0, 0.0),
        ];
        assert!((PathGeometry::open_length(&path) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn open_length_of_short_paths_is_zero() {
        assert_eq!(PathGeometry::open_length(&[]), 0.0);
        assert_eq!(PathGeometry::open_length(&[Coord::new(5.0, 5.0)]), 0.0);
    }

    #[test]
    fn centroid_of_indices_averages_coordinates() {
        let points = vec![
            Point::new(0, 1.0, 2.0),
            Point::new(1, 3.0, 4.0),
            Point::new(2, 5.0, 6.0),
        ];
        let centroid = PathGeometry::centroid_of_indices(&points, &[0, 2]);
        assert!((centroid.x - 3.0).abs() < 1e-12);
        assert!((centroid.y - 4.0).abs() < 1e-12);
    }

    #[test]
    fn mean_variance_is_zero_for_identical_points() {
        let points = vec![Point::new(0, 2.0, 2.0), Point::new(1, 2.0, 2.0)];
        assert_eq!(PathGeometry::mean_variance(&points), 0.0);
    }

    #[test]
    fn mean_variance_averages_axes() {
        let points = vec![Point::new(0, -1.0, 0.0), Point::new(1, 1.0, 0.0)];
        assert!((PathGeometry::mean_variance(&points) - 0.5).abs() < 1e-12);
    }
}
