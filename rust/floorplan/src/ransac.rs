// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! RANSAC line fitting for noisy wall point samples
//!
//! The model is `y = m x + b`. Samples whose two points share an x or a y
//! coordinate, or that produce a zero slope, are discarded: axis-parallel
//! walls are not expected from this stage and are handled upstream.

use crate::config::RansacConfig;
use crate::types::{LineSegment, Point2D};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Best line found by [`fit_line_ransac`]
#[derive(Debug, Clone, PartialEq)]
pub struct LineFit {
    pub slope: f64,
    pub intercept: f64,
    pub inliers: Vec<Point2D>,
}

impl LineFit {
    /// Perpendicular distance from `point` to the fitted line
    pub fn distance_to(&self, point: &Point2D) -> f64 {
        line_distance(point, self.slope, self.intercept)
    }

    pub fn inlier_count(&self) -> usize {
        self.inliers.len()
    }

    /// Segment of the fitted line spanned by the inlier projections
    ///
    /// Returns `None` when all inliers project onto the same point.
    pub fn inlier_extent(&self) -> Option<LineSegment> {
        let norm = (1.0 + self.slope * self.slope).sqrt();
        let (dx, dy) = (1.0 / norm, self.slope / norm);

        let mut min_t = f64::MAX;
        let mut max_t = f64::MIN;
        for p in &self.inliers {
            let t = p.x * dx + (p.y - self.intercept) * dy;
            min_t = min_t.min(t);
            max_t = max_t.max(t);
        }

        if self.inliers.is_empty() || max_t - min_t <= f64::EPSILON {
            return None;
        }

        let at = |t: f64| Point2D::new(t * dx, self.intercept + t * dy);
        Some(LineSegment::new(at(min_t), at(max_t)))
    }
}

/// Fit a line to `points`, returning `None` when no acceptable sample exists
///
/// Draws `config.iterations` pairs of distinct points. Each valid pair defines
/// a candidate line; the candidate with the most points closer than
/// `config.threshold` wins, with ties going to the earliest candidate. A
/// candidate without any inlier is never accepted.
pub fn fit_line_ransac(points: &[Point2D], config: &RansacConfig) -> Option<LineFit> {
    let mut rng = make_rng(config.seed);
    fit_with_rng(points, config, &mut rng)
}

/// Fit each labelled cluster and return the centerlines of the successful fits
pub fn fit_wall_centerlines(clusters: &[Vec<Point2D>], config: &RansacConfig) -> Vec<LineSegment> {
    let mut rng = make_rng(config.seed);
    let mut centerlines = Vec::with_capacity(clusters.len());

    for (idx, cluster) in clusters.iter().enumerate() {
        match fit_with_rng(cluster, config, &mut rng) {
            Some(fit) => match fit.inlier_extent() {
                Some(segment) => {
                    tracing::debug!(
                        cluster = idx,
                        slope = fit.slope,
                        intercept = fit.intercept,
                        inliers = fit.inlier_count(),
                        points = cluster.len(),
                        "Fitted wall centerline"
                    );
                    centerlines.push(segment);
                }
                None => {
                    tracing::warn!(cluster = idx, "Fitted line has zero-length inlier extent")
                }
            },
            None => tracing::warn!(
                cluster = idx,
                points = cluster.len(),
                "No RANSAC fit for cluster"
            ),
        }
    }

    centerlines
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

fn fit_with_rng<R: Rng>(points: &[Point2D], config: &RansacConfig, rng: &mut R) -> Option<LineFit> {
    let n = points.len();
    if n < 2 {
        return None;
    }

    let mut best: Option<(f64, f64, usize)> = None;

    for _ in 0..config.iterations {
        let i = rng.random_range(0..n);
        let mut j = rng.random_range(0..n - 1);
        if j >= i {
            j += 1;
        }
        let (a, b) = (points[i], points[j]);

        if a.x == b.x || a.y == b.y {
            continue;
        }
        let slope = (b.y - a.y) / (b.x - a.x);
        if slope == 0.0 {
            continue;
        }
        let intercept = a.y - slope * a.x;

        let count = points
            .iter()
            .filter(|p| line_distance(p, slope, intercept) < config.threshold)
            .count();

        if count > 0 && best.map_or(true, |(_, _, best_count)| count > best_count) {
            best = Some((slope, intercept, count));
        }
    }

    let (slope, intercept, _) = best?;
    let inliers = points
        .iter()
        .filter(|p| line_distance(p, slope, intercept) < config.threshold)
        .copied()
        .collect();

    Some(LineFit {
        slope,
        intercept,
        inliers,
    })
}

fn line_distance(point: &Point2D, slope: f64, intercept: f64) -> f64 {
    (-slope * point.x + point.y - intercept).abs() / (slope * slope + 1.0).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn noisy_line(
        slope: f64,
        intercept: f64,
        n: usize,
        outliers: usize,
        seed: u64,
    ) -> Vec<Point2D> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut points: Vec<Point2D> = (0..n)
            .map(|i| {
                let x = i as f64 * 0.05;
                Point2D::new(x, slope * x + intercept)
            })
            .collect();
        for _ in 0..outliers {
            points.push(Point2D::new(
                rng.random_range(-5.0..5.0),
                rng.random_range(-5.0..5.0),
            ));
        }
        points
    }

    #[test]
    fn test_recovers_line_with_outliers() {
        let points = noisy_line(0.7, 1.5, 100, 30, 7);
        let config = RansacConfig::default().with_iterations(500).with_seed(42);

        let fit = fit_line_ransac(&points, &config).unwrap();

        assert_relative_eq!(fit.slope, 0.7, epsilon = 1e-6);
        assert_relative_eq!(fit.intercept, 1.5, epsilon = 1e-6);
        assert!(fit.inlier_count() >= 100);
    }

    #[test]
    fn test_seeded_fits_are_reproducible() {
        let points = noisy_line(-2.0, 0.5, 40, 40, 3);
        let config = RansacConfig::default().with_iterations(50).with_seed(9);

        let a = fit_line_ransac(&points, &config).unwrap();
        let b = fit_line_ransac(&points, &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_degenerate_inputs_return_no_fit() {
        let config = RansacConfig::default().with_iterations(100).with_seed(1);

        assert!(fit_line_ransac(&[], &config).is_none());
        assert!(fit_line_ransac(&[Point2D::new(1.0, 1.0)], &config).is_none());

        // Horizontal and vertical samples are rejected by policy
        let horizontal: Vec<_> = (0..10).map(|i| Point2D::new(i as f64, 2.0)).collect();
        assert!(fit_line_ransac(&horizontal, &config).is_none());
        let vertical: Vec<_> = (0..10).map(|i| Point2D::new(3.0, i as f64)).collect();
        assert!(fit_line_ransac(&vertical, &config).is_none());
    }

    #[test]
    fn test_line_without_inliers_is_no_fit() {
        let points = noisy_line(1.5, -0.5, 20, 0, 0);
        let config = RansacConfig::default()
            .with_iterations(100)
            .with_threshold(0.0)
            .with_seed(2);

        assert!(fit_line_ransac(&points, &config).is_none());
    }

    #[test]
    fn test_inlier_extent_spans_samples() {
        let fit = LineFit {
            slope: 1.0,
            intercept: 0.0,
            inliers: vec![
                Point2D::new(1.0, 1.0),
                Point2D::new(3.0, 3.0),
                Point2D::new(2.0, 2.0),
            ],
        };

        let extent = fit.inlier_extent().unwrap();
        assert_relative_eq!(extent.p1.x, 1.0, epsilon = 1e-9);
        assert_relative_eq!(extent.p1.y, 1.0, epsilon = 1e-9);
        assert_relative_eq!(extent.p2.x, 3.0, epsilon = 1e-9);
        assert_relative_eq!(extent.p2.y, 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_fit_wall_centerlines_skips_degenerate_clusters() {
        let clusters = vec![
            noisy_line(1.0, 0.0, 30, 0, 0),
            vec![Point2D::new(0.0, 0.0)],
        ];
        let config = RansacConfig::default().with_iterations(100).with_seed(5);

        let centerlines = fit_wall_centerlines(&clusters, &config);
        assert_eq!(centerlines.len(), 1);
        assert_relative_eq!(centerlines[0].length(), (2.0f64).sqrt() * 29.0 * 0.05, epsilon = 1e-6);
    }
}
