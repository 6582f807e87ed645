// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Projection of candidate segments onto the closest reference wall
//!
//! Selection is greedy and per candidate: several candidates may snap to the
//! same reference.

use crate::config::MatchConfig;
use crate::types::{LineSegment, Point2D};

/// A candidate segment re-projected onto a reference wall
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionMatch {
    /// Candidate endpoints projected onto the reference and clamped to its extent
    pub segment: LineSegment,
    /// Index of the matched reference in the input slice
    pub reference_index: usize,
    /// Mean distance between candidate endpoints and their projections
    pub average_distance: f64,
}

/// Orthogonal projection of `point` onto the infinite line through `line_start` and `line_end`
///
/// The line must have non-zero length.
pub fn project_point_on_line(
    point: &Point2D,
    line_start: &Point2D,
    line_end: &Point2D,
) -> Point2D {
    let origin = line_start.to_nalgebra();
    let dir = line_end.to_nalgebra() - origin;
    let t = (point.to_nalgebra() - origin).dot(&dir) / dir.norm_squared();
    Point2D::from_nalgebra(&(origin + dir * t))
}

/// Clamp a projected point to the axis-aligned box of the reference segment
pub fn clamp_projection(point: &Point2D, line_start: &Point2D, line_end: &Point2D) -> Point2D {
    Point2D::new(
        point
            .x
            .clamp(line_start.x.min(line_end.x), line_start.x.max(line_end.x)),
        point
            .y
            .clamp(line_start.y.min(line_end.y), line_start.y.max(line_end.y)),
    )
}

/// Find the reference best matching `candidate` and project the candidate onto it
///
/// A reference is eligible when the smaller of the slope difference and the
/// reciprocal-slope difference is below `config.slope_tolerance`; among the
/// eligible ones the smallest average endpoint distance wins. The winner is
/// only accepted below `config.max_average_distance`.
pub fn project_to_closest(
    candidate: &LineSegment,
    references: &[LineSegment],
    config: &MatchConfig,
) -> Option<ProjectionMatch> {
    let candidate_slope = candidate.slope();
    let mut best: Option<(usize, f64, LineSegment)> = None;

    for (idx, reference) in references.iter().enumerate() {
        if reference.length() < f64::EPSILON {
            tracing::debug!(reference = idx, "Skipping zero-length reference segment");
            continue;
        }

        let reference_slope = reference.slope();
        let slope_diff = (candidate_slope - reference_slope).abs();
        let reciprocal_diff = (1.0 / (candidate_slope + config.slope_epsilon)
            - 1.0 / (reference_slope + config.slope_epsilon))
            .abs();
        // f64::min ignores NaN, so two vertical segments compare through the reciprocal
        if slope_diff.min(reciprocal_diff) >= config.slope_tolerance {
            continue;
        }

        let projected = project_segment(candidate, reference);
        let average_distance = (candidate.p1.distance_to(&projected.p1)
            + candidate.p2.distance_to(&projected.p2))
            / 2.0;

        if best.map_or(true, |(_, closest, _)| average_distance < closest) {
            best = Some((idx, average_distance, projected));
        }
    }

    match best {
        Some((reference_index, average_distance, segment))
            if average_distance < config.max_average_distance =>
        {
            tracing::debug!(
                reference = reference_index,
                average_distance,
                "Projected candidate onto reference"
            );
            Some(ProjectionMatch {
                segment,
                reference_index,
                average_distance,
            })
        }
        Some((reference_index, average_distance, _)) => {
            tracing::debug!(
                reference = reference_index,
                average_distance,
                "Closest reference outside distance tolerance"
            );
            None
        }
        None => None,
    }
}

/// Project every candidate independently against the same references
pub fn snap_segments(
    candidates: &[LineSegment],
    references: &[LineSegment],
    config: &MatchConfig,
) -> Vec<Option<ProjectionMatch>> {
    candidates
        .iter()
        .map(|candidate| project_to_closest(candidate, references, config))
        .collect()
}

fn project_segment(candidate: &LineSegment, reference: &LineSegment) -> LineSegment {
    let project = |p: &Point2D| {
        let on_line = project_point_on_line(p, &reference.p1, &reference.p2);
        clamp_projection(&on_line, &reference.p1, &reference.p2)
    };
    LineSegment::new(project(&candidate.p1), project(&candidate.p2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn seg(x1: f64, y1: f64, x2: f64, y2: f64) -> LineSegment {
        LineSegment::new(Point2D::new(x1, y1), Point2D::new(x2, y2))
    }

    #[test]
    fn test_selects_nearest_parallel_reference() {
        let candidate = seg(0.0, 0.0, 5.0, 0.01);
        let references = vec![seg(0.0, 0.0, 5.0, 0.0), seg(0.0, 10.0, 5.0, 10.0)];

        let matched = project_to_closest(&candidate, &references, &MatchConfig::default()).unwrap();

        assert_eq!(matched.reference_index, 0);
        assert!(matched.average_distance < 0.5);
        assert_relative_eq!(matched.segment.p2.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(matched.segment.p2.x, 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_collinear_overlapping_segment_is_unchanged() {
        let candidate = seg(1.0, 0.0, 3.0, 0.0);
        let references = vec![seg(0.0, 0.0, 5.0, 0.0)];

        let matched = project_to_closest(&candidate, &references, &MatchConfig::default()).unwrap();

        assert_relative_eq!(matched.average_distance, 0.0, epsilon = 1e-12);
        assert!(matched.segment.same_endpoints(&candidate, 1e-12));
    }

    #[test]
    fn test_projection_is_clamped_to_reference() {
        let candidate = seg(-0.2, 0.1, 2.0, 0.1);
        let references = vec![seg(0.0, 0.0, 5.0, 0.0)];

        let matched = project_to_closest(&candidate, &references, &MatchConfig::default()).unwrap();

        assert_eq!(matched.segment.p1, Point2D::new(0.0, 0.0));
        assert_relative_eq!(matched.segment.p2.x, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_far_candidate_has_no_match() {
        let candidate = seg(-1.0, 0.1, 2.0, 0.1);
        let references = vec![seg(0.0, 0.0, 5.0, 0.0)];

        // Clamped start is ~1.005 away, average exceeds 0.5
        assert!(project_to_closest(&candidate, &references, &MatchConfig::default()).is_none());
        assert!(project_to_closest(&candidate, &[], &MatchConfig::default()).is_none());

        let loose = MatchConfig::default().with_max_average_distance(0.6);
        let matched = project_to_closest(&candidate, &references, &loose).unwrap();
        assert_relative_eq!(
            matched.average_distance,
            (1.01f64.sqrt() + 0.1) / 2.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_perpendicular_reference_rejected_by_slope_gate() {
        let candidate = seg(0.0, 0.0, 1.0, 2.0);
        let references = vec![seg(0.0, 0.0, 2.0, -1.0)];

        assert!(project_to_closest(&candidate, &references, &MatchConfig::default()).is_none());

        // Opening the slope gate alone is not enough; the projection is still too far
        let wide = MatchConfig::default().with_slope_tolerance(3.0);
        assert!(project_to_closest(&candidate, &references, &wide).is_none());

        let wide = wide.with_max_average_distance(2.0);
        let matched = project_to_closest(&candidate, &references, &wide).unwrap();
        assert_eq!(matched.segment.p2, Point2D::new(0.0, 0.0));
    }

    #[test]
    fn test_vertical_segments_match() {
        let candidate = seg(2.0, 0.0, 2.0, 4.0);
        let near_vertical = seg(2.05, 0.0, 2.1, 5.0);
        let references = vec![seg(0.0, 0.0, 5.0, 0.0), seg(2.0, -1.0, 2.0, 6.0)];

        let matched = project_to_closest(&candidate, &references, &MatchConfig::default()).unwrap();
        assert_eq!(matched.reference_index, 1);

        let matched =
            project_to_closest(&near_vertical, &references, &MatchConfig::default()).unwrap();
        assert_eq!(matched.reference_index, 1);
        assert_relative_eq!(matched.segment.p1.x, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_snap_segments_is_greedy_per_candidate() {
        let references = vec![seg(0.0, 0.0, 5.0, 0.0)];
        let candidates = vec![
            seg(0.0, 0.1, 2.0, 0.1),
            seg(3.0, -0.1, 5.0, -0.1),
            seg(0.0, 3.0, 5.0, 3.0),
        ];

        let results = snap_segments(&candidates, &references, &MatchConfig::default());

        assert_eq!(results[0].map(|m| m.reference_index), Some(0));
        assert_eq!(results[1].map(|m| m.reference_index), Some(0));
        assert!(results[2].is_none());
    }
}
