// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Splitting walls at door and window footprints
//!
//! A wall hosting an opening is replaced by up to three pieces: plain wall,
//! the opening segment, plain wall. Split points are ordered by their signed
//! distance along the host wall from `p1`, so pieces keep the host's
//! orientation whichever way the wall runs.

use crate::config::SplitConfig;
use crate::types::{LineSegment, Opening, Point2D, Wall, WallKind};
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Check whether `point` lies on the finite segment within `epsilon`
///
/// Exact endpoints always match. Otherwise the projection must fall inside
/// the segment and the perpendicular distance must be below `epsilon`.
pub fn is_point_on_segment(segment: &LineSegment, point: &Point2D, epsilon: f64) -> bool {
    if *point == segment.p1 || *point == segment.p2 {
        return true;
    }

    let dir = segment.direction();
    let len = dir.norm();
    if len < epsilon {
        return false;
    }

    let offset = Vector2::new(point.x - segment.p1.x, point.y - segment.p1.y);
    let along = offset.dot(&dir) / len;
    if along < 0.0 || along > len {
        return false;
    }

    dir.perp(&offset).abs() / len < epsilon
}

/// Distance from `point` to the infinite line through `segment`
pub fn distance_to_supporting_line(segment: &LineSegment, point: &Point2D) -> f64 {
    let dir = segment.direction();
    let len = dir.norm();
    if len < f64::EPSILON {
        return segment.p1.distance_to(point);
    }
    let offset = Vector2::new(point.x - segment.p1.x, point.y - segment.p1.y);
    dir.perp(&offset).abs() / len
}

/// Geometric inconsistency detected while splitting or auditing walls
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InvariantViolation {
    /// Two collinear walls share more than an endpoint
    Overlap {
        first: LineSegment,
        second: LineSegment,
        overlap: f64,
    },
    /// A split did not produce exactly one piece matching the opening footprint
    MissingOpeningSegment { opening: LineSegment },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvariantViolation::Overlap {
                first,
                second,
                overlap,
            } => write!(
                f,
                "walls {}-{} and {}-{} overlap by {:.6}",
                first.p1, first.p2, second.p1, second.p2, overlap
            ),
            InvariantViolation::MissingOpeningSegment { opening } => {
                write!(f, "no wall piece matches opening {}-{}", opening.p1, opening.p2)
            }
        }
    }
}

/// Pieces produced by splitting one wall
#[derive(Debug, Clone, PartialEq)]
pub struct WallSplit {
    /// Ordered from the host's `p1` to its `p2`
    pub pieces: Vec<Wall>,
    pub violations: Vec<InvariantViolation>,
}

/// Result of applying one opening to a [`WallCollection`]
#[derive(Debug, Clone, PartialEq)]
pub enum SplitOutcome {
    /// The host wall was replaced by `pieces`
    Split {
        host: Wall,
        pieces: usize,
        violations: Vec<InvariantViolation>,
    },
    /// No plain wall contains both opening endpoints
    NoHost,
    /// The opening footprint has zero length
    DegenerateOpening,
}

impl SplitOutcome {
    pub fn is_split(&self) -> bool {
        matches!(self, SplitOutcome::Split { .. })
    }
}

struct SplitPoint {
    t: f64,
    point: Point2D,
    on_host_end: bool,
}

/// Split `wall` at the footprint of `opening`
///
/// Returns `None` unless both opening endpoints lie on the wall. The opening
/// piece carries the opening's kind and z-range; the others are plain.
pub fn split_wall(wall: &Wall, opening: &Opening, config: &SplitConfig) -> Option<WallSplit> {
    let host = wall.segment();
    let eps = config.epsilon;
    if !is_point_on_segment(&host, &opening.p1, eps)
        || !is_point_on_segment(&host, &opening.p2, eps)
    {
        return None;
    }

    let mut points: Vec<SplitPoint> = [
        (wall.p1, true),
        (wall.p2, true),
        (opening.p1, false),
        (opening.p2, false),
    ]
    .into_iter()
    .map(|(point, on_host_end)| SplitPoint {
        t: host.parameter_of(&point),
        point,
        on_host_end,
    })
    .collect();
    points.sort_by(|a, b| a.t.total_cmp(&b.t));

    // Collapse coincident points, preferring host endpoints so the wall extent is kept
    let mut unique: Vec<SplitPoint> = Vec::with_capacity(points.len());
    for sp in points {
        match unique.last_mut() {
            Some(last) if (sp.t - last.t).abs() <= eps => {
                if sp.on_host_end && !last.on_host_end {
                    *last = sp;
                }
            }
            _ => unique.push(sp),
        }
    }

    let footprint = opening.footprint();
    let mut pieces = Vec::with_capacity(unique.len().saturating_sub(1));
    let mut violations = Vec::new();
    let mut opening_pieces = 0;

    for pair in unique.windows(2) {
        let segment = LineSegment::new(pair[0].point, pair[1].point);
        if segment.same_endpoints(&footprint, eps) {
            opening_pieces += 1;
            pieces.push(Wall::with_opening(
                segment.p1,
                segment.p2,
                opening.kind,
                opening.z_range,
            ));
        } else {
            pieces.push(Wall::from_segment(&segment));
        }
    }

    if opening_pieces != 1 {
        violations.push(InvariantViolation::MissingOpeningSegment { opening: footprint });
    }

    Some(WallSplit { pieces, violations })
}

/// The current set of floor plan walls
///
/// Walls have no stable identity; they are located by geometric containment
/// and replaced in place when split.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WallCollection {
    walls: Vec<Wall>,
}

impl WallCollection {
    pub fn new() -> Self {
        Self { walls: Vec::new() }
    }

    pub fn from_walls(walls: Vec<Wall>) -> Self {
        Self { walls }
    }

    pub fn push(&mut self, wall: Wall) {
        self.walls.push(wall);
    }

    pub fn len(&self) -> usize {
        self.walls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.walls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Wall> {
        self.walls.iter()
    }

    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    pub fn segments(&self) -> Vec<LineSegment> {
        self.walls.iter().map(Wall::segment).collect()
    }

    pub fn total_length(&self) -> f64 {
        self.walls.iter().map(Wall::length).sum()
    }

    pub fn count_kind(&self, kind: WallKind) -> usize {
        self.walls.iter().filter(|w| w.kind == kind).count()
    }

    /// Index of the first plain wall containing both opening endpoints
    pub fn find_host(&self, opening: &Opening, epsilon: f64) -> Option<usize> {
        self.walls.iter().position(|wall| {
            let segment = wall.segment();
            wall.kind == WallKind::Plain
                && is_point_on_segment(&segment, &opening.p1, epsilon)
                && is_point_on_segment(&segment, &opening.p2, epsilon)
        })
    }

    /// Replace the wall hosting `opening` with its split pieces
    pub fn split_at_opening(&mut self, opening: &Opening, config: &SplitConfig) -> SplitOutcome {
        if opening.p1.distance_to(&opening.p2) <= config.epsilon {
            tracing::warn!(
                kind = %opening.kind,
                at = %opening.p1,
                "Rejecting zero-length opening footprint"
            );
            return SplitOutcome::DegenerateOpening;
        }

        let Some(idx) = self.find_host(opening, config.epsilon) else {
            tracing::debug!(
                kind = %opening.kind,
                p1 = %opening.p1,
                p2 = %opening.p2,
                "No host wall for opening"
            );
            return SplitOutcome::NoHost;
        };

        let host = self.walls[idx];
        let Some(split) = split_wall(&host, opening, config) else {
            return SplitOutcome::NoHost;
        };

        for violation in &split.violations {
            tracing::warn!(%violation, "Wall split produced an inconsistent result");
        }
        tracing::debug!(
            kind = %opening.kind,
            host_p1 = %host.p1,
            host_p2 = %host.p2,
            pieces = split.pieces.len(),
            "Split wall at opening"
        );

        self.walls.remove(idx);
        let pieces = split.pieces.len();
        self.walls.extend(split.pieces);

        SplitOutcome::Split {
            host,
            pieces,
            violations: split.violations,
        }
    }

    /// Apply openings one after another, each against the current walls
    pub fn apply_openings(
        &mut self,
        openings: &[Opening],
        config: &SplitConfig,
    ) -> Vec<SplitOutcome> {
        openings
            .iter()
            .map(|opening| self.split_at_opening(opening, config))
            .collect()
    }

    /// Report every pair of collinear walls sharing more than an endpoint
    pub fn check_disjoint(&self, epsilon: f64) -> Vec<InvariantViolation> {
        let mut violations = Vec::new();

        for (i, a) in self.walls.iter().enumerate() {
            let line = a.segment();
            let len = line.length();
            if len <= epsilon {
                continue;
            }
            for b in &self.walls[i + 1..] {
                if distance_to_supporting_line(&line, &b.p1) > epsilon
                    || distance_to_supporting_line(&line, &b.p2) > epsilon
                {
                    continue;
                }
                let (t1, t2) = (line.parameter_of(&b.p1), line.parameter_of(&b.p2));
                let overlap = len.min(t1.max(t2)) - 0.0f64.max(t1.min(t2));
                if overlap > epsilon {
                    violations.push(InvariantViolation::Overlap {
                        first: line,
                        second: b.segment(),
                        overlap,
                    });
                }
            }
        }

        violations
    }
}

impl FromIterator<Wall> for WallCollection {
    fn from_iter<I: IntoIterator<Item = Wall>>(iter: I) -> Self {
        Self::from_walls(iter.into_iter().collect())
    }
}
