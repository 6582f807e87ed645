// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end reconstruction: walls and openings in, wall mesh out
//!
//! State flows explicitly through the stages:
//!
//! 1. Fit centerlines from wall point clusters (optional) and add the ones
//!    that do not project onto an existing wall
//! 2. Snap each opening footprint onto its closest wall
//! 3. Split host walls at the openings, one opening at a time
//! 4. Extrude every wall into bands and merge them into one mesh

use crate::config::{MatchConfig, PipelineConfig};
use crate::extrude::extrude_walls;
use crate::mesh::{merge_bands, Mesh};
use crate::projection::project_to_closest;
use crate::ransac::fit_wall_centerlines;
use crate::report::{RunReport, WallSummary};
use crate::splitter::{SplitOutcome, WallCollection};
use crate::types::{LineSegment, Opening, Point2D, Wall};

/// Inputs of one reconstruction run
#[derive(Debug, Clone, Default)]
pub struct PipelineInput {
    pub walls: Vec<Wall>,
    pub openings: Vec<Opening>,
    /// Point samples of individual walls, fitted with RANSAC
    pub point_clusters: Vec<Vec<Point2D>>,
}

/// Result of a reconstruction run
#[derive(Debug, Clone)]
pub struct Reconstruction {
    pub walls: WallCollection,
    pub mesh: Mesh,
    pub report: RunReport,
}

/// Run all stages on `input`
pub fn reconstruct(input: PipelineInput, config: &PipelineConfig) -> Reconstruction {
    let mut report = RunReport {
        input_walls: input.walls.len(),
        openings_total: input.openings.len(),
        ..RunReport::default()
    };
    let mut walls = WallCollection::from_walls(input.walls);

    if !input.point_clusters.is_empty() {
        let centerlines = fit_wall_centerlines(&input.point_clusters, &config.ransac);
        report.fitted_centerlines = centerlines.len();
        report.centerlines_added =
            add_unmatched_centerlines(&mut walls, &centerlines, &config.matching);
    }

    for opening in &input.openings {
        let opening = if config.snap_openings {
            match snap_opening(opening, &walls, &config.matching) {
                Some(snapped) => {
                    report.openings_snapped += 1;
                    snapped
                }
                None => *opening,
            }
        } else {
            *opening
        };

        match walls.split_at_opening(&opening, &config.split) {
            SplitOutcome::Split { violations, .. } => {
                report.openings_applied += 1;
                report.violations.extend(violations);
            }
            SplitOutcome::NoHost => {
                tracing::warn!(
                    kind = %opening.kind,
                    p1 = %opening.p1,
                    p2 = %opening.p2,
                    "Opening does not lie on any wall"
                );
                report.openings_unhosted += 1;
            }
            SplitOutcome::DegenerateOpening => report.openings_degenerate += 1,
        }
    }

    let overlaps = walls.check_disjoint(config.split.epsilon);
    for violation in &overlaps {
        tracing::warn!(%violation, "Walls overlap after splitting");
    }
    report.violations.extend(overlaps);

    let mesh = build_mesh(&walls, config, &mut report);
    report.walls = WallSummary::from_walls(&walls);

    tracing::info!(
        walls = report.walls.total(),
        doors = report.walls.door,
        windows = report.walls.window,
        openings_applied = report.openings_applied,
        vertices = report.vertices,
        faces = report.faces,
        "Reconstruction complete"
    );

    Reconstruction {
        walls,
        mesh,
        report,
    }
}

/// Append fitted centerlines that match no existing wall; returns how many were added
pub fn add_unmatched_centerlines(
    walls: &mut WallCollection,
    centerlines: &[LineSegment],
    config: &MatchConfig,
) -> usize {
    let references = walls.segments();
    let mut added = 0;

    for centerline in centerlines {
        match project_to_closest(centerline, &references, config) {
            Some(matched) => tracing::debug!(
                reference = matched.reference_index,
                average_distance = matched.average_distance,
                "Fitted centerline already covered by a wall"
            ),
            None => {
                walls.push(Wall::from_segment(centerline));
                added += 1;
            }
        }
    }

    added
}

/// Project an opening footprint onto the closest wall, if any is within tolerance
pub fn snap_opening(
    opening: &Opening,
    walls: &WallCollection,
    config: &MatchConfig,
) -> Option<Opening> {
    let references = walls.segments();
    project_to_closest(&opening.footprint(), &references, config)
        .map(|matched| opening.with_footprint(&matched.segment))
}

/// Extrude and merge the final walls, welding when configured
pub fn build_mesh(walls: &WallCollection, config: &PipelineConfig, report: &mut RunReport) -> Mesh {
    let bands = extrude_walls(walls.iter(), &config.extrusion);
    let mut mesh = merge_bands(&bands);
    if let Some(eps) = config.mesh.weld_epsilon {
        report.welded_vertices = mesh.weld(eps);
    }

    report.bands = bands.len();
    report.vertices = mesh.vertex_count();
    report.faces = mesh.face_count();
    mesh
}
