// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Floor plan wall reconstruction and 3D wall meshing
//!
//! This crate turns a vectorized floor plan into a wall mesh:
//! 1. Fitting wall centerlines to noisy point samples (RANSAC)
//! 2. Projecting candidate segments onto the closest reference wall
//! 3. Splitting walls at door and window footprints into typed pieces
//! 4. Extruding typed pieces into vertical bands and writing an OBJ mesh
//!
//! # Usage
//!
//! ```rust,ignore
//! use floorplan_walls::{
//!     reconstruct, save_mesh, PipelineConfig, PipelineInput, read_wall_lines, read_openings,
//! };
//!
//! let config = PipelineConfig::default();
//! let input = PipelineInput {
//!     walls: read_wall_lines(Path::new("floorplan.txt"))?.items,
//!     openings: read_openings(Path::new("openings.txt"))?.items,
//!     ..Default::default()
//! };
//!
//! let result = reconstruct(input, &config);
//! save_mesh(&result.mesh, Path::new("walls.obj"), &config.material)?;
//! ```

pub mod config;
pub mod error;
pub mod extrude;
pub mod input;
pub mod mesh;
pub mod obj;
pub mod pipeline;
pub mod projection;
pub mod ransac;
pub mod report;
pub mod splitter;
pub mod types;

// Re-export commonly used types and functions
pub use config::{
    ExtrusionConfig, MatchConfig, MaterialConfig, MeshConfig, PipelineConfig, RansacConfig,
    SplitConfig,
};
pub use error::{Error, Result};
pub use extrude::{extrude_wall, extrude_walls, MeshBand, WallBands};
pub use input::{
    parse_openings, parse_wall_lines, parse_wall_points, read_openings, read_wall_lines,
    read_wall_points, ParseError, ParseReport, PointCluster,
};
pub use mesh::{merge_bands, Face, Mesh};
pub use obj::{save_mesh, write_mtl, write_obj};
pub use pipeline::{reconstruct, PipelineInput, Reconstruction};
pub use projection::{project_to_closest, snap_segments, ProjectionMatch};
pub use ransac::{fit_line_ransac, fit_wall_centerlines, LineFit};
pub use report::{RunReport, WallSummary};
pub use splitter::{
    is_point_on_segment, split_wall, InvariantViolation, SplitOutcome, WallCollection,
};
pub use types::{LineSegment, Opening, Point2D, Point3D, Wall, WallKind, ZRange};
