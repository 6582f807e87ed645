// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Extrusion of typed wall segments into vertical bands
//!
//! | kind   | bands                                       |
//! |--------|---------------------------------------------|
//! | plain  | `0 .. wall_height`                          |
//! | door   | `z_max - z_min .. head_height`              |
//! | window | `0 .. z_min` and `z_max .. head_height`     |
//!
//! Door and window cavities are left open.

use crate::config::ExtrusionConfig;
use crate::types::{Point3D, Wall, WallKind};
use smallvec::{smallvec, SmallVec};

/// Triangles of every band over its vertices `[base p1, base p2, top p1, top p2]`
pub const BAND_FACES: [[u32; 3]; 2] = [[0, 1, 2], [2, 1, 3]];

/// Vertical rectangle covering one z-interval of a wall segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshBand {
    /// Base at p1, base at p2, top at p1, top at p2
    pub vertices: [Point3D; 4],
    pub z_bottom: f64,
    pub z_top: f64,
}

impl MeshBand {
    pub fn new(wall: &Wall, z_bottom: f64, z_top: f64) -> Self {
        Self {
            vertices: [
                wall.p1.lift(z_bottom),
                wall.p2.lift(z_bottom),
                wall.p1.lift(z_top),
                wall.p2.lift(z_top),
            ],
            z_bottom,
            z_top,
        }
    }

    pub fn height(&self) -> f64 {
        self.z_top - self.z_bottom
    }

    pub fn faces(&self) -> &'static [[u32; 3]; 2] {
        &BAND_FACES
    }
}

/// Bands of one wall; at most two
pub type WallBands = SmallVec<[MeshBand; 2]>;

/// Extrude a wall into its solid bands
pub fn extrude_wall(wall: &Wall, config: &ExtrusionConfig) -> WallBands {
    let bands: WallBands = match (wall.kind, wall.z_range) {
        (WallKind::Door, Some(z)) => {
            smallvec![MeshBand::new(wall, z.max - z.min, config.head_height)]
        }
        (WallKind::Window, Some(z)) => smallvec![
            MeshBand::new(wall, 0.0, z.min),
            MeshBand::new(wall, z.max, config.head_height),
        ],
        (WallKind::Plain, _) => smallvec![MeshBand::new(wall, 0.0, config.wall_height)],
        (kind, None) => {
            tracing::warn!(
                %kind,
                p1 = %wall.p1,
                p2 = %wall.p2,
                "Opening wall without z-range, extruding full height"
            );
            smallvec![MeshBand::new(wall, 0.0, config.wall_height)]
        }
    };

    for band in bands.iter().filter(|b| b.height() <= 0.0) {
        tracing::warn!(
            kind = %wall.kind,
            z_bottom = band.z_bottom,
            z_top = band.z_top,
            "Degenerate wall band"
        );
    }

    bands
}

/// Extrude every wall, preserving wall order
pub fn extrude_walls<'a>(
    walls: impl IntoIterator<Item = &'a Wall>,
    config: &ExtrusionConfig,
) -> Vec<MeshBand> {
    walls
        .into_iter()
        .flat_map(|wall| extrude_wall(wall, config))
        .collect()
}
