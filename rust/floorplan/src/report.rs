// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Serializable summary of a reconstruction run

use crate::error::{Error, Result};
use crate::input::ParseError;
use crate::splitter::{InvariantViolation, WallCollection};
use crate::types::WallKind;
use serde::Serialize;
use std::path::Path;

/// Final wall counts by kind
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WallSummary {
    pub plain: usize,
    pub door: usize,
    pub window: usize,
    pub total_length: f64,
}

impl WallSummary {
    pub fn from_walls(walls: &WallCollection) -> Self {
        Self {
            plain: walls.count_kind(WallKind::Plain),
            door: walls.count_kind(WallKind::Door),
            window: walls.count_kind(WallKind::Window),
            total_length: walls.total_length(),
        }
    }

    pub fn total(&self) -> usize {
        self.plain + self.door + self.window
    }
}

/// What happened to the inputs of one run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunReport {
    pub input_walls: usize,
    /// Centerlines fitted from wall point clusters
    pub fitted_centerlines: usize,
    /// Fitted centerlines with no matching wall, added as new walls
    pub centerlines_added: usize,
    pub openings_total: usize,
    /// Openings whose footprint was projected onto a wall
    pub openings_snapped: usize,
    pub openings_applied: usize,
    pub openings_unhosted: usize,
    pub openings_degenerate: usize,
    pub walls: WallSummary,
    pub bands: usize,
    pub vertices: usize,
    pub faces: usize,
    pub welded_vertices: usize,
    pub violations: Vec<InvariantViolation>,
    pub skipped_lines: Vec<ParseError>,
}

impl RunReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|e| Error::io(path, e))
    }
}
