// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types
//!
//! Only I/O and configuration failures are errors. Geometric conditions
//! (no fit, no match, unsplittable openings) are reported as values by the
//! stage that encounters them.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for floor plan operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading inputs or writing meshes
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Wall line file not found: {0}")]
    MissingWallFile(PathBuf),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Mesh has no faces to write")]
    EmptyMesh,
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
