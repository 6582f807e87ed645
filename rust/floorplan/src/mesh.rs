// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polygon mesh assembled from wall bands

use crate::extrude::MeshBand;
use crate::types::Point3D;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Polygon face as an ordered list of vertex indices (0-based)
pub type Face = SmallVec<[u32; 4]>;

/// Polygon mesh; vertex order defines the face indices
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Point3D>,
    pub faces: Vec<Face>,
}

impl Mesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
        }
    }

    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(face_count),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Append a band's four vertices and two triangles
    pub fn add_band(&mut self, band: &MeshBand) {
        let offset = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&band.vertices);
        self.faces.extend(
            band.faces()
                .iter()
                .map(|tri| tri.iter().map(|&i| i + offset).collect::<Face>()),
        );
    }

    /// Merge another mesh into this one, re-indexing its faces
    pub fn merge(&mut self, other: &Mesh) {
        if other.is_empty() {
            return;
        }

        let offset = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.faces.extend(
            other
                .faces
                .iter()
                .map(|face| face.iter().map(|&i| i + offset).collect::<Face>()),
        );
    }

    /// Axis-aligned bounds `(min, max)`, `None` for a mesh without vertices
    pub fn bounds(&self) -> Option<(Point3D, Point3D)> {
        let first = *self.vertices.first()?;
        Some(self.vertices.iter().fold((first, first), |(lo, hi), v| {
            (
                Point3D::new(lo.x.min(v.x), lo.y.min(v.y), lo.z.min(v.z)),
                Point3D::new(hi.x.max(v.x), hi.y.max(v.y), hi.z.max(v.z)),
            )
        }))
    }

    /// Merge vertices that fall into the same `epsilon` grid cell
    ///
    /// Faces that collapse onto a repeated index are dropped. Returns the
    /// number of vertices removed.
    pub fn weld(&mut self, epsilon: f64) -> usize {
        let before = self.vertices.len();
        let mut lookup: FxHashMap<(i64, i64, i64), u32> = FxHashMap::default();
        let mut remap = Vec::with_capacity(before);
        let mut welded = Vec::with_capacity(before);

        for v in &self.vertices {
            let key = (
                (v.x / epsilon).round() as i64,
                (v.y / epsilon).round() as i64,
                (v.z / epsilon).round() as i64,
            );
            let idx = *lookup.entry(key).or_insert_with(|| {
                welded.push(*v);
                (welded.len() - 1) as u32
            });
            remap.push(idx);
        }

        let mut dropped = 0;
        let faces = std::mem::take(&mut self.faces);
        self.faces = faces
            .into_iter()
            .filter_map(|face| {
                let face: Face = face.iter().map(|&i| remap[i as usize]).collect();
                let distinct = face
                    .iter()
                    .enumerate()
                    .all(|(k, i)| !face[..k].contains(i));
                if distinct {
                    Some(face)
                } else {
                    dropped += 1;
                    None
                }
            })
            .collect();
        self.vertices = welded;

        let removed = before - self.vertices.len();
        tracing::debug!(removed, dropped_faces = dropped, "Welded mesh vertices");
        removed
    }
}

/// Concatenate bands into one mesh without sharing vertices between bands
pub fn merge_bands(bands: &[MeshBand]) -> Mesh {
    let mut mesh = Mesh::with_capacity(bands.len() * 4, bands.len() * 2);
    for band in bands {
        mesh.add_band(band);
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Point2D, Wall};

    fn band(x1: f64, x2: f64, z0: f64, z1: f64) -> MeshBand {
        MeshBand::new(
            &Wall::plain(Point2D::new(x1, 0.0), Point2D::new(x2, 0.0)),
            z0,
            z1,
        )
    }

    #[test]
    fn test_merge_bands_offsets_faces() {
        let mesh = merge_bands(&[band(0.0, 1.0, 0.0, 3.0), band(1.0, 2.0, 0.0, 3.0)]);

        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.face_count(), 4);
        assert_eq!(mesh.faces[0].as_slice(), &[0, 1, 2]);
        assert_eq!(mesh.faces[2].as_slice(), &[4, 5, 6]);
        assert_eq!(mesh.faces[3].as_slice(), &[6, 5, 7]);
    }

    #[test]
    fn test_merge_keeps_duplicate_vertices() {
        let mut a = merge_bands(&[band(0.0, 1.0, 0.0, 3.0)]);
        let b = merge_bands(&[band(1.0, 2.0, 0.0, 3.0)]);
        a.merge(&b);

        // (1, 0, 0) appears once per band
        let shared = a
            .vertices
            .iter()
            .filter(|v| **v == Point3D::new(1.0, 0.0, 0.0))
            .count();
        assert_eq!(shared, 2);
        assert_eq!(a.faces[3].as_slice(), &[6, 5, 7]);
    }

    #[test]
    fn test_weld_removes_coincident_vertices() {
        let mut mesh = merge_bands(&[band(0.0, 1.0, 0.0, 3.0), band(1.0, 2.0, 0.0, 3.0)]);

        let removed = mesh.weld(1e-6);

        assert_eq!(removed, 2);
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.face_count(), 4);
        assert!(mesh
            .faces
            .iter()
            .all(|f| f.iter().all(|&i| (i as usize) < mesh.vertex_count())));
    }

    #[test]
    fn test_weld_drops_collapsed_faces() {
        let mut mesh = merge_bands(&[band(0.0, 1.0, 1.0, 1.0)]);
        mesh.weld(1e-6);
        assert!(mesh.is_empty());
        assert_eq!(mesh.vertex_count(), 2);
    }

    #[test]
    fn test_bounds() {
        assert!(Mesh::new().bounds().is_none());
        let mesh = merge_bands(&[band(-1.0, 4.0, 0.5, 2.4)]);
        let (lo, hi) = mesh.bounds().unwrap();
        assert_eq!(lo, Point3D::new(-1.0, 0.0, 0.5));
        assert_eq!(hi, Point3D::new(4.0, 0.0, 2.4));
    }
}
