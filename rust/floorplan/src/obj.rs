// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wavefront OBJ/MTL output
//!
//! Coordinates are written as-is (Z-up floor plan frame). Every face corner
//! references one of four fixed texture coordinates, chosen by vertex index
//! modulo 4; for band meshes this maps each band's base/top corners onto the
//! unit square.

use crate::config::MaterialConfig;
use crate::error::{Error, Result};
use crate::mesh::Mesh;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Texture coordinates shared by all faces
pub const UV_QUAD: [(f64, f64); 4] = [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)];

/// Write the mesh as OBJ text referencing `<material_name>.mtl`
pub fn write_obj<W: Write>(mesh: &Mesh, material_name: &str, out: &mut W) -> std::io::Result<()> {
    writeln!(out, "mtllib {}.mtl", material_name)?;

    for v in &mesh.vertices {
        writeln!(out, "v {} {} {}", v.x, v.y, v.z)?;
    }

    for (u, v) in UV_QUAD {
        writeln!(out, "vt {:.1} {:.1}", u, v)?;
    }

    writeln!(out, "usemtl {}", material_name)?;
    for face in &mesh.faces {
        write!(out, "f")?;
        for &i in face {
            write!(out, " {}/{}", i + 1, i % 4 + 1)?;
        }
        writeln!(out)?;
    }

    Ok(())
}

/// Write the companion material with a placeholder diffuse texture
pub fn write_mtl<W: Write>(material_name: &str, texture: &str, out: &mut W) -> std::io::Result<()> {
    writeln!(out, "newmtl {}", material_name)?;
    writeln!(out, "Ka 1.000 1.000 1.000")?;
    writeln!(out, "Kd 1.000 1.000 1.000")?;
    writeln!(out, "Ks 0.000 0.000 0.000")?;
    writeln!(out, "map_Kd {}", texture)?;
    Ok(())
}

/// Save `mesh` to `obj_path` plus a `.mtl` file next to it
///
/// The material is named after the OBJ file stem. Returns the MTL path.
pub fn save_mesh(mesh: &Mesh, obj_path: &Path, material: &MaterialConfig) -> Result<PathBuf> {
    if mesh.is_empty() {
        return Err(Error::EmptyMesh);
    }

    let material_name = obj_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("walls")
        .to_string();
    let mtl_path = obj_path.with_extension("mtl");

    write_file(obj_path, |out| write_obj(mesh, &material_name, out))?;
    write_file(&mtl_path, |out| write_mtl(&material_name, &material.texture, out))?;

    tracing::info!(
        obj = %obj_path.display(),
        mtl = %mtl_path.display(),
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        "Wrote wall mesh"
    );

    Ok(mtl_path)
}

fn write_file<F>(path: &Path, body: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<fs::File>) -> std::io::Result<()>,
{
    let file = fs::File::create(path).map_err(|e| Error::io(path, e))?;
    let mut out = BufWriter::new(file);
    body(&mut out)
        .and_then(|_| out.flush())
        .map_err(|e| Error::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extrude::MeshBand;
    use crate::mesh::merge_bands;
    use crate::types::{Point2D, Wall};

    fn two_band_mesh() -> Mesh {
        let wall = Wall::plain(Point2D::new(0.0, 0.0), Point2D::new(1.0, 0.0));
        merge_bands(&[MeshBand::new(&wall, 0.0, 0.9), MeshBand::new(&wall, 2.0, 2.4)])
    }

    #[test]
    fn test_obj_layout() {
        let mut buf = Vec::new();
        write_obj(&two_band_mesh(), "walls", &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "mtllib walls.mtl");
        assert_eq!(lines.iter().filter(|l| l.starts_with("v ")).count(), 8);
        assert_eq!(lines[1], "v 0 0 0");
        assert_eq!(lines[4], "v 1 0 0.9");
        assert_eq!(&lines[9..13], &["vt 0.0 0.0", "vt 1.0 0.0", "vt 0.0 1.0", "vt 1.0 1.0"]);
        assert_eq!(lines[13], "usemtl walls");
        assert_eq!(lines[14], "f 1/1 2/2 3/3");
        assert_eq!(lines[15], "f 3/3 2/2 4/4");
        assert_eq!(lines[16], "f 5/1 6/2 7/3");
        assert_eq!(lines.len(), 18);
    }

    #[test]
    fn test_mtl_references_texture() {
        let mut buf = Vec::new();
        write_mtl("walls", "door.jpg", &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.starts_with("newmtl walls\n"));
        assert!(text.contains("map_Kd door.jpg"));
    }

    #[test]
    fn test_save_mesh_writes_companion_material() {
        let dir = tempfile::tempdir().unwrap();
        let obj_path = dir.path().join("house.obj");

        let mtl_path = save_mesh(&two_band_mesh(), &obj_path, &MaterialConfig::default()).unwrap();

        assert_eq!(mtl_path, dir.path().join("house.mtl"));
        let obj = fs::read_to_string(&obj_path).unwrap();
        assert!(obj.starts_with("mtllib house.mtl"));
        assert!(obj.contains("usemtl house"));
        let mtl = fs::read_to_string(&mtl_path).unwrap();
        assert!(mtl.contains("newmtl house"));
    }

    #[test]
    fn test_save_empty_mesh_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = save_mesh(&Mesh::new(), &dir.path().join("x.obj"), &MaterialConfig::default());
        assert!(matches!(result, Err(Error::EmptyMesh)));
    }
}
