//! Mesh output formats

use meshgen_core::{Error, Result, TriangleMesh};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

/// Supported mesh output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MeshFormat {
    /// Wavefront OBJ: `v` rows, then `f` rows with 1-based indices
    #[default]
    Obj,
    /// One `i j k` row of 0-based point indices per triangle
    TriangleList,
}

impl MeshFormat {
    /// Guess the format from a file extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        match path.as_ref().extension().and_then(|s| s.to_str()) {
            Some("obj") => Some(MeshFormat::Obj),
            Some("tri") | Some("txt") => Some(MeshFormat::TriangleList),
            _ => None,
        }
    }
}

impl FromStr for MeshFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "obj" => Ok(MeshFormat::Obj),
            "tri" | "triangles" => Ok(MeshFormat::TriangleList),
            other => Err(Error::Parse(format!("unknown mesh format {:?}", other))),
        }
    }
}

/// Write vertices and 1-based faces as OBJ
pub fn write_obj<W: Write>(mesh: &TriangleMesh, writer: W) -> Result<()> {
    let mut writer = BufWriter::new(writer);
    writeln!(
        writer,
        "# {} vertices, {} faces",
        mesh.vertex_count(),
        mesh.face_count()
    )?;
    for v in mesh.vertices() {
        writeln!(writer, "v {} {} {}", v.x, v.y, v.z)?;
    }
    for facet in mesh.facets() {
        let [a, b, c] = facet.indices();
        writeln!(writer, "f {} {} {}", a + 1, b + 1, c + 1)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the 0-based index triples, one triangle per row
pub fn write_triangle_list<W: Write>(mesh: &TriangleMesh, writer: W) -> Result<()> {
    let mut writer = BufWriter::new(writer);
    for facet in mesh.facets() {
        let [a, b, c] = facet.indices();
        writeln!(writer, "{}\t{}\t{}", a, b, c)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write `mesh` in the given format
pub fn write_mesh<W: Write>(mesh: &TriangleMesh, format: MeshFormat, writer: W) -> Result<()> {
    match format {
        MeshFormat::Obj => write_obj(mesh, writer),
        MeshFormat::TriangleList => write_triangle_list(mesh, writer),
    }
}

/// Write `mesh` to a file in the given format
pub fn write_mesh_file<P: AsRef<Path>>(
    mesh: &TriangleMesh,
    format: MeshFormat,
    path: P,
) -> Result<()> {
    write_mesh(mesh, format, File::create(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshgen_core::{Facet, Point3d, PointCloud};
    use tempfile::tempdir;

    fn triangle() -> TriangleMesh {
        let cloud = PointCloud::from_points(vec![
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(1.0, 0.0, 0.0),
            Point3d::new(0.0, 1.5, 0.0),
        ]);
        TriangleMesh::new(cloud, vec![Facet::new(0, 1, 2)]).unwrap()
    }

    #[test]
    fn test_obj_faces_are_one_based() {
        let mut out = Vec::new();
        write_obj(&triangle(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "# 3 vertices, 1 faces");
        assert_eq!(lines[3], "v 0 1.5 0");
        assert_eq!(lines[4], "f 1 2 3");
    }

    #[test]
    fn test_triangle_list() {
        let mut out = Vec::new();
        write_mesh(&triangle(), MeshFormat::TriangleList, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "0\t1\t2\n");
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("OBJ".parse::<MeshFormat>().unwrap(), MeshFormat::Obj);
        assert_eq!("tri".parse::<MeshFormat>().unwrap(), MeshFormat::TriangleList);
        assert!("stl".parse::<MeshFormat>().is_err());
        assert_eq!(MeshFormat::from_path("out/mesh.obj"), Some(MeshFormat::Obj));
        assert_eq!(MeshFormat::from_path("mesh.tri"), Some(MeshFormat::TriangleList));
        assert_eq!(MeshFormat::from_path("mesh"), None);
    }

    #[test]
    fn test_write_mesh_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("triangle.obj");
        write_mesh_file(&triangle(), MeshFormat::Obj, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().filter(|l| l.starts_with("v ")).count(), 3);
        assert_eq!(text.lines().filter(|l| l.starts_with("f ")).count(), 1);
    }
}
