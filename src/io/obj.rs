//! Wavefront OBJ support.
//!
//! Only what the animation pipeline needs: `v` positions and `f` faces with 3
//! or 4 vertices. Texture coordinates, normals, groups and materials are
//! skipped. Vertex order is kept exactly as in the file since vertex indices
//! are shared across every frame of a sequence.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use nalgebra::Point3;
use tracing::debug;

use crate::error::{MeshError, Result};
use crate::mesh::{Face, Mesh};

/// Load a mesh from an OBJ file.
///
/// Face indices are converted from 1-based to 0-based.
///
/// # Example
///
/// ```no_run
/// use meshsplice::io::obj;
///
/// let mesh = obj::load("head.obj").unwrap();
/// println!("{} vertices", mesh.num_vertices());
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<Mesh> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => MeshError::NotFound {
            path: path.to_path_buf(),
        },
        _ => MeshError::Io(e),
    })?;
    let mesh = read(BufReader::new(file), path)?;
    debug!(
        path = %path.display(),
        vertices = mesh.num_vertices(),
        faces = mesh.num_faces(),
        "loaded OBJ"
    );
    Ok(mesh)
}

/// Parse OBJ text from any reader. `path` labels errors.
pub fn read<R: BufRead>(reader: R, path: &Path) -> Result<Mesh> {
    let mut vertices: Vec<Point3<f64>> = Vec::new();
    let mut faces: Vec<Face> = Vec::new();

    let parse_err = |line: usize, message: String| MeshError::Parse {
        path: path.to_path_buf(),
        line,
        message,
    };

    // Exporters write comments and names in local encodings; only `v` and
    // `f` lines have to be UTF-8.
    for (line_no, bytes) in reader.split(b'\n').enumerate() {
        let bytes = bytes?;
        let line_no = line_no + 1;
        let line = String::from_utf8_lossy(&bytes);
        let mut tokens = line.split_whitespace();
        let keyword = tokens.next();

        if matches!(keyword, Some("v") | Some("f")) && std::str::from_utf8(&bytes).is_err() {
            return Err(parse_err(line_no, "line is not valid UTF-8".into()));
        }

        match keyword {
            Some("v") => {
                let mut coords = [0.0f64; 3];
                for c in coords.iter_mut() {
                    let token = tokens
                        .next()
                        .ok_or_else(|| parse_err(line_no, "vertex has fewer than 3 coordinates".into()))?;
                    *c = token
                        .parse()
                        .map_err(|_| parse_err(line_no, format!("invalid coordinate '{}'", token)))?;
                }
                vertices.push(Point3::new(coords[0], coords[1], coords[2]));
            }
            Some("f") => {
                let indices = tokens
                    .map(|token| parse_face_index(token).ok_or_else(|| {
                        parse_err(line_no, format!("invalid face index '{}'", token))
                    }))
                    .collect::<Result<Vec<usize>>>()?;
                let face = Face::from_indices(&indices, faces.len())
                    .map_err(|e| parse_err(line_no, e.to_string()))?;
                faces.push(face);
            }
            // vt, vn, o, g, s, usemtl, comments, blank lines
            _ => {}
        }
    }

    let mesh = Mesh::from_faces(vertices, faces);
    mesh.validate()?;
    Ok(mesh)
}

/// Parse the vertex part of an `f` token (`7`, `7/2`, `7//3`, `7/2/3`) into a
/// 0-based index.
fn parse_face_index(token: &str) -> Option<usize> {
    let vertex = token.split('/').next()?;
    let one_based: usize = vertex.parse().ok()?;
    one_based.checked_sub(1)
}

/// Save a mesh to an OBJ file.
///
/// Grouped trailing faces are written as ordinary `f` lines.
///
/// # Example
///
/// ```no_run
/// use meshsplice::io::obj;
/// use meshsplice::mesh::Mesh;
///
/// let mesh = Mesh::new();
/// obj::save(&mesh, "out.obj").unwrap();
/// ```
pub fn save<P: AsRef<Path>>(mesh: &Mesh, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write(mesh, &mut writer)?;
    writer.flush()?;
    debug!(
        path = %path.display(),
        vertices = mesh.num_vertices(),
        faces = mesh.num_faces(),
        "saved OBJ"
    );
    Ok(())
}

/// Write OBJ text to any writer.
pub fn write<W: Write>(mesh: &Mesh, writer: &mut W) -> Result<()> {
    for v in &mesh.vertices {
        writeln!(writer, "v {} {} {}", v.x, v.y, v.z)?;
    }
    for face in mesh.iter_faces() {
        match face {
            Face::Triangle([a, b, c]) => writeln!(writer, "f {} {} {}", a + 1, b + 1, c + 1)?,
            Face::Quad([a, b, c, d]) => {
                writeln!(writer, "f {} {} {} {}", a + 1, b + 1, c + 1, d + 1)?
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::FaceEntry;
    use std::io::Cursor;

    fn parse(text: &str) -> Result<Mesh> {
        read(Cursor::new(text), Path::new("test.obj"))
    }

    #[test]
    fn test_parse_quad_and_triangle() {
        let mesh = parse(
            "# comment\n\
             v 0 0 0\n\
             v 1 0 0\n\
             v 1 1 0\n\
             v 0 1 0\n\
             vt 0.5 0.5\n\
             vn 0 0 1\n\
             f 1 2 3 4\n\
             f 1 3 2\n",
        )
        .unwrap();

        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(
            mesh.faces,
            vec![
                FaceEntry::Face(Face::Quad([0, 1, 2, 3])),
                FaceEntry::Face(Face::Triangle([0, 2, 1])),
            ]
        );
    }

    #[test]
    fn test_parse_slash_tokens() {
        let mesh = parse(
            "v 0 0 0\nv 1 0 0\nv 0 1 0\n\
             f 1/1/1 2/2/1 3/3/1\n\
             f 3//2 2//2 1//2\n",
        )
        .unwrap();
        assert_eq!(mesh.faces[0], FaceEntry::Face(Face::Triangle([0, 1, 2])));
        assert_eq!(mesh.faces[1], FaceEntry::Face(Face::Triangle([2, 1, 0])));
    }

    #[test]
    fn test_vt_vn_not_vertices() {
        let mesh = parse("v 1 2 3\nvt 4 5\nvn 0 0 1\n").unwrap();
        assert_eq!(mesh.vertices, vec![Point3::new(1.0, 2.0, 3.0)]);
    }

    #[test]
    fn test_zero_index_is_format_error() {
        let err = parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 0 1 2\n").unwrap_err();
        assert!(matches!(err, MeshError::Parse { line: 4, .. }));
    }

    #[test]
    fn test_pentagon_rejected() {
        let text = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nv 0 2 0\nf 1 2 3 4 5\n";
        assert!(matches!(parse(text), Err(MeshError::Parse { line: 6, .. })));
    }

    #[test]
    fn test_non_utf8_comment_ignored() {
        let bytes: &[u8] = b"# \xB5\xBC\xB3\xF6\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        let mesh = read(Cursor::new(bytes), Path::new("gbk.obj")).unwrap();
        assert_eq!(mesh.num_vertices(), 3);
        assert_eq!(mesh.faces, vec![FaceEntry::Face(Face::Triangle([0, 1, 2]))]);
    }

    #[test]
    fn test_non_utf8_vertex_is_format_error() {
        let bytes: &[u8] = b"v 0 0 0\nv 1 \xB5 0\n";
        let err = read(Cursor::new(bytes), Path::new("bad.obj")).unwrap_err();
        assert!(matches!(err, MeshError::Parse { line: 2, .. }));
        assert!(err.is_skippable());
    }

    #[test]
    fn test_bad_coordinate() {
        assert!(matches!(parse("v 0 x 0\n"), Err(MeshError::Parse { line: 1, .. })));
    }

    #[test]
    fn test_face_past_vertices() {
        let err = parse("v 0 0 0\nf 1 2 3\n").unwrap_err();
        assert!(matches!(err, MeshError::InvalidVertexIndex { .. }));
    }

    #[test]
    fn test_write_is_one_based() {
        let mesh = Mesh::from_faces(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.5, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![Face::Quad([0, 1, 2, 3]), Face::Triangle([0, 1, 2])],
        );
        let mut out = Vec::new();
        write(&mesh, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "v 0 0 0\nv 1.5 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\nf 1 2 3\n"
        );
    }

    #[test]
    fn test_write_read_preserves_precision() {
        let mesh = Mesh::from_faces(
            vec![
                Point3::new(0.1234567890123, -2.5e-7, 1.0 / 3.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![Face::Triangle([0, 1, 2])],
        );
        let mut out = Vec::new();
        write(&mesh, &mut out).unwrap();
        let back = read(Cursor::new(out), Path::new("mem.obj")).unwrap();
        assert_eq!(back, mesh);
    }

    #[test]
    fn test_groups_written_flat() {
        let mut mesh = Mesh::from_faces(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![],
        );
        mesh.faces.push(FaceEntry::Group(vec![
            Face::Triangle([0, 1, 2]),
            Face::Triangle([2, 1, 0]),
        ]));
        let mut out = Vec::new();
        write(&mesh, &mut out).unwrap();
        let back = read(Cursor::new(out), Path::new("mem.obj")).unwrap();
        assert_eq!(back.num_entries(), 2);
        assert!(!back.has_groups());
    }

    #[test]
    fn test_load_missing_file() {
        let err = load("/definitely/not/here.obj").unwrap_err();
        assert!(matches!(err, MeshError::NotFound { .. }));
    }
}
