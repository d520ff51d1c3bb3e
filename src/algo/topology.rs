//! Reversible quad/triangle conversion.
//!
//! Retopology and animation tools downstream of this crate want triangles,
//! while the final assets are quads. [`quad_to_triangles`] splits every quad
//! along its `v0-v2` diagonal and records a [`ConversionBoundary`];
//! [`triangle_to_quad`] uses that boundary to merge the pairs back.
//!
//! # Face order after splitting
//!
//! ```text
//! [ t0 t1 | t2 t3 | ... | t(b-2) t(b-1) ][ original triangles ]
//!   quad 0  quad 1        quad b/2-1      ^ boundary b
//! ```
//!
//! How the original triangles follow the boundary is selected by
//! [`TrailingFaces`].
//!
//! # Example
//!
//! ```
//! use meshsplice::algo::topology::{quad_to_triangles, triangle_to_quad, TrailingFaces};
//! use meshsplice::mesh::Mesh;
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let quads = Mesh::from_index_lists(vertices, &[vec![0, 1, 2, 3]]).unwrap();
//!
//! let split = quad_to_triangles(&quads, TrailingFaces::default());
//! assert_eq!(split.boundary.get(), 2);
//!
//! let merged = triangle_to_quad(&split.mesh, split.boundary, TrailingFaces::default()).unwrap();
//! assert_eq!(merged, quads);
//! ```

use crate::error::{MeshError, Result};
use crate::mesh::{ConversionBoundary, Face, FaceEntry, Mesh};

/// How faces past the conversion boundary are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrailingFaces {
    /// All pass-through triangles share one trailing [`FaceEntry::Group`].
    ///
    /// This is the layout the pipeline's existing converted assets were
    /// produced with, so it stays the default.
    #[default]
    Grouped,
    /// Each pass-through triangle is its own entry.
    Flattened,
}

/// Output of [`quad_to_triangles`].
#[derive(Debug, Clone, PartialEq)]
pub struct Triangulated {
    /// Triangulated mesh, vertices unchanged.
    pub mesh: Mesh,
    /// Number of quad-derived triangles at the head of the face sequence.
    pub boundary: ConversionBoundary,
}

/// Split every quad into two triangles, deferring existing triangles.
///
/// Quad `[v0, v1, v2, v3]` becomes `[v0, v1, v2]` followed by `[v0, v2, v3]`.
/// No shape heuristic picks the diagonal; the fixed split is what makes the
/// conversion invertible. Triangles already in the mesh (including members of
/// an existing group) are moved past the boundary in their original order.
pub fn quad_to_triangles(mesh: &Mesh, trailing: TrailingFaces) -> Triangulated {
    let mut generated: Vec<FaceEntry> = Vec::with_capacity(mesh.num_faces() * 2);
    let mut deferred: Vec<Face> = Vec::new();

    for face in mesh.iter_faces() {
        match *face {
            Face::Quad([v0, v1, v2, v3]) => {
                generated.push(Face::Triangle([v0, v1, v2]).into());
                generated.push(Face::Triangle([v0, v2, v3]).into());
            }
            Face::Triangle(_) => deferred.push(*face),
        }
    }

    let boundary = ConversionBoundary::from_quad_count(generated.len() / 2);

    let mut faces = generated;
    append_trailing(&mut faces, deferred, trailing);

    Triangulated {
        mesh: Mesh {
            vertices: mesh.vertices.clone(),
            faces,
        },
        boundary,
    }
}

/// Merge triangle pairs before `boundary` back into quads.
///
/// Entries `i` and `i + 1` (for even `i < boundary`) become
/// `[t_i[0], t_i[1], t_i[2], t_{i+1}[2]]`. The pair is trusted to come from
/// [`quad_to_triangles`]; an unrelated pair yields a wrong quad without error.
///
/// # Errors
///
/// - [`MeshError::BoundaryOutOfRange`] if `boundary` exceeds the entry count.
/// - [`MeshError::NotATriangle`] if an entry before `boundary` is not a
///   single triangle.
pub fn triangle_to_quad(mesh: &Mesh, boundary: ConversionBoundary, trailing: TrailingFaces) -> Result<Mesh> {
    let b = boundary.get();
    if b > mesh.num_entries() {
        return Err(MeshError::BoundaryOutOfRange {
            boundary: b,
            faces: mesh.num_entries(),
        });
    }

    let triangle_at = |i: usize| -> Result<[usize; 3]> {
        match mesh.faces[i] {
            FaceEntry::Face(Face::Triangle(t)) => Ok(t),
            _ => Err(MeshError::NotATriangle { face: i }),
        }
    };

    let mut faces: Vec<FaceEntry> = Vec::with_capacity(boundary.quad_count() + 1);
    for i in (0..b).step_by(2) {
        let first = triangle_at(i)?;
        let second = triangle_at(i + 1)?;
        faces.push(Face::Quad([first[0], first[1], first[2], second[2]]).into());
    }

    let rest: Vec<Face> = mesh.faces[b..]
        .iter()
        .flat_map(|entry| entry.faces().iter().copied())
        .collect();
    append_trailing(&mut faces, rest, trailing);

    Ok(Mesh {
        vertices: mesh.vertices.clone(),
        faces,
    })
}

fn append_trailing(faces: &mut Vec<FaceEntry>, rest: Vec<Face>, trailing: TrailingFaces) {
    if rest.is_empty() {
        return;
    }
    match trailing {
        TrailingFaces::Grouped => faces.push(FaceEntry::Group(rest)),
        TrailingFaces::Flattened => faces.extend(rest.into_iter().map(FaceEntry::Face)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn grid_vertices(n: usize) -> Vec<Point3<f64>> {
        (0..n).map(|i| Point3::new(i as f64, (i * i) as f64, 0.5 * i as f64)).collect()
    }

    fn mixed_mesh() -> Mesh {
        Mesh::from_index_lists(grid_vertices(8), &[vec![0, 1, 2, 3], vec![4, 5, 6]]).unwrap()
    }

    fn pure_quads() -> Mesh {
        Mesh::from_index_lists(
            grid_vertices(8),
            &[vec![0, 1, 2, 3], vec![1, 4, 5, 2], vec![3, 2, 6, 7]],
        )
        .unwrap()
    }

    fn tri(a: usize, b: usize, c: usize) -> FaceEntry {
        FaceEntry::Face(Face::Triangle([a, b, c]))
    }

    #[test]
    fn test_default_is_grouped() {
        assert_eq!(TrailingFaces::default(), TrailingFaces::Grouped);
    }

    #[test]
    fn test_split_example() {
        // 1-based [[1,2,3,4],[5,6,7]] is 0-based [[0,1,2,3],[4,5,6]].
        let split = quad_to_triangles(&mixed_mesh(), TrailingFaces::Grouped);

        assert_eq!(split.boundary.get(), 2);
        assert_eq!(
            split.mesh.faces,
            vec![
                tri(0, 1, 2),
                tri(0, 2, 3),
                FaceEntry::Group(vec![Face::Triangle([4, 5, 6])]),
            ]
        );
        assert_eq!(split.mesh.vertices, mixed_mesh().vertices);
    }

    #[test]
    fn test_split_flattened() {
        let split = quad_to_triangles(&mixed_mesh(), TrailingFaces::Flattened);
        assert_eq!(split.boundary.get(), 2);
        assert_eq!(split.mesh.faces, vec![tri(0, 1, 2), tri(0, 2, 3), tri(4, 5, 6)]);
    }

    #[test]
    fn test_split_defers_triangles_in_order() {
        let mesh = Mesh::from_index_lists(
            grid_vertices(8),
            &[vec![5, 6, 7], vec![0, 1, 2, 3], vec![4, 5, 6]],
        )
        .unwrap();
        let split = quad_to_triangles(&mesh, TrailingFaces::Grouped);
        assert_eq!(split.boundary.get(), 2);
        assert_eq!(
            split.mesh.faces[2],
            FaceEntry::Group(vec![Face::Triangle([5, 6, 7]), Face::Triangle([4, 5, 6])])
        );
    }

    #[test]
    fn test_pure_quads_have_no_trailing_entry() {
        let split = quad_to_triangles(&pure_quads(), TrailingFaces::Grouped);
        assert_eq!(split.boundary.get(), 6);
        assert_eq!(split.mesh.num_entries(), 6);
        assert!(!split.mesh.has_groups());
    }

    #[test]
    fn test_merge_example() {
        let mesh = Mesh {
            vertices: grid_vertices(4),
            faces: vec![tri(0, 1, 2), tri(0, 2, 3)],
        };
        let boundary = ConversionBoundary::new(2).unwrap();
        let merged = triangle_to_quad(&mesh, boundary, TrailingFaces::Grouped).unwrap();
        assert_eq!(merged.faces, vec![FaceEntry::Face(Face::Quad([0, 1, 2, 3]))]);
    }

    #[test]
    fn test_roundtrip_pure_quads_both_modes() {
        let original = pure_quads();
        for mode in [TrailingFaces::Grouped, TrailingFaces::Flattened] {
            let split = quad_to_triangles(&original, mode);
            let merged = triangle_to_quad(&split.mesh, split.boundary, mode).unwrap();
            assert_eq!(merged, original);
        }
    }

    #[test]
    fn test_roundtrip_mixed_grouped() {
        let original = mixed_mesh();
        let split = quad_to_triangles(&original, TrailingFaces::Grouped);
        let merged = triangle_to_quad(&split.mesh, split.boundary, TrailingFaces::Grouped).unwrap();

        assert_eq!(merged.vertices, original.vertices);
        assert_eq!(
            merged.faces,
            vec![
                FaceEntry::Face(Face::Quad([0, 1, 2, 3])),
                FaceEntry::Group(vec![Face::Triangle([4, 5, 6])]),
            ]
        );
    }

    #[test]
    fn test_roundtrip_mixed_flattened_is_exact() {
        let original = mixed_mesh();
        let split = quad_to_triangles(&original, TrailingFaces::Flattened);
        let merged = triangle_to_quad(&split.mesh, split.boundary, TrailingFaces::Flattened).unwrap();
        assert_eq!(merged, original);
    }

    #[test]
    fn test_merge_after_flat_reload() {
        // A grouped split written to disk comes back flat; the boundary still
        // identifies the pairs.
        let split = quad_to_triangles(&mixed_mesh(), TrailingFaces::Grouped);
        let flat = Mesh::from_faces(split.mesh.vertices.clone(), split.mesh.iter_faces().copied().collect());
        let merged = triangle_to_quad(&flat, split.boundary, TrailingFaces::Flattened).unwrap();
        assert_eq!(merged, mixed_mesh());
    }

    #[test]
    fn test_boundary_out_of_range() {
        let mesh = Mesh {
            vertices: grid_vertices(4),
            faces: vec![tri(0, 1, 2), tri(0, 2, 3)],
        };
        let boundary = ConversionBoundary::new(4).unwrap();
        assert!(matches!(
            triangle_to_quad(&mesh, boundary, TrailingFaces::Grouped),
            Err(MeshError::BoundaryOutOfRange { boundary: 4, faces: 2 })
        ));
    }

    #[test]
    fn test_group_before_boundary_rejected() {
        let split = quad_to_triangles(&mixed_mesh(), TrailingFaces::Grouped);
        // Boundary 4 would pair the trailing group as if it were a triangle.
        let mut mesh = split.mesh.clone();
        mesh.faces.push(tri(0, 1, 2));
        let boundary = ConversionBoundary::new(4).unwrap();
        assert!(matches!(
            triangle_to_quad(&mesh, boundary, TrailingFaces::Grouped),
            Err(MeshError::NotATriangle { face: 2 })
        ));
    }

    #[test]
    fn test_zero_boundary_passes_everything_through() {
        let mesh = Mesh {
            vertices: grid_vertices(4),
            faces: vec![tri(0, 1, 2), tri(0, 2, 3)],
        };
        let boundary = ConversionBoundary::new(0).unwrap();
        let out = triangle_to_quad(&mesh, boundary, TrailingFaces::Flattened).unwrap();
        assert_eq!(out, mesh);
    }
}
