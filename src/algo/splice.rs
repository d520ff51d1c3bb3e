//! Region extraction and splicing by index map.
//!
//! An animation may only drive part of a character (the face), while the
//! final asset is the whole head. With an [`IndexMap`] built once by
//! [`resolve_exact_indices`](crate::algo::correspond::resolve_exact_indices),
//! every frame's region can be cut out of a full mesh and written back into
//! a shared full mesh.

use nalgebra::Point3;

use crate::error::{MeshError, Result};
use crate::mesh::{Face, IndexMap, Mesh};

/// Vertices of the region, in index-map order.
///
/// # Errors
///
/// [`MeshError::ShapeMismatch`] if `vertices` does not have the vertex count
/// the map was built against.
pub fn extract_region(vertices: &[Point3<f64>], map: &IndexMap) -> Result<Vec<Point3<f64>>> {
    map.check_super_mesh(vertices.len())?;
    Ok(map.indices().iter().map(|&i| vertices[i]).collect())
}

/// Region as a standalone mesh with caller-supplied faces.
///
/// Region faces index the region's own vertices and do not change between
/// frames, so they are not derived here.
pub fn extract_region_mesh(full: &Mesh, map: &IndexMap, region_faces: &[Face]) -> Result<Mesh> {
    let vertices = extract_region(&full.vertices, map)?;
    let region = Mesh::from_faces(vertices, region_faces.to_vec());
    region.validate()?;
    Ok(region)
}

/// Copy of `full` with the region's vertices replaced by `sub_vertices`.
///
/// Vertex `map[i]` of the copy becomes `sub_vertices[i]`; all other vertices
/// and all faces are kept.
///
/// # Errors
///
/// [`MeshError::ShapeMismatch`] if `sub_vertices` and `map` differ in length,
/// or `full` is not the shape the map was built against.
///
/// # Example
///
/// ```
/// use meshsplice::algo::splice::{extract_region, splice_region};
/// use meshsplice::mesh::{IndexMap, Mesh};
/// use nalgebra::Point3;
///
/// let head = Mesh::from_faces(
///     vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0), Point3::new(2.0, 2.0, 2.0)],
///     vec![],
/// );
/// let map = IndexMap::new(vec![0, 2], 3).unwrap();
///
/// let face = extract_region(&head.vertices, &map).unwrap();
/// assert_eq!(face, vec![Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 2.0, 2.0)]);
///
/// let edited = vec![Point3::new(9.0, 9.0, 9.0), Point3::new(8.0, 8.0, 8.0)];
/// let spliced = splice_region(&head, &edited, &map).unwrap();
/// assert_eq!(spliced.vertices[1], Point3::new(1.0, 1.0, 1.0));
/// ```
pub fn splice_region(full: &Mesh, sub_vertices: &[Point3<f64>], map: &IndexMap) -> Result<Mesh> {
    if sub_vertices.len() != map.len() {
        return Err(MeshError::shape(
            "region vertices vs index map",
            map.len(),
            sub_vertices.len(),
        ));
    }
    map.check_super_mesh(full.num_vertices())?;

    let mut out = full.clone();
    for (&i, v) in map.indices().iter().zip(sub_vertices) {
        out.vertices[i] = *v;
    }
    Ok(out)
}
