//! Scale-and-center normalization.

use nalgebra::{Point3, Vector3};

use crate::error::{MeshError, Result};
use crate::mesh::Mesh;

/// Multiply every vertex by `scale`, then move the centroid to the origin.
///
/// An empty slice is returned unchanged.
///
/// # Errors
///
/// [`MeshError::InvalidParameter`] if `scale` is not finite or is zero.
pub fn normalize(vertices: &[Point3<f64>], scale: f64) -> Result<Vec<Point3<f64>>> {
    if !scale.is_finite() || scale == 0.0 {
        return Err(MeshError::invalid_param("scale", scale, "must be finite and non-zero"));
    }
    if vertices.is_empty() {
        return Ok(Vec::new());
    }

    let scaled: Vec<Vector3<f64>> = vertices.iter().map(|p| p.coords * scale).collect();
    let centroid = scaled.iter().sum::<Vector3<f64>>() / scaled.len() as f64;
    Ok(scaled.into_iter().map(|v| Point3::from(v - centroid)).collect())
}

/// [`normalize`] applied to a mesh; faces are kept.
pub fn normalize_mesh(mesh: &Mesh, scale: f64) -> Result<Mesh> {
    Ok(Mesh {
        vertices: normalize(&mesh.vertices, scale)?,
        faces: mesh.faces.clone(),
    })
}
