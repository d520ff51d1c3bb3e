//! # meshsplice
//!
//! Mesh bookkeeping for facial-animation retargeting pipelines.
//!
//! A retargeting pipeline moves a character's face through tools that each
//! want something slightly different: triangles instead of quads, only the
//! face instead of the whole head, a mesh in the reference pose instead of
//! wherever the scan ended up. meshsplice does those conversions while
//! keeping vertex identity intact, so every frame of an animation can be
//! processed with indices computed once.
//!
//! ## Features
//!
//! - **Reversible triangulation**: quad → triangle with a recorded boundary,
//!   and back
//! - **Correspondence**: marker files to vertex indices, exact sub-mesh to
//!   super-mesh index maps
//! - **Region splicing**: cut a face out of a head, write edited faces back
//! - **Alignment**: similarity transform from a fixed or random vertex subset
//! - **Batch drivers**: run any stage over a directory of frames, in parallel
//!
//! ## Quick Start
//!
//! ```no_run
//! use meshsplice::prelude::*;
//!
//! let head = meshsplice::io::load("neutral_head.obj").unwrap();
//! let face = meshsplice::io::load("neutral_face.obj").unwrap();
//!
//! // Which head vertex is each face vertex?
//! let map = resolve_exact_indices(&head.vertices, &face.vertices, DEFAULT_EXACT_TOLERANCE).unwrap();
//!
//! // Write an animated face frame back into the head.
//! let frame = meshsplice::io::load("face.0001.obj").unwrap();
//! let spliced = splice_region(&head, &frame.vertices, &map).unwrap();
//! meshsplice::io::save(&spliced, "head.0001.obj").unwrap();
//! ```
//!
//! ## Round-tripping Topology
//!
//! ```
//! use meshsplice::prelude::*;
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//!     Point3::new(2.0, 0.0, 0.0),
//! ];
//! let mesh = Mesh::from_index_lists(vertices, &[vec![0, 1, 2, 3], vec![1, 4, 2]]).unwrap();
//!
//! let split = quad_to_triangles(&mesh, TrailingFaces::Flattened);
//! assert_eq!(split.boundary.get(), 2);
//! assert_eq!(split.mesh.face_counts(), (3, 0));
//!
//! let back = triangle_to_quad(&split.mesh, split.boundary, TrailingFaces::Flattened).unwrap();
//! assert_eq!(back, mesh);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod batch;
pub mod error;
pub mod io;
pub mod mesh;

/// Prelude module for convenient imports.
///
/// ```
/// use meshsplice::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::align::{
        align_with_point_subset, Alignment, PointSelection, Similarity, SimilaritySolver,
        UmeyamaSolver,
    };
    pub use crate::algo::correspond::{
        nearest_index, resolve_exact_indices, resolve_marker_indices, ResolveOptions,
        DEFAULT_EXACT_TOLERANCE,
    };
    pub use crate::algo::normalize::normalize;
    pub use crate::algo::splice::{extract_region, splice_region};
    pub use crate::algo::topology::{quad_to_triangles, triangle_to_quad, TrailingFaces};
    pub use crate::error::{MeshError, Result};
    pub use crate::mesh::{ConversionBoundary, Face, FaceEntry, IndexBase, IndexMap, Mesh};
}

// Re-export nalgebra types for convenience
pub use nalgebra;

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use nalgebra::Point3;

    /// Triangulate, cut the face out, edit it, splice it back, restore quads.
    #[test]
    fn test_pipeline_end_to_end() {
        let vertices: Vec<Point3<f64>> = (0..6)
            .map(|i| Point3::new(i as f64, (i % 2) as f64, 0.0))
            .collect();
        let head = Mesh::from_index_lists(vertices, &[vec![0, 1, 3, 2], vec![2, 3, 5, 4]]).unwrap();

        let split = quad_to_triangles(&head, TrailingFaces::default());
        let face_vertices = vec![head.vertices[4], head.vertices[5]];
        let map = resolve_exact_indices(&split.mesh.vertices, &face_vertices, DEFAULT_EXACT_TOLERANCE)
            .unwrap();
        assert_eq!(map.indices(), &[4, 5]);

        let lifted: Vec<Point3<f64>> = extract_region(&split.mesh.vertices, &map)
            .unwrap()
            .iter()
            .map(|p| p + nalgebra::Vector3::new(0.0, 0.0, 1.0))
            .collect();
        let spliced = splice_region(&split.mesh, &lifted, &map).unwrap();

        let restored = triangle_to_quad(&spliced, split.boundary, TrailingFaces::default()).unwrap();
        assert_eq!(restored.faces, head.faces);
        assert_eq!(restored.vertices[4].z, 1.0);
        assert_eq!(restored.vertices[0], head.vertices[0]);
    }
}
