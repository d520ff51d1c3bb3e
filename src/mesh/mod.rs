//! Core mesh data structures.
//!
//! This module provides the face-vertex mesh used by every pipeline stage
//! and the index types that link stages together.
//!
//! # Overview
//!
//! A [`Mesh`] is a vertex array plus an ordered sequence of [`FaceEntry`]
//! slots, each holding a triangle or quad [`Face`] (or, after a grouped
//! conversion, one trailing group of faces). Vertex identity is position in
//! the vertex array, so meshes of one animation sequence share indices.
//!
//! # Index Bookkeeping
//!
//! - [`ConversionBoundary`] - Undo information for quad-to-triangle conversion
//! - [`IndexMap`] - Sub-mesh to super-mesh vertex correspondence
//! - [`to_one_based`] / [`from_one_based`] - Numbering at file and tool boundaries
//!
//! # Construction
//!
//! ```
//! use meshsplice::mesh::Mesh;
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let mesh = Mesh::from_index_lists(vertices, &[vec![0, 1, 2, 3]]).unwrap();
//! assert_eq!(mesh.face_counts(), (0, 1));
//! ```

mod index;
mod polymesh;

pub use index::{from_one_based, to_one_based, ConversionBoundary, IndexBase, IndexMap};
pub use polymesh::{Face, FaceEntry, Mesh};
