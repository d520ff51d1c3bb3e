//! Retargeting pipeline stages.
//!
//! - **Topology**: quad ↔ triangle conversion with a recorded boundary
//! - **Correspondence**: marker-to-vertex lookup and exact index maps
//! - **Splice**: cut a region out of a full mesh and write it back
//! - **Align**: similarity alignment from a subset of vertices
//! - **Normalize**: scale and center
//!
//! Every stage works on in-memory meshes and is free of I/O; the
//! [`batch`](crate::batch) module drives them over directories.

pub mod align;
pub mod correspond;
pub mod normalize;
pub mod splice;
pub mod topology;
