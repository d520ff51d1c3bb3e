//! Mesh file I/O.
//!
//! This module provides the file boundary of the pipeline: meshes, marker
//! files, correspondence tables and persisted index bookkeeping.
//!
//! # Supported Formats
//!
//! | Data | Format | Load | Save |
//! |------|--------|------|------|
//! | Mesh | Wavefront OBJ (`.obj`) | ✓ | ✓ |
//! | Markers | JSON `[[x, y, z], ...]` | ✓ | ✗ |
//! | Correspondence | two-column text, 1-based | ✗ | ✓ |
//! | Boundaries, index maps | JSON | ✓ | ✓ |
//!
//! # Usage
//!
//! ```no_run
//! use meshsplice::io::{load, save};
//!
//! let mesh = load("frame.0001.obj").unwrap();
//! save(&mesh, "copy.obj").unwrap();
//! ```

pub mod markers;
pub mod obj;
pub mod persist;

use std::path::Path;

use crate::error::{MeshError, Result};
use crate::mesh::Mesh;

/// Supported mesh file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Wavefront OBJ format.
    Obj,
}

impl Format {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Format> {
        match ext.to_lowercase().as_str() {
            "obj" => Some(Format::Obj),
            _ => None,
        }
    }

    /// Detect format from file path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Format> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Format::from_extension)
    }
}

fn detect(path: &Path) -> Result<Format> {
    Format::from_path(path).ok_or_else(|| MeshError::UnsupportedFormat {
        extension: path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("(none)")
            .to_string(),
    })
}

/// Load a mesh from a file with automatic format detection.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Mesh> {
    let path = path.as_ref();
    match detect(path)? {
        Format::Obj => obj::load(path),
    }
}

/// Save a mesh to a file with automatic format detection.
pub fn save<P: AsRef<Path>>(mesh: &Mesh, path: P) -> Result<()> {
    let path = path.as_ref();
    match detect(path)? {
        Format::Obj => obj::save(mesh, path),
    }
}
