//! Quad ↔ triangle conversion over directories.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::algo::topology::{quad_to_triangles, triangle_to_quad, TrailingFaces};
use crate::error::Result;
use crate::io::persist::{self, BoundaryLedger, LEDGER_FILE_NAME};
use crate::io;
use crate::mesh::ConversionBoundary;

use super::{file_name, list_mesh_files, output_path, run, BatchOptions, BatchReport};

/// Where [`tri_to_quad_dir`] takes each file's boundary from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundarySource {
    /// Every file shares one boundary (frames of one animated mesh).
    Uniform(ConversionBoundary),
    /// Per-file boundaries recorded by [`quad_to_tri_dir`].
    Ledger(BoundaryLedger),
}

impl BoundarySource {
    /// Load the ledger written into a converted directory.
    pub fn from_ledger_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let ledger = persist::load_json(dir.as_ref().join(LEDGER_FILE_NAME))?;
        Ok(BoundarySource::Ledger(ledger))
    }

    /// Boundary for the file named `file`.
    pub fn boundary_for(&self, file: &str) -> Result<ConversionBoundary> {
        match self {
            BoundarySource::Uniform(boundary) => Ok(*boundary),
            BoundarySource::Ledger(ledger) => ledger.get(file),
        }
    }
}

/// Triangulate every mesh in `input_dir` into `output_dir`.
///
/// The boundaries are also written to `output_dir/boundaries.json`, keyed by
/// file name, for [`BoundarySource::from_ledger_dir`].
///
/// # Example
///
/// ```no_run
/// use meshsplice::algo::topology::TrailingFaces;
/// use meshsplice::batch::convert::{quad_to_tri_dir, tri_to_quad_dir, BoundarySource};
/// use meshsplice::batch::BatchOptions;
///
/// let options = BatchOptions::default();
/// quad_to_tri_dir("quads", "tris", TrailingFaces::default(), &options).unwrap();
/// // ... edit the triangle meshes ...
/// let source = BoundarySource::from_ledger_dir("tris").unwrap();
/// tri_to_quad_dir("tris", "quads_out", &source, TrailingFaces::default(), &options).unwrap();
/// ```
pub fn quad_to_tri_dir<P: AsRef<Path>, Q: AsRef<Path>>(
    input_dir: P,
    output_dir: Q,
    trailing: TrailingFaces,
    options: &BatchOptions,
) -> Result<BatchReport<ConversionBoundary>> {
    let output_dir = output_dir.as_ref();
    let inputs = list_mesh_files(input_dir)?;
    fs::create_dir_all(output_dir)?;

    let report = run("quad-to-tri", &inputs, options, |_, path| {
        let mesh = io::load(path)?;
        let split = quad_to_triangles(&mesh, trailing);
        io::save(&split.mesh, output_path(output_dir, path)?)?;
        debug!(path = %path.display(), boundary = %split.boundary, "triangulated");
        Ok(split.boundary)
    })?;

    let mut ledger = BoundaryLedger::new();
    for (path, boundary) in &report.processed {
        ledger.push(file_name(path)?, *boundary);
    }
    persist::save_json(&ledger, output_dir.join(LEDGER_FILE_NAME))?;

    Ok(report)
}

/// Merge every triangle mesh in `input_dir` back into quads in `output_dir`.
pub fn tri_to_quad_dir<P: AsRef<Path>, Q: AsRef<Path>>(
    input_dir: P,
    output_dir: Q,
    source: &BoundarySource,
    trailing: TrailingFaces,
    options: &BatchOptions,
) -> Result<BatchReport> {
    let output_dir = output_dir.as_ref();
    let inputs = list_mesh_files(input_dir)?;
    fs::create_dir_all(output_dir)?;

    run("tri-to-quad", &inputs, options, |_, path| {
        let boundary = source.boundary_for(&file_name(path)?)?;
        let mesh = io::load(path)?;
        let quads = triangle_to_quad(&mesh, boundary, trailing)?;
        io::save(&quads, output_path(output_dir, path)?)
    })
}
