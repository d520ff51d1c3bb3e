//! Region extraction and splicing over directories.

use std::fs;
use std::path::Path;

use crate::algo::splice::{extract_region_mesh, splice_region};
use crate::error::Result;
use crate::io;
use crate::mesh::{Face, IndexMap, Mesh};

use super::{list_mesh_files, output_path, run, BatchOptions, BatchReport};

/// Cut the region out of every full mesh in `input_dir`.
///
/// Each output mesh gets `region_faces`, which index region vertices.
pub fn extract_dir<P: AsRef<Path>, Q: AsRef<Path>>(
    input_dir: P,
    output_dir: Q,
    map: &IndexMap,
    region_faces: &[Face],
    options: &BatchOptions,
) -> Result<BatchReport> {
    let output_dir = output_dir.as_ref();
    let inputs = list_mesh_files(input_dir)?;
    fs::create_dir_all(output_dir)?;

    run("extract", &inputs, options, |_, path| {
        let full = io::load(path)?;
        let region = extract_region_mesh(&full, map, region_faces)?;
        io::save(&region, output_path(output_dir, path)?)
    })
}

/// Write every region mesh in `input_dir` into a copy of `base`.
///
/// Only vertex positions are taken from the region files; faces come from
/// `base`.
pub fn splice_dir<P: AsRef<Path>, Q: AsRef<Path>>(
    input_dir: P,
    output_dir: Q,
    base: &Mesh,
    map: &IndexMap,
    options: &BatchOptions,
) -> Result<BatchReport> {
    let output_dir = output_dir.as_ref();
    let inputs = list_mesh_files(input_dir)?;
    fs::create_dir_all(output_dir)?;

    run("splice", &inputs, options, |_, path| {
        let region = io::load(path)?;
        let full = splice_region(base, &region.vertices, map)?;
        io::save(&full, output_path(output_dir, path)?)
    })
}
