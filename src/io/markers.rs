//! Landmark marker files and correspondence tables.
//!
//! Marker files come from the wrapping tool as a JSON array of `[x, y, z]`
//! triples. Correspondence tables go to the deformation-transfer tool as two
//! columns of 1-based vertex indices.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use nalgebra::Point3;
use tracing::debug;

use crate::algo::correspond::CorrespondenceTable;
use crate::error::{MeshError, Result};

/// Load marker points from a JSON file.
///
/// # Example
///
/// ```no_run
/// use meshsplice::io::markers;
///
/// let points = markers::load("neutral-markers.json").unwrap();
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<Vec<Point3<f64>>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => MeshError::NotFound {
            path: path.to_path_buf(),
        },
        _ => MeshError::Io(e),
    })?;
    let reader = BufReader::new(file);
    let raw: Vec<[f64; 3]> = serde_json::from_reader(reader)?;
    debug!(path = %path.display(), markers = raw.len(), "loaded markers");
    Ok(raw.into_iter().map(Point3::from).collect())
}

/// Parse marker points from a JSON string.
pub fn from_json(text: &str) -> Result<Vec<Point3<f64>>> {
    let raw: Vec<[f64; 3]> = serde_json::from_str(text)?;
    Ok(raw.into_iter().map(Point3::from).collect())
}

/// Write a correspondence table as `source target` rows.
pub fn write_table<W: Write>(table: &CorrespondenceTable, writer: &mut W) -> Result<()> {
    writeln!(writer, "# source target (1-based)")?;
    for (source, target) in table.rows() {
        writeln!(writer, "{} {}", source, target)?;
    }
    Ok(())
}

/// Save a correspondence table to a text file.
pub fn save_table<P: AsRef<Path>>(table: &CorrespondenceTable, path: P) -> Result<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    write_table(table, &mut writer)?;
    writer.flush()?;
    debug!(path = %path.display(), rows = table.len(), "saved correspondence table");
    Ok(())
}
