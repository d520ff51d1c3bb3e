//! JSON persistence for index bookkeeping.
//!
//! Conversion boundaries and index maps are computed once and reused across
//! whole animation sequences, so they are written next to the meshes they
//! belong to.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MeshError, Result};
use crate::mesh::ConversionBoundary;

/// Default ledger file name inside a converted directory.
pub const LEDGER_FILE_NAME: &str = "boundaries.json";

/// One converted file and its boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// File name (no directory).
    pub file: String,
    /// Boundary produced when converting that file.
    pub boundary: ConversionBoundary,
}

/// Conversion boundaries of a batch, in processing order.
///
/// Entries carry their file name so the inverse conversion can look them up
/// by name rather than by position.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BoundaryLedger {
    entries: Vec<LedgerEntry>,
}

impl BoundaryLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a file's boundary.
    pub fn push(&mut self, file: impl Into<String>, boundary: ConversionBoundary) {
        self.entries.push(LedgerEntry {
            file: file.into(),
            boundary,
        });
    }

    /// Boundary recorded for `file`.
    pub fn get(&self, file: &str) -> Result<ConversionBoundary> {
        self.entries
            .iter()
            .find(|e| e.file == file)
            .map(|e| e.boundary)
            .ok_or_else(|| MeshError::MissingBoundary {
                name: file.to_string(),
            })
    }

    /// Boundary at a processing position.
    pub fn at(&self, position: usize) -> Option<ConversionBoundary> {
        self.entries.get(position).map(|e| e.boundary)
    }

    /// All entries in order.
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the ledger is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Save any serializable value as pretty JSON.
///
/// # Example
///
/// ```no_run
/// use meshsplice::io::persist;
/// use meshsplice::mesh::IndexMap;
///
/// let map = IndexMap::new(vec![4, 1, 7], 10).unwrap();
/// persist::save_json(&map, "face_index.json").unwrap();
/// let back: IndexMap = persist::load_json("face_index.json").unwrap();
/// assert_eq!(back, map);
/// ```
pub fn save_json<T: Serialize, P: AsRef<Path>>(value: &T, path: P) -> Result<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    debug!(path = %path.display(), "saved JSON");
    Ok(())
}

/// Load a value saved with [`save_json`].
///
/// A missing file is reported as [`MeshError::NotFound`].
pub fn load_json<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => MeshError::NotFound {
            path: path.to_path_buf(),
        },
        _ => MeshError::Io(e),
    })?;
    let value = serde_json::from_reader(BufReader::new(file))?;
    debug!(path = %path.display(), "loaded JSON");
    Ok(value)
}
