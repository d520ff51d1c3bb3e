//! Error types for meshsplice.
//!
//! Every failure is a [`MeshError`]. [`MeshError::kind`] sorts variants into
//! the four families the batch runner cares about: malformed input, missing
//! input, failed correspondence, and inconsistent shapes.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Coarse classification of a [`MeshError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input has the wrong extension or cannot be parsed.
    Format,
    /// A referenced file or persisted artifact does not exist.
    NotFound,
    /// A query point could not be matched to a mesh vertex.
    Correspondence,
    /// Lengths, counts or boundaries disagree with each other.
    ShapeMismatch,
    /// Anything else (I/O failures, bad parameters, solver failures).
    Other,
}

/// Errors that can occur during mesh operations.
#[derive(Error, Debug)]
pub enum MeshError {
    /// The mesh has no vertices.
    #[error("mesh has no vertices")]
    EmptyMesh,

    /// Unsupported file format.
    #[error("unsupported file format: {extension}")]
    UnsupportedFormat {
        /// The file extension.
        extension: String,
    },

    /// A line of a mesh file could not be parsed.
    #[error("failed to parse {path} at line {line}: {message}")]
    Parse {
        /// The file path.
        path: PathBuf,
        /// 1-based line number.
        line: usize,
        /// Error message.
        message: String,
    },

    /// A face has neither 3 nor 4 vertex indices.
    #[error("face {face} has {arity} vertices (only triangles and quads are supported)")]
    InvalidFaceArity {
        /// The face index.
        face: usize,
        /// Number of vertex indices found.
        arity: usize,
    },

    /// A face references an invalid vertex index.
    #[error("face {face} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The face index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// Malformed JSON in a marker or persistence file.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A referenced file does not exist.
    #[error("file not found: {path}")]
    NotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// No mesh vertex lies within tolerance of a query point.
    #[error(
        "query point {query} has no vertex within tolerance {tolerance} \
         (closest is vertex {nearest} at squared distance {distance_sq})"
    )]
    CorrespondenceNotFound {
        /// Position of the query point.
        query: usize,
        /// Closest vertex found.
        nearest: usize,
        /// Squared distance to that vertex.
        distance_sq: f64,
        /// Squared-distance tolerance.
        tolerance: f64,
    },

    /// Two query points resolved to the same mesh vertex.
    #[error("query points {first} and {second} both resolve to vertex {vertex}")]
    DuplicateCorrespondence {
        /// Earlier query point.
        first: usize,
        /// Later query point.
        second: usize,
        /// The shared vertex.
        vertex: usize,
    },

    /// The number of resolved indices differs from the number of queries.
    #[error("resolved {resolved} indices for {expected} query points")]
    CorrespondenceCount {
        /// Number of query points.
        expected: usize,
        /// Number of indices resolved.
        resolved: usize,
    },

    /// Two sequences that must have equal length do not.
    #[error("{context}: expected {expected}, found {found}")]
    ShapeMismatch {
        /// What was being compared.
        context: &'static str,
        /// The expected length.
        expected: usize,
        /// The actual length.
        found: usize,
    },

    /// A conversion boundary must be even.
    #[error("conversion boundary {boundary} is odd")]
    OddBoundary {
        /// The rejected boundary.
        boundary: usize,
    },

    /// A conversion boundary exceeds the number of faces.
    #[error("conversion boundary {boundary} exceeds face count {faces}")]
    BoundaryOutOfRange {
        /// The boundary.
        boundary: usize,
        /// Number of face entries available.
        faces: usize,
    },

    /// A face before the conversion boundary is not a triangle.
    #[error("face entry {face} lies before the conversion boundary but is not a triangle")]
    NotATriangle {
        /// The face entry index.
        face: usize,
    },

    /// An index refers past the end of a vertex sequence.
    #[error("index {index} out of range for {len} vertices")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Length of the sequence.
        len: usize,
    },

    /// No boundary is recorded for a converted file.
    #[error("no conversion boundary recorded for {name}")]
    MissingBoundary {
        /// File name looked up in the ledger.
        name: String,
    },

    /// The similarity solver could not produce a transform.
    #[error("similarity solver failed: {0}")]
    SolverFailed(String),

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl MeshError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        MeshError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }

    /// Create a shape mismatch error.
    pub fn shape(context: &'static str, expected: usize, found: usize) -> Self {
        MeshError::ShapeMismatch {
            context,
            expected,
            found,
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MeshError::UnsupportedFormat { .. }
            | MeshError::Parse { .. }
            | MeshError::InvalidFaceArity { .. }
            | MeshError::InvalidVertexIndex { .. }
            | MeshError::Json(_) => ErrorKind::Format,
            MeshError::NotFound { .. } | MeshError::MissingBoundary { .. } => ErrorKind::NotFound,
            MeshError::CorrespondenceNotFound { .. }
            | MeshError::DuplicateCorrespondence { .. }
            | MeshError::CorrespondenceCount { .. } => ErrorKind::Correspondence,
            MeshError::ShapeMismatch { .. }
            | MeshError::OddBoundary { .. }
            | MeshError::BoundaryOutOfRange { .. }
            | MeshError::NotATriangle { .. }
            | MeshError::IndexOutOfRange { .. } => ErrorKind::ShapeMismatch,
            MeshError::EmptyMesh
            | MeshError::SolverFailed(_)
            | MeshError::Io(_)
            | MeshError::InvalidParameter { .. } => ErrorKind::Other,
        }
    }

    /// Whether a batch job may record this error against one item and move on.
    pub fn is_skippable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Format | ErrorKind::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        let parse = MeshError::Parse {
            path: PathBuf::from("a.obj"),
            line: 3,
            message: "bad".into(),
        };
        assert_eq!(parse.kind(), ErrorKind::Format);
        assert!(parse.is_skippable());

        let missing = MeshError::NotFound {
            path: PathBuf::from("a.obj"),
        };
        assert!(missing.is_skippable());

        let shape = MeshError::shape("sub vertices vs index map", 2, 3);
        assert_eq!(shape.kind(), ErrorKind::ShapeMismatch);
        assert!(!shape.is_skippable());

        let unrecorded = MeshError::MissingBoundary {
            name: "b.obj".into(),
        };
        assert_eq!(unrecorded.kind(), ErrorKind::NotFound);
        assert!(unrecorded.is_skippable());

        let odd = MeshError::OddBoundary { boundary: 3 };
        assert_eq!(odd.kind(), ErrorKind::ShapeMismatch);
    }

    #[test]
    fn test_display() {
        let err = MeshError::shape("sub vertices vs index map", 2, 3);
        assert_eq!(err.to_string(), "sub vertices vs index map: expected 2, found 3");
    }
}
