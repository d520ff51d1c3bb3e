//! Face-vertex mesh of triangles and quads.

use nalgebra::Point3;

use crate::error::{MeshError, Result};

/// A triangle or quad face, as 0-based vertex indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Face {
    /// Three vertex indices.
    Triangle([usize; 3]),
    /// Four vertex indices, in winding order.
    Quad([usize; 4]),
}

impl Face {
    /// Build a face from a slice of 3 or 4 indices.
    ///
    /// `position` is only used to label the error.
    pub fn from_indices(indices: &[usize], position: usize) -> Result<Self> {
        match *indices {
            [a, b, c] => Ok(Face::Triangle([a, b, c])),
            [a, b, c, d] => Ok(Face::Quad([a, b, c, d])),
            _ => Err(MeshError::InvalidFaceArity {
                face: position,
                arity: indices.len(),
            }),
        }
    }

    /// Vertex indices of this face.
    #[inline]
    pub fn indices(&self) -> &[usize] {
        match self {
            Face::Triangle(t) => t,
            Face::Quad(q) => q,
        }
    }

    /// Number of vertices (3 or 4).
    #[inline]
    pub fn arity(&self) -> usize {
        self.indices().len()
    }

    /// Whether this is a triangle.
    #[inline]
    pub fn is_triangle(&self) -> bool {
        matches!(self, Face::Triangle(_))
    }
}

/// One slot of a mesh's face sequence.
///
/// Meshes read from disk contain only [`FaceEntry::Face`]. A
/// [`FaceEntry::Group`] is the single trailing slot that quad-to-triangle
/// conversion uses to carry the mesh's original triangles past the
/// conversion boundary (see [`TrailingFaces`](crate::algo::topology::TrailingFaces)).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FaceEntry {
    /// An ordinary face.
    Face(Face),
    /// Several faces held in one slot.
    Group(Vec<Face>),
}

impl FaceEntry {
    /// The faces held by this entry.
    pub fn faces(&self) -> &[Face] {
        match self {
            FaceEntry::Face(f) => std::slice::from_ref(f),
            FaceEntry::Group(g) => g,
        }
    }
}

impl From<Face> for FaceEntry {
    fn from(face: Face) -> Self {
        FaceEntry::Face(face)
    }
}

/// Vertex positions plus an ordered face sequence.
///
/// A vertex's position in `vertices` is its identity; index maps and
/// correspondences refer to it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mesh {
    /// Vertex positions.
    pub vertices: Vec<Point3<f64>>,
    /// Face sequence.
    pub faces: Vec<FaceEntry>,
}

impl Mesh {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh from vertices and plain faces.
    pub fn from_faces(vertices: Vec<Point3<f64>>, faces: Vec<Face>) -> Self {
        Self {
            vertices,
            faces: faces.into_iter().map(FaceEntry::Face).collect(),
        }
    }

    /// Create a mesh from vertices and raw index lists of length 3 or 4.
    pub fn from_index_lists(vertices: Vec<Point3<f64>>, faces: &[Vec<usize>]) -> Result<Self> {
        let faces = faces
            .iter()
            .enumerate()
            .map(|(i, f)| Face::from_indices(f, i))
            .collect::<Result<Vec<_>>>()?;
        let mesh = Self::from_faces(vertices, faces);
        mesh.validate()?;
        Ok(mesh)
    }

    /// Number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of face entries (a group counts once).
    #[inline]
    pub fn num_entries(&self) -> usize {
        self.faces.len()
    }

    /// Number of faces with groups expanded.
    pub fn num_faces(&self) -> usize {
        self.faces.iter().map(|e| e.faces().len()).sum()
    }

    /// Iterate over all faces, expanding groups in place.
    pub fn iter_faces(&self) -> impl Iterator<Item = &Face> + '_ {
        self.faces.iter().flat_map(|e| e.faces().iter())
    }

    /// Count of (triangles, quads).
    pub fn face_counts(&self) -> (usize, usize) {
        self.iter_faces().fold((0, 0), |(t, q), f| {
            if f.is_triangle() {
                (t + 1, q)
            } else {
                (t, q + 1)
            }
        })
    }

    /// Whether any entry is a [`FaceEntry::Group`].
    pub fn has_groups(&self) -> bool {
        self.faces.iter().any(|e| matches!(e, FaceEntry::Group(_)))
    }

    /// Check that every face index refers to an existing vertex.
    pub fn validate(&self) -> Result<()> {
        let n = self.vertices.len();
        for (fi, face) in self.iter_faces().enumerate() {
            if let Some(&vertex) = face.indices().iter().find(|&&v| v >= n) {
                return Err(MeshError::InvalidVertexIndex { face: fi, vertex });
            }
        }
        Ok(())
    }

    /// Axis-aligned bounding box, or `None` for an empty mesh.
    pub fn bounding_box(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = *self.vertices.first()?;
        Some(self.vertices.iter().fold((first, first), |(min, max), p| {
            (min.inf(p), max.sup(p))
        }))
    }
}
