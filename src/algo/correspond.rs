//! Nearest-vertex correspondence.
//!
//! Landmarks placed by a wrapping tool and sub-meshes cut from a larger mesh
//! are both tied back to mesh vertices by exhaustive nearest-vertex search.
//! Correspondence is always to an existing vertex, never to a point on a face.
//!
//! # Example
//!
//! ```
//! use meshsplice::algo::correspond::nearest_index;
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(5.0, 5.0, 5.0),
//! ];
//! assert_eq!(nearest_index(&vertices, &Point3::new(0.9, 0.0, 0.0)).unwrap(), 1);
//! ```

use nalgebra::Point3;
use rayon::prelude::*;

use crate::error::{MeshError, Result};
use crate::mesh::{IndexBase, IndexMap};

/// Squared-distance tolerance for [`resolve_exact_indices`].
///
/// Sub-meshes exported from the same source share coordinates bit for bit,
/// so anything beyond rounding noise means the point is not in the mesh.
pub const DEFAULT_EXACT_TOLERANCE: f64 = 1e-9;

/// Options for [`resolve_marker_indices`].
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Numbering of the returned indices.
    pub base: IndexBase,

    /// Whether to use parallel execution (default: true).
    pub parallel: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            base: IndexBase::Zero,
            parallel: true,
        }
    }
}

impl ResolveOptions {
    /// Return indices in the given numbering.
    pub fn with_base(mut self, base: IndexBase) -> Self {
        self.base = base;
        self
    }

    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Create options for single-threaded execution.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

/// Nearest vertex and its squared distance. Ties go to the lowest index.
fn nearest_with_distance(vertices: &[Point3<f64>], query: &Point3<f64>) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (i, v) in vertices.iter().enumerate() {
        let d = (v - query).norm_squared();
        match best {
            Some((_, best_d)) if d >= best_d => {}
            _ => best = Some((i, d)),
        }
    }
    best
}

/// Index of the vertex closest to `query` (0-based).
///
/// Uses squared Euclidean distance; on ties the lowest index wins.
///
/// # Errors
///
/// [`MeshError::EmptyMesh`] if `vertices` is empty.
pub fn nearest_index(vertices: &[Point3<f64>], query: &Point3<f64>) -> Result<usize> {
    nearest_with_distance(vertices, query)
        .map(|(i, _)| i)
        .ok_or(MeshError::EmptyMesh)
}

/// Nearest vertex for each marker, in marker order.
///
/// Several markers may resolve to the same vertex. Use
/// [`IndexBase::One`] when the result feeds a tool that counts from 1.
pub fn resolve_marker_indices(
    vertices: &[Point3<f64>],
    markers: &[Point3<f64>],
    options: &ResolveOptions,
) -> Result<Vec<usize>> {
    if vertices.is_empty() {
        return Err(MeshError::EmptyMesh);
    }
    let offset = options.base.offset();

    let resolve = |m: &Point3<f64>| -> Result<usize> { Ok(nearest_index(vertices, m)? + offset) };

    if options.parallel {
        markers.par_iter().map(resolve).collect()
    } else {
        markers.iter().map(resolve).collect()
    }
}

/// Locate every query point among `vertices`, exactly.
///
/// Used to find where a sub-mesh (e.g. a face cut from a head) sits inside
/// the mesh it was cut from. Every vertex within squared distance
/// `tolerance` of a query is a candidate; the query takes the lowest-index
/// candidate no earlier query has claimed, so coincident seam vertices map
/// to distinct indices.
///
/// # Errors
///
/// - [`MeshError::CorrespondenceNotFound`] when a query has no vertex in tolerance.
/// - [`MeshError::DuplicateCorrespondence`] when every candidate of a query
///   is already claimed.
/// - [`MeshError::CorrespondenceCount`] if fewer indices than queries resolve.
pub fn resolve_exact_indices(
    vertices: &[Point3<f64>],
    queries: &[Point3<f64>],
    tolerance: f64,
) -> Result<IndexMap> {
    if tolerance.is_nan() || tolerance < 0.0 {
        return Err(MeshError::invalid_param("tolerance", tolerance, "must be non-negative"));
    }
    if vertices.is_empty() {
        return Err(MeshError::EmptyMesh);
    }

    let mut indices: Vec<usize> = Vec::with_capacity(queries.len());
    let mut owner: Vec<Option<usize>> = vec![None; vertices.len()];

    for (qi, q) in queries.iter().enumerate() {
        let mut claimed: Option<(usize, usize)> = None;
        let mut free: Option<usize> = None;
        for (vi, v) in vertices.iter().enumerate() {
            if (v - q).norm_squared() > tolerance {
                continue;
            }
            match owner[vi] {
                None => {
                    free = Some(vi);
                    break;
                }
                Some(first) => {
                    claimed.get_or_insert((first, vi));
                }
            }
        }

        match (free, claimed) {
            (Some(vi), _) => {
                owner[vi] = Some(qi);
                indices.push(vi);
            }
            (None, Some((first, vertex))) => {
                return Err(MeshError::DuplicateCorrespondence {
                    first,
                    second: qi,
                    vertex,
                });
            }
            (None, None) => {
                let (nearest, distance_sq) =
                    nearest_with_distance(vertices, q).ok_or(MeshError::EmptyMesh)?;
                return Err(MeshError::CorrespondenceNotFound {
                    query: qi,
                    nearest,
                    distance_sq,
                    tolerance,
                });
            }
        }
    }

    if indices.len() != queries.len() {
        return Err(MeshError::CorrespondenceCount {
            expected: queries.len(),
            resolved: indices.len(),
        });
    }

    IndexMap::new(indices, vertices.len())
}

/// Paired landmark indices of two meshes, 1-based.
///
/// Row `i` holds the source-mesh vertex and target-mesh vertex nearest to
/// landmark `i` of each mesh's marker set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrespondenceTable {
    source: Vec<usize>,
    target: Vec<usize>,
}

impl CorrespondenceTable {
    /// Build a table from two equal-length columns of 1-based indices.
    pub fn from_columns(source: Vec<usize>, target: Vec<usize>) -> Result<Self> {
        if source.len() != target.len() {
            return Err(MeshError::CorrespondenceCount {
                expected: source.len(),
                resolved: target.len(),
            });
        }
        if source.iter().chain(&target).any(|&i| i == 0) {
            return Err(MeshError::invalid_param("index", 0, "table indices are 1-based"));
        }
        Ok(Self { source, target })
    }

    /// `(source, target)` rows.
    pub fn rows(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.source.iter().copied().zip(self.target.iter().copied())
    }

    /// Source column.
    pub fn source(&self) -> &[usize] {
        &self.source
    }

    /// Target column.
    pub fn target(&self) -> &[usize] {
        &self.target
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.source.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }
}

/// Match two meshes' landmark sets into a 1-based correspondence table.
///
/// Both marker sets must describe the same landmarks in the same order.
pub fn marker_correspondence(
    source_vertices: &[Point3<f64>],
    source_markers: &[Point3<f64>],
    target_vertices: &[Point3<f64>],
    target_markers: &[Point3<f64>],
    parallel: bool,
) -> Result<CorrespondenceTable> {
    if source_markers.len() != target_markers.len() {
        return Err(MeshError::CorrespondenceCount {
            expected: source_markers.len(),
            resolved: target_markers.len(),
        });
    }
    let options = ResolveOptions::default()
        .with_base(IndexBase::One)
        .with_parallel(parallel);
    let source = resolve_marker_indices(source_vertices, source_markers, &options)?;
    let target = resolve_marker_indices(target_vertices, target_markers, &options)?;
    CorrespondenceTable::from_columns(source, target)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_points() -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(5.0, 5.0, 5.0),
        ]
    }

    #[test]
    fn test_nearest_index_example() {
        // Closest to the origin vertex, 0.01 away, vs 0.99 from vertex 1.
        assert_eq!(nearest_index(&three_points(), &Point3::new(0.01, 0.0, 0.0)).unwrap(), 0);
        assert_eq!(nearest_index(&three_points(), &Point3::new(0.99, 0.0, 0.0)).unwrap(), 1);
        assert_eq!(nearest_index(&three_points(), &Point3::new(4.0, 4.0, 4.0)).unwrap(), 2);
    }

    #[test]
    fn test_nearest_index_one_based_export() {
        // The vertex at the origin is index 0 internally and 1 for external tools.
        let markers = vec![Point3::new(0.01, 0.0, 0.0)];
        let options = ResolveOptions::default().with_base(IndexBase::One);
        assert_eq!(resolve_marker_indices(&three_points(), &markers, &options).unwrap(), vec![1]);
    }

    #[test]
    fn test_nearest_index_tie_goes_low() {
        let vertices = vec![
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(-1.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
        ];
        assert_eq!(nearest_index(&vertices, &Point3::origin()).unwrap(), 0);
        assert_eq!(nearest_index(&vertices, &Point3::new(1.0, 0.0, 0.0)).unwrap(), 0);
    }

    #[test]
    fn test_nearest_index_empty() {
        assert!(matches!(nearest_index(&[], &Point3::origin()), Err(MeshError::EmptyMesh)));
    }

    #[test]
    fn test_resolve_markers_bases() {
        let markers = vec![Point3::new(4.9, 5.0, 5.0), Point3::new(0.1, 0.0, 0.0), Point3::new(0.2, 0.0, 0.0)];

        let zero = resolve_marker_indices(&three_points(), &markers, &ResolveOptions::default()).unwrap();
        assert_eq!(zero, vec![2, 0, 0]);

        let one = resolve_marker_indices(
            &three_points(),
            &markers,
            &ResolveOptions::default().with_base(IndexBase::One).sequential(),
        )
        .unwrap();
        assert_eq!(one, vec![3, 1, 1]);
    }

    #[test]
    fn test_resolve_exact() {
        let head = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(2.0, 2.0, 2.0),
            Point3::new(3.0, 3.0, 3.0),
        ];
        let face = vec![head[3], head[1]];
        let map = resolve_exact_indices(&head, &face, DEFAULT_EXACT_TOLERANCE).unwrap();
        assert_eq!(map.indices(), &[3, 1]);
        assert_eq!(map.super_vertex_count(), 4);
    }

    #[test]
    fn test_resolve_exact_not_found() {
        let query = vec![Point3::new(0.5, 0.5, 0.5)];
        let err = resolve_exact_indices(&three_points(), &query, DEFAULT_EXACT_TOLERANCE).unwrap_err();
        assert!(matches!(err, MeshError::CorrespondenceNotFound { query: 0, nearest: 0, .. }));
        assert_eq!(err.kind(), crate::error::ErrorKind::Correspondence);
    }

    #[test]
    fn test_resolve_exact_within_tolerance() {
        let query = vec![Point3::new(1.0 + 1e-6, 0.0, 0.0)];
        let map = resolve_exact_indices(&three_points(), &query, DEFAULT_EXACT_TOLERANCE).unwrap();
        assert_eq!(map.indices(), &[1]);
    }

    #[test]
    fn test_resolve_exact_duplicate() {
        let query = vec![Point3::new(1.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)];
        assert!(matches!(
            resolve_exact_indices(&three_points(), &query, DEFAULT_EXACT_TOLERANCE),
            Err(MeshError::DuplicateCorrespondence { first: 0, second: 1, vertex: 1 })
        ));
    }

    #[test]
    fn test_resolve_exact_seam_duplicates() {
        // Vertices 1 and 2 coincide, as on a UV seam; the region keeps both.
        let head = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ];
        let face = vec![head[1], head[2], head[3]];
        let map = resolve_exact_indices(&head, &face, DEFAULT_EXACT_TOLERANCE).unwrap();
        assert_eq!(map.indices(), &[1, 2, 3]);

        // A third copy has nothing left to claim.
        let too_many = vec![head[1], head[2], head[1]];
        assert!(matches!(
            resolve_exact_indices(&head, &too_many, DEFAULT_EXACT_TOLERANCE),
            Err(MeshError::DuplicateCorrespondence { first: 0, second: 2, vertex: 1 })
        ));
    }

    #[test]
    fn test_resolve_exact_bad_tolerance() {
        assert!(resolve_exact_indices(&three_points(), &[], -1.0).is_err());
        assert!(resolve_exact_indices(&three_points(), &[], f64::NAN).is_err());
    }

    #[test]
    fn test_marker_correspondence() {
        let source = three_points();
        let target: Vec<Point3<f64>> = source.iter().rev().cloned().collect();
        let markers = vec![Point3::new(0.0, 0.1, 0.0), Point3::new(5.0, 5.0, 4.9)];

        let table = marker_correspondence(&source, &markers, &target, &markers, false).unwrap();
        assert_eq!(table.rows().collect::<Vec<_>>(), vec![(1, 3), (3, 1)]);
    }

    #[test]
    fn test_marker_correspondence_count_mismatch() {
        let source = three_points();
        let result = marker_correspondence(&source, &source, &source, &source[..2], true);
        assert!(matches!(result, Err(MeshError::CorrespondenceCount { expected: 3, resolved: 2 })));
    }
}
