//! Similarity alignment of a moving mesh onto a reference.
//!
//! A similarity (uniform scale, rotation, translation) is estimated from a
//! subset of corresponding vertices and then applied to every vertex of the
//! moving mesh. Both meshes must share a vertex numbering, so correspondence
//! is by index.
//!
//! The estimator sits behind [`SimilaritySolver`]; [`UmeyamaSolver`] is the
//! bundled closed-form implementation.
//!
//! # Example
//!
//! ```
//! use meshsplice::algo::align::{align_with_point_subset, PointSelection, UmeyamaSolver};
//! use nalgebra::{Point3, Vector3};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let reference = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//!     Point3::new(0.0, 0.0, 1.0),
//! ];
//! let shift = Vector3::new(5.0, 0.0, 0.0);
//! let moving: Vec<_> = reference.iter().map(|p| p + shift).collect();
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let aligned = align_with_point_subset(
//!     &reference,
//!     &moving,
//!     &PointSelection::Fixed(vec![0, 1, 2]),
//!     &UmeyamaSolver,
//!     &mut rng,
//! )
//! .unwrap();
//! assert!(aligned.rms_error < 1e-9);
//! ```

mod umeyama;

pub use umeyama::UmeyamaSolver;

use nalgebra::{Matrix3, Point3, Vector3};
use rand::Rng;
use tracing::debug;

use crate::error::{MeshError, Result};

/// Smallest subset that determines a similarity.
pub const MIN_ALIGNMENT_POINTS: usize = 3;

/// Uniform scale, rotation and translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Similarity {
    /// Uniform scale factor.
    pub scale: f64,
    /// Proper rotation (determinant +1).
    pub rotation: Matrix3<f64>,
    /// Translation applied after scaling and rotating.
    pub translation: Vector3<f64>,
}

impl Similarity {
    /// The identity transform.
    pub fn identity() -> Self {
        Self {
            scale: 1.0,
            rotation: Matrix3::identity(),
            translation: Vector3::zeros(),
        }
    }

    /// `scale * rotation * p + translation`.
    #[inline]
    pub fn apply(&self, p: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.scale * (self.rotation * p.coords) + self.translation)
    }
}

impl Default for Similarity {
    fn default() -> Self {
        Self::identity()
    }
}

/// Solver output: the transform and its residual on the points it saw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fit {
    /// Estimated transform taking moving points onto reference points.
    pub similarity: Similarity,
    /// RMS distance over the solver's input pairs after applying the transform.
    pub fit_error: f64,
}

/// Estimates a similarity from paired points.
///
/// Implementations must be pure: `solve(reference, moving)` returns the
/// transform `T` minimising `sum |reference[i] - T(moving[i])|^2`.
pub trait SimilaritySolver {
    /// Solve for the transform taking `moving` onto `reference`.
    fn solve(&self, reference: &[Point3<f64>], moving: &[Point3<f64>]) -> Result<Fit>;
}

/// Which vertices drive the estimate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointSelection {
    /// A fixed, caller-chosen list of 0-based vertex indices.
    Fixed(Vec<usize>),
    /// `count` distinct vertices drawn with the caller's RNG.
    Random {
        /// Number of vertices to draw.
        count: usize,
    },
}

impl PointSelection {
    fn pick<R: Rng + ?Sized>(&self, vertex_count: usize, rng: &mut R) -> Result<Vec<usize>> {
        let indices = match self {
            PointSelection::Fixed(indices) => {
                if let Some(&bad) = indices.iter().find(|&&i| i >= vertex_count) {
                    return Err(MeshError::IndexOutOfRange {
                        index: bad,
                        len: vertex_count,
                    });
                }
                indices.clone()
            }
            PointSelection::Random { count } => {
                if *count > vertex_count {
                    return Err(MeshError::invalid_param(
                        "count",
                        count,
                        "cannot draw more points than the mesh has vertices",
                    ));
                }
                rand::seq::index::sample(rng, vertex_count, *count).into_vec()
            }
        };

        if indices.len() < MIN_ALIGNMENT_POINTS {
            return Err(MeshError::invalid_param(
                "points",
                indices.len(),
                "alignment needs at least 3 points",
            ));
        }
        Ok(indices)
    }
}

/// Result of aligning a whole mesh.
#[derive(Debug, Clone)]
pub struct Alignment {
    /// Every moving vertex with the transform applied.
    pub vertices: Vec<Point3<f64>>,
    /// The transform that was applied.
    pub similarity: Similarity,
    /// Solver residual over the selected subset.
    pub fit_error: f64,
    /// Vertex indices that drove the estimate.
    pub selected: Vec<usize>,
    /// RMS distance to the reference over all vertices.
    pub rms_error: f64,
    /// Mean distance to the reference over all vertices.
    pub mean_error: f64,
}

/// Align `moving` onto `reference` using a subset of corresponding vertices.
///
/// The selected pairs are passed to `solver`; the resulting similarity is
/// applied to every moving vertex. Residuals over the full mesh are
/// reported for diagnostics and never cause a failure.
///
/// `rng` is only consulted for [`PointSelection::Random`].
///
/// # Errors
///
/// - [`MeshError::ShapeMismatch`] if the vertex counts differ.
/// - [`MeshError::IndexOutOfRange`] for a fixed index past the end.
/// - [`MeshError::InvalidParameter`] for fewer than three points.
/// - Whatever the solver reports.
pub fn align_with_point_subset<S, R>(
    reference: &[Point3<f64>],
    moving: &[Point3<f64>],
    selection: &PointSelection,
    solver: &S,
    rng: &mut R,
) -> Result<Alignment>
where
    S: SimilaritySolver + ?Sized,
    R: Rng + ?Sized,
{
    if reference.len() != moving.len() {
        return Err(MeshError::shape(
            "reference vs moving vertex count",
            reference.len(),
            moving.len(),
        ));
    }

    let selected = selection.pick(moving.len(), rng)?;
    let ref_subset: Vec<Point3<f64>> = selected.iter().map(|&i| reference[i]).collect();
    let mov_subset: Vec<Point3<f64>> = selected.iter().map(|&i| moving[i]).collect();

    let Fit {
        similarity,
        fit_error,
    } = solver.solve(&ref_subset, &mov_subset)?;

    let vertices: Vec<Point3<f64>> = moving.iter().map(|p| similarity.apply(p)).collect();
    let rms = rms_error(reference, vertices.iter().copied());
    let mean = mean_error(reference, &vertices);

    debug!(
        points = selected.len(),
        scale = similarity.scale,
        fit_error,
        rms_error = rms,
        mean_error = mean,
        "aligned mesh"
    );

    Ok(Alignment {
        vertices,
        similarity,
        fit_error,
        selected,
        rms_error: rms,
        mean_error: mean,
    })
}

pub(crate) fn rms_error(
    reference: &[Point3<f64>],
    moved: impl IntoIterator<Item = Point3<f64>>,
) -> f64 {
    if reference.is_empty() {
        return 0.0;
    }
    let sum: f64 = reference
        .iter()
        .zip(moved)
        .map(|(r, m)| (r - m).norm_squared())
        .sum();
    (sum / reference.len() as f64).sqrt()
}

fn mean_error(reference: &[Point3<f64>], moved: &[Point3<f64>]) -> f64 {
    if reference.is_empty() {
        return 0.0;
    }
    let sum: f64 = reference.iter().zip(moved).map(|(r, m)| (r - m).norm()).sum();
    sum / reference.len() as f64
}
