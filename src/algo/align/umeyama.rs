//! Closed-form least-squares similarity (Umeyama, 1991).

use nalgebra::{Matrix3, Point3, Vector3};

use crate::error::{MeshError, Result};

use super::{Fit, Similarity, SimilaritySolver};

/// Least-squares similarity solver via SVD of the cross-covariance.
///
/// Reflections are corrected so the rotation always has determinant +1.
///
/// # References
///
/// - Umeyama, S. (1991). "Least-squares estimation of transformation
///   parameters between two point patterns." IEEE TPAMI, 13(4), 376-380.
#[derive(Debug, Clone, Copy, Default)]
pub struct UmeyamaSolver;

fn centroid(points: &[Point3<f64>]) -> Vector3<f64> {
    points.iter().fold(Vector3::zeros(), |acc, p| acc + p.coords) / points.len() as f64
}

impl SimilaritySolver for UmeyamaSolver {
    fn solve(&self, reference: &[Point3<f64>], moving: &[Point3<f64>]) -> Result<Fit> {
        if reference.len() != moving.len() {
            return Err(MeshError::shape("solver point sets", reference.len(), moving.len()));
        }
        if reference.len() < 3 {
            return Err(MeshError::invalid_param(
                "points",
                reference.len(),
                "a similarity needs at least 3 point pairs",
            ));
        }

        let n = reference.len() as f64;
        let mu_ref = centroid(reference);
        let mu_mov = centroid(moving);

        let mut covariance = Matrix3::zeros();
        let mut moving_variance = 0.0;
        for (r, m) in reference.iter().zip(moving) {
            let rc = r.coords - mu_ref;
            let mc = m.coords - mu_mov;
            covariance += rc * mc.transpose();
            moving_variance += mc.norm_squared();
        }
        covariance /= n;
        moving_variance /= n;

        if moving_variance <= f64::EPSILON {
            return Err(MeshError::SolverFailed(
                "moving points are coincident".to_string(),
            ));
        }

        let svd = covariance.svd(true, true);
        let u = svd
            .u
            .ok_or_else(|| MeshError::SolverFailed("SVD did not produce U".to_string()))?;
        let v_t = svd
            .v_t
            .ok_or_else(|| MeshError::SolverFailed("SVD did not produce V^T".to_string()))?;

        let mut s = Matrix3::identity();
        if u.determinant() * v_t.determinant() < 0.0 {
            s[(2, 2)] = -1.0;
        }

        let rotation = u * s * v_t;
        let scale = (Matrix3::from_diagonal(&svd.singular_values) * s).trace() / moving_variance;
        let translation = mu_ref - scale * rotation * mu_mov;

        let similarity = Similarity {
            scale,
            rotation,
            translation,
        };
        let fit_error = super::rms_error(reference, moving.iter().map(|p| similarity.apply(p)));

        Ok(Fit {
            similarity,
            fit_error,
        })
    }
}
