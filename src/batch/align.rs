//! Alignment of a directory of meshes against one reference.

use std::fs;
use std::path::Path;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::algo::align::{align_with_point_subset, PointSelection, Similarity, SimilaritySolver};
use crate::error::Result;
use crate::io;
use crate::mesh::Mesh;

use super::{list_mesh_files, output_path, run, BatchOptions, BatchReport};

/// Per-file alignment diagnostics.
#[derive(Debug, Clone)]
pub struct AlignSummary {
    /// Transform applied to the file.
    pub similarity: Similarity,
    /// RMS distance to the reference after alignment.
    pub rms_error: f64,
    /// Mean distance to the reference after alignment.
    pub mean_error: f64,
}

/// Align every mesh in `input_dir` onto `reference` and write it to
/// `output_dir`, keeping each mesh's own faces.
///
/// With [`PointSelection::Random`] each file draws its own subset from an RNG
/// seeded by [`BatchOptions::seed`] plus the file's sorted position.
pub fn align_dir<S, P, Q>(
    reference: &Mesh,
    input_dir: P,
    output_dir: Q,
    selection: &PointSelection,
    solver: &S,
    options: &BatchOptions,
) -> Result<BatchReport<AlignSummary>>
where
    S: SimilaritySolver + Sync + ?Sized,
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let output_dir = output_dir.as_ref();
    let inputs = list_mesh_files(input_dir)?;
    fs::create_dir_all(output_dir)?;

    run("align", &inputs, options, |pos, path| {
        let mut rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(pos as u64)),
            None => StdRng::from_entropy(),
        };

        let moving = io::load(path)?;
        let aligned =
            align_with_point_subset(&reference.vertices, &moving.vertices, selection, solver, &mut rng)?;

        let out = Mesh {
            vertices: aligned.vertices,
            faces: moving.faces,
        };
        io::save(&out, output_path(output_dir, path)?)?;

        Ok(AlignSummary {
            similarity: aligned.similarity,
            rms_error: aligned.rms_error,
            mean_error: aligned.mean_error,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::align::UmeyamaSolver;
    use crate::error::MeshError;
    use nalgebra::{Point3, Vector3};
    use tempfile::tempdir;

    fn reference() -> Mesh {
        Mesh::from_faces(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(0.0, 0.0, 1.0),
                Point3::new(1.0, 1.0, 1.0),
            ],
            vec![],
        )
    }

    fn scaled_and_shifted() -> Mesh {
        let offset = Vector3::new(10.0, -3.0, 2.0);
        Mesh::from_faces(
            reference().vertices.iter().map(|p| Point3::from(p.coords * 3.0 + offset)).collect(),
            vec![],
        )
    }

    #[test]
    fn test_align_dir_fixed_and_random() {
        let root = tempdir().unwrap();
        let input = root.path().join("in");
        fs::create_dir(&input).unwrap();
        io::save(&scaled_and_shifted(), input.join("a.obj")).unwrap();
        io::save(&scaled_and_shifted(), input.join("b.obj")).unwrap();

        let selections = [
            PointSelection::Fixed(vec![0, 1, 2, 3]),
            PointSelection::Random { count: 4 },
        ];
        for selection in &selections {
            let out = root.path().join("out");
            let options = BatchOptions::default().with_seed(5);
            let report =
                align_dir(&reference(), &input, &out, selection, &UmeyamaSolver, &options).unwrap();

            assert_eq!(report.processed_count(), 2);
            for (_, summary) in &report.processed {
                assert!(summary.rms_error < 1e-6);
                assert!((summary.similarity.scale - 1.0 / 3.0).abs() < 1e-9);
            }

            let aligned = io::load(out.join("a.obj")).unwrap();
            for (p, q) in aligned.vertices.iter().zip(&reference().vertices) {
                assert!((p - q).norm() < 1e-6);
            }
        }
    }

    #[test]
    fn test_vertex_count_mismatch_aborts() {
        let root = tempdir().unwrap();
        let input = root.path().join("in");
        fs::create_dir(&input).unwrap();
        fs::write(input.join("a.obj"), "v 0 0 0\nv 1 0 0\nv 0 1 0\n").unwrap();

        let err = align_dir(
            &reference(),
            &input,
            root.path().join("out"),
            &PointSelection::Fixed(vec![0, 1, 2]),
            &UmeyamaSolver,
            &BatchOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, MeshError::ShapeMismatch { .. }));
    }
}
