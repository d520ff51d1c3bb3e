//! Directory-level drivers for the pipeline stages.
//!
//! Each job lists the mesh files of an input directory in sorted name order,
//! runs one stage per file and writes a same-named file into the output
//! directory. Files are independent, so with [`BatchOptions::parallel`] set
//! they are processed on the rayon pool.
//!
//! # Failure policy
//!
//! A file that fails with a format or not-found error (see
//! [`MeshError::is_skippable`]) is logged, recorded in
//! [`BatchReport::skipped`] and the job moves on. Any other error aborts the
//! job and is returned; in parallel mode other files may already have been
//! written by then.

pub mod align;
pub mod convert;
pub mod progress;
pub mod region;

pub use progress::Progress;

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{info, warn};

use crate::error::{MeshError, Result};
use crate::io::Format;

use progress::Tally;

/// Options shared by every batch job.
#[derive(Debug)]
pub struct BatchOptions {
    /// Process files in parallel (default: true).
    pub parallel: bool,
    /// Seed for jobs that draw random numbers. Each file gets its own RNG
    /// seeded with `seed + position`, so results do not depend on scheduling.
    /// `None` seeds from system entropy.
    pub seed: Option<u64>,
    /// Called after each file.
    pub progress: Progress,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            seed: None,
            progress: Progress::none(),
        }
    }
}

impl BatchOptions {
    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel execution.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the progress reporter.
    pub fn with_progress(mut self, progress: Progress) -> Self {
        self.progress = progress;
        self
    }
}

/// A file a job gave up on.
#[derive(Debug)]
pub struct SkippedFile {
    /// The input file.
    pub path: PathBuf,
    /// Why it was skipped.
    pub error: MeshError,
}

/// Outcome of a batch job.
#[derive(Debug)]
pub struct BatchReport<T = ()> {
    /// Successfully processed inputs with their per-file result, in input order.
    pub processed: Vec<(PathBuf, T)>,
    /// Inputs that were skipped, in input order.
    pub skipped: Vec<SkippedFile>,
}

impl<T> BatchReport<T> {
    /// Number of processed files.
    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }

    /// Number of skipped files.
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Mesh files directly inside `dir`, sorted by file name.
///
/// # Errors
///
/// [`MeshError::NotFound`] if `dir` does not exist.
pub fn list_mesh_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(MeshError::NotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && Format::from_path(&path).is_some() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// File name of `path` as a string, used for output paths and ledger keys.
pub(crate) fn file_name(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_owned)
        .ok_or_else(|| MeshError::invalid_param("path", path.display(), "not a valid file name"))
}

/// Path of the output written for `input` inside `output_dir`.
pub(crate) fn output_path(output_dir: &Path, input: &Path) -> Result<PathBuf> {
    Ok(output_dir.join(file_name(input)?))
}

/// Run `job` over `inputs` under the skip-and-continue policy.
///
/// `job` receives each input's position in `inputs` and its path.
pub(crate) fn run<T, F>(
    label: &str,
    inputs: &[PathBuf],
    options: &BatchOptions,
    job: F,
) -> Result<BatchReport<T>>
where
    T: Send,
    F: Fn(usize, &Path) -> Result<T> + Sync,
{
    let total = inputs.len();
    let tally = Tally::default();
    info!(job = label, files = total, parallel = options.parallel, "starting batch");

    let step = |(pos, path): (usize, &PathBuf)| {
        let outcome = job(pos, path);
        tally.tick(&options.progress, total, &path.display().to_string());
        outcome
    };

    let outcomes: Vec<Result<T>> = if options.parallel {
        inputs.par_iter().enumerate().map(step).collect()
    } else {
        inputs.iter().enumerate().map(step).collect()
    };

    let mut report = BatchReport {
        processed: Vec::with_capacity(total),
        skipped: Vec::new(),
    };
    for (path, outcome) in inputs.iter().zip(outcomes) {
        match outcome {
            Ok(value) => report.processed.push((path.clone(), value)),
            Err(error) if error.is_skippable() => {
                warn!(path = %path.display(), %error, "skipping file");
                report.skipped.push(SkippedFile {
                    path: path.clone(),
                    error,
                });
            }
            Err(error) => return Err(error),
        }
    }

    info!(
        job = label,
        processed = report.processed_count(),
        skipped = report.skipped_count(),
        "finished batch"
    );
    Ok(report)
}
