//! Progress reporting for batch jobs.
//!
//! # Example
//!
//! ```
//! use meshsplice::batch::{BatchOptions, Progress};
//!
//! let progress = Progress::new(|done, total, file| {
//!     eprintln!("[{done}/{total}] {file}");
//! });
//! let options = BatchOptions::default().with_progress(progress);
//! # let _ = options;
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};

/// Callback receiving `(files_done, files_total, file_name)` after each file.
///
/// Batch workers may run on several threads, so the callback must be
/// `Send + Sync` and may be invoked concurrently.
pub struct Progress {
    callback: Box<dyn Fn(usize, usize, &str) + Send + Sync>,
}

impl Progress {
    /// Create a reporter from a callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(usize, usize, &str) + Send + Sync + 'static,
    {
        Self {
            callback: Box::new(callback),
        }
    }

    /// A reporter that discards all updates.
    pub fn none() -> Self {
        Self::new(|_, _, _| {})
    }

    #[inline]
    pub(crate) fn report(&self, done: usize, total: usize, file: &str) {
        (self.callback)(done, total, file);
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::none()
    }
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress").finish_non_exhaustive()
    }
}

/// Shared completion counter; monotonic across worker threads.
#[derive(Debug, Default)]
pub(crate) struct Tally {
    done: AtomicUsize,
}

impl Tally {
    pub(crate) fn tick(&self, progress: &Progress, total: usize, file: &str) {
        let done = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        progress.report(done, total, file);
    }
}
