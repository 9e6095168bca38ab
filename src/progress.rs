//! Progress reporting hook for long-running bulk operations.
//!
//! The real reporter (a progress bar, a log line, a metrics counter) is a
//! collaborator supplied by the application; this crate only depends on the
//! narrow [`ProgressReporter`] trait and ships a no-op [`Dummy`] default.

/// Receives progress notifications from bulk cache operations such as
/// [`crate::Cache::populate`] or dictionary retraining.
pub trait ProgressReporter {
    /// Reports progress for a single unit of work.
    ///
    /// * `key` — a human-readable label for the item just processed (may be
    ///   empty for operations that don't have a natural per-item label).
    /// * `progress` — absolute position, if known.
    /// * `incr` — increment since the last report, if the caller tracks it.
    /// * `op` — a short operation tag (e.g. `"populate"`, `"recompress"`).
    fn report(&mut self, key: &str, progress: Option<u64>, incr: Option<u64>, op: Option<&str>);
}

/// A no-op reporter used whenever the caller doesn't supply one.
#[derive(Copy, Clone, Debug, Default)]
pub struct Dummy;

impl ProgressReporter for Dummy {
    #[inline]
    fn report(&mut self, _key: &str, _progress: Option<u64>, _incr: Option<u64>, _op: Option<&str>) {}
}

impl<F> ProgressReporter for F
where
    F: FnMut(&str, Option<u64>, Option<u64>, Option<&str>),
{
    #[inline]
    fn report(&mut self, key: &str, progress: Option<u64>, incr: Option<u64>, op: Option<&str>) {
        self(key, progress, incr, op)
    }
}
