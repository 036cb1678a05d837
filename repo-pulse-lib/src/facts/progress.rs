/// A trait for reporting progress of long-running operations.
pub trait Progress: Send + Sync {
    /// Set the phase label for the current operation (e.g., "Resolving", "Fetching").
    fn set_phase(&self, phase: &str);

    /// Report that item `current` of `total` is being worked on.
    fn set_position(&self, current: u64, total: u64, message: &str);

    /// Finish and clear the progress indicator.
    fn done(&self);
}

/// Progress sink that discards every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn set_phase(&self, _phase: &str) {}

    fn set_position(&self, _current: u64, _total: u64, _message: &str) {}

    fn done(&self) {}
}
