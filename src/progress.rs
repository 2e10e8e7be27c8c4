//! Progress reporting for long-running steps.

/// A progress update for the current step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    /// Completion percentage (0-100).
    pub percent: u8,
}

impl ProgressEvent {
    /// Create an event, clamping to 100.
    pub fn new(percent: u8) -> Self {
        Self {
            percent: percent.min(100),
        }
    }

    /// Percentage of `done` out of `total`. A zero total counts as complete.
    pub fn from_ratio(done: u64, total: u64) -> Self {
        if total == 0 {
            return Self::new(100);
        }
        let percent = (u128::from(done.min(total)) * 100 / u128::from(total)) as u8;
        Self::new(percent)
    }
}

/// Receives progress events. Implemented for any `FnMut(ProgressEvent)`.
pub trait ProgressObserver {
    fn on_progress(&mut self, event: ProgressEvent);
}

impl<F> ProgressObserver for F
where
    F: FnMut(ProgressEvent),
{
    fn on_progress(&mut self, event: ProgressEvent) {
        self(event)
    }
}

/// Observer that ignores every event.
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&mut self, _event: ProgressEvent) {}
}
