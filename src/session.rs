use std::time::Duration;

use crate::timers::{TimerHandle, TimerQueue};

/// Values observers render against. Survives the session it was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SessionSnapshot {
    pub current_slide_index: usize,
    pub elapsed: Duration,
    pub elapsed_fraction: f64,
}

/// Live state of one show-to-close cycle, including the handles of every
/// timer it started.
#[derive(Debug)]
pub struct VisibilitySession {
    pub current_slide_index: usize,
    pub elapsed: Duration,
    pub elapsed_fraction: f64,
    pub(crate) progress: Option<TimerHandle>,
    /// Length of the progress step currently armed.
    pub(crate) progress_step: Duration,
    pub(crate) rotation: Option<TimerHandle>,
}

impl VisibilitySession {
    pub(crate) fn new(progress_step: Duration) -> Self {
        Self {
            current_slide_index: 0,
            elapsed: Duration::ZERO,
            elapsed_fraction: 0.0,
            progress: None,
            progress_step,
            rotation: None,
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            current_slide_index: self.current_slide_index,
            elapsed: self.elapsed,
            elapsed_fraction: self.elapsed_fraction,
        }
    }

    /// Cancels every timer the session still owns. Returns how many were
    /// actually pending.
    pub(crate) fn release(&mut self, timers: &mut TimerQueue) -> usize {
        [self.progress.take(), self.rotation.take()]
            .into_iter()
            .flatten()
            .map(|h| timers.cancel(h))
            .filter(|cancelled| *cancelled)
            .count()
    }
}
