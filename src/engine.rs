//! Runs the visible overlay: progress accumulation, slide rotation and the
//! single guarded path to `Closed`.
//!
//! All timers live on the shared [`TimerQueue`]; the engine keeps their
//! handles inside the [`VisibilitySession`] and cancels them together in
//! [`TimingEngine::request_close`]. A fired timer is only honoured if the
//! live session still holds its handle, so nothing queued before the close
//! can touch state afterwards.

use log::{debug, info};
use std::time::Duration;

use crate::config::TimingConfig;
use crate::session::{SessionSnapshot, VisibilitySession};
use crate::timers::{TimerId, TimerKind, TimerQueue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum CloseReason {
    #[strum(serialize = "elapsed")]
    Elapsed,
    #[strum(serialize = "close control")]
    CloseControl,
    #[strum(serialize = "scrim click")]
    Scrim,
    #[strum(serialize = "escape key")]
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnginePhase {
    Idle,
    Active,
    Closing,
    Closed,
}

/// What dispatching a fired timer did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerOutcome {
    /// Not a timer of the live session (stale, or the engine is not active).
    Ignored,
    Progressed,
    Rotated(usize),
    Closed(CloseReason),
}

#[derive(Debug)]
pub struct TimingEngine {
    timing: TimingConfig,
    slide_count: usize,
    phase: EnginePhase,
    session: Option<VisibilitySession>,
    last: SessionSnapshot,
    close_reason: Option<CloseReason>,
}

impl TimingEngine {
    pub fn new(timing: TimingConfig, slide_count: usize) -> Self {
        Self {
            timing,
            slide_count,
            phase: EnginePhase::Idle,
            session: None,
            last: SessionSnapshot::default(),
            close_reason: None,
        }
    }

    pub fn phase(&self) -> EnginePhase {
        self.phase
    }

    pub fn visible(&self) -> bool {
        self.phase == EnginePhase::Active
    }

    /// Close/scrim/escape inputs are only listened to while active.
    pub fn accepts_input(&self) -> bool {
        self.phase == EnginePhase::Active
    }

    pub fn progress_fraction(&self) -> f64 {
        self.snapshot().elapsed_fraction
    }

    pub fn current_slide_index(&self) -> usize {
        self.snapshot().current_slide_index
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.session
            .as_ref()
            .map(VisibilitySession::snapshot)
            .unwrap_or(self.last)
    }

    pub fn close_reason(&self) -> Option<CloseReason> {
        self.close_reason
    }

    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    /// `Idle -> Active`. Creates the session and arms the progress process,
    /// plus the rotation process when there is more than one slide.
    pub fn start(&mut self, timers: &mut TimerQueue) -> bool {
        if self.phase != EnginePhase::Idle || self.slide_count == 0 {
            return false;
        }

        let tick = self.timing.progress_tick.max(Duration::from_millis(1));
        let total = self.timing.total();

        let mut session;
        if total < tick {
            session = VisibilitySession::new(total);
            session.progress = Some(timers.schedule_once(total, TimerKind::Progress));
        } else {
            session = VisibilitySession::new(tick);
            session.progress = Some(timers.schedule_every(tick, TimerKind::Progress));
        }

        if self.slide_count > 1 {
            let per_slide = self.timing.per_slide();
            session.rotation = Some(timers.schedule_every(per_slide, TimerKind::Rotation));
        }

        debug!(
            "overlay active at {:?}: {} slides, {:?} per slide, {:?} total",
            timers.now(),
            self.slide_count,
            self.timing.per_slide(),
            total
        );
        self.last = session.snapshot();
        self.session = Some(session);
        self.phase = EnginePhase::Active;
        true
    }

    pub fn on_timer(&mut self, id: TimerId, timers: &mut TimerQueue) -> TimerOutcome {
        if self.phase != EnginePhase::Active {
            return TimerOutcome::Ignored;
        }
        let Some(session) = self.session.as_ref() else {
            return TimerOutcome::Ignored;
        };

        if session.progress.as_ref().is_some_and(|h| h.id() == id) {
            self.on_progress(timers)
        } else if session.rotation.as_ref().is_some_and(|h| h.id() == id) {
            self.on_rotation()
        } else {
            TimerOutcome::Ignored
        }
    }

    fn on_progress(&mut self, timers: &mut TimerQueue) -> TimerOutcome {
        let total = self.timing.total();
        let Some(session) = self.session.as_mut() else {
            return TimerOutcome::Ignored;
        };

        session.elapsed = (session.elapsed + session.progress_step).min(total);
        session.elapsed_fraction = fraction(session.elapsed, total);

        let remaining = total.saturating_sub(session.elapsed);
        if remaining.is_zero() {
            return if self.request_close(CloseReason::Elapsed, timers) {
                TimerOutcome::Closed(CloseReason::Elapsed)
            } else {
                TimerOutcome::Ignored
            };
        }

        // land the last step exactly on the deadline
        if remaining < session.progress_step {
            if let Some(h) = session.progress.take() {
                timers.cancel(h);
            }
            session.progress = Some(timers.schedule_once(remaining, TimerKind::Progress));
            session.progress_step = remaining;
        }

        TimerOutcome::Progressed
    }

    fn on_rotation(&mut self) -> TimerOutcome {
        let Some(session) = self.session.as_mut() else {
            return TimerOutcome::Ignored;
        };
        session.current_slide_index = (session.current_slide_index + 1) % self.slide_count;
        TimerOutcome::Rotated(session.current_slide_index)
    }

    /// Sets the current slide without touching progress or the rotation
    /// timer's phase. Ignored when inactive or out of range.
    pub fn jump_to_slide(&mut self, index: usize) -> bool {
        if self.phase != EnginePhase::Active || index >= self.slide_count {
            return false;
        }
        match self.session.as_mut() {
            Some(session) => {
                session.current_slide_index = index;
                true
            }
            None => false,
        }
    }

    /// The only way to `Closed`. The first call while active wins and
    /// returns true; everything after is a no-op returning false.
    pub fn request_close(&mut self, reason: CloseReason, timers: &mut TimerQueue) -> bool {
        if self.phase != EnginePhase::Active {
            debug!("close ({reason}) ignored in phase {:?}", self.phase);
            return false;
        }

        self.phase = EnginePhase::Closing;
        if let Some(mut session) = self.session.take() {
            self.last = session.snapshot();
            let released = session.release(timers);
            debug!("released {released} timers");
        }
        self.close_reason = Some(reason);
        self.phase = EnginePhase::Closed;

        info!(
            "overlay closed by {reason} at {:.0}% progress",
            self.last.elapsed_fraction * 100.0
        );
        true
    }
}

fn fraction(elapsed: Duration, total: Duration) -> f64 {
    if elapsed >= total {
        1.0
    } else {
        (elapsed.as_secs_f64() / total.as_secs_f64()).clamp(0.0, 1.0)
    }
}
