//! Decides whether and when the overlay first becomes visible, and records
//! that it has been shown.

use log::{debug, info, warn};
use std::time::Duration;

use crate::config::OverlayConfig;
use crate::store::FlagStore;
use crate::timers::{TimerHandle, TimerId, TimerKind, TimerQueue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Pending,
    Suppressed,
    Shown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleDecision {
    Suppressed,
    Scheduled { delay: Duration },
}

#[derive(Debug)]
pub struct VisibilityScheduler {
    flag_key: String,
    show_once: bool,
    state: Visibility,
    delay: Option<TimerHandle>,
    persisted: bool,
}

impl VisibilityScheduler {
    /// Reads the shown-flag once and either suppresses the overlay for this
    /// run or arms the initial delay on `timers`.
    ///
    /// Storage errors count as "not yet shown".
    pub fn initialize(
        config: &OverlayConfig,
        flag_key: &str,
        slide_count: usize,
        store: &dyn FlagStore,
        timers: &mut TimerQueue,
    ) -> (Self, ScheduleDecision) {
        let mut scheduler = Self {
            flag_key: flag_key.to_string(),
            show_once: config.show_once,
            state: Visibility::Pending,
            delay: None,
            persisted: false,
        };

        let already_shown = config.show_once
            && match store.get(flag_key) {
                Ok(flag) => flag.unwrap_or(false),
                Err(e) => {
                    warn!("could not read shown-flag {flag_key:?}, treating as unset: {e}");
                    false
                }
            };

        if already_shown {
            info!("overlay already shown for {flag_key:?}, suppressing");
            scheduler.state = Visibility::Suppressed;
            return (scheduler, ScheduleDecision::Suppressed);
        }

        if slide_count == 0 {
            info!("no slides to show, suppressing overlay");
            scheduler.state = Visibility::Suppressed;
            return (scheduler, ScheduleDecision::Suppressed);
        }

        let delay = config.timing.initial_delay();
        debug!("overlay scheduled in {delay:?}");
        scheduler.delay = Some(timers.schedule_once(delay, TimerKind::ShowDelay));
        (scheduler, ScheduleDecision::Scheduled { delay })
    }

    pub fn state(&self) -> Visibility {
        self.state
    }

    /// Returns true exactly once: when the delay timer owned by this
    /// scheduler fires while still pending.
    pub fn on_timer(&mut self, id: TimerId) -> bool {
        let owns = self.delay.as_ref().is_some_and(|h| h.id() == id);
        if !owns || self.state != Visibility::Pending {
            return false;
        }
        // one-shot already left the queue; drop the handle
        self.delay = None;
        self.state = Visibility::Shown;
        true
    }

    /// Persists the shown-flag when `show_once` is configured. Later calls
    /// do nothing. Write failures are logged and ignored.
    pub fn on_closed(&mut self, store: &mut dyn FlagStore) {
        if !self.show_once || self.persisted {
            return;
        }
        self.persisted = true;
        match store.set(&self.flag_key, true) {
            Ok(()) => debug!("persisted shown-flag {:?}", self.flag_key),
            Err(e) => warn!("could not persist shown-flag {:?}: {e}", self.flag_key),
        }
    }
}
