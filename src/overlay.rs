use log::debug;
use std::time::Duration;

use crate::config::OverlayConfig;
use crate::engine::{CloseReason, EnginePhase, TimerOutcome, TimingEngine};
use crate::scheduler::{ScheduleDecision, Visibility, VisibilityScheduler};
use crate::slides::{Slide, SlideSet};
use crate::store::FlagStore;
use crate::timers::{TimerKind, TimerQueue};

/// User intents the overlay understands, already decoded from raw terminal
/// events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayInput {
    CloseControl,
    Scrim,
    Escape,
    Indicator(usize),
    NextSlide,
    PrevSlide,
}

/// Notifications for the host page, drained with [`Overlay::drain_events`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayEvent {
    Suppressed,
    Shown,
    SlideChanged(usize),
    Closed(CloseReason),
}

/// The banner popup: visibility scheduling, timing engine and shown-flag
/// persistence wired onto one timer queue.
pub struct Overlay {
    slides: SlideSet,
    timers: TimerQueue,
    scheduler: VisibilityScheduler,
    engine: TimingEngine,
    store: Box<dyn FlagStore>,
    events: Vec<OverlayEvent>,
}

impl Overlay {
    /// Reads the shown-flag and arms the initial delay. Time zero for every
    /// later [`advance`](Self::advance) call is this instant.
    pub fn new(config: &OverlayConfig, slides: SlideSet, store: Box<dyn FlagStore>) -> Self {
        let mut timers = TimerQueue::new();
        let (scheduler, decision) = VisibilityScheduler::initialize(
            config,
            &config.flag_key,
            slides.len(),
            store.as_ref(),
            &mut timers,
        );

        let mut events = vec![];
        if decision == ScheduleDecision::Suppressed {
            events.push(OverlayEvent::Suppressed);
        }

        Self {
            engine: TimingEngine::new(config.timing.clone(), slides.len()),
            slides,
            timers,
            scheduler,
            store,
            events,
        }
    }

    /// Fires every timer due at or before `now`, in due order.
    pub fn advance(&mut self, now: Duration) {
        while let Some(fired) = self.timers.pop_due(now) {
            match fired.kind {
                TimerKind::ShowDelay => {
                    if self.scheduler.on_timer(fired.id) && self.engine.start(&mut self.timers) {
                        debug!("overlay shown at {:?}", fired.at);
                        self.events.push(OverlayEvent::Shown);
                    }
                }
                TimerKind::Progress | TimerKind::Rotation => {
                    match self.engine.on_timer(fired.id, &mut self.timers) {
                        TimerOutcome::Rotated(index) => {
                            self.events.push(OverlayEvent::SlideChanged(index))
                        }
                        TimerOutcome::Closed(reason) => self.finish(reason),
                        TimerOutcome::Progressed | TimerOutcome::Ignored => {}
                    }
                }
            }
        }
        self.timers.advance_clock(now);
    }

    /// Returns true if the input changed anything. Inputs are ignored unless
    /// the overlay is showing.
    pub fn handle_input(&mut self, input: OverlayInput) -> bool {
        if !self.engine.accepts_input() {
            return false;
        }
        let count = self.slides.len();
        let current = self.engine.current_slide_index();
        match input {
            OverlayInput::CloseControl => self.close(CloseReason::CloseControl),
            OverlayInput::Scrim => self.close(CloseReason::Scrim),
            OverlayInput::Escape => self.close(CloseReason::Escape),
            OverlayInput::Indicator(index) => self.jump_to_slide(index),
            OverlayInput::NextSlide => self.jump_to_slide((current + 1) % count),
            OverlayInput::PrevSlide => self.jump_to_slide((current + count - 1) % count),
        }
    }

    pub fn jump_to_slide(&mut self, index: usize) -> bool {
        if index == self.engine.current_slide_index() {
            return false;
        }
        let jumped = self.engine.jump_to_slide(index);
        if jumped {
            self.events.push(OverlayEvent::SlideChanged(index));
        }
        jumped
    }

    /// Manual close. Only the first terminal trigger of a session counts.
    pub fn close(&mut self, reason: CloseReason) -> bool {
        let closed = self.engine.request_close(reason, &mut self.timers);
        if closed {
            self.finish(reason);
        }
        closed
    }

    fn finish(&mut self, reason: CloseReason) {
        self.scheduler.on_closed(self.store.as_mut());
        self.events.push(OverlayEvent::Closed(reason));
    }

    pub fn visible(&self) -> bool {
        self.engine.visible()
    }

    pub fn progress_fraction(&self) -> f64 {
        self.engine.progress_fraction()
    }

    pub fn current_slide_index(&self) -> usize {
        self.engine.current_slide_index()
    }

    pub fn current_slide(&self) -> Option<&Slide> {
        self.slides.get(self.engine.current_slide_index())
    }

    pub fn total_secs(&self) -> f64 {
        self.engine.timing().total_secs
    }

    pub fn slides(&self) -> &SlideSet {
        &self.slides
    }

    pub fn visibility(&self) -> Visibility {
        self.scheduler.state()
    }

    pub fn phase(&self) -> EnginePhase {
        self.engine.phase()
    }

    pub fn close_reason(&self) -> Option<CloseReason> {
        self.engine.close_reason()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.pending()
    }

    /// When the next timer is due, if any. Hosts can sleep until then.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_due()
    }

    /// True once nothing can ever happen again: suppressed, or closed.
    pub fn is_finished(&self) -> bool {
        self.scheduler.state() == Visibility::Suppressed
            || self.engine.phase() == EnginePhase::Closed
    }

    pub fn drain_events(&mut self) -> Vec<OverlayEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimingConfig;
    use crate::store::MemoryFlagStore;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn slides(n: usize) -> SlideSet {
        SlideSet::new(
            (0..n)
                .map(|i| Slide::new(format!("s{i}"), format!("img/{i}.jpg"), format!("slide {i}")))
                .collect(),
        )
        .unwrap()
    }

    fn config(per_slide: f64, total: f64, delay_ms: u64, show_once: bool) -> OverlayConfig {
        OverlayConfig {
            timing: TimingConfig::new(per_slide, total, delay_ms).unwrap(),
            show_once,
            flag_key: "promo".into(),
        }
    }

    #[test]
    fn reference_trace() {
        let store = MemoryFlagStore::new();
        let mut o = Overlay::new(
            &config(3.0, 10.0, 1000, false),
            slides(3),
            Box::new(store.clone()),
        );

        o.advance(ms(0));
        assert_eq!(o.visibility(), Visibility::Pending);
        assert!(!o.visible());

        o.advance(ms(1000));
        assert_eq!(o.phase(), EnginePhase::Active);
        assert_eq!(o.current_slide_index(), 0);
        assert_eq!(o.progress_fraction(), 0.0);

        o.advance(ms(4000));
        assert_eq!(o.current_slide_index(), 1);
        o.advance(ms(7000));
        assert_eq!(o.current_slide_index(), 2);

        o.advance(ms(10_999));
        assert!(o.visible());

        o.advance(ms(11_000));
        assert_eq!(o.phase(), EnginePhase::Closed);
        assert!(!o.visible());
        assert_eq!(o.progress_fraction(), 1.0);
        assert_eq!(o.pending_timers(), 0);

        let closed: Vec<_> = o
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, OverlayEvent::Closed(_)))
            .collect();
        assert_eq!(closed, vec![OverlayEvent::Closed(CloseReason::Elapsed)]);
        // show_once is off, so nothing persisted
        assert!(store.is_empty());
    }

    #[test]
    fn events_follow_the_session() {
        let mut o = Overlay::new(
            &config(1.0, 2.5, 0, true),
            slides(2),
            Box::new(MemoryFlagStore::new()),
        );
        o.advance(ms(5000));
        assert_eq!(
            o.drain_events(),
            vec![
                OverlayEvent::Shown,
                OverlayEvent::SlideChanged(1),
                OverlayEvent::SlideChanged(0),
                OverlayEvent::Closed(CloseReason::Elapsed),
            ]
        );
        assert!(o.drain_events().is_empty());
        assert!(o.is_finished());
    }

    #[test]
    fn show_once_persists_on_close_only() {
        let store = MemoryFlagStore::new();
        let mut o = Overlay::new(&config(1.0, 5.0, 100, true), slides(2), Box::new(store.clone()));

        o.advance(ms(2000));
        assert!(o.visible());
        assert_eq!(store.get("promo").unwrap(), None);

        assert!(o.handle_input(OverlayInput::CloseControl));
        assert_eq!(store.get("promo").unwrap(), Some(true));

        // next run sees the flag and never shows
        let mut again = Overlay::new(
            &config(1.0, 5.0, 100, true),
            slides(2),
            Box::new(store.clone()),
        );
        again.advance(ms(60_000));
        assert_eq!(again.visibility(), Visibility::Suppressed);
        assert!(!again.visible());
        assert_eq!(again.drain_events(), vec![OverlayEvent::Suppressed]);
    }

    #[test]
    fn inputs_ignored_before_show() {
        let mut o = Overlay::new(
            &config(1.0, 5.0, 1000, true),
            slides(2),
            Box::new(MemoryFlagStore::new()),
        );
        o.advance(ms(500));
        assert!(!o.handle_input(OverlayInput::Escape));
        assert!(!o.handle_input(OverlayInput::Indicator(1)));
        o.advance(ms(1000));
        assert!(o.visible());
    }

    #[test]
    fn escape_freezes_progress() {
        let mut o = Overlay::new(
            &config(1.0, 10.0, 0, false),
            slides(3),
            Box::new(MemoryFlagStore::new()),
        );
        o.advance(ms(2500));
        assert!(o.handle_input(OverlayInput::Escape));
        assert!(!o.visible());
        assert_eq!(o.progress_fraction(), 0.25);
        assert_eq!(o.current_slide_index(), 2);

        o.advance(ms(20_000));
        assert_eq!(o.progress_fraction(), 0.25);
        assert_eq!(o.current_slide_index(), 2);
        assert_eq!(o.close_reason(), Some(CloseReason::Escape));
    }

    #[test]
    fn double_close_fires_once() {
        let store = MemoryFlagStore::new();
        let mut o = Overlay::new(&config(1.0, 10.0, 0, true), slides(2), Box::new(store.clone()));
        o.advance(ms(100));
        assert!(o.close(CloseReason::CloseControl));
        assert!(!o.close(CloseReason::CloseControl));
        assert!(!o.handle_input(OverlayInput::Scrim));

        let closes = o
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, OverlayEvent::Closed(_)))
            .count();
        assert_eq!(closes, 1);
        assert_eq!(store.get("promo").unwrap(), Some(true));
    }

    #[test]
    fn arrows_and_indicators_jump() {
        let mut o = Overlay::new(
            &config(5.0, 30.0, 0, false),
            slides(3),
            Box::new(MemoryFlagStore::new()),
        );
        o.advance(ms(1));
        assert!(o.handle_input(OverlayInput::PrevSlide));
        assert_eq!(o.current_slide_index(), 2);
        assert!(o.handle_input(OverlayInput::NextSlide));
        assert_eq!(o.current_slide_index(), 0);
        assert!(o.handle_input(OverlayInput::Indicator(1)));
        assert_eq!(o.current_slide().unwrap().id, "s1");
        assert!(!o.handle_input(OverlayInput::Indicator(1)));
        assert!(!o.handle_input(OverlayInput::Indicator(7)));

        // rotation keeps its 5s phase
        o.advance(ms(5000));
        assert_eq!(o.current_slide_index(), 2);
    }

    #[test]
    fn no_slides_never_shows() {
        let mut o = Overlay::new(
            &config(1.0, 5.0, 0, false),
            SlideSet::empty(),
            Box::new(MemoryFlagStore::new()),
        );
        o.advance(ms(10_000));
        assert!(!o.visible());
        assert_eq!(o.visibility(), Visibility::Suppressed);
        assert!(o.current_slide().is_none());
        assert!(o.is_finished());
    }
}
