use std::time::Duration;

/// Identifies one scheduled timer. Ids are never reused within a queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// What a timer is for; used by the overlay host to route a fired timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerKind {
    ShowDelay,
    Progress,
    Rotation,
}

/// Cancellation handle returned by every schedule call.
///
/// Deliberately not `Clone`: whoever holds the handle owns the timer, and
/// cancelling consumes it.
#[derive(Debug, PartialEq, Eq)]
pub struct TimerHandle {
    id: TimerId,
    kind: TimerKind,
}

impl TimerHandle {
    pub fn id(&self) -> TimerId {
        self.id
    }

    pub fn kind(&self) -> TimerKind {
        self.kind
    }
}

/// A timer that came due during [`TimerQueue::pop_due`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fired {
    pub id: TimerId,
    pub kind: TimerKind,
    pub at: Duration,
}

#[derive(Debug)]
struct Entry {
    id: TimerId,
    kind: TimerKind,
    due: Duration,
    period: Option<Duration>,
}

/// Single-threaded timer queue driven by an external clock reading.
///
/// Time is measured as a `Duration` since the queue was created. Nothing
/// fires on its own; the owner calls [`pop_due`](Self::pop_due) with the
/// current reading and dispatches each fired timer in due order.
#[derive(Debug, Default)]
pub struct TimerQueue {
    now: Duration,
    next_id: u64,
    entries: Vec<Entry>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// The instant the queue was last advanced to.
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn schedule_once(&mut self, after: Duration, kind: TimerKind) -> TimerHandle {
        self.push(after, None, kind)
    }

    /// First fire is one `period` from now, then every `period` after that.
    /// A zero period is bumped to one millisecond so the queue always drains.
    pub fn schedule_every(&mut self, period: Duration, kind: TimerKind) -> TimerHandle {
        let period = period.max(Duration::from_millis(1));
        self.push(period, Some(period), kind)
    }

    fn push(&mut self, after: Duration, period: Option<Duration>, kind: TimerKind) -> TimerHandle {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            kind,
            due: self.now + after,
            period,
        });
        TimerHandle { id, kind }
    }

    /// Removes the timer. Returns false if it had already fired (one-shot)
    /// or been cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != handle.id);
        self.entries.len() != before
    }

    pub fn is_scheduled(&self, id: TimerId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.entries.iter().map(|e| e.due).min()
    }

    /// Pops the earliest timer due at or before `until`, moving the queue
    /// clock to its due time. Periodic timers are re-armed one period after
    /// their previous due time so their phase never drifts.
    pub fn pop_due(&mut self, until: Duration) -> Option<Fired> {
        let idx = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due <= until)
            .min_by_key(|(_, e)| (e.due, e.id))
            .map(|(i, _)| i)?;

        let entry = &mut self.entries[idx];
        let fired = Fired {
            id: entry.id,
            kind: entry.kind,
            at: entry.due,
        };
        self.now = self.now.max(entry.due);

        match entry.period {
            Some(period) => entry.due += period,
            None => {
                self.entries.swap_remove(idx);
            }
        }

        Some(fired)
    }

    /// Moves the clock forward once every due timer up to `until` has been
    /// popped. Never moves it backwards.
    pub fn advance_clock(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn once_fires_a_single_time() {
        let mut q = TimerQueue::new();
        let h = q.schedule_once(ms(50), TimerKind::ShowDelay);

        assert_eq!(q.pop_due(ms(49)), None);
        let fired = q.pop_due(ms(50)).unwrap();
        assert_eq!(fired.id, h.id());
        assert_eq!(fired.at, ms(50));
        assert_eq!(q.pop_due(ms(1000)), None);
        assert!(!q.cancel(h));
    }

    #[test]
    fn periodic_keeps_phase() {
        let mut q = TimerQueue::new();
        let _h = q.schedule_every(ms(30), TimerKind::Rotation);

        let mut at = vec![];
        while let Some(f) = q.pop_due(ms(100)) {
            at.push(f.at);
        }
        assert_eq!(at, vec![ms(30), ms(60), ms(90)]);
        assert_eq!(q.next_due(), Some(ms(120)));
    }

    #[test]
    fn timers_pop_in_due_order() {
        let mut q = TimerQueue::new();
        q.schedule_every(ms(40), TimerKind::Rotation);
        q.schedule_every(ms(25), TimerKind::Progress);

        let kinds: Vec<_> = std::iter::from_fn(|| q.pop_due(ms(80)))
            .map(|f| (f.at, f.kind))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (ms(25), TimerKind::Progress),
                (ms(40), TimerKind::Rotation),
                (ms(50), TimerKind::Progress),
                (ms(75), TimerKind::Progress),
                (ms(80), TimerKind::Rotation),
            ]
        );
    }

    #[test]
    fn cancel_removes_pending_timer() {
        let mut q = TimerQueue::new();
        let h = q.schedule_every(ms(10), TimerKind::Progress);
        let id = h.id();
        assert!(q.is_scheduled(id));
        assert!(q.cancel(h));
        assert!(!q.is_scheduled(id));
        assert_eq!(q.pop_due(ms(100)), None);
        assert_eq!(q.pending(), 0);
    }

    #[test]
    fn schedule_is_relative_to_last_fired_instant() {
        let mut q = TimerQueue::new();
        q.schedule_once(ms(100), TimerKind::ShowDelay);
        q.pop_due(ms(250)).unwrap();
        assert_eq!(q.now(), ms(100));

        q.schedule_once(ms(10), TimerKind::Progress);
        assert_eq!(q.next_due(), Some(ms(110)));

        q.advance_clock(ms(105));
        q.advance_clock(ms(50));
        assert_eq!(q.now(), ms(105));
    }

    #[test]
    fn zero_period_is_clamped() {
        let mut q = TimerQueue::new();
        q.schedule_every(Duration::ZERO, TimerKind::Progress);
        assert_eq!(q.next_due(), Some(ms(1)));
    }
}
