//! Roll controller: the single mutator of roll state.
//!
//! A roll is a two-step, non-cancellable transition driven by the caller's
//! clock:
//!
//! ```text
//! Idle ──request_roll(now)──▶ Rolling { due = now + delay } ──poll(t >= due)──▶ Idle
//! ```
//!
//! Nothing here sleeps. The event loop that owns the controller calls
//! [`RollController::poll`] on every tick and the roll completes on the first
//! poll at or after its deadline. Requests made while a roll is in flight are
//! dropped, not queued.
//!
//! Subscribers registered with [`RollController::subscribe`] are invoked
//! synchronously after every mutation with a read-only [`RollView`].

use crate::model::face::Face;
use crate::model::history::{HistoryLedger, RollId, RollRecord};
use crate::model::stats::StatsSnapshot;
use chrono::{DateTime, Local};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Default length of the roll animation.
pub const DEFAULT_ROLL_DELAY: Duration = Duration::from_millis(600);

/// Source of drawn face values.
pub trait FaceSource {
    fn draw(&mut self) -> Face;
}

/// Uniform draws from a random number generator.
#[derive(Debug, Clone)]
pub struct RandomFaces<R>(pub R);

impl RandomFaces<StdRng> {
    /// Seeded from OS entropy, or from `seed` for reproducible sessions.
    #[must_use]
    pub fn new(seed: Option<u64>) -> Self {
        Self(seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64))
    }
}

impl<R: RngCore> FaceSource for RandomFaces<R> {
    fn draw(&mut self) -> Face {
        Face::roll(&mut self.0)
    }
}

/// Replays a fixed sequence of faces, cycling when exhausted.
#[derive(Debug, Clone)]
pub struct ScriptedFaces {
    queue: VecDeque<Face>,
}

impl ScriptedFaces {
    /// # Panics
    ///
    /// Panics if `faces` is empty.
    #[must_use]
    pub fn new(faces: impl IntoIterator<Item = Face>) -> Self {
        let queue: VecDeque<Face> = faces.into_iter().collect();
        assert!(!queue.is_empty(), "scripted face sequence must not be empty");
        Self { queue }
    }
}

impl FaceSource for ScriptedFaces {
    fn draw(&mut self) -> Face {
        let face = self.queue[0];
        self.queue.rotate_left(1);
        face
    }
}

/// Source of wall-clock timestamps for roll records.
pub trait WallClock {
    fn now(&self) -> DateTime<Local>;
}

/// The local system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl WallClock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

impl<F: Fn() -> DateTime<Local>> WallClock for F {
    fn now(&self) -> DateTime<Local> {
        self()
    }
}

/// Whether a roll is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollPhase {
    Idle,
    Rolling { due: Instant },
}

/// Outcome of [`RollController::request_roll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollRequest {
    Started { due: Instant },
    /// A roll was already in flight; nothing changed.
    Ignored,
}

/// The mutation a subscriber is being notified about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollEvent<'a> {
    Started,
    Completed(&'a RollRecord),
    Cleared,
}

/// Read-only view of controller state handed to subscribers and renderers.
#[derive(Debug, Clone, Copy)]
pub struct RollView<'a> {
    pub current: Face,
    pub rolling: bool,
    pub history: &'a HistoryLedger,
}

impl RollView<'_> {
    #[must_use]
    pub fn stats(&self) -> Option<StatsSnapshot> {
        StatsSnapshot::from_ledger(self.history)
    }
}

type Subscriber = Box<dyn FnMut(RollEvent<'_>, &RollView<'_>)>;

/// Holds the current face, the in-flight guard, and the history ledger.
pub struct RollController<S = RandomFaces<StdRng>> {
    current: Face,
    phase: RollPhase,
    history: HistoryLedger,
    delay: Duration,
    faces: S,
    clock: Box<dyn WallClock>,
    next_seq: u64,
    subscribers: Vec<Subscriber>,
}

impl RollController<RandomFaces<StdRng>> {
    /// Controller drawing from a [`StdRng`] with the given delay.
    #[must_use]
    pub fn seeded(seed: Option<u64>, delay: Duration) -> Self {
        Self::new(RandomFaces::new(seed), delay)
    }
}

impl<S: FaceSource> RollController<S> {
    #[must_use]
    pub fn new(faces: S, delay: Duration) -> Self {
        Self {
            current: Face::ONE,
            phase: RollPhase::Idle,
            history: HistoryLedger::new(),
            delay,
            faces,
            clock: Box::new(SystemClock),
            next_seq: 0,
            subscribers: Vec::new(),
        }
    }

    /// Replace the wall clock used to timestamp records.
    #[must_use]
    pub fn with_clock(mut self, clock: impl WallClock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Register a callback invoked after every state mutation.
    pub fn subscribe(&mut self, callback: impl FnMut(RollEvent<'_>, &RollView<'_>) + 'static) {
        self.subscribers.push(Box::new(callback));
    }

    #[must_use]
    pub const fn current(&self) -> Face {
        self.current
    }

    #[must_use]
    pub const fn phase(&self) -> RollPhase {
        self.phase
    }

    #[must_use]
    pub const fn is_rolling(&self) -> bool {
        matches!(self.phase, RollPhase::Rolling { .. })
    }

    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    #[must_use]
    pub const fn history(&self) -> &HistoryLedger {
        &self.history
    }

    #[must_use]
    pub fn stats(&self) -> Option<StatsSnapshot> {
        StatsSnapshot::from_ledger(&self.history)
    }

    #[must_use]
    pub const fn view(&self) -> RollView<'_> {
        RollView {
            current: self.current,
            rolling: self.is_rolling(),
            history: &self.history,
        }
    }

    /// Start a roll that completes `delay` after `now`.
    ///
    /// No-op while a roll is already in flight.
    pub fn request_roll(&mut self, now: Instant) -> RollRequest {
        if let RollPhase::Rolling { due } = self.phase {
            trace!(?due, "roll already in flight; request dropped");
            return RollRequest::Ignored;
        }

        let due = now + self.delay;
        self.phase = RollPhase::Rolling { due };
        debug!(delay = ?self.delay, "roll started");
        self.notify(RollEvent::Started);
        RollRequest::Started { due }
    }

    /// Complete the in-flight roll if its deadline has passed.
    ///
    /// Returns the new record when a roll completed on this call.
    pub fn poll(&mut self, now: Instant) -> Option<RollRecord> {
        let RollPhase::Rolling { due } = self.phase else {
            return None;
        };
        if now < due {
            return None;
        }

        let value = self.faces.draw();
        let timestamp = self.clock.now();
        let id = RollId::new(timestamp.timestamp_millis(), self.next_seq);
        self.next_seq += 1;
        let record = RollRecord::new(id, value, timestamp);

        self.current = value;
        if let Some(evicted) = self.history.record(record.clone()) {
            trace!(id = %evicted.id, "evicted oldest roll");
        }
        self.phase = RollPhase::Idle;
        debug!(id = %record.id, value = value.get(), "roll completed");
        self.notify(RollEvent::Completed(&record));
        Some(record)
    }

    /// Request a roll and complete it immediately at its deadline.
    ///
    /// Returns `None` if a roll was already in flight; that roll is left
    /// untouched.
    pub fn roll_now(&mut self, now: Instant) -> Option<RollRecord> {
        match self.request_roll(now) {
            RollRequest::Started { due } => self.poll(due),
            RollRequest::Ignored => None,
        }
    }

    /// Empty the history. The current face is kept.
    pub fn clear_history(&mut self) {
        let dropped = self.history.len();
        self.history.clear();
        debug!(dropped, "history cleared");
        self.notify(RollEvent::Cleared);
    }

    fn notify(&mut self, event: RollEvent<'_>) {
        if self.subscribers.is_empty() {
            return;
        }
        let mut subscribers = std::mem::take(&mut self.subscribers);
        let view = self.view();
        for callback in &mut subscribers {
            callback(event, &view);
        }
        self.subscribers = subscribers;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::history::HISTORY_CAPACITY;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn scripted(values: &[u8]) -> ScriptedFaces {
        ScriptedFaces::new(values.iter().map(|&v| Face::new(v).expect("valid face")))
    }

    fn controller(values: &[u8]) -> RollController<ScriptedFaces> {
        RollController::new(scripted(values), DEFAULT_ROLL_DELAY)
    }

    #[test]
    fn starts_idle_on_one() {
        let c = controller(&[4]);
        assert_eq!(c.current().get(), 1);
        assert!(!c.is_rolling());
        assert!(c.history().is_empty());
        assert!(c.stats().is_none());
    }

    #[test]
    fn roll_completes_only_after_delay() {
        let mut c = controller(&[4]);
        let t0 = Instant::now();
        let RollRequest::Started { due } = c.request_roll(t0) else {
            panic!("expected roll to start");
        };
        assert_eq!(due, t0 + DEFAULT_ROLL_DELAY);
        assert!(c.is_rolling());

        assert!(c.poll(t0 + Duration::from_millis(599)).is_none());
        assert!(c.is_rolling());
        assert!(c.history().is_empty());

        let record = c.poll(due).expect("roll completes at deadline");
        assert_eq!(record.value.get(), 4);
        assert_eq!(c.current().get(), 4);
        assert!(!c.is_rolling());
        assert_eq!(c.history().len(), 1);
    }

    #[test]
    fn request_while_rolling_is_ignored() {
        let mut c = controller(&[2, 6]);
        let t0 = Instant::now();
        let first = c.request_roll(t0);
        let second = c.request_roll(t0 + Duration::from_millis(300));
        assert_eq!(second, RollRequest::Ignored);
        assert_eq!(c.phase(), match first {
            RollRequest::Started { due } => RollPhase::Rolling { due },
            RollRequest::Ignored => panic!("first request should start"),
        });

        // Only the first roll lands, at its original deadline.
        assert!(c.poll(t0 + Duration::from_millis(650)).is_some());
        assert!(c.poll(t0 + Duration::from_millis(950)).is_none());
        assert_eq!(c.history().len(), 1);
        assert_eq!(c.current().get(), 2);
    }

    #[test]
    fn poll_when_idle_does_nothing() {
        let mut c = controller(&[3]);
        assert!(c.poll(Instant::now()).is_none());
        assert!(c.history().is_empty());
    }

    #[test]
    fn roll_now_is_ignored_while_rolling() {
        let mut c = controller(&[3, 5]);
        let t0 = Instant::now();
        c.request_roll(t0);
        assert!(c.roll_now(t0).is_none());
        assert!(c.is_rolling());
    }

    #[test]
    fn scenario_history_and_stats() {
        let mut c = controller(&[3, 5, 5, 1]);
        let t0 = Instant::now();
        for _ in 0..4 {
            c.roll_now(t0).expect("roll");
        }
        let shown: Vec<u8> = c.history().values().map(Face::get).collect();
        assert_eq!(shown, [1, 5, 5, 3]);

        let stats = c.stats().expect("stats");
        assert_eq!(stats.count, 4);
        assert_eq!(stats.average.to_string(), "3.50");
        assert_eq!(stats.max.get(), 5);
        assert_eq!(stats.min.get(), 1);
    }

    #[test]
    fn twenty_one_rolls_drop_the_first() {
        let values: Vec<u8> = (0..21).map(|i| (i % 6) + 1).collect();
        let mut c = controller(&values);
        let t0 = Instant::now();
        let ids: Vec<RollId> = (0..21)
            .map(|_| c.roll_now(t0).expect("roll").id)
            .collect();

        assert_eq!(c.history().len(), HISTORY_CAPACITY);
        let kept: Vec<RollId> = c.history().iter().map(|r| r.id).collect();
        let expected: Vec<RollId> = ids[1..].iter().rev().copied().collect();
        assert_eq!(kept, expected);
        assert!(!kept.contains(&ids[0]));
    }

    #[test]
    fn ids_are_unique_within_same_millisecond() {
        let fixed = Local::now();
        let mut c = controller(&[1, 2]).with_clock(move || fixed);
        let t0 = Instant::now();
        let a = c.roll_now(t0).expect("roll").id;
        let b = c.roll_now(t0).expect("roll").id;
        assert_eq!(a.millis, b.millis);
        assert_ne!(a, b);
    }

    #[test]
    fn clear_keeps_current_face() {
        let mut c = controller(&[6]);
        c.roll_now(Instant::now());
        c.clear_history();
        assert!(c.history().is_empty());
        assert!(c.stats().is_none());
        assert_eq!(c.current().get(), 6);
    }

    #[test]
    fn subscribers_see_every_mutation() {
        let log: Rc<RefCell<Vec<String>>> = Rc::default();
        let sink = Rc::clone(&log);
        let mut c = controller(&[5]);
        c.subscribe(move |event, view| {
            let line = match event {
                RollEvent::Started => format!("started rolling={}", view.rolling),
                RollEvent::Completed(r) => {
                    format!("completed {} len={}", r.value, view.history.len())
                }
                RollEvent::Cleared => format!("cleared stats={}", view.stats().is_some()),
            };
            sink.borrow_mut().push(line);
        });

        let t0 = Instant::now();
        c.request_roll(t0);
        c.request_roll(t0);
        c.poll(t0 + DEFAULT_ROLL_DELAY);
        c.clear_history();

        assert_eq!(
            *log.borrow(),
            [
                "started rolling=true",
                "completed 5 len=1",
                "cleared stats=false",
            ]
        );
    }

    #[test]
    fn seeded_controller_is_reproducible() {
        let t0 = Instant::now();
        let draw = |seed| {
            let mut c = RollController::seeded(Some(seed), Duration::ZERO);
            (0..10)
                .map(|_| c.roll_now(t0).expect("roll").value.get())
                .collect::<Vec<_>>()
        };
        assert_eq!(draw(99), draw(99));
        assert!(draw(99).iter().all(|v| (1..=6).contains(v)));
    }
}
