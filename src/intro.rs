use std::{
    cell::RefCell,
    rc::{Rc, Weak},
    time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::{
    schedule::Scheduler,
    storage::{FlagStore, IntroFlag},
};

const FULL: f64 = 100.0;
const INTRO_TIMING_JSON: &str = include_str!("../content/intro.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stage {
    Loading,
    Revealing,
    Exiting,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntroState {
    pub stage: Stage,
    /// Percentage in [0, 100]. Only moves during `Loading`.
    pub progress: f64,
    pub skip_requested: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Status {
    /// The intro was shown on an earlier visit; nothing renders.
    Inactive,
    Active(IntroState),
    Complete,
}

impl Status {
    pub fn is_active(&self) -> bool {
        matches!(self, Status::Active(_))
    }

    pub fn stage(&self) -> Option<Stage> {
        match self {
            Status::Active(state) => Some(state.stage),
            _ => None,
        }
    }
}

/// Stage durations, in milliseconds so the struct reads well as JSON.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntroTiming {
    pub progress_step: f64,
    pub progress_interval_ms: u64,
    /// Wait after progress reaches 100 before revealing.
    pub loading_dwell_ms: u64,
    pub reveal_dwell_ms: u64,
    pub exit_dwell_ms: u64,
    /// Exit dwell used after a skip. Shorter than `exit_dwell_ms`.
    pub skip_dwell_ms: u64,
}

impl Default for IntroTiming {
    fn default() -> Self {
        Self {
            progress_step: 2.0,
            progress_interval_ms: 40,
            loading_dwell_ms: 500,
            reveal_dwell_ms: 2000,
            exit_dwell_ms: 800,
            skip_dwell_ms: 300,
        }
    }
}

impl IntroTiming {
    /// Slower variant with a longer title card.
    pub fn extended() -> Self {
        Self {
            progress_step: 1.8,
            progress_interval_ms: 55,
            loading_dwell_ms: 420,
            reveal_dwell_ms: 2800,
            exit_dwell_ms: 1200,
            skip_dwell_ms: 300,
        }
    }

    /// Timing bundled from `content/intro.json`, or the default if that file
    /// doesn't parse.
    pub fn configured() -> Self {
        Self::from_json(INTRO_TIMING_JSON).unwrap_or_else(|e| {
            log::warn!("bad intro timing config, using defaults: {e}");
            Self::default()
        })
    }

    /// Missing fields take their default value.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    fn step(&self) -> f64 {
        // a non-positive step would never finish loading
        if self.progress_step.is_finite() && self.progress_step > 0.0 {
            self.progress_step
        } else {
            FULL
        }
    }

    fn interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }

    fn dwell(&self, stage: Stage, skip_requested: bool) -> Duration {
        let ms = match stage {
            Stage::Loading => self.loading_dwell_ms,
            Stage::Revealing => self.reveal_dwell_ms,
            // a skip must finish before the natural exit would
            Stage::Exiting if skip_requested => {
                self.skip_dwell_ms.min(self.exit_dwell_ms.saturating_sub(1))
            }
            Stage::Exiting => self.exit_dwell_ms,
        };
        Duration::from_millis(ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Timer {
    Progress,
    Dwell,
}

type Observer = Rc<dyn Fn(Status)>;

struct Inner<S: Scheduler, F> {
    status: Status,
    started: bool,
    disposed: bool,
    /// Bumped on every schedule/cancel. Tasks carrying an older value are stale.
    generation: u64,
    pending: Option<S::Handle>,
    scheduler: S,
    timing: IntroTiming,
    flag: IntroFlag<F>,
    on_complete: Option<Box<dyn FnOnce()>>,
    observer: Option<Observer>,
}

impl<S: Scheduler, F> Inner<S, F> {
    fn cancel_pending(&mut self) {
        self.generation += 1;
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel(handle);
        }
    }

    fn notification(&self) -> Option<(Observer, Status)> {
        self.observer.clone().map(|o| (o, self.status))
    }
}

impl<S: Scheduler, F> Drop for Inner<S, F> {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

/// One-time, skippable intro overlay sequence.
///
/// Cloning gives another handle to the same sequence. Scheduled timers only
/// hold weak references, so dropping every handle tears the sequence down and
/// cancels whatever timer is pending.
pub struct IntroSequencer<S: Scheduler + 'static, F: FlagStore + 'static> {
    inner: Rc<RefCell<Inner<S, F>>>,
}

impl<S: Scheduler + 'static, F: FlagStore + 'static> Clone for IntroSequencer<S, F> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S: Scheduler + 'static, F: FlagStore + 'static> IntroSequencer<S, F> {
    /// Reads the persisted flag once. If the intro was already shown the
    /// sequencer is inactive for its whole lifetime and `on_complete` is dropped
    /// without being called.
    pub fn initialize(
        flag: IntroFlag<F>,
        scheduler: S,
        timing: IntroTiming,
        on_complete: impl FnOnce() + 'static,
    ) -> Self {
        let status = if flag.is_shown() {
            log::debug!("intro already shown, skipping");
            Status::Inactive
        } else {
            Status::Active(IntroState {
                stage: Stage::Loading,
                progress: 0.0,
                skip_requested: false,
            })
        };
        let on_complete: Option<Box<dyn FnOnce()>> = if status.is_active() {
            Some(Box::new(on_complete))
        } else {
            None
        };
        Self {
            inner: Rc::new(RefCell::new(Inner {
                status,
                started: false,
                disposed: false,
                generation: 0,
                pending: None,
                scheduler,
                timing,
                flag,
                on_complete,
                observer: None,
            })),
        }
    }

    pub fn status(&self) -> Status {
        self.inner.borrow().status
    }

    pub fn is_active(&self) -> bool {
        self.status().is_active()
    }

    /// Registers a listener for every status change and calls it once with the
    /// current status.
    pub fn observe(&self, observer: impl Fn(Status) + 'static) {
        let observer: Observer = Rc::new(observer);
        let status = {
            let mut inner = self.inner.borrow_mut();
            if inner.disposed {
                return;
            }
            inner.observer = Some(observer.clone());
            inner.status
        };
        observer(status);
    }

    pub fn start(&self) {
        let mut inner = self.inner.borrow_mut();
        if inner.started || inner.disposed || !inner.status.is_active() {
            return;
        }
        inner.started = true;
        let interval = inner.timing.interval();
        log::debug!("intro started");
        Self::schedule(&self.inner, &mut inner, interval, Timer::Progress);
    }

    /// Jumps straight to `Exiting` and completes after the short skip dwell.
    /// Only honoured once, and only during `Loading` or `Revealing`.
    pub fn skip(&self) {
        let notify = {
            let mut inner = self.inner.borrow_mut();
            if inner.disposed {
                return;
            }
            let Status::Active(mut state) = inner.status else {
                return;
            };
            if state.skip_requested || state.stage == Stage::Exiting {
                return;
            }
            state.skip_requested = true;
            state.stage = Stage::Exiting;
            inner.status = Status::Active(state);
            inner.started = true;
            inner.cancel_pending();
            let dwell = inner.timing.dwell(Stage::Exiting, true);
            log::debug!("intro skipped");
            Self::schedule(&self.inner, &mut inner, dwell, Timer::Dwell);
            inner.notification()
        };
        if let Some((observer, status)) = notify {
            observer(status);
        }
    }

    /// Cancels any pending timer. Nothing fires after this returns.
    pub fn dispose(&self) {
        let mut inner = self.inner.borrow_mut();
        if inner.disposed {
            return;
        }
        inner.disposed = true;
        inner.cancel_pending();
        inner.on_complete = None;
        inner.observer = None;
    }

    fn schedule(
        this: &Rc<RefCell<Inner<S, F>>>,
        inner: &mut Inner<S, F>,
        after: Duration,
        timer: Timer,
    ) {
        inner.cancel_pending();
        let generation = inner.generation;
        let weak: Weak<RefCell<Inner<S, F>>> = Rc::downgrade(this);
        let task = Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                Self::fire(&inner, generation, timer);
            }
        });
        inner.pending = inner.scheduler.schedule(after, task);
        if inner.pending.is_none() {
            log::warn!("couldn't schedule intro {timer:?} timer");
        }
    }

    fn fire(this: &Rc<RefCell<Inner<S, F>>>, generation: u64, timer: Timer) {
        let mut complete = None;
        let notify = {
            let mut inner = this.borrow_mut();
            if inner.disposed || inner.generation != generation {
                return;
            }
            inner.pending = None;
            let Status::Active(mut state) = inner.status else {
                return;
            };
            match (timer, state.stage) {
                (Timer::Progress, Stage::Loading) => {
                    state.progress = (state.progress + inner.timing.step()).min(FULL);
                    inner.status = Status::Active(state);
                    if state.progress >= FULL {
                        let dwell = inner.timing.dwell(Stage::Loading, false);
                        Self::schedule(this, &mut inner, dwell, Timer::Dwell);
                    } else {
                        let interval = inner.timing.interval();
                        Self::schedule(this, &mut inner, interval, Timer::Progress);
                    }
                }
                (Timer::Dwell, Stage::Loading) | (Timer::Dwell, Stage::Revealing) => {
                    state.stage = if state.stage == Stage::Loading {
                        Stage::Revealing
                    } else {
                        Stage::Exiting
                    };
                    log::debug!("intro stage -> {:?}", state.stage);
                    inner.status = Status::Active(state);
                    let dwell = inner.timing.dwell(state.stage, false);
                    Self::schedule(this, &mut inner, dwell, Timer::Dwell);
                }
                (Timer::Dwell, Stage::Exiting) => {
                    log::debug!("intro complete");
                    inner.status = Status::Complete;
                    inner.flag.mark_shown();
                    complete = inner.on_complete.take();
                }
                (Timer::Progress, _) => return,
            }
            inner.notification()
        };
        if let Some((observer, status)) = notify {
            observer(status);
        }
        if let Some(on_complete) = complete {
            on_complete();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::{
        schedule::ManualScheduler,
        storage::{BrokenStore, MemoryStore},
    };

    type Seq<S = ManualScheduler, F = MemoryStore> = IntroSequencer<S, F>;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn setup(store: MemoryStore) -> (Seq, ManualScheduler, Rc<Cell<usize>>) {
        let scheduler = ManualScheduler::new();
        let calls = Rc::new(Cell::new(0));
        let seq = {
            let calls = calls.clone();
            IntroSequencer::initialize(
                IntroFlag::new(store),
                scheduler.clone(),
                IntroTiming::default(),
                move || calls.set(calls.get() + 1),
            )
        };
        (seq, scheduler, calls)
    }

    fn record<S: Scheduler + 'static, F: FlagStore + 'static>(
        seq: &IntroSequencer<S, F>,
    ) -> Rc<RefCell<Vec<Status>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        seq.observe(move |s| sink.borrow_mut().push(s));
        log
    }

    // Default timing: 50 ticks of 40ms, +500ms dwell, +2000ms reveal, +800ms exit.
    const NATURAL_END_MS: u64 = 2000 + 500 + 2000 + 800;

    #[test]
    fn test_natural_run_stage_order() {
        let store = MemoryStore::default();
        let (seq, clock, calls) = setup(store.clone());
        let log = record(&seq);
        seq.start();

        clock.advance(ms(NATURAL_END_MS - 1));
        assert_eq!(calls.get(), 0);
        assert_eq!(seq.status().stage(), Some(Stage::Exiting));

        clock.advance(ms(1));
        assert_eq!(calls.get(), 1);
        assert_eq!(seq.status(), Status::Complete);
        assert_eq!(store.value().as_deref(), Some("true"));

        let log = log.borrow();
        let mut stages: Vec<Stage> = log.iter().filter_map(|s| s.stage()).collect();
        stages.dedup();
        assert_eq!(stages, vec![Stage::Loading, Stage::Revealing, Stage::Exiting]);
        assert_eq!(log.last(), Some(&Status::Complete));

        let mut last = 0.0;
        let mut at_reveal = None;
        for status in log.iter() {
            if let Status::Active(state) = status {
                if state.stage == Stage::Loading {
                    assert!(state.progress >= last);
                    last = state.progress;
                } else if at_reveal.is_none() {
                    at_reveal = Some(state.progress);
                }
            }
        }
        assert_eq!(last, 100.0);
        assert_eq!(at_reveal, Some(100.0));
    }

    #[test]
    fn test_stage_boundaries() {
        let (seq, clock, _) = setup(MemoryStore::default());
        seq.start();
        clock.advance(ms(2000));
        match seq.status() {
            Status::Active(state) => {
                assert_eq!(state.stage, Stage::Loading);
                assert_eq!(state.progress, 100.0);
            }
            other => panic!("expected loading, got {other:?}"),
        }
        clock.advance(ms(500));
        assert_eq!(seq.status().stage(), Some(Stage::Revealing));
        clock.advance(ms(2000));
        assert_eq!(seq.status().stage(), Some(Stage::Exiting));
    }

    #[test]
    fn test_progress_never_overshoots() {
        let scheduler = ManualScheduler::new();
        let seq: Seq = IntroSequencer::initialize(
            IntroFlag::new(MemoryStore::default()),
            scheduler.clone(),
            IntroTiming::extended(),
            || {},
        );
        let log = record(&seq);
        seq.start();
        scheduler.advance(Duration::from_secs(4));
        let max = log
            .borrow()
            .iter()
            .filter_map(|s| match s {
                Status::Active(state) => Some(state.progress),
                _ => None,
            })
            .fold(0.0, f64::max);
        assert_eq!(max, 100.0);
    }

    #[test]
    fn test_nothing_happens_before_start() {
        let (seq, clock, calls) = setup(MemoryStore::default());
        clock.advance(Duration::from_secs(60));
        assert_eq!(calls.get(), 0);
        assert_eq!(clock.pending(), 0);
        match seq.status() {
            Status::Active(state) => assert_eq!(state.progress, 0.0),
            other => panic!("expected loading, got {other:?}"),
        }
    }

    #[test]
    fn test_start_twice_is_noop() {
        let (seq, clock, calls) = setup(MemoryStore::default());
        seq.start();
        seq.start();
        assert_eq!(clock.pending(), 1);
        clock.advance(ms(NATURAL_END_MS));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_skip_during_loading() {
        let store = MemoryStore::default();
        let (seq, clock, calls) = setup(store.clone());
        seq.start();
        clock.advance(ms(1000));
        seq.skip();

        match seq.status() {
            Status::Active(state) => {
                assert_eq!(state.stage, Stage::Exiting);
                assert!(state.skip_requested);
            }
            other => panic!("expected exiting, got {other:?}"),
        }

        clock.advance(ms(299));
        assert_eq!(calls.get(), 0);
        clock.advance(ms(1));
        assert_eq!(calls.get(), 1);
        assert!(clock.now() < ms(NATURAL_END_MS));
        assert_eq!(store.value().as_deref(), Some("true"));

        clock.advance(Duration::from_secs(10));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_skip_during_revealing() {
        let (seq, clock, calls) = setup(MemoryStore::default());
        seq.start();
        clock.advance(ms(3000));
        assert_eq!(seq.status().stage(), Some(Stage::Revealing));
        seq.skip();
        assert_eq!(seq.status().stage(), Some(Stage::Exiting));
        clock.advance(ms(300));
        assert_eq!(calls.get(), 1);
        assert!(clock.now() < ms(NATURAL_END_MS));
    }

    #[test]
    fn test_skip_before_start() {
        let (seq, clock, calls) = setup(MemoryStore::default());
        seq.skip();
        seq.start();
        clock.advance(ms(300));
        assert_eq!(calls.get(), 1);
        assert_eq!(seq.status(), Status::Complete);
    }

    #[test]
    fn test_second_skip_has_no_effect() {
        let (seq, clock, calls) = setup(MemoryStore::default());
        let log = record(&seq);
        seq.start();
        clock.advance(ms(100));
        seq.skip();
        let after_first = log.borrow().len();
        clock.advance(ms(200));
        seq.skip();
        assert_eq!(log.borrow().len(), after_first);

        // still completes 300ms after the first skip, not the second
        clock.advance(ms(100));
        assert_eq!(calls.get(), 1);
        seq.skip();
        clock.advance(Duration::from_secs(10));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_skip_ignored_while_exiting() {
        let (seq, clock, calls) = setup(MemoryStore::default());
        seq.start();
        clock.advance(ms(4600));
        assert_eq!(seq.status().stage(), Some(Stage::Exiting));
        seq.skip();
        match seq.status() {
            Status::Active(state) => assert!(!state.skip_requested),
            other => panic!("expected exiting, got {other:?}"),
        }
        clock.advance(ms(699));
        assert_eq!(calls.get(), 0);
        clock.advance(ms(1));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_already_shown_is_inactive() {
        let store = MemoryStore::with_value("true");
        let (seq, clock, calls) = setup(store.clone());
        let log = record(&seq);
        seq.start();
        seq.skip();
        clock.advance(Duration::from_secs(60));

        assert_eq!(seq.status(), Status::Inactive);
        assert!(!seq.is_active());
        assert_eq!(calls.get(), 0);
        assert_eq!(clock.pending(), 0);
        assert_eq!(*log.borrow(), vec![Status::Inactive]);
        assert_eq!(store.writes(), 0);
    }

    #[test]
    fn test_dispose_mid_loading_cancels_timers() {
        let store = MemoryStore::default();
        let (seq, clock, calls) = setup(store.clone());
        seq.start();
        clock.advance(ms(500));
        seq.dispose();
        assert_eq!(clock.pending(), 0);

        clock.advance(ms(NATURAL_END_MS * 2));
        assert_eq!(calls.get(), 0);
        assert_eq!(store.value(), None);

        // further calls are inert
        seq.skip();
        seq.start();
        clock.advance(Duration::from_secs(10));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_dispose_after_skip() {
        let (seq, clock, calls) = setup(MemoryStore::default());
        seq.start();
        seq.skip();
        seq.dispose();
        clock.advance(Duration::from_secs(10));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_drop_cancels_timers() {
        let (seq, clock, calls) = setup(MemoryStore::default());
        seq.start();
        clock.advance(ms(100));
        drop(seq);
        assert_eq!(clock.pending(), 0);
        clock.advance(Duration::from_secs(10));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_broken_storage_still_runs() {
        let scheduler = ManualScheduler::new();
        let calls = Rc::new(Cell::new(0));
        let seq: Seq<ManualScheduler, BrokenStore> = {
            let calls = calls.clone();
            IntroSequencer::initialize(
                IntroFlag::new(BrokenStore),
                scheduler.clone(),
                IntroTiming::default(),
                move || calls.set(calls.get() + 1),
            )
        };
        assert!(seq.is_active());
        seq.start();
        scheduler.advance(ms(NATURAL_END_MS));
        assert_eq!(calls.get(), 1);
        assert_eq!(seq.status(), Status::Complete);
    }

    /// Scheduler whose cancel does nothing, like a timer that already fired
    /// and sits in the event queue.
    #[derive(Clone)]
    struct NoCancel(ManualScheduler);

    impl Scheduler for NoCancel {
        type Handle = u64;

        fn schedule(&self, after: Duration, task: Box<dyn FnOnce()>) -> Option<u64> {
            self.0.schedule(after, task)
        }

        fn cancel(&self, _handle: u64) {}
    }

    #[test]
    fn test_stale_timers_do_not_advance() {
        let clock = ManualScheduler::new();
        let calls = Rc::new(Cell::new(0));
        let seq: Seq<NoCancel> = {
            let calls = calls.clone();
            IntroSequencer::initialize(
                IntroFlag::new(MemoryStore::default()),
                NoCancel(clock.clone()),
                IntroTiming::default(),
                move || calls.set(calls.get() + 1),
            )
        };
        let log = record(&seq);
        seq.start();
        clock.advance(ms(20));
        seq.skip();
        let after_skip = log.borrow().len();

        // the uncancelled progress tick at 40ms must not touch progress
        clock.advance(ms(40));
        assert_eq!(log.borrow().len(), after_skip);
        match seq.status() {
            Status::Active(state) => assert_eq!(state.progress, 0.0),
            other => panic!("expected exiting, got {other:?}"),
        }

        clock.advance(Duration::from_secs(10));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_bundled_timing_config() {
        assert_eq!(IntroTiming::configured(), IntroTiming::default());
    }

    #[test]
    fn test_skip_finishes_before_short_exit() {
        let scheduler = ManualScheduler::new();
        let calls = Rc::new(Cell::new(0));
        let timing = IntroTiming {
            exit_dwell_ms: 100,
            ..IntroTiming::default()
        };
        let seq: Seq = {
            let calls = calls.clone();
            IntroSequencer::initialize(
                IntroFlag::new(MemoryStore::default()),
                scheduler.clone(),
                timing,
                move || calls.set(calls.get() + 1),
            )
        };
        // natural run: 2000 + 500 + 2000 + 100
        seq.start();
        scheduler.advance(ms(4499));
        assert_eq!(seq.status().stage(), Some(Stage::Revealing));
        seq.skip();

        scheduler.advance(ms(99));
        assert_eq!(calls.get(), 1);
        assert_eq!(seq.status(), Status::Complete);
    }

    #[test]
    fn test_skip_dwell_clamped_below_exit() {
        let timing = IntroTiming {
            exit_dwell_ms: 100,
            skip_dwell_ms: 300,
            ..IntroTiming::default()
        };
        assert_eq!(timing.dwell(Stage::Exiting, true), ms(99));
        assert_eq!(timing.dwell(Stage::Exiting, false), ms(100));
        assert_eq!(IntroTiming::default().dwell(Stage::Exiting, true), ms(300));
    }

    #[test]
    fn test_timing_from_partial_json() {
        let timing =
            IntroTiming::from_json(r#"{"reveal_dwell_ms": 1000}"#).expect("valid timing json");
        assert_eq!(timing.reveal_dwell_ms, 1000);
        assert_eq!(timing.progress_step, 2.0);
        assert!(timing.skip_dwell_ms < timing.exit_dwell_ms);
        assert!(IntroTiming::extended().skip_dwell_ms < IntroTiming::extended().exit_dwell_ms);
    }

    #[test]
    fn test_invalid_step_still_finishes() {
        let scheduler = ManualScheduler::new();
        let timing = IntroTiming {
            progress_step: 0.0,
            ..IntroTiming::default()
        };
        let seq: Seq = IntroSequencer::initialize(
            IntroFlag::new(MemoryStore::default()),
            scheduler.clone(),
            timing,
            || {},
        );
        seq.start();
        scheduler.advance(Duration::from_secs(10));
        assert_eq!(seq.status(), Status::Complete);
    }
}
