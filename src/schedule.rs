use std::time::Duration;

/// One-shot timer source the intro sequencer runs on.
///
/// The browser implementation wraps `setTimeout`; tests drive a virtual clock.
pub trait Scheduler {
    type Handle;

    /// Runs `task` once after `after`. Returns `None` if the timer could not be
    /// registered, in which case the task is dropped without running.
    fn schedule(&self, after: Duration, task: Box<dyn FnOnce()>) -> Option<Self::Handle>;

    fn cancel(&self, handle: Self::Handle);
}

/// At most one pending timer; arming it again cancels the previous one.
/// Dropping it cancels whatever is still pending.
pub struct Timeout<S: Scheduler> {
    scheduler: S,
    handle: Option<S::Handle>,
}

impl<S: Scheduler> Timeout<S> {
    pub fn new(scheduler: S) -> Self {
        Self {
            scheduler,
            handle: None,
        }
    }

    pub fn arm(&mut self, after: Duration, task: impl FnOnce() + 'static) {
        self.cancel();
        self.handle = self.scheduler.schedule(after, Box::new(task));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.scheduler.cancel(handle);
        }
    }
}

impl<S: Scheduler> Drop for Timeout<S> {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
pub(crate) use manual::ManualScheduler;

#[cfg(test)]
mod manual {
    use std::{cell::RefCell, rc::Rc, time::Duration};

    use super::Scheduler;

    struct Pending {
        id: u64,
        due: Duration,
        task: Box<dyn FnOnce()>,
    }

    #[derive(Default)]
    struct Clock {
        now: Duration,
        next_id: u64,
        pending: Vec<Pending>,
    }

    /// Virtual-time scheduler. Nothing runs until `advance` is called.
    #[derive(Clone, Default)]
    pub struct ManualScheduler {
        clock: Rc<RefCell<Clock>>,
    }

    impl ManualScheduler {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn now(&self) -> Duration {
            self.clock.borrow().now
        }

        pub fn pending(&self) -> usize {
            self.clock.borrow().pending.len()
        }

        /// Moves the clock forward, running every task that falls due in order.
        /// Tasks scheduled while advancing run too if they are due in the window.
        pub fn advance(&self, by: Duration) {
            let target = self.clock.borrow().now + by;
            loop {
                let next = {
                    let mut clock = self.clock.borrow_mut();
                    let idx = clock
                        .pending
                        .iter()
                        .enumerate()
                        .filter(|(_, p)| p.due <= target)
                        .min_by_key(|(_, p)| (p.due, p.id))
                        .map(|(i, _)| i);
                    idx.map(|i| {
                        let p = clock.pending.swap_remove(i);
                        clock.now = p.due;
                        p.task
                    })
                };
                match next {
                    Some(task) => task(),
                    None => break,
                }
            }
            self.clock.borrow_mut().now = target;
        }
    }

    impl Scheduler for ManualScheduler {
        type Handle = u64;

        fn schedule(&self, after: Duration, task: Box<dyn FnOnce()>) -> Option<u64> {
            let mut clock = self.clock.borrow_mut();
            let id = clock.next_id;
            clock.next_id += 1;
            let due = clock.now + after;
            clock.pending.push(Pending { id, due, task });
            Some(id)
        }

        fn cancel(&self, handle: u64) {
            self.clock.borrow_mut().pending.retain(|p| p.id != handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        cell::{Cell, RefCell},
        rc::Rc,
    };

    use super::*;

    #[test]
    fn test_manual_scheduler_runs_due_tasks_in_order() {
        let scheduler = ManualScheduler::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        for (name, ms) in [("late", 30), ("early", 10), ("mid", 20)] {
            let order = order.clone();
            scheduler.schedule(
                Duration::from_millis(ms),
                Box::new(move || order.borrow_mut().push(name)),
            );
        }

        scheduler.advance(Duration::from_millis(25));
        assert_eq!(*order.borrow(), vec!["early", "mid"]);
        assert_eq!(scheduler.pending(), 1);

        scheduler.advance(Duration::from_millis(5));
        assert_eq!(*order.borrow(), vec!["early", "mid", "late"]);
        assert_eq!(scheduler.now(), Duration::from_millis(30));
    }

    #[test]
    fn test_manual_scheduler_cancel() {
        let scheduler = ManualScheduler::new();
        let fired = Rc::new(Cell::new(false));
        let handle = {
            let fired = fired.clone();
            scheduler
                .schedule(Duration::from_millis(5), Box::new(move || fired.set(true)))
                .expect("manual scheduler always registers")
        };
        scheduler.cancel(handle);
        scheduler.advance(Duration::from_secs(1));
        assert!(!fired.get());
    }

    #[test]
    fn test_timeout_rearm_replaces_pending() {
        let scheduler = ManualScheduler::new();
        let fired = Rc::new(RefCell::new(Vec::new()));
        let mut timeout = Timeout::new(scheduler.clone());
        for name in ["first", "second"] {
            let fired = fired.clone();
            timeout.arm(Duration::from_secs(3), move || fired.borrow_mut().push(name));
        }
        assert_eq!(scheduler.pending(), 1);

        scheduler.advance(Duration::from_secs(3));
        assert_eq!(*fired.borrow(), vec!["second"]);
    }

    #[test]
    fn test_timeout_dropped_before_due() {
        let scheduler = ManualScheduler::new();
        let fired = Rc::new(Cell::new(false));
        {
            let mut timeout = Timeout::new(scheduler.clone());
            let fired = fired.clone();
            timeout.arm(Duration::from_secs(3), move || fired.set(true));
        }
        assert_eq!(scheduler.pending(), 0);

        scheduler.advance(Duration::from_secs(5));
        assert!(!fired.get());
    }
}
