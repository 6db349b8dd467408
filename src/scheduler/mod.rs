//! The deferred-execution primitive.
//!
//! Every continuation a [`Settlable`] dispatches goes through a
//! [`Scheduler`]: a FIFO queue of callbacks that run strictly after the
//! unit of work that deferred them has returned. Nothing here is ambient:
//! the scheduler is an explicit handle passed to whatever needs to defer
//! work, so tests can drive the queue one turn at a time and assert
//! ordering deterministically.
//!
//! [`Settlable`]: crate::Settlable

use core::cell::RefCell;
use core::fmt;
use std::collections::VecDeque;
use std::rc::Rc;

/// A FIFO queue of deferred callbacks.
///
/// Cloning a `Scheduler` produces another handle to the same queue. The
/// queue only makes progress when [`run_once`] or [`run`] is called (or via
/// [`crate::runtime::block_on`], which turns the queue whenever the main
/// future is pending).
///
/// Callbacks deferred from the same unit of work run in the order they were
/// deferred.
///
/// [`run_once`]: Scheduler::run_once
/// [`run`]: Scheduler::run
#[derive(Clone, Default)]
pub struct Scheduler {
    inner: Rc<RefCell<InnerScheduler>>,
}

#[derive(Default)]
struct InnerScheduler {
    queue: VecDeque<Box<dyn FnOnce()>>,
}

impl Scheduler {
    /// Create a new scheduler with an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue `callback` to run after the current unit of work completes.
    pub fn defer(&self, callback: impl FnOnce() + 'static) {
        self.inner.borrow_mut().queue.push_back(Box::new(callback));
    }

    /// Run the callback at the head of the queue, if any.
    ///
    /// Returns `false` if the queue was empty. A callback may defer further
    /// callbacks; those land at the back of the queue and run on later
    /// turns.
    pub fn run_once(&self) -> bool {
        // The borrow must not be held across the callback: the callback is
        // free to defer more work onto this same queue.
        let callback = self.inner.borrow_mut().queue.pop_front();
        match callback {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }

    /// Run queued callbacks until the queue is idle, including callbacks
    /// deferred while draining.
    pub fn run(&self) {
        while self.run_once() {}
    }

    /// Whether no deferred work remains.
    pub fn is_idle(&self) -> bool {
        self.inner.borrow().queue.is_empty()
    }

    /// Number of callbacks currently queued.
    pub fn pending(&self) -> usize {
        self.inner.borrow().queue.len()
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("pending", &self.pending())
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn fifo_order() {
        let sched = Scheduler::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for i in 0..4 {
            let log = log.clone();
            sched.defer(move || log.borrow_mut().push(i));
        }
        sched.run();
        assert_eq!(*log.borrow(), vec![0, 1, 2, 3]);
        assert!(sched.is_idle());
    }

    #[test]
    fn deferring_while_draining_runs_on_a_later_turn() {
        let sched = Scheduler::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        {
            let log = log.clone();
            let sched2 = sched.clone();
            sched.defer(move || {
                log.borrow_mut().push("outer");
                let log = log.clone();
                sched2.defer(move || log.borrow_mut().push("inner"));
            });
        }
        {
            let log = log.clone();
            sched.defer(move || log.borrow_mut().push("second"));
        }

        assert!(sched.run_once());
        assert_eq!(*log.borrow(), vec!["outer"]);
        sched.run();
        assert_eq!(*log.borrow(), vec!["outer", "second", "inner"]);
    }

    #[test]
    fn run_once_on_empty_queue() {
        let sched = Scheduler::new();
        assert!(!sched.run_once());
        assert!(sched.is_idle());
        assert_eq!(sched.pending(), 0);
    }
}
