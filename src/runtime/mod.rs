//! Driving settlables to completion from synchronous code.
//!
//! [`block_on`] polls a future and, whenever it is pending, turns the
//! [`Scheduler`] queue until a waker fires. Since every "wait" in this
//! crate is a registered continuation, a pending future over an idle queue
//! can never make progress; that situation is a deadlock and panics
//! rather than spinning.
//!
//! [`Scheduler`]: crate::Scheduler

#![deny(missing_debug_implementations, nonstandard_style)]

use core::future::Future;
use core::pin::pin;
use core::task::{Context, Poll, Waker};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::Wake;

use crate::scheduler::Scheduler;

/// Run `future` to completion, turning `scheduler`'s queue while it is
/// pending.
///
/// # Panics
///
/// Panics if the future is pending while no deferred work remains; nothing
/// else could ever wake it.
pub fn block_on<Fut>(scheduler: &Scheduler, future: Fut) -> Fut::Output
where
    Fut: Future,
{
    // Pin the future so it can be polled
    let mut future = pin!(future);

    let waker_impl = Arc::new(TurnWaker::new());
    let waker = Waker::from(Arc::clone(&waker_impl));
    let mut cx = Context::from_waker(&waker);

    // Either the future completes and we return, or deferred continuations
    // still have to run and we turn the queue.
    loop {
        waker_impl.set_awake(false);
        match future.as_mut().poll(&mut cx) {
            Poll::Ready(res) => break res,
            Poll::Pending => {
                while !waker_impl.awake() {
                    if !scheduler.run_once() {
                        panic!("deadlock: the main future is pending but no deferred work remains");
                    }
                }
            }
        }
    }
}

#[derive(Debug)]
struct TurnWaker {
    awake: AtomicBool,
}

impl TurnWaker {
    fn new() -> Self {
        Self {
            awake: AtomicBool::new(false),
        }
    }

    #[inline]
    fn set_awake(&self, awake: bool) {
        self.awake.store(awake, Ordering::Relaxed);
    }

    #[inline]
    fn awake(&self) -> bool {
        self.awake.load(Ordering::Relaxed)
    }
}

impl Wake for TurnWaker {
    fn wake(self: Arc<Self>) {
        self.set_awake(true);
    }
}
