use core::cell::RefCell;
use core::fmt;
use core::future::{Future, IntoFuture};
use core::pin::Pin;
use core::task::{Context, Poll, Waker};
use std::rc::Rc;

use super::Settlable;

/// Future produced by awaiting a [`Settlable`].
///
/// Created by the [`IntoFuture`] impl; resolves to `Ok(value)` or
/// `Err(reason)` once the settlable settles. Drive it with
/// [`runtime::block_on`], which turns the scheduler queue whenever the
/// future is pending.
///
/// [`runtime::block_on`]: crate::runtime::block_on
#[must_use = "futures do nothing unless polled or .awaited"]
pub struct SettleFuture<T, E> {
    shared: Rc<RefCell<Shared<T, E>>>,
    completed: bool,
}

struct Shared<T, E> {
    outcome: Option<Result<T, E>>,
    waker: Option<Waker>,
}

impl<T, E> IntoFuture for Settlable<T, E>
where
    T: Clone + 'static,
    E: Clone + 'static,
{
    type Output = Result<T, E>;
    type IntoFuture = SettleFuture<T, E>;

    fn into_future(self) -> Self::IntoFuture {
        let shared = Rc::new(RefCell::new(Shared {
            outcome: None,
            waker: None,
        }));
        let fulfilled = Rc::clone(&shared);
        let rejected = Rc::clone(&shared);
        self.when_settled(
            move |value| deliver(&fulfilled, Ok(value)),
            move |reason| deliver(&rejected, Err(reason)),
        );
        SettleFuture {
            shared,
            completed: false,
        }
    }
}

fn deliver<T, E>(shared: &Rc<RefCell<Shared<T, E>>>, outcome: Result<T, E>) {
    let waker = {
        let mut shared = shared.borrow_mut();
        shared.outcome = Some(outcome);
        shared.waker.take()
    };
    // Wake outside the borrow; a waker is free to poll us right back.
    if let Some(waker) = waker {
        waker.wake();
    }
}

impl<T, E> Future for SettleFuture<T, E> {
    type Output = Result<T, E>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if self.completed {
            panic!("future polled after completing");
        }
        let outcome = {
            let mut shared = self.shared.borrow_mut();
            match shared.outcome.take() {
                Some(outcome) => outcome,
                None => {
                    shared.waker = Some(cx.waker().clone());
                    return Poll::Pending;
                }
            }
        };
        self.completed = true;
        Poll::Ready(outcome)
    }
}

impl<T, E> fmt::Debug for SettleFuture<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettleFuture")
            .field("completed", &self.completed)
            .finish_non_exhaustive()
    }
}
