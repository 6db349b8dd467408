//! The single-value settlement state machine.
//!
//! A [`Settlable`] starts out pending and settles exactly once, either
//! fulfilled with a value or rejected with a reason. Continuations
//! registered through [`then`] observe that settlement; each registration
//! produces a fresh derived settlable whose own settlement is driven by the
//! handler it runs. Settled payloads are always flattened: resolving with a
//! pending settlable (or any [`Thenable`]) adopts that value's eventual
//! outcome instead of settling with the wrapper itself.
//!
//! Continuations never run synchronously. Whether a settlable is pending or
//! already settled at registration time, dispatch goes through the
//! [`Scheduler`], strictly after the registering unit of work has returned.
//!
//! [`then`]: Settlable::then
//! [`Scheduler`]: crate::Scheduler

mod future;
mod outcome;
mod resolution;

pub use future::SettleFuture;
pub use outcome::Outcome;
pub use resolution::{Resolution, Thenable};

use core::cell::{Cell, RefCell};
use core::fmt;
use core::mem;
use std::rc::Rc;

use crate::error::CircularResolution;
use crate::scheduler::Scheduler;

/// A deferred value: settled exactly once, observed through continuations.
///
/// Cloning produces another handle to the same underlying computation.
/// Sharing is single-threaded by design (`Rc`-based), matching the
/// cooperative, single-logical-thread scheduling model of the crate.
pub struct Settlable<T, E> {
    inner: Rc<RefCell<Inner<T, E>>>,
    scheduler: Scheduler,
}

struct Inner<T, E> {
    state: State<T, E>,
    continuations: Vec<Continuation<T, E>>,
}

/// Monotonic: once `Settled`, never changes again.
enum State<T, E> {
    Pending,
    Settled(Outcome<T, E>),
}

/// One `then` registration: two unary callbacks, of which exactly one runs.
struct Continuation<T, E> {
    on_fulfilled: Box<dyn FnOnce(T)>,
    on_rejected: Box<dyn FnOnce(E)>,
}

/// The fulfillment capability of one settlable.
///
/// Handed to the setup routine by [`Settlable::new`]. May be invoked any
/// number of times from either capability of the pair; only the first
/// settlement has any effect.
pub struct Resolver<T, E> {
    inner: Rc<RefCell<Inner<T, E>>>,
    scheduler: Scheduler,
}

/// The rejection capability of one settlable.
///
/// Unlike [`Resolver::resolve`], rejection reasons are opaque payloads:
/// a reason that happens to be a settlable is stored as-is, never adopted.
pub struct Rejector<T, E> {
    inner: Rc<RefCell<Inner<T, E>>>,
    scheduler: Scheduler,
}

impl<T, E> Settlable<T, E>
where
    T: Clone + 'static,
    E: Clone + 'static,
{
    /// Create a settlable by running `setup` synchronously with the two
    /// settlement capabilities.
    ///
    /// A setup routine that fails (`Err`) never escapes construction: the
    /// new settlable is simply rejected with the returned reason. If setup
    /// already settled the instance before failing, the earlier settlement
    /// wins.
    pub fn new<F>(scheduler: &Scheduler, setup: F) -> Self
    where
        F: FnOnce(Resolver<T, E>, Rejector<T, E>) -> Result<(), E>,
    {
        let settlable = Self::pending_in(scheduler);
        if let Err(reason) = setup(settlable.resolver(), settlable.rejector()) {
            settlable.rejector().reject(reason);
        }
        settlable
    }

    /// Create a pending settlable along with its settlement capabilities.
    ///
    /// The split form of [`new`], for producers that settle from somewhere
    /// other than a setup routine.
    ///
    /// [`new`]: Settlable::new
    pub fn pending(scheduler: &Scheduler) -> (Self, Resolver<T, E>, Rejector<T, E>) {
        let settlable = Self::pending_in(scheduler);
        let resolver = settlable.resolver();
        let rejector = settlable.rejector();
        (settlable, resolver, rejector)
    }

    /// Create a settlable resolved with `value`.
    ///
    /// A [`Resolution::Deferred`] input is returned unchanged; a
    /// [`Resolution::Thenable`] is adopted; a plain value produces an
    /// immediately fulfilled instance.
    pub fn resolve(scheduler: &Scheduler, value: impl Into<Resolution<T, E>>) -> Self
    where
        E: From<CircularResolution>,
    {
        match value.into() {
            Resolution::Deferred(settlable) => settlable,
            resolution => {
                let settlable = Self::pending_in(scheduler);
                settlable.resolver().resolve(resolution);
                settlable
            }
        }
    }

    /// Create a settlable rejected with `reason`. No adoption is performed:
    /// reasons are opaque payloads.
    pub fn reject(scheduler: &Scheduler, reason: E) -> Self {
        let settlable = Self::pending_in(scheduler);
        transition(&settlable.inner, scheduler, Outcome::Rejected(reason));
        settlable
    }

    /// Register a continuation pair and return the derived settlable.
    ///
    /// The relevant handler receives the settled payload once this
    /// settlable settles (or on the next turn, if it already has). The
    /// handler's return drives the derived settlable:
    ///
    /// - `Err(reason)` rejects it,
    /// - `Ok` resolves it, flattening included, so a rejection handler
    ///   that returns `Ok` recovers onto the fulfilled path.
    ///
    /// The pass-through defaults of a missing handler are the free
    /// functions [`forward`] and [`rethrow`].
    pub fn then<U, F, G>(&self, on_fulfilled: F, on_rejected: G) -> Settlable<U, E>
    where
        U: Clone + 'static,
        E: From<CircularResolution>,
        F: FnOnce(T) -> Result<Resolution<U, E>, E> + 'static,
        G: FnOnce(E) -> Result<Resolution<U, E>, E> + 'static,
    {
        let derived = Settlable::pending_in(&self.scheduler);
        let resolver = derived.resolver();
        let rejector = derived.rejector();
        let step_fulfilled = {
            let resolver = resolver.clone();
            let rejector = rejector.clone();
            move |value: T| step(on_fulfilled(value), &resolver, &rejector)
        };
        let step_rejected = move |reason: E| step(on_rejected(reason), &resolver, &rejector);
        self.when_settled(step_fulfilled, step_rejected);
        derived
    }

    /// Register a rejection handler; fulfillment passes through unchanged.
    ///
    /// Equivalent to `then(forward, on_rejected)`.
    pub fn catch<G>(&self, on_rejected: G) -> Settlable<T, E>
    where
        E: From<CircularResolution>,
        G: FnOnce(E) -> Result<Resolution<T, E>, E> + 'static,
    {
        self.then(forward, on_rejected)
    }

    /// Run `on_finally` once this settlable settles, on either path.
    ///
    /// The handler receives no payload and cannot observe or alter the
    /// outcome; the original value or reason propagates to the derived
    /// settlable unchanged. The exceptions: a handler that fails
    /// overrides the outcome with its own rejection, and a handler that
    /// returns deferred cleanup delays propagation until that cleanup
    /// settles (adopting its rejection, if any).
    pub fn finally<F>(&self, on_finally: F) -> Settlable<T, E>
    where
        E: From<CircularResolution>,
        F: FnOnce() -> Result<Resolution<(), E>, E> + 'static,
    {
        // Exactly one of the two branches runs, so the handler is parked in
        // a shared slot both can take from.
        let shared = Rc::new(Cell::new(Some(on_finally)));
        let fulfilled = {
            let scheduler = self.scheduler.clone();
            let shared = Rc::clone(&shared);
            move |value: T| -> Result<Resolution<T, E>, E> {
                let on_finally = shared.take().expect("finally handler runs at most once");
                let cleanup = Settlable::<(), E>::resolve(&scheduler, on_finally()?);
                Ok(Resolution::Deferred(cleanup.then(
                    move |()| Ok(Resolution::Value(value)),
                    rethrow,
                )))
            }
        };
        let rejected = {
            let scheduler = self.scheduler.clone();
            move |reason: E| -> Result<Resolution<T, E>, E> {
                let on_finally = shared.take().expect("finally handler runs at most once");
                let cleanup = Settlable::<(), E>::resolve(&scheduler, on_finally()?);
                Ok(Resolution::Deferred(
                    cleanup.then(move |()| Err(reason), rethrow),
                ))
            }
        };
        self.then(fulfilled, rejected)
    }

    /// Whether this settlable has not yet settled.
    pub fn is_pending(&self) -> bool {
        matches!(self.inner.borrow().state, State::Pending)
    }

    /// The settled outcome, if any.
    pub fn outcome(&self) -> Option<Outcome<T, E>> {
        match &self.inner.borrow().state {
            State::Pending => None,
            State::Settled(outcome) => Some(outcome.clone()),
        }
    }

    /// The scheduler this settlable dispatches continuations on.
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Subscription primitive behind `then` and `IntoFuture`: run exactly
    /// one of the callbacks with the settled payload, on a scheduler turn.
    pub(crate) fn when_settled(
        &self,
        on_fulfilled: impl FnOnce(T) + 'static,
        on_rejected: impl FnOnce(E) + 'static,
    ) {
        let mut inner = self.inner.borrow_mut();
        if let State::Settled(outcome) = &inner.state {
            // The payload is already known; only the relevant callback is
            // scheduled, and still never runs synchronously.
            let outcome = outcome.clone();
            drop(inner);
            match outcome {
                Outcome::Fulfilled(value) => self.scheduler.defer(move || on_fulfilled(value)),
                Outcome::Rejected(reason) => self.scheduler.defer(move || on_rejected(reason)),
            }
            return;
        }
        inner.continuations.push(Continuation {
            on_fulfilled: Box::new(on_fulfilled),
            on_rejected: Box::new(on_rejected),
        });
    }

    fn pending_in(scheduler: &Scheduler) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                state: State::Pending,
                continuations: Vec::new(),
            })),
            scheduler: scheduler.clone(),
        }
    }

    fn resolver(&self) -> Resolver<T, E> {
        Resolver {
            inner: Rc::clone(&self.inner),
            scheduler: self.scheduler.clone(),
        }
    }

    fn rejector(&self) -> Rejector<T, E> {
        Rejector {
            inner: Rc::clone(&self.inner),
            scheduler: self.scheduler.clone(),
        }
    }
}

/// The identity pass-through: the default fulfillment handler of [`catch`],
/// forwarding the value to the derived settlable unchanged.
///
/// [`catch`]: Settlable::catch
pub fn forward<T, E>(value: T) -> Result<Resolution<T, E>, E> {
    Ok(Resolution::Value(value))
}

/// The re-raise pass-through: the default rejection handler, forwarding the
/// reason to the derived settlable as a rejection, unchanged.
pub fn rethrow<U, E>(reason: E) -> Result<Resolution<U, E>, E> {
    Err(reason)
}

impl<T, E> Resolver<T, E>
where
    T: Clone + 'static,
    E: Clone + 'static,
{
    /// Settle as fulfilled with a plain value. No adoption is possible.
    pub fn fulfill(&self, value: T) {
        transition(&self.inner, &self.scheduler, Outcome::Fulfilled(value));
    }

    /// Settle with a resolution, adopting deferred work where needed.
    ///
    /// A [`Resolution::Deferred`] or [`Resolution::Thenable`] does not
    /// settle anything yet: the settlable settles later, with whatever the
    /// adopted value eventually produces. Either way, the settlement gate
    /// still applies: whichever settlement arrives first wins.
    pub fn resolve(&self, resolution: impl Into<Resolution<T, E>>)
    where
        E: From<CircularResolution>,
    {
        match resolution.into() {
            Resolution::Value(value) => self.fulfill(value),
            Resolution::Deferred(settlable) => {
                if Rc::ptr_eq(&settlable.inner, &self.inner) {
                    // Adopting our own outcome can never make progress.
                    self.rejector().reject(CircularResolution.into());
                    return;
                }
                let resolver = self.clone();
                let rejector = self.rejector();
                settlable.when_settled(
                    move |value| resolver.fulfill(value),
                    move |reason| rejector.reject(reason),
                );
            }
            Resolution::Thenable(thenable) => {
                // The foreign `then` may misbehave: invoke both
                // capabilities, invoke one twice, or fail outright. The
                // first settlement wins in every case.
                if let Err(reason) = thenable.subscribe(self.clone(), self.rejector()) {
                    self.rejector().reject(reason);
                }
            }
        }
    }

    fn rejector(&self) -> Rejector<T, E> {
        Rejector {
            inner: Rc::clone(&self.inner),
            scheduler: self.scheduler.clone(),
        }
    }
}

impl<T, E> Rejector<T, E>
where
    T: Clone + 'static,
    E: Clone + 'static,
{
    /// Settle as rejected with `reason`.
    pub fn reject(&self, reason: E) {
        transition(&self.inner, &self.scheduler, Outcome::Rejected(reason));
    }
}

/// Route one handler result into a derived settlable's capabilities.
fn step<U, E>(
    result: Result<Resolution<U, E>, E>,
    resolver: &Resolver<U, E>,
    rejector: &Rejector<U, E>,
) where
    U: Clone + 'static,
    E: Clone + From<CircularResolution> + 'static,
{
    match result {
        Ok(resolution) => resolver.resolve(resolution),
        Err(reason) => rejector.reject(reason),
    }
}

/// The settlement gate: first terminal transition wins, everything after is
/// a no-op. Registered continuations are moved out and dispatched in
/// registration order, each on its own scheduler turn.
fn transition<T, E>(inner: &Rc<RefCell<Inner<T, E>>>, scheduler: &Scheduler, outcome: Outcome<T, E>)
where
    T: Clone + 'static,
    E: Clone + 'static,
{
    let continuations = {
        let mut inner = inner.borrow_mut();
        if !matches!(inner.state, State::Pending) {
            return;
        }
        inner.state = State::Settled(outcome.clone());
        // Taking ownership of the queue keeps a continuation that registers
        // new continuations mid-drain from mutating the list under us.
        mem::take(&mut inner.continuations)
    };
    for pair in continuations {
        match &outcome {
            Outcome::Fulfilled(value) => {
                let value = value.clone();
                let on_fulfilled = pair.on_fulfilled;
                scheduler.defer(move || on_fulfilled(value));
            }
            Outcome::Rejected(reason) => {
                let reason = reason.clone();
                let on_rejected = pair.on_rejected;
                scheduler.defer(move || on_rejected(reason));
            }
        }
    }
}

impl<T, E> Clone for Settlable<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
            scheduler: self.scheduler.clone(),
        }
    }
}

impl<T, E> Clone for Resolver<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
            scheduler: self.scheduler.clone(),
        }
    }
}

impl<T, E> Clone for Rejector<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
            scheduler: self.scheduler.clone(),
        }
    }
}

impl<T, E> fmt::Debug for Settlable<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        let state = match inner.state {
            State::Pending => "Pending",
            State::Settled(Outcome::Fulfilled(_)) => "Fulfilled",
            State::Settled(Outcome::Rejected(_)) => "Rejected",
        };
        f.debug_struct("Settlable")
            .field("state", &state)
            .field("continuations", &inner.continuations.len())
            .finish()
    }
}

impl<T, E> fmt::Debug for Resolver<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver").finish_non_exhaustive()
    }
}

impl<T, E> fmt::Debug for Rejector<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rejector").finish_non_exhaustive()
    }
}
