#![warn(future_incompatible, unreachable_pub)]

//! A deferred-value primitive with exactly-once settlement.
//!
//! A [`Settlable`] represents a value that becomes available, or fails,
//! later. It settles exactly once; continuations chained with [`then`],
//! [`catch`], and [`finally`] observe the settlement in registration order,
//! each on its own [`Scheduler`] turn, never synchronously. Resolving with
//! a value that is itself pending work (a settlable, or anything
//! implementing the [`Thenable`] protocol) adopts that value's eventual
//! outcome, so nesting flattens away transparently.
//!
//! Four combinators aggregate fixed sets of inputs: [`all`], [`race`],
//! [`all_settled`], and [`any`].
//!
//! # Examples
//!
//! Deterministic, scheduler-driven observation:
//!
//! ```
//! use settlable::{rethrow, Outcome, Resolution, Scheduler, Settlable};
//!
//! let sched = Scheduler::new();
//! let (value, resolver, _rejector) = Settlable::<i32, String>::pending(&sched);
//! let doubled = value.then(|n| Ok(Resolution::Value(n * 2)), rethrow);
//!
//! resolver.fulfill(21);
//! sched.run();
//! assert_eq!(doubled.outcome(), Some(Outcome::Fulfilled(42)));
//! ```
//!
//! Or `.await` a settlable under [`runtime::block_on`]:
//!
//! ```
//! use settlable::{runtime, Scheduler, Settlable};
//!
//! let sched = Scheduler::new();
//! let greeting = Settlable::<&str, String>::resolve(&sched, "hello");
//! let result = runtime::block_on(&sched, async move { greeting.await });
//! assert_eq!(result, Ok("hello"));
//! ```
//!
//! # Design Decisions
//!
//! Scheduling is cooperative and single-threaded: there is no parallel
//! execution of continuations, and nothing here blocks: "waiting" is
//! always continuation registration. The deferred-execution queue is an
//! explicit [`Scheduler`] handle rather than an ambient global, so tests
//! can turn the queue one callback at a time and assert ordering exactly.
//! Sharing is `Rc`-based, which keeps the whole crate deliberately `!Send`.
//!
//! There is no cancellation: once constructed, a settlable settles or stays
//! pending forever. A rejected settlable that never gets a continuation is
//! silently dropped. This is a known gap, accepted for a primitive this low-level.
//!
//! [`then`]: Settlable::then
//! [`catch`]: Settlable::catch
//! [`finally`]: Settlable::finally

pub mod combinator;
pub mod error;
pub mod runtime;
pub mod scheduler;
pub mod settlable;

pub use combinator::{all, all_settled, any, race};
pub use error::{AggregateError, CircularResolution};
pub use scheduler::Scheduler;
pub use settlable::{
    forward, rethrow, Outcome, Rejector, Resolution, Resolver, SettleFuture, Settlable, Thenable,
};
