//! Multi-input combinators.
//!
//! Four independent algorithms built entirely on top of the [`Settlable`]
//! public contract: each wraps every input with [`Settlable::resolve`]
//! (so plain values behave as already fulfilled), subscribes to the fixed
//! set of inputs, and settles one aggregate settlable.
//!
//! | fn | fulfills when | rejects when |
//! |---|---|---|
//! | [`all`] | every input fulfills | any input rejects (first reason) |
//! | [`race`] | first settlement fulfilled | first settlement rejected |
//! | [`all_settled`] | always, once every input settled | never |
//! | [`any`] | any input fulfills (first value) | every input rejects (aggregate) |
//!
//! Aggregate payloads are index-stable: position `i` of a result or reason
//! sequence always corresponds to input `i`, regardless of settlement
//! order. Inputs that settle after the aggregate has already settled still
//! run to completion; their outcome is discarded.
//!
//! [`Settlable`]: crate::Settlable
//! [`Settlable::resolve`]: crate::Settlable::resolve

mod all;
mod all_settled;
mod any;
mod race;

pub use all::all;
pub use all_settled::all_settled;
pub use any::any;
pub use race::race;
