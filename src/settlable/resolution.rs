use core::fmt;

use super::{Rejector, Resolver, Settlable};

/// What a settlement position may be resolved with.
///
/// A "value" handed to [`Resolver::resolve`], returned from a handler, or
/// passed to [`Settlable::resolve`] is not always a plain value: it may
/// itself be pending work that the adopter must wait for. This tagged union
/// keeps the three cases apart without relying on nominal type identity for
/// the foreign case:
///
/// - [`Value`]: a plain value; settles immediately.
/// - [`Deferred`]: a native settlable; its eventual outcome is adopted.
/// - [`Thenable`]: any foreign value implementing the [`Thenable`]
///   subscription protocol; adopted the same way.
///
/// Plain values and settlables convert via `From`, so most call sites can
/// pass either directly.
///
/// [`Value`]: Resolution::Value
/// [`Deferred`]: Resolution::Deferred
/// [`Thenable`]: Resolution::Thenable
pub enum Resolution<T, E> {
    /// A plain value.
    Value(T),
    /// A native settlable whose eventual outcome is adopted.
    Deferred(Settlable<T, E>),
    /// A foreign adoptable value.
    Thenable(Box<dyn Thenable<T, E>>),
}

impl<T, E> Resolution<T, E> {
    /// Wrap a foreign adoptable value.
    pub fn thenable(thenable: impl Thenable<T, E> + 'static) -> Self {
        Resolution::Thenable(Box::new(thenable))
    }
}

impl<T, E> From<T> for Resolution<T, E> {
    fn from(value: T) -> Self {
        Resolution::Value(value)
    }
}

impl<T, E> From<Settlable<T, E>> for Resolution<T, E> {
    fn from(settlable: Settlable<T, E>) -> Self {
        Resolution::Deferred(settlable)
    }
}

impl<T, E> fmt::Debug for Resolution<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Value(_) => f.write_str("Resolution::Value"),
            Resolution::Deferred(_) => f.write_str("Resolution::Deferred"),
            Resolution::Thenable(_) => f.write_str("Resolution::Thenable"),
        }
    }
}

/// A value whose eventual outcome can be subscribed to.
///
/// This is the interop seam: anything exposing this one method is adoptable
/// in a resolution position, whether or not it is a [`Settlable`]. The
/// adopter hands over its own capabilities and trusts the implementor to
/// invoke at most one of them, at most once, but does not depend on that
/// cooperation, since the settlement gate ignores every invocation after
/// the first.
///
/// Returning `Err` is the subscription itself failing; the adopter settles
/// as rejected with that reason (unless something already settled it).
pub trait Thenable<T, E> {
    /// Subscribe the given capabilities to this value's eventual outcome.
    fn subscribe(
        self: Box<Self>,
        resolver: Resolver<T, E>,
        rejector: Rejector<T, E>,
    ) -> Result<(), E>;
}

impl<T, E> Thenable<T, E> for Settlable<T, E>
where
    T: Clone + 'static,
    E: Clone + 'static,
{
    fn subscribe(
        self: Box<Self>,
        resolver: Resolver<T, E>,
        rejector: Rejector<T, E>,
    ) -> Result<(), E> {
        // A settled payload is already flattened, so the outcome forwards
        // directly without another adoption pass.
        self.when_settled(
            move |value| resolver.fulfill(value),
            move |reason| rejector.reject(reason),
        );
        Ok(())
    }
}
