/// A terminal settlement: either a value or a rejection reason.
///
/// This is both what a settled [`Settlable`] holds internally and the
/// per-input report element produced by [`all_settled`].
///
/// [`Settlable`]: crate::Settlable
/// [`all_settled`]: crate::combinator::all_settled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T, E> {
    /// The computation succeeded with a value.
    Fulfilled(T),
    /// The computation failed with a reason.
    Rejected(E),
}

impl<T, E> Outcome<T, E> {
    /// Whether this outcome carries a value.
    pub fn is_fulfilled(&self) -> bool {
        matches!(self, Outcome::Fulfilled(_))
    }

    /// Whether this outcome carries a rejection reason.
    pub fn is_rejected(&self) -> bool {
        matches!(self, Outcome::Rejected(_))
    }

    /// The value, if fulfilled.
    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Fulfilled(value) => Some(value),
            Outcome::Rejected(_) => None,
        }
    }

    /// The rejection reason, if rejected.
    pub fn reason(&self) -> Option<&E> {
        match self {
            Outcome::Fulfilled(_) => None,
            Outcome::Rejected(reason) => Some(reason),
        }
    }
}
