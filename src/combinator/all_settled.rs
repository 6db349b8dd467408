use core::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::error::CircularResolution;
use crate::scheduler::Scheduler;
use crate::settlable::{Outcome, Resolution, Resolver, Settlable};

/// Wait for every input to settle and report every outcome.
///
/// Never rejects: each input's settlement is recorded as an [`Outcome`] at
/// the input's position, and the aggregate fulfills once the last input has
/// settled. An empty input fulfills immediately with an empty report.
pub fn all_settled<T, E, I>(scheduler: &Scheduler, inputs: I) -> Settlable<Vec<Outcome<T, E>>, E>
where
    T: Clone + 'static,
    E: Clone + From<CircularResolution> + 'static,
    I: IntoIterator,
    I::Item: Into<Resolution<T, E>>,
{
    let inputs: Vec<Settlable<T, E>> = inputs
        .into_iter()
        .map(|input| Settlable::<T, E>::resolve(scheduler, input))
        .collect();

    Settlable::new(scheduler, move |resolver, _rejector| {
        if inputs.is_empty() {
            resolver.fulfill(Vec::new());
            return Ok(());
        }

        let report: Rc<RefCell<Vec<Option<Outcome<T, E>>>>> =
            Rc::new(RefCell::new(vec![None; inputs.len()]));
        let remaining = Rc::new(Cell::new(inputs.len()));

        for (index, input) in inputs.iter().enumerate() {
            let on_fulfilled = {
                let report = Rc::clone(&report);
                let remaining = Rc::clone(&remaining);
                let resolver = resolver.clone();
                move |value: T| -> Result<Resolution<(), E>, E> {
                    record(&report, &remaining, &resolver, index, Outcome::Fulfilled(value));
                    Ok(Resolution::Value(()))
                }
            };
            let on_rejected = {
                let report = Rc::clone(&report);
                let remaining = Rc::clone(&remaining);
                let resolver = resolver.clone();
                move |reason: E| -> Result<Resolution<(), E>, E> {
                    record(&report, &remaining, &resolver, index, Outcome::Rejected(reason));
                    Ok(Resolution::Value(()))
                }
            };
            input.then(on_fulfilled, on_rejected);
        }
        Ok(())
    })
}

/// Store one input's outcome at its position and fulfill once the count
/// reaches zero. Each input settles exactly once, so no terminal flag is
/// needed here.
fn record<T, E>(
    report: &Rc<RefCell<Vec<Option<Outcome<T, E>>>>>,
    remaining: &Rc<Cell<usize>>,
    resolver: &Resolver<Vec<Outcome<T, E>>, E>,
    index: usize,
    outcome: Outcome<T, E>,
) where
    T: Clone + 'static,
    E: Clone + 'static,
{
    report.borrow_mut()[index] = Some(outcome);
    remaining.set(remaining.get() - 1);
    if remaining.get() == 0 {
        let report = report
            .borrow_mut()
            .drain(..)
            .map(|slot| slot.expect("every input settled"))
            .collect::<Vec<_>>();
        resolver.fulfill(report);
    }
}
