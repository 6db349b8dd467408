use core::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::error::{AggregateError, CircularResolution};
use crate::scheduler::Scheduler;
use crate::settlable::{Resolution, Settlable};

/// Settle with the first input to fulfill.
///
/// A rejection alone decides nothing: the aggregate keeps waiting, and only
/// rejects once every input has rejected, with an [`AggregateError`]
/// carrying the reasons in input order. An empty input rejects immediately
/// with an empty aggregate, since nothing can ever fulfill.
pub fn any<T, E, I>(scheduler: &Scheduler, inputs: I) -> Settlable<T, AggregateError<E>>
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

    Settlable::new(scheduler, move |resolver, rejector| {
        if inputs.is_empty() {
            rejector.reject(AggregateError::new(Vec::new()));
            return Ok(());
        }

        let reasons: Rc<RefCell<Vec<Option<E>>>> =
            Rc::new(RefCell::new(vec![None; inputs.len()]));
        let remaining = Rc::new(Cell::new(inputs.len()));

        for (index, input) in inputs.iter().enumerate() {
            let on_fulfilled = {
                let resolver = resolver.clone();
                move |value: T| -> Result<Resolution<(), E>, E> {
                    // First fulfillment wins; the settlement gate discards
                    // any that follow.
                    resolver.fulfill(value);
                    Ok(Resolution::Value(()))
                }
            };
            let on_rejected = {
                let reasons = Rc::clone(&reasons);
                let remaining = Rc::clone(&remaining);
                let rejector = rejector.clone();
                move |reason: E| -> Result<Resolution<(), E>, E> {
                    reasons.borrow_mut()[index] = Some(reason);
                    remaining.set(remaining.get() - 1);
                    if remaining.get() == 0 {
                        let reasons = reasons
                            .borrow_mut()
                            .drain(..)
                            .map(|slot| slot.expect("every input settled"))
                            .collect::<Vec<_>>();
                        rejector.reject(AggregateError::new(reasons));
                    }
                    Ok(Resolution::Value(()))
                }
            };
            input.then(on_fulfilled, on_rejected);
        }
        Ok(())
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::settlable::Outcome;

    #[test]
    fn rejects_with_reasons_in_input_order() {
        let sched = Scheduler::new();
        let inputs = vec![
            Settlable::<i32, String>::reject(&sched, "a".to_string()),
            Settlable::<i32, String>::reject(&sched, "b".to_string()),
        ];
        let aggregate = any::<i32, String, _>(&sched, inputs);
        sched.run();

        assert_eq!(
            aggregate.outcome(),
            Some(Outcome::Rejected(AggregateError::new(vec![
                "a".to_string(),
                "b".to_string(),
            ])))
        );
    }

    #[test]
    fn first_fulfillment_wins_over_rejections() {
        let sched = Scheduler::new();
        let inputs = vec![
            Settlable::<i32, String>::reject(&sched, "a".to_string()),
            Settlable::<i32, String>::resolve(&sched, 9),
        ];
        let aggregate = any::<i32, String, _>(&sched, inputs);
        sched.run();
        assert_eq!(aggregate.outcome(), Some(Outcome::Fulfilled(9)));
    }

    #[test]
    fn empty_input_rejects_with_an_empty_aggregate() {
        let sched = Scheduler::new();
        let aggregate = any::<i32, String, _>(&sched, Vec::<i32>::new());
        assert_eq!(
            aggregate.outcome(),
            Some(Outcome::Rejected(AggregateError::new(Vec::new())))
        );
    }
}
