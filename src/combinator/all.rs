use core::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::error::CircularResolution;
use crate::scheduler::Scheduler;
use crate::settlable::{Resolution, Settlable};

/// Wait for every input to fulfill.
///
/// Fulfills with the values in input order once the last input fulfills;
/// rejects with the first rejection reason observed, ignoring everything
/// the remaining inputs do afterwards. An empty input fulfills immediately
/// with an empty `Vec`.
pub fn all<T, E, I>(scheduler: &Scheduler, inputs: I) -> Settlable<Vec<T>, E>
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
            resolver.fulfill(Vec::new());
            return Ok(());
        }

        let values: Rc<RefCell<Vec<Option<T>>>> =
            Rc::new(RefCell::new(vec![None; inputs.len()]));
        let remaining = Rc::new(Cell::new(inputs.len()));
        let done = Rc::new(Cell::new(false));

        for (index, input) in inputs.iter().enumerate() {
            let on_fulfilled = {
                let values = Rc::clone(&values);
                let remaining = Rc::clone(&remaining);
                let done = Rc::clone(&done);
                let resolver = resolver.clone();
                move |value: T| -> Result<Resolution<(), E>, E> {
                    if !done.get() {
                        values.borrow_mut()[index] = Some(value);
                        remaining.set(remaining.get() - 1);
                        if remaining.get() == 0 {
                            done.set(true);
                            let values = values
                                .borrow_mut()
                                .drain(..)
                                .map(|slot| slot.expect("every input settled"))
                                .collect::<Vec<_>>();
                            resolver.fulfill(values);
                        }
                    }
                    Ok(Resolution::Value(()))
                }
            };
            let on_rejected = {
                let done = Rc::clone(&done);
                let rejector = rejector.clone();
                move |reason: E| -> Result<Resolution<(), E>, E> {
                    if !done.get() {
                        done.set(true);
                        rejector.reject(reason);
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
    fn fulfills_with_values_in_input_order() {
        let sched = Scheduler::new();
        let aggregate = all::<i32, String, _>(&sched, vec![1, 2, 3]);
        sched.run();
        assert_eq!(aggregate.outcome(), Some(Outcome::Fulfilled(vec![1, 2, 3])));
    }

    #[test]
    fn first_rejection_wins() {
        let sched = Scheduler::new();
        let inputs = vec![
            Resolution::from(Settlable::<i32, String>::resolve(&sched, 1)),
            Resolution::from(Settlable::<i32, String>::reject(&sched, "x".to_string())),
            Resolution::from(Settlable::<i32, String>::resolve(&sched, 3)),
        ];
        let aggregate = all::<i32, String, _>(&sched, inputs);
        sched.run();
        assert_eq!(
            aggregate.outcome(),
            Some(Outcome::Rejected("x".to_string()))
        );
    }

    #[test]
    fn empty_input_fulfills_immediately() {
        let sched = Scheduler::new();
        let aggregate = all::<i32, String, _>(&sched, Vec::<i32>::new());
        assert_eq!(aggregate.outcome(), Some(Outcome::Fulfilled(Vec::new())));
    }
}
