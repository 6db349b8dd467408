use crate::error::CircularResolution;
use crate::scheduler::Scheduler;
use crate::settlable::{Resolution, Settlable};

/// Settle with the first input to settle, whichever way it went.
///
/// The settlement gate is the whole algorithm: every input forwards its
/// outcome to the aggregate's capabilities, and only the first forward has
/// any effect. An empty input never settles, since there is nothing to race.
pub fn race<T, E, I>(scheduler: &Scheduler, inputs: I) -> Settlable<T, E>
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
        for input in &inputs {
            let resolver = resolver.clone();
            let rejector = rejector.clone();
            input.then(
                move |value: T| -> Result<Resolution<(), E>, E> {
                    resolver.fulfill(value);
                    Ok(Resolution::Value(()))
                },
                move |reason: E| -> Result<Resolution<(), E>, E> {
                    rejector.reject(reason);
                    Ok(Resolution::Value(()))
                },
            );
        }
        Ok(())
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::settlable::Outcome;

    #[test]
    fn first_settlement_decides() {
        let sched = Scheduler::new();
        let (slow, slow_resolver, _slow_rejector) = Settlable::<&str, String>::pending(&sched);
        let fast = Settlable::<&str, String>::resolve(&sched, "fast");

        let winner = race::<&str, String, _>(&sched, vec![slow, fast]);
        slow_resolver.fulfill("slow");
        sched.run();

        // Both inputs settled, but only the first settlement counted.
        assert_eq!(winner.outcome(), Some(Outcome::Fulfilled("fast")));
    }

    #[test]
    fn first_rejection_decides_too() {
        let sched = Scheduler::new();
        let pending = Settlable::<i32, String>::pending(&sched).0;
        let failed = Settlable::<i32, String>::reject(&sched, "broken".to_string());

        let winner = race::<i32, String, _>(&sched, vec![pending, failed]);
        sched.run();
        assert_eq!(
            winner.outcome(),
            Some(Outcome::Rejected("broken".to_string()))
        );
    }

    #[test]
    fn empty_input_never_settles() {
        let sched = Scheduler::new();
        let winner = race::<i32, String, _>(&sched, Vec::<i32>::new());
        sched.run();
        assert!(winner.is_pending());
    }
}
