use std::cell::Cell;
use std::rc::Rc;

use settlable::{rethrow, Outcome, Resolution, Scheduler, Settlable};

#[test]
fn callbacks_never_run_synchronously() {
    let sched = Scheduler::new();
    let settled = Settlable::<i32, String>::resolve(&sched, 1);

    let observed = Rc::new(Cell::new(false));
    let flag = Rc::clone(&observed);
    settled.then(
        move |value| -> Result<Resolution<i32, String>, String> {
            flag.set(true);
            Ok(Resolution::Value(value))
        },
        rethrow,
    );

    // Already settled at registration time, yet the callback only runs on
    // a later scheduler turn.
    assert!(!observed.get());
    sched.run();
    assert!(observed.get());
}

#[test]
fn values_flow_through_a_chain() {
    let sched = Scheduler::new();
    let result = Settlable::<i32, String>::resolve(&sched, 2)
        .then(|n| Ok(Resolution::Value(n + 1)), rethrow)
        .then(|n| Ok(Resolution::Value(n * 10)), rethrow);

    sched.run();
    assert_eq!(result.outcome(), Some(Outcome::Fulfilled(30)));
}

#[test]
fn rejection_skips_fulfillment_handlers() {
    let sched = Scheduler::new();
    let touched = Rc::new(Cell::new(false));
    let flag = Rc::clone(&touched);

    let result = Settlable::<i32, String>::reject(&sched, "oops".to_string()).then(
        move |value| -> Result<Resolution<i32, String>, String> {
            flag.set(true);
            Ok(Resolution::Value(value))
        },
        rethrow,
    );

    sched.run();
    assert!(!touched.get());
    assert_eq!(result.outcome(), Some(Outcome::Rejected("oops".to_string())));
}

#[test]
fn a_recovering_handler_returns_to_the_fulfilled_path() {
    let sched = Scheduler::new();
    let result = Settlable::<i32, String>::reject(&sched, "oops".to_string())
        .catch(|reason| {
            assert_eq!(reason, "oops");
            Ok(Resolution::Value(42))
        })
        .then(|n| Ok(Resolution::Value(n + 1)), rethrow);

    sched.run();
    assert_eq!(result.outcome(), Some(Outcome::Fulfilled(43)));
}

#[test]
fn a_failing_handler_rejects_the_derived_settlable() {
    let sched = Scheduler::new();
    let result = Settlable::<i32, String>::resolve(&sched, 1).then(
        |_| -> Result<Resolution<i32, String>, String> { Err("handler blew up".to_string()) },
        rethrow,
    );

    sched.run();
    assert_eq!(
        result.outcome(),
        Some(Outcome::Rejected("handler blew up".to_string()))
    );
}

#[test]
fn finally_passes_either_outcome_through() {
    let sched = Scheduler::new();
    let runs = Rc::new(Cell::new(0));

    let on_fulfilled = {
        let runs = Rc::clone(&runs);
        move || -> Result<Resolution<(), String>, String> {
            runs.set(runs.get() + 1);
            Ok(Resolution::Value(()))
        }
    };
    let fulfilled = Settlable::<i32, String>::resolve(&sched, 5).finally(on_fulfilled);

    let on_rejected = {
        let runs = Rc::clone(&runs);
        move || -> Result<Resolution<(), String>, String> {
            runs.set(runs.get() + 1);
            Ok(Resolution::Value(()))
        }
    };
    let rejected = Settlable::<i32, String>::reject(&sched, "bad".to_string()).finally(on_rejected);

    sched.run();
    assert_eq!(runs.get(), 2);
    assert_eq!(fulfilled.outcome(), Some(Outcome::Fulfilled(5)));
    assert_eq!(rejected.outcome(), Some(Outcome::Rejected("bad".to_string())));
}

#[test]
fn a_failing_finally_overrides_the_outcome() {
    let sched = Scheduler::new();
    let result = Settlable::<i32, String>::resolve(&sched, 5)
        .finally(|| Err("cleanup failed".to_string()));

    sched.run();
    assert_eq!(
        result.outcome(),
        Some(Outcome::Rejected("cleanup failed".to_string()))
    );
}

#[test]
fn finally_waits_for_deferred_cleanup() {
    let sched = Scheduler::new();
    let (gate, open_gate, _close_gate) = Settlable::<(), String>::pending(&sched);

    let result = Settlable::<i32, String>::resolve(&sched, 5)
        .finally(move || Ok(Resolution::Deferred(gate)));

    sched.run();
    assert!(result.is_pending());

    open_gate.fulfill(());
    sched.run();
    assert_eq!(result.outcome(), Some(Outcome::Fulfilled(5)));
}

#[test]
fn continuations_registered_mid_drain_still_run() {
    let sched = Scheduler::new();
    let settled = Settlable::<i32, String>::resolve(&sched, 1);
    let log = Rc::new(std::cell::RefCell::new(Vec::new()));

    let late = {
        let settled = settled.clone();
        let log = Rc::clone(&log);
        move |n: i32| -> Result<Resolution<i32, String>, String> {
            log.borrow_mut().push(("first", n));
            // Registering from inside a continuation must not disturb the
            // drain in progress.
            let log = Rc::clone(&log);
            settled.then(
                move |m| -> Result<Resolution<i32, String>, String> {
                    log.borrow_mut().push(("late", m));
                    Ok(Resolution::Value(m))
                },
                rethrow,
            );
            Ok(Resolution::Value(n))
        }
    };
    settled.then(late, rethrow);

    sched.run();
    assert_eq!(*log.borrow(), vec![("first", 1), ("late", 1)]);
}
