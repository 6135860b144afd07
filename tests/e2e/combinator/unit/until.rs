//! Unit tests for take_until and skip_until.

use crate::e2e::combinator::util::{boom, lab};
use pushflow::lab::{on_completed, on_error, on_next};

fn source_messages() -> Vec<pushflow::lab::Recorded<pushflow::Notification<i32>>> {
    vec![
        on_next(210, 1),
        on_next(230, 2),
        on_next(250, 3),
        on_completed(300),
    ]
}

#[test]
fn test_take_until_completes_on_signal() {
    crate::test_phase!("take_until");
    let vts = lab();
    let xs = vts.create_hot_observable(source_messages());
    let stop = vts.create_hot_observable(vec![on_next(240, ()), on_next(260, ())]);
    let (source, signal) = (xs.seq(), stop.seq());

    let res = vts.start(move || source.take_until(&signal)).expect("run");

    assert_eq!(
        res.messages(),
        vec![on_next(210, 1), on_next(230, 2), on_completed(240)]
    );
    crate::assert_windows!(xs, [(200, 240)]);
    crate::assert_windows!(stop, [(200, 240)]);
}

/// A signal that completes silently never stops the source.
#[test]
fn test_take_until_ignores_silent_signal() {
    let vts = lab();
    let xs = vts.create_hot_observable(source_messages());
    let stop = vts.create_hot_observable::<()>(vec![on_completed(220)]);
    let (source, signal) = (xs.seq(), stop.seq());

    let res = vts.start(move || source.take_until(&signal)).expect("run");

    assert_eq!(
        res.messages(),
        vec![
            on_next(210, 1),
            on_next(230, 2),
            on_next(250, 3),
            on_completed(300),
        ]
    );
    crate::assert_windows!(stop, [(200, 220)]);
}

#[test]
fn test_take_until_signal_error() {
    let vts = lab();
    let xs = vts.create_hot_observable(source_messages());
    let stop = vts.create_hot_observable::<()>(vec![on_error(225, boom("signal"))]);
    let (source, signal) = (xs.seq(), stop.seq());

    let res = vts.start(move || source.take_until(&signal)).expect("run");

    assert_eq!(res.messages(), vec![on_next(210, 1), on_error(225, boom("signal"))]);
    crate::assert_windows!(xs, [(200, 225)]);
}

#[test]
fn test_skip_until_opens_on_signal() {
    crate::test_phase!("skip_until");
    let vts = lab();
    let xs = vts.create_hot_observable(source_messages());
    let go = vts.create_hot_observable(vec![on_next(240, "go"), on_next(245, "again")]);
    let (source, signal) = (xs.seq(), go.seq());

    let res = vts.start(move || source.skip_until(&signal)).expect("run");

    assert_eq!(res.messages(), vec![on_next(250, 3), on_completed(300)]);
    crate::assert_windows!(xs, [(200, 300)]);
    crate::assert_windows!(go, [(200, 240)]);
}

/// A signal that completes silently keeps the gate shut for good.
#[test]
fn test_skip_until_stays_closed_on_silent_signal() {
    let vts = lab();
    let xs = vts.create_hot_observable(source_messages());
    let go = vts.create_hot_observable::<()>(vec![on_completed(220)]);
    let (source, signal) = (xs.seq(), go.seq());

    let res = vts.start(move || source.skip_until(&signal)).expect("run");

    assert_eq!(res.messages(), vec![on_completed(300)]);
    crate::assert_windows!(go, [(200, 220)]);
}
