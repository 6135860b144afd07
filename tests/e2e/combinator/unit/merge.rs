//! Unit tests for merge and flat_map.
//!
//! Tests verify:
//! - Every value appears at its original virtual time
//! - Completion happens at the latest source completion
//! - An error ends the output and releases all siblings
//! - Inner sequences arriving over time are merged as they arrive

use crate::e2e::combinator::util::{boom, lab};
use pushflow::lab::{on_completed, on_error, on_next};
use pushflow::Seq;
use std::time::Duration;

/// Values keep their arrival times; completion waits for the last source.
#[test]
fn test_merge_preserves_times_and_waits_for_all() {
    crate::test_phase!("merge completeness");
    let vts = lab();
    let a = vts.create_hot_observable(vec![on_next(210, 1), on_next(240, 4), on_completed(250)]);
    let b = vts.create_hot_observable(vec![on_next(220, 2), on_completed(400)]);
    let c = vts.create_hot_observable(vec![on_next(230, 3), on_next(330, 5), on_completed(350)]);
    let sources = vec![a.seq(), b.seq(), c.seq()];

    let res = vts.start(move || Seq::merge(sources)).expect("run");

    assert_eq!(
        res.messages(),
        vec![
            on_next(210, 1),
            on_next(220, 2),
            on_next(230, 3),
            on_next(240, 4),
            on_next(330, 5),
            on_completed(400),
        ]
    );
    crate::assert_windows!(a, [(200, 250)]);
    crate::assert_windows!(b, [(200, 400)]);
    crate::assert_windows!(c, [(200, 350)]);
    crate::test_complete!("test_merge_preserves_times_and_waits_for_all", values = 5);
}

/// The first error ends the output and disposes every other source.
#[test]
fn test_merge_error_releases_siblings() {
    let vts = lab();
    let a = vts.create_hot_observable(vec![on_next(210, 1), on_error(225, boom("a failed"))]);
    let b = vts.create_hot_observable(vec![on_next(220, 2), on_next(230, 3), on_completed(300)]);
    let (xs, ys) = (a.seq(), b.seq());

    let res = vts.start(move || xs.merge_with(&ys)).expect("run");

    assert_eq!(
        res.messages(),
        vec![on_next(210, 1), on_next(220, 2), on_error(225, boom("a failed"))]
    );
    crate::assert_windows!(a, [(200, 225)]);
    crate::assert_windows!(b, [(200, 225)]);
}

/// flat_map subscribes each inner sequence as its outer value arrives.
#[test]
fn test_flat_map_interleaves_inner_sequences() {
    let vts = lab();
    let inner = vts.create_cold_observable(vec![on_next(5, 'i'), on_next(25, 'j'), on_completed(30)]);
    let outer = vts.create_hot_observable(vec![on_next(210, ()), on_next(220, ()), on_completed(240)]);
    let (o, i) = (outer.seq(), inner.seq());

    let res = vts.start(move || o.flat_map(move |()| i.clone())).expect("run");

    assert_eq!(
        res.messages(),
        vec![
            on_next(215, 'i'),
            on_next(225, 'i'),
            on_next(235, 'j'),
            on_next(245, 'j'),
            on_completed(250),
        ]
    );
    crate::assert_windows!(inner, [(210, 240), (220, 250)]);
    crate::assert_windows!(outer, [(200, 240)]);
}

/// Disposing the merged subscription releases the outer and every inner.
#[test]
fn test_merge_dispose_releases_everything() {
    let vts = lab();
    let a = vts.create_hot_observable(vec![on_next(500, 1)]);
    let b = vts.create_hot_observable(vec![on_next(900, 2), on_next(1100, 3)]);
    let (xs, ys) = (a.seq(), b.seq());

    let res = vts.start(move || xs.merge_with(&ys)).expect("run");

    assert_eq!(res.messages(), vec![on_next(500, 1), on_next(900, 2)]);
    crate::assert_windows!(a, [(200, 1000)]);
    crate::assert_windows!(b, [(200, 1000)]);
}

/// A timer-driven flat_map on the virtual clock.
#[test]
fn test_flat_map_with_timers() {
    let vts = lab();
    let sched = vts.scheduler();
    let res = vts
        .start(move || {
            Seq::range(1, 3).flat_map(move |n| {
                let delay = Duration::from_nanos(u64::try_from(40 - n * 10).unwrap_or(0));
                Seq::timer(delay, &sched).map(move |_| n)
            })
        })
        .expect("run");

    assert_eq!(
        res.messages(),
        vec![on_next(210, 3), on_next(220, 2), on_next(230, 1), on_completed(230)]
    );
}
