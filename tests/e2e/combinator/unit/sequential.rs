//! Unit tests for the sequential operators: concat, on_error_resume_next,
//! repeat and retry.
//!
//! Tests verify:
//! - Only one source is subscribed at a time
//! - The next source starts at the tick the previous one ended
//! - repeat/retry count every subscription, the first included

use crate::e2e::combinator::util::{boom, lab};
use pushflow::lab::{on_completed, on_error, on_next};
use pushflow::Seq;

// ============================================================================
// concat
// ============================================================================

#[test]
fn test_concat_runs_sources_back_to_back() {
    crate::test_phase!("concat");
    let vts = lab();
    let a = vts.create_cold_observable(vec![on_next(10, 1), on_completed(20)]);
    let b = vts.create_cold_observable(vec![on_next(5, 2), on_completed(10)]);
    let (x, y) = (a.seq(), b.seq());

    let res = vts.start(move || x.concat_with(&y)).expect("run");

    assert_eq!(
        res.messages(),
        vec![on_next(210, 1), on_next(225, 2), on_completed(230)]
    );
    crate::assert_windows!(a, [(200, 220)]);
    crate::assert_windows!(b, [(220, 230)]);
}

#[test]
fn test_concat_error_skips_remaining_sources() {
    let vts = lab();
    let a = vts.create_cold_observable::<i32>(vec![on_error(10, boom("a"))]);
    let b = vts.create_cold_observable(vec![on_next(5, 2), on_completed(10)]);
    let sources = vec![a.seq(), b.seq()];

    let res = vts.start(move || Seq::concat(sources)).expect("run");

    assert_eq!(res.messages(), vec![on_error(210, boom("a"))]);
    crate::assert_windows!(b, []);
}

#[test]
fn test_concat_disposal_releases_active_source_only() {
    let vts = lab();
    let a = vts.create_cold_observable(vec![on_next(500, 1), on_completed(900)]);
    let b = vts.create_cold_observable(vec![on_next(5, 2), on_completed(10)]);
    let (x, y) = (a.seq(), b.seq());

    let res = vts.start(move || x.concat_with(&y)).expect("run");

    assert_eq!(res.messages(), vec![on_next(700, 1)]);
    crate::assert_windows!(a, [(200, 1000)]);
    crate::assert_windows!(b, []);
}

#[test]
fn test_concat_long_synchronous_chain() {
    let vts = lab();
    let res = vts
        .start(|| Seq::concat((0..10_000).map(Seq::just)))
        .expect("run");
    let values = res.values();
    assert_eq!(values.len(), 10_000);
    assert_eq!(values.last(), Some(&9_999));
    assert_eq!(res.messages().last(), Some(&on_completed(200)));
}

// ============================================================================
// on_error_resume_next
// ============================================================================

#[test]
fn test_resume_next_moves_on_after_error_and_completion() {
    crate::test_phase!("on_error_resume_next");
    let vts = lab();
    let a = vts.create_cold_observable(vec![on_next(10, 1), on_error(20, boom("a"))]);
    let b = vts.create_cold_observable(vec![on_next(5, 2), on_completed(10)]);
    let c = vts.create_cold_observable(vec![on_next(5, 3), on_error(10, boom("c"))]);
    let sources = vec![a.seq(), b.seq(), c.seq()];

    let res = vts
        .start(move || Seq::on_error_resume_next(sources))
        .expect("run");

    assert_eq!(
        res.messages(),
        vec![
            on_next(210, 1),
            on_next(225, 2),
            on_next(235, 3),
            on_completed(240),
        ]
    );
    crate::assert_windows!(a, [(200, 220)]);
    crate::assert_windows!(b, [(220, 230)]);
    crate::assert_windows!(c, [(230, 240)]);
}

// ============================================================================
// repeat
// ============================================================================

#[test]
fn test_repeat_zero_completes_without_subscribing() {
    let vts = lab();
    let xs = vts.create_cold_observable(vec![on_next(10, 1), on_completed(20)]);
    let source = xs.seq();

    let res = vts.start(move || source.repeat(0)).expect("run");

    assert_eq!(res.messages(), vec![on_completed(200)]);
    crate::assert_windows!(xs, []);
}

#[test]
fn test_repeat_one_is_identity() {
    let vts = lab();
    let xs = vts.create_cold_observable(vec![on_next(10, 1), on_completed(20)]);
    let source = xs.seq();

    let res = vts.start(move || source.repeat(1)).expect("run");

    assert_eq!(res.messages(), vec![on_next(210, 1), on_completed(220)]);
    crate::assert_windows!(xs, [(200, 220)]);
}

#[test]
fn test_repeat_three_times() {
    let vts = lab();
    let xs = vts.create_cold_observable(vec![on_next(10, 'r'), on_completed(20)]);
    let source = xs.seq();

    let res = vts.start(move || source.repeat(3)).expect("run");

    assert_eq!(
        res.messages(),
        vec![
            on_next(210, 'r'),
            on_next(230, 'r'),
            on_next(250, 'r'),
            on_completed(260),
        ]
    );
    crate::assert_windows!(xs, [(200, 220), (220, 240), (240, 260)]);
}

#[test]
fn test_repeat_passes_error_through() {
    let vts = lab();
    let xs = vts.create_cold_observable::<u8>(vec![on_error(15, boom("once"))]);
    let source = xs.seq();

    let res = vts.start(move || source.repeat(5)).expect("run");

    assert_eq!(res.messages(), vec![on_error(215, boom("once"))]);
    crate::assert_windows!(xs, [(200, 215)]);
}

#[test]
fn test_repeat_forever_until_disposed() {
    let vts = lab();
    let xs = vts.create_cold_observable(vec![on_next(100, 'r'), on_completed(300)]);
    let source = xs.seq();

    let res = vts.start(move || source.repeat_forever()).expect("run");

    assert_eq!(
        res.messages(),
        vec![on_next(300, 'r'), on_next(600, 'r'), on_next(900, 'r')]
    );
    crate::assert_windows!(xs, [(200, 500), (500, 800), (800, 1000)]);
}

// ============================================================================
// retry
// ============================================================================

#[test]
fn test_retry_zero_completes_without_subscribing() {
    let vts = lab();
    let xs = vts.create_cold_observable::<u8>(vec![on_error(10, boom("x"))]);
    let source = xs.seq();

    let res = vts.start(move || source.retry(0)).expect("run");

    assert_eq!(res.messages(), vec![on_completed(200)]);
    crate::assert_windows!(xs, []);
}

#[test]
fn test_retry_gives_up_with_last_fault() {
    crate::test_phase!("retry");
    let vts = lab();
    let xs = vts.create_cold_observable(vec![on_next(10, 1), on_error(20, boom("flaky"))]);
    let source = xs.seq();

    let res = vts.start(move || source.retry(2)).expect("run");

    assert_eq!(
        res.messages(),
        vec![on_next(210, 1), on_next(230, 1), on_error(240, boom("flaky"))]
    );
    crate::assert_windows!(xs, [(200, 220), (220, 240)]);
}

#[test]
fn test_retry_stops_after_success() {
    let vts = lab();
    let xs = vts.create_cold_observable(vec![on_next(10, 1), on_completed(20)]);
    let source = xs.seq();

    let res = vts.start(move || source.retry(4)).expect("run");

    assert_eq!(res.messages(), vec![on_next(210, 1), on_completed(220)]);
    crate::assert_windows!(xs, [(200, 220)]);
}
