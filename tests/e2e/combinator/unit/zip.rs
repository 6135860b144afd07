//! Unit tests for zip.
//!
//! Tests verify:
//! - Pairing by index, each result at the later of its two arrival times
//! - Completion once no further pairing is possible
//! - Errors from either side end the output and release the other

use crate::e2e::combinator::util::{boom, lab};
use pushflow::lab::{on_completed, on_error, on_next};
use pushflow::Seq;

/// Five values against three: exactly three pairs, then completion when the
/// shorter side has completed with nothing buffered.
#[test]
fn test_zip_pairs_five_with_three() {
    crate::test_phase!("zip pairing");
    let vts = lab();
    let xs = vts.create_hot_observable(vec![
        on_next(210, 1),
        on_next(220, 2),
        on_next(230, 3),
        on_next(240, 4),
        on_next(250, 5),
        on_completed(300),
    ]);
    let ys = vts.create_hot_observable(vec![
        on_next(215, 'a'),
        on_next(235, 'b'),
        on_next(255, 'c'),
        on_completed(260),
    ]);
    let (a, b) = (xs.seq(), ys.seq());

    let res = vts
        .start(move || a.zip_with(&b, |n, c| format!("{n}{c}")))
        .expect("run");

    assert_eq!(
        res.messages(),
        vec![
            on_next(215, "1a".to_string()),
            on_next(235, "2b".to_string()),
            on_next(255, "3c".to_string()),
            on_completed(260),
        ]
    );
    crate::assert_windows!(xs, [(200, 260)]);
    crate::assert_windows!(ys, [(200, 260)]);
}

/// A side that completes while the other still has unmatched values buffered
/// ends the output as soon as that buffer can no longer be paired.
#[test]
fn test_zip_completes_when_buffer_drains() {
    let vts = lab();
    let xs = vts.create_hot_observable(vec![on_next(210, 1), on_next(220, 2), on_completed(230)]);
    let ys = vts.create_hot_observable(vec![on_next(240, 10), on_next(250, 20), on_next(260, 30)]);
    let (a, b) = (xs.seq(), ys.seq());

    let res = vts.start(move || a.zip_with(&b, |x, y| x + y)).expect("run");

    assert_eq!(
        res.messages(),
        vec![on_next(240, 11), on_next(250, 22), on_completed(250)]
    );
    crate::assert_windows!(ys, [(200, 250)]);
}

/// An error on either side ends the output and releases the other side.
#[test]
fn test_zip_error_releases_other_side() {
    let vts = lab();
    let xs = vts.create_hot_observable(vec![on_next(210, 1), on_next(300, 2)]);
    let ys = vts.create_hot_observable::<i32>(vec![on_error(220, boom("ys"))]);
    let (a, b) = (xs.seq(), ys.seq());

    let res = vts.start(move || a.zip_with(&b, |x, y| x * y)).expect("run");

    assert_eq!(res.messages(), vec![on_error(220, boom("ys"))]);
    crate::assert_windows!(xs, [(200, 220)]);
}

/// A combiner that fails ends the output at that tick and releases both
/// sides there.
#[test]
fn test_try_zip_fault_releases_both_sides() {
    let vts = lab();
    let xs = vts.create_hot_observable(vec![
        on_next(210, 1),
        on_next(230, 0),
        on_next(250, 3),
        on_completed(300),
    ]);
    let ys = vts.create_hot_observable(vec![
        on_next(220, 10),
        on_next(240, 20),
        on_next(260, 30),
        on_completed(300),
    ]);
    let (a, b) = (xs.seq(), ys.seq());

    let res = vts
        .start(move || a.try_zip_with(&b, |x, y| if x == 0 { Err(boom("zero")) } else { Ok(x + y) }))
        .expect("run");

    assert_eq!(res.messages(), vec![on_next(220, 11), on_error(240, boom("zero"))]);
    crate::assert_windows!(xs, [(200, 240)]);
    crate::assert_windows!(ys, [(200, 240)]);
}

/// zip_all over three sources emits rows.
#[test]
fn test_zip_all_rows() {
    let vts = lab();
    let a = vts.create_hot_observable(vec![on_next(210, 1), on_next(240, 4), on_completed(500)]);
    let b = vts.create_hot_observable(vec![on_next(220, 2), on_next(250, 5), on_completed(500)]);
    let c = vts.create_hot_observable(vec![on_next(230, 3), on_completed(235)]);
    let sources = vec![a.seq(), b.seq(), c.seq()];

    let res = vts.start(move || Seq::zip_all(sources)).expect("run");

    assert_eq!(
        res.messages(),
        vec![on_next(230, vec![1, 2, 3]), on_completed(235)]
    );
    crate::assert_windows!(a, [(200, 235)]);
    crate::assert_windows!(b, [(200, 235)]);
}
