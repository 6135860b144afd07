//! Disposal tests: a terminal releases every upstream subscription the
//! operator holds, siblings included.

use crate::common::{collect, obeys_grammar, tracked, Lifecycle};
use pushflow::{Fault, Notification, Seq};
use std::sync::Arc;

fn assert_released(name: &str, lifecycles: &[&Arc<Lifecycle>]) {
    for (index, lifecycle) in lifecycles.iter().enumerate() {
        crate::assert_with_log!(
            lifecycle.balanced(),
            format!("{name}: source {index} released"),
            lifecycle.subscribes(),
            lifecycle.disposes()
        );
    }
}

#[test]
fn test_merge_error_releases_silent_sibling() {
    crate::common::init_test_logging();
    crate::test_phase!("merge sibling release");
    let (quiet, quiet_life) = tracked(&Seq::<u8>::never());
    let (failing, failing_life) = tracked(&Seq::throw(Fault::msg("merge")));

    let (log, _sub) = collect(&Seq::merge([quiet, failing]));

    assert_eq!(*log.lock(), vec![Notification::Error(Fault::msg("merge"))]);
    assert_eq!(quiet_life.subscribes(), 1);
    assert_released("merge", &[&quiet_life, &failing_life]);
}

#[test]
fn test_amb_winner_releases_losers() {
    crate::common::init_test_logging();
    let (slow, slow_life) = tracked(&Seq::<i32>::never());
    let (fast, fast_life) = tracked(&Seq::just(1));

    let (log, _sub) = collect(&Seq::amb([slow, fast]));

    assert_eq!(
        *log.lock(),
        vec![Notification::Next(1), Notification::Completed]
    );
    assert_released("amb", &[&slow_life, &fast_life]);
}

#[test]
fn test_zip_exhausted_side_releases_other() {
    crate::common::init_test_logging();
    let (long, long_life) = tracked(&Seq::<i64>::never());
    let (short, short_life) = tracked(&Seq::<i64>::empty());

    let (log, _sub) = collect(&long.zip_with(&short, |a, b| a + b));

    assert_eq!(*log.lock(), vec![Notification::Completed]);
    assert!(obeys_grammar(&log.lock()));
    assert_eq!(long_life.subscribes(), 1);
    assert_released("zip", &[&long_life, &short_life]);
}

#[test]
fn test_zip_error_releases_everything() {
    crate::common::init_test_logging();
    let (left, left_life) = tracked(&Seq::<i32>::never());
    let (right, right_life) = tracked(&Seq::<i32>::throw(Fault::msg("zip")));

    let (log, _sub) = collect(&left.zip_with(&right, |a, b| a + b));

    assert_eq!(*log.lock(), vec![Notification::Error(Fault::msg("zip"))]);
    assert_released("zip", &[&left_life, &right_life]);
}

#[test]
fn test_combine_latest_silent_completion_holds_live_sibling() {
    crate::common::init_test_logging();
    let (quiet, quiet_life) = tracked(&Seq::<i32>::never());
    let (done, done_life) = tracked(&Seq::<i32>::empty());

    let (log, sub) = collect(&quiet.combine_latest_with(&done, |a, b| a + b));

    assert!(log.lock().is_empty());
    assert_eq!(quiet_life.subscribes(), 1);
    assert_eq!(quiet_life.disposes(), 0);

    sub.dispose();
    assert!(log.lock().is_empty());
    assert_released("combine_latest", &[&quiet_life, &done_life]);
}

#[test]
fn test_combine_latest_all_silent_completions_complete() {
    crate::common::init_test_logging();
    let (first, first_life) = tracked(&Seq::<i32>::empty());
    let (second, second_life) = tracked(&Seq::<i32>::empty());

    let (log, _sub) = collect(&first.combine_latest_with(&second, |a, b| a + b));

    assert_eq!(*log.lock(), vec![Notification::Completed]);
    assert_released("combine_latest", &[&first_life, &second_life]);
}

#[test]
fn test_take_until_signal_releases_source() {
    crate::common::init_test_logging();
    let (source, source_life) = tracked(&Seq::<i32>::never());
    let (signal, signal_life) = tracked(&Seq::just(()));

    let (log, _sub) = collect(&source.take_until(&signal));

    assert_eq!(*log.lock(), vec![Notification::Completed]);
    assert_released("take_until", &[&source_life, &signal_life]);
}

#[test]
fn test_switch_releases_superseded_inner() {
    crate::common::init_test_logging();
    let (first, first_life) = tracked(&Seq::<i32>::never());
    let (second, second_life) = tracked(&Seq::<i32>::never());

    let (_log, sub) = collect(&Seq::from_iter(vec![first, second]).switch_latest());

    assert_released("switch first inner", &[&first_life]);
    assert_eq!(second_life.subscribes(), 1);
    assert!(!second_life.balanced());

    sub.dispose();
    assert_released("switch second inner", &[&second_life]);
}

#[test]
fn test_disposing_result_releases_all_sources() {
    crate::common::init_test_logging();
    let (a, a_life) = tracked(&Seq::<i32>::never());
    let (b, b_life) = tracked(&Seq::<i32>::never());
    let (c, c_life) = tracked(&Seq::<i32>::never());

    let (_log, sub) = collect(&Seq::merge([a, b]).zip_with(&c, |x, y| x + y));
    sub.dispose();

    assert_released("merge+zip dispose", &[&a_life, &b_life, &c_life]);
}
