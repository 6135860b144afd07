//! Disposal tests: after `dispose` returns, nothing more is delivered.
//!
//! Each source here is driven by hand through the sink it was subscribed
//! with, so pushes after disposal reach the operator exactly as a slow or
//! misbehaving producer's would.

use crate::common::collect;
use parking_lot::Mutex;
use pushflow::{Seq, Sink, Subscription};
use std::sync::Arc;

/// A source whose subscriber sink is parked for the test to drive.
struct Manual<T> {
    seq: Seq<T>,
    sinks: Arc<Mutex<Vec<Arc<Sink<T>>>>>,
}

impl<T: Send + 'static> Manual<T> {
    fn new() -> Self {
        let sinks: Arc<Mutex<Vec<Arc<Sink<T>>>>> = Arc::new(Mutex::new(Vec::new()));
        let parked = Arc::clone(&sinks);
        let seq = Seq::create(move |sink| {
            parked.lock().push(sink);
            Subscription::empty()
        });
        Self { seq, sinks }
    }

    fn push(&self, value: T)
    where
        T: Clone,
    {
        let sinks = self.sinks.lock().clone();
        for sink in sinks {
            sink.next(value.clone());
        }
    }

    fn complete(&self) {
        let sinks = self.sinks.lock().clone();
        for sink in sinks {
            sink.completed();
        }
    }
}

fn assert_silent_after_dispose<T, F>(name: &str, build: F)
where
    T: Send + 'static,
    F: FnOnce(&Manual<i32>, &Manual<i32>) -> Seq<T>,
{
    crate::test_section!(name);
    let (a, b) = (Manual::new(), Manual::new());
    let seq = build(&a, &b);
    let (log, sub) = collect(&seq);

    a.push(1);
    b.push(2);
    let before = log.lock().len();

    sub.dispose();
    a.push(3);
    b.push(4);
    a.complete();
    b.complete();

    let after = log.lock().len();
    crate::assert_with_log!(after == before, name, before, after);
}

#[test]
fn test_multi_source_operators_go_silent() {
    crate::common::init_test_logging();
    crate::test_phase!("dispose stops emission");

    assert_silent_after_dispose("merge", |a, b| a.seq.merge_with(&b.seq));
    assert_silent_after_dispose("concat", |a, b| a.seq.concat_with(&b.seq));
    assert_silent_after_dispose("amb", |a, b| a.seq.amb_with(&b.seq));
    assert_silent_after_dispose("zip", |a, b| a.seq.zip_with(&b.seq, |x, y| x + y));
    assert_silent_after_dispose("combine_latest", |a, b| {
        a.seq.combine_latest_with(&b.seq, |x, y| x * y)
    });
    assert_silent_after_dispose("take_until", |a, b| a.seq.take_until(&b.seq.filter(|v| *v > 100)));
    assert_silent_after_dispose("skip_until", |a, b| a.seq.skip_until(&b.seq));
    assert_silent_after_dispose("catch_with", |a, b| a.seq.catch_with(&b.seq));
    assert_silent_after_dispose("repeat", |a, _| a.seq.repeat(3));
    assert_silent_after_dispose("materialize", |a, _| a.seq.materialize());

    crate::test_complete!("multi_source_operators_go_silent");
}

#[test]
fn test_switch_goes_silent() {
    crate::common::init_test_logging();
    let inner = Manual::<i32>::new();
    let outer = Manual::<Seq<i32>>::new();
    let (log, sub) = collect(&outer.seq.switch_latest());

    outer.push(inner.seq.clone());
    inner.push(1);
    assert_eq!(log.lock().len(), 1);

    sub.dispose();
    inner.push(2);
    outer.push(inner.seq.clone());
    inner.push(3);
    assert_eq!(log.lock().len(), 1);
}

#[test]
fn test_dispose_is_idempotent() {
    crate::common::init_test_logging();
    let a = Manual::<i32>::new();
    let b = Manual::<i32>::new();
    let (log, sub) = collect(&a.seq.merge_with(&b.seq));
    sub.dispose();
    sub.dispose();
    assert!(sub.is_disposed());
    a.push(1);
    assert!(log.lock().is_empty());
}
