#![allow(dead_code)]
#![allow(unused_imports)]
//! Shared integration test utilities.
//!
//! Import with:
//! ```ignore
//! mod common;
//! use common::*;
//! ```

use parking_lot::Mutex;
use proptest::prelude::ProptestConfig;
use proptest::test_runner::RngSeed;
use pushflow::{Fault, Notification, Observer, Seq, Subscription};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use tracing_subscriber::fmt::format::FmtSpan;

static INIT_LOGGING: Once = Once::new();

/// Default seed for property tests when running under CI.
pub const DEFAULT_PROPTEST_SEED: u64 = 0x5EED_5EED;

const PROPTEST_SEED_ENV: &str = "PUSHFLOW_PROPTEST_SEED";
const PROPTEST_MAX_SHRINK_ITERS_ENV: &str = "PUSHFLOW_PROPTEST_MAX_SHRINK_ITERS";

/// Build a ProptestConfig with deterministic seed support for CI.
#[must_use]
pub fn test_proptest_config(cases: u32) -> ProptestConfig {
    let mut config = ProptestConfig::with_cases(cases);

    // Honor existing PROPTEST_RNG_SEED, otherwise apply our own.
    if matches!(config.rng_seed, RngSeed::Random) {
        if let Some(seed) = read_proptest_seed() {
            config.rng_seed = RngSeed::Fixed(seed);
        }
    }

    if let Some(iters) = std::env::var(PROPTEST_MAX_SHRINK_ITERS_ENV)
        .ok()
        .and_then(|value| value.parse::<u32>().ok())
    {
        config.max_shrink_iters = iters;
    }
    config
}

fn read_proptest_seed() -> Option<u64> {
    if let Ok(value) = std::env::var(PROPTEST_SEED_ENV) {
        return value.parse::<u64>().ok();
    }

    // If CI is set and no explicit seed is provided, use a fixed seed.
    if std::env::var("CI").is_ok() {
        return Some(DEFAULT_PROPTEST_SEED);
    }

    None
}

/// Initialize test logging with trace-level output.
pub fn init_test_logging() {
    init_test_logging_with_level(tracing::Level::TRACE);
}

/// Initialize test logging with a custom level.
pub fn init_test_logging_with_level(level: tracing::Level) {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_test_writer()
            .with_file(true)
            .with_line_number(true)
            .with_target(true)
            .with_thread_ids(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_ansi(false)
            .try_init();
    });
}

/// Log a test phase transition with a visual separator.
#[macro_export]
macro_rules! test_phase {
    ($name:expr) => {
        tracing::info!(phase = %$name, "========================================");
        tracing::info!(phase = %$name, "TEST PHASE: {}", $name);
        tracing::info!(phase = %$name, "========================================");
    };
}

/// Log a section within a test phase.
#[macro_export]
macro_rules! test_section {
    ($name:expr) => {
        tracing::debug!(section = %$name, "--- {} ---", $name);
    };
}

/// Log test completion with summary.
#[macro_export]
macro_rules! test_complete {
    ($name:expr) => {
        tracing::info!(test = %$name, "test completed successfully: {}", $name);
    };
    ($name:expr, $($key:ident = $value:expr),* $(,)?) => {
        tracing::info!(
            test = %$name,
            $($key = %$value,)*
            "test completed successfully: {}",
            $name
        );
    };
}

/// Log before assertions for context.
#[macro_export]
macro_rules! assert_with_log {
    ($cond:expr, $msg:expr, $expected:expr, $actual:expr) => {
        tracing::debug!(
            expected = ?$expected,
            actual = ?$actual,
            "Asserting: {}",
            $msg
        );
        assert!($cond, "{}: expected {:?}, got {:?}", $msg, $expected, $actual);
    };
}

// =============================================================================
// Recording
// =============================================================================

/// Observer that appends every call to a shared log, including calls that
/// would break the contract, so tests can check the contract held.
pub struct LogObserver<T>(pub Arc<Mutex<Vec<Notification<T>>>>);

impl<T: Send> Observer<T> for LogObserver<T> {
    fn on_next(&mut self, value: T) {
        self.0.lock().push(Notification::Next(value));
    }

    fn on_error(&mut self, fault: Fault) {
        self.0.lock().push(Notification::Error(fault));
    }

    fn on_completed(&mut self) {
        self.0.lock().push(Notification::Completed);
    }
}

/// Subscribes a [`LogObserver`] and returns its log with the subscription.
pub fn collect<T: Send + 'static>(seq: &Seq<T>) -> (Arc<Mutex<Vec<Notification<T>>>>, Subscription) {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sub = seq.subscribe(LogObserver(Arc::clone(&log)));
    (log, sub)
}

/// True if `log` holds at most one terminal and it is the last entry.
pub fn obeys_grammar<T>(log: &[Notification<T>]) -> bool {
    let terminals = log.iter().filter(|n| n.is_terminal()).count();
    terminals == 0 || (terminals == 1 && log.last().is_some_and(Notification::is_terminal))
}

/// Counts subscribe and dispose calls made against a wrapped source.
#[derive(Debug, Default)]
pub struct Lifecycle {
    subscribes: AtomicUsize,
    disposes: AtomicUsize,
}

impl Lifecycle {
    /// Number of subscriptions made so far.
    pub fn subscribes(&self) -> usize {
        self.subscribes.load(Ordering::SeqCst)
    }

    /// Number of subscriptions released so far.
    pub fn disposes(&self) -> usize {
        self.disposes.load(Ordering::SeqCst)
    }

    /// True if every subscription made has been released.
    pub fn balanced(&self) -> bool {
        self.subscribes() == self.disposes()
    }
}

/// Wraps `seq` so that its subscriptions are counted in the returned
/// [`Lifecycle`].
pub fn tracked<T: Send + 'static>(seq: &Seq<T>) -> (Seq<T>, Arc<Lifecycle>) {
    let lifecycle = Arc::new(Lifecycle::default());
    let counts = Arc::clone(&lifecycle);
    let source = seq.clone();
    let wrapped = Seq::create(move |sink| {
        counts.subscribes.fetch_add(1, Ordering::SeqCst);
        let counts = Arc::clone(&counts);
        let inner = source.subscribe(SinkForward(sink));
        Subscription::new(move || {
            counts.disposes.fetch_add(1, Ordering::SeqCst);
            inner.dispose();
        })
    });
    (wrapped, lifecycle)
}

struct SinkForward<T>(Arc<pushflow::Sink<T>>);

impl<T: Send + 'static> Observer<T> for SinkForward<T> {
    fn on_next(&mut self, value: T) {
        self.0.next(value);
    }

    fn on_error(&mut self, fault: Fault) {
        self.0.error(fault);
    }

    fn on_completed(&mut self) {
        self.0.completed();
    }
}

// =============================================================================
// Law tracking
// =============================================================================

/// Records how often each named law was checked across property cases.
#[derive(Debug, Default)]
pub struct LawTracker {
    checks: BTreeMap<&'static str, (u64, u64)>,
}

impl LawTracker {
    /// Create an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one check of `law`; returns `holds` for use in assertions.
    pub fn check(&mut self, law: &'static str, holds: bool) -> bool {
        let entry = self.checks.entry(law).or_default();
        entry.0 += 1;
        if holds {
            entry.1 += 1;
        }
        tracing::trace!(law, holds, checks = entry.0, "law check");
        holds
    }

    /// Panics unless every law in `required` was checked and always held.
    pub fn assert_all_held(&self, required: &[&str]) {
        for law in required {
            match self.checks.get(law) {
                Some((checks, passes)) if checks > &0 && checks == passes => {}
                Some((checks, passes)) => {
                    panic!("law {law} held {passes}/{checks} times");
                }
                None => panic!("law {law} never checked; tracked: {:?}", self.checks),
            }
        }
    }
}
