//! Test utilities for pushflow.
//!
//! This module provides shared helpers for unit tests:
//! - Consistent tracing-based logging initialization
//! - Phase/section macros for readable test output
//! - A collecting observer for synchronous sequences

use crate::disposable::Subscription;
use crate::error::Fault;
use crate::observable::Seq;
use crate::observer::Observer;
use crate::types::Notification;
use parking_lot::Mutex;
use std::sync::{Arc, Once};
use tracing_subscriber::fmt::format::FmtSpan;

static INIT_LOGGING: Once = Once::new();

/// Initialize test logging with trace-level output.
///
/// Safe to call multiple times; only initializes once.
pub fn init_test_logging() {
    init_test_logging_with_level(tracing::Level::TRACE);
}

/// Initialize test logging with a custom level.
///
/// The first call wins; later calls are no-ops.
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

struct Recorder<T>(Arc<Mutex<Vec<Notification<T>>>>);

impl<T: Send> Observer<T> for Recorder<T> {
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

/// Everything a subscription delivered, in order.
pub struct Collected<T> {
    log: Arc<Mutex<Vec<Notification<T>>>>,
    subscription: Subscription,
}

impl<T: Send + 'static> Collected<T> {
    /// Subscribes to `seq` and starts recording.
    pub fn subscribe(seq: &Seq<T>) -> Self {
        let log = Arc::new(Mutex::new(Vec::new()));
        let subscription = seq.subscribe(Recorder(Arc::clone(&log)));
        Self { log, subscription }
    }

    /// The subscription handle.
    pub fn subscription(&self) -> &Subscription {
        &self.subscription
    }

    /// True once `Completed` was delivered.
    pub fn is_completed(&self) -> bool {
        matches!(self.log.lock().last(), Some(Notification::Completed))
    }

    /// The delivered fault, if any.
    pub fn fault(&self) -> Option<Fault> {
        self.log.lock().iter().find_map(|n| n.fault().cloned())
    }

    /// Number of notifications delivered.
    pub fn len(&self) -> usize {
        self.log.lock().len()
    }
}

impl<T: Clone + Send + 'static> Collected<T> {
    /// Delivered values.
    pub fn values(&self) -> Vec<T> {
        self.log
            .lock()
            .iter()
            .filter_map(|n| n.value().cloned())
            .collect()
    }

    /// Every delivered notification.
    pub fn notifications(&self) -> Vec<Notification<T>> {
        self.log.lock().clone()
    }
}
