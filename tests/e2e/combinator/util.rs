//! Test utilities for combinator E2E tests.

use pushflow::lab::VirtualTimeScheduler;
use pushflow::{Fault, Seq};

/// Typed faults used to exercise type-specific handlers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// The remote side did not answer in time.
    #[error("timed out after {0} ticks")]
    Timeout(u64),
    /// The remote side refused the request.
    #[error("service unavailable")]
    Unavailable,
}

/// A fault of a type no handler in these tests is declared for.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("disk full")]
pub struct DiskFull;

/// Fresh virtual-time scheduler with test logging initialised.
pub fn lab() -> VirtualTimeScheduler {
    crate::common::init_test_logging();
    VirtualTimeScheduler::new()
}

/// Fault helper.
pub fn boom(message: &str) -> Fault {
    Fault::msg(message)
}

/// A timeout fault as a sequence.
pub fn timeout_error<T: Send + 'static>(ticks: u64) -> Seq<T> {
    Seq::throw(Fault::new(ServiceError::Timeout(ticks)))
}

/// Assert the subscription windows recorded by a hot or cold source.
#[macro_export]
macro_rules! assert_windows {
    ($source:expr, [$(($from:expr, $to:expr)),* $(,)?]) => {
        assert_eq!(
            $source.subscriptions(),
            vec![$(pushflow::lab::subscribed($from, $to)),*],
            "subscription windows of {}",
            stringify!($source)
        );
    };
}
