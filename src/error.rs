//! Error types and fault propagation for pushflow.
//!
//! Two distinct things travel through this module:
//!
//! - [`Error`]: failures of the library itself (a scheduler driven while it
//!   is already running, a blocking `single()` that saw two values, a bad
//!   configuration value). These are returned from fallible API calls.
//! - [`Fault`]: the payload of `on_error`. A fault is whatever a producer or a
//!   user-supplied function decided to fail with. It is type-erased but can be
//!   downcast, which is what typed `catch` relies on.
//!
//! Any [`Error`] can become a [`Fault`] (`Fault::from(error)`), so library
//! failures surfaced inside a sequence are catchable like any other fault.
//!
//! # Fault classes
//!
//! - **Source faults**: raised by a producer through `on_error`; terminal.
//! - **Observer faults**: panics inside observer callbacks. These are never
//!   intercepted and unwind out of whichever call delivered the notification.
//! - **Operator faults**: an `Err` returned by a selector, combiner or
//!   predicate. The operator converts it into `on_error` on its output and
//!   disposes every sibling subscription.

use core::fmt;
use std::any::{Any, TypeId};
use std::sync::Arc;

/// The kind of library error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    // === Scheduling ===
    /// A virtual clock was driven while its drive loop was already running.
    SchedulerBusy,
    /// Work was submitted to a scheduler that has shut down.
    SchedulerShutdown,
    /// A virtual-time run exceeded its configured step limit.
    StepLimitExceeded,

    // === Sequence shape ===
    /// The sequence completed without producing a value.
    SequenceEmpty,
    /// The sequence produced more than one value where exactly one was expected.
    SequenceNotSingle,

    // === Configuration / state ===
    /// A configuration value could not be parsed or is out of range.
    InvalidConfig,
    /// An operation was attempted in a state that does not permit it.
    InvalidStateTransition,

    // === User ===
    /// User-provided error.
    User,
}

impl ErrorKind {
    /// Returns the error category for this kind.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::SchedulerBusy | Self::SchedulerShutdown | Self::StepLimitExceeded => {
                ErrorCategory::Scheduling
            }
            Self::SequenceEmpty | Self::SequenceNotSingle => ErrorCategory::Sequence,
            Self::InvalidConfig => ErrorCategory::Config,
            Self::InvalidStateTransition => ErrorCategory::Internal,
            Self::User => ErrorCategory::User,
        }
    }

    /// Returns true if this kind indicates a programming error rather than a
    /// property of the data flowing through a sequence.
    #[must_use]
    pub const fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Self::SchedulerBusy | Self::InvalidStateTransition | Self::StepLimitExceeded
        )
    }
}

/// High-level error category for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Scheduler lifecycle and clock failures.
    Scheduling,
    /// Sequence cardinality failures.
    Sequence,
    /// Configuration failures.
    Config,
    /// Internal state machine misuse.
    Internal,
    /// User-originated errors.
    User,
}

/// The main error type for pushflow operations.
#[derive(Debug, Clone)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    source: Option<Arc<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub const fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            source: None,
        }
    }

    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    /// Adds a message description to the error.
    #[must_use]
    pub fn with_message(mut self, msg: impl Into<String>) -> Self {
        self.message = Some(msg.into());
        self
    }

    /// Adds a source error to the chain.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    /// Returns the error message, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Creates a scheduler-busy error.
    #[must_use]
    pub fn scheduler_busy() -> Self {
        Self::new(ErrorKind::SchedulerBusy)
            .with_message("virtual clock is already being driven on this scheduler")
    }

    /// Creates a step-limit error for a runaway virtual-time run.
    #[must_use]
    pub fn step_limit_exceeded(limit: u64) -> Self {
        Self::new(ErrorKind::StepLimitExceeded)
            .with_message(format!("virtual-time run exceeded {limit} steps"))
    }

    /// Creates an invalid-configuration error.
    #[must_use]
    pub fn invalid_config(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidConfig).with_message(detail)
    }

    /// Creates an invalid-state-transition error.
    #[must_use]
    pub fn invalid_state(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidStateTransition).with_message(detail)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        if let Some(msg) = &self.message {
            write!(f, ": {msg}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as _)
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

/// A specialized Result type for pushflow operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Ad-hoc fault carrying only a message, produced by [`Fault::msg`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct FaultMessage(pub String);

/// The payload of an `on_error` notification.
///
/// Cloning is cheap (reference counted). Equality is structural: two faults
/// are equal if they share an allocation, or if they wrap the same concrete
/// error type and render the same message. That is what recorded
/// notifications are compared with.
#[derive(Clone)]
pub struct Fault {
    inner: Arc<dyn FaultSource>,
}

trait FaultSource: std::error::Error + Send + Sync + 'static {
    fn as_any(&self) -> &dyn Any;
    fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static);
}

impl<E: std::error::Error + Send + Sync + 'static> FaultSource for E {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self
    }
}

impl Fault {
    /// Wraps a concrete error value.
    #[must_use]
    pub fn new<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(error),
        }
    }

    /// Creates a fault from a plain message.
    #[must_use]
    pub fn msg(message: impl Into<String>) -> Self {
        Self::new(FaultMessage(message.into()))
    }

    /// Returns a reference to the wrapped error if it is of type `E`.
    #[must_use]
    pub fn downcast_ref<E: std::error::Error + 'static>(&self) -> Option<&E> {
        <dyn FaultSource as FaultSource>::as_any(self.pointee()).downcast_ref::<E>()
    }

    /// Returns true if the wrapped error is of type `E`.
    #[must_use]
    pub fn is<E: std::error::Error + 'static>(&self) -> bool {
        <dyn FaultSource as FaultSource>::as_any(self.pointee()).is::<E>()
    }

    /// Returns the wrapped error as a trait object.
    #[must_use]
    pub fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        <dyn FaultSource as FaultSource>::as_error(self.pointee())
    }

    /// Returns true if both handles share one allocation.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    // `Arc<E: Error>` is itself an `Error`, so method syntax on `inner`
    // would resolve to the blanket impl for the `Arc`, not the pointee.
    fn pointee(&self) -> &(dyn FaultSource + 'static) {
        &*self.inner
    }

    fn concrete_type_id(&self) -> TypeId {
        <dyn FaultSource as FaultSource>::as_any(self.pointee()).type_id()
    }
}

impl PartialEq for Fault {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
            || (self.concrete_type_id() == other.concrete_type_id()
                && self.to_string() == other.to_string())
    }
}

impl fmt::Debug for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Fault").field(&self.as_error()).finish()
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.as_error(), f)
    }
}

impl From<Error> for Fault {
    fn from(error: Error) -> Self {
        Self::new(error)
    }
}

impl From<ErrorKind> for Fault {
    fn from(kind: ErrorKind) -> Self {
        Self::new(Error::new(kind))
    }
}
