//! Adapters between sequences and code outside the push model.
//!
//! - [`blocking`]: pull values on the calling thread ([`BlockingIter`],
//!   [`first`], [`last`], [`single`]).
//! - [`callback`]: expose a callback-style asynchronous operation as a
//!   one-shot sequence ([`from_callback`]).
//!
//! Nothing in the combinator engine depends on this module.

pub mod blocking;
pub mod callback;

pub use blocking::{first, last, single, BlockingIter};
pub use callback::{from_callback, Callback};
