//! Core value types.
//!
//! - [`time`]: scheduler clock instants (`Time`)
//! - [`notification`]: one observer call as a value (`Notification`)

pub mod notification;
pub mod time;

pub use notification::Notification;
pub use time::Time;
